mod error;
mod traits;
mod types;

pub use error::{Result, StoreError};
pub use traits::KeyValueStore;
pub use types::{Cursor, Page, ScanRequest};
