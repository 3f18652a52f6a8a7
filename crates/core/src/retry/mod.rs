mod error;
mod policy;
mod state;

pub use error::RetryError;
pub use policy::RetryPolicy;
pub use state::{RetryState, RetryStep};
