//! In-memory storage backend for testing.
//!
//! Rows are kept in an ordered map behind `Arc<RwLock<_>>`. Paging, queries
//! and the secondary index are emulated, and a fault plan can withhold part
//! of each batch to exercise the retry path without a real store.
//!
//! # Example
//!
//! ```rust,ignore
//! use bulkstore::storage::inmemory::InMemoryStore;
//!
//! let store = InMemoryStore::new(default_table_schema().with_table_name("test"));
//! store.withhold_schedule([3, 1]).await;
//! ```

mod store;

pub use store::{InMemoryStore, DEFAULT_PAGE_SIZE};
