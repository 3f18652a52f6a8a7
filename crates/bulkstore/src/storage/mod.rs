//! Storage backend implementations.
//!
//! Concrete implementations of `bulkstore_core::storage::KeyValueStore`:
//!
//! - `dynamodb`: AWS DynamoDB using `aws-sdk-dynamodb`
//! - `inmemory`: ordered in-memory map with fault injection, used by tests

pub mod dynamodb;
pub mod inmemory;

pub use dynamodb::{AwsConfig, DynamoDbStore};
pub use inmemory::InMemoryStore;
