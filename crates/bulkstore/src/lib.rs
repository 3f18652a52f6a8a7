//! Bulk load and purge for a partitioned DynamoDB table.
//!
//! Rows are enumerated lazily page by page, mapped to puts or deletes,
//! grouped into batches of at most 25 and applied one batch at a time.
//! Requests the store leaves unprocessed are resubmitted with exponential
//! backoff until they are applied or the attempt budget runs out.

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod source;
pub mod storage;
