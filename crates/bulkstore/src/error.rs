use std::path::PathBuf;

use thiserror::Error;

use bulkstore_core::batch::BatchError;
use bulkstore_core::retry::RetryError;
use bulkstore_core::storage::StoreError;

/// Invalid settings, raised before any store interaction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing table name: pass --table-name or set BULKSTORE_TABLE")]
    MissingTableName,

    #[error("Missing record source: pass --source or set BULKSTORE_SOURCE")]
    MissingSource,

    #[error("Record source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Retry(#[from] RetryError),

    #[error("Progress interval must be at least 1 chunk")]
    InvalidProgressInterval,

    #[error("Page size must be at least 1")]
    InvalidPageSize,

    #[error("A sort key prefix requires a partition key")]
    PrefixWithoutPartition,

    #[error("Unknown index: {0}")]
    UnknownIndex(String),
}

/// Failure to read the record source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {} at line {line}: {source}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
}

/// Fatal failure while driving one chunk.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Retry(#[from] RetryError),
}

impl ExecutorError {
    /// Requests left unapplied when retries ran out.
    pub fn remaining(&self) -> Option<usize> {
        match self {
            ExecutorError::Retry(RetryError::RetriesExhausted { remaining, .. }) => {
                Some(*remaining)
            }
            _ => None,
        }
    }
}

/// Fatal pipeline failure, carrying how many requests were applied before it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Policy(#[from] RetryError),

    #[error("Reading rows failed after {applied} applied request(s): {source}")]
    Source { applied: u64, source: StoreError },

    #[error("Chunk {chunk} failed after {applied} applied request(s): {source}")]
    Chunk {
        chunk: u64,
        applied: u64,
        source: ExecutorError,
    },
}

impl PipelineError {
    /// Requests applied before the failure.
    pub fn applied(&self) -> u64 {
        match self {
            PipelineError::Source { applied, .. } | PipelineError::Chunk { applied, .. } => {
                *applied
            }
            PipelineError::Batch(_) | PipelineError::Policy(_) => 0,
        }
    }
}

/// Failure of a CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Operation cancelled by user")]
    UserCancelled,
}
