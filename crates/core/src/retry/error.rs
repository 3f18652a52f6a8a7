use thiserror::Error;

/// Errors produced by the retry state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RetryError {
    #[error("{remaining} request(s) still unprocessed after {attempts} attempt(s)")]
    RetriesExhausted { remaining: usize, attempts: u32 },

    #[error("Store reported an unprocessed request that was not submitted: {key}")]
    UnexpectedUnprocessed { key: String },

    #[error("Invalid retry policy: {0}")]
    InvalidPolicy(String),
}
