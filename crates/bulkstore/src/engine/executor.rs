//! Drives one chunk to full application.

use bulkstore_core::batch::Chunk;
use bulkstore_core::retry::{RetryError, RetryPolicy, RetryState, RetryStep};
use bulkstore_core::storage::KeyValueStore;

use crate::error::ExecutorError;

/// Result of a chunk that was fully applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOutcome {
    /// Requests in the chunk, all of them applied.
    pub applied: usize,
    /// Submit calls it took, the first included.
    pub submits: u32,
}

impl ChunkOutcome {
    pub fn retries(&self) -> u32 {
        self.submits.saturating_sub(1)
    }
}

/// Submits chunks and resubmits whatever the store leaves unprocessed.
pub struct Executor<'a, S: ?Sized> {
    store: &'a S,
    policy: RetryPolicy,
}

impl<'a, S> Executor<'a, S>
where
    S: KeyValueStore + ?Sized,
{
    pub fn new(store: &'a S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Applies every request in `chunk` or fails.
    ///
    /// Unprocessed requests are resubmitted after an exponential backoff until
    /// the store accepts them all or the policy's submit budget is spent.
    /// Store errors are returned immediately without a retry.
    pub async fn execute(&self, chunk: Chunk) -> Result<ChunkOutcome, ExecutorError> {
        let applied = chunk.len();
        let mut state = RetryState::new(chunk);

        loop {
            let unprocessed = self.store.batch_write(state.pending()).await?;
            let withheld = unprocessed.len();

            match state.evaluate(unprocessed, &self.policy) {
                Ok(RetryStep::Done) => {
                    tracing::debug!(
                        requests = applied,
                        submits = state.submits(),
                        "Chunk applied"
                    );
                    return Ok(ChunkOutcome {
                        applied,
                        submits: state.submits(),
                    });
                }
                Ok(RetryStep::Backoff(delay)) => {
                    tracing::warn!(
                        unprocessed = withheld,
                        attempt = state.attempt(),
                        delay_ms = delay.as_millis() as u64,
                        "Store left requests unprocessed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e @ RetryError::RetriesExhausted { .. }) => {
                    tracing::error!(error = %e, "Giving up on chunk");
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
