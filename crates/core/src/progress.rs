//! Running totals for a bulk operation.

use serde::Serialize;

/// Default number of chunks between progress notifications.
pub const DEFAULT_PROGRESS_EVERY: u64 = 20;

/// Monotonic counters owned by a single pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCounter {
    /// Items pulled from the row source.
    pub rows_enumerated: u64,
    /// Requests confirmed applied by the store.
    pub requests_applied: u64,
    /// Chunks driven to completion.
    pub chunks_completed: u64,
    /// Resubmissions performed across all chunks.
    pub retries: u64,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_row(&mut self) {
        self.rows_enumerated += 1;
    }

    /// Records a completed chunk of `size` requests and the retries it took.
    ///
    /// Returns `true` when a notification is due, every `every` chunks.
    pub fn record_chunk(&mut self, size: usize, retries: u32, every: u64) -> bool {
        self.requests_applied += size as u64;
        self.chunks_completed += 1;
        self.retries += u64::from(retries);
        every > 0 && self.chunks_completed % every == 0
    }
}
