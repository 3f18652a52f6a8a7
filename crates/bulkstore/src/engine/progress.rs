//! Progress notifications for a pipeline run.

use bulkstore_core::progress::ProgressCounter;

use crate::error::PipelineError;

use super::pipeline::PipelineSummary;

/// Receives lifecycle notifications from a pipeline.
pub trait ProgressSink: Send + Sync {
    fn started(&self, operation: &str);

    /// Called every `progress_every` completed chunks.
    fn progress(&self, operation: &str, counter: &ProgressCounter);

    fn finished(&self, operation: &str, summary: &PipelineSummary);

    fn failed(&self, operation: &str, error: &PipelineError);
}

/// Default sink: structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn started(&self, operation: &str) {
        tracing::info!(operation, "Starting");
    }

    fn progress(&self, operation: &str, counter: &ProgressCounter) {
        tracing::info!(
            operation,
            applied = counter.requests_applied,
            chunks = counter.chunks_completed,
            retries = counter.retries,
            "Progress"
        );
    }

    fn finished(&self, operation: &str, summary: &PipelineSummary) {
        tracing::info!(
            operation,
            rows = summary.counter.rows_enumerated,
            applied = summary.counter.requests_applied,
            chunks = summary.counter.chunks_completed,
            retries = summary.counter.retries,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Finished"
        );
    }

    fn failed(&self, operation: &str, error: &PipelineError) {
        tracing::error!(operation, applied = error.applied(), error = %error, "Failed");
    }
}
