//! Source → transform → chunk → execute loop.

use std::time::{Duration, Instant};

use futures_util::{Stream, StreamExt};

use bulkstore_core::batch::{Chunk, Chunker, MutationRequest, MAX_BATCH_SIZE};
use bulkstore_core::progress::{ProgressCounter, DEFAULT_PROGRESS_EVERY};
use bulkstore_core::retry::RetryPolicy;
use bulkstore_core::storage::{KeyValueStore, StoreError};

use crate::error::PipelineError;

use super::executor::Executor;
use super::progress::{ProgressSink, TracingProgress};

/// Tuning for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub max_batch_size: usize,
    pub retry: RetryPolicy,
    /// Chunks between progress notifications.
    pub progress_every: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_batch_size: MAX_BATCH_SIZE,
            retry: RetryPolicy::default(),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// Totals of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    pub operation: String,
    pub counter: ProgressCounter,
    pub elapsed: Duration,
}

/// Applies a stream of items to the store as batched mutations.
///
/// Chunks run strictly one after another. The first fatal error stops the
/// run; requests already applied stay applied.
pub struct Pipeline<'a, S: ?Sized> {
    store: &'a S,
    settings: PipelineSettings,
    sink: Box<dyn ProgressSink + 'a>,
}

impl<'a, S> Pipeline<'a, S>
where
    S: KeyValueStore + ?Sized,
{
    pub fn new(store: &'a S, settings: PipelineSettings) -> Self {
        Self {
            store,
            settings,
            sink: Box::new(TracingProgress),
        }
    }

    /// Replaces the default tracing sink.
    pub fn with_sink(mut self, sink: Box<dyn ProgressSink + 'a>) -> Self {
        self.sink = sink;
        self
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs `source` through `transform` and applies the resulting requests.
    pub async fn run<T, St, F>(
        &self,
        operation: &str,
        source: St,
        transform: F,
    ) -> Result<PipelineSummary, PipelineError>
    where
        St: Stream<Item = Result<T, StoreError>>,
        F: FnMut(T) -> MutationRequest,
    {
        let started = Instant::now();
        self.sink.started(operation);

        match self.drive(operation, source, transform).await {
            Ok(counter) => {
                let summary = PipelineSummary {
                    operation: operation.to_string(),
                    counter,
                    elapsed: started.elapsed(),
                };
                self.sink.finished(operation, &summary);
                Ok(summary)
            }
            Err(e) => {
                self.sink.failed(operation, &e);
                Err(e)
            }
        }
    }

    async fn drive<T, St, F>(
        &self,
        operation: &str,
        source: St,
        mut transform: F,
    ) -> Result<ProgressCounter, PipelineError>
    where
        St: Stream<Item = Result<T, StoreError>>,
        F: FnMut(T) -> MutationRequest,
    {
        self.settings.retry.validate()?;
        let mut chunker = Chunker::new(self.settings.max_batch_size)?;
        let executor = Executor::new(self.store, self.settings.retry);
        let mut counter = ProgressCounter::new();

        futures_util::pin_mut!(source);

        while let Some(item) = source.next().await {
            let item = item.map_err(|source| PipelineError::Source {
                applied: counter.requests_applied,
                source,
            })?;
            counter.record_row();

            if let Some(chunk) = chunker.push(transform(item)) {
                self.apply(operation, &executor, chunk, &mut counter).await?;
            }
        }

        if let Some(chunk) = chunker.finish() {
            self.apply(operation, &executor, chunk, &mut counter).await?;
        }

        Ok(counter)
    }

    async fn apply(
        &self,
        operation: &str,
        executor: &Executor<'a, S>,
        chunk: Chunk,
        counter: &mut ProgressCounter,
    ) -> Result<(), PipelineError> {
        let number = counter.chunks_completed + 1;

        let outcome = executor
            .execute(chunk)
            .await
            .map_err(|source| PipelineError::Chunk {
                chunk: number,
                applied: counter.requests_applied,
                source,
            })?;

        if counter.record_chunk(
            outcome.applied,
            outcome.retries(),
            self.settings.progress_every,
        ) {
            self.sink.progress(operation, counter);
        }
        Ok(())
    }
}
