//! The bulk mutation engine: lazy enumeration, chunk execution with
//! backoff, and the sequential pipeline that ties them together.

pub mod cursor;
mod executor;
mod pipeline;
mod progress;
pub mod workflows;

pub use executor::{ChunkOutcome, Executor};
pub use pipeline::{Pipeline, PipelineSettings, PipelineSummary};
pub use progress::{ProgressSink, TracingProgress};
