mod chunker;
mod error;
mod types;

pub use chunker::{chunk, validate_batch_size, Chunker, MAX_BATCH_SIZE};
pub use error::BatchError;
pub use types::{Chunk, MutationRequest};
