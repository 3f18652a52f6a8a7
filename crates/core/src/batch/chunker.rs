use super::error::BatchError;
use super::types::{Chunk, MutationRequest};

/// Largest number of requests a single batch write may carry.
pub const MAX_BATCH_SIZE: usize = 25;

/// Validates a batch size against the store limit.
pub fn validate_batch_size(max_batch_size: usize) -> Result<usize, BatchError> {
    if max_batch_size == 0 || max_batch_size > MAX_BATCH_SIZE {
        return Err(BatchError::InvalidBatchSize {
            size: max_batch_size,
            max: MAX_BATCH_SIZE,
        });
    }
    Ok(max_batch_size)
}

/// Splits `requests` into order-preserving chunks of at most `max_batch_size`.
///
/// Chunk `n` holds requests `[n * max, min((n + 1) * max, len))`. An empty
/// input yields no chunks.
pub fn chunk(
    requests: Vec<MutationRequest>,
    max_batch_size: usize,
) -> Result<Vec<Chunk>, BatchError> {
    let mut chunker = Chunker::new(max_batch_size)?;
    let mut chunks = Vec::with_capacity(requests.len().div_ceil(max_batch_size));

    for request in requests {
        if let Some(chunk) = chunker.push(request) {
            chunks.push(chunk);
        }
    }
    chunks.extend(chunker.finish());

    Ok(chunks)
}

/// Incremental chunker for lazily produced requests.
///
/// Produces exactly the same chunks as [`chunk`] would for the same sequence.
#[derive(Debug)]
pub struct Chunker {
    max_batch_size: usize,
    buffer: Vec<MutationRequest>,
}

impl Chunker {
    pub fn new(max_batch_size: usize) -> Result<Self, BatchError> {
        let max_batch_size = validate_batch_size(max_batch_size)?;
        Ok(Self {
            max_batch_size,
            buffer: Vec::with_capacity(max_batch_size),
        })
    }

    /// Buffers a request, returning a full chunk once the limit is reached.
    pub fn push(&mut self, request: MutationRequest) -> Option<Chunk> {
        self.buffer.push(request);
        if self.buffer.len() == self.max_batch_size {
            let full = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.max_batch_size));
            Chunk::from_requests(full)
        } else {
            None
        }
    }

    /// Flushes whatever is buffered as a final, possibly short, chunk.
    pub fn finish(self) -> Option<Chunk> {
        Chunk::from_requests(self.buffer)
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::PrimaryKey;

    fn deletes(n: usize) -> Vec<MutationRequest> {
        (0..n)
            .map(|i| MutationRequest::Delete(PrimaryKey::new("P", format!("{i:04}"))))
            .collect()
    }

    #[test]
    fn test_chunking_is_complete_and_ordered() {
        for len in [0usize, 1, 24, 25, 26, 50, 51, 137] {
            for max in [1usize, 7, 25] {
                let input = deletes(len);
                let chunks = chunk(input.clone(), max).unwrap();

                assert_eq!(chunks.len(), len.div_ceil(max), "len={len} max={max}");
                assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= max));

                let rebuilt: Vec<_> = chunks.into_iter().flat_map(Chunk::into_requests).collect();
                assert_eq!(rebuilt, input);
            }
        }
    }

    #[test]
    fn test_chunk_boundaries() {
        let chunks = chunk(deletes(60), 25).unwrap();
        let sizes: Vec<_> = chunks.iter().map(Chunk::len).collect();
        assert_eq!(sizes, vec![25, 25, 10]);
        assert_eq!(chunks[1].requests()[0].key().sort_key, "0025");
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunk(Vec::new(), 25).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_batch_sizes() {
        assert_eq!(
            chunk(deletes(3), 0).unwrap_err(),
            BatchError::InvalidBatchSize { size: 0, max: 25 }
        );
        assert!(Chunker::new(26).is_err());
        assert!(Chunker::new(25).is_ok());
    }

    #[test]
    fn test_incremental_chunker() {
        let mut chunker = Chunker::new(2).unwrap();
        let mut requests = deletes(3).into_iter();

        assert!(chunker.push(requests.next().unwrap()).is_none());
        assert_eq!(chunker.buffered(), 1);
        let full = chunker.push(requests.next().unwrap()).unwrap();
        assert_eq!(full.len(), 2);
        assert_eq!(chunker.buffered(), 0);

        assert!(chunker.push(requests.next().unwrap()).is_none());
        assert_eq!(chunker.finish().map(|c| c.len()), Some(1));
    }

    #[test]
    fn test_finish_on_empty_chunker() {
        assert!(Chunker::new(5).unwrap().finish().is_none());
    }
}
