use async_trait::async_trait;

use crate::batch::MutationRequest;

use super::{Cursor, Page, Result, ScanRequest};

/// A partitioned key-value store that enumerates rows page by page and
/// applies batched writes that may be only partially applied.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads one page starting after `cursor`, or from the beginning when `None`.
    ///
    /// A page with `next == None` is the last one.
    async fn scan_page(&self, request: &ScanRequest, cursor: Option<Cursor>) -> Result<Page>;

    /// Submits up to one batch of requests.
    ///
    /// Returns the requests the store did not apply, as clones of the
    /// submitted values so they can be resubmitted verbatim.
    async fn batch_write(&self, requests: &[MutationRequest]) -> Result<Vec<MutationRequest>>;
}
