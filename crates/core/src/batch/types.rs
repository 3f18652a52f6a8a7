use serde::{Deserialize, Serialize};

use crate::keys::{PrimaryKey, Row};

/// A single write against the store: either a full-row put or a delete by key.
///
/// Requests are never modified once built. A request the store fails to apply
/// is resubmitted exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationRequest {
    Put(Row),
    Delete(PrimaryKey),
}

impl MutationRequest {
    /// The primary key this request addresses.
    pub fn key(&self) -> &PrimaryKey {
        match self {
            MutationRequest::Put(row) => &row.key,
            MutationRequest::Delete(key) => key,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MutationRequest::Put(_) => "put",
            MutationRequest::Delete(_) => "delete",
        }
    }
}

/// An ordered, non-empty group of requests submitted in one store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    requests: Vec<MutationRequest>,
}

impl Chunk {
    /// Wraps `requests`, returning `None` when the list is empty.
    pub(crate) fn from_requests(requests: Vec<MutationRequest>) -> Option<Self> {
        if requests.is_empty() {
            None
        } else {
            Some(Self { requests })
        }
    }

    pub fn requests(&self) -> &[MutationRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Never true for chunks produced by the chunker.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn into_requests(self) -> Vec<MutationRequest> {
        self.requests
    }
}
