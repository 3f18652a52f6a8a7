//! In-memory store implementation.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use bulkstore_core::batch::MutationRequest;
use bulkstore_core::keys::{AttributeValue, PrimaryKey, Row, TableSchema};
use bulkstore_core::storage::{Cursor, KeyValueStore, Page, Result, ScanRequest, StoreError};

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Scripted misbehavior for `batch_write`.
#[derive(Debug, Default)]
struct FaultPlan {
    /// Per-submit withheld counts, consumed front to back.
    schedule: VecDeque<usize>,
    /// Withheld count once the schedule is exhausted.
    persistent: usize,
    /// One-based submit number that fails outright.
    fail_on_submit: Option<usize>,
}

#[derive(Debug, Default)]
struct State {
    rows: BTreeMap<PrimaryKey, Row>,
    faults: FaultPlan,
    submitted_sizes: Vec<usize>,
}

/// In-memory storage backend for testing.
///
/// Rows live in an ordered map so scans are deterministic. A fault plan lets
/// tests withhold the tail of a batch from application, the way a throttled
/// store reports unprocessed items.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    schema: TableSchema,
    page_size: usize,
    state: Arc<RwLock<State>>,
    submits: Arc<AtomicUsize>,
    pages_read: Arc<AtomicUsize>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            page_size: DEFAULT_PAGE_SIZE,
            state: Arc::new(RwLock::new(State::default())),
            submits: Arc::new(AtomicUsize::new(0)),
            pages_read: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Default page size when a request does not set one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Withholds the last `counts[n]` requests of the n-th following submit.
    pub async fn withhold_schedule(&self, counts: impl IntoIterator<Item = usize>) {
        self.state.write().await.faults.schedule = counts.into_iter().collect();
    }

    /// Withholds the last `count` requests of every submit once the schedule is spent.
    pub async fn withhold_always(&self, count: usize) {
        self.state.write().await.faults.persistent = count;
    }

    /// Makes the `submit`-th call (one-based, counted from creation) fail.
    pub async fn fail_on_submit(&self, submit: usize) {
        self.state.write().await.faults.fail_on_submit = Some(submit);
    }

    /// Stores rows directly, bypassing the fault plan.
    pub async fn insert(&self, rows: impl IntoIterator<Item = Row>) {
        let mut state = self.state.write().await;
        for row in rows {
            state.rows.insert(row.key.clone(), row);
        }
    }

    pub async fn get(&self, key: &PrimaryKey) -> Option<Row> {
        self.state.read().await.rows.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of `batch_write` calls so far.
    pub fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    /// Number of `scan_page` calls so far.
    pub fn pages_read(&self) -> usize {
        self.pages_read.load(Ordering::SeqCst)
    }

    /// Size of every submitted batch, in order.
    pub async fn submitted_sizes(&self) -> Vec<usize> {
        self.state.read().await.submitted_sizes.clone()
    }

    /// Ordering attributes of `row` for the given enumeration.
    fn position(&self, row: &Row, request: &ScanRequest) -> Option<Vec<String>> {
        let base = [row.key.partition_key.clone(), row.key.sort_key.clone()];
        match request.index_name {
            Some(_) => {
                let index_key = row.index_key.as_ref()?;
                Some(
                    [index_key.partition_key.clone(), index_key.sort_key.clone()]
                        .into_iter()
                        .chain(base)
                        .collect(),
                )
            }
            None => Some(base.to_vec()),
        }
    }

    /// Attribute names matching `position`, used to build cursors.
    fn position_names(&self, request: &ScanRequest) -> Result<Vec<String>> {
        let base = [self.schema.partition_key.clone(), self.schema.sort_key.clone()];
        match &request.index_name {
            Some(name) => {
                let index = self
                    .schema
                    .index_named(name)
                    .ok_or_else(|| StoreError::InvalidData(format!("Unknown index: {}", name)))?;
                Ok([index.partition_key.clone(), index.sort_key.clone()]
                    .into_iter()
                    .chain(base)
                    .collect())
            }
            None => Ok(base.to_vec()),
        }
    }

    fn cursor_position(cursor: &Cursor, names: &[String]) -> Result<Vec<String>> {
        names
            .iter()
            .map(|name| {
                cursor
                    .get_s(name)
                    .map(str::to_string)
                    .ok_or_else(|| StoreError::InvalidData(format!("Cursor missing {}", name)))
            })
            .collect()
    }

    fn project(&self, row: &Row, keys_only: bool) -> Row {
        if keys_only {
            Row {
                key: row.key.clone(),
                index_key: row.index_key.clone(),
                attributes: BTreeMap::new(),
            }
        } else {
            row.clone()
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn scan_page(&self, request: &ScanRequest, cursor: Option<Cursor>) -> Result<Page> {
        self.pages_read.fetch_add(1, Ordering::SeqCst);

        let names = self.position_names(request)?;
        let after = cursor
            .as_ref()
            .map(|c| Self::cursor_position(c, &names))
            .transpose()?;
        let limit = request
            .page_size
            .map(|size| size.max(1) as usize)
            .unwrap_or(self.page_size);

        let state = self.state.read().await;
        let mut matching: Vec<(Vec<String>, &Row)> = state
            .rows
            .values()
            .filter_map(|row| self.position(row, request).map(|pos| (pos, row)))
            .filter(|(pos, _)| {
                request
                    .partition_key
                    .as_ref()
                    .map_or(true, |pk| &pos[0] == pk)
            })
            .filter(|(pos, _)| {
                request
                    .sort_key_prefix
                    .as_ref()
                    .map_or(true, |prefix| pos[1].starts_with(prefix.as_str()))
            })
            .filter(|(pos, _)| after.as_ref().map_or(true, |after| pos > after))
            .collect();
        matching.sort_by(|a, b| a.0.cmp(&b.0));

        let has_more = matching.len() > limit;
        matching.truncate(limit);

        let next = if has_more {
            matching.last().map(|(pos, _)| {
                Cursor::from_attributes(
                    names
                        .iter()
                        .cloned()
                        .zip(pos.iter().cloned().map(AttributeValue::S))
                        .collect(),
                )
            })
        } else {
            None
        };

        Ok(Page {
            rows: matching
                .into_iter()
                .map(|(_, row)| self.project(row, request.keys_only))
                .collect(),
            next,
        })
    }

    async fn batch_write(&self, requests: &[MutationRequest]) -> Result<Vec<MutationRequest>> {
        let submit = self.submits.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write().await;
        state.submitted_sizes.push(requests.len());

        if state.faults.fail_on_submit == Some(submit) {
            return Err(StoreError::WriteFailed(format!(
                "Injected failure on submit {}",
                submit
            )));
        }

        let withheld = state
            .faults
            .schedule
            .pop_front()
            .unwrap_or(state.faults.persistent)
            .min(requests.len());
        let (applied, unprocessed) = requests.split_at(requests.len() - withheld);

        for request in applied {
            match request {
                MutationRequest::Put(row) => {
                    state.rows.insert(row.key.clone(), row.clone());
                }
                MutationRequest::Delete(key) => {
                    state.rows.remove(key);
                }
            }
        }

        Ok(unprocessed.to_vec())
    }
}
