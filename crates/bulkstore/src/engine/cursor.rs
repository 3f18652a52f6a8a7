//! Lazy row enumeration over a paged store.

use futures_util::Stream;

use bulkstore_core::keys::Row;
use bulkstore_core::storage::{Cursor, KeyValueStore, ScanRequest, StoreError};

/// Streams every row matched by `request`, one store read per page.
///
/// Pages are fetched only as the stream is polled. A read failure is yielded
/// once and ends the stream; reads are never retried.
pub fn rows<'a, S>(
    store: &'a S,
    request: &'a ScanRequest,
) -> impl Stream<Item = Result<Row, StoreError>> + 'a
where
    S: KeyValueStore + ?Sized,
{
    async_stream::stream! {
        let mut cursor: Option<Cursor> = None;
        let mut page_number = 0u64;

        loop {
            page_number += 1;
            let page = match store.scan_page(request, cursor.take()).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(page = page_number, error = %e, "Failed to read page");
                    yield Err(e);
                    break;
                }
            };

            tracing::trace!(page = page_number, rows = page.rows.len(), "Page fetched");

            for row in page.rows {
                yield Ok(row);
            }

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
    }
}

/// Counts the rows matched by `request` without mutating anything.
pub async fn count_rows<S>(store: &S, request: &ScanRequest) -> Result<u64, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    use futures_util::StreamExt;

    let stream = rows(store, request);
    futures_util::pin_mut!(stream);

    let mut count = 0u64;
    while let Some(row) = stream.next().await {
        row?;
        count += 1;
    }
    Ok(count)
}
