//! Record source: a JSON array of objects, or one object per line.

use std::path::Path;

use bulkstore_core::transform::RawRecord;

use crate::error::SourceError;

/// Reads every record from `path`, in file order.
pub async fn read_records(path: &Path) -> Result<Vec<RawRecord>, SourceError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let records = parse_records(&contents).map_err(|(line, source)| SourceError::Parse {
        path: path.to_path_buf(),
        line,
        source,
    })?;

    tracing::debug!(path = %path.display(), records = records.len(), "Records read");
    Ok(records)
}

/// Parses a JSON array or JSON lines. Errors carry the one-based line.
fn parse_records(contents: &str) -> Result<Vec<RawRecord>, (usize, serde_json::Error)> {
    if contents.trim_start().starts_with('[') {
        return serde_json::from_str(contents).map_err(|e| (e.line(), e));
    }

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| serde_json::from_str(line).map_err(|e| (index + 1, e)))
        .collect()
}
