//! Key generation functions for receipt line items.
//!
//! Pure functions following the single-table design. All functions are sync
//! and have no side effects.

use chrono::NaiveDate;

use super::types::{IndexKey, PrimaryKey};

// ============================================================================
// Key prefixes
// ============================================================================

pub const RECEIPT_PREFIX: &str = "RECEIPT#";
pub const LINE_PREFIX: &str = "LINE#";
pub const DATE_PREFIX: &str = "DATE#";

/// Sentinel used for any key component that could not be derived.
pub const UNKNOWN: &str = "UNKNOWN";

// ============================================================================
// Line item keys
// ============================================================================

/// Generate partition key for a line item.
///
/// Pattern: `RECEIPT#<receipt_id>` or `RECEIPT#UNKNOWN` when the receipt is
/// missing or blank.
pub fn receipt_pk(receipt_id: Option<&str>) -> String {
    match receipt_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => format!("{RECEIPT_PREFIX}{id}"),
        None => format!("{RECEIPT_PREFIX}{UNKNOWN}"),
    }
}

/// Generate sort key for a line item from its zero-based row index.
///
/// Pattern: `LINE#<row_index + 1>` zero padded to six digits.
pub fn line_sk(row_index: usize) -> String {
    format!("{LINE_PREFIX}{:06}", row_index + 1)
}

/// Generate the primary key for a line item.
pub fn line_item_key(receipt_id: Option<&str>, row_index: usize) -> PrimaryKey {
    PrimaryKey::new(receipt_pk(receipt_id), line_sk(row_index))
}

/// Generate index partition key for a line item (date lookup).
///
/// Pattern: `DATE#<YYYY-MM-DD>` or `DATE#UNKNOWN`.
pub fn date_index_pk(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => format!("{DATE_PREFIX}{}", date.format("%Y-%m-%d")),
        None => format!("{DATE_PREFIX}{UNKNOWN}"),
    }
}

/// Generate index sort key for a line item.
///
/// Pattern: `<PK>#<SK>`. The index sort key is the row's whole primary key
/// rendered as one string, partition key then sort key joined by `#`
/// (`RECEIPT#9#LINE#000003`), not the partition key alone. Entries of the
/// same day therefore enumerate in receipt then line order.
pub fn date_index_sk(key: &PrimaryKey) -> String {
    key.to_string()
}

/// Generate the index projection for a line item.
pub fn line_item_index_key(date: Option<NaiveDate>, key: &PrimaryKey) -> IndexKey {
    IndexKey::new(date_index_pk(date), date_index_sk(key))
}
