use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::keys::{self, AttributeValue, PrimaryKey, Row, UNKNOWN};

use super::dates::normalize_date;
use super::numbers::parse_number;
use super::record::RawRecord;

pub const ENTITY_TYPE_LINE_ITEM: &str = "LINE_ITEM";

const RECEIPT_COLUMNS: &[&str] = &[
    "receipt id",
    "receipt",
    "receipt number",
    "receipt no",
    "receipt #",
];
const DATE_COLUMNS: &[&str] = &["date", "transaction date", "purchase date", "receipt date"];
const MERCHANT_COLUMNS: &[&str] = &["merchant", "store", "vendor"];
const DESCRIPTION_COLUMNS: &[&str] = &["description", "item", "item description", "product"];
const CATEGORY_COLUMNS: &[&str] = &["category"];
const QUANTITY_COLUMNS: &[&str] = &["quantity", "qty"];
const AMOUNT_COLUMNS: &[&str] = &["amount", "line total", "total", "price"];

/// A typed receipt line item extracted from a [`RawRecord`].
///
/// Extraction never fails: unparsable dates become `None` (stored as
/// `UNKNOWN`) and unparsable numbers become `None` (stored as null).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Zero-based position of the record in its source.
    pub row_index: usize,
    pub receipt_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub merchant: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub amount: Option<f64>,
}

/// Values shared by every row written in one load run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportContext {
    pub import_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ImportContext {
    pub fn new(import_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            import_id,
            created_at,
        }
    }
}

impl LineItem {
    /// Extracts a line item from the record at `row_index`.
    pub fn from_record(row_index: usize, record: &RawRecord) -> Self {
        Self {
            row_index,
            receipt_id: record.text(RECEIPT_COLUMNS).filter(|id| !id.is_empty()),
            date: record.get(DATE_COLUMNS).and_then(normalize_date),
            merchant: record.text(MERCHANT_COLUMNS),
            description: record.text(DESCRIPTION_COLUMNS),
            category: record.text(CATEGORY_COLUMNS),
            quantity: record.get(QUANTITY_COLUMNS).and_then(parse_number),
            amount: record.get(AMOUNT_COLUMNS).and_then(parse_number),
        }
    }

    /// Line number within the source, starting at 1.
    pub fn line_number(&self) -> usize {
        self.row_index + 1
    }

    pub fn key(&self) -> PrimaryKey {
        keys::line_item_key(self.receipt_id.as_deref(), self.row_index)
    }

    /// `YYYY-MM-DD`, or `UNKNOWN` when the date could not be derived.
    pub fn date_token(&self) -> String {
        self.date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Builds the stored row, keys and index projection included.
    pub fn to_row(&self, context: &ImportContext) -> Row {
        let key = self.key();
        let index_key = keys::line_item_index_key(self.date, &key);

        let mut row = Row::new(key)
            .with_index_key(index_key)
            .with_attribute(
                "entityType",
                AttributeValue::S(ENTITY_TYPE_LINE_ITEM.to_string()),
            )
            .with_attribute(
                "receiptId",
                AttributeValue::S(
                    self.receipt_id
                        .clone()
                        .unwrap_or_else(|| UNKNOWN.to_string()),
                ),
            )
            .with_attribute(
                "lineNumber",
                AttributeValue::N(self.line_number().to_string()),
            )
            .with_attribute("date", AttributeValue::S(self.date_token()))
            .with_attribute("quantity", AttributeValue::number(self.quantity))
            .with_attribute("amount", AttributeValue::number(self.amount))
            .with_attribute(
                "importId",
                AttributeValue::S(context.import_id.to_string()),
            )
            .with_attribute(
                "createdAt",
                AttributeValue::S(context.created_at.to_rfc3339()),
            );

        if let Some(merchant) = &self.merchant {
            row = row.with_attribute("merchant", AttributeValue::S(merchant.clone()));
        }
        if let Some(description) = &self.description {
            row = row.with_attribute("description", AttributeValue::S(description.clone()));
        }
        if let Some(category) = &self.category {
            row = row.with_attribute("category", AttributeValue::S(category.clone()));
        }

        row
    }
}

/// Transforms the record at `row_index` straight into a stored row.
pub fn record_to_row(row_index: usize, record: &RawRecord, context: &ImportContext) -> Row {
    LineItem::from_record(row_index, record).to_row(context)
}
