//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and the
//! core row, key and request types. These are testable in isolation without
//! DynamoDB access.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, PutRequest, WriteRequest};
use bulkstore_core::batch::MutationRequest;
use bulkstore_core::keys::{self, IndexKey, PrimaryKey, Row, TableSchema};
use bulkstore_core::storage::{Cursor, StoreError};

pub type Item = HashMap<String, AttributeValue>;

// ============================================================================
// Scalar values
// ============================================================================

/// Convert a core attribute value to its DynamoDB form.
pub fn to_sdk_value(value: &keys::AttributeValue) -> AttributeValue {
    match value {
        keys::AttributeValue::S(s) => AttributeValue::S(s.clone()),
        keys::AttributeValue::N(n) => AttributeValue::N(n.clone()),
        keys::AttributeValue::Bool(b) => AttributeValue::Bool(*b),
        keys::AttributeValue::Null => AttributeValue::Null(true),
    }
}

/// Convert a DynamoDB attribute to a core value.
///
/// Returns `None` for sets, lists, maps and binary values, which rows do not
/// carry.
pub fn from_sdk_value(value: &AttributeValue) -> Option<keys::AttributeValue> {
    match value {
        AttributeValue::S(s) => Some(keys::AttributeValue::S(s.clone())),
        AttributeValue::N(n) => Some(keys::AttributeValue::N(n.clone())),
        AttributeValue::Bool(b) => Some(keys::AttributeValue::Bool(*b)),
        AttributeValue::Null(_) => Some(keys::AttributeValue::Null),
        _ => None,
    }
}

// ============================================================================
// Keys and rows
// ============================================================================

/// Convert a primary key to a DynamoDB key map.
pub fn key_to_item(key: &PrimaryKey, schema: &TableSchema) -> Item {
    let mut item = HashMap::new();
    item.insert(
        schema.partition_key.clone(),
        AttributeValue::S(key.partition_key.clone()),
    );
    item.insert(
        schema.sort_key.clone(),
        AttributeValue::S(key.sort_key.clone()),
    );
    item
}

/// Convert a DynamoDB item (or key map) to a primary key.
pub fn item_to_key(item: &Item, schema: &TableSchema) -> Result<PrimaryKey, StoreError> {
    Ok(PrimaryKey {
        partition_key: get_string(item, &schema.partition_key)?,
        sort_key: get_string(item, &schema.sort_key)?,
    })
}

/// Convert a Row to a DynamoDB item.
///
/// Key attributes always come from the row's keys, never from its attribute map.
pub fn row_to_item(row: &Row, schema: &TableSchema) -> Item {
    let mut item: Item = row
        .attributes
        .iter()
        .filter(|(name, _)| !schema.is_key_attribute(name))
        .map(|(name, value)| (name.clone(), to_sdk_value(value)))
        .collect();

    item.extend(key_to_item(&row.key, schema));

    if let (Some(index), Some(index_key)) = (&schema.index, &row.index_key) {
        item.insert(
            index.partition_key.clone(),
            AttributeValue::S(index_key.partition_key.clone()),
        );
        item.insert(
            index.sort_key.clone(),
            AttributeValue::S(index_key.sort_key.clone()),
        );
    }

    item
}

/// Convert a DynamoDB item to a Row.
pub fn item_to_row(item: &Item, schema: &TableSchema) -> Result<Row, StoreError> {
    let key = item_to_key(item, schema)?;

    let index_key = schema.index.as_ref().and_then(|index| {
        Some(IndexKey {
            partition_key: get_optional_string(item, &index.partition_key)?,
            sort_key: get_optional_string(item, &index.sort_key)?,
        })
    });

    let attributes: BTreeMap<_, _> = item
        .iter()
        .filter(|(name, _)| !schema.is_key_attribute(name))
        .filter_map(|(name, value)| from_sdk_value(value).map(|v| (name.clone(), v)))
        .collect();

    Ok(Row {
        key,
        index_key,
        attributes,
    })
}

// ============================================================================
// Write requests
// ============================================================================

/// Convert a mutation request to a DynamoDB write request.
pub fn to_write_request(
    request: &MutationRequest,
    schema: &TableSchema,
) -> Result<WriteRequest, StoreError> {
    let write_request = match request {
        MutationRequest::Put(row) => WriteRequest::builder()
            .put_request(
                PutRequest::builder()
                    .set_item(Some(row_to_item(row, schema)))
                    .build()
                    .map_err(|e| StoreError::InvalidData(format!("PutRequest: {}", e)))?,
            )
            .build(),
        MutationRequest::Delete(key) => WriteRequest::builder()
            .delete_request(
                DeleteRequest::builder()
                    .set_key(Some(key_to_item(key, schema)))
                    .build()
                    .map_err(|e| StoreError::InvalidData(format!("DeleteRequest: {}", e)))?,
            )
            .build(),
    };
    Ok(write_request)
}

/// Primary key and kind (`"put"` or `"delete"`) of an unprocessed write request.
pub fn write_request_key(
    request: &WriteRequest,
    schema: &TableSchema,
) -> Result<(PrimaryKey, &'static str), StoreError> {
    if let Some(put) = request.put_request() {
        return Ok((item_to_key(put.item(), schema)?, "put"));
    }
    if let Some(delete) = request.delete_request() {
        return Ok((item_to_key(delete.key(), schema)?, "delete"));
    }
    Err(StoreError::InvalidData(
        "Write request has neither a put nor a delete".to_string(),
    ))
}

/// Find the submitted request an unprocessed write request refers to.
pub fn match_unprocessed(
    unprocessed: &WriteRequest,
    submitted: &[MutationRequest],
    schema: &TableSchema,
) -> Result<MutationRequest, StoreError> {
    let (key, kind) = write_request_key(unprocessed, schema)?;
    submitted
        .iter()
        .find(|request| request.key() == &key && request.kind() == kind)
        .cloned()
        .ok_or_else(|| {
            StoreError::InvalidData(format!("Unprocessed item {} was never submitted", key))
        })
}

// ============================================================================
// Cursors
// ============================================================================

/// Convert a cursor back to an `ExclusiveStartKey`.
pub fn cursor_to_item(cursor: &Cursor) -> Item {
    cursor
        .attributes()
        .iter()
        .map(|(name, value)| (name.clone(), to_sdk_value(value)))
        .collect()
}

/// Convert a `LastEvaluatedKey` to a cursor. Empty keys mean exhaustion.
pub fn item_to_cursor(item: Option<Item>) -> Option<Cursor> {
    let item = item.filter(|item| !item.is_empty())?;
    Some(Cursor::from_attributes(
        item.iter()
            .filter_map(|(name, value)| from_sdk_value(value).map(|v| (name.clone(), v)))
            .collect(),
    ))
}

// ============================================================================
// Helper functions
// ============================================================================

/// Get a required string attribute.
fn get_string(item: &Item, key: &str) -> Result<String, StoreError> {
    get_optional_string(item, key)
        .ok_or_else(|| StoreError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get an optional string attribute.
fn get_optional_string(item: &Item, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
}
