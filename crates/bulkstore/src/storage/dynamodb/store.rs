//! DynamoDB store implementation.
//!
//! Implements `KeyValueStore` from `bulkstore_core::storage` using DynamoDB.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use bulkstore_core::batch::MutationRequest;
use bulkstore_core::keys::TableSchema;
use bulkstore_core::storage::{Cursor, KeyValueStore, Page, Result, ScanRequest, StoreError};

use super::conversions::{
    cursor_to_item, item_to_cursor, item_to_row, match_unprocessed, to_write_request, Item,
};
use super::error::{
    map_batch_write_error, map_describe_table_error, map_query_error, map_scan_error,
};

/// DynamoDB-backed store for a single table.
pub struct DynamoDbStore {
    client: Client,
    schema: TableSchema,
}

/// Expression pieces shared by scans and queries.
#[derive(Debug, Default, PartialEq)]
struct Expressions {
    key_condition: Option<String>,
    filter: Option<String>,
    projection: Option<String>,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl DynamoDbStore {
    /// Creates a new store with the given DynamoDB client and table schema.
    pub fn new(client: Client, schema: TableSchema) -> Self {
        Self { client, schema }
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.schema.table_name
    }

    /// Fails with `TableNotFound` unless the table exists.
    pub async fn ensure_table(&self) -> Result<()> {
        self.client
            .describe_table()
            .table_name(self.table_name())
            .send()
            .await
            .map_err(|e| map_describe_table_error(e, self.table_name()))?;
        Ok(())
    }

    /// Builds the expressions for `request` against this table's schema.
    fn expressions(&self, request: &ScanRequest) -> Result<Expressions> {
        build_expressions(&self.schema, request)
    }
}

fn build_expressions(schema: &TableSchema, request: &ScanRequest) -> Result<Expressions> {
    let (pk_name, sk_name) = match &request.index_name {
        Some(name) => {
            let index = schema
                .index_named(name)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown index: {}", name)))?;
            (index.partition_key.as_str(), index.sort_key.as_str())
        }
        None => (schema.partition_key.as_str(), schema.sort_key.as_str()),
    };

    let mut exprs = Expressions::default();

    let prefix_condition = request.sort_key_prefix.as_ref().map(|prefix| {
        exprs.names.insert("#sk".to_string(), sk_name.to_string());
        exprs
            .values
            .insert(":prefix".to_string(), AttributeValue::S(prefix.clone()));
        "begins_with(#sk, :prefix)".to_string()
    });

    match &request.partition_key {
        Some(partition) => {
            exprs.names.insert("#pk".to_string(), pk_name.to_string());
            exprs
                .values
                .insert(":pk".to_string(), AttributeValue::S(partition.clone()));
            exprs.key_condition = Some(match prefix_condition {
                Some(condition) => format!("#pk = :pk AND {}", condition),
                None => "#pk = :pk".to_string(),
            });
        }
        None => exprs.filter = prefix_condition,
    }

    if request.keys_only {
        let placeholders: Vec<String> = schema
            .key_attribute_names()
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let placeholder = format!("#k{}", i);
                exprs.names.insert(placeholder.clone(), name.to_string());
                placeholder
            })
            .collect();
        exprs.projection = Some(placeholders.join(", "));
    }

    Ok(exprs)
}

fn non_empty<K, V>(map: HashMap<K, V>) -> Option<HashMap<K, V>> {
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn page_limit(request: &ScanRequest) -> Option<i32> {
    request
        .page_size
        .map(|size| i32::try_from(size).unwrap_or(i32::MAX))
}

#[async_trait]
impl KeyValueStore for DynamoDbStore {
    async fn scan_page(&self, request: &ScanRequest, cursor: Option<Cursor>) -> Result<Page> {
        let exprs = self.expressions(request)?;
        let start_key = cursor.as_ref().map(cursor_to_item);

        let (items, last_evaluated_key): (Vec<Item>, Option<Item>) = match exprs.key_condition {
            Some(key_condition) => {
                let output = self
                    .client
                    .query()
                    .table_name(self.table_name())
                    .set_index_name(request.index_name.clone())
                    .key_condition_expression(key_condition)
                    .set_filter_expression(exprs.filter)
                    .set_projection_expression(exprs.projection)
                    .set_expression_attribute_names(non_empty(exprs.names))
                    .set_expression_attribute_values(non_empty(exprs.values))
                    .set_exclusive_start_key(start_key)
                    .set_limit(page_limit(request))
                    .send()
                    .await
                    .map_err(|e| map_query_error(e, self.table_name()))?;
                (output.items.unwrap_or_default(), output.last_evaluated_key)
            }
            None => {
                let output = self
                    .client
                    .scan()
                    .table_name(self.table_name())
                    .set_index_name(request.index_name.clone())
                    .set_filter_expression(exprs.filter)
                    .set_projection_expression(exprs.projection)
                    .set_expression_attribute_names(non_empty(exprs.names))
                    .set_expression_attribute_values(non_empty(exprs.values))
                    .set_exclusive_start_key(start_key)
                    .set_limit(page_limit(request))
                    .send()
                    .await
                    .map_err(|e| map_scan_error(e, self.table_name()))?;
                (output.items.unwrap_or_default(), output.last_evaluated_key)
            }
        };

        let rows = items
            .iter()
            .map(|item| item_to_row(item, &self.schema))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            table = %self.table_name(),
            rows = rows.len(),
            more = last_evaluated_key.is_some(),
            "Read page"
        );

        Ok(Page {
            rows,
            next: item_to_cursor(last_evaluated_key),
        })
    }

    async fn batch_write(&self, requests: &[MutationRequest]) -> Result<Vec<MutationRequest>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let write_requests = requests
            .iter()
            .map(|request| to_write_request(request, &self.schema))
            .collect::<Result<Vec<_>>>()?;

        let output = self
            .client
            .batch_write_item()
            .request_items(self.table_name(), write_requests)
            .send()
            .await
            .map_err(|e| map_batch_write_error(e, self.table_name()))?;

        let unprocessed = output
            .unprocessed_items
            .unwrap_or_default()
            .remove(self.table_name())
            .unwrap_or_default();

        unprocessed
            .iter()
            .map(|write_request| match_unprocessed(write_request, requests, &self.schema))
            .collect()
    }
}
