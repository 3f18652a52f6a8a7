//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StoreError` from `bulkstore_core::storage`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use bulkstore_core::storage::StoreError;

/// Map a Scan SDK error to StoreError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
    table_name: &str,
) -> StoreError {
    match err.into_service_error() {
        ScanError::ResourceNotFoundException(_) => StoreError::TableNotFound {
            table_name: table_name.to_string(),
        },
        ScanError::ProvisionedThroughputExceededException(_) => {
            StoreError::ReadFailed("Throughput exceeded".to_string())
        }
        ScanError::RequestLimitExceeded(_) => {
            StoreError::ReadFailed("Request limit exceeded".to_string())
        }
        ScanError::InternalServerError(_) => {
            StoreError::ReadFailed("DynamoDB internal server error".to_string())
        }
        err => StoreError::ReadFailed(format!("Scan failed: {:?}", err)),
    }
}

/// Map a Query SDK error to StoreError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
    table_name: &str,
) -> StoreError {
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => StoreError::TableNotFound {
            table_name: table_name.to_string(),
        },
        QueryError::ProvisionedThroughputExceededException(_) => {
            StoreError::ReadFailed("Throughput exceeded".to_string())
        }
        QueryError::RequestLimitExceeded(_) => {
            StoreError::ReadFailed("Request limit exceeded".to_string())
        }
        QueryError::InternalServerError(_) => {
            StoreError::ReadFailed("DynamoDB internal server error".to_string())
        }
        err => StoreError::ReadFailed(format!("Query failed: {:?}", err)),
    }
}

/// Map a BatchWriteItem SDK error to StoreError.
///
/// Throttling of individual items is reported through `UnprocessedItems`, not
/// through this path; an error here means the whole call was rejected.
pub fn map_batch_write_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchWriteItemError, R>,
    table_name: &str,
) -> StoreError {
    match err.into_service_error() {
        BatchWriteItemError::ResourceNotFoundException(_) => StoreError::TableNotFound {
            table_name: table_name.to_string(),
        },
        BatchWriteItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::WriteFailed("Throughput exceeded".to_string())
        }
        BatchWriteItemError::RequestLimitExceeded(_) => {
            StoreError::WriteFailed("Request limit exceeded".to_string())
        }
        BatchWriteItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::WriteFailed("Item collection size limit exceeded".to_string())
        }
        BatchWriteItemError::InternalServerError(_) => {
            StoreError::WriteFailed("DynamoDB internal server error".to_string())
        }
        err => StoreError::WriteFailed(format!("BatchWriteItem failed: {:?}", err)),
    }
}

/// Map a DescribeTable SDK error to StoreError.
pub fn map_describe_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DescribeTableError, R>,
    table_name: &str,
) -> StoreError {
    match err.into_service_error() {
        DescribeTableError::ResourceNotFoundException(_) => StoreError::TableNotFound {
            table_name: table_name.to_string(),
        },
        DescribeTableError::InternalServerError(_) => {
            StoreError::ReadFailed("DynamoDB internal server error".to_string())
        }
        err => StoreError::ConnectionFailed(format!("DescribeTable failed: {:?}", err)),
    }
}
