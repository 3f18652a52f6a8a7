use std::path::{Path, PathBuf};
use std::time::Duration;

use bulkstore_core::batch::{validate_batch_size, MAX_BATCH_SIZE};
use bulkstore_core::keys::{default_table_schema, TableSchema};
use bulkstore_core::progress::DEFAULT_PROGRESS_EVERY;
use bulkstore_core::retry::RetryPolicy;
use bulkstore_core::storage::ScanRequest;

use crate::engine::PipelineSettings;
use crate::error::ConfigError;

/// Rows requested per page when enumerating.
pub const DEFAULT_PAGE_SIZE: u32 = 1_000;

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub schema: TableSchema,
    pub max_batch_size: usize,
    pub retry: RetryPolicy,
    /// Chunks between progress notifications.
    pub progress_every: u64,
    pub page_size: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schema: default_table_schema(),
            max_batch_size: MAX_BATCH_SIZE,
            retry: RetryPolicy::default(),
            progress_every: DEFAULT_PROGRESS_EVERY,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PipelineConfig {
    /// Starts from the defaults for the given table.
    pub fn for_table(table_name: Option<&str>) -> Result<Self, ConfigError> {
        let table_name = table_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ConfigError::MissingTableName)?;

        Ok(Self {
            schema: default_table_schema().with_table_name(table_name),
            ..Self::default()
        })
    }

    pub fn with_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn with_retry(mut self, max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.retry = RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(base_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        };
        self
    }

    pub fn with_progress_every(mut self, progress_every: u64) -> Self {
        self.progress_every = progress_every;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Checks every setting before anything touches the store.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.schema.table_name.is_empty() {
            return Err(ConfigError::MissingTableName);
        }
        validate_batch_size(self.max_batch_size)?;
        self.retry.validate()?;
        if self.progress_every == 0 {
            return Err(ConfigError::InvalidProgressInterval);
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        Ok(self)
    }

    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            max_batch_size: self.max_batch_size,
            retry: self.retry,
            progress_every: self.progress_every,
        }
    }

    /// Builds the enumeration for a purge scope.
    pub fn scan_request(
        &self,
        index_name: Option<&str>,
        partition_key: Option<&str>,
        sort_key_prefix: Option<&str>,
    ) -> Result<ScanRequest, ConfigError> {
        if sort_key_prefix.is_some() && partition_key.is_none() {
            return Err(ConfigError::PrefixWithoutPartition);
        }
        if let Some(name) = index_name {
            if self.schema.index_named(name).is_none() {
                return Err(ConfigError::UnknownIndex(name.to_string()));
            }
        }

        let mut request = ScanRequest::full_scan().with_page_size(self.page_size);
        if let Some(index_name) = index_name {
            request = request.with_index(index_name);
        }
        if let Some(partition_key) = partition_key {
            request = request.with_partition(partition_key);
        }
        if let Some(prefix) = sort_key_prefix {
            request = request.with_sort_key_prefix(prefix);
        }
        Ok(request)
    }
}

/// Resolves the record source path, failing early when it does not exist.
pub fn resolve_source(source: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = source.ok_or(ConfigError::MissingSource)?;
    if !path.is_file() {
        return Err(ConfigError::SourceNotFound(path.to_path_buf()));
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkstore_core::batch::BatchError;
    use bulkstore_core::retry::RetryError;

    fn config() -> PipelineConfig {
        PipelineConfig::for_table(Some("receipts")).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config().validate().unwrap();

        assert_eq!(config.schema.table_name, "receipts");
        assert_eq!(config.max_batch_size, 25);
        assert_eq!(config.progress_every, 20);
        assert_eq!(config.retry.max_attempts, 8);
        assert_eq!(config.retry.base_delay, Duration::from_millis(250));
        assert_eq!(config.retry.max_delay, Duration::from_millis(4000));
    }

    #[test]
    fn test_missing_table_name() {
        assert!(matches!(
            PipelineConfig::for_table(None),
            Err(ConfigError::MissingTableName)
        ));
        assert!(matches!(
            PipelineConfig::for_table(Some("  ")),
            Err(ConfigError::MissingTableName)
        ));
        assert!(matches!(
            PipelineConfig::default().validate(),
            Err(ConfigError::MissingTableName)
        ));
    }

    #[test]
    fn test_batch_size_bounds() {
        assert!(matches!(
            config().with_batch_size(0).validate(),
            Err(ConfigError::Batch(BatchError::InvalidBatchSize { size: 0, .. }))
        ));
        assert!(config().with_batch_size(26).validate().is_err());
        assert!(config().with_batch_size(1).validate().is_ok());
    }

    #[test]
    fn test_retry_policy_validation() {
        assert!(matches!(
            config().with_retry(0, 250, 4000).validate(),
            Err(ConfigError::Retry(RetryError::InvalidPolicy(_)))
        ));
        assert!(config().with_retry(3, 5000, 4000).validate().is_err());
    }

    #[test]
    fn test_zero_intervals_rejected() {
        assert!(matches!(
            config().with_progress_every(0).validate(),
            Err(ConfigError::InvalidProgressInterval)
        ));
        assert!(matches!(
            config().with_page_size(0).validate(),
            Err(ConfigError::InvalidPageSize)
        ));
    }

    #[test]
    fn test_scan_request_scope() {
        let config = config().with_page_size(50);

        let request = config
            .scan_request(Some("GSI1"), Some("DATE#2024-01-01"), None)
            .unwrap();
        assert_eq!(request.index_name.as_deref(), Some("GSI1"));
        assert_eq!(request.partition_key.as_deref(), Some("DATE#2024-01-01"));
        assert_eq!(request.page_size, Some(50));

        assert!(matches!(
            config.scan_request(None, None, Some("RECEIPT#")),
            Err(ConfigError::PrefixWithoutPartition)
        ));
        assert!(matches!(
            config.scan_request(Some("GSI7"), Some("X"), None),
            Err(ConfigError::UnknownIndex(name)) if name == "GSI7"
        ));
    }

    #[test]
    fn test_resolve_source() {
        assert!(matches!(resolve_source(None), Err(ConfigError::MissingSource)));
        assert!(matches!(
            resolve_source(Some(Path::new("/definitely/not/here.json"))),
            Err(ConfigError::SourceNotFound(_))
        ));
    }
}
