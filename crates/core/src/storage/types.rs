use std::collections::BTreeMap;

use crate::keys::{AttributeValue, Row};

/// Describes which rows to enumerate and how.
///
/// Without a partition key the store performs a full scan; with one it runs a
/// query for that partition, optionally narrowed by a sort key prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRequest {
    pub index_name: Option<String>,
    pub partition_key: Option<String>,
    pub sort_key_prefix: Option<String>,
    pub page_size: Option<u32>,
    pub keys_only: bool,
}

impl ScanRequest {
    /// A full-table scan returning whole rows.
    pub fn full_scan() -> Self {
        Self::default()
    }

    /// Enumerate through the named secondary index.
    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Restrict to one partition (switches from scan to query).
    pub fn with_partition(mut self, partition_key: impl Into<String>) -> Self {
        self.partition_key = Some(partition_key.into());
        self
    }

    /// Restrict to sort keys starting with `prefix`.
    pub fn with_sort_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sort_key_prefix = Some(prefix.into());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Only project key attributes.
    pub fn keys_only(mut self) -> Self {
        self.keys_only = true;
        self
    }

    /// Whether this request is a query rather than a scan.
    pub fn is_query(&self) -> bool {
        self.partition_key.is_some()
    }
}

/// Opaque continuation token returned by the store after a page.
///
/// Holds the key attributes of the last evaluated row. Callers only pass it
/// back to the store that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(BTreeMap<String, AttributeValue>);

impl Cursor {
    pub fn from_attributes(attributes: BTreeMap<String, AttributeValue>) -> Self {
        Self(attributes)
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.0
    }

    /// String value of one of the cursor's key attributes.
    pub fn get_s(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(AttributeValue::as_s)
    }
}

/// One page of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub rows: Vec<Row>,
    pub next: Option<Cursor>,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_request_builder() {
        let request = ScanRequest::full_scan()
            .with_index("GSI1")
            .with_partition("DATE#2024-01-01")
            .with_sort_key_prefix("RECEIPT#7")
            .with_page_size(100)
            .keys_only();

        assert!(request.is_query());
        assert_eq!(request.index_name.as_deref(), Some("GSI1"));
        assert_eq!(request.page_size, Some(100));
        assert!(request.keys_only);
        assert!(!ScanRequest::full_scan().is_query());
    }

    #[test]
    fn test_cursor_accessors() {
        let mut attributes = BTreeMap::new();
        attributes.insert("PK".to_string(), AttributeValue::S("RECEIPT#1".into()));
        let cursor = Cursor::from_attributes(attributes);

        assert_eq!(cursor.get_s("PK"), Some("RECEIPT#1"));
        assert_eq!(cursor.get_s("SK"), None);
    }

    #[test]
    fn test_page_is_last() {
        assert!(Page::default().is_last());
    }
}
