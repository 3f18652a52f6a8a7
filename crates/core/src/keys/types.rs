use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar attribute value stored alongside a row.
///
/// Numbers keep their decimal string representation so nothing is lost
/// between the record source and the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
    Bool(bool),
    Null,
}

impl AttributeValue {
    /// Returns the string payload of an `S` value.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the string payload of an `N` value.
    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttributeValue::N(n) => Some(n),
            _ => None,
        }
    }

    /// Builds an `N` value from a float, or `Null` when absent or not finite.
    pub fn number(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => AttributeValue::N(format_number(v)),
            _ => AttributeValue::Null,
        }
    }
}

/// Formats a float without a trailing `.0` for integral values.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Composite primary key addressing exactly one row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub partition_key: String,
    pub sort_key: String,
}

impl PrimaryKey {
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.partition_key, self.sort_key)
    }
}

/// Secondary index projection of a row. Not required to be unique.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexKey {
    pub partition_key: String,
    pub sort_key: String,
}

impl IndexKey {
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }
}

/// A stored record: its primary key, an optional index projection and
/// the remaining attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub key: PrimaryKey,
    pub index_key: Option<IndexKey>,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Row {
    /// Creates a row with no index projection and no attributes.
    pub fn new(key: PrimaryKey) -> Self {
        Self {
            key,
            index_key: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Sets the index projection for this row.
    pub fn with_index_key(mut self, index_key: IndexKey) -> Self {
        self.index_key = Some(index_key);
        self
    }

    /// Adds or replaces an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Returns an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}
