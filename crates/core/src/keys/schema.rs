//! Table key schema (pure data).

/// Attribute names used to address rows in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table_name: String,
    pub partition_key: String,
    pub sort_key: String,
    pub index: Option<IndexSchema>,
}

/// Secondary index used for alternate enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    pub name: String,
    pub partition_key: String,
    pub sort_key: String,
}

impl TableSchema {
    /// Sets the table name.
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = name.to_string();
        self
    }

    /// Removes the secondary index from the schema.
    pub fn without_index(mut self) -> Self {
        self.index = None;
        self
    }

    /// Names of every key attribute, base table first.
    pub fn key_attribute_names(&self) -> Vec<&str> {
        let mut names = vec![self.partition_key.as_str(), self.sort_key.as_str()];
        if let Some(index) = &self.index {
            names.push(index.partition_key.as_str());
            names.push(index.sort_key.as_str());
        }
        names
    }

    /// Whether `name` is one of the schema's key attributes.
    pub fn is_key_attribute(&self, name: &str) -> bool {
        self.key_attribute_names().contains(&name)
    }

    /// Looks up the index by name, if the schema declares it.
    pub fn index_named(&self, name: &str) -> Option<&IndexSchema> {
        self.index.as_ref().filter(|index| index.name == name)
    }
}

/// Returns the default single-table layout: `PK`/`SK` plus `GSI1`.
/// The table name is left empty and must be supplied by configuration.
pub fn default_table_schema() -> TableSchema {
    TableSchema {
        table_name: String::new(),
        partition_key: "PK".to_string(),
        sort_key: "SK".to_string(),
        index: Some(IndexSchema {
            name: "GSI1".to_string(),
            partition_key: "GSI1PK".to_string(),
            sort_key: "GSI1SK".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_key_names() {
        let schema = default_table_schema().with_table_name("receipts");
        assert_eq!(schema.table_name, "receipts");
        assert_eq!(
            schema.key_attribute_names(),
            vec!["PK", "SK", "GSI1PK", "GSI1SK"]
        );
        assert!(schema.is_key_attribute("GSI1SK"));
        assert!(!schema.is_key_attribute("amount"));
    }

    #[test]
    fn test_without_index() {
        let schema = default_table_schema().without_index();
        assert_eq!(schema.key_attribute_names(), vec!["PK", "SK"]);
        assert!(schema.index_named("GSI1").is_none());
    }

    #[test]
    fn test_index_named() {
        let schema = default_table_schema();
        assert!(schema.index_named("GSI1").is_some());
        assert!(schema.index_named("GSI2").is_none());
    }
}
