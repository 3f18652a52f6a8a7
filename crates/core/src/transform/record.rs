use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::keys::format_number;

/// A decoded source record: column names mapped to loosely typed values.
///
/// Column lookup ignores case, whitespace, `_` and `-`, so `Receipt ID`,
/// `receipt_id` and `RECEIPTID` all name the same column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    pub fn new(columns: Map<String, Value>) -> Self {
        Self(columns)
    }

    /// Returns the first present, non-blank value among `aliases`.
    pub fn get(&self, aliases: &[&str]) -> Option<&Value> {
        aliases.iter().find_map(|alias| {
            let wanted = normalize_column(alias);
            self.0
                .iter()
                .find(|(name, value)| normalize_column(name) == wanted && !is_blank(value))
                .map(|(_, value)| value)
        })
    }

    /// Returns the value among `aliases` rendered as trimmed text.
    pub fn text(&self, aliases: &[&str]) -> Option<String> {
        match self.get(aliases)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => n.as_f64().map(format_number),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(columns: Map<String, Value>) -> Self {
        Self(columns)
    }
}

fn normalize_column(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_lookup_ignores_case_and_spacing() {
        let record = record(json!({ "  Receipt_ID ": "A-1", "AMOUNT": 3 }));

        assert_eq!(record.text(&["receipt id"]), Some("A-1".to_string()));
        assert_eq!(record.text(&["amount"]), Some("3".to_string()));
    }

    #[test]
    fn test_blank_values_fall_through_to_next_alias() {
        let record = record(json!({ "total": "", "price": "9.50", "qty": null }));

        assert_eq!(record.text(&["total", "price"]), Some("9.50".to_string()));
        assert!(record.get(&["qty"]).is_none());
    }

    #[test]
    fn test_missing_column() {
        let record = record(json!({ "merchant": "Shop" }));
        assert!(record.text(&["category"]).is_none());
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_numbers_render_without_trailing_zero() {
        let record = record(json!({ "receipt": 12345.0 }));
        assert_eq!(record.text(&["receipt"]), Some("12345".to_string()));
    }
}
