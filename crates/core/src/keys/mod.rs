mod derive;
mod schema;
mod types;

pub use derive::{
    date_index_pk, date_index_sk, line_item_index_key, line_item_key, line_sk, receipt_pk,
    DATE_PREFIX, LINE_PREFIX, RECEIPT_PREFIX, UNKNOWN,
};
pub use schema::{default_table_schema, IndexSchema, TableSchema};
pub use types::{format_number, AttributeValue, IndexKey, PrimaryKey, Row};
