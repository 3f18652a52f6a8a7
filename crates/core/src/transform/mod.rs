//! Record-to-row transform for the load workflow.

mod dates;
mod line_item;
mod numbers;
mod record;

pub use dates::{
    normalize_date, parse_date_str, serial_to_date, SECONDS_PER_DAY, SERIAL_EPOCH_OFFSET_DAYS,
};
pub use line_item::{record_to_row, ImportContext, LineItem, ENTITY_TYPE_LINE_ITEM};
pub use numbers::{parse_number, parse_number_str};
pub use record::RawRecord;
