//! Console output: colored status lines, preview table and summaries.

use serde_json::json;

use bulkstore_core::progress::ProgressCounter;
use bulkstore_core::transform::LineItem;

use crate::engine::{PipelineSummary, ProgressSink};
use crate::error::PipelineError;

pub use anstream::println as aprintln;

/// Tokyo Night color palette
pub mod colors {
    pub const RESET: &str = "\x1b[0m";

    pub const TKN_RED: &str = "\x1b[38;2;247;118;142m"; // #f7768e
    pub const TKN_GREEN: &str = "\x1b[38;2;158;206;106m"; // #9ece6a
    pub const TKN_YELLOW: &str = "\x1b[38;2;224;175;104m"; // #e0af68
    pub const TKN_BLUE: &str = "\x1b[38;2;122;162;247m"; // #7aa2f7
    pub const TKN_CYAN: &str = "\x1b[38;2;125;207;255m"; // #7dcfff
}

fn paint(color: &str, text: &str) -> String {
    format!("{}{}{}", color, text, colors::RESET)
}

pub fn p_g(text: &str) -> String {
    paint(colors::TKN_GREEN, text)
}

pub fn p_r(text: &str) -> String {
    paint(colors::TKN_RED, text)
}

pub fn p_y(text: &str) -> String {
    paint(colors::TKN_YELLOW, text)
}

pub fn p_b(text: &str) -> String {
    paint(colors::TKN_BLUE, text)
}

pub fn p_c(text: &str) -> String {
    paint(colors::TKN_CYAN, text)
}

/// Summary output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

/// Prints pipeline lifecycle lines to the terminal.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleProgress {
    silent: bool,
}

impl ConsoleProgress {
    pub fn new(silent: bool) -> Self {
        Self { silent }
    }
}

impl ProgressSink for ConsoleProgress {
    fn started(&self, operation: &str) {
        if !self.silent {
            aprintln!("{} {}", p_b("Starting"), operation);
        }
    }

    fn progress(&self, operation: &str, counter: &ProgressCounter) {
        if !self.silent {
            aprintln!(
                "  {} {} request(s) applied ({} chunk(s), {} retr{})",
                p_c(&format!("[{}]", operation)),
                counter.requests_applied,
                counter.chunks_completed,
                counter.retries,
                if counter.retries == 1 { "y" } else { "ies" }
            );
        }
    }

    fn finished(&self, _operation: &str, _summary: &PipelineSummary) {}

    fn failed(&self, operation: &str, error: &PipelineError) {
        if let Some(line) = self.failure_line(operation, error) {
            aprintln!("{}", line);
        }
    }
}

impl ConsoleProgress {
    /// Status line for a failed run, `None` when stdout belongs to the summary.
    fn failure_line(&self, operation: &str, error: &PipelineError) -> Option<String> {
        if self.silent {
            return None;
        }
        Some(format!(
            "{} {} stopped after {} applied request(s)",
            p_r("Failed:"),
            operation,
            error.applied()
        ))
    }
}

/// JSON form of a summary.
pub fn summary_json(summary: &PipelineSummary, dry_run: bool) -> serde_json::Value {
    json!({
        "operation": summary.operation,
        "dryRun": dry_run,
        "rowsEnumerated": summary.counter.rows_enumerated,
        "requestsApplied": summary.counter.requests_applied,
        "chunksCompleted": summary.counter.chunks_completed,
        "retries": summary.counter.retries,
        "elapsedMs": summary.elapsed.as_millis() as u64,
    })
}

/// Prints the final summary in the requested format.
pub fn print_summary(summary: &PipelineSummary, format: OutputFormat, silent: bool) {
    match format {
        OutputFormat::Json => aprintln!("{}", summary_json(summary, false)),
        OutputFormat::Pretty if silent => {}
        OutputFormat::Pretty => {
            aprintln!(
                "{} {} complete: {} request(s) applied in {} chunk(s), {} retr{}, {:.2}s",
                p_g("Done."),
                summary.operation,
                summary.counter.requests_applied,
                summary.counter.chunks_completed,
                summary.counter.retries,
                if summary.counter.retries == 1 { "y" } else { "ies" },
                summary.elapsed.as_secs_f64()
            );
        }
    }
}

/// Prints the result of a dry run that only counted rows.
pub fn print_dry_run(operation: &str, rows: u64, format: OutputFormat, silent: bool) {
    match format {
        OutputFormat::Json => aprintln!(
            "{}",
            json!({ "operation": operation, "dryRun": true, "rowsEnumerated": rows })
        ),
        OutputFormat::Pretty if silent => {}
        OutputFormat::Pretty => aprintln!(
            "{} {} would affect {} row(s); nothing was written",
            p_y("Dry run:"),
            operation,
            rows
        ),
    }
}

const PREVIEW_HEADERS: [&str; 7] = ["line", "receipt", "date", "merchant", "description", "qty", "amount"];

fn preview_cells(item: &LineItem) -> [String; 7] {
    let number = |value: Option<f64>| {
        value
            .map(bulkstore_core::keys::format_number)
            .unwrap_or_else(|| "-".to_string())
    };
    [
        item.line_number().to_string(),
        item.receipt_id.clone().unwrap_or_else(|| "UNKNOWN".to_string()),
        item.date_token(),
        item.merchant.clone().unwrap_or_default(),
        item.description.clone().unwrap_or_default(),
        number(item.quantity),
        number(item.amount),
    ]
}

/// Renders the preview as aligned plain-text lines, header first.
pub fn preview_lines(items: &[LineItem]) -> Vec<String> {
    let rows: Vec<[String; 7]> = items.iter().map(preview_cells).collect();

    let mut widths = PREVIEW_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = PREVIEW_HEADERS.iter().map(|h| h.to_string()).collect();
    std::iter::once(render(&header))
        .chain(rows.iter().map(|row| render(row)))
        .collect()
}

pub fn print_preview(items: &[LineItem], total: usize) {
    aprintln!("{} first {} of {} record(s)", p_b("Preview:"), items.len(), total);
    let mut lines = preview_lines(items).into_iter();
    if let Some(header) = lines.next() {
        aprintln!("  {}", p_c(&header));
    }
    for line in lines {
        aprintln!("  {}", line);
    }
    aprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use bulkstore_core::storage::StoreError;
    use bulkstore_core::transform::RawRecord;
    use serde_json::json;

    use crate::error::ExecutorError;

    #[test]
    fn test_summary_json_fields() {
        let summary = PipelineSummary {
            operation: "purge".to_string(),
            counter: ProgressCounter {
                rows_enumerated: 30,
                requests_applied: 30,
                chunks_completed: 2,
                retries: 1,
            },
            elapsed: Duration::from_millis(1500),
        };

        let value = summary_json(&summary, false);

        assert_eq!(value["operation"], "purge");
        assert_eq!(value["requestsApplied"], 30);
        assert_eq!(value["chunksCompleted"], 2);
        assert_eq!(value["elapsedMs"], 1500);
        assert_eq!(value["dryRun"], false);
    }

    #[test]
    fn test_failure_line_respects_quiet_mode() {
        let error = PipelineError::Chunk {
            chunk: 2,
            applied: 25,
            source: ExecutorError::Store(StoreError::WriteFailed("throttled".into())),
        };

        assert_eq!(ConsoleProgress::new(true).failure_line("load", &error), None);

        let line = ConsoleProgress::new(false)
            .failure_line("load", &error)
            .unwrap();
        assert!(line.ends_with("load stopped after 25 applied request(s)"));
    }

    #[test]
    fn test_preview_lines_are_aligned() {
        let record: RawRecord = serde_json::from_value(json!({
            "Receipt ID": "12345",
            "Date": "2024-01-02",
            "Merchant": "Shop",
            "Amount": "$1,200.50",
        }))
        .unwrap();
        let items = vec![LineItem::from_record(0, &record)];

        let lines = preview_lines(&items);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("line  receipt  date"));
        assert!(lines[1].starts_with("1     12345    2024-01-02"));
        assert!(lines[1].ends_with("1200.5"));
    }
}
