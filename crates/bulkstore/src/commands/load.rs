use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use bulkstore_core::storage::KeyValueStore;
use bulkstore_core::transform::ImportContext;

use crate::cli::Global;
use crate::config::PipelineConfig;
use crate::engine::workflows;
use crate::error::CommandError;
use crate::output::{self, aprintln, p_b};
use crate::source::read_records;

use super::{confirm, pipeline, report_applied, Report};

/// Records shown before a load.
pub const PREVIEW_ROWS: usize = 5;

/// Write records to the table.
#[derive(Debug, Clone, clap::Args)]
#[command(long_about = "Write one line-item row per record.

The source is a JSON array of objects or a JSON lines file. Column names are
matched case-insensitively, ignoring spaces, underscores and dashes.
Unparsable dates are stored as UNKNOWN and unparsable amounts as null.

Each row is keyed by receipt and position in the file, so loading the same
file twice overwrites the same rows.")]
pub struct LoadCommand {
    /// Path to the record file
    #[arg(long, env = "BULKSTORE_SOURCE", value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(long)]
    pub force: bool,

    /// Preview the rows without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run<S>(
    cmd: &LoadCommand,
    path: &Path,
    store: &S,
    config: &PipelineConfig,
    global: &Global,
) -> Result<Report, CommandError>
where
    S: KeyValueStore + ?Sized,
{
    let records = read_records(path).await?;

    if !global.is_quiet() {
        aprintln!("{} {} ({} record(s))", p_b("Source:"), path.display(), records.len());
        output::print_preview(&workflows::preview(&records, PREVIEW_ROWS), records.len());
    }

    if cmd.dry_run {
        let rows = records.len() as u64;
        output::print_dry_run(workflows::LOAD, rows, global.format, global.is_silent());
        return Ok(Report::DryRun { rows });
    }

    confirm(
        &format!(
            "Write {} row(s) to '{}'?",
            records.len(),
            config.schema.table_name
        ),
        cmd.force,
    )?;

    let context = ImportContext::new(Uuid::new_v4(), Utc::now());
    tracing::info!(import_id = %context.import_id, records = records.len(), "Loading records");

    let summary = workflows::load(&pipeline(store, config, global), records, &context).await?;
    Ok(report_applied(summary, global))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkstore_core::keys::PrimaryKey;
    use clap::Parser;

    use crate::cli::{Cli, Commands};
    use crate::storage::InMemoryStore;

    fn temp_source(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("bulkstore-load-{}.json", Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn parse(args: &[&str]) -> (Cli, LoadCommand) {
        let cli = Cli::try_parse_from(
            ["bulkstore", "--table-name", "test", "--silent", "load"]
                .iter()
                .chain(args),
        )
        .unwrap();
        let cmd = match &cli.command {
            Commands::Load(cmd) => cmd.clone(),
            Commands::Purge(_) => unreachable!(),
        };
        (cli, cmd)
    }

    const RECORDS: &str = r#"[
        {"Receipt ID": "12345", "Date": 45123, "Amount": "$4.00"},
        {"Receipt ID": "12345", "Date": "not-a-date", "Amount": "n/a"},
        {"Amount": 1}
    ]"#;

    #[tokio::test]
    async fn test_forced_load_writes_rows() {
        let path = temp_source(RECORDS);
        let (cli, cmd) = parse(&["--source", path.to_str().unwrap(), "--force"]);
        let config = cli.pipeline_config().unwrap();
        let store = InMemoryStore::new(config.schema.clone());

        let report = run(&cmd, &path, &store, &config, &cli.global)
            .await
            .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(report, Report::Applied(ref s) if s.counter.requests_applied == 3));
        assert_eq!(store.len().await, 3);

        let first = store
            .get(&PrimaryKey::new("RECEIPT#12345", "LINE#000001"))
            .await
            .unwrap();
        assert_eq!(
            first.attribute("date").and_then(|v| v.as_s()),
            Some("2023-07-16")
        );
        assert!(store
            .get(&PrimaryKey::new("RECEIPT#UNKNOWN", "LINE#000003"))
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let path = temp_source(RECORDS);
        let (cli, cmd) = parse(&["--source", path.to_str().unwrap(), "--dry-run"]);
        let config = cli.pipeline_config().unwrap();
        let store = InMemoryStore::new(config.schema.clone());

        let report = run(&cmd, &path, &store, &config, &cli.global)
            .await
            .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(report, Report::DryRun { rows: 3 });
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_unreadable_source_is_a_source_error() {
        let path = temp_source("[{\"Amount\": 1},");
        let (cli, cmd) = parse(&["--source", path.to_str().unwrap(), "--force"]);
        let config = cli.pipeline_config().unwrap();
        let store = InMemoryStore::new(config.schema.clone());

        let err = run(&cmd, &path, &store, &config, &cli.global)
            .await
            .unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(err, CommandError::Source(_)));
        assert_eq!(store.submits(), 0);
    }
}
