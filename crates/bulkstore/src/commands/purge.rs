use bulkstore_core::storage::{KeyValueStore, ScanRequest};

use crate::cli::Global;
use crate::config::PipelineConfig;
use crate::engine::{cursor, workflows};
use crate::error::{CommandError, ConfigError};
use crate::output::{self, aprintln, p_y};

use super::{confirm, describe_scope, pipeline, report_applied, Report};

/// Delete rows from the table.
#[derive(Debug, Clone, clap::Args)]
#[command(long_about = "Delete rows from the table.

By default every row is deleted. Use --partition (and optionally --prefix)
to limit the purge to one partition, and --index to select rows through the
secondary index instead of the base table.

Rows are enumerated by key only and deleted in batches of up to 25. Running
a purge twice is safe: the second run finds nothing to delete.")]
pub struct PurgeCommand {
    /// Only purge rows in this partition
    #[arg(long)]
    pub partition: Option<String>,

    /// Only purge rows whose sort key starts with this prefix
    #[arg(long, requires = "partition")]
    pub prefix: Option<String>,

    /// Enumerate through this secondary index (e.g. GSI1)
    #[arg(long)]
    pub index: Option<String>,

    /// Skip confirmation prompts
    #[arg(long)]
    pub force: bool,

    /// Count matching rows without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Keys-only enumeration of the purge scope.
pub fn scan_request(
    cmd: &PurgeCommand,
    config: &PipelineConfig,
) -> Result<ScanRequest, ConfigError> {
    Ok(config
        .scan_request(
            cmd.index.as_deref(),
            cmd.partition.as_deref(),
            cmd.prefix.as_deref(),
        )?
        .keys_only())
}

pub async fn run<S>(
    cmd: &PurgeCommand,
    request: &ScanRequest,
    store: &S,
    config: &PipelineConfig,
    global: &Global,
) -> Result<Report, CommandError>
where
    S: KeyValueStore + ?Sized,
{
    let scope = describe_scope(request);

    if cmd.dry_run {
        let rows = cursor::count_rows(store, request).await?;
        output::print_dry_run(workflows::PURGE, rows, global.format, global.is_silent());
        return Ok(Report::DryRun { rows });
    }

    if !global.is_quiet() {
        aprintln!("{} {}", p_y("Purging:"), scope);
    }
    confirm(
        &format!(
            "Delete every row in {} of '{}'? THIS CANNOT BE UNDONE",
            scope, config.schema.table_name
        ),
        cmd.force,
    )?;

    let summary = workflows::purge(&pipeline(store, config, global), request).await?;
    Ok(report_applied(summary, global))
}
