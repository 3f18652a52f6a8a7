//! CLI commands.

mod load;
mod purge;

pub use load::LoadCommand;
pub use purge::PurgeCommand;

use std::path::PathBuf;

use dialoguer::Confirm;

use bulkstore_core::storage::{KeyValueStore, ScanRequest};

use crate::cli::{Cli, Commands, Global};
use crate::config::{resolve_source, PipelineConfig};
use crate::engine::{Pipeline, PipelineSummary};
use crate::error::{CommandError, ConfigError};
use crate::output::{self, aprintln, p_b, ConsoleProgress};
use crate::storage::dynamodb::{create_client, DynamoDbStore};

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Nothing was written; `rows` would have been affected.
    DryRun { rows: u64 },
    Applied(PipelineSummary),
}

/// A subcommand with every input resolved, ready to run against a store.
#[derive(Debug, Clone)]
pub enum Plan {
    Purge {
        cmd: PurgeCommand,
        request: ScanRequest,
    },
    Load {
        cmd: LoadCommand,
        source: PathBuf,
    },
}

impl Plan {
    /// Resolves the subcommand's inputs without touching the store.
    pub fn new(command: &Commands, config: &PipelineConfig) -> Result<Self, ConfigError> {
        match command {
            Commands::Purge(cmd) => Ok(Plan::Purge {
                request: purge::scan_request(cmd, config)?,
                cmd: cmd.clone(),
            }),
            Commands::Load(cmd) => Ok(Plan::Load {
                source: resolve_source(cmd.source.as_deref())?,
                cmd: cmd.clone(),
            }),
        }
    }

    pub async fn execute<S>(
        &self,
        store: &S,
        config: &PipelineConfig,
        global: &Global,
    ) -> Result<Report, CommandError>
    where
        S: KeyValueStore + ?Sized,
    {
        match self {
            Plan::Purge { cmd, request } => purge::run(cmd, request, store, config, global).await,
            Plan::Load { cmd, source } => load::run(cmd, source, store, config, global).await,
        }
    }
}

/// Main entry point: validates flags, connects, and dispatches.
pub async fn run(cli: Cli) -> Result<Report, CommandError> {
    let config = cli.pipeline_config()?;
    let plan = Plan::new(&cli.command, &config)?;
    let aws_config = cli.target.aws_config();

    if !cli.global.is_quiet() {
        aprintln!("{} {}", p_b("Target:"), aws_config.target_display());
        aprintln!("{} {}", p_b("Table:"), config.schema.table_name);
        aprintln!();
    }

    let client = create_client(&aws_config).await;
    let store = DynamoDbStore::new(client, config.schema.clone());
    store.ensure_table().await?;

    plan.execute(&store, &config, &cli.global).await
}

fn pipeline<'a, S>(store: &'a S, config: &PipelineConfig, global: &Global) -> Pipeline<'a, S>
where
    S: KeyValueStore + ?Sized,
{
    Pipeline::new(store, config.settings())
        .with_sink(Box::new(ConsoleProgress::new(global.is_quiet())))
}

/// Asks before a destructive step unless `force` is set.
fn confirm(prompt: &str, force: bool) -> Result<(), CommandError> {
    if force {
        return Ok(());
    }

    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CommandError::Prompt(e.to_string()))?;

    if confirmed {
        Ok(())
    } else {
        Err(CommandError::UserCancelled)
    }
}

fn report_applied(summary: PipelineSummary, global: &Global) -> Report {
    output::print_summary(&summary, global.format, global.is_silent());
    Report::Applied(summary)
}

fn describe_scope(request: &ScanRequest) -> String {
    let mut scope = match &request.index_name {
        Some(index) => format!("index {}", index),
        None => "table".to_string(),
    };
    if let Some(partition) = &request.partition_key {
        scope.push_str(&format!(", partition {}", partition));
    }
    if let Some(prefix) = &request.sort_key_prefix {
        scope.push_str(&format!(", sort keys starting with {}", prefix));
    }
    scope
}
