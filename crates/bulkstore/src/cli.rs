use clap::Parser;

use bulkstore_core::batch::MAX_BATCH_SIZE;
use bulkstore_core::progress::DEFAULT_PROGRESS_EVERY;

use crate::commands::{LoadCommand, PurgeCommand};
use crate::config::{PipelineConfig, DEFAULT_PAGE_SIZE};
use crate::error::ConfigError;
use crate::output::OutputFormat;
use crate::storage::dynamodb::{AwsConfig, DEFAULT_REGION};

/// Bulk load and purge a partitioned DynamoDB table
#[derive(Debug, Parser)]
#[command(name = "bulkstore", version)]
#[command(about = "Bulk load and purge a partitioned DynamoDB table", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: Global,

    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Silence the command output
    #[clap(long, global = true)]
    pub silent: bool,

    /// Enable verbose output
    #[clap(long, global = true)]
    pub verbose: bool,

    /// Format of the final summary
    #[clap(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

impl Global {
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Whether status lines should be suppressed, leaving stdout to the summary.
    pub fn is_quiet(&self) -> bool {
        self.silent || self.format == OutputFormat::Json
    }
}

/// Which table to talk to and how to reach it.
#[derive(Debug, Clone, clap::Args)]
pub struct TargetArgs {
    /// Table name
    #[arg(long, global = true, env = "BULKSTORE_TABLE")]
    pub table_name: Option<String>,

    /// AWS region
    #[arg(long, global = true, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Custom endpoint (e.g. http://localhost:8000 for local DynamoDB)
    #[arg(long, global = true, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Named AWS profile
    #[arg(long, global = true, env = "AWS_PROFILE")]
    pub profile: Option<String>,
}

impl TargetArgs {
    pub fn aws_config(&self) -> AwsConfig {
        AwsConfig {
            endpoint_url: self.endpoint_url.clone(),
            region: self.region.clone(),
            profile: self.profile.clone(),
        }
    }
}

/// Paging, batching and retry tuning.
#[derive(Debug, Clone, clap::Args)]
pub struct TuningArgs {
    /// Rows requested per page when enumerating
    #[arg(long, global = true, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Requests per batch write (1 to 25)
    #[arg(long, global = true, default_value_t = MAX_BATCH_SIZE)]
    pub batch_size: usize,

    /// Submit calls allowed per chunk, the first included
    #[arg(long, global = true, default_value_t = 8)]
    pub max_attempts: u32,

    /// Delay before the first resubmission, in milliseconds
    #[arg(long, global = true, default_value_t = 250)]
    pub base_delay_ms: u64,

    /// Upper bound for any backoff delay, in milliseconds
    #[arg(long, global = true, default_value_t = 4000)]
    pub max_delay_ms: u64,

    /// Chunks between progress lines
    #[arg(long, global = true, default_value_t = DEFAULT_PROGRESS_EVERY)]
    pub progress_every: u64,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Delete every row in the table, or in a partition or index range
    Purge(PurgeCommand),

    /// Write one row per record from a JSON or JSON lines file
    Load(LoadCommand),
}

impl Cli {
    /// Folds the flags into a validated configuration.
    pub fn pipeline_config(&self) -> Result<PipelineConfig, ConfigError> {
        PipelineConfig::for_table(self.target.table_name.as_deref())?
            .with_batch_size(self.tuning.batch_size)
            .with_retry(
                self.tuning.max_attempts,
                self.tuning.base_delay_ms,
                self.tuning.max_delay_ms,
            )
            .with_progress_every(self.tuning.progress_every)
            .with_page_size(self.tuning.page_size)
            .validate()
    }
}
