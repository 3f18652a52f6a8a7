use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bulkstore::cli::{Cli, Commands, Global};
use bulkstore::commands;

fn default_filter(global: &Global) -> &'static str {
    if global.is_verbose() {
        "bulkstore=debug,bulkstore_core=debug"
    } else if global.is_silent() {
        "bulkstore=warn"
    } else {
        "bulkstore=info"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `--format json` output stays parseable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(&cli.global).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let operation = match &cli.command {
        Commands::Purge(_) => "purge",
        Commands::Load(_) => "load",
    };

    commands::run(cli)
        .await
        .with_context(|| format!("{} failed", operation))?;

    Ok(())
}
