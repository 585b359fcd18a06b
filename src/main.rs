#[cfg(feature = "charts")]
mod charts;
mod cli;
mod engine;
mod error;
mod metrics;
mod model;
mod orchestrator;
mod storage;
mod text_summary;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so stdout carries only the report.
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    cli::run(args)
}
