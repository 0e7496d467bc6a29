use anyhow::{Context, Result};
use buildtee::config::BuildConfig;
use buildtee::orchestrator::{Orchestrator, Outcome};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "buildtee")]
#[command(
    version,
    about = "Run a multi-module build with live progress, a full log file and a condensed summary"
)]
pub struct Cli {
    /// Debug diagnostics on stderr (overrides RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the config file. Defaults to ./buildtee.toml when present.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = BuildConfig::resolve(&working_dir, cli.config.as_deref(), |key| {
        std::env::var(key).ok()
    })?;
    tracing::debug!(?config, "resolved configuration");

    let outcome = Orchestrator::new(config, working_dir).run().await?;

    if let Outcome::Failed { step, exit_code } = outcome {
        tracing::debug!(%step, exit_code, "step failed");
        let _ = std::io::stdout().flush();
        std::process::exit(exit_code);
    }

    Ok(())
}
