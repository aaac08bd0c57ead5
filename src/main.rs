mod app;
mod datetime;
mod render;
mod screens;
mod utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gather_core::config::{BackendKind, GatherConfig};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gather")]
#[command(about = "Organize events and keep track of your favorites")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured backend ("memory" or "firebase")
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Start the app (the default)
    Run,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => Ok(GatherConfig::config_path()?),
    }
}

fn load_config(cli: &Cli) -> Result<GatherConfig> {
    let mut config = match &cli.config {
        Some(path) => GatherConfig::load_from(path),
        None => GatherConfig::load(),
    }
    .context("Could not load config")?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.as_ref().unwrap_or(&Commands::Run) {
        Commands::Init { force } => {
            let path = config_path(&cli)?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config already exists at {}\n\nUse --force to overwrite it.",
                    path.display()
                );
            }
            GatherConfig::create_default_config(&path)?;
            println!("{}", format!("Wrote {}", path.display()).green());
            Ok(())
        }
        Commands::Run => {
            let config = load_config(&cli)?;
            app::run(&config).await
        }
    }
}
