//! mentorlink CLI - consultation push service
//!
//! - `serve`: run the HTTP/SSE server
//! - `config`: inspect the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mentorlink_core::Config;

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "mentorlink",
    author,
    version,
    about = "Real-time chat and status push for mentoring consultations"
)]
struct Cli {
    /// Debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    /// Config file (default: ~/.mentorlink/config.toml)
    #[arg(long, short = 'c', global = true, env = "MENTORLINK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server (consultation chat, status updates, SSE streams)
    Serve(commands::ServeArgs),
    /// Inspect configuration (show, path)
    Config(commands::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();

    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config).await,
        Commands::Config(args) => commands::run_config(args, &config, cli.config.as_deref()),
    };

    tracing_setup::shutdown_otel();
    result
}
