//! HTTP server command
//!
//! Runs the consultation push service. Flags override the config file.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mentorlink_core::Config;
use mentorlink_server::db::{create_pool, migrations, ConsultationStore, MemoryStore, PgStore};
use mentorlink_server::{run_server, AppState, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep consultations in memory instead of PostgreSQL (data is lost on exit)
    #[arg(long)]
    pub memory: bool,

    /// Frames buffered per stream before new ones are dropped
    #[arg(long)]
    pub channel_capacity: Option<usize>,
}

impl ServeArgs {
    /// Fold command-line overrides into the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if self.cors_permissive {
            config.server.cors_permissive = true;
        }
        if let Some(url) = &self.database_url {
            config.server.database_url = Some(url.clone());
        }
        if let Some(capacity) = self.channel_capacity {
            config.streams.channel_capacity = capacity;
        }
    }
}

async fn open_store(args: &ServeArgs, config: &Config) -> Result<Arc<dyn ConsultationStore>> {
    if args.memory {
        tracing::warn!("Using in-memory store; consultations are lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let database_url = config
        .server
        .database_url
        .as_deref()
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or [server] database_url in config")?;

    let pool = create_pool(database_url, config.server.max_connections)
        .await
        .context("Failed to create database pool")?;
    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(Arc::new(PgStore::new(pool)))
}

/// Run the HTTP server (blocks until shutdown)
pub async fn run_serve(args: ServeArgs, mut config: Config) -> Result<()> {
    args.apply(&mut config);
    tracing::info!("Starting mentorlink server on {}", config.server.bind);

    let store = open_store(&args, &config).await?;
    let state = AppState::new(store, config.streams.clone());

    run_server(state, ServerConfig::from(&config.server))
        .await
        .context("Server error")?;

    Ok(())
}
