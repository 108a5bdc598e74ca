//! twmod-mq - Main entry point
//!
//! Startup order: config, logging, root folder, database and stored weights,
//! upstream provider, engine, save timer, HTTP server. On shutdown the
//! upstream subscription is closed and the weights are saved one last time.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twmod_common::config::{default_config_path, RootFolderResolver, TomlConfig};
use twmod_common::events::EventBus;

use twmod_mq::api::{self, AppContext};
use twmod_mq::lexicon::LexiconScorer;
use twmod_mq::stream::{HttpStreamProvider, StreamProvider};
use twmod_mq::{db, persistence, EngineConfig, ModerationEngine};

/// Environment variable overriding the upstream bearer token
const STREAM_TOKEN_ENV: &str = "TWMOD_STREAM_TOKEN";

/// Command-line arguments for twmod-mq
#[derive(Parser, Debug)]
#[command(name = "twmod-mq")]
#[command(about = "Live tweet moderation queue service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "TWMOD_PORT")]
    port: Option<u16>,

    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder holding the weight database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let config = match &config_path {
        Some(path) => TomlConfig::load_or_default(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TomlConfig::default(),
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{},tower_http=debug", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting twmod moderation queue (twmod-mq) v{}",
        env!("CARGO_PKG_VERSION")
    );
    match &config_path {
        Some(path) if path.exists() => info!("Config file: {}", path.display()),
        Some(path) => warn!("Config file {} not found, using defaults", path.display()),
        None => warn!("No config directory on this platform, using defaults"),
    }

    let root_folder = RootFolderResolver::new("twmod-mq")
        .with_cli(args.root_folder.clone())
        .with_toml(config.root_folder.clone())
        .resolve_and_create()
        .context("Failed to prepare root folder")?;

    let db_path = config.database_path(&root_folder);
    info!("Database path: {}", db_path.display());
    let pool = db::connect(&db_path)
        .await
        .context("Failed to open weight database")?;

    let provider = build_provider(&config)?;

    let engine = ModerationEngine::new(
        EngineConfig::from(&config),
        Arc::new(LexiconScorer::default()),
        provider,
        EventBus::new(config.events.channel_capacity),
    );
    engine
        .load_weights(persistence::load_or_empty(&pool).await)
        .await;

    let save_task = persistence::spawn_save_task(
        Arc::clone(&engine),
        pool.clone(),
        Duration::from_secs(config.learning.save_interval_secs),
    );

    let port = args.port.unwrap_or(config.port);
    api::run(AppContext::new(Arc::clone(&engine)), port, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // Final save after the server has drained
    save_task.abort();
    engine.shutdown().await;
    match persistence::save_now(&engine, &pool).await {
        Ok(saved) => info!("Saved {} word weights on shutdown", saved),
        Err(e) => warn!("Final word weight save failed: {}", e),
    }
    pool.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Build the upstream provider; startup fails without an endpoint
fn build_provider(config: &TomlConfig) -> Result<Arc<dyn StreamProvider>> {
    let endpoint = config
        .stream_endpoint()
        .context("An upstream stream endpoint is required")?;
    let token = std::env::var(STREAM_TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| config.stream.bearer_token.clone());

    info!("Upstream stream endpoint: {}", endpoint);
    let provider = HttpStreamProvider::new(
        endpoint.to_string(),
        token,
        Duration::from_secs(config.stream.connect_timeout_secs),
    )
    .context("Failed to build upstream HTTP client")?;
    Ok(Arc::new(provider))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
