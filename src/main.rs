//! Pricewatch main entry point
//!
//! This is the command-line interface for the Pricewatch server.

use anyhow::{Context, Result};
use clap::Parser;
use pricewatch::api::{build_router, AppState};
use pricewatch::config::{load_config_with_hash, Config};
use pricewatch::model::Snapshot;
use pricewatch::pipeline::spawn_refresh_timer;
use pricewatch::{Refresher, SnapshotCache};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Pricewatch: marketplace price scraper and API
///
/// Periodically scrapes the configured listing page, keeps the latest
/// regional price snapshot in memory and serves it over HTTP.
#[derive(Parser, Debug)]
#[command(name = "pricewatch")]
#[command(version)]
#[command(about = "Marketplace price scraper and API", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run a single refresh, print the snapshot as JSON and exit
    #[arg(long, conflicts_with = "check_config")]
    once: bool,

    /// Validate the configuration, print the effective settings and exit
    #[arg(long, conflicts_with = "once")]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(cli.config.as_deref())?;

    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port
            .parse()
            .with_context(|| format!("Invalid PORT value '{}'", port))?;
    }

    if cli.check_config {
        handle_check_config(&config);
    } else if cli.once {
        handle_once(&config).await?;
    } else {
        handle_serve(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pricewatch=info,tower_http=info,warn"),
            1 => EnvFilter::new("pricewatch=debug,tower_http=debug,info"),
            2 => EnvFilter::new("pricewatch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if one was given, otherwise the built-in defaults
fn load(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Handles `--check-config`: prints the effective settings
fn handle_check_config(config: &Config) {
    println!("=== Pricewatch Configuration ===\n");

    println!("Source:");
    println!("  URL: {}", config.source.url);
    println!("  Timeout: {}ms", config.source.timeout_ms);
    println!("  User-Agent: {}", config.source.user_agent);
    println!("  Referer: {}", config.source.referer);

    println!("\nSelectors ({:?}):", config.selectors.match_mode);
    println!("  Card: {}", config.selectors.card);
    println!("  Title: {}", config.selectors.title);
    println!("  Price: {}", config.selectors.price);
    println!("  Offers: {}", config.selectors.offers);

    println!("\nFilter:");
    println!("  Region marker: {}", config.filter.region_marker);

    println!("\nSchedule:");
    println!("  Interval: {}s", config.schedule.interval_secs);
    println!("  Run on start: {}", config.schedule.run_on_start);

    println!("\nServer:");
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    if let Some(dir) = &config.server.static_dir {
        println!("  Static files: {}", dir);
    }

    println!("\n✓ Configuration is valid");
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDump<'a> {
    count: usize,
    last_scrape_time: Option<String>,
    data: &'a [pricewatch::AcceptedRecord],
}

impl<'a> SnapshotDump<'a> {
    fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            count: snapshot.len(),
            last_scrape_time: snapshot.captured_at_iso(),
            data: &snapshot.records,
        }
    }
}

/// Handles `--once`: one refresh, snapshot to stdout
async fn handle_once(config: &Config) -> Result<()> {
    let refresher = Refresher::from_config(config, Arc::new(SnapshotCache::new()))
        .context("Failed to build refresher")?;

    let snapshot = refresher
        .refresh()
        .await
        .context("Refresh failed")?
        .into_snapshot();

    let json = serde_json::to_string_pretty(&SnapshotDump::new(&snapshot))?;
    println!("{}", json);

    Ok(())
}

/// Handles the default mode: refresh timer plus HTTP server
async fn handle_serve(config: Config) -> Result<()> {
    let cache = Arc::new(SnapshotCache::new());
    let refresher = Arc::new(
        Refresher::from_config(&config, cache).context("Failed to build refresher")?,
    );

    let timer = spawn_refresh_timer(
        Arc::clone(&refresher),
        Duration::from_secs(config.schedule.interval_secs),
        config.schedule.run_on_start,
    );

    let app = build_router(
        AppState::new(refresher),
        config.server.static_dir.as_deref().map(Path::new),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server running on {}", addr);
    tracing::info!("Prices: http://localhost:{}/api/prices", config.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    timer.abort();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
