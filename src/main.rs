//! Sockrelay - SOCKS5 CONNECT relay
//!
//! This is the main entry point for the Sockrelay application.

use anyhow::Result;
use clap::Parser;
use sockrelay::config::{load_config, Config};
use sockrelay::server::run_server;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Sockrelay - SOCKS5 proxy serving the CONNECT command
#[derive(Parser, Debug)]
#[command(name = "sockrelay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long)]
    addr: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Per-connection debug logging (on by default; `--debug false` turns it off)
    #[arg(short, long, num_args = 0..=1, default_missing_value = "true")]
    debug: Option<bool>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_log: bool,
}

impl Args {
    /// Load the config file, if any, and apply command-line overrides
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };

        if let Some(addr) = &self.addr {
            config.server.listen_addr = addr.clone();
        }
        if let Some(port) = self.port {
            config.server.listen_port = port;
        }
        if let Some(debug) = self.debug {
            config.server.debug = debug;
        }

        Ok(config)
    }

    /// Explicit level, else `debug` when debugging is on, else `info`
    fn effective_level(&self, config: &Config) -> &str {
        match &self.log_level {
            Some(level) => level.as_str(),
            None if config.server.debug => "debug",
            None => "info",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = args.resolve_config()?;

    // Setup logging
    setup_logging(args.effective_level(&config), args.json_log)?;

    info!("Sockrelay v{}", sockrelay::VERSION);
    if let Some(path) = &args.config {
        info!("Configuration loaded from: {:?}", path);
    }
    info!("Listen address: {}", config.server.listen_display());

    // Setup shutdown signal
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    // Handle Ctrl+C and termination signals (cross-platform)
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = shutdown_tx.send(true);
    });

    // Run the server
    run_server(config, shutdown_rx).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!("Failed to setup SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down...");
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    // On Windows, only handle Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    info!("Received Ctrl+C, shutting down...");
}

/// Setup logging; `RUST_LOG` takes precedence over `level`
fn setup_logging(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;
    } else {
        builder
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;
    }

    Ok(())
}
