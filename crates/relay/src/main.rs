//! # relay
//!
//! Chat relay server binary: loads settings, starts the HTTP server, and
//! waits for Ctrl-C.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use relay_server::{RelayServer, ServerConfig};
use relay_settings::RelaySettings;

/// Real-time chat relay.
#[derive(Parser, Debug)]
#[command(name = "relay", about = "Real-time chat relay server")]
struct Cli {
    /// Settings file (defaults to `~/.relay/settings.json` when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Directory of static files served at `/`.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Log filter, e.g. `info` or `relay_server=debug` (`RUST_LOG` wins).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Apply command-line flags over loaded settings.
    fn apply(&self, settings: &mut RelaySettings) {
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(ref dir) = self.static_dir {
            settings.server.static_dir = Some(dir.clone());
        }
        if let Some(ref level) = self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}

/// Load settings from an explicit path (which must exist) or the default one.
fn resolve_settings(explicit: Option<&Path>) -> Result<RelaySettings> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("settings file not found: {}", path.display());
            }
            relay_settings::load_settings_from_path(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))
        }
        None => relay_settings::load_settings().context("Failed to load settings"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut settings = resolve_settings(args.config.as_deref())?;
    args.apply(&mut settings);
    settings.validate().context("Invalid settings")?;

    relay_core::logging::init_subscriber(&settings.logging.level);

    let mut server = RelayServer::new(ServerConfig::from(&settings.server));
    match relay_server::metrics::install_recorder() {
        Ok(handle) => server = server.with_metrics(handle),
        Err(e) => tracing::warn!(error = %e, "metrics disabled"),
    }

    let (addr, handle) = server
        .listen()
        .await
        .context("Failed to bind server")?;

    tracing::info!(
        keepalive_ms = settings.server.keepalive_interval_ms,
        static_dir = ?settings.server.static_dir,
        "relay listening on http://{addr}"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server.shutdown().graceful_shutdown(vec![handle], None).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
