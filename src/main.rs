//! # folio
//!
//! Dashboard server binary: loads settings, starts the value generator and
//! serves the dashboard until ctrl-c.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use folio_core::{PortfolioValue, UniformDelta, ValueGenerator, ValuePublisher};
use folio_server::{FolioServer, ServerConfig};
use folio_settings::FolioSettings;
use folio_telemetry::{TelemetryConfig, init_telemetry};
use tracing::info;

/// Live portfolio dashboard server.
#[derive(Parser, Debug)]
#[command(name = "folio", about = "Live portfolio dashboard server", version)]
struct Cli {
    /// Settings file (default `~/.folio/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Emit JSON log lines.
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn load_settings(&self) -> Result<FolioSettings> {
        let path = self
            .settings
            .clone()
            .unwrap_or_else(folio_settings::settings_path);
        let mut settings = folio_settings::load_settings_from_path(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;

        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if self.log_json {
            settings.logging.json = true;
        }
        Ok(settings)
    }
}

fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: failed to load .env file: {e}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    let settings = cli.load_settings()?;

    let telemetry = TelemetryConfig::from_level_name(&settings.logging.level, settings.logging.json)
        .context("Invalid log level")?;
    init_telemetry(&telemetry).context("Failed to initialize logging")?;
    let prometheus =
        folio_server::metrics::install_recorder().context("Failed to install metrics")?;

    let value = Arc::new(
        PortfolioValue::new(settings.generator.initial_value)
            .context("Invalid initial portfolio value")?,
    );
    let server = FolioServer::new(
        ServerConfig::from(&settings.server),
        Arc::clone(&value),
        settings.auth.clone(),
    )
    .with_metrics(prometheus);

    let deltas =
        UniformDelta::new(settings.generator.max_delta).context("Invalid generator max_delta")?;
    let publisher: Arc<dyn ValuePublisher> = server.broadcast().clone();
    let generator = ValueGenerator::new(
        value,
        deltas,
        publisher,
        Duration::from_secs(settings.generator.interval_secs),
    )
    .context("Invalid generator settings")?;
    let generator_handle = generator.spawn(server.shutdown().token());

    let (addr, server_handle) = server.listen().await.context("Failed to bind server")?;
    info!("folio dashboard listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    info!("shutting down...");
    let clean = server
        .shutdown()
        .graceful_shutdown(vec![generator_handle, server_handle], None)
        .await;
    if !clean {
        anyhow::bail!("shutdown timed out");
    }
    Ok(())
}
