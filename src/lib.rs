//! # cachet-exporter
//!
//! A Prometheus exporter for [Cachet](https://cachethq.io) status pages.
//!
//! The exporter polls the Cachet REST API on every scrape and republishes
//! component health and incident counts as gauges. It keeps no state between
//! scrapes.
//!
//! ```text
//!   Prometheus ──GET /metrics──▶ MetricsServer ──▶ Registry ──▶ CachetCollector
//!                                                                   │
//!                                                                   ▼
//!                                                  CachetClient ──▶ Cachet API
//! ```
//!
//! - **[`config`]**: command line flags and layered settings
//! - **[`logging`]**: `tracing` subscriber setup
//! - **[`duration`]**: human-friendly duration parsing for flags
//!
//! The collection logic lives in the `cachet-collector` crate and the API
//! client in `cachet-client`.
//!
//! ## Usage
//!
//! ```bash
//! cachet_exporter --cachet.api-url https://status.example.com/api/v1
//!
//! # or via the environment
//! CACHET_API_URL=https://status.example.com/api/v1 cachet_exporter --web.listen-address :9470
//! ```

pub mod config;
pub mod duration;
pub mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use cachet_client::CachetClient;
use cachet_collector::prometheus::{MetricsServer, ServerConfig};
use cachet_collector::{CachetCollector, Registry};

pub use crate::config::{Args, Settings};

/// Build the client, collector and registry described by `settings`.
pub fn build_registry(settings: &Settings) -> Result<Arc<Registry>> {
    let client = CachetClient::builder()
        .endpoint(&settings.api_url)
        .timeout(settings.request_timeout()?)
        .per_page(settings.per_page)
        .build()
        .context("Failed to create a new Cachet client")?;

    let registry = Arc::new(Registry::new());
    registry
        .register(Arc::new(CachetCollector::new(Arc::new(client))))
        .context("Failed to register the Cachet collector")?;
    Ok(registry)
}

/// Run the exporter until interrupted.
pub async fn run(settings: Settings) -> Result<()> {
    let registry = build_registry(&settings)?;

    let server = MetricsServer::new(
        ServerConfig::builder()
            .listen_addr(settings.listen_addr())
            .metrics_path(settings.telemetry_path.clone())
            .build(),
        registry,
    );

    info!(
        api_url = %settings.api_url,
        timeout = %duration::format_duration(settings.request_timeout()?),
        "Server listening on {}",
        settings.listen_addr()
    );

    server
        .run(shutdown_signal())
        .await
        .context("Error starting server")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
