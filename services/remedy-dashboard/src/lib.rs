//! Remedy dashboard - operations view for the Remedy remediation service
//!
//! Polls the Remedy API for repositories, scans, findings, and automated pull
//! requests, serves them as a web dashboard, and announces new pull requests.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod model;
pub mod notifier;
pub mod render;
pub mod state;
pub mod view;
pub mod web;

pub use config::{load_config, Config};
pub use error::{DashboardError, Result};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::engine::{Dashboard, DashboardSettings};
use crate::io::ReqwestHttpClient;

/// Build an API client for the configured Remedy service
pub fn api_client(config: &Config) -> Result<ApiClient> {
    let http: Arc<dyn io::HttpClient> =
        Arc::new(ReqwestHttpClient::with_timeout(config.api.request_timeout)?);
    Ok(ApiClient::new(&config.api.base_url, http))
}

/// Build a dashboard wired to the real API and the configured notifier
pub fn build_dashboard(config: &Config, cancel: CancellationToken) -> Result<Arc<Dashboard>> {
    let api = Arc::new(api_client(config)?);
    let notifier = notifier::from_config(&config.notifier);
    let state = state::new_state_handle(config.dashboard.history_size);
    let settings = DashboardSettings {
        refresh_interval: config.refresh.interval,
        toast_duration: config.refresh.toast_duration,
        scan_kinds: config.api.scan_kinds.clone(),
    };
    Ok(Arc::new(Dashboard::new(
        api, notifier, state, settings, cancel,
    )))
}

/// Run the dashboard service until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let cancel = CancellationToken::new();
    let dashboard = build_dashboard(&config, cancel.clone())?;

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
        cancel_for_signal.cancel();
    });

    // Start web server if enabled
    if config.dashboard.enabled {
        let port = config.dashboard.port;
        let reload_seconds = config.refresh.interval.as_secs().max(1);
        let router = web::build_router(Arc::clone(&dashboard), reload_seconds);
        let cancel_for_web = cancel.clone();

        tokio::spawn(async move {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            tracing::info!("Dashboard listening on http://{}", addr);

            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!(
                        "Failed to bind dashboard to port {}: {}. Continuing without web UI.",
                        port,
                        e
                    );
                    return;
                }
            };

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel_for_web.cancelled().await;
                })
                .await
                .ok();

            tracing::debug!("Dashboard web server stopped");
        });
    }

    tracing::info!("Remedy dashboard started");

    // Blocks until cancelled
    dashboard.run().await;

    tracing::info!("Remedy dashboard stopped");
    Ok(())
}
