//! HTTP server: browser page and JSON API.

mod page;
pub mod routes;

pub use page::{PageContent, render_page};
pub use routes::{AppState, create_router};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;

use crate::config::Config;
use crate::export::Exporter;
use crate::preferences::PreferenceStore;
use crate::service::AnalysisService;

/// The campaign analyst web server.
pub struct AnalystServer {
    state: Arc<AppState>,
}

impl AnalystServer {
    /// Build the server from configuration, loading stored preferences.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be constructed.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let exporter = Exporter::from_config(&config)?;
        let preferences = PreferenceStore::load(&config.preferences_path).await;
        let service = AnalysisService::new(config);

        Ok(Self::with_state(AppState::new(service, exporter, preferences).await))
    }

    /// Wrap prepared state.
    #[must_use]
    pub fn with_state(state: AppState) -> Self {
        Self { state: Arc::new(state) }
    }

    /// The router serving this server's state.
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(Arc::clone(&self.state))
    }

    /// Run the server until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run_http(self, addr: SocketAddr) -> anyhow::Result<()> {
        tracing::info!(model = %self.state.service.config().model, "Starting campaign analyst");
        if !self.state.service.config().has_api_key() {
            tracing::warn!("No API key configured; analyses will fail until one is set");
        }

        let router = self.router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

impl std::fmt::Debug for AnalystServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalystServer").field("theme", &self.state.theme.current()).finish()
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
