//! Server setup and lifecycle.

use config::Config;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use crate::error::{ApiError, Result};
use crate::routes::create_router;
use crate::state::AppState;
use crate::telemetry::{init_metrics, init_tracing};

pub struct SparksServer {
    state: Arc<AppState>,
    addr: SocketAddr,
}

impl SparksServer {
    pub async fn new(config: &Config) -> Result<Self> {
        let addr = bind_address(config)?;
        let mut state = AppState::from_config(config).await?;
        if config.observability.metrics_enabled {
            state = state.with_metrics(init_metrics()?);
        }
        Ok(Self::with_state(Arc::new(state), addr))
    }

    pub fn with_state(state: Arc<AppState>, addr: SocketAddr) -> Self {
        Self { state, addr }
    }

    /// Runs until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let router = create_router(self.state.clone());

        let listener = TcpListener::bind(&self.addr)
            .await
            .map_err(|e| ApiError::Server(format!("Failed to bind to {}: {e}", self.addr)))?;

        tracing::info!(addr = %self.addr, "Sparks server starting");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::Server(format!("Server error: {e}")))?;

        tracing::info!("Sparks server stopped");
        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }
}

fn bind_address(config: &Config) -> Result<SocketAddr> {
    format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| ApiError::Configuration(format!("Invalid address: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        () = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}

/// Loads configuration (optional TOML file named by `SPARKS_CONFIG`, then the
/// environment), checks startup requirements and serves.
pub async fn run_from_env() -> anyhow::Result<()> {
    let path = std::env::var("SPARKS_CONFIG").ok().map(PathBuf::from);
    let config = config::load(path.as_deref())?;
    init_tracing(&config.observability);

    config::validate_for_server(&config)?;
    tracing::info!(?config, "Configuration loaded");

    let server = SparksServer::new(&config).await?;
    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 3000;
        assert_eq!(bind_address(&config).unwrap().to_string(), "127.0.0.1:3000");

        config.server.host = "not a host".to_string();
        assert!(matches!(bind_address(&config), Err(ApiError::Configuration(_))));
    }
}
