//! Application state shared by every handler.

use capture::{CaptureWorkflow, Normalizer};
use config::Config;
use llm::AnthropicCompletionService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use storage::PgRecordStore;

use crate::auth::AuthPolicy;
use crate::error::{ApiError, Result};

pub struct AppState {
    pub workflow: CaptureWorkflow,
    pub auth: AuthPolicy,
    /// Present only when a Prometheus recorder was installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(workflow: CaptureWorkflow, auth: AuthPolicy) -> Self {
        Self {
            workflow,
            auth,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Connects to PostgreSQL, prepares the schema and builds the completion
    /// client. Clients are created once here and shared for the process
    /// lifetime.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = PgRecordStore::connect(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(config.database.connect_timeout_seconds),
        )
        .await
        .map_err(|e| ApiError::Server(format!("Failed to connect to database: {e}")))?;

        store
            .initialize_schema()
            .await
            .map_err(|e| ApiError::Server(format!("Failed to initialize schema: {e}")))?;

        let completion = AnthropicCompletionService::from_config(&config.completion)
            .map_err(|e| ApiError::Configuration(e.to_string()))?;
        tracing::info!(model = %completion.model(), "Completion client ready");

        let workflow =
            CaptureWorkflow::new(Arc::new(store), Normalizer::new(Arc::new(completion)));
        let auth = AuthPolicy::from_config(&config.auth)?;

        Ok(Self::new(workflow, auth))
    }
}
