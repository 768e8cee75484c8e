//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor app
//! principles. Variables override whatever the file or the defaults provide.
//!
//! ## Environment Variables
//! - `SPARKS_HOST`, `SPARKS_PORT`: bind address (default `0.0.0.0:8080`)
//! - `DATABASE_URL`: PostgreSQL connection URL with credentials
//! - `SPARKS_DB_MAX_CONNECTIONS`, `SPARKS_DB_CONNECT_TIMEOUT_SECONDS`
//! - `ANTHROPIC_API_KEY`: completion service key
//! - `ANTHROPIC_BASE_URL`: completion service base URL
//! - `SPARKS_MODEL`, `SPARKS_MAX_TOKENS`, `SPARKS_COMPLETION_TIMEOUT_SECONDS`
//! - `ALLOWED_IDENTITY`: the single identity allowed through the gate
//! - `SPARKS_IDENTITY_HEADER`: header carrying the proxied identity
//! - `SPARKS_API_KEY`: optional bearer key
//! - `SPARKS_LOG_LEVEL`: trace/debug/info/warn/error
//! - `SPARKS_METRICS_ENABLED`: true/false

use crate::config::Config;
use crate::file_loader::{ConfigFileError, load_from_file};
use std::env;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    File(#[from] ConfigFileError),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Defaults overlaid with the environment.
pub fn load_from_env() -> Result<Config, ConfigError> {
    apply_env(Config::default())
}

/// Resolves the effective configuration: environment over file over
/// defaults, then validated.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let base = match path {
        Some(path) => load_from_file(path)?,
        None => Config::default(),
    };
    let config = apply_env(base)?;
    config.validate()?;
    tracing::debug!(?config, "Configuration resolved");
    Ok(config)
}

/// Overlays every recognised environment variable onto `config`.
pub fn apply_env(mut config: Config) -> Result<Config, ConfigError> {
    env_override("SPARKS_HOST", &mut config.server.host)?;
    env_override("SPARKS_PORT", &mut config.server.port)?;

    env_override("DATABASE_URL", &mut config.database.url)?;
    env_override("SPARKS_DB_MAX_CONNECTIONS", &mut config.database.max_connections)?;
    env_override(
        "SPARKS_DB_CONNECT_TIMEOUT_SECONDS",
        &mut config.database.connect_timeout_seconds,
    )?;

    env_override_opt("ANTHROPIC_API_KEY", &mut config.completion.api_key);
    env_override("ANTHROPIC_BASE_URL", &mut config.completion.base_url)?;
    env_override("SPARKS_MODEL", &mut config.completion.model)?;
    env_override("SPARKS_MAX_TOKENS", &mut config.completion.max_tokens)?;
    env_override(
        "SPARKS_COMPLETION_TIMEOUT_SECONDS",
        &mut config.completion.timeout_seconds,
    )?;

    env_override_opt("ALLOWED_IDENTITY", &mut config.auth.allowed_identity);
    env_override("SPARKS_IDENTITY_HEADER", &mut config.auth.identity_header)?;
    env_override_opt("SPARKS_API_KEY", &mut config.auth.api_key);

    env_override("SPARKS_LOG_LEVEL", &mut config.observability.log_level)?;
    if let Ok(raw) = env::var("SPARKS_METRICS_ENABLED") {
        config.observability.metrics_enabled = parse_bool("SPARKS_METRICS_ENABLED", &raw)?;
    }

    Ok(config)
}

fn env_override<T: FromStr>(key: &str, target: &mut T) -> Result<(), ConfigError> {
    if let Ok(raw) = env::var(key) {
        *target = raw.parse().map_err(|_| ConfigError::InvalidEnv {
            key: key.to_string(),
            value: raw.clone(),
        })?;
    }
    Ok(())
}

/// Blank values count as unset.
fn env_override_opt(key: &str, target: &mut Option<String>) {
    if let Ok(raw) = env::var(key) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            *target = Some(trimmed.to_string());
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}
