//! # Configuration Structures
//!
//! All structures deserialize with per-field defaults, so a partial TOML file
//! or an empty environment yields a usable configuration, and carry
//! `validator` rules checked by [`crate::validate`].

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Top-level configuration for the Sparks service.
///
/// ## Fields
/// - `server`: HTTP bind address
/// - `database`: PostgreSQL record store connection
/// - `completion`: hosted language-model endpoint
/// - `auth`: single-identity access gate
/// - `observability`: log level and metrics toggle
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    #[serde(default)]
    #[validate(nested)]
    pub database: DatabaseConfig,

    #[serde(default)]
    #[validate(nested)]
    pub completion: CompletionConfig,

    #[serde(default)]
    #[validate(nested)]
    pub auth: AuthConfig,

    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    #[validate(length(min = 1, max = 255))]
    pub host: String,

    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// PostgreSQL connection settings for the record store.
#[derive(Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct DatabaseConfig {
    /// Connection URL, credentials included.
    #[serde(default = "default_database_url")]
    #[validate(length(min = 1))]
    pub url: String,

    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1, max = 100))]
    pub max_connections: u32,

    #[serde(default = "default_connect_timeout_seconds")]
    #[validate(range(min = 1, max = 300))]
    pub connect_timeout_seconds: u64,
}

fn default_database_url() -> String {
    "postgres://localhost/sparks".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &redact_url(&self.url))
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .finish()
    }
}

/// Hosted completion endpoint (Anthropic Messages API).
#[derive(Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct CompletionConfig {
    /// API key. Required to start the server, optional for tooling.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,

    #[serde(default = "default_model")]
    #[validate(length(min = 1, max = 255))]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    #[validate(range(min = 1, max = 8192))]
    pub max_tokens: u32,

    #[serde(default = "default_timeout_seconds")]
    #[validate(range(min = 1, max = 600))]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-haiku-4-5-20251001".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Access gate: one allowed identity, asserted by a fronting proxy header, or
/// a shared bearer key for scripted access.
#[derive(Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct AuthConfig {
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub allowed_identity: Option<String>,

    #[serde(default = "default_identity_header")]
    #[validate(length(min = 1, max = 128))]
    pub identity_header: String,

    #[serde(default)]
    #[validate(length(min = 16))]
    pub api_key: Option<String>,
}

fn default_identity_header() -> String {
    "x-forwarded-user".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allowed_identity: None,
            identity_header: default_identity_header(),
            api_key: None,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("allowed_identity", &self.allowed_identity)
            .field("identity_header", &self.identity_header)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Logging and metrics settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    #[validate(custom(function = "validate_log_level"))]
    pub log_level: String,

    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn validate_log_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_log_level")),
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

/// Masks the password component of a connection URL.
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:<redacted>@{host}"),
        None => url.to_string(),
    }
}
