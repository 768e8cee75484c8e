//! # Configuration System
//!
//! Configuration for the Sparks service:
//! - Configuration structures with serde defaults
//! - Environment variable loading (12-factor app principles)
//! - TOML file loading
//! - Precedence: environment > file > defaults
//! - Validation via the `validator` crate

pub mod config;
pub mod file_loader;
pub mod loader;
pub mod validation;

pub use config::{
    AuthConfig, CompletionConfig, Config, DatabaseConfig, ObservabilityConfig, ServerConfig,
};
pub use file_loader::{ConfigFileError, load_from_file, load_from_toml};
pub use loader::{ConfigError, apply_env, load, load_from_env};
pub use validation::{validate, validate_for_server};
