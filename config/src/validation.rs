//! # Configuration Validation
//!
//! Field rules live on the structures as `validator` attributes; this module
//! exposes the entry point plus the startup-only requirements that depend on
//! more than one field.

use crate::config::Config;
use validator::{Validate, ValidationError, ValidationErrors};

/// Validate every section of the configuration.
pub fn validate(config: &Config) -> Result<(), ValidationErrors> {
    config.validate()
}

/// Requirements for running the HTTP service, on top of [`validate`]:
/// a completion API key, and at least one way through the access gate.
pub fn validate_for_server(config: &Config) -> Result<(), ValidationErrors> {
    validate(config)?;

    let mut errors = ValidationErrors::new();
    if config.completion.api_key.is_none() {
        errors.add("completion.api_key", ValidationError::new("required"));
    }
    if config.auth.allowed_identity.is_none() && config.auth.api_key.is_none() {
        errors.add("auth", ValidationError::new("no_identity_configured"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.observability.log_level = "loud".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_pool_size() {
        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.completion.base_url = "not a url".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_short_bearer_key_rejected() {
        let mut config = Config::default();
        config.auth.api_key = Some("short".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_server_requires_api_key_and_identity() {
        let mut config = Config::default();
        let errors = validate_for_server(&config).unwrap_err();
        assert!(errors.errors().contains_key("completion.api_key"));
        assert!(errors.errors().contains_key("auth"));

        config.completion.api_key = Some("sk-test".to_string());
        config.auth.allowed_identity = Some("octocat".to_string());
        assert!(validate_for_server(&config).is_ok());
    }
}
