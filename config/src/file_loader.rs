//! # Configuration File Loading
//!
//! Loads configuration from a TOML file. Every section and field is optional;
//! omitted values fall back to their defaults.

use crate::config::Config;
use std::path::Path;

/// Configuration file loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(String),

    #[error("Config file has no extension")]
    NoExtension,

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String),
}

/// Load configuration from a TOML file.
///
/// ```rust,no_run
/// use config::load_from_toml;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_toml(Path::new("sparks.toml"))?;
///     println!("listening on port {}", config.server.port);
///     Ok(())
/// }
/// ```
pub fn load_from_toml(path: &Path) -> Result<Config, ConfigFileError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|_e| ConfigFileError::FileNotFound(path.display().to_string()))?;

    toml::from_str(&contents).map_err(|e| ConfigFileError::TomlParse(e.to_string()))
}

/// Load configuration from a file, checking the extension first.
pub fn load_from_file(path: &Path) -> Result<Config, ConfigFileError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or(ConfigFileError::NoExtension)?;

    match extension.to_lowercase().as_str() {
        "toml" => load_from_toml(path),
        other => Err(ConfigFileError::UnsupportedFormat(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sparks.toml");

        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 3000

[database]
url = "postgres://sparks:secret@db:5432/sparks"
max_connections = 8

[completion]
model = "claude-sonnet-4-5"
timeout_seconds = 45

[auth]
allowed_identity = "octocat"

[observability]
log_level = "debug"
"#;
        fs::write(&path, toml_content).unwrap();

        let config = load_from_toml(&path).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 8);
        assert_eq!(config.completion.model, "claude-sonnet-4-5");
        assert_eq!(config.completion.timeout_seconds, 45);
        assert_eq!(config.completion.max_tokens, 512);
        assert_eq!(config.auth.allowed_identity.as_deref(), Some("octocat"));
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_load_from_file_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sparks.ini");
        fs::write(&path, "port=1").unwrap();
        let err = load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigFileError::UnsupportedFormat(ref ext) if ext == "ini"));
    }

    #[test]
    fn test_load_from_file_no_extension() {
        let err = load_from_file(Path::new("/tmp/sparks")).unwrap_err();
        assert!(matches!(err, ConfigFileError::NoExtension));
    }

    #[test]
    fn test_load_from_toml_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[server\nport = ").unwrap();
        let err = load_from_toml(&path).unwrap_err();
        assert!(matches!(err, ConfigFileError::TomlParse(_)));
    }

    #[test]
    fn test_load_from_toml_not_found() {
        let err = load_from_toml(Path::new("/nonexistent/sparks.toml")).unwrap_err();
        assert!(matches!(err, ConfigFileError::FileNotFound(_)));
    }
}
