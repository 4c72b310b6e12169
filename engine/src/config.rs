//! Engine configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use keel_types::ProtocolParams;

use crate::error::ConfigError;

/// Configuration for a keel reserve system.
///
/// Can be loaded from a TOML file via [`EngineConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default, so
/// a partial file — or none at all — is fine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Operating bounds and timeouts.
    #[serde(default)]
    pub params: ProtocolParams,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            params: ProtocolParams::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_types::Sats;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config.log_format, "human");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.params.max_wallets_per_reserve, 10);
    }

    #[test]
    fn partial_params_override_only_what_they_name() {
        let config = EngineConfig::from_toml_str(
            r#"
            log_level = "debug"

            [params]
            redemption_timeout_secs = 3600
            min_mint = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.params.redemption_timeout_secs, 3600);
        assert_eq!(config.params.min_mint, Sats::new(5000));
        // Untouched fields keep their defaults.
        assert_eq!(config.params.max_wallets_per_reserve, 10);
    }

    #[test]
    fn loads_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_format = \"json\"").unwrap();
        let config = EngineConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.log_format, "json");
    }

    #[test]
    fn missing_file_is_a_typed_error() {
        let err = EngineConfig::from_toml_file("/nonexistent/keel.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn malformed_toml_is_a_typed_error() {
        let err = EngineConfig::from_toml_str("log_format = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
