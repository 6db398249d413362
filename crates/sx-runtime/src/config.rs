use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Macro option key that carries the expression text.
    pub macro_field: String,
    /// Text committed when the outcome is empty or a diagnostic.
    pub fallback_result: String,
    /// Also commit the fallback for NaN and infinite values.
    pub finite_only: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            macro_field: "expr".to_owned(),
            fallback_result: "0.0".to_owned(),
            finite_only: false,
        }
    }
}

impl HostConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.macro_field.is_empty() || self.macro_field.contains([' ', '=']) {
            return Err(ConfigError::Invalid(
                "macro_field must be a non-empty word without spaces or '='",
            ));
        }
        if self.fallback_result.trim().parse::<f64>().is_err() {
            return Err(ConfigError::Invalid("fallback_result must be a decimal number"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{ConfigError, HostConfig};

    #[test]
    fn defaults_match_the_macro_host() {
        let config = HostConfig::default();
        assert_eq!(config.macro_field, "expr");
        assert_eq!(config.fallback_result, "0.0");
        assert!(!config.finite_only);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = HostConfig::from_json_str(r#"{"finite_only": true}"#).expect("config");
        assert!(config.finite_only);
        assert_eq!(config.macro_field, "expr");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = HostConfig::from_json_str(r#"{"macro": "x"}"#).expect_err("unknown key");
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn fallback_must_be_numeric() {
        let err = HostConfig::from_json_str(r#"{"fallback_result": "none"}"#).expect_err("bad");
        assert_eq!(
            err.to_string(),
            "invalid configuration: fallback_result must be a decimal number"
        );
    }

    #[test]
    fn macro_field_must_be_a_word() {
        let err = HostConfig::from_json_str(r#"{"macro_field": "my expr"}"#).expect_err("bad");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{"macro_field": "score", "fallback_result": "-1"}}"#).expect("write");
        let config = HostConfig::from_path(file.path()).expect("config");
        assert_eq!(config.macro_field, "score");
        assert_eq!(config.fallback_result, "-1");
    }
}
