//! Session configuration.
//!
//! ```toml
//! model = "esperanza"
//! poll_period_ms = 100
//! max_report_len = 128
//! product_filter = { substring = "Joystick" }
//! ```
//!
//! Every key is optional. `poll_period_ms` and `max_report_len` must be non-zero.

use crate::backends::ProductFilter;
use crate::error::ConfigError;
use crate::model::ControllerModel;
use crate::session::{MAX_REPORT_LEN, POLL_PERIOD};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Decoder and mappings to use.
    pub model: ControllerModel,
    /// Background polling period in milliseconds.
    pub poll_period_ms: u64,
    /// Largest report read in one go.
    pub max_report_len: usize,
    /// Which enumerated devices count as gamepads.
    pub product_filter: ProductFilter,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: ControllerModel::default(),
            poll_period_ms: POLL_PERIOD.as_millis() as u64,
            max_report_len: MAX_REPORT_LEN,
            product_filter: ProductFilter::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Rejects values that would lose every report or spin the poller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_period_ms == 0 {
            return Err(ConfigError::Invalid("poll_period_ms must be at least 1"));
        }
        if self.max_report_len == 0 {
            return Err(ConfigError::Invalid("max_report_len must be at least 1"));
        }
        Ok(())
    }

    /// Polling period, falling back to the default when set to zero.
    pub fn poll_period(&self) -> Duration {
        match self.poll_period_ms {
            0 => POLL_PERIOD,
            ms => Duration::from_millis(ms),
        }
    }

    /// Report buffer size, falling back to the default when set to zero.
    pub fn report_len(&self) -> usize {
        match self.max_report_len {
            0 => MAX_REPORT_LEN,
            len => len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.poll_period(), Duration::from_millis(100));
        assert_eq!(config.max_report_len, 128);
        assert_eq!(
            config.product_filter,
            ProductFilter::Substring("Joystick".into())
        );
    }

    #[test]
    fn parses_every_key() {
        let config = SessionConfig::from_toml_str(
            r#"
            model = "microntek"
            poll_period_ms = 20
            max_report_len = 64
            product_filter = { substring_ignore_case = "gamepad" }
            "#,
        )
        .unwrap();
        assert_eq!(config.model, ControllerModel::Microntek);
        assert_eq!(config.poll_period(), Duration::from_millis(20));
        assert_eq!(config.max_report_len, 64);
        assert_eq!(
            config.product_filter,
            ProductFilter::SubstringIgnoreCase("gamepad".into())
        );
    }

    #[test]
    fn any_filter_is_a_bare_string() {
        let config = SessionConfig::from_toml_str("product_filter = \"any\"").unwrap();
        assert_eq!(config.product_filter, ProductFilter::Any);
    }

    #[test]
    fn zero_period_and_len_are_rejected() {
        assert!(matches!(
            SessionConfig::from_toml_str("poll_period_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SessionConfig::from_toml_str("max_report_len = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SessionConfig::from_toml_str("poll_period_ms = 0\nmax_report_len = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn zero_values_built_in_code_fall_back_to_defaults() {
        let config = SessionConfig {
            poll_period_ms: 0,
            max_report_len: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.poll_period(), POLL_PERIOD);
        assert_eq!(config.report_len(), MAX_REPORT_LEN);
    }

    #[test]
    fn unknown_model_is_a_parse_error() {
        assert!(matches!(
            SessionConfig::from_toml_str("model = \"xbox\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
