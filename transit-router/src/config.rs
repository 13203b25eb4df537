//! Router configuration.
//!
//! Everything here is process-wide and read once at start-up. The file
//! format is JSON; every field has a default, so an empty object is a valid
//! configuration.

use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::cache::CacheConfig;
use crate::raptor::{CostModel, RaptorTuning};
use crate::transit::Slack;

/// Error loading or validating a [`RouterConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Paging settings for the search-window controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Minutes added to the search window when fewer itineraries than
    /// requested were found, indexed by the number found. Must not increase.
    pub search_window_adjustments_mins: Vec<i64>,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            search_window_adjustments_mins: vec![240, 120, 60, 30, 20, 10],
        }
    }
}

impl PagingConfig {
    /// Returns the adjustments as Durations.
    pub fn search_window_adjustments(&self) -> Vec<Duration> {
        self.search_window_adjustments_mins
            .iter()
            .map(|&m| Duration::minutes(m))
            .collect()
    }
}

/// Configuration for the routing worker and everything it drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub raptor: RaptorTuning,

    pub paging: PagingConfig,

    /// Minimum dwell times used by the transit search.
    pub slack: Slack,

    /// Generalized cost weights used by the transit search.
    pub cost: CostModel,

    pub cache: CacheConfig,

    /// Run the direct street, direct flex and transit searches concurrently.
    pub parallel_routing: bool,

    /// Run the direct flex search at all.
    pub flex_routing: bool,

    /// Time budget per request (seconds), applied when the request has no
    /// deadline of its own.
    pub request_timeout_secs: Option<u64>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            raptor: RaptorTuning::default(),
            paging: PagingConfig::default(),
            slack: Slack::default(),
            cost: CostModel::default(),
            cache: CacheConfig::default(),
            parallel_routing: true,
            flex_routing: false,
            request_timeout_secs: None,
        }
    }
}

impl RouterConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check values serde cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dsw = &self.raptor.dynamic_search_window;
        if dsw.min_window_mins < 0 || dsw.min_window_mins > dsw.max_window_mins {
            return Err(ConfigError::Invalid(format!(
                "search window bounds {}..{} minutes are not a range",
                dsw.min_window_mins, dsw.max_window_mins
            )));
        }
        if self.raptor.iteration_step_secs <= 0 {
            return Err(ConfigError::Invalid(
                "iteration_step_secs must be positive".to_string(),
            ));
        }
        let adjustments = &self.paging.search_window_adjustments_mins;
        if adjustments.is_empty() {
            return Err(ConfigError::Invalid(
                "search_window_adjustments_mins must not be empty".to_string(),
            ));
        }
        if adjustments.iter().any(|&m| m < 0) || adjustments.windows(2).any(|w| w[1] > w[0]) {
            return Err(ConfigError::Invalid(format!(
                "search_window_adjustments_mins must be non-negative and non-increasing: {adjustments:?}"
            )));
        }
        Ok(())
    }

    /// Returns the request time budget as a std Duration.
    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.request_timeout_secs.map(std::time::Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config() {
        let config = RouterConfig::default();

        assert!(config.parallel_routing);
        assert!(!config.flex_routing);
        assert_eq!(config.raptor.max_transfers, 12);
        assert_eq!(config.slack.transfer, 60);
        assert_eq!(config.request_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn duration_methods() {
        let config = PagingConfig::default();
        let adjustments = config.search_window_adjustments();

        assert_eq!(adjustments[0], Duration::hours(4));
        assert_eq!(adjustments[5], Duration::minutes(10));
    }

    #[test]
    fn empty_object_is_default() {
        let config = RouterConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RouterConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = RouterConfig::from_json_str(
            r#"{
                "flex_routing": true,
                "request_timeout_secs": 5,
                "slack": {"transfer": 120},
                "raptor": {"dynamic_search_window": {"max_window_mins": 240}}
            }"#,
        )
        .unwrap();

        assert!(config.flex_routing);
        assert_eq!(config.request_timeout(), Some(std::time::Duration::from_secs(5)));
        assert_eq!(config.slack.transfer, 120);
        assert_eq!(config.slack.board, 0);
        assert_eq!(config.raptor.dynamic_search_window.max_window_mins, 240);
        assert_eq!(config.raptor.dynamic_search_window.min_window_mins, 40);
    }

    #[test]
    fn increasing_adjustments_are_rejected() {
        let err = RouterConfig::from_json_str(
            r#"{"paging": {"search_window_adjustments_mins": [10, 20]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn inverted_window_bounds_are_rejected() {
        let err = RouterConfig::from_json_str(
            r#"{"raptor": {"dynamic_search_window": {"min_window_mins": 200}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid config"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = RouterConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"parallel_routing": false}}"#).unwrap();

        let config = RouterConfig::load(file.path()).unwrap();
        assert!(!config.parallel_routing);

        let missing = RouterConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
