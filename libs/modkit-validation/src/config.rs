//! Configuration for constraint violation messages.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL};

/// Configuration error for typed config operations
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid constraint message config: {source}")]
    Invalid {
        #[source]
        source: serde_json::Error,
    },
}

/// Message cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstraintMessageConfig {
    /// How long a resolved message stays cached after it was written.
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,

    /// Upper bound on cached messages; `null` leaves the cache unbounded.
    pub cache_max_entries: Option<usize>,
}

impl Default for ConstraintMessageConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_TTL,
            cache_max_entries: Some(DEFAULT_MAX_ENTRIES),
        }
    }
}

impl ConstraintMessageConfig {
    /// Lenient loader: a missing section yields defaults.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if the section exists but cannot be deserialized.
    pub fn from_module_section(section: Option<&serde_json::Value>) -> Result<Self, ConfigError> {
        let Some(section) = section else {
            return Ok(Self::default());
        };
        Self::deserialize(section).map_err(|source| ConfigError::Invalid { source })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_section_uses_defaults() {
        let cfg = ConstraintMessageConfig::from_module_section(None).unwrap();
        assert_eq!(cfg.cache_ttl, Duration::from_secs(3600));
        assert_eq!(cfg.cache_max_entries, Some(10_000));
    }

    #[test]
    fn partial_section_fills_defaults() {
        let section = json!({ "cache_ttl": "15m" });
        let cfg = ConstraintMessageConfig::from_module_section(Some(&section)).unwrap();
        assert_eq!(cfg.cache_ttl, Duration::from_secs(15 * 60));
        assert_eq!(cfg.cache_max_entries, Some(10_000));
    }

    #[test]
    fn null_bound_means_unbounded() {
        let section = json!({ "cache_ttl": "250ms", "cache_max_entries": null });
        let cfg = ConstraintMessageConfig::from_module_section(Some(&section)).unwrap();
        assert_eq!(cfg.cache_ttl, Duration::from_millis(250));
        assert_eq!(cfg.cache_max_entries, None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let section = json!({ "cache_size": 10 });
        let err = ConstraintMessageConfig::from_module_section(Some(&section)).unwrap_err();
        assert!(err.to_string().contains("cache_size"));
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let section = json!({ "cache_ttl": "forever" });
        assert!(ConstraintMessageConfig::from_module_section(Some(&section)).is_err());
    }

    #[test]
    fn compound_durations_are_accepted() {
        let section = json!({ "cache_ttl": "1h 30m" });
        let cfg = ConstraintMessageConfig::from_module_section(Some(&section)).unwrap();
        assert_eq!(cfg.cache_ttl, Duration::from_secs(90 * 60));
    }

    #[test]
    fn ttl_serializes_as_humantime() {
        let json = serde_json::to_value(ConstraintMessageConfig::default()).unwrap();
        assert_eq!(json["cache_ttl"], "1h");
        assert_eq!(json["cache_max_entries"], 10_000);
    }
}
