//! Environment-driven process configuration.
//!
//! # Responsibility
//! - Resolve store location and logging settings supplied out-of-band.
//! - Render a loggable summary of the resolved settings.
//!
//! # Invariants
//! - Resolution never panics; missing or empty values fall back to defaults.
//! - The repository layer never reads configuration; only process startup does.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "DB_PATH";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "confs.sqlite3";

/// Settings resolved at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_VAR).map(PathBuf::from),
        }
    }

    /// Summary line in the `key=value` logging format.
    pub fn describe(&self) -> String {
        format!(
            "db_path={} log_level={} log_dir={}",
            self.db_path.display(),
            self.log_level,
            self.log_dir
                .as_ref()
                .map_or_else(|| "none".to_string(), |dir| dir.display().to_string())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DB_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.db_path, PathBuf::from("confs.sqlite3"));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "/var/lib/confs/confs.db"),
            (LOG_LEVEL_VAR, "warn"),
            (LOG_DIR_VAR, "/var/log/confs"),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/var/lib/confs/confs.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/confs")));
        assert_eq!(
            config.describe(),
            "db_path=/var/lib/confs/confs.db log_level=warn log_dir=/var/log/confs"
        );
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[(DB_PATH_VAR, "  "), (LOG_DIR_VAR, "")]));
        assert_eq!(config.db_path, PathBuf::from("confs.sqlite3"));
        assert_eq!(config.log_dir, None);
    }
}
