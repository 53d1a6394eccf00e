//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::schema::{ConfigurationError, SchemaRegistry};

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = ".qcr.yaml";

/// QCR configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Column name overrides, keyed by logical field (e.g. `auditor: "Auditor Name"`)
    pub columns: BTreeMap<String, String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Wrap width for long text in case detail output
    pub wrap_width: Option<usize>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/qcr/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Config in the current directory (./.qcr.yaml)
        if let Ok(cwd) = std::env::current_dir() {
            if let Some(local) = Self::read_file(&cwd.join(LOCAL_CONFIG_FILE)) {
                config.merge(local);
            }
        }

        // 4. Environment variables
        if let Ok(format) = std::env::var("QCR_FORMAT") {
            config.default_format = Some(format);
        }

        config
    }

    /// Parse a config file, ignoring it (with a warning) if it is malformed
    pub fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config file");
                return None;
            }
        };
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config file");
                Some(config)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "qcr")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        self.columns.extend(other.columns);
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.wrap_width.is_some() {
            self.wrap_width = other.wrap_width;
        }
    }

    /// Build the schema registry, applying column overrides
    pub fn schema(&self) -> Result<SchemaRegistry, ConfigurationError> {
        SchemaRegistry::with_overrides(&self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::Field;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_uses_builtin_schema() {
        let config = Config::default();
        assert_eq!(config.schema().unwrap(), SchemaRegistry::default());
    }

    #[test]
    fn test_read_file_parses_columns() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "columns:").unwrap();
        writeln!(file, "  auditor: Auditor Name").unwrap();
        writeln!(file, "  address_id: Address ID").unwrap();
        writeln!(file, "wrap_width: 60").unwrap();
        file.flush().unwrap();

        let config = Config::read_file(file.path()).unwrap();
        assert_eq!(config.wrap_width, Some(60));
        let schema = config.schema().unwrap();
        assert_eq!(schema.column(Field::Auditor), "Auditor Name");
        assert_eq!(schema.column(Field::AddressId), "Address ID");
    }

    #[test]
    fn test_read_file_ignores_malformed_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "columns: [not, a, map").unwrap();
        file.flush().unwrap();
        assert!(Config::read_file(file.path()).is_none());
    }

    #[test]
    fn test_read_file_missing_path() {
        assert!(Config::read_file(Path::new("/nonexistent/.qcr.yaml")).is_none());
    }

    #[test]
    fn test_merge_precedence() {
        let mut base = Config::default();
        base.columns.insert("auditor".into(), "a".into());
        base.columns.insert("week".into(), "w".into());
        base.default_format = Some("tsv".into());

        let mut over = Config::default();
        over.columns.insert("auditor".into(), "b".into());
        over.wrap_width = Some(40);

        base.merge(over);
        assert_eq!(base.columns.get("auditor").map(String::as_str), Some("b"));
        assert_eq!(base.columns.get("week").map(String::as_str), Some("w"));
        assert_eq!(base.default_format.as_deref(), Some("tsv"));
        assert_eq!(base.wrap_width, Some(40));
    }

    #[test]
    fn test_unknown_column_key_is_an_error() {
        let mut config = Config::default();
        config.columns.insert("auditors".into(), "x".into());
        assert!(config.schema().is_err());
    }
}
