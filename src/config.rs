//! Runtime settings.
//!
//! Loaded with the `config` crate from an optional TOML file, then overridden
//! by `MEASUREMENT_*` environment variables (e.g. `MEASUREMENT_MAX_BATCH_ROWS`).

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    COMPRESSION_SNAPPY, DEFAULT_CONFIG_FILE, DEFAULT_STORE_PATH, ENV_PREFIX, LAST_RECORDS_LIMIT,
    MAX_BATCH_ROWS, MIN_BATCH_ROWS,
};
use crate::utils::datetime::earliest_valid_timestamp;
use chrono::{DateTime, Utc};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    /// JSON snapshot backing the record store
    pub store_path: PathBuf,

    /// Inclusive lower bound for measurement timestamps
    pub earliest_valid_date: DateTime<Utc>,

    pub min_batch_rows: usize,

    #[validate(range(min = 1))]
    pub max_batch_rows: usize,

    #[validate(range(min = 1))]
    pub last_records_limit: usize,

    /// Delete rows linked to a replaced summary on re-upload
    pub replace_previous_records: bool,

    pub use_mmap: bool,

    /// Parquet export compression
    pub compression: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            earliest_valid_date: earliest_valid_timestamp(),
            min_batch_rows: MIN_BATCH_ROWS,
            max_batch_rows: MAX_BATCH_ROWS,
            last_records_limit: LAST_RECORDS_LIMIT,
            replace_previous_records: false,
            use_mmap: false,
            compression: COMPRESSION_SNAPPY.to_string(),
        }
    }
}

impl Settings {
    /// Load settings. An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.check()?;
        debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if self.min_batch_rows > self.max_batch_rows {
            return Err(ProcessingError::Config(format!(
                "min_batch_rows ({}) exceeds max_batch_rows ({})",
                self.min_batch_rows, self.max_batch_rows
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.min_batch_rows, 1);
        assert_eq!(settings.max_batch_rows, 10_000);
        assert_eq!(settings.last_records_limit, 10);
        assert!(!settings.replace_previous_records);
        assert!(settings.check().is_ok());
    }

    #[test]
    fn test_load_from_file_keeps_unset_defaults() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "max_batch_rows = 500")?;
        writeln!(file, "replace_previous_records = true")?;
        writeln!(file, "store_path = \"/tmp/measurements.json\"")?;

        let settings = Settings::load(Some(file.path()))?;
        assert_eq!(settings.max_batch_rows, 500);
        assert!(settings.replace_previous_records);
        assert_eq!(settings.store_path, PathBuf::from("/tmp/measurements.json"));
        assert_eq!(settings.last_records_limit, 10);
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/measurement.toml")));
        assert!(matches!(result, Err(ProcessingError::Settings(_))));
    }

    #[test]
    fn test_check_rejects_bad_limits() {
        let settings = Settings {
            last_records_limit: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.check(), Err(ProcessingError::Invariant(_))));

        let settings = Settings {
            min_batch_rows: 20,
            max_batch_rows: 10,
            ..Settings::default()
        };
        assert!(matches!(settings.check(), Err(ProcessingError::Config(_))));
    }
}
