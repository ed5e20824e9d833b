//! Record files consumed and produced by the CLI batch command.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::location::LocationRecord;
use crate::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordsFile {
    pub records: Vec<LocationRecord>,
}

/// Load and validate a record file. YAML and JSON are both accepted.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_records(path: &Path) -> Result<RecordsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RecordsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let records_file: RecordsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::RecordsFileParse)?;

    validate_records(&records_file)?;

    Ok(records_file)
}

/// Write a record file as pretty-printed JSON.
///
/// # Errors
///
/// Returns `ConfigError` if serialisation or the write fails.
pub fn save_records(path: &Path, records_file: &RecordsFile) -> Result<(), ConfigError> {
    let body =
        serde_json::to_string_pretty(records_file).map_err(ConfigError::RecordsFileSerialize)?;
    std::fs::write(path, body).map_err(|e| ConfigError::RecordsFileIo {
        path: path.display().to_string(),
        source: e,
    })
}

fn validate_records(records_file: &RecordsFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for record in &records_file.records {
        if record.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "record id must be non-empty".to_string(),
            ));
        }
        if !seen_ids.insert(record.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate record id: '{}'",
                record.id
            )));
        }
    }

    Ok(())
}
