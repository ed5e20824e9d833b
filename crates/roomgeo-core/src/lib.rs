//! Shared types and configuration for the roomgeo geocoding workspace.

pub mod app_config;
pub mod config;
pub mod location;
pub mod records;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use location::{
    AccuracyLevel, Bounds, Coordinates, GeocodeResult, GeocodingStatus, LocationRecord,
    LocationSource, LocationUpdate,
};
pub use records::{load_records, save_records, RecordsFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read records file {path}: {source}")]
    RecordsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse records file: {0}")]
    RecordsFileParse(#[source] serde_yaml::Error),

    #[error("failed to serialize records: {0}")]
    RecordsFileSerialize(#[source] serde_json::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
