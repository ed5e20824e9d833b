use crate::app_config::AppConfig;
use crate::location::{Bounds, Coordinates};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or the region is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files. Useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or the region is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup. No `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<f64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let log_level = or_default("ROOMGEO_LOG_LEVEL", "info");
    let provider_url = or_default(
        "ROOMGEO_PROVIDER_URL",
        "https://nominatim.openstreetmap.org/",
    );
    let provider_name = or_default("ROOMGEO_PROVIDER_NAME", "nominatim");
    let user_agent = or_default("ROOMGEO_USER_AGENT", "roomgeo/0.1 (room-booking-admin)");
    let country_codes = or_default("ROOMGEO_COUNTRY_CODES", "us");
    let region_suffix = or_default("ROOMGEO_REGION_SUFFIX", "Boston, MA, USA");

    let region = Bounds {
        north: parse_f64("ROOMGEO_REGION_NORTH", "42.45")?,
        south: parse_f64("ROOMGEO_REGION_SOUTH", "42.30")?,
        east: parse_f64("ROOMGEO_REGION_EAST", "-70.98")?,
        west: parse_f64("ROOMGEO_REGION_WEST", "-71.20")?,
    };
    let fallback = Coordinates {
        latitude: parse_f64("ROOMGEO_FALLBACK_LAT", "42.3505")?,
        longitude: parse_f64("ROOMGEO_FALLBACK_LON", "-71.1054")?,
    };
    let region_markers = parse_markers(&or_default("ROOMGEO_REGION_MARKERS", "boston,massachusetts"));

    let request_timeout_ms = parse_u64("ROOMGEO_REQUEST_TIMEOUT_MS", "5000")?;
    let max_retries = parse_u32("ROOMGEO_MAX_RETRIES", "2")?;
    let retry_backoff_ms = parse_u64("ROOMGEO_RETRY_BACKOFF_MS", "1000")?;
    let rate_limit_interval_ms = parse_u64("ROOMGEO_RATE_LIMIT_INTERVAL_MS", "1100")?;
    let cache_ttl_secs = parse_u64("ROOMGEO_CACHE_TTL_SECS", "600")?;

    if provider_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "ROOMGEO_PROVIDER_NAME must be non-empty".to_string(),
        ));
    }
    if matches!(provider_name.as_str(), "fallback" | "manual") {
        return Err(ConfigError::Validation(format!(
            "ROOMGEO_PROVIDER_NAME '{provider_name}' collides with a reserved source name"
        )));
    }
    if request_timeout_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ROOMGEO_REQUEST_TIMEOUT_MS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    validate_region(&region, &fallback)?;

    Ok(AppConfig {
        log_level,
        provider_url,
        provider_name,
        user_agent,
        country_codes,
        region_suffix,
        region,
        fallback,
        region_markers,
        request_timeout_ms,
        max_retries,
        retry_backoff_ms,
        rate_limit_interval_ms,
        cache_ttl_secs,
    })
}

/// Split a comma-separated marker list, dropping blanks and lowercasing.
fn parse_markers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// The region must be well formed and contain the fallback point.
fn validate_region(region: &Bounds, fallback: &Coordinates) -> Result<(), ConfigError> {
    region.validate().map_err(ConfigError::Validation)?;
    if !region.contains(fallback.latitude, fallback.longitude) {
        return Err(ConfigError::Validation(format!(
            "fallback point ({}, {}) lies outside the configured region",
            fallback.latitude, fallback.longitude
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
