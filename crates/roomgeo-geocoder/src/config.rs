use std::time::Duration;

use roomgeo_core::{AppConfig, Bounds, Coordinates};

use crate::retry::RetryPolicy;

/// Everything the geocoder needs, passed explicitly at construction.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Provider root; the client appends `search`.
    pub base_url: String,
    /// Written to `source` on successful updates.
    pub provider_name: String,
    pub user_agent: String,
    /// Comma-separated ISO 3166-1 alpha-2 filter, e.g. `"us"`.
    pub country_codes: String,
    /// Appended to every query unless the address already names the region.
    pub region_suffix: String,
    pub region: Bounds,
    pub fallback: Coordinates,
    pub region_markers: Vec<String>,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub rate_limit_interval: Duration,
    pub cache_ttl: Duration,
}

impl GeocoderConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.provider_url.clone(),
            provider_name: config.provider_name.clone(),
            user_agent: config.user_agent.clone(),
            country_codes: config.country_codes.clone(),
            region_suffix: config.region_suffix.clone(),
            region: config.region,
            fallback: config.fallback,
            region_markers: config.region_markers.clone(),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff_unit: Duration::from_millis(config.retry_backoff_ms),
            },
            rate_limit_interval: Duration::from_millis(config.rate_limit_interval_ms),
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
        }
    }
}
