use crate::location::{Bounds, Coordinates};

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub provider_url: String,
    pub provider_name: String,
    pub user_agent: String,
    pub country_codes: String,
    pub region_suffix: String,
    pub region: Bounds,
    pub fallback: Coordinates,
    pub region_markers: Vec<String>,
    pub request_timeout_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub rate_limit_interval_ms: u64,
    pub cache_ttl_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("provider_url", &redact_userinfo(&self.provider_url))
            .field("provider_name", &self.provider_name)
            .field("user_agent", &self.user_agent)
            .field("country_codes", &self.country_codes)
            .field("region_suffix", &self.region_suffix)
            .field("region", &self.region)
            .field("fallback", &self.fallback)
            .field("region_markers", &self.region_markers)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("rate_limit_interval_ms", &self.rate_limit_interval_ms)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .finish()
    }
}

/// Hides `user:password@` in a URL so hosted provider keys never reach logs.
fn redact_userinfo(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_owned();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{scheme}://[redacted]@{}", &rest[at + 1..]),
        None => url.to_owned(),
    }
}
