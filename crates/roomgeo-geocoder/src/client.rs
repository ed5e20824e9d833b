//! HTTP client for a Nominatim-compatible `search` endpoint.
//!
//! One call to [`GeocodeClient::resolve`] issues at most
//! `retry.max_retries + 1` requests, each gated by the shared
//! [`RateLimiter`]. Successful answers are cached per normalised address.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use roomgeo_core::GeocodeResult;

use crate::bounds::is_within_region;
use crate::cache::GeocodeCache;
use crate::config::GeocoderConfig;
use crate::error::{GeocodeError, ProviderError};
use crate::rate_limit::RateLimiter;
use crate::retry::retry_with_backoff;
use crate::types::ProviderCandidate;

const SEARCH_PATH: &str = "search";
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Address → coordinate lookups against the configured provider.
///
/// Use [`GeocodeClient::new`] with a [`GeocoderConfig`] pointing at the
/// production provider, or at a wiremock server in tests.
pub struct GeocodeClient {
    client: Client,
    base_url: Url,
    config: GeocoderConfig,
    limiter: Arc<RateLimiter>,
    cache: GeocodeCache,
}

impl GeocodeClient {
    /// Creates a client sharing `limiter` with every other provider caller
    /// in the process.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::InvalidRegion`] if the configured region is malformed.
    /// - [`GeocodeError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`GeocodeError::ClientBuild`] if the `reqwest::Client` cannot be built.
    pub fn new(config: GeocoderConfig, limiter: Arc<RateLimiter>) -> Result<Self, GeocodeError> {
        config
            .region
            .validate()
            .map_err(GeocodeError::InvalidRegion)?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout.min(MAX_CONNECT_TIMEOUT))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(GeocodeError::ClientBuild)?;

        // Exactly one trailing slash, so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocodeError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let cache = GeocodeCache::new(config.cache_ttl);

        Ok(Self {
            client,
            base_url,
            config,
            limiter,
            cache,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    /// Resolves one free-text address.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::InvalidInput`] for a blank address (no request made).
    /// - [`GeocodeError::NoMatch`] when the provider returns zero candidates
    ///   (not retried).
    /// - [`GeocodeError::ProviderUnavailable`] once transient failures have
    ///   used up the retry budget.
    pub async fn resolve(&self, address: &str) -> Result<GeocodeResult, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::InvalidInput);
        }

        if let Some(hit) = self.cache.get(address) {
            tracing::debug!(address, "geocode cache hit");
            return Ok(hit);
        }

        let query = self.build_query(address);
        let url = self.search_url(&query)?;

        let result = retry_with_backoff(self.config.retry, |attempt| {
            let url = url.clone();
            let query = query.clone();
            async move {
                self.limiter.acquire().await;
                tracing::debug!(attempt, query = %query, "querying geocoding provider");
                self.fetch_first_candidate(url, &query).await
            }
        })
        .await?;

        if is_within_region(result.latitude, result.longitude, &self.config.region) {
            self.cache.insert(address, result.clone());
        }
        Ok(result)
    }

    /// Appends the region suffix unless the address already names the
    /// suffix's leading component (typically the city).
    pub(crate) fn build_query(&self, address: &str) -> String {
        let suffix = self.config.region_suffix.trim();
        let Some(lead) = suffix
            .split(',')
            .map(str::trim)
            .find(|part| !part.is_empty())
        else {
            return address.to_owned();
        };

        if address.to_lowercase().contains(&lead.to_lowercase()) {
            address.to_owned()
        } else {
            format!("{address}, {suffix}")
        }
    }

    /// Builds the search URL with percent-encoded query parameters.
    fn search_url(&self, query: &str) -> Result<Url, GeocodeError> {
        let mut url = self
            .base_url
            .join(SEARCH_PATH)
            .map_err(|e| GeocodeError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            pairs.append_pair("format", "json");
            pairs.append_pair("limit", "1");
            if !self.config.country_codes.trim().is_empty() {
                pairs.append_pair("countrycodes", self.config.country_codes.trim());
            }
            pairs.append_pair("viewbox", &self.config.region.viewbox());
        }
        Ok(url)
    }

    /// One provider request. Every failure is returned as a
    /// [`ProviderError`] for the retry policy to judge.
    async fn fetch_first_candidate(
        &self,
        url: Url,
        query: &str,
    ) -> Result<GeocodeResult, ProviderError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let candidates: Vec<ProviderCandidate> =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: format!("search response for \"{query}\""),
                source: e,
            })?;

        let Some(first) = candidates.into_iter().next() else {
            return Err(ProviderError::NoMatch {
                query: query.to_owned(),
            });
        };

        first.into_result()
    }
}
