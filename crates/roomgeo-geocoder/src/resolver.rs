//! End-to-end resolution of one address into a persistence-ready update.

use std::sync::Arc;

use chrono::Utc;
use roomgeo_core::{
    AccuracyLevel, Bounds, GeocodeResult, GeocodingStatus, LocationSource, LocationUpdate,
};

use crate::accuracy::{classify, is_known_region_match};
use crate::bounds::is_within_region;
use crate::client::GeocodeClient;
use crate::error::GeocodeError;

/// Outcome of one resolution, with the diagnostic detail the update alone
/// does not carry.
#[derive(Debug)]
pub struct Resolution {
    pub update: LocationUpdate,
    /// The accepted provider answer; `None` whenever the fallback was used.
    pub result: Option<GeocodeResult>,
    pub failure: Option<GeocodeError>,
}

impl Resolution {
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.update.is_fallback()
    }
}

/// Turns an address into a [`LocationUpdate`], falling back to the
/// configured reference point when resolution fails.
pub struct LocationResolver {
    client: Arc<GeocodeClient>,
}

impl LocationResolver {
    #[must_use]
    pub fn new(client: Arc<GeocodeClient>) -> Self {
        Self { client }
    }

    /// The configured region of interest (validated when the client was built).
    #[must_use]
    pub fn region(&self) -> &Bounds {
        &self.client.config().region
    }

    /// Resolves against the configured region.
    pub async fn resolve(&self, address: &str) -> LocationUpdate {
        let region = *self.region();
        self.resolve_and_prepare(address, &region).await
    }

    /// Resolves `address` and checks the answer against `region`.
    ///
    /// Never fails: every failure becomes a `failed` update with fallback
    /// coordinates and `source = fallback`.
    pub async fn resolve_and_prepare(&self, address: &str, region: &Bounds) -> LocationUpdate {
        self.resolve_detailed(address, region).await.update
    }

    /// Like [`resolve_and_prepare`](Self::resolve_and_prepare), also returning
    /// the raw provider answer and the typed failure.
    pub async fn resolve_detailed(&self, address: &str, region: &Bounds) -> Resolution {
        let result = match self.client.resolve(address).await {
            Ok(result) => result,
            Err(err) => {
                match &err {
                    GeocodeError::NoMatch { query } => {
                        tracing::info!(query = %query, "no geocoding match, using fallback");
                    }
                    other => {
                        tracing::warn!(address, error = %other, "geocoding failed, using fallback");
                    }
                }
                return self.fallback(err);
            }
        };

        if !is_within_region(result.latitude, result.longitude, region) {
            tracing::warn!(
                address,
                latitude = result.latitude,
                longitude = result.longitude,
                display_name = %result.display_name,
                "provider returned coordinates outside the region, rejecting"
            );
            return self.fallback(GeocodeError::OutOfBounds {
                latitude: result.latitude,
                longitude: result.longitude,
            });
        }

        let config = self.client.config();
        let region_match = is_known_region_match(&result.display_name, &config.region_markers);
        let accuracy = classify(result.confidence, region_match);

        let update = LocationUpdate {
            latitude: result.latitude,
            longitude: result.longitude,
            status: GeocodingStatus::Success,
            accuracy,
            source: LocationSource::Provider(config.provider_name.clone()),
            geocoded_at: Utc::now(),
            display_name: Some(result.display_name.clone()),
            provider_place_id: Some(result.provider_place_id.clone()),
            confidence: Some(result.confidence),
        };

        Resolution {
            update,
            result: Some(result),
            failure: None,
        }
    }

    /// The update written when resolution fails.
    #[must_use]
    pub fn fallback_update(&self) -> LocationUpdate {
        let fallback = self.client.config().fallback;
        LocationUpdate {
            latitude: fallback.latitude,
            longitude: fallback.longitude,
            status: GeocodingStatus::Failed,
            accuracy: AccuracyLevel::Low,
            source: LocationSource::Fallback,
            geocoded_at: Utc::now(),
            display_name: None,
            provider_place_id: None,
            confidence: None,
        }
    }

    fn fallback(&self, failure: GeocodeError) -> Resolution {
        Resolution {
            update: self.fallback_update(),
            result: None,
            failure: Some(failure),
        }
    }
}
