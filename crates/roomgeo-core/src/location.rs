//! Location data model shared by the geocoder and its callers.
//!
//! A [`LocationRecord`] is owned by the booking backend. The geocoding
//! subsystem only reads its `address` and writes the output fields carried by
//! a [`LocationUpdate`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rectangular region of interest, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    /// Closed-interval containment test on both axes.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.south
            && latitude <= self.north
            && longitude >= self.west
            && longitude <= self.east
    }

    /// Checks that the region is well formed.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when any edge is non-finite or out of
    /// range, or when the edges are inverted.
    pub fn validate(&self) -> Result<(), String> {
        let edges = [
            ("north", self.north),
            ("south", self.south),
            ("east", self.east),
            ("west", self.west),
        ];
        if let Some((name, _)) = edges.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("region {name} edge is not a finite number"));
        }
        if !(-90.0..=90.0).contains(&self.north) || !(-90.0..=90.0).contains(&self.south) {
            return Err("region latitudes must be within [-90, 90]".to_string());
        }
        if !(-180.0..=180.0).contains(&self.east) || !(-180.0..=180.0).contains(&self.west) {
            return Err("region longitudes must be within [-180, 180]".to_string());
        }
        if self.north < self.south {
            return Err(format!(
                "region north ({}) is below south ({})",
                self.north, self.south
            ));
        }
        if self.east < self.west {
            return Err(format!(
                "region east ({}) is west of west ({})",
                self.east, self.west
            ));
        }
        Ok(())
    }

    /// Provider viewbox hint: the region corners as `x1,y1,x2,y2`
    /// (`west,north,east,south`).
    #[must_use]
    pub fn viewbox(&self) -> String {
        format!("{},{},{},{}", self.west, self.north, self.east, self.south)
    }
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Coarse match quality derived from the provider's confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyLevel {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for AccuracyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccuracyLevel::High => write!(f, "high"),
            AccuracyLevel::Medium => write!(f, "medium"),
            AccuracyLevel::Low => write!(f, "low"),
        }
    }
}

/// Lifecycle of a record's coordinate assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocodingStatus {
    #[default]
    Pending,
    Success,
    Failed,
    Manual,
}

impl std::fmt::Display for GeocodingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeocodingStatus::Pending => write!(f, "pending"),
            GeocodingStatus::Success => write!(f, "success"),
            GeocodingStatus::Failed => write!(f, "failed"),
            GeocodingStatus::Manual => write!(f, "manual"),
        }
    }
}

/// Where a record's coordinates came from.
///
/// Serialised as a bare string: the provider name, `"fallback"`, or
/// `"manual"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LocationSource {
    Provider(String),
    Fallback,
    Manual,
}

impl LocationSource {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            LocationSource::Provider(name) => name,
            LocationSource::Fallback => "fallback",
            LocationSource::Manual => "manual",
        }
    }
}

impl From<String> for LocationSource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "fallback" => LocationSource::Fallback,
            "manual" => LocationSource::Manual,
            _ => LocationSource::Provider(value),
        }
    }
}

impl From<LocationSource> for String {
    fn from(value: LocationSource) -> Self {
        value.as_str().to_owned()
    }
}

impl std::fmt::Display for LocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One provider candidate accepted as the answer for an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
    pub provider_place_id: String,
    /// Provider importance score, clamped to `[0, 1]`.
    pub confidence: f64,
}

impl GeocodeResult {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Persistence-ready geocoding output for one record.
///
/// Coordinates are always populated: either the provider's answer or the
/// configured fallback point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
    pub status: GeocodingStatus,
    pub accuracy: AccuracyLevel,
    pub source: LocationSource,
    pub geocoded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl LocationUpdate {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == LocationSource::Fallback
    }
}

/// A building or room location owned by the booking backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub status: GeocodingStatus,
    #[serde(default)]
    pub accuracy: Option<AccuracyLevel>,
    #[serde(default)]
    pub source: Option<LocationSource>,
    #[serde(default)]
    pub geocoded_at: Option<DateTime<Utc>>,
}

impl LocationRecord {
    /// A fresh `pending` record with no coordinates.
    #[must_use]
    pub fn pending(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            address: Some(address.into()),
            latitude: None,
            longitude: None,
            status: GeocodingStatus::Pending,
            accuracy: None,
            source: None,
            geocoded_at: None,
        }
    }

    /// The trimmed address, or `None` when missing or blank.
    #[must_use]
    pub fn usable_address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    /// Label used in progress output: the name if present, else the address,
    /// else the id.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.usable_address())
            .unwrap_or(&self.id)
    }

    /// Overwrites the geocoding output fields. The address is never touched.
    pub fn apply_update(&mut self, update: &LocationUpdate) {
        self.latitude = Some(update.latitude);
        self.longitude = Some(update.longitude);
        self.status = update.status;
        self.accuracy = Some(update.accuracy);
        self.source = Some(update.source.clone());
        self.geocoded_at = Some(update.geocoded_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boston() -> Bounds {
        Bounds {
            north: 42.45,
            south: 42.30,
            east: -70.98,
            west: -71.20,
        }
    }

    #[test]
    fn contains_includes_edges() {
        let b = boston();
        assert!(b.contains(42.45, -71.0));
        assert!(b.contains(42.30, -71.20));
        assert!(b.contains(42.35, -70.98));
        assert!(!b.contains(42.4501, -71.0));
        assert!(!b.contains(42.35, -70.9799));
    }

    #[test]
    fn validate_rejects_inverted_latitudes() {
        let mut b = boston();
        b.north = 42.0;
        let err = b.validate().unwrap_err();
        assert!(err.contains("below south"), "got: {err}");
    }

    #[test]
    fn validate_rejects_nan() {
        let mut b = boston();
        b.west = f64::NAN;
        assert!(b.validate().is_err());
    }

    #[test]
    fn validate_accepts_default_region() {
        assert!(boston().validate().is_ok());
    }

    #[test]
    fn viewbox_is_west_north_east_south() {
        assert_eq!(boston().viewbox(), "-71.2,42.45,-70.98,42.3");
    }

    #[test]
    fn source_serializes_as_plain_string() {
        let json = serde_json::to_string(&LocationSource::Fallback).unwrap();
        assert_eq!(json, "\"fallback\"");
        let provider: LocationSource = serde_json::from_str("\"nominatim\"").unwrap();
        assert_eq!(provider, LocationSource::Provider("nominatim".to_string()));
        let manual: LocationSource = serde_json::from_str("\"manual\"").unwrap();
        assert_eq!(manual, LocationSource::Manual);
    }

    #[test]
    fn status_defaults_to_pending_when_absent() {
        let record: LocationRecord =
            serde_json::from_str(r#"{"id":"b-1","address":"1 Silber Way"}"#).unwrap();
        assert_eq!(record.status, GeocodingStatus::Pending);
        assert!(record.latitude.is_none());
    }

    #[test]
    fn usable_address_rejects_blank() {
        let record = LocationRecord::pending("b-1", "   ");
        assert!(record.usable_address().is_none());
        assert_eq!(record.label(), "b-1");
    }

    #[test]
    fn apply_update_overwrites_output_fields_only() {
        let mut record = LocationRecord::pending("b-1", "775 Commonwealth Ave");
        let update = LocationUpdate {
            latitude: 42.3505,
            longitude: -71.1054,
            status: GeocodingStatus::Success,
            accuracy: AccuracyLevel::High,
            source: LocationSource::Provider("nominatim".to_string()),
            geocoded_at: Utc::now(),
            display_name: None,
            provider_place_id: None,
            confidence: Some(0.85),
        };
        record.apply_update(&update);
        assert_eq!(record.address.as_deref(), Some("775 Commonwealth Ave"));
        assert_eq!(record.latitude, Some(42.3505));
        assert_eq!(record.status, GeocodingStatus::Success);
        assert_eq!(record.accuracy, Some(AccuracyLevel::High));
    }
}
