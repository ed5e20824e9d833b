//! Wire types for the provider's search response.

use roomgeo_core::GeocodeResult;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProviderError;

/// Confidence assumed when the provider omits `importance`.
pub(crate) const DEFAULT_CONFIDENCE: f64 = 0.5;

/// One element of the provider's JSON array.
///
/// `lat`/`lon` arrive as decimal strings from Nominatim; numbers are accepted
/// too. `place_id` is numeric on Nominatim and a string on some mirrors.
#[derive(Debug, Deserialize)]
pub(crate) struct ProviderCandidate {
    #[serde(default)]
    lat: Value,
    #[serde(default)]
    lon: Value,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    place_id: Value,
    #[serde(default)]
    importance: Option<f64>,
}

impl ProviderCandidate {
    pub(crate) fn into_result(self) -> Result<GeocodeResult, ProviderError> {
        let latitude = parse_degrees(&self.lat, "lat")?;
        let longitude = parse_degrees(&self.lon, "lon")?;
        let confidence = self
            .importance
            .filter(|c| c.is_finite())
            .unwrap_or(DEFAULT_CONFIDENCE)
            .clamp(0.0, 1.0);
        let provider_place_id = match self.place_id {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        };

        Ok(GeocodeResult {
            latitude,
            longitude,
            display_name: self.display_name,
            provider_place_id,
            confidence,
        })
    }
}

fn parse_degrees(value: &Value, field: &str) -> Result<f64, ProviderError> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| ProviderError::MalformedCandidate(format!("{field} = {value}")))
}
