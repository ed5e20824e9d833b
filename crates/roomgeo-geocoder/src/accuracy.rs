//! Confidence → accuracy classification.

use roomgeo_core::AccuracyLevel;

const KNOWN_REGION_HIGH: f64 = 0.7;
const HIGH: f64 = 0.8;
const MEDIUM: f64 = 0.5;

/// Maps a provider confidence score to an [`AccuracyLevel`].
///
/// Rules, first match wins:
///
/// | condition | level |
/// |-----------|-------|
/// | known-region match and `confidence > 0.7` | `high` |
/// | `confidence > 0.8` | `high` |
/// | `confidence > 0.5` | `medium` |
/// | otherwise | `low` |
///
/// A known-region match is trusted at a lower threshold than an
/// uncorroborated one. The two thresholds are pending calibration against
/// real provider output.
#[must_use]
pub fn classify(confidence: f64, is_known_region_match: bool) -> AccuracyLevel {
    if (is_known_region_match && confidence > KNOWN_REGION_HIGH) || confidence > HIGH {
        AccuracyLevel::High
    } else if confidence > MEDIUM {
        AccuracyLevel::Medium
    } else {
        AccuracyLevel::Low
    }
}

/// `true` when the provider's display name mentions any region marker.
///
/// Markers are compared case-insensitively; blank markers never match.
#[must_use]
pub fn is_known_region_match(display_name: &str, markers: &[String]) -> bool {
    let haystack = display_name.to_lowercase();
    markers
        .iter()
        .map(|m| m.trim().to_lowercase())
        .any(|m| !m.is_empty() && haystack.contains(&m))
}
