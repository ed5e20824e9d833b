//! Region-of-interest checks for provider coordinates.

use roomgeo_core::Bounds;

/// Returns `true` when `(lat, lng)` lies inside `region`, edges included.
///
/// The provider's viewbox is only a hint, so every answer is re-checked here
/// before it can be marked `success`.
#[must_use]
pub fn is_within_region(lat: f64, lng: f64, region: &Bounds) -> bool {
    region.contains(lat, lng)
}
