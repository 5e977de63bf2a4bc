//! Great-circle distance and travel-time estimates.

use crate::types::Coordinates;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two points in kilometers.
///
/// Symmetric in its arguments and zero for identical points.
#[must_use]
pub fn haversine_km(origin: Coordinates, point: Coordinates) -> f64 {
    let d_lat = (point.lat - origin.lat).to_radians();
    let d_lon = (point.lon - origin.lon).to_radians();
    let lat1 = origin.lat.to_radians();
    let lat2 = point.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Rough travel time in minutes for `distance_km` at `speed_kmh`, rounded
/// to one decimal place.
#[must_use]
pub fn estimate_travel_minutes(distance_km: f64, speed_kmh: f64) -> Option<f64> {
    if !distance_km.is_finite() || distance_km < 0.0 || !speed_kmh.is_finite() || speed_kmh <= 0.0
    {
        return None;
    }
    let minutes = distance_km / speed_kmh * 60.0;
    Some((minutes * 10.0).round() / 10.0)
}
