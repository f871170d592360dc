//! Coordinates and great-circle distance.
//!
//! The nearby-seller lookup is a pure geometric computation: the haversine
//! distance between the buyer's device fix and each seller's stored
//! coordinates, thresholded at a fixed radius.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Fixed radius within which a seller counts as "nearby".
pub const NEARBY_RADIUS_KM: f64 = 2.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create coordinates from decimal degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another point, in kilometers.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_km(*self, *other)
    }

    /// Whether another point lies within the nearby radius.
    #[must_use]
    pub fn is_nearby(&self, other: &Self) -> bool {
        self.distance_km(other) <= NEARBY_RADIUS_KM
    }
}

/// Haversine distance between two points on a sphere of radius
/// [`EARTH_RADIUS_KM`], in kilometers.
///
/// `a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)`,
/// `d = 2·R·atan2(√a, √(1-a))`, angles in radians.
#[must_use]
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHENNAI: Coordinates = Coordinates::new(13.0827, 80.2707);
    const BANGALORE: Coordinates = Coordinates::new(12.9716, 77.5946);

    #[test]
    fn test_identical_points_have_zero_distance() {
        assert!(haversine_km(CHENNAI, CHENNAI).abs() < f64::EPSILON);
        let antimeridian = Coordinates::new(0.0, 180.0);
        assert!(haversine_km(antimeridian, antimeridian).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let there = haversine_km(CHENNAI, BANGALORE);
        let back = haversine_km(BANGALORE, CHENNAI);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_nearby_seller_within_radius() {
        // Seller roughly a kilometer from the Chennai fix
        let seller = Coordinates::new(13.0900, 80.2800);
        let distance = haversine_km(CHENNAI, seller);
        assert!((distance - 1.09).abs() < 0.05, "got {distance}");
        assert!(CHENNAI.is_nearby(&seller));
    }

    #[test]
    fn test_distant_seller_excluded() {
        let distance = haversine_km(CHENNAI, BANGALORE);
        assert!((distance - 290.0).abs() < 5.0, "got {distance}");
        assert!(!CHENNAI.is_nearby(&BANGALORE));
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        // A point almost exactly 2 km due north: 1 degree latitude ~ 111.19 km
        let boundary = Coordinates::new(CHENNAI.latitude + 2.0 / 111.19, CHENNAI.longitude);
        let d = haversine_km(CHENNAI, boundary);
        assert!((d - 2.0).abs() < 0.01, "got {d}");
    }
}
