use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean earth radius used by the spherical approximation.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Returns `None` for non-finite or out of range coordinates.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to `other` in kilometers.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Haversine distance in kilometers between two points given in degrees.
#[must_use]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 near antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_distance(51.5074, -0.1278, 51.5074, -0.1278), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_distance(51.5074, -0.1278, 48.8566, 2.3522);
        let back = haversine_distance(48.8566, 2.3522, 51.5074, -0.1278);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn london_to_paris() {
        let km = haversine_distance(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((343.0..=344.0).contains(&km), "got {km}");
    }

    #[test]
    fn antipodes_are_half_the_circumference() {
        let km = haversine_distance(0.0, 0.0, 0.0, 180.0);
        assert!((km - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn near_antipodal_points_stay_finite() {
        let km = haversine_distance(0.494, 0.8398, -0.494, -179.1602);
        assert!(km.is_finite(), "got {km}");
        assert!((km - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1.0);

        for step in 0..200 {
            let lat = -1.0 + f64::from(step) * 0.01;
            let lon = 0.5 + f64::from(step) * 0.003;
            let km = haversine_distance(lat, lon, -lat, lon - 180.0);
            assert!(km.is_finite() && km >= 0.0, "got {km} for {lat}, {lon}");
        }
    }

    #[test]
    fn rejects_invalid_coordinates() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_none());
        assert!(GeoPoint::new(91.0, 0.0).is_none());
        assert!(GeoPoint::new(0.0, -180.5).is_none());
        assert!(GeoPoint::new(51.5, -0.1).is_some());
    }
}
