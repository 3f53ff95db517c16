use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers, shared by every distance computation.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite values inside the WGS84 envelope. NaN fails every comparison,
    /// so it is rejected here before any distance math runs.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }
}

/// Great-circle distance between two points (haversine formula), in km.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Radius checks are inclusive: a point sitting exactly on the circle counts.
pub fn within_radius(center: Coordinates, point: Coordinates, radius_km: f64) -> bool {
    haversine_km(center, point) <= radius_km
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let p = Coordinates::new(12.9716, 77.5946);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinates::new(12.9716, 77.5946);
        let b = Coordinates::new(13.0827, 80.2707);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn known_city_pair_distance() {
        // Bangalore -> Chennai is roughly 290 km as the crow flies.
        let bangalore = Coordinates::new(12.9716, 77.5946);
        let chennai = Coordinates::new(13.0827, 80.2707);
        let d = haversine_km(bangalore, chennai);
        assert!(d > 280.0 && d < 300.0, "got {d}");
    }

    #[test]
    fn short_hop_distance() {
        let hazard = Coordinates::new(12.90, 77.60);
        let rider = Coordinates::new(12.905, 77.605);
        let d = haversine_km(hazard, rider);
        assert!(d > 0.7 && d < 0.85, "got {d}");
        assert!(within_radius(hazard, rider, 1.0));
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let a = Coordinates::new(12.90, 77.60);
        let b = Coordinates::new(12.905, 77.605);
        let exact = haversine_km(a, b);
        assert!(within_radius(a, b, exact));
        assert!(!within_radius(a, b, exact - 1e-6));
    }

    #[test]
    fn validation_rejects_out_of_range_and_nan() {
        assert!(Coordinates::new(12.9, 77.6).is_valid());
        assert!(Coordinates::new(90.0, 180.0).is_valid());
        assert!(Coordinates::new(-90.0, -180.0).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 77.6).is_valid());
        assert!(!Coordinates::new(12.9, f64::INFINITY).is_valid());
    }
}
