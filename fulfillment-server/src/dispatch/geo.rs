//! Great-circle distance

use shared::models::GeoPoint;

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometers
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint {
            lat: 41.3874,
            lng: 2.1686,
        };
        assert!(haversine_km(p, p) < 1e-9);
    }

    #[test]
    fn test_known_distance_barcelona_madrid() {
        // Barcelona ↔ Madrid ≈ 505 km great-circle
        let bcn = GeoPoint {
            lat: 41.3874,
            lng: 2.1686,
        };
        let mad = GeoPoint {
            lat: 40.4168,
            lng: -3.7038,
        };
        let d = haversine_km(bcn, mad);
        assert!((d - 505.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn test_symmetry() {
        let a = GeoPoint { lat: 1.0, lng: 2.0 };
        let b = GeoPoint { lat: 3.0, lng: 4.0 };
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }
}
