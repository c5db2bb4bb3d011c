//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres, as used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic coordinate (latitude, longitude).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoCoordinate {
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err("Latitude must be between -90 and 90 degrees".to_string());
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err("Longitude must be between -180 and 180 degrees".to_string());
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to another coordinate in kilometres (haversine).
    pub fn distance_km(&self, other: &GeoCoordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coord(lat: f64, lon: f64) -> GeoCoordinate {
        GeoCoordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_new_rejects_out_of_range_latitude() {
        assert!(GeoCoordinate::new(90.1, 0.0).is_err());
        assert!(GeoCoordinate::new(-90.1, 0.0).is_err());
        assert!(GeoCoordinate::new(90.0, 0.0).is_ok());
    }

    #[test]
    fn test_new_rejects_out_of_range_longitude() {
        assert!(GeoCoordinate::new(0.0, 180.1).is_err());
        assert!(GeoCoordinate::new(0.0, -180.1).is_err());
        assert!(GeoCoordinate::new(0.0, -180.0).is_ok());
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let tokyo = coord(35.6812, 139.7671);
        assert!(tokyo.distance_km(&tokyo).abs() < 1e-9);
    }

    #[test]
    fn test_distance_tokyo_osaka() {
        let tokyo = coord(35.6812, 139.7671);
        let osaka = coord(34.6937, 135.5023);

        let dist = tokyo.distance_km(&osaka);
        assert!((dist - 402.8).abs() < 2.0, "got {dist}");
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = coord(35.0, 139.0);
        let b = coord(36.0, 139.0);

        let dist = a.distance_km(&b);
        assert!((dist - 111.19).abs() < 0.2, "got {dist}");
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(
            lat1 in -80.0_f64..80.0,
            lon1 in -179.0_f64..179.0,
            lat2 in -80.0_f64..80.0,
            lon2 in -179.0_f64..179.0,
        ) {
            let a = coord(lat1, lon1);
            let b = coord(lat2, lon2);
            prop_assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-6);
        }

        #[test]
        fn prop_distance_is_non_negative(
            lat1 in -80.0_f64..80.0,
            lon1 in -179.0_f64..179.0,
            lat2 in -80.0_f64..80.0,
            lon2 in -179.0_f64..179.0,
        ) {
            let a = coord(lat1, lon1);
            let b = coord(lat2, lon2);
            prop_assert!(a.distance_km(&b) >= 0.0);
        }
    }
}
