// Geodesic distance on the WGS-84 ellipsoid (Karney's algorithm, via `geo`)

use geo::{GeodesicDistance, Point};

use crate::models::{HomeCoordinate, LocationPoint};

const METERS_PER_KM: f64 = 1000.0;

/// Distance in kilometers between two (latitude, longitude) pairs in degrees
pub fn distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    // geo points are (x = longitude, y = latitude)
    let a = Point::new(from.1, from.0);
    let b = Point::new(to.1, to.0);
    a.geodesic_distance(&b) / METERS_PER_KM
}

impl HomeCoordinate {
    /// Geodesic distance in kilometers from home to `point`
    pub fn distance_km_to(&self, point: &LocationPoint) -> f64 {
        distance_km(
            (point.latitude, point.longitude),
            (self.latitude, self.longitude),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    #[test]
    fn test_zero_distance() {
        assert_float_absolute_eq!(distance_km((40.7128, -74.0060), (40.7128, -74.0060)), 0.0, 1e-9);
    }

    #[test]
    fn test_symmetric() {
        let a = (40.7128, -74.0060);
        let b = (41.1268, -73.95);
        assert_float_relative_eq!(distance_km(a, b), distance_km(b, a), 1e-12);
    }

    #[test]
    fn test_matches_vincenty_reference() {
        // JFK -> LAX, Vincenty on WGS-84: 3983.08 km
        let d = distance_km((40.6413, -73.7781), (33.9416, -118.4085));
        assert_float_relative_eq!(d, 3983.08, 0.001);
    }

    #[test]
    fn test_meridian_arc() {
        // 0.414 degrees of latitude around 40.9N on the ellipsoid
        let d = distance_km((40.7128, -74.0060), (41.1268, -74.0060));
        assert_float_relative_eq!(d, 45.98, 0.001);
    }
}
