// 🚨 Anomaly Detectors
// Threshold filters over location pings and purchases. Both are pure and
// order-preserving; equality with the threshold is never an anomaly.

use serde::Serialize;

use crate::models::{HomeCoordinate, LocationPoint, Transaction};

/// Distance threshold used when the caller does not supply one
pub const DEFAULT_THRESHOLD_KM: f64 = 20.0;

// ============================================================================
// LOCATIONS
// ============================================================================

/// A location point flagged for being too far from home
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationAnomaly {
    pub point: LocationPoint,
    pub distance_from_home_km: f64,
}

/// Distance from home for every point, in input order
pub fn distances_from_home(points: &[LocationPoint], home: &HomeCoordinate) -> Vec<f64> {
    points.iter().map(|p| home.distance_km_to(p)).collect()
}

/// Points whose geodesic distance from home strictly exceeds `threshold_km`
pub fn detect_unusual_locations(
    points: &[LocationPoint],
    home: &HomeCoordinate,
    threshold_km: f64,
) -> Vec<LocationAnomaly> {
    points
        .iter()
        .filter_map(|point| {
            let distance = home.distance_km_to(point);
            (distance > threshold_km).then(|| LocationAnomaly {
                point: point.clone(),
                distance_from_home_km: distance,
            })
        })
        .collect()
}

// ============================================================================
// TRANSACTIONS
// ============================================================================

/// Transactions whose amount strictly exceeds `spending_limit`
pub fn detect_suspicious_transactions(
    transactions: &[Transaction],
    spending_limit: f64,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.amount > spending_limit)
        .cloned()
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn point(lat: f64, lon: f64) -> LocationPoint {
        LocationPoint::new(Utc.with_ymd_and_hms(2021, 10, 1, 7, 20, 0).unwrap(), lat, lon)
    }

    fn tx(amount: f64, merchant: &str) -> Transaction {
        Transaction::new(Utc.with_ymd_and_hms(2023, 11, 1, 10, 0, 0).unwrap(), amount, merchant)
    }

    /// At home, ~46 km north, ~8 km north
    fn sample_points() -> Vec<LocationPoint> {
        vec![
            point(40.7128, -74.0060),
            point(41.1268, -74.0060),
            point(40.7850, -74.0060),
        ]
    }

    #[test]
    fn test_sample_threshold_20_flags_one() {
        let home = HomeCoordinate::default();
        let flagged = detect_unusual_locations(&sample_points(), &home, DEFAULT_THRESHOLD_KM);

        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].point.latitude, 41.1268);
        assert!((flagged[0].distance_from_home_km - 45.98).abs() < 0.1);
    }

    #[test]
    fn test_lower_threshold_flags_more_in_order() {
        let home = HomeCoordinate::default();
        let flagged = detect_unusual_locations(&sample_points(), &home, 5.0);

        let lats: Vec<f64> = flagged.iter().map(|a| a.point.latitude).collect();
        assert_eq!(lats, vec![41.1268, 40.7850]);
    }

    #[test]
    fn test_non_positive_threshold_flags_every_moved_point() {
        let home = HomeCoordinate::default();
        let points = sample_points();
        let distances = distances_from_home(&points, &home);

        for threshold in [0.0, -1.0, -500.0] {
            let flagged = detect_unusual_locations(&points, &home, threshold);
            let expected = distances.iter().filter(|d| **d > threshold).count();
            assert_eq!(flagged.len(), expected);
            assert!(flagged.len() >= 2);
        }
    }

    #[test]
    fn test_threshold_equal_to_distance_not_flagged() {
        let home = HomeCoordinate::default();
        let points = sample_points();
        let far = distances_from_home(&points, &home)[1];

        let flagged = detect_unusual_locations(&points, &home, far);
        assert!(flagged.iter().all(|a| a.point.latitude != 41.1268));
    }

    #[test]
    fn test_location_detector_monotonic() {
        let home = HomeCoordinate::default();
        let points = sample_points();

        let mut previous = usize::MAX;
        for threshold in (0..=100).map(|t| t as f64) {
            let count = detect_unusual_locations(&points, &home, threshold).len();
            assert!(count <= previous, "threshold {} flagged more than before", threshold);
            previous = count;
        }
    }

    #[test]
    fn test_detectors_idempotent() {
        let home = HomeCoordinate::default();
        let points = sample_points();
        let txs = vec![tx(100.0, "Store A"), tx(600.0, "Store B")];

        assert_eq!(
            detect_unusual_locations(&points, &home, 7.0),
            detect_unusual_locations(&points, &home, 7.0)
        );
        assert_eq!(
            detect_suspicious_transactions(&txs, 99.0),
            detect_suspicious_transactions(&txs, 99.0)
        );
    }

    #[test]
    fn test_empty_inputs() {
        let home = HomeCoordinate::default();
        assert!(detect_unusual_locations(&[], &home, 1.0).is_empty());
        assert!(detect_suspicious_transactions(&[], 0.0).is_empty());
        assert!(distances_from_home(&[], &home).is_empty());
    }

    #[test]
    fn test_sample_transactions_limit_500() {
        let txs = vec![tx(100.0, "Store A"), tx(600.0, "Store B"), tx(50.0, "Store C")];

        let flagged = detect_suspicious_transactions(&txs, 500.0);

        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].merchant, "Store B");
        assert_eq!(flagged[0].amount, 600.0);
    }

    #[test]
    fn test_amount_at_limit_boundary() {
        for limit in [0.0, 50.0, 500.0, 1000.0] {
            assert!(detect_suspicious_transactions(&[tx(limit, "Exact")], limit).is_empty());
            assert_eq!(
                detect_suspicious_transactions(&[tx(limit + 0.01, "Over")], limit).len(),
                1
            );
        }
    }
}
