// 📍 Activity Models
// Location pings, purchases and the home coordinate they are measured against

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Scale factor of E7-encoded coordinates (degrees × 1e7)
pub const E7_SCALE: f64 = 1e7;

// ============================================================================
// HOME COORDINATE
// ============================================================================

/// Fixed reference point that location distances are measured from
///
/// A missing field in config keeps its default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl HomeCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        HomeCoordinate { latitude, longitude }
    }

    /// Reject coordinates outside the valid degree ranges
    pub fn validate(&self) -> Result<()> {
        validate_coordinate(self.latitude, self.longitude)
            .context("Invalid home coordinate")
    }
}

impl Default for HomeCoordinate {
    /// New York City
    fn default() -> Self {
        HomeCoordinate::new(40.7128, -74.0060)
    }
}

// ============================================================================
// LOCATION POINT
// ============================================================================

/// A single GPS ping in decimal degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationPoint {
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        LocationPoint {
            timestamp,
            latitude,
            longitude,
        }
    }

    /// Coordinates must be finite and inside the degree ranges
    pub fn validate(&self) -> Result<()> {
        validate_coordinate(self.latitude, self.longitude)
    }
}

/// RawLocation - one entry of a location history export
///
/// Coordinates are E7 integers. `timestampMs` is epoch milliseconds and is
/// accepted either as a number or as a decimal string (Takeout writes strings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLocation {
    #[serde(rename = "timestampMs", deserialize_with = "deserialize_epoch_ms")]
    pub timestamp_ms: i64,

    #[serde(rename = "latitudeE7")]
    pub latitude_e7: i64,

    #[serde(rename = "longitudeE7")]
    pub longitude_e7: i64,
}

impl RawLocation {
    /// Convert to decimal degrees and a UTC instant
    pub fn to_point(&self) -> Result<LocationPoint> {
        let timestamp = DateTime::<Utc>::from_timestamp_millis(self.timestamp_ms)
            .ok_or_else(|| anyhow!("timestampMs out of range: {}", self.timestamp_ms))?;

        let point = LocationPoint::new(
            timestamp,
            self.latitude_e7 as f64 / E7_SCALE,
            self.longitude_e7 as f64 / E7_SCALE,
        );
        point.validate()?;
        Ok(point)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EpochMillis {
    Number(i64),
    Text(String),
}

fn deserialize_epoch_ms<'de, D>(d: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match EpochMillis::deserialize(d)? {
        EpochMillis::Number(ms) => Ok(ms),
        EpochMillis::Text(s) => s.trim().parse::<i64>().map_err(serde::de::Error::custom),
    }
}

fn validate_coordinate(latitude: f64, longitude: f64) -> Result<()> {
    if !(latitude.is_finite() && (-90.0..=90.0).contains(&latitude)) {
        bail!("latitude out of range: {}", latitude);
    }
    if !(longitude.is_finite() && (-180.0..=180.0).contains(&longitude)) {
        bail!("longitude out of range: {}", longitude);
    }
    Ok(())
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// A single purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    pub merchant: String,
}

impl Transaction {
    pub fn new(timestamp: DateTime<Utc>, amount: f64, merchant: impl Into<String>) -> Self {
        Transaction {
            timestamp,
            amount,
            merchant: merchant.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() {
            bail!("amount is not a finite number for merchant {:?}", self.merchant);
        }
        Ok(())
    }
}

/// RawTransaction - one entry of a transaction export (JSON or CSV row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub timestamp: String,
    pub amount: f64,
    pub merchant: String,
}

impl RawTransaction {
    pub fn to_transaction(&self) -> Result<Transaction> {
        let timestamp = parse_timestamp(&self.timestamp)?;
        let tx = Transaction::new(timestamp, self.amount, self.merchant.clone());
        tx.validate()?;
        Ok(tx)
    }
}

/// Parse an ISO-8601 timestamp
///
/// Offsets are honoured; timestamps without an offset are taken as UTC, and a
/// bare date means midnight UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    bail!("Unrecognised timestamp: {:?}", s)
}

// ============================================================================
// TESTS
// ============================================================================
