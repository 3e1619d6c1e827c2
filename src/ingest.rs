// 📥 Ingestion
// JSON location history + JSON/CSV transaction exports → typed records

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::models::{LocationPoint, RawLocation, RawTransaction, Transaction};

// ============================================================================
// DOCUMENT SHAPES
// ============================================================================

/// `{"locations": [...]}` - a missing array means no pings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationHistory {
    #[serde(default)]
    pub locations: Vec<RawLocation>,
}

/// `{"transactions": [...]}` - a missing array means no purchases
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionHistory {
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

// ============================================================================
// LOCATIONS
// ============================================================================

/// Parse a location history JSON document
pub fn parse_location_history(json: &str) -> Result<Vec<LocationPoint>> {
    let history: LocationHistory =
        serde_json::from_str(json).context("Failed to parse location history JSON")?;

    history
        .locations
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            raw.to_point()
                .with_context(|| format!("Invalid location entry #{}", i))
        })
        .collect()
}

/// Load a location history JSON file
pub fn load_locations_file(path: &Path) -> Result<Vec<LocationPoint>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read location file: {:?}", path))?;

    let points = parse_location_history(&content)
        .with_context(|| format!("Failed to load locations from {:?}", path))?;

    log::debug!("Loaded {} location points from {:?}", points.len(), path);
    Ok(points)
}

// ============================================================================
// TRANSACTIONS
// ============================================================================

/// Parse a transaction history JSON document
pub fn parse_transaction_history(json: &str) -> Result<Vec<Transaction>> {
    let history: TransactionHistory =
        serde_json::from_str(json).context("Failed to parse transaction history JSON")?;

    convert_transactions(&history.transactions)
}

/// Parse CSV with a `timestamp,amount,merchant` header
pub fn parse_transactions_csv<R: std::io::Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let mut raw = Vec::new();
    for result in rdr.deserialize() {
        let row: RawTransaction = result.context("Failed to deserialize transaction row")?;
        raw.push(row);
    }

    convert_transactions(&raw)
}

/// Load transactions from a `.csv` or JSON file, picked by extension
pub fn load_transactions_file(path: &Path) -> Result<Vec<Transaction>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let loaded = if is_csv {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
        parse_transactions_csv(file)
    } else {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read transaction file: {:?}", path))?;
        parse_transaction_history(&content)
    };
    let transactions =
        loaded.with_context(|| format!("Failed to load transactions from {:?}", path))?;

    log::debug!("Loaded {} transactions from {:?}", transactions.len(), path);
    Ok(transactions)
}

fn convert_transactions(raw: &[RawTransaction]) -> Result<Vec<Transaction>> {
    raw.iter()
        .enumerate()
        .map(|(i, r)| {
            r.to_transaction()
                .with_context(|| format!("Invalid transaction entry #{}", i))
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
