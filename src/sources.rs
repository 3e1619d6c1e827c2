// 🗂️ Activity Sources
// Injectable data collaborators for the monitor: fixture, files, in-memory

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::ingest::{
    load_locations_file, load_transactions_file, parse_location_history,
    parse_transaction_history,
};
use crate::models::{LocationPoint, Transaction};

// ============================================================================
// CORE TRAIT
// ============================================================================

/// ActivitySource - supplies both datasets for one analysis run
///
/// Each call returns a fresh snapshot; the monitor never caches across runs.
pub trait ActivitySource: Send + Sync {
    fn load_locations(&self) -> Result<Vec<LocationPoint>>;

    fn load_transactions(&self) -> Result<Vec<Transaction>>;

    /// Short description for logs
    fn describe(&self) -> String;
}

// ============================================================================
// SAMPLE FIXTURE
// ============================================================================

/// One ping at home, one ~46 km north, one ~8 km north (home = NYC)
pub const SAMPLE_LOCATIONS_JSON: &str = r#"{
    "locations": [
        {"timestampMs": 1633072800000, "latitudeE7": 407128000, "longitudeE7": -740060000},
        {"timestampMs": 1633076400000, "latitudeE7": 411268000, "longitudeE7": -740060000},
        {"timestampMs": 1633080000000, "latitudeE7": 407850000, "longitudeE7": -740060000}
    ]
}"#;

pub const SAMPLE_TRANSACTIONS_JSON: &str = r#"{
    "transactions": [
        {"timestamp": "2023-11-01T10:00:00Z", "amount": 100, "merchant": "Store A"},
        {"timestamp": "2023-11-01T12:00:00Z", "amount": 600, "merchant": "Store B"},
        {"timestamp": "2023-11-02T10:00:00Z", "amount": 50, "merchant": "Store C"}
    ]
}"#;

/// Built-in demonstration data
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSource;

impl ActivitySource for SampleSource {
    fn load_locations(&self) -> Result<Vec<LocationPoint>> {
        parse_location_history(SAMPLE_LOCATIONS_JSON)
    }

    fn load_transactions(&self) -> Result<Vec<Transaction>> {
        parse_transaction_history(SAMPLE_TRANSACTIONS_JSON)
    }

    fn describe(&self) -> String {
        "sample data".to_string()
    }
}

// ============================================================================
// FILES
// ============================================================================

/// Location history JSON plus a transaction export (JSON or CSV)
///
/// Files are re-read on every call so edits show up on the next analysis.
#[derive(Debug, Clone)]
pub struct FileSource {
    locations_path: PathBuf,
    transactions_path: PathBuf,
}

impl FileSource {
    pub fn new(locations_path: impl Into<PathBuf>, transactions_path: impl Into<PathBuf>) -> Self {
        FileSource {
            locations_path: locations_path.into(),
            transactions_path: transactions_path.into(),
        }
    }

    pub fn locations_path(&self) -> &Path {
        &self.locations_path
    }

    pub fn transactions_path(&self) -> &Path {
        &self.transactions_path
    }
}

impl ActivitySource for FileSource {
    fn load_locations(&self) -> Result<Vec<LocationPoint>> {
        load_locations_file(&self.locations_path)
    }

    fn load_transactions(&self) -> Result<Vec<Transaction>> {
        load_transactions_file(&self.transactions_path)
    }

    fn describe(&self) -> String {
        format!(
            "files {:?} + {:?}",
            self.locations_path, self.transactions_path
        )
    }
}

// ============================================================================
// IN-MEMORY
// ============================================================================

/// Already-loaded records, e.g. from another ingestion pipeline
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub locations: Vec<LocationPoint>,
    pub transactions: Vec<Transaction>,
}

impl MemorySource {
    pub fn new(locations: Vec<LocationPoint>, transactions: Vec<Transaction>) -> Self {
        MemorySource {
            locations,
            transactions,
        }
    }
}

impl ActivitySource for MemorySource {
    fn load_locations(&self) -> Result<Vec<LocationPoint>> {
        Ok(self.locations.clone())
    }

    fn load_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.transactions.clone())
    }

    fn describe(&self) -> String {
        format!(
            "in-memory ({} locations, {} transactions)",
            self.locations.len(),
            self.transactions.len()
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
