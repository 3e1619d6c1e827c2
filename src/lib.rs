// Activity Monitor - Core Library
// Exposes all modules for use in CLI, TUI, API server, and tests

pub mod models;
pub mod geodesic;
pub mod detectors;
pub mod ingest;
pub mod sources;
pub mod monitor;
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use models::{
    HomeCoordinate, LocationPoint, Transaction,
    RawLocation, RawTransaction, parse_timestamp,
};
pub use geodesic::distance_km;
pub use detectors::{
    LocationAnomaly, DEFAULT_THRESHOLD_KM,
    detect_unusual_locations, detect_suspicious_transactions, distances_from_home,
};
pub use ingest::{
    LocationHistory, TransactionHistory,
    parse_location_history, parse_transaction_history, parse_transactions_csv,
    load_locations_file, load_transactions_file,
};
pub use sources::{ActivitySource, SampleSource, FileSource, MemorySource};
pub use monitor::{
    Monitor, AnalysisParams, AnalysisReport, ALL_CLEAR_MESSAGE, render_failure,
};
pub use config::{MonitorConfig, SliderRange};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Title shown by the interactive surfaces
pub const APP_TITLE: &str = "AI Monitoring Agent Demo";

/// One-paragraph description shown under the title
pub const APP_DESCRIPTION: &str = "This demo simulates an AI monitoring agent that detects \
unusual locations and suspicious transactions based on predefined thresholds. \
Adjust the sliders to change the detection thresholds.";
