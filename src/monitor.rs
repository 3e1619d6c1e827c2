// 🛰️ Activity Monitor - orchestration
// data source → detectors → report. Every run is a fresh, disposable snapshot.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::detectors::{
    detect_suspicious_transactions, detect_unusual_locations, LocationAnomaly,
};
use crate::models::{HomeCoordinate, Transaction};
use crate::sources::ActivitySource;

/// Report text when neither detector flags anything
pub const ALL_CLEAR_MESSAGE: &str = "No unusual activities detected.";

// ============================================================================
// PARAMETERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub threshold_km: f64,
    pub spending_limit: f64,
}

impl AnalysisParams {
    pub fn new(threshold_km: f64, spending_limit: f64) -> Self {
        AnalysisParams {
            threshold_km,
            spending_limit,
        }
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// Structured result of one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub params: AnalysisParams,
    pub home: HomeCoordinate,
    pub locations_checked: usize,
    pub transactions_checked: usize,
    pub unusual_locations: Vec<LocationAnomaly>,
    pub suspicious_transactions: Vec<Transaction>,
}

impl AnalysisReport {
    /// One alert line per detector that flagged something
    pub fn alerts(&self) -> Vec<String> {
        let mut alerts = Vec::new();

        if !self.unusual_locations.is_empty() {
            alerts.push(format!(
                "Unusual locations detected: {} entries.",
                self.unusual_locations.len()
            ));
        }
        if !self.suspicious_transactions.is_empty() {
            alerts.push(format!(
                "Suspicious transactions detected: {} entries.",
                self.suspicious_transactions.len()
            ));
        }

        alerts
    }

    pub fn is_clear(&self) -> bool {
        self.unusual_locations.is_empty() && self.suspicious_transactions.is_empty()
    }

    /// Plain-text report
    pub fn render(&self) -> String {
        let alerts = self.alerts();
        if alerts.is_empty() {
            ALL_CLEAR_MESSAGE.to_string()
        } else {
            alerts.join("\n")
        }
    }
}

/// Text shown in place of a report when the run failed
pub fn render_failure(err: &anyhow::Error) -> String {
    format!("An error occurred: {:#}", err)
}

// ============================================================================
// MONITOR
// ============================================================================

pub struct Monitor {
    source: Box<dyn ActivitySource>,
    home: HomeCoordinate,
}

impl Monitor {
    pub fn new(source: Box<dyn ActivitySource>, home: HomeCoordinate) -> Self {
        Monitor { source, home }
    }

    pub fn home(&self) -> HomeCoordinate {
        self.home
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Load both datasets and run both detectors
    pub fn analyze(&self, params: AnalysisParams) -> Result<AnalysisReport> {
        if !params.threshold_km.is_finite() {
            bail!("threshold_km must be a finite number, got {}", params.threshold_km);
        }
        if !params.spending_limit.is_finite() {
            bail!("spending_limit must be a finite number, got {}", params.spending_limit);
        }
        self.home.validate()?;

        let locations = self
            .source
            .load_locations()
            .context("Failed to load location data")?;
        let transactions = self
            .source
            .load_transactions()
            .context("Failed to load transaction data")?;

        // Sources other than the file parsers hand over records unchecked
        for (i, point) in locations.iter().enumerate() {
            point
                .validate()
                .with_context(|| format!("Invalid location entry #{}", i))?;
        }
        for (i, tx) in transactions.iter().enumerate() {
            tx.validate()
                .with_context(|| format!("Invalid transaction entry #{}", i))?;
        }

        let unusual_locations = detect_unusual_locations(&locations, &self.home, params.threshold_km);
        let suspicious_transactions =
            detect_suspicious_transactions(&transactions, params.spending_limit);

        log::debug!(
            "Analyzed {} locations / {} transactions from {}: {} unusual, {} suspicious",
            locations.len(),
            transactions.len(),
            self.source.describe(),
            unusual_locations.len(),
            suspicious_transactions.len()
        );

        Ok(AnalysisReport {
            params,
            home: self.home,
            locations_checked: locations.len(),
            transactions_checked: transactions.len(),
            unusual_locations,
            suspicious_transactions,
        })
    }

    /// Parameters in, text out. Failures become an error line, never a panic.
    pub fn run_analysis(&self, threshold_km: f64, spending_limit: f64) -> String {
        match self.analyze(AnalysisParams::new(threshold_km, spending_limit)) {
            Ok(report) => report.render(),
            Err(e) => {
                log::warn!("Analysis failed: {:#}", e);
                render_failure(&e)
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
