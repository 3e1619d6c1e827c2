// ⚙️ Configuration
// defaults → optional JSON file → environment (.env honoured)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detectors::DEFAULT_THRESHOLD_KM;
use crate::models::HomeCoordinate;
use crate::monitor::{AnalysisParams, Monitor};
use crate::sources::{ActivitySource, FileSource, SampleSource};

pub const ENV_CONFIG_FILE: &str = "ACTIVITY_MONITOR_CONFIG";
pub const ENV_HOME_LAT: &str = "ACTIVITY_MONITOR_HOME_LAT";
pub const ENV_HOME_LON: &str = "ACTIVITY_MONITOR_HOME_LON";
pub const ENV_LOCATIONS: &str = "ACTIVITY_MONITOR_LOCATIONS";
pub const ENV_TRANSACTIONS: &str = "ACTIVITY_MONITOR_TRANSACTIONS";
pub const ENV_BIND: &str = "ACTIVITY_MONITOR_BIND";

// ============================================================================
// SLIDER RANGE
// ============================================================================

/// Inclusive input range with a slider step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        SliderRange { min, max, step }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Move `steps` slider notches from `value`, staying in range
    pub fn step_by(&self, value: f64, steps: i32) -> f64 {
        self.clamp(value + self.step * steps as f64)
    }

    /// Position in the range as 0.0..=1.0
    pub fn ratio(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    /// Fails with a message naming the parameter when out of range
    pub fn check(&self, name: &str, value: f64) -> Result<()> {
        if !self.contains(value) {
            bail!(
                "{} must be between {} and {}, got {}",
                name,
                self.min,
                self.max,
                value
            );
        }
        Ok(())
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.min <= self.max) {
            bail!("{} range is invalid: {}..{}", name, self.min, self.max);
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            bail!("{} step must be positive, got {}", name, self.step);
        }
        Ok(())
    }
}

// ============================================================================
// MONITOR CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub home: HomeCoordinate,
    pub default_threshold_km: f64,
    pub default_spending_limit: f64,
    pub threshold_range: SliderRange,
    pub spending_range: SliderRange,
    /// Location history JSON; sample data is used unless both files are set
    pub locations_file: Option<PathBuf>,
    pub transactions_file: Option<PathBuf>,
    pub bind_address: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            home: HomeCoordinate::default(),
            default_threshold_km: DEFAULT_THRESHOLD_KM,
            default_spending_limit: 500.0,
            threshold_range: SliderRange::new(1.0, 100.0, 1.0),
            spending_range: SliderRange::new(0.0, 1000.0, 50.0),
            locations_file: None,
            transactions_file: None,
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Resolve the process configuration
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match std::env::var(ENV_CONFIG_FILE) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: MonitorConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        Ok(config)
    }

    /// Overlay environment values; `lookup` is `std::env::var` outside tests
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(lat) = get(ENV_HOME_LAT) {
            self.home.latitude = lat
                .trim()
                .parse()
                .with_context(|| format!("{} is not a number: {:?}", ENV_HOME_LAT, lat))?;
        }
        if let Some(lon) = get(ENV_HOME_LON) {
            self.home.longitude = lon
                .trim()
                .parse()
                .with_context(|| format!("{} is not a number: {:?}", ENV_HOME_LON, lon))?;
        }
        if let Some(path) = get(ENV_LOCATIONS) {
            self.locations_file = Some(PathBuf::from(path));
        }
        if let Some(path) = get(ENV_TRANSACTIONS) {
            self.transactions_file = Some(PathBuf::from(path));
        }
        if let Some(bind) = get(ENV_BIND) {
            self.bind_address = bind;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.home.validate()?;
        self.threshold_range.validate("threshold_km")?;
        self.spending_range.validate("spending_limit")?;
        self.threshold_range
            .check("default_threshold_km", self.default_threshold_km)?;
        self.spending_range
            .check("default_spending_limit", self.default_spending_limit)?;
        Ok(())
    }

    pub fn default_params(&self) -> AnalysisParams {
        AnalysisParams::new(self.default_threshold_km, self.default_spending_limit)
    }

    /// Range check for parameters coming from a user-facing surface
    pub fn check_params(&self, params: &AnalysisParams) -> Result<()> {
        self.threshold_range.check("threshold_km", params.threshold_km)?;
        self.spending_range.check("spending_limit", params.spending_limit)?;
        Ok(())
    }

    /// Data source described by this config
    pub fn source(&self) -> Box<dyn ActivitySource> {
        match (&self.locations_file, &self.transactions_file) {
            (Some(locations), Some(transactions)) => {
                Box::new(FileSource::new(locations, transactions))
            }
            (None, None) => Box::new(SampleSource),
            _ => {
                log::warn!(
                    "Only one of {} / {} is set; falling back to sample data",
                    ENV_LOCATIONS,
                    ENV_TRANSACTIONS
                );
                Box::new(SampleSource)
            }
        }
    }

    pub fn monitor(&self) -> Monitor {
        Monitor::new(self.source(), self.home)
    }
}

// ============================================================================
// TESTS
// ============================================================================
