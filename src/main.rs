// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use activity_monitor::{logging, render_failure, AnalysisParams, Monitor, MonitorConfig};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log file used while the TUI owns the terminal (under the temp dir)
#[cfg(feature = "tui")]
const TUI_LOG_FILE: &str = "activity-monitor.log";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "activity-monitor",
    version,
    about = "Flag unusual locations and suspicious transactions"
)]
struct Cli {
    /// Defaults to the interactive slider UI.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one analysis and print the report.
    Analyze(AnalyzeArgs),
    /// Launch the interactive slider UI.
    Tui(DataArgs),
}

/// Where the data comes from and where home is. Overrides the config for this run.
#[derive(Debug, Args, Clone, Default)]
struct DataArgs {
    /// Location history JSON ({"locations": [...]}).
    #[arg(long, requires = "transactions")]
    locations: Option<PathBuf>,

    /// Transaction export, JSON ({"transactions": [...]}) or CSV.
    #[arg(long, requires = "locations")]
    transactions: Option<PathBuf>,

    /// Home latitude in degrees.
    #[arg(long, allow_hyphen_values = true, requires = "home_lon")]
    home_lat: Option<f64>,

    /// Home longitude in degrees.
    #[arg(long, allow_hyphen_values = true, requires = "home_lat")]
    home_lon: Option<f64>,
}

impl DataArgs {
    fn apply(&self, config: &mut MonitorConfig) -> Result<()> {
        if let (Some(locations), Some(transactions)) = (&self.locations, &self.transactions) {
            config.locations_file = Some(locations.clone());
            config.transactions_file = Some(transactions.clone());
        }
        if let (Some(lat), Some(lon)) = (self.home_lat, self.home_lon) {
            config.home.latitude = lat;
            config.home.longitude = lon;
        }
        config.validate()
    }
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// Distance from home (km) beyond which a location is unusual.
    #[arg(short = 'd', long)]
    threshold_km: Option<f64>,

    /// Amount above which a transaction is suspicious.
    #[arg(short = 'l', long)]
    spending_limit: Option<f64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(flatten)]
    data: DataArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Analyze(args)) => run_analyze(args),
        Some(Command::Tui(data)) => run_ui_mode(data),
        None => run_ui_mode(DataArgs::default()),
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    logging::init("warn")?;

    let mut config = MonitorConfig::load()?;
    args.data.apply(&mut config)?;

    let params = AnalysisParams::new(
        args.threshold_km.unwrap_or(config.default_threshold_km),
        args.spending_limit.unwrap_or(config.default_spending_limit),
    );
    config.check_params(&params)?;

    let monitor = config.monitor();
    log::debug!("Analyzing {}", monitor.source_description());

    match args.format {
        OutputFormat::Text => {
            println!("{}", monitor.run_analysis(params.threshold_km, params.spending_limit));
        }
        OutputFormat::Json => {
            let value = json_report(&monitor, params)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

/// Structured report, or `{"error": "An error occurred: ..."}` when the run failed
fn json_report(monitor: &Monitor, params: AnalysisParams) -> Result<serde_json::Value> {
    match monitor.analyze(params) {
        Ok(report) => serde_json::to_value(&report).context("Failed to serialize report"),
        Err(e) => Ok(serde_json::json!({ "error": render_failure(&e) })),
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(data: DataArgs) -> Result<()> {
    // stderr would draw over the alternate screen
    logging::init_to_file("warn", &std::env::temp_dir().join(TUI_LOG_FILE))?;

    let mut config = MonitorConfig::load()?;
    data.apply(&mut config)?;

    let mut app = ui::App::new(config.monitor(), &config);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_data: DataArgs) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: activity-monitor analyze --threshold-km 20 --spending-limit 500");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_monitor::{HomeCoordinate, MemorySource, SampleSource, Transaction};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from([
            "activity-monitor",
            "analyze",
            "-d",
            "35",
            "--spending-limit",
            "250",
            "--format",
            "json",
            "--home-lat",
            "51.5",
            "--home-lon",
            "-0.12",
        ]);

        let Some(Command::Analyze(args)) = cli.command else {
            panic!("expected analyze subcommand");
        };
        assert_eq!(args.threshold_km, Some(35.0));
        assert_eq!(args.spending_limit, Some(250.0));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.data.home_lon, Some(-0.12));
    }

    #[test]
    fn test_files_must_come_in_pairs() {
        let result = Cli::try_parse_from([
            "activity-monitor",
            "analyze",
            "--locations",
            "loc.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_subcommand_means_ui() {
        let cli = Cli::parse_from(["activity-monitor"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_data_args_apply() {
        let data = DataArgs {
            locations: Some(PathBuf::from("loc.json")),
            transactions: Some(PathBuf::from("tx.csv")),
            home_lat: Some(48.8566),
            home_lon: Some(2.3522),
        };
        let mut config = MonitorConfig::default();

        data.apply(&mut config).unwrap();

        assert_eq!(config.home.latitude, 48.8566);
        assert_eq!(config.transactions_file, Some(PathBuf::from("tx.csv")));
    }

    #[test]
    fn test_json_report_success_shape() {
        let monitor = Monitor::new(Box::new(SampleSource), HomeCoordinate::default());

        let value = json_report(&monitor, AnalysisParams::new(20.0, 500.0)).unwrap();

        assert!(value.get("error").is_none());
        assert_eq!(value["params"]["threshold_km"], 20.0);
        assert_eq!(value["locations_checked"], 3);
        assert_eq!(value["unusual_locations"].as_array().unwrap().len(), 1);
        assert_eq!(value["suspicious_transactions"][0]["merchant"], "Store B");
    }

    #[test]
    fn test_json_report_error_shape() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let source = MemorySource::new(vec![], vec![Transaction::new(at, f64::NAN, "Broken")]);
        let monitor = Monitor::new(Box::new(source), HomeCoordinate::default());

        let value = json_report(&monitor, AnalysisParams::new(20.0, 500.0)).unwrap();

        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        let error = object["error"].as_str().unwrap();
        assert!(error.starts_with("An error occurred: "), "got: {}", error);
        assert!(error.contains("Invalid transaction entry #0"));
    }
}
