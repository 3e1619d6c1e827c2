use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;

fn builder(default_filter: &str) -> env_logger::Builder {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    builder.format_timestamp_millis();
    builder
}

/// Install the process logger on stderr. `RUST_LOG` wins over `default_filter`.
pub fn init(default_filter: &str) -> Result<()> {
    builder(default_filter).try_init()?;
    Ok(())
}

/// Logger that appends to `path` instead of a terminal stream
pub fn file_logger(default_filter: &str, path: &Path) -> Result<env_logger::Logger> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {:?}", path))?;

    Ok(builder(default_filter)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .build())
}

/// Install a file logger. Used while the TUI owns the terminal.
pub fn init_to_file(default_filter: &str, path: &Path) -> Result<()> {
    let logger = file_logger(default_filter, path)?;
    let max_level = logger.filter();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}
