//! Log setup: stderr always, plus an optional file sink.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::LoggingConfig;

/// Install the global logger from the logging configuration. Does
/// nothing when logging is disabled.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(config.level_filter())
        .chain(std::io::stderr());

    if let Some(path) = &config.file {
        dispatch = dispatch.chain(log_file(path)?);
    }

    dispatch.apply().context("Failed to install logger")?;
    Ok(())
}

fn log_file(path: &Path) -> Result<fern::Output> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    fern::log_file(path)
        .map(fern::Output::from)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}
