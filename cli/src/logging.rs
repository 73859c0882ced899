//! Terminal plus optional file logging

use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;
use std::path::Path;

/// Initialize logging: the terminal at a level picked by `verbosity`, and
/// everything at DEBUG to `file` when given.
pub fn init(verbosity: u8, file: Option<&Path>) -> Result<()> {
    let config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = file {
        let sink = File::create(path).with_context(|| format!("create log file {}", path.display()))?;
        loggers.push(WriteLogger::new(LevelFilter::Debug, config, sink));
    }
    CombinedLogger::init(loggers).context("initialize logger")
}
