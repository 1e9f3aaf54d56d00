//! Logging setup
//!
//! The subscriber is installed before settings are read, so warnings from
//! loading them are not lost. The configured level is swapped in afterwards.

use anyhow::{Context, Result};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, Registry};

use crate::settings::LoggingSettings;

/// Handle for changing the global level after startup
pub type LevelHandle = reload::Handle<LevelFilter, Registry>;

/// Install the global subscriber at INFO
pub fn init() -> LevelHandle {
    let (filter, handle) = reload::Layer::new(LevelFilter::INFO);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
    handle
}

/// Switch the installed subscriber to the configured level
pub fn apply(handle: &LevelHandle, logging: &LoggingSettings) -> Result<()> {
    let level = LevelFilter::from_level(logging.max_level());
    handle
        .reload(level)
        .context("Failed to apply logging level")
}
