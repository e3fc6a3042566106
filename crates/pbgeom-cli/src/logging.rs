use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt,
    prelude::*,
};

/// Target prefix shared by the library and this binary.
const PBGEOM_TARGET: &str = "pbgeom";

/// Maps the `-v` count and `--quiet` flag to a level filter.
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Terminal filter: pbgeom events follow the verbosity, other crates stay at
/// warnings until `-vvv`.
pub fn terminal_targets(verbosity: u8, quiet: bool) -> Targets {
    let level = level_filter(verbosity, quiet);
    let others = if verbosity >= 3 {
        level
    } else {
        level.min(LevelFilter::WARN)
    };
    Targets::new()
        .with_target(PBGEOM_TARGET, level)
        .with_default(others)
}

/// Log file filter: keeps sphere-search and assembly detail at DEBUG or finer
/// regardless of `--quiet`.
pub fn file_targets(verbosity: u8) -> Targets {
    let level = level_filter(verbosity, false).max(LevelFilter::DEBUG);
    Targets::new()
        .with_target(PBGEOM_TARGET, level)
        .with_default(LevelFilter::WARN)
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(terminal_targets(verbosity, quiet));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(CliError::Io)?;
            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_thread_ids(true)
                    .with_target(true)
                    .with_filter(file_targets(verbosity)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}
