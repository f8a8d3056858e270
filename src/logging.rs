use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode, WriteLogger};

/// Initialize logging: errors go to the terminal, everything at `level` and
/// above is appended to `log_file`.
///
/// The terminal logger stays at `Error` so warnings never interleave with the
/// interactive menus.
pub fn init_logger(log_file: &Path, level: LevelFilter) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    CombinedLogger::init(vec![
        TermLogger::new(LevelFilter::Error, Config::default(), TerminalMode::Stderr, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), file),
    ])
    .context("Failed to initialize logger")?;

    Ok(())
}
