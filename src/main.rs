use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};

mod app;
mod config;
mod download;
mod errors;
mod history;
mod localizations;
mod logging;
mod models;
mod progress;
mod theme;
mod ui;

use app::App;
use config::{AppPaths, ConfigStore};
use download::YtDlp;
use history::HistoryLedger;
use localizations::Localizations;
use progress::ProgressReporter;

/// Prints the interruption notice in the persisted language and exits cleanly.
fn install_interrupt_handler(config_file: PathBuf) {
    let result = ctrlc::set_handler(move || {
        let language = ConfigStore::new(&config_file).load().language();
        let texts = Localizations::new(language);
        println!();
        println!("{}", theme::warning().apply_to(texts.lookup("interrupted")));
        log::info!("Interrupted by user");
        std::process::exit(0);
    });

    if let Err(e) = result {
        log::warn!("Failed to install Ctrl+C handler: {}", e);
    }
}

fn main() -> Result<()> {
    let paths = AppPaths::resolve();

    if let Err(e) = logging::init_logger(&paths.log_file, config::log_level()) {
        eprintln!("{:#}", e);
    }

    paths
        .ensure_dirs()
        .with_context(|| format!("Failed to create download directory {}", paths.download_dir.display()))?;
    log::info!("Downloads go to {}", paths.download_dir.display());

    install_interrupt_handler(paths.config_file.clone());

    let engine = YtDlp::new(config::ytdlp_binary(), &paths.download_dir);
    let download_dir = engine.download_dir().to_path_buf();

    let mut app = App::new(
        engine,
        HistoryLedger::load(&paths.history_file),
        ConfigStore::new(&paths.config_file),
        ProgressReporter::new(),
        download_dir,
        io::stdin().lock(),
        io::stdout(),
    );

    app.run().context("Terminal I/O failed")?;
    log::info!("Session ended");
    Ok(())
}
