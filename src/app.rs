use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::{Local, SubsecRound};

use crate::config::{AppConfig, ConfigStore};
use crate::download::Extractor;
use crate::errors::{AppError, AppResult, StorageError};
use crate::history::HistoryLedger;
use crate::localizations::{Language, Localizations};
use crate::models::{HistoryRecord, ProgressEvent, Quality};
use crate::progress::ProgressReporter;
use crate::ui;

/// What the menu loop does after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Interactive session: owns the ledger, the active language and the
/// terminal streams, and drives the engine on the user's behalf.
pub struct App<E, R, W> {
    engine: E,
    history: HistoryLedger,
    config: ConfigStore,
    localizer: Localizations,
    reporter: ProgressReporter,
    download_dir: PathBuf,
    input: R,
    output: W,
}

impl<E: Extractor, R: BufRead, W: Write> App<E, R, W> {
    pub fn new(
        engine: E,
        history: HistoryLedger,
        config: ConfigStore,
        reporter: ProgressReporter,
        download_dir: impl Into<PathBuf>,
        input: R,
        output: W,
    ) -> Self {
        let language = config.load().language();
        log::info!("Starting session in language {}", language.identifier());

        Self {
            engine,
            history,
            config,
            localizer: Localizations::new(language),
            reporter,
            download_dir: download_dir.into(),
            input,
            output,
        }
    }

    #[cfg(test)]
    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    #[cfg(test)]
    pub fn language(&self) -> Language {
        self.localizer.language()
    }

    /// Runs the menu loop until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            ui::render_main_menu(&mut self.output, &self.localizer)?;
            let Some(choice) = self.ask("choose_option")? else {
                self.interrupted()?;
                return Ok(());
            };

            if self.handle_choice(&choice)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    pub fn handle_choice(&mut self, choice: &str) -> io::Result<Flow> {
        match choice {
            "1" => self.handle_download(),
            "2" => {
                ui::render_history(&mut self.output, self.history.list(), &self.localizer)?;
                Ok(Flow::Continue)
            }
            "3" => self.handle_clear(),
            "4" => self.handle_language(),
            "5" => {
                ui::success(&mut self.output, self.localizer.lookup("exiting"))?;
                Ok(Flow::Exit)
            }
            _ => {
                ui::error(&mut self.output, self.localizer.lookup("invalid_option"))?;
                Ok(Flow::Continue)
            }
        }
    }

    fn handle_download(&mut self) -> io::Result<Flow> {
        let Some(url) = self.ask("enter_url")? else {
            return self.interrupted();
        };
        if url.is_empty() {
            ui::error(&mut self.output, self.localizer.lookup("no_url"))?;
            return Ok(Flow::Continue);
        }

        ui::render_quality_menu(&mut self.output, &self.localizer)?;
        let Some(choice) = self.ask("choose_quality")? else {
            return self.interrupted();
        };
        let quality = Quality::from_menu_choice(&choice);

        match self.download_video(&url, quality) {
            Ok(title) => {
                let message = self.localizer.format("download_success", &title);
                ui::success(&mut self.output, &message)?;
                let saved_in = self.localizer.format("saved_in", self.download_dir.display());
                writeln!(self.output, "{}", saved_in)?;
            }
            Err(AppError::Terminal(e)) => return Err(e),
            Err(AppError::Storage(e)) => {
                log::error!("Failed to save history: {}", e);
                let message = self.localizer.format("storage_error", &e);
                ui::error(&mut self.output, &message)?;
            }
            Err(e) => {
                log::error!("Download of {} failed: {}", url, e);
                self.reporter.reset();
                let message = self.localizer.format("download_error", &e);
                ui::error(&mut self.output, &message)?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Fetches metadata, downloads `url` and records it in the history.
    /// Returns the video title.
    pub fn download_video(&mut self, url: &str, quality: Quality) -> AppResult<String> {
        ui::info(&mut self.output, &self.localizer.format("analyzing_url", url))?;
        self.reporter.reset();

        let info = self.engine.extract_metadata(url)?;
        let title = info
            .title
            .unwrap_or_else(|| self.localizer.lookup("unknown_video").to_string());
        let duration = info
            .duration
            .unwrap_or_else(|| self.localizer.lookup("unknown_duration").to_string());

        ui::detail(&mut self.output, &self.localizer.format("title", &title))?;
        ui::detail(&mut self.output, &self.localizer.format("duration", &duration))?;
        ui::detail(&mut self.output, self.localizer.lookup("starting_download"))?;

        let reporter = &mut self.reporter;
        let texts = &self.localizer;
        let output = &mut self.output;
        self.engine
            .download(url, quality.format_constraint(), &mut |event: ProgressEvent| {
                if let Err(e) = reporter.handle(&event, texts, &mut *output) {
                    log::warn!("Failed to report progress: {}", e);
                }
            })?;

        let record = HistoryRecord {
            title: title.clone(),
            url: url.to_string(),
            date: Local::now().naive_local().trunc_subsecs(0),
            quality,
            platform: info
                .platform
                .unwrap_or_else(|| self.localizer.lookup("unknown_platform").to_string()),
        };
        self.history.append(record)?;

        Ok(title)
    }

    fn handle_clear(&mut self) -> io::Result<Flow> {
        let Some(answer) = self.ask("confirm_clear")? else {
            return self.interrupted();
        };
        if !is_confirmation(&answer) {
            return Ok(Flow::Continue);
        }

        match self.history.clear() {
            Ok(()) => ui::success(&mut self.output, self.localizer.lookup("history_cleared"))?,
            Err(e) => {
                log::error!("Failed to clear history: {}", e);
                let message = self.localizer.format("storage_error", &e);
                ui::error(&mut self.output, &message)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn handle_language(&mut self) -> io::Result<Flow> {
        ui::render_language_menu(&mut self.output, &self.localizer)?;
        let Some(choice) = self.ask("choose_language")? else {
            return self.interrupted();
        };

        let changed = match Language::code_for_menu_choice(&choice) {
            Some(code) => self.change_language(code),
            None => Ok(false),
        };

        match changed {
            Ok(true) => ui::success(&mut self.output, self.localizer.lookup("language_changed"))?,
            Ok(false) => ui::error(&mut self.output, self.localizer.lookup("invalid_option"))?,
            Err(e) => {
                log::error!("Failed to save config {}: {}", self.config.path().display(), e);
                let message = self.localizer.format("config_error", &e);
                ui::error(&mut self.output, &message)?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Switches to `code` and persists the preference. Returns `Ok(false)` for
    /// unsupported codes, which leave both the active language and the config
    /// file untouched. A failed save keeps the new language for this session.
    pub fn change_language(&mut self, code: &str) -> Result<bool, StorageError> {
        let Some(language) = self.localizer.select(code) else {
            log::info!("Rejected unsupported language '{}'", code);
            return Ok(false);
        };

        log::info!("Language changed to {}", language.identifier());
        let config = AppConfig {
            language: language.code().to_string(),
        };
        self.config.save(&config)?;
        Ok(true)
    }

    fn interrupted(&mut self) -> io::Result<Flow> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", crate::theme::warning().apply_to(self.localizer.lookup("interrupted")))?;
        Ok(Flow::Exit)
    }

    /// Prompts and reads one trimmed line. `None` means input has ended.
    fn ask(&mut self, prompt_key: &str) -> io::Result<Option<String>> {
        ui::prompt(&mut self.output, self.localizer.lookup(prompt_key))?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "s" | "yes" | "sim")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DownloadError;
    use crate::models::{FormatConstraint, VideoInfo};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeEngine {
        info: VideoInfo,
        events: Vec<ProgressEvent>,
        failure: Option<String>,
        requests: RefCell<Vec<(String, FormatConstraint)>>,
    }

    impl Extractor for FakeEngine {
        fn extract_metadata(&self, _url: &str) -> Result<VideoInfo, DownloadError> {
            Ok(self.info.clone())
        }

        fn download(
            &self,
            url: &str,
            format: FormatConstraint,
            on_progress: &mut dyn FnMut(ProgressEvent),
        ) -> Result<(), DownloadError> {
            self.requests.borrow_mut().push((url.to_string(), format));
            for event in &self.events {
                on_progress(event.clone());
            }
            match &self.failure {
                Some(message) => Err(DownloadError::Failed(message.clone())),
                None => Ok(()),
            }
        }
    }

    fn example_engine() -> FakeEngine {
        FakeEngine {
            info: VideoInfo {
                title: Some("Example".to_string()),
                duration: Some("2:00".to_string()),
                platform: Some("testsite".to_string()),
            },
            events: vec![
                ProgressEvent::Downloading {
                    downloaded_bytes: Some(0),
                    total_bytes: Some(100),
                    filename: Some("Example.mp4".to_string()),
                },
                ProgressEvent::Downloading {
                    downloaded_bytes: Some(100),
                    total_bytes: Some(100),
                    filename: Some("Example.mp4".to_string()),
                },
                ProgressEvent::Finished { filename: None },
            ],
            ..Default::default()
        }
    }

    type TestApp = App<FakeEngine, Cursor<Vec<u8>>, Vec<u8>>;

    fn app_in(dir: &TempDir, engine: FakeEngine, language: &str, input: &str) -> TestApp {
        ConfigStore::new(dir.path().join("config.json"))
            .save(&AppConfig {
                language: language.to_string(),
            })
            .unwrap();
        app_over(dir, engine, input)
    }

    /// Builds an app over whatever is already in `dir`, without seeding the config.
    fn app_over(dir: &TempDir, engine: FakeEngine, input: &str) -> TestApp {
        App::new(
            engine,
            HistoryLedger::load(dir.path().join("download_history.json")),
            ConfigStore::new(dir.path().join("config.json")),
            ProgressReporter::hidden(),
            dir.path(),
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
        )
    }

    fn output_of(app: &TestApp) -> String {
        String::from_utf8(app.output.clone()).unwrap()
    }

    #[test]
    fn successful_download_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, example_engine(), "en", "1\nhttps://example.com/v\n2\n5\n");

        let before = Local::now().naive_local().trunc_subsecs(0);
        app.run().unwrap();
        let after = Local::now().naive_local().trunc_subsecs(0);

        let records = app.history().list();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Example");
        assert_eq!(records[0].url, "https://example.com/v");
        assert_eq!(records[0].quality, Quality::P720);
        assert_eq!(records[0].platform, "testsite");
        assert!(records[0].date >= before && records[0].date <= after);

        let requests = app.engine.requests.borrow();
        assert_eq!(
            requests.as_slice(),
            &[("https://example.com/v".to_string(), FormatConstraint::MaxHeight(720))]
        );

        let text = output_of(&app);
        assert!(text.contains("Title: Example"));
        assert!(text.contains("Duration: 2:00"));
        assert!(text.contains("Download completed!"));
        assert!(text.contains("Video 'Example' downloaded successfully!"));
        assert!(text.contains(&format!("Saved in: {}", dir.path().display())));

        let reloaded = HistoryLedger::load(dir.path().join("download_history.json"));
        assert_eq!(reloaded.list(), app.history().list());
    }

    #[test]
    fn engine_failure_is_reported_and_loop_continues() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine {
            failure: Some("network unreachable".to_string()),
            ..example_engine()
        };
        let mut app = app_in(&dir, engine, "en", "1\nhttps://example.com/v\n1\n5\n");

        app.run().unwrap();

        let text = output_of(&app);
        assert!(text.contains("Error while downloading: network unreachable"));
        assert_eq!(text.matches("=== Video Downloader ===").count(), 2);
        assert!(text.contains("Goodbye!"));
        assert!(app.history().is_empty());
        assert!(HistoryLedger::load(dir.path().join("download_history.json")).is_empty());
    }

    #[test]
    fn missing_metadata_uses_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine {
            info: VideoInfo::default(),
            ..example_engine()
        };
        let mut app = app_in(&dir, engine, "pt", "");

        let title = app.download_video("https://example.com/x", Quality::Best).unwrap();

        assert_eq!(title, "Vídeo desconhecido");
        assert_eq!(app.history().list()[0].platform, "Desconhecida");
        assert!(output_of(&app).contains("Duração: Desconhecida"));
    }

    #[test]
    fn unknown_quality_choice_downloads_best() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, example_engine(), "en", "1\nhttps://example.com/v\n9\n5\n");

        app.run().unwrap();

        assert_eq!(app.engine.requests.borrow()[0].1, FormatConstraint::Unconstrained);
        assert_eq!(app.history().list()[0].quality, Quality::Best);
    }

    #[test]
    fn empty_url_skips_engine() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, example_engine(), "en", "1\n\n5\n");

        app.run().unwrap();

        assert!(app.engine.requests.borrow().is_empty());
        assert!(output_of(&app).contains("Please enter a URL"));
    }

    #[test]
    fn invalid_menu_option_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, example_engine(), "en", "7\n5\n");

        app.run().unwrap();

        let text = output_of(&app);
        assert!(text.contains("Invalid option!"));
        assert_eq!(text.matches("=== Video Downloader ===").count(), 2);
    }

    #[test]
    fn end_of_input_prints_interruption_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, example_engine(), "pt", "1\n");

        app.run().unwrap();

        assert!(output_of(&app).contains("Programa interrompido pelo usuário."));
        assert!(app.engine.requests.borrow().is_empty());
    }

    #[test]
    fn clear_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, example_engine(), "pt", "3\nn\n2\n3\nS\n5\n");
        app.download_video("https://example.com/v", Quality::P480).unwrap();

        app.run().unwrap();

        let text = output_of(&app);
        assert!(text.contains("1. Example"));
        assert!(text.contains("Histórico limpo com sucesso!"));
        assert!(app.history().is_empty());
        assert!(HistoryLedger::load(dir.path().join("download_history.json")).is_empty());
    }

    #[test]
    fn language_menu_switches_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, example_engine(), "pt", "4\n1\n5\n");

        app.run().unwrap();

        assert_eq!(app.language(), Language::En);
        assert_eq!(ConfigStore::new(dir.path().join("config.json")).load().language, "en");
        let text = output_of(&app);
        assert!(text.contains("Language changed successfully!"));
        assert!(text.contains("Goodbye!"));
    }

    #[test]
    fn unsupported_language_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, example_engine(), "en", "4\n3\n5\n");
        let config_path = dir.path().join("config.json");
        let persisted = std::fs::read_to_string(&config_path).unwrap();

        assert!(!app.change_language("xx").unwrap());
        app.run().unwrap();

        assert_eq!(app.language(), Language::En);
        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), persisted);
        assert!(output_of(&app).contains("Invalid option!"));
    }

    #[test]
    fn unwritable_history_is_reported_after_download() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the ledger makes the final rename fail.
        std::fs::create_dir(dir.path().join("download_history.json")).unwrap();
        let mut app = app_in(&dir, example_engine(), "en", "1\nhttps://example.com/v\n1\n5\n");

        app.run().unwrap();

        let text = output_of(&app);
        assert!(text.contains("Download completed!"));
        assert!(text.contains("Could not save history:"));
        assert!(!text.contains("downloaded successfully"));
        assert!(!text.contains("Error while downloading"));
        assert_eq!(text.matches("=== Video Downloader ===").count(), 2);
        assert!(text.contains("Goodbye!"));
    }

    #[test]
    fn unwritable_history_is_reported_on_clear() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("download_history.json")).unwrap();
        let mut app = app_in(&dir, example_engine(), "pt", "3\ns\n5\n");

        app.run().unwrap();

        let text = output_of(&app);
        assert!(text.contains("Não foi possível salvar o histórico:"));
        assert!(!text.contains("Histórico limpo com sucesso!"));
        assert!(text.contains("Até logo!"));
    }

    #[test]
    fn unwritable_config_is_reported_on_language_change() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::create_dir(&config_path).unwrap();
        let mut app = app_over(&dir, example_engine(), "4\n1\n5\n");

        app.run().unwrap();

        assert!(config_path.is_dir());
        assert_eq!(app.language(), Language::En);
        let text = output_of(&app);
        assert!(text.contains("Could not save settings:"));
        assert!(!text.contains("Language changed successfully!"));
        assert_eq!(text.matches("=== Video Downloader ===").count(), 2);
        assert!(text.contains("Goodbye!"));
    }

    #[test]
    fn change_language_surfaces_save_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("config.json")).unwrap();
        let mut app = app_over(&dir, example_engine(), "");

        assert!(app.change_language("en").is_err());
        assert!(!app.change_language("xx").unwrap());
    }

    #[test]
    fn confirmation_tokens() {
        for yes in ["y", "Y", "s", "sim", "YES"] {
            assert!(is_confirmation(yes), "{yes}");
        }
        for no in ["", "n", "nao", "maybe"] {
            assert!(!is_confirmation(no), "{no}");
        }
    }
}
