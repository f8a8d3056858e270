use std::fs;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::errors::StorageError;
use crate::localizations::Language;

const APP_DIR: &str = "ytdl-cli";
const DOWNLOAD_SUBDIR: &str = "VideoDownloader";
const HISTORY_FILE: &str = "download_history.json";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "ytdl-cli.log";

pub const ENV_DOWNLOAD_DIR: &str = "YTDL_CLI_DOWNLOAD_DIR";
pub const ENV_CONFIG_DIR: &str = "YTDL_CLI_CONFIG_DIR";
pub const ENV_YTDLP: &str = "YTDL_CLI_YTDLP";
pub const ENV_LOG: &str = "YTDL_CLI_LOG";

/// Filesystem locations used by the program.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub download_dir: PathBuf,
    pub history_file: PathBuf,
    pub config_file: PathBuf,
    pub log_file: PathBuf,
}

impl AppPaths {
    /// Resolves paths from the user's standard directories, honouring the
    /// `YTDL_CLI_*` overrides.
    pub fn resolve() -> Self {
        let download_dir = std::env::var_os(ENV_DOWNLOAD_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::download_dir()
                    .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
                    .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
                    .join(DOWNLOAD_SUBDIR)
            });

        let config_dir = std::env::var_os(ENV_CONFIG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::config_dir()
                    .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
                    .join(APP_DIR)
            });

        Self::from_dirs(download_dir, &config_dir)
    }

    pub fn from_dirs(download_dir: PathBuf, config_dir: &Path) -> Self {
        Self {
            history_file: download_dir.join(HISTORY_FILE),
            download_dir,
            config_file: config_dir.join(CONFIG_FILE),
            log_file: config_dir.join(LOG_FILE),
        }
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.download_dir)?;
        if let Some(parent) = self.config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// yt-dlp binary name or path, overridable with `YTDL_CLI_YTDLP`.
pub fn ytdlp_binary() -> String {
    std::env::var(ENV_YTDLP)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "yt-dlp".to_string())
}

/// Log level for the log file, from `YTDL_CLI_LOG`. Defaults to info.
pub fn log_level() -> LevelFilter {
    std::env::var(ENV_LOG)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub language: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: Language::default().code().to_string(),
        }
    }
}

impl AppConfig {
    /// Configured language, or the default when the stored code is unsupported.
    pub fn language(&self) -> Language {
        Language::from_code(&self.language).unwrap_or_default()
    }
}

/// Small JSON file holding the language preference.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files yield the default config.
    pub fn load(&self) -> AppConfig {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to read config {}: {}", self.path.display(), e);
                }
                return AppConfig::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Ignoring corrupt config {}: {}", self.path.display(), e);
            AppConfig::default()
        })
    }

    pub fn save(&self, config: &AppConfig) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)?;
        log::debug!("Saved config to {}", self.path.display());
        Ok(())
    }
}
