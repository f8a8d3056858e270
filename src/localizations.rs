use std::collections::HashMap;

use unic_langid::{langid, LanguageIdentifier};

/// Languages the menus are translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    En,
    #[default]
    Pt,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Pt => "pt",
        }
    }

    pub fn identifier(&self) -> LanguageIdentifier {
        match self {
            Self::En => langid!("en"),
            Self::Pt => langid!("pt"),
        }
    }

    /// Resolves a language tag such as `pt`, `pt-BR` or `EN` to a supported language.
    pub fn from_code(code: &str) -> Option<Self> {
        let id: LanguageIdentifier = code.trim().parse().ok()?;
        match id.language.as_str() {
            "en" => Some(Self::En),
            "pt" => Some(Self::Pt),
            _ => None,
        }
    }

    /// Language submenu: 1 English, 2 Portuguese.
    pub fn code_for_menu_choice(choice: &str) -> Option<&'static str> {
        match choice.trim() {
            "1" => Some("en"),
            "2" => Some("pt"),
            _ => None,
        }
    }
}

// Simple in-memory translations
#[derive(Default)]
pub struct Translations {
    strings: HashMap<&'static str, &'static str>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: &'static str) {
        self.strings.insert(key, value);
    }

    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.strings.get(key).copied()
    }
}

pub struct Localizations {
    translations: HashMap<Language, Translations>,
    current_lang: Language,
}

impl Localizations {
    pub fn new(language: Language) -> Self {
        let mut translations = HashMap::new();
        translations.insert(Language::En, english());
        translations.insert(Language::Pt, portuguese());

        Self {
            translations,
            current_lang: language,
        }
    }

    pub fn language(&self) -> Language {
        self.current_lang
    }

    /// Looks a key up in the active language, falling back to English and then
    /// to the key itself.
    pub fn lookup(&self, key: &str) -> &'static str {
        self.translations
            .get(&self.current_lang)
            .and_then(|t| t.lookup(key))
            .or_else(|| {
                if self.current_lang != Language::En {
                    self.translations.get(&Language::En).and_then(|t| t.lookup(key))
                } else {
                    None
                }
            })
            .unwrap_or_else(|| {
                log::warn!("Missing translation for key '{}'", key);
                ""
            })
    }

    /// Looks a key up and substitutes `arg` for its `{}` placeholder.
    pub fn format(&self, key: &str, arg: impl std::fmt::Display) -> String {
        self.lookup(key).replacen("{}", &arg.to_string(), 1)
    }

    /// Switches the active text set. Unsupported codes leave it unchanged.
    pub fn select(&mut self, code: &str) -> Option<Language> {
        let language = Language::from_code(code)?;
        if !self.translations.contains_key(&language) {
            return None;
        }
        self.current_lang = language;
        Some(language)
    }
}

fn english() -> Translations {
    let mut en = Translations::new();
    en.insert("app_title", "=== Video Downloader ===");
    en.insert("menu_download", "1. Download video");
    en.insert("menu_history", "2. Show download history");
    en.insert("menu_clear", "3. Clear history");
    en.insert("menu_language", "4. Change language");
    en.insert("menu_exit", "5. Exit");
    en.insert("choose_option", "Choose an option: ");
    en.insert("enter_url", "Enter the video URL: ");
    en.insert("no_url", "Please enter a URL");
    en.insert("video_quality", "Video quality:");
    en.insert("best_quality", "1. Best available");
    en.insert("720p", "2. 720p");
    en.insert("480p", "3. 480p");
    en.insert("360p", "4. 360p");
    en.insert("choose_quality", "Choose the quality (1-4): ");
    en.insert("analyzing_url", "Analyzing URL: {}");
    en.insert("title", "Title: {}");
    en.insert("duration", "Duration: {}");
    en.insert("unknown_video", "Unknown video");
    en.insert("unknown_duration", "Unknown");
    en.insert("unknown_platform", "Unknown");
    en.insert("starting_download", "Starting download...");
    en.insert("downloading_file", "Downloading {}");
    en.insert("default_filename", "file");
    en.insert("download_completed", "Download completed!");
    en.insert("download_success", "Video '{}' downloaded successfully!");
    en.insert("saved_in", "Saved in: {}");
    en.insert("download_error", "Error while downloading: {}");
    en.insert("storage_error", "Could not save history: {}");
    en.insert("config_error", "Could not save settings: {}");
    en.insert("no_history", "No downloads in history.");
    en.insert("history_title", "=== Download History ===");
    en.insert("history_url", "URL");
    en.insert("history_date", "Date");
    en.insert("history_platform", "Platform");
    en.insert("history_quality", "Quality");
    en.insert("confirm_clear", "Are you sure you want to clear the history? (y/n): ");
    en.insert("history_cleared", "History cleared successfully!");
    en.insert("language_options", "Available languages:");
    en.insert("language_en", "1. English");
    en.insert("language_pt", "2. Português");
    en.insert("choose_language", "Choose the language (1-2): ");
    en.insert("language_changed", "Language changed successfully!");
    en.insert("invalid_option", "Invalid option!");
    en.insert("exiting", "Goodbye!");
    en.insert("interrupted", "Program interrupted by the user.");
    en
}

fn portuguese() -> Translations {
    let mut pt = Translations::new();
    pt.insert("app_title", "=== Baixador de Vídeos ===");
    pt.insert("menu_download", "1. Baixar vídeo");
    pt.insert("menu_history", "2. Ver histórico de downloads");
    pt.insert("menu_clear", "3. Limpar histórico");
    pt.insert("menu_language", "4. Mudar idioma");
    pt.insert("menu_exit", "5. Sair");
    pt.insert("choose_option", "Escolha uma opção: ");
    pt.insert("enter_url", "Digite a URL do vídeo: ");
    pt.insert("no_url", "Por favor, digite uma URL");
    pt.insert("video_quality", "Qualidade do vídeo:");
    pt.insert("best_quality", "1. Melhor disponível");
    pt.insert("720p", "2. 720p");
    pt.insert("480p", "3. 480p");
    pt.insert("360p", "4. 360p");
    pt.insert("choose_quality", "Escolha a qualidade (1-4): ");
    pt.insert("analyzing_url", "Analisando URL: {}");
    pt.insert("title", "Título: {}");
    pt.insert("duration", "Duração: {}");
    pt.insert("unknown_video", "Vídeo desconhecido");
    pt.insert("unknown_duration", "Desconhecida");
    pt.insert("unknown_platform", "Desconhecida");
    pt.insert("starting_download", "Iniciando download...");
    pt.insert("downloading_file", "Baixando {}");
    pt.insert("default_filename", "arquivo");
    pt.insert("download_completed", "Download concluído!");
    pt.insert("download_success", "Vídeo '{}' baixado com sucesso!");
    pt.insert("saved_in", "Salvo em: {}");
    pt.insert("download_error", "Erro ao baixar: {}");
    pt.insert("storage_error", "Não foi possível salvar o histórico: {}");
    pt.insert("config_error", "Não foi possível salvar as configurações: {}");
    pt.insert("no_history", "Nenhum download no histórico.");
    pt.insert("history_title", "=== Histórico de Downloads ===");
    pt.insert("history_url", "URL");
    pt.insert("history_date", "Data");
    pt.insert("history_platform", "Plataforma");
    pt.insert("history_quality", "Qualidade");
    pt.insert("confirm_clear", "Tem certeza que deseja limpar o histórico? (s/n): ");
    pt.insert("history_cleared", "Histórico limpo com sucesso!");
    pt.insert("language_options", "Idiomas disponíveis:");
    pt.insert("language_en", "1. English");
    pt.insert("language_pt", "2. Português");
    pt.insert("choose_language", "Escolha o idioma (1-2): ");
    pt.insert("language_changed", "Idioma alterado com sucesso!");
    pt.insert("invalid_option", "Opção inválida!");
    pt.insert("exiting", "Até logo!");
    pt.insert("interrupted", "Programa interrompido pelo usuário.");
    pt
}
