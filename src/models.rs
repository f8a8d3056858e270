use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Quality tier offered in the download menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quality {
    #[default]
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "720")]
    P720,
    #[serde(rename = "480")]
    P480,
    #[serde(rename = "360")]
    P360,
}

impl Quality {
    /// Maps a quality menu answer to a tier. Unknown answers fall back to best.
    pub fn from_menu_choice(choice: &str) -> Self {
        match choice.trim() {
            "2" => Self::P720,
            "3" => Self::P480,
            "4" => Self::P360,
            _ => Self::Best,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Best => "best",
            Self::P720 => "720",
            Self::P480 => "480",
            Self::P360 => "360",
        }
    }

    pub fn format_constraint(&self) -> FormatConstraint {
        match self {
            Self::Best => FormatConstraint::Unconstrained,
            Self::P720 => FormatConstraint::MaxHeight(720),
            Self::P480 => FormatConstraint::MaxHeight(480),
            Self::P360 => FormatConstraint::MaxHeight(360),
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format restriction handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatConstraint {
    Unconstrained,
    MaxHeight(u32),
}

impl FormatConstraint {
    /// yt-dlp `-f` selector for this constraint.
    pub fn selector(&self) -> String {
        match self {
            Self::Unconstrained => "best".to_string(),
            Self::MaxHeight(height) => format!("best[height<={}]", height),
        }
    }
}

/// Metadata reported by the engine before a download starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub duration: Option<String>,
    pub platform: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Downloading {
        downloaded_bytes: Option<u64>,
        total_bytes: Option<u64>,
        filename: Option<String>,
    },
    Finished {
        filename: Option<String>,
    },
}

pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// One completed download, as stored in the history file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub title: String,
    pub url: String,
    #[serde(with = "display_date")]
    pub date: NaiveDateTime,
    pub quality: Quality,
    pub platform: String,
}

impl HistoryRecord {
    pub fn formatted_date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

mod display_date {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
