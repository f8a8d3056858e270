use std::io::{self, Write};

use crate::localizations::Localizations;
use crate::models::HistoryRecord;
use crate::theme;

pub fn render_main_menu(out: &mut impl Write, texts: &Localizations) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", theme::heading().apply_to(texts.lookup("app_title")))?;
    for key in ["menu_download", "menu_history", "menu_clear", "menu_language", "menu_exit"] {
        writeln!(out, "{}", theme::menu_item().apply_to(texts.lookup(key)))?;
    }
    writeln!(out)
}

pub fn render_quality_menu(out: &mut impl Write, texts: &Localizations) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", texts.lookup("video_quality"))?;
    for key in ["best_quality", "720p", "480p", "360p"] {
        writeln!(out, "{}", texts.lookup(key))?;
    }
    Ok(())
}

pub fn render_language_menu(out: &mut impl Write, texts: &Localizations) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", texts.lookup("language_options"))?;
    writeln!(out, "{}", texts.lookup("language_en"))?;
    writeln!(out, "{}", texts.lookup("language_pt"))
}

pub fn render_history(out: &mut impl Write, records: &[HistoryRecord], texts: &Localizations) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "{}", theme::warning().apply_to(texts.lookup("no_history")));
    }

    writeln!(out)?;
    writeln!(out, "{}", theme::heading().apply_to(texts.lookup("history_title")))?;
    for (i, record) in records.iter().enumerate() {
        writeln!(out, "{}", theme::menu_item().apply_to(format!("{}. {}", i + 1, record.title)))?;
        writeln!(out, "   {}: {}", texts.lookup("history_url"), record.url)?;
        writeln!(out, "   {}: {}", texts.lookup("history_date"), record.formatted_date())?;
        writeln!(out, "   {}: {}", texts.lookup("history_platform"), record.platform)?;
        writeln!(out, "   {}: {}", texts.lookup("history_quality"), record.quality)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Prints a prompt without a trailing newline.
pub fn prompt(out: &mut impl Write, text: &str) -> io::Result<()> {
    write!(out, "{}", text)?;
    out.flush()
}

pub fn success(out: &mut impl Write, text: &str) -> io::Result<()> {
    writeln!(out, "{}", theme::success().apply_to(text))
}

pub fn error(out: &mut impl Write, text: &str) -> io::Result<()> {
    writeln!(out, "{}", theme::error().apply_to(text))
}

pub fn detail(out: &mut impl Write, text: &str) -> io::Result<()> {
    writeln!(out, "{}", theme::detail().apply_to(text))
}

pub fn info(out: &mut impl Write, text: &str) -> io::Result<()> {
    writeln!(out, "{}", theme::heading().apply_to(text))
}
