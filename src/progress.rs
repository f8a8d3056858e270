use std::io::Write;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::localizations::Localizations;
use crate::models::ProgressEvent;
use crate::theme;

/// Turns engine progress events into a terminal progress bar.
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
    visible: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: None,
            visible: true,
        }
    }

    /// Reporter whose bar is tracked but never drawn.
    pub fn hidden() -> Self {
        Self {
            bar: None,
            visible: false,
        }
    }

    pub fn reset(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    pub fn handle(
        &mut self,
        event: &ProgressEvent,
        texts: &Localizations,
        out: &mut impl Write,
    ) -> std::io::Result<()> {
        match event {
            ProgressEvent::Downloading {
                downloaded_bytes,
                total_bytes,
                filename,
            } => {
                if self.bar.is_none() {
                    if let Some(total) = total_bytes {
                        let name = filename
                            .as_deref()
                            .unwrap_or_else(|| texts.lookup("default_filename"));
                        self.bar = Some(self.make_bar(*total, texts.format("downloading_file", name)));
                    }
                }

                if let (Some(bar), Some(downloaded)) = (&self.bar, downloaded_bytes) {
                    bar.inc(downloaded.saturating_sub(bar.position()));
                }
            }
            ProgressEvent::Finished { filename } => {
                log::debug!("Finished {}", filename.as_deref().unwrap_or("<unnamed>"));
                if let Some(bar) = self.bar.take() {
                    bar.finish();
                }
                writeln!(out, "{}", theme::success().apply_to(texts.lookup("download_completed")))?;
            }
        }
        Ok(())
    }

    fn make_bar(&self, total: u64, message: String) -> ProgressBar {
        let bar = if self.visible {
            ProgressBar::new(total)
        } else {
            ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden())
        };
        bar.set_style(
            ProgressStyle::with_template(
                "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} @ {bytes_per_sec} ({eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━━╌"),
        );
        bar.set_message(message);
        bar
    }
}
