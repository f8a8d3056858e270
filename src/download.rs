use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use serde::Deserialize;

use crate::errors::DownloadError;
use crate::models::{FormatConstraint, ProgressEvent, VideoInfo};

const PROGRESS_PREFIX: &str = "ytdl-progress|";
const PROGRESS_TEMPLATE: &str = "download:ytdl-progress|%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.filename)s";
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// The external extraction/download engine.
pub trait Extractor {
    fn extract_metadata(&self, url: &str) -> Result<VideoInfo, DownloadError>;

    /// Downloads `url`, calling `on_progress` synchronously for every progress
    /// update the engine reports.
    fn download(
        &self,
        url: &str,
        format: FormatConstraint,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<(), DownloadError>;
}

/// Drives the `yt-dlp` binary.
pub struct YtDlp {
    binary: String,
    download_dir: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<String>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            download_dir: download_dir.into(),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    fn command(&self) -> Result<Command, DownloadError> {
        let path = which::which(&self.binary).map_err(|e| {
            log::debug!("Failed to locate {}: {}", self.binary, e);
            DownloadError::BinaryNotFound(self.binary.clone())
        })?;
        Ok(Command::new(path))
    }

    fn spawn_error(&self, source: std::io::Error) -> DownloadError {
        DownloadError::Spawn {
            binary: self.binary.clone(),
            source,
        }
    }
}

impl Extractor for YtDlp {
    fn extract_metadata(&self, url: &str) -> Result<VideoInfo, DownloadError> {
        let mut command = self.command()?;
        command
            .arg("--dump-single-json")
            .arg("--skip-download")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg(url);

        log::debug!("Command: {:?}", command);
        let output = command.output().map_err(|e| self.spawn_error(e))?;
        if !output.status.success() {
            return Err(DownloadError::Failed(failure_message(&output.stderr, output.status)));
        }

        parse_video_info(&output.stdout)
    }

    fn download(
        &self,
        url: &str,
        format: FormatConstraint,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<(), DownloadError> {
        let output_template = self.download_dir.join(OUTPUT_TEMPLATE).to_string_lossy().to_string();

        // stderr goes to a file so a chatty engine cannot stall on a full pipe
        // while stdout is being read.
        let mut stderr_file = tempfile::tempfile().map_err(|e| self.spawn_error(e))?;
        let stderr_sink = stderr_file.try_clone().map_err(|e| self.spawn_error(e))?;

        let mut command = self.command()?;
        command
            .arg("-f")
            .arg(format.selector())
            .arg("-o")
            .arg(&output_template)
            .arg("--no-playlist")
            .arg("--newline")
            .arg("--progress")
            .arg("--no-warnings")
            .arg("--progress-template")
            .arg(PROGRESS_TEMPLATE)
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::from(stderr_sink));

        log::info!("Downloading {} with format {}", url, format.selector());
        log::debug!("Command: {:?}", command);

        let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;

        let mut finished = false;
        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines() {
                let line = line.map_err(|e| self.spawn_error(e))?;
                match parse_progress_line(&line) {
                    Some(event) => {
                        finished |= matches!(event, ProgressEvent::Finished { .. });
                        on_progress(event);
                    }
                    None => log::trace!("yt-dlp: {}", line),
                }
            }
        }

        let status = child.wait().map_err(|e| self.spawn_error(e))?;
        log::info!("Command status: {}", status);
        if !status.success() {
            let stderr = read_back(&mut stderr_file).map_err(|e| self.spawn_error(e))?;
            return Err(DownloadError::Failed(failure_message(&stderr, status)));
        }

        // Already-downloaded files never report a finished hook.
        if !finished {
            on_progress(ProgressEvent::Finished { filename: None });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawVideoInfo {
    title: Option<String>,
    duration_string: Option<String>,
    extractor: Option<String>,
}

pub fn parse_video_info(stdout: &[u8]) -> Result<VideoInfo, DownloadError> {
    let raw: RawVideoInfo = serde_json::from_slice(stdout)?;
    Ok(VideoInfo {
        title: raw.title.filter(|t| !t.trim().is_empty()),
        duration: raw.duration_string,
        platform: raw.extractor,
    })
}

/// Parses one line printed through our progress template. Other lines yield `None`.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let mut parts = rest.splitn(4, '|');
    let status = parts.next()?;
    let downloaded_bytes = parse_bytes(parts.next()?);
    let total_bytes = parse_bytes(parts.next()?);
    let filename = parts
        .next()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty() && *f != "NA")
        .map(|f| {
            Path::new(f)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| f.to_string())
        });

    match status {
        "downloading" => Some(ProgressEvent::Downloading {
            downloaded_bytes,
            total_bytes,
            filename,
        }),
        "finished" => Some(ProgressEvent::Finished { filename }),
        _ => None,
    }
}

// yt-dlp prints "NA" for unknown fields and sometimes floats for byte counts.
fn parse_bytes(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0).map(|v| v as u64))
}

fn read_back(file: &mut File) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

fn failure_message(stderr: &[u8], status: ExitStatus) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.trim_start_matches("ERROR:").trim().to_string())
        .unwrap_or_else(|| format!("Command failed with status: {}", status))
}
