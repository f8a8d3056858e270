//! Download history ledger.
//!
//! The ledger is the ordered list of every completed download. It is loaded
//! once at startup and rewritten as a whole after each append or clear.

use std::fs;
use std::path::PathBuf;

use crate::errors::StorageError;
use crate::models::HistoryRecord;

pub struct HistoryLedger {
    path: PathBuf,
    records: Vec<HistoryRecord>,
}

impl HistoryLedger {
    /// Reads the ledger from `path`. A missing or unreadable file starts an
    /// empty ledger; the failure is only logged.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records: Vec<HistoryRecord> = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("History file {} is corrupt, starting empty: {}", path.display(), e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                log::warn!("Failed to read history file {}: {}", path.display(), e);
                Vec::new()
            }
        };

        log::info!("Loaded {} history records from {}", records.len(), path.display());
        Self { path, records }
    }

    pub fn list(&self) -> &[HistoryRecord] {
        &self.records
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append(&mut self, record: HistoryRecord) -> Result<(), StorageError> {
        log::info!("Recording download '{}' ({})", record.title, record.url);
        self.records.push(record);
        self.save()
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.records.clear();
        self.save()
    }

    // Written to a sibling file first so a crash mid-write never truncates the ledger.
    fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        log::debug!("Saved {} history records to {}", self.records.len(), self.path.display());
        Ok(())
    }
}
