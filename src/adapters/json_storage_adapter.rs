//! JSON file storage adapter: the whole collection under a single file.
//!
//! Records are decoded one by one, so a single unreadable entry costs that
//! entry and not the journal.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::domain::error::JournalError;
use crate::domain::trade::StoredTrade;
use crate::ports::storage_port::StoragePort;

pub const DEFAULT_FILE_NAME: &str = "tradezilla_trades.json";

pub struct JsonStorageAdapter {
    path: PathBuf,
}

impl JsonStorageAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoragePort for JsonStorageAdapter {
    fn load(&self) -> Result<Option<Vec<StoredTrade>>, JournalError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(JournalError::Persistence {
                    reason: format!("failed to read {}: {}", self.path.display(), e),
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        let records: Vec<Value> =
            serde_json::from_str(&content).map_err(|e| JournalError::Persistence {
                reason: format!("failed to parse {}: {}", self.path.display(), e),
            })?;

        let mut trades = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<StoredTrade>(record) {
                Ok(trade) => trades.push(trade),
                Err(e) => warn!(
                    index,
                    path = %self.path.display(),
                    error = %e,
                    "skipping unreadable trade record"
                ),
            }
        }
        Ok(Some(trades))
    }

    fn save(&self, trades: &[StoredTrade]) -> Result<(), JournalError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| JournalError::Persistence {
                reason: format!("failed to create {}: {}", parent.display(), e),
            })?;
        }

        let json = serde_json::to_string_pretty(trades).map_err(|e| JournalError::Persistence {
            reason: format!("failed to serialize trades: {}", e),
        })?;

        fs::write(&self.path, json).map_err(|e| JournalError::Persistence {
            reason: format!("failed to write {}: {}", self.path.display(), e),
        })
    }
}
