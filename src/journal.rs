//! Journal commands: the operations the presentation layer issues.
//!
//! Each [`Command`] runs to completion against the owned [`TradeStore`] and
//! returns an [`Outcome`] with a freshly computed [`Dashboard`]. Failures come
//! back as [`JournalError`] values and leave the store as it was.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::info;

use crate::adapters::csv_adapter;
use crate::domain::error::{JournalError, Rejection};
use crate::domain::metrics::{Dashboard, DashboardOptions};
use crate::domain::normalizer::normalize_batch;
use crate::domain::store::{StoreChange, TradeStore};
use crate::domain::trade::{StoredTrade, TradeDraft, TradeId};
use crate::ports::storage_port::StoragePort;

#[derive(Debug, Clone)]
pub enum Command {
    /// Raw bytes of a CSV file with a header row.
    ImportCsv { data: Vec<u8> },
    AddTrade(TradeDraft),
    DeleteTrade(TradeId),
    ClearAll,
    ExportCsv {
        directory: PathBuf,
        export_date: NaiveDate,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Imported {
        accepted: usize,
        skipped: usize,
        rejections: Vec<Rejection>,
    },
    Added {
        id: TradeId,
    },
    Deleted {
        id: TradeId,
    },
    Cleared,
    Exported {
        path: PathBuf,
        trades: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub notice: Notice,
    /// Present when the command mutated the store.
    pub change: Option<StoreChange>,
    pub dashboard: Dashboard,
}

pub struct Journal<S: StoragePort> {
    store: TradeStore<S>,
    options: DashboardOptions,
}

impl<S: StoragePort> Journal<S> {
    pub fn new(store: TradeStore<S>, options: DashboardOptions) -> Self {
        Self { store, options }
    }

    pub fn open(storage: S, options: DashboardOptions) -> Self {
        Self::new(TradeStore::open(storage), options)
    }

    pub fn trades(&self) -> &[StoredTrade] {
        self.store.all()
    }

    pub fn store(&self) -> &TradeStore<S> {
        &self.store
    }

    pub fn options(&self) -> DashboardOptions {
        self.options
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::compute(self.store.all(), self.options)
    }

    pub fn execute(&mut self, command: Command) -> Result<Outcome, JournalError> {
        let (notice, change) = match command {
            Command::ImportCsv { data } => self.import_csv(&data)?,
            Command::AddTrade(draft) => {
                let trade = draft.into_trade()?;
                let (id, change) = self.store.insert_one(trade)?;
                info!(%id, "added trade");
                (Notice::Added { id }, Some(change))
            }
            Command::DeleteTrade(id) => {
                let change = self.store.delete(id)?;
                info!(%id, remaining = change.len, "deleted trade");
                (Notice::Deleted { id }, Some(change))
            }
            Command::ClearAll => {
                let change = self.store.clear_all();
                info!("cleared all trades");
                (Notice::Cleared, Some(change))
            }
            Command::ExportCsv {
                directory,
                export_date,
            } => {
                let path =
                    csv_adapter::write_export_file(self.store.all(), &directory, export_date)?;
                info!(path = %path.display(), trades = self.store.len(), "exported trades");
                (
                    Notice::Exported {
                        path,
                        trades: self.store.len(),
                    },
                    None,
                )
            }
        };

        Ok(Outcome {
            notice,
            change,
            dashboard: self.dashboard(),
        })
    }

    fn import_csv(&mut self, data: &[u8]) -> Result<(Notice, Option<StoreChange>), JournalError> {
        let rows = csv_adapter::read_rows(data)?;
        let batch = normalize_batch(rows);

        if batch.accepted.is_empty() {
            return Err(JournalError::EmptyImport {
                skipped: batch.skipped(),
            });
        }

        let accepted = batch.accepted.len();
        let skipped = batch.skipped();
        let change = self.store.import_batch(batch.accepted);
        info!(accepted, skipped, total = change.len, "imported trades");

        Ok((
            Notice::Imported {
                accepted,
                skipped,
                rejections: batch.rejected,
            },
            Some(change),
        ))
    }
}
