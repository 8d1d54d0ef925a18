//! In-process storage adapter, for sessions that should not touch disk.

use std::cell::{Cell, RefCell};

use crate::domain::error::JournalError;
use crate::domain::trade::StoredTrade;
use crate::ports::storage_port::StoragePort;

#[derive(Default)]
pub struct MemoryStorageAdapter {
    slot: RefCell<Option<Vec<StoredTrade>>>,
    saves: Cell<usize>,
    fail_saves: Cell<bool>,
    fail_loads: Cell<bool>,
}

impl MemoryStorageAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trades(trades: Vec<StoredTrade>) -> Self {
        let adapter = Self::default();
        adapter.slot.replace(Some(trades));
        adapter
    }

    /// Make every subsequent save fail, as a full quota would.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.set(fail);
    }

    /// Last successfully saved collection, if any.
    pub fn saved(&self) -> Option<Vec<StoredTrade>> {
        self.slot.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl StoragePort for MemoryStorageAdapter {
    fn load(&self) -> Result<Option<Vec<StoredTrade>>, JournalError> {
        if self.fail_loads.get() {
            return Err(JournalError::Persistence {
                reason: "storage unavailable".into(),
            });
        }
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, trades: &[StoredTrade]) -> Result<(), JournalError> {
        if self.fail_saves.get() {
            return Err(JournalError::Persistence {
                reason: "quota exceeded".into(),
            });
        }
        self.slot.replace(Some(trades.to_vec()));
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
