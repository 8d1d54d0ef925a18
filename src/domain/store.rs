//! The owned, date-ordered trade collection.
//!
//! Every mutation re-sorts (stably) by date, persists through the
//! [`StoragePort`] and reports a [`StoreChange`]. Persistence failures are
//! logged and swallowed: memory is the source of truth for the session.
//!
//! A stored trade always has a finite `pnl`; its other numeric fields are
//! finite or zero.

use std::collections::HashSet;

use tracing::{debug, error, warn};

use crate::domain::error::JournalError;
use crate::domain::trade::{StoredTrade, Trade, TradeId};
use crate::ports::storage_port::StoragePort;

/// What a mutation left behind, for the presentation layer to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    pub len: usize,
    pub export_available: bool,
}

/// Persisted ids above this are renumbered on load so allocation cannot overflow.
const MAX_RESTORED_ID: u64 = u64::MAX / 2;

pub struct TradeStore<S: StoragePort> {
    storage: S,
    trades: Vec<StoredTrade>,
    next_id: u64,
}

impl<S: StoragePort> TradeStore<S> {
    /// Load whatever the storage holds. Unreadable storage yields an empty store.
    pub fn open(storage: S) -> Self {
        let loaded = match storage.load() {
            Ok(Some(trades)) => trades,
            Ok(None) => Vec::new(),
            Err(e) => {
                error!(error = %e, "failed to load trades, starting empty");
                Vec::new()
            }
        };

        let mut store = Self {
            storage,
            trades: Vec::with_capacity(loaded.len()),
            next_id: 1,
        };
        store.restore(loaded);
        store
    }

    fn restore(&mut self, loaded: Vec<StoredTrade>) {
        let max_id = loaded.iter().map(|t| t.id.0).max().unwrap_or(0);
        let renumber = max_id > MAX_RESTORED_ID;
        if renumber {
            warn!(max_id, "persisted trade ids out of range, renumbering");
        } else {
            self.next_id = max_id + 1;
        }

        let mut seen = HashSet::new();
        for mut stored in loaded {
            if !stored.trade.pnl.is_finite() {
                debug!(id = %stored.id, "dropping persisted trade with non-finite pnl");
                continue;
            }
            stored.trade.clear_non_finite();
            if renumber || !stored.id.is_assigned() || !seen.insert(stored.id) {
                stored.id = self.allocate_id();
                seen.insert(stored.id);
            }
            self.trades.push(stored);
        }
        self.sort();
    }

    pub fn all(&self) -> &[StoredTrade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn get(&self, id: TradeId) -> Option<&StoredTrade> {
        self.trades.iter().find(|t| t.id == id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Merge an imported batch into the collection. Trades without a finite
    /// P&L are skipped.
    pub fn import_batch(&mut self, trades: Vec<Trade>) -> StoreChange {
        self.trades.reserve(trades.len());
        for mut trade in trades {
            if !trade.pnl.is_finite() {
                warn!(symbol = %trade.symbol, "skipping trade with non-finite pnl");
                continue;
            }
            trade.clear_non_finite();
            let id = self.allocate_id();
            self.trades.push(StoredTrade { id, trade });
        }
        self.commit()
    }

    /// Add a single manually entered trade, inferring risk:reward when absent.
    pub fn insert_one(
        &mut self,
        mut trade: Trade,
    ) -> Result<(TradeId, StoreChange), JournalError> {
        if !trade.pnl.is_finite() {
            return Err(JournalError::InvalidTrade {
                reason: "pnl must be a finite number".into(),
            });
        }
        trade.clear_non_finite();
        if trade.risk_reward == 0.0 {
            trade.risk_reward = trade.infer_risk_reward();
        }
        let id = self.allocate_id();
        self.trades.push(StoredTrade { id, trade });
        Ok((id, self.commit()))
    }

    pub fn delete(&mut self, id: TradeId) -> Result<StoreChange, JournalError> {
        let position = self
            .trades
            .iter()
            .position(|t| t.id == id)
            .ok_or(JournalError::UnknownTrade { id })?;
        self.trades.remove(position);
        Ok(self.commit())
    }

    pub fn clear_all(&mut self) -> StoreChange {
        self.trades.clear();
        self.commit()
    }

    fn allocate_id(&mut self) -> TradeId {
        let id = TradeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn sort(&mut self) {
        self.trades.sort_by_key(|t| t.trade.date);
    }

    fn commit(&mut self) -> StoreChange {
        self.sort();
        if let Err(e) = self.storage.save(&self.trades) {
            error!(error = %e, trades = self.trades.len(), "failed to persist trades");
        }
        StoreChange {
            len: self.trades.len(),
            export_available: !self.trades.is_empty(),
        }
    }
}
