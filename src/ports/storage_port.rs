//! Durable persistence port for the trade collection.

use crate::domain::error::JournalError;
use crate::domain::trade::StoredTrade;

/// Opaque key-value persistence holding the whole trade collection.
pub trait StoragePort {
    /// `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<StoredTrade>>, JournalError>;

    fn save(&self, trades: &[StoredTrade]) -> Result<(), JournalError>;
}
