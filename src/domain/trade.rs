//! Canonical trade records and manual-entry drafts.

use std::fmt;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::dates;
use crate::domain::error::JournalError;

pub const LONG: &str = "Long";
pub const SHORT: &str = "Short";
/// Placeholder for a symbol or side the source did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Assumed distance from entry to the initial stop when inferring risk:reward.
const ASSUMED_STOP_PCT: f64 = 0.02;

/// One closed position with realized P&L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    #[serde(with = "dates::iso")]
    pub date: NaiveDateTime,
    pub symbol: String,
    pub side: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub entry: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub exit: f64,
    pub pnl: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub risk_reward: f64,
    #[serde(default)]
    pub notes: String,
}

/// Browsers persist `NaN` and infinities as `null`; read those back as "absent".
fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Option::<f64>::deserialize(deserializer).map(|v| v.unwrap_or(0.0))
}

impl Trade {
    pub fn is_long(&self) -> bool {
        self.side == LONG
    }

    /// Weekday index with Sunday as 0.
    pub fn weekday_index(&self) -> usize {
        self.date.weekday().num_days_from_sunday() as usize
    }

    /// Risk:reward estimate against a stop 2% adverse from entry.
    ///
    /// Only `"Long"` places the stop below entry; every other side is
    /// treated as short. Returns 0 unless entry, exit and side are all set.
    pub fn infer_risk_reward(&self) -> f64 {
        if !is_set(self.entry) || !is_set(self.exit) || self.side.is_empty() {
            return 0.0;
        }

        let price_diff = (self.exit - self.entry).abs();
        let stop = if self.is_long() {
            self.entry * (1.0 - ASSUMED_STOP_PCT)
        } else {
            self.entry * (1.0 + ASSUMED_STOP_PCT)
        };
        let stop_diff = (self.entry - stop).abs();

        let ratio = price_diff / stop_diff;
        if stop_diff > 0.0 && ratio.is_finite() {
            ratio
        } else {
            0.0
        }
    }

    /// Zero the optional numeric fields that are NaN or infinite.
    ///
    /// `pnl` is left alone: a trade without a finite P&L is not storable.
    pub fn clear_non_finite(&mut self) {
        for value in [
            &mut self.quantity,
            &mut self.entry,
            &mut self.exit,
            &mut self.risk_reward,
        ] {
            if !value.is_finite() {
                *value = 0.0;
            }
        }
    }
}

impl AsRef<Trade> for Trade {
    fn as_ref(&self) -> &Trade {
        self
    }
}

fn is_set(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Store-assigned identifier, stable for the lifetime of a stored trade.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TradeId(pub u64);

impl TradeId {
    /// Ids are assigned from 1; 0 marks a record that still needs one.
    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A trade as held by the store: the record plus its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTrade {
    #[serde(default)]
    pub id: TradeId,
    #[serde(flatten)]
    pub trade: Trade,
}

impl AsRef<Trade> for StoredTrade {
    fn as_ref(&self) -> &Trade {
        &self.trade
    }
}

/// Fields collected by the manual add-trade form.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeDraft {
    pub date: NaiveDateTime,
    pub symbol: String,
    pub side: String,
    pub quantity: f64,
    pub entry: f64,
    pub exit: f64,
    pub notes: String,
}

impl TradeDraft {
    /// Realized P&L implied by the draft's prices. Unknown sides yield 0.
    pub fn pnl(&self) -> f64 {
        match self.side.as_str() {
            LONG => (self.exit - self.entry) * self.quantity,
            SHORT => (self.entry - self.exit) * self.quantity,
            _ => 0.0,
        }
    }

    pub fn into_trade(self) -> Result<Trade, JournalError> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(JournalError::InvalidTrade {
                reason: "symbol must not be empty".into(),
            });
        }

        if ![self.quantity, self.entry, self.exit].iter().all(|v| v.is_finite()) {
            return Err(JournalError::InvalidTrade {
                reason: "entry, exit and quantity must be finite numbers".into(),
            });
        }

        let pnl = self.pnl();
        if !pnl.is_finite() {
            return Err(JournalError::InvalidTrade {
                reason: "computed P&L is out of range".into(),
            });
        }

        Ok(Trade {
            date: self.date,
            symbol,
            side: self.side,
            quantity: self.quantity,
            entry: self.entry,
            exit: self.exit,
            pnl,
            risk_reward: 0.0,
            notes: self.notes,
        })
    }
}
