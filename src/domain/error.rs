//! Domain error types.

use std::fmt;

use crate::domain::trade::TradeId;

/// Why a single CSV row was left out of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InvalidDate,
    MissingPnl,
    InvalidPnl,
    ProcessingError,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::InvalidDate => "invalid-date",
            RejectReason::MissingPnl => "missing-pnl",
            RejectReason::InvalidPnl => "invalid-pnl",
            RejectReason::ProcessingError => "processing-error",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row-level rejection. `row_index` is zero-based; messages print it one-based.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("row {row}: {reason} ({detail})", row = .row_index + 1)]
pub struct Rejection {
    pub reason: RejectReason,
    pub row_index: usize,
    pub detail: String,
}

impl Rejection {
    pub fn new(reason: RejectReason, row_index: usize, detail: impl Into<String>) -> Self {
        Self {
            reason,
            row_index,
            detail: detail.into(),
        }
    }
}

/// Top-level error type for tradezilla.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("failed to read CSV: {reason}")]
    FileRead { reason: String },

    #[error("no valid trades found in CSV ({skipped} rows skipped)")]
    EmptyImport { skipped: usize },

    #[error("persistence failure: {reason}")]
    Persistence { reason: String },

    #[error("no trade with id {id}")]
    UnknownTrade { id: TradeId },

    #[error("invalid trade: {reason}")]
    InvalidTrade { reason: String },

    #[error("no trades to export")]
    ExportUnavailable,

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&JournalError> for std::process::ExitCode {
    fn from(err: &JournalError) -> Self {
        let code: u8 = match err {
            JournalError::Io(_) | JournalError::Persistence { .. } => 1,
            JournalError::ConfigParse { .. } | JournalError::ConfigInvalid { .. } => 2,
            JournalError::FileRead { .. } | JournalError::EmptyImport { .. } => 3,
            JournalError::UnknownTrade { .. } | JournalError::InvalidTrade { .. } => 4,
            JournalError::ExportUnavailable => 5,
        };
        std::process::ExitCode::from(code)
    }
}
