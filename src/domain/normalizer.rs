//! Maps rows from heterogeneous broker/exchange CSV exports onto [`Trade`].
//!
//! Each canonical field is looked up through an ordered alias list; the first
//! alias present with a non-empty value wins. Header matching is exact.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::domain::dates::parse_trade_date;
use crate::domain::error::{RejectReason, Rejection};
use crate::domain::numbers::{parse_lenient, parse_pnl};
use crate::domain::trade::{NOT_AVAILABLE, Trade};

/// One CSV record keyed by header name.
pub type Row = HashMap<String, String>;

pub const DATE_ALIASES: &[&str] = &[
    "dateStart",
    "Date",
    "date",
    "Open Time",
    "TIME",
    "Time",
    "Entry Time",
];
pub const PNL_ALIASES: &[&str] = &["rPnL", "P&L", "pnl", "uPnL", "Profit/Loss", "Profit", "PL"];
pub const SYMBOL_ALIASES: &[&str] = &["pair", "Symbol", "symbol", "Ticker", "stock"];
pub const SIDE_ALIASES: &[&str] = &["side", "Side", "Type", "Direction"];
pub const QUANTITY_ALIASES: &[&str] = &["amount", "Quantity", "quantity", "Qty", "Size", "Shares"];
pub const ENTRY_ALIASES: &[&str] = &["entryPrice", "Entry", "entry", "Entry Price", "Open"];
pub const EXIT_ALIASES: &[&str] = &["avgClosePrice", "Exit", "exit", "Exit Price", "Close"];
/// `Risk:Reward` comes last so exported files import back unchanged.
pub const RISK_REWARD_ALIASES: &[&str] =
    &["avgRiskReward", "maxRiskReward", "R:R", "RR", "Risk:Reward"];
pub const NOTES_ALIASES: &[&str] = &["tags", "Notes", "notes", "Comment"];

fn lookup<'a>(row: &'a Row, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .find_map(|key| row.get(*key).map(String::as_str).filter(|v| !v.is_empty()))
}

/// Normalize one row, or say why it was rejected.
pub fn normalize(row: &Row, row_index: usize) -> Result<Trade, Rejection> {
    let date = match lookup(row, DATE_ALIASES) {
        Some(raw) => parse_trade_date(raw)
            .ok_or_else(|| Rejection::new(RejectReason::InvalidDate, row_index, raw))?,
        None => {
            return Err(Rejection::new(
                RejectReason::InvalidDate,
                row_index,
                "no date column",
            ));
        }
    };

    let pnl = match lookup(row, PNL_ALIASES) {
        Some(raw) => {
            parse_pnl(raw).ok_or_else(|| Rejection::new(RejectReason::InvalidPnl, row_index, raw))?
        }
        None => {
            return Err(Rejection::new(
                RejectReason::MissingPnl,
                row_index,
                "no P&L column",
            ));
        }
    };

    let numeric = |aliases: &[&str]| lookup(row, aliases).map(parse_lenient).unwrap_or(0.0);
    let text = |aliases: &[&str], default: &str| {
        lookup(row, aliases).unwrap_or(default).to_string()
    };

    Ok(Trade {
        date,
        symbol: text(SYMBOL_ALIASES, NOT_AVAILABLE),
        side: text(SIDE_ALIASES, NOT_AVAILABLE),
        quantity: numeric(QUANTITY_ALIASES),
        entry: numeric(ENTRY_ALIASES),
        exit: numeric(EXIT_ALIASES),
        pnl,
        risk_reward: numeric(RISK_REWARD_ALIASES),
        notes: text(NOTES_ALIASES, ""),
    })
}

/// Accepted trades and per-row rejections from one import.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub accepted: Vec<Trade>,
    pub rejected: Vec<Rejection>,
}

impl BatchResult {
    pub fn skipped(&self) -> usize {
        self.rejected.len()
    }
}

/// Normalize every row. A row that could not even be decoded arrives as
/// `Err(detail)` and is rejected as `processing-error`; nothing aborts the batch.
pub fn normalize_batch<I>(rows: I) -> BatchResult
where
    I: IntoIterator<Item = Result<Row, String>>,
{
    let mut result = BatchResult::default();

    for (index, row) in rows.into_iter().enumerate() {
        let outcome = match row {
            Ok(row) => normalize(&row, index),
            Err(detail) => Err(Rejection::new(RejectReason::ProcessingError, index, detail)),
        };

        match outcome {
            Ok(trade) => result.accepted.push(trade),
            Err(rejection) => {
                warn!(
                    row = rejection.row_index + 1,
                    reason = %rejection.reason,
                    detail = %rejection.detail,
                    "skipping row"
                );
                result.rejected.push(rejection);
            }
        }
    }

    info!(
        accepted = result.accepted.len(),
        skipped = result.skipped(),
        "normalized CSV rows"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn jan(day: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn normalizes_generic_dialect() {
        let r = row(&[
            ("Date", "2024-01-05"),
            ("Symbol", "AAPL"),
            ("Side", "Long"),
            ("Quantity", "10"),
            ("Entry", "187.25"),
            ("Exit", "190.50"),
            ("P&L", "$32.50"),
            ("R:R", "1.6"),
            ("Notes", "gap fill"),
        ]);
        let trade = normalize(&r, 0).unwrap();
        assert_eq!(trade.date, jan(5));
        assert_eq!(trade.symbol, "AAPL");
        assert_eq!(trade.side, "Long");
        assert_eq!(trade.quantity, 10.0);
        assert_eq!(trade.entry, 187.25);
        assert_eq!(trade.exit, 190.5);
        assert_eq!(trade.pnl, 32.5);
        assert_eq!(trade.risk_reward, 1.6);
        assert_eq!(trade.notes, "gap fill");
    }

    #[test]
    fn normalizes_exchange_dialect() {
        let r = row(&[
            ("dateStart", "2024-01-05T09:30:00Z"),
            ("pair", "BTCUSDT"),
            ("side", "buy"),
            ("amount", "0.25"),
            ("entryPrice", "42000.5"),
            ("avgClosePrice", "42400"),
            ("rPnL", "99.88"),
            ("avgRiskReward", "2.1"),
            ("tags", "scalp"),
        ]);
        let trade = normalize(&r, 0).unwrap();
        assert_eq!(trade.symbol, "BTCUSDT");
        assert_eq!(trade.side, "buy");
        assert_eq!(trade.quantity, 0.25);
        assert_eq!(trade.entry, 42000.5);
        assert_eq!(trade.exit, 42400.0);
        assert_eq!(trade.pnl, 99.88);
        assert_eq!(trade.risk_reward, 2.1);
        assert_eq!(trade.notes, "scalp");
    }

    #[test]
    fn earlier_alias_wins() {
        let r = row(&[("date", "2024-01-09"), ("Date", "2024-01-05"), ("pnl", "1"), ("rPnL", "2")]);
        let trade = normalize(&r, 0).unwrap();
        assert_eq!(trade.date, jan(5));
        assert_eq!(trade.pnl, 2.0);
    }

    #[test]
    fn empty_cell_falls_through_to_next_alias() {
        let r = row(&[("rPnL", ""), ("Profit", "12.5"), ("Date", "2024-01-05")]);
        assert_eq!(normalize(&r, 0).unwrap().pnl, 12.5);
    }

    #[test]
    fn alias_matching_is_exact() {
        let r = row(&[("DATE", "2024-01-05"), ("pnl", "1")]);
        let err = normalize(&r, 4).unwrap_err();
        assert_eq!(err.reason, RejectReason::InvalidDate);
        assert_eq!(err.row_index, 4);
    }

    #[test]
    fn missing_optional_fields_get_defaults() {
        let r = row(&[("Date", "2024-01-05"), ("pnl", "-5")]);
        let trade = normalize(&r, 0).unwrap();
        assert_eq!(trade.symbol, "N/A");
        assert_eq!(trade.side, "N/A");
        assert_eq!(trade.quantity, 0.0);
        assert_eq!(trade.entry, 0.0);
        assert_eq!(trade.exit, 0.0);
        assert_eq!(trade.risk_reward, 0.0);
        assert_eq!(trade.notes, "");
    }

    #[test]
    fn unparseable_optional_fields_default_to_zero() {
        let r = row(&[("Date", "2024-01-05"), ("pnl", "1"), ("Qty", "lots"), ("Entry", "--")]);
        let trade = normalize(&r, 0).unwrap();
        assert_eq!(trade.quantity, 0.0);
        assert_eq!(trade.entry, 0.0);
    }

    #[test]
    fn invalid_date_rejected() {
        let r = row(&[("Date", "someday"), ("pnl", "1")]);
        assert_eq!(normalize(&r, 0).unwrap_err().reason, RejectReason::InvalidDate);
    }

    #[test]
    fn missing_pnl_rejected() {
        let r = row(&[("Date", "2024-01-05"), ("Symbol", "AAPL")]);
        assert_eq!(normalize(&r, 0).unwrap_err().reason, RejectReason::MissingPnl);
    }

    #[test]
    fn invalid_pnl_rejected() {
        let r = row(&[("Date", "2024-01-05"), ("P&L", "n/a")]);
        let err = normalize(&r, 0).unwrap_err();
        assert_eq!(err.reason, RejectReason::InvalidPnl);
        assert_eq!(err.detail, "n/a");
    }

    #[test]
    fn batch_counts_accepted_and_skipped() {
        let rows = vec![
            Ok(row(&[("Date", "2024-01-05"), ("pnl", "$150.00"), ("Symbol", "AAPL")])),
            Ok(row(&[("Symbol", "MSFT"), ("pnl", "10")])),
            Err("invalid UTF-8".to_string()),
            Ok(row(&[("Date", "2024-01-03"), ("pnl", "-$50.00"), ("Symbol", "MSFT")])),
        ];
        let result = normalize_batch(rows);

        assert_eq!(result.accepted.len(), 2);
        assert_eq!(result.skipped(), 2);
        assert_eq!(result.rejected[0].reason, RejectReason::InvalidDate);
        assert_eq!(result.rejected[0].row_index, 1);
        assert_eq!(result.rejected[1].reason, RejectReason::ProcessingError);
        assert_eq!(result.rejected[1].row_index, 2);
    }

    #[test]
    fn batch_of_only_bad_rows_accepts_nothing() {
        let rows = vec![Ok(row(&[("foo", "bar")])), Ok(row(&[]))];
        let result = normalize_batch(rows);
        assert!(result.accepted.is_empty());
        assert_eq!(result.skipped(), 2);
    }
}
