#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use tradezilla::adapters::json_storage_adapter::JsonStorageAdapter;
use tradezilla::adapters::memory_storage_adapter::MemoryStorageAdapter;
use tradezilla::domain::error::JournalError;
use tradezilla::domain::metrics::DashboardOptions;
use tradezilla::domain::normalizer::Row;
use tradezilla::domain::trade::{LONG, Trade, TradeDraft};
use tradezilla::journal::{Command, Journal, Outcome};
use tradezilla::ports::storage_port::StoragePort;

pub fn datetime(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn make_trade(symbol: &str, date: &str, pnl: f64) -> Trade {
    Trade {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        symbol: symbol.to_string(),
        side: LONG.to_string(),
        quantity: 1.0,
        entry: 0.0,
        exit: 0.0,
        pnl,
        risk_reward: 0.0,
        notes: String::new(),
    }
}

pub fn make_draft(symbol: &str, date: &str, side: &str, entry: f64, exit: f64) -> TradeDraft {
    TradeDraft {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        symbol: symbol.to_string(),
        side: side.to_string(),
        quantity: 10.0,
        entry,
        exit,
        notes: String::new(),
    }
}

pub fn memory_journal() -> Journal<MemoryStorageAdapter> {
    Journal::open(MemoryStorageAdapter::new(), DashboardOptions::default())
}

pub fn json_journal(path: PathBuf) -> Journal<JsonStorageAdapter> {
    Journal::open(JsonStorageAdapter::new(path), DashboardOptions::default())
}

pub fn import_csv<S: StoragePort>(
    journal: &mut Journal<S>,
    csv: &str,
) -> Result<Outcome, JournalError> {
    journal.execute(Command::ImportCsv {
        data: csv.as_bytes().to_vec(),
    })
}
