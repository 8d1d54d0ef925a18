//! CSV import/export adapter.
//!
//! Reading turns header-keyed CSV text into [`Row`]s for the normalizer;
//! writing produces the fixed export layout.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::error::JournalError;
use crate::domain::normalizer::Row;
use crate::domain::trade::Trade;

pub const EXPORT_HEADERS: [&str; 9] = [
    "Date",
    "Symbol",
    "Side",
    "Quantity",
    "Entry",
    "Exit",
    "P&L",
    "Risk:Reward",
    "Notes",
];

/// Read CSV with a header row into rows keyed by header name.
///
/// Records that cannot be decoded are returned as `Err(detail)` so the caller
/// can skip them; a missing header, an I/O failure or a file without data rows
/// fails the whole read. Short records simply lack the trailing columns. When a
/// header repeats, the first column with that name wins.
pub fn read_rows<R: io::Read>(reader: R) -> Result<Vec<Result<Row, String>>, JournalError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| JournalError::FileRead {
            reason: format!("invalid header row: {}", e),
        })?
        .clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(JournalError::FileRead {
            reason: "missing header row".into(),
        });
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        match result {
            Ok(record) => {
                let mut row = Row::with_capacity(headers.len());
                for (header, value) in headers.iter().zip(record.iter()) {
                    row.entry(header.to_string())
                        .or_insert_with(|| value.to_string());
                }
                rows.push(Ok(row));
            }
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(JournalError::FileRead {
                    reason: format!("CSV read error: {}", e),
                });
            }
            Err(e) => rows.push(Err(e.to_string())),
        }
    }

    if rows.is_empty() {
        return Err(JournalError::FileRead {
            reason: "no data found in CSV file".into(),
        });
    }
    Ok(rows)
}

/// `tradezilla_export_<YYYY-MM-DD>.csv` for the given export date.
pub fn export_filename(date: NaiveDate) -> String {
    format!("tradezilla_export_{}.csv", date.format("%Y-%m-%d"))
}

fn fixed(value: f64, decimals: usize) -> String {
    // JS toFixed never prints negative zero
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.*}", decimals, value)
}

fn fixed_or_blank(value: f64, decimals: usize) -> String {
    if value == 0.0 || value.is_nan() {
        String::new()
    } else {
        fixed(value, decimals)
    }
}

fn export_record(trade: &Trade) -> [String; 9] {
    [
        trade.date.format("%Y-%m-%d").to_string(),
        trade.symbol.clone(),
        trade.side.clone(),
        fixed(trade.quantity, 2),
        fixed_or_blank(trade.entry, 5),
        fixed_or_blank(trade.exit, 5),
        fixed(trade.pnl, 2),
        fixed_or_blank(trade.risk_reward, 2),
        trade.notes.clone(),
    ]
}

/// Write trades in export layout. Fields are quoted only when they contain a
/// comma, quote or line break.
pub fn write_trades<W: io::Write, T: AsRef<Trade>>(
    trades: &[T],
    writer: W,
) -> Result<(), JournalError> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    let to_io = |e: csv::Error| JournalError::Io(io::Error::other(e));

    wtr.write_record(EXPORT_HEADERS).map_err(to_io)?;
    for trade in trades {
        wtr.write_record(export_record(trade.as_ref())).map_err(to_io)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_to_string<T: AsRef<Trade>>(trades: &[T]) -> Result<String, JournalError> {
    let mut buf = Vec::new();
    write_trades(trades, &mut buf)?;
    String::from_utf8(buf).map_err(|e| JournalError::Io(io::Error::other(e)))
}

/// Write the export file into `directory`, returning its path.
pub fn write_export_file<T: AsRef<Trade>>(
    trades: &[T],
    directory: &Path,
    export_date: NaiveDate,
) -> Result<PathBuf, JournalError> {
    if trades.is_empty() {
        return Err(JournalError::ExportUnavailable);
    }
    fs::create_dir_all(directory)?;
    let path = directory.join(export_filename(export_date));
    let file = fs::File::create(&path)?;
    write_trades(trades, io::BufWriter::new(file))?;
    Ok(path)
}
