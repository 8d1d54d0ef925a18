//! CLI definition and dispatch.
//!
//! The command line stands in for the journal's presentation layer: it turns
//! user actions into [`journal::Command`]s and prints the resulting dashboard.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_storage_adapter::{DEFAULT_FILE_NAME, JsonStorageAdapter};
use crate::adapters::memory_storage_adapter::MemoryStorageAdapter;
use crate::domain::config_validation::validate_journal_config;
use crate::domain::dates::parse_trade_date;
use crate::domain::display::{
    format_change_percent, format_currency, format_optional, format_profit_factor,
};
use crate::domain::error::JournalError;
use crate::domain::metrics::{ChartMode, Dashboard, DashboardOptions, TOP_SYMBOLS, WEEKDAY_NAMES};
use crate::domain::trade::{LONG, SHORT, StoredTrade, TradeDraft, TradeId};
use crate::journal::{self, Journal, Notice, Outcome};
use crate::ports::config_port::ConfigPort;
use crate::ports::storage_port::StoragePort;

#[derive(Parser, Debug)]
#[command(name = "tradezilla", about = "Trade journal: import, track and analyse closed trades")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import trades from a broker or exchange CSV export
    Import { file: PathBuf },
    /// Show statistics for a CSV export without saving it
    Preview {
        file: PathBuf,
        #[arg(long)]
        mode: Option<ChartMode>,
    },
    /// Record a trade by hand
    Add {
        /// Trade date (defaults to today)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        symbol: String,
        #[arg(long, value_enum)]
        side: SideArg,
        #[arg(long)]
        quantity: f64,
        #[arg(long)]
        entry: f64,
        #[arg(long)]
        exit: f64,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Delete one trade by id (see `list`)
    Delete {
        id: u64,
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every trade
    Clear {
        #[arg(short, long)]
        yes: bool,
    },
    /// Export all trades to CSV
    Export {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Print KPIs, the P&L series and breakdowns
    Summary {
        #[arg(long)]
        mode: Option<ChartMode>,
    },
    /// Print the trade log
    List,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideArg {
    Long,
    Short,
}

impl SideArg {
    fn label(self) -> &'static str {
        match self {
            SideArg::Long => LONG,
            SideArg::Short => SHORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalSettings {
    pub storage_path: PathBuf,
    pub export_dir: PathBuf,
    pub dashboard: DashboardOptions,
    pub log_level: String,
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match cli.config.as_ref() {
        Some(path) => match load_config(path) {
            Ok(c) => c,
            Err(code) => return code,
        },
        None => FileConfigAdapter::empty(),
    };

    let settings = match build_settings(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    init_logging(&settings.log_level);

    match cli.command {
        Command::Import { file } => run_import(&settings, &file),
        Command::Preview { file, mode } => run_preview(&settings, &file, mode),
        Command::Add {
            date,
            symbol,
            side,
            quantity,
            entry,
            exit,
            notes,
        } => {
            let draft =
                match build_draft(date.as_deref(), symbol, side, quantity, entry, exit, notes) {
                    Ok(d) => d,
                    Err(e) => return fail(&e),
                };
            let mut journal = open_journal(&settings);
            execute_and_report(&mut journal, journal::Command::AddTrade(draft))
        }
        Command::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete trade {id}?")) {
                eprintln!("Cancelled");
                return ExitCode::SUCCESS;
            }
            let mut journal = open_journal(&settings);
            execute_and_report(&mut journal, journal::Command::DeleteTrade(TradeId(id)))
        }
        Command::Clear { yes } => {
            if !yes && !confirm("Delete all trades? This cannot be undone.") {
                eprintln!("Cancelled");
                return ExitCode::SUCCESS;
            }
            let mut journal = open_journal(&settings);
            execute_and_report(&mut journal, journal::Command::ClearAll)
        }
        Command::Export { dir } => {
            let mut journal = open_journal(&settings);
            let command = journal::Command::ExportCsv {
                directory: dir.unwrap_or_else(|| settings.export_dir.clone()),
                export_date: Local::now().date_naive(),
            };
            execute_and_report(&mut journal, command)
        }
        Command::Summary { mode } => {
            let mut options = settings.dashboard;
            if let Some(mode) = mode {
                options.chart_mode = mode;
            }
            let journal = Journal::open(
                JsonStorageAdapter::new(settings.storage_path.clone()),
                options,
            );
            print_dashboard(&journal.dashboard());
            ExitCode::SUCCESS
        }
        Command::List => {
            let journal = open_journal(&settings);
            print_trades(journal.trades());
            ExitCode::SUCCESS
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = JournalError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_settings(config: &dyn ConfigPort) -> Result<JournalSettings, JournalError> {
    validate_journal_config(config)?;

    let chart_mode = match config.get_string("dashboard", "chart_mode") {
        Some(raw) => raw.parse::<ChartMode>().map_err(|reason| JournalError::ConfigInvalid {
            section: "dashboard".into(),
            key: "chart_mode".into(),
            reason,
        })?,
        None => ChartMode::default(),
    };
    let top_symbols = config.get_int("dashboard", "top_symbols", TOP_SYMBOLS as i64);

    Ok(JournalSettings {
        storage_path: config
            .get_string("storage", "path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME)),
        export_dir: config
            .get_string("export", "directory")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        dashboard: DashboardOptions {
            chart_mode,
            top_symbols: usize::try_from(top_symbols).unwrap_or(TOP_SYMBOLS),
        },
        log_level: config
            .get_string("logging", "level")
            .map(|l| l.trim().to_lowercase())
            .unwrap_or_else(|| "info".to_string()),
    })
}

/// Install the stderr subscriber. `RUST_LOG` overrides the configured level.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

pub fn build_draft(
    date: Option<&str>,
    symbol: String,
    side: SideArg,
    quantity: f64,
    entry: f64,
    exit: f64,
    notes: String,
) -> Result<TradeDraft, JournalError> {
    let date = match date {
        Some(raw) => parse_trade_date(raw).ok_or_else(|| JournalError::InvalidTrade {
            reason: format!("invalid date '{raw}'"),
        })?,
        None => Local::now().date_naive().and_time(chrono::NaiveTime::MIN),
    };

    Ok(TradeDraft {
        date,
        symbol,
        side: side.label().to_string(),
        quantity,
        entry,
        exit,
        notes,
    })
}

fn open_journal(settings: &JournalSettings) -> Journal<JsonStorageAdapter> {
    Journal::open(
        JsonStorageAdapter::new(settings.storage_path.clone()),
        settings.dashboard,
    )
}

fn fail(err: &JournalError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn confirm(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn read_csv_file(path: &Path) -> Result<Vec<u8>, JournalError> {
    fs::read(path).map_err(|e| JournalError::FileRead {
        reason: format!("failed to read {}: {}", path.display(), e),
    })
}

fn run_import(settings: &JournalSettings, file: &Path) -> ExitCode {
    eprintln!("Importing {}", file.display());
    let data = match read_csv_file(file) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let mut journal = open_journal(settings);
    execute_and_report(&mut journal, journal::Command::ImportCsv { data })
}

fn run_preview(settings: &JournalSettings, file: &Path, mode: Option<ChartMode>) -> ExitCode {
    let data = match read_csv_file(file) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let mut options = settings.dashboard;
    if let Some(mode) = mode {
        options.chart_mode = mode;
    }
    let mut journal = Journal::open(MemoryStorageAdapter::new(), options);
    execute_and_report(&mut journal, journal::Command::ImportCsv { data })
}

pub fn execute_and_report<S: StoragePort>(
    journal: &mut Journal<S>,
    command: journal::Command,
) -> ExitCode {
    match journal.execute(command) {
        Ok(outcome) => {
            print_outcome(&outcome);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn print_outcome(outcome: &Outcome) {
    match &outcome.notice {
        Notice::Imported {
            accepted, skipped, ..
        } => {
            eprintln!("Successfully imported {accepted} trades!");
            if *skipped > 0 {
                eprintln!("{skipped} rows were skipped.");
            }
        }
        Notice::Added { id } => eprintln!("Added trade {id}"),
        Notice::Deleted { id } => eprintln!("Deleted trade {id}"),
        Notice::Cleared => eprintln!("All trades deleted"),
        Notice::Exported { path, trades } => {
            eprintln!("Exported {trades} trades");
            println!("{}", path.display());
            return;
        }
    }

    if let Some(change) = outcome.change {
        if !change.export_available {
            eprintln!("No trades left; nothing to export.");
        }
    }
    print_dashboard(&outcome.dashboard);
}

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let data = match dashboard.data() {
        Some(d) => d,
        None => {
            return "No trades yet. Import a CSV file or add trades manually to get started.\n"
                .to_string();
        }
    };
    let s = &data.summary;
    let mut out = String::new();

    out.push_str(&format!(
        "Total P&L:        {} ({})\n",
        format_currency(s.total_pnl).formatted,
        format_change_percent(s.pnl_change_percent)
    ));
    out.push_str(&format!(
        "Win Rate:         {:.1}% ({} W / {} L)\n",
        s.win_rate, s.win_count, s.loss_count
    ));
    out.push_str(&format!(
        "Profit Factor:    {}\n",
        format_profit_factor(s.profit_factor)
    ));
    out.push_str(&format!(
        "Total Trades:     {} (Avg: {})\n",
        s.total_trades,
        format_currency(s.avg_trade).formatted
    ));

    let label = match data.chart_mode {
        ChartMode::Cumulative => "Cumulative P&L",
        ChartMode::Daily => "Daily P&L",
    };
    out.push_str(&format!("\n=== {label} ===\n"));
    for point in &data.series {
        out.push_str(&format!(
            "  {}  {}\n",
            point.date.format("%Y-%m-%d"),
            format_currency(point.value).formatted
        ));
    }

    out.push_str("\n=== Top Symbols ===\n");
    for sym in &data.symbols {
        out.push_str(&format!(
            "  {:<12} {}\n",
            sym.symbol,
            format_currency(sym.net_pnl).formatted
        ));
    }

    out.push_str("\n=== P&L by Day ===\n");
    for (name, pnl) in WEEKDAY_NAMES.iter().zip(data.weekdays.iter()) {
        out.push_str(&format!("  {:<10} {}\n", name, format_currency(*pnl).formatted));
    }
    out
}

fn print_dashboard(dashboard: &Dashboard) {
    print!("{}", render_dashboard(dashboard));
}

pub fn render_trade_row(stored: &StoredTrade) -> String {
    let t = &stored.trade;
    format!(
        "{:>5}  {}  {:<10} {:<6} {:>10.2} {:>12} {:>12} {:>12} {:>6}  {}",
        stored.id,
        t.date.format("%Y-%m-%d"),
        t.symbol,
        t.side,
        t.quantity,
        format_optional(t.entry, "$"),
        format_optional(t.exit, "$"),
        format_currency(t.pnl).formatted,
        format_optional(t.risk_reward, ""),
        if t.notes.is_empty() { "-" } else { t.notes.as_str() },
    )
}

fn print_trades(trades: &[StoredTrade]) {
    if trades.is_empty() {
        eprintln!("No trades recorded");
        return;
    }
    println!(
        "{:>5}  {:<10}  {:<10} {:<6} {:>10} {:>12} {:>12} {:>12} {:>6}  Notes",
        "Id", "Date", "Symbol", "Side", "Qty", "Entry", "Exit", "P&L", "R:R"
    );
    for stored in trades {
        println!("{}", render_trade_row(stored));
    }
    eprintln!("{} trades", trades.len());
}
