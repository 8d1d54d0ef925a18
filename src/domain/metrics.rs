//! Performance statistics over the trade collection.
//!
//! Everything here is a pure function of the trades passed in, which must
//! already be in chronological order (as the store keeps them).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::domain::trade::Trade;

/// Number of symbols shown in the performance ranking by default.
pub const TOP_SYMBOLS: usize = 5;

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Gross wins over gross losses; infinite when there are wins but no losses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfitFactor {
    Finite(f64),
    Infinite,
}

impl ProfitFactor {
    fn from_totals(total_wins: f64, total_losses: f64) -> Self {
        if total_losses > 0.0 {
            ProfitFactor::Finite(total_wins / total_losses)
        } else if total_wins > 0.0 {
            ProfitFactor::Infinite
        } else {
            ProfitFactor::Finite(0.0)
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            ProfitFactor::Finite(v) => *v,
            ProfitFactor::Infinite => f64::INFINITY,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, ProfitFactor::Infinite)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_pnl: f64,
    pub total_trades: usize,
    pub win_count: usize,
    pub loss_count: usize,
    pub breakeven_count: usize,
    pub total_wins: f64,
    pub total_losses: f64,
    /// Percentage of decided trades (wins + losses) that won.
    pub win_rate: f64,
    pub profit_factor: ProfitFactor,
    pub avg_trade: f64,
    /// Total P&L as a percentage of the first trade's absolute P&L.
    pub pnl_change_percent: f64,
}

impl Summary {
    pub fn compute<T: AsRef<Trade>>(trades: &[T]) -> Self {
        let mut total_pnl = 0.0_f64;
        let mut win_count = 0usize;
        let mut loss_count = 0usize;
        let mut breakeven_count = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;

        for trade in trades {
            let pnl = trade.as_ref().pnl;
            total_pnl += pnl;
            if pnl > 0.0 {
                win_count += 1;
                total_wins += pnl;
            } else if pnl < 0.0 {
                loss_count += 1;
                total_losses += pnl.abs();
            } else {
                breakeven_count += 1;
            }
        }

        let total_trades = trades.len();
        let decided = win_count + loss_count;
        let win_rate = if decided > 0 {
            win_count as f64 / decided as f64 * 100.0
        } else {
            0.0
        };

        let avg_trade = if total_trades > 0 {
            total_pnl / total_trades as f64
        } else {
            0.0
        };

        let pnl_change_percent = match trades.first().map(|t| t.as_ref().pnl) {
            Some(first) if first != 0.0 => total_pnl / first.abs() * 100.0,
            _ => 0.0,
        };

        Summary {
            total_pnl,
            total_trades,
            win_count,
            loss_count,
            breakeven_count,
            total_wins,
            total_losses,
            win_rate,
            profit_factor: ProfitFactor::from_totals(total_wins, total_losses),
            avg_trade,
            pnl_change_percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMode {
    #[default]
    Cumulative,
    /// One point per trade, not per calendar day.
    Daily,
}

impl FromStr for ChartMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cumulative" => Ok(ChartMode::Cumulative),
            "daily" => Ok(ChartMode::Daily),
            other => Err(format!("unknown chart mode '{other}' (expected cumulative or daily)")),
        }
    }
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartMode::Cumulative => write!(f, "cumulative"),
            ChartMode::Daily => write!(f, "daily"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDateTime,
    pub value: f64,
}

pub fn pnl_series<T: AsRef<Trade>>(trades: &[T], mode: ChartMode) -> Vec<SeriesPoint> {
    let mut running = 0.0_f64;
    trades
        .iter()
        .map(|t| {
            let trade = t.as_ref();
            let value = match mode {
                ChartMode::Cumulative => {
                    running += trade.pnl;
                    running
                }
                ChartMode::Daily => trade.pnl,
            };
            SeriesPoint {
                date: trade.date,
                value,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolPnl {
    pub symbol: String,
    pub net_pnl: f64,
}

/// Net P&L per symbol, largest absolute values first, at most `limit` entries.
/// Ties keep the order in which symbols first appear.
pub fn symbol_breakdown<T: AsRef<Trade>>(trades: &[T], limit: usize) -> Vec<SymbolPnl> {
    let mut totals: Vec<SymbolPnl> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for t in trades {
        let trade = t.as_ref();
        match index.get(trade.symbol.as_str()) {
            Some(&i) => totals[i].net_pnl += trade.pnl,
            None => {
                index.insert(trade.symbol.as_str(), totals.len());
                totals.push(SymbolPnl {
                    symbol: trade.symbol.clone(),
                    net_pnl: trade.pnl,
                });
            }
        }
    }

    totals.sort_by(|a, b| b.net_pnl.abs().total_cmp(&a.net_pnl.abs()));
    totals.truncate(limit);
    totals
}

/// P&L summed by weekday of the trade date, Sunday first.
pub fn weekday_breakdown<T: AsRef<Trade>>(trades: &[T]) -> [f64; 7] {
    let mut days = [0.0_f64; 7];
    for t in trades {
        let trade = t.as_ref();
        days[trade.weekday_index()] += trade.pnl;
    }
    days
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    pub chart_mode: ChartMode,
    pub top_symbols: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            chart_mode: ChartMode::Cumulative,
            top_symbols: TOP_SYMBOLS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub summary: Summary,
    pub chart_mode: ChartMode,
    pub series: Vec<SeriesPoint>,
    pub symbols: Vec<SymbolPnl>,
    pub weekdays: [f64; 7],
}

/// Everything the presentation layer renders, recomputed after each mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Dashboard {
    /// No trades: the reset state, distinct from zeroed metrics.
    Empty,
    Populated(Box<DashboardData>),
}

impl Dashboard {
    pub fn compute<T: AsRef<Trade>>(trades: &[T], options: DashboardOptions) -> Self {
        if trades.is_empty() {
            return Dashboard::Empty;
        }
        Dashboard::Populated(Box::new(DashboardData {
            summary: Summary::compute(trades),
            chart_mode: options.chart_mode,
            series: pnl_series(trades, options.chart_mode),
            symbols: symbol_breakdown(trades, options.top_symbols),
            weekdays: weekday_breakdown(trades),
        }))
    }

    pub fn data(&self) -> Option<&DashboardData> {
        match self {
            Dashboard::Empty => None,
            Dashboard::Populated(data) => Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_trade(symbol: &str, day: u32, pnl: f64) -> Trade {
        Trade {
            date: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            symbol: symbol.to_string(),
            side: "Long".to_string(),
            quantity: 1.0,
            entry: 0.0,
            exit: 0.0,
            pnl,
            risk_reward: 0.0,
            notes: String::new(),
        }
    }

    fn pnls(values: &[f64]) -> Vec<Trade> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| make_trade("X", i as u32 + 1, v))
            .collect()
    }

    #[test]
    fn summary_empty() {
        let trades: Vec<Trade> = Vec::new();
        let summary = Summary::compute(&trades);
        assert_eq!(summary.total_trades, 0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.avg_trade, 0.0);
        assert_eq!(summary.profit_factor, ProfitFactor::Finite(0.0));
        assert_eq!(summary.pnl_change_percent, 0.0);
    }

    #[test]
    fn summary_win_rate_ignores_breakeven() {
        let summary = Summary::compute(&pnls(&[10.0, 20.0, 30.0, -5.0, -5.0, 0.0]));
        assert_eq!(summary.win_count, 3);
        assert_eq!(summary.loss_count, 2);
        assert_eq!(summary.breakeven_count, 1);
        assert_relative_eq!(summary.win_rate, 60.0);
    }

    #[test]
    fn profit_factor_ratio() {
        let summary = Summary::compute(&pnls(&[100.0, 200.0, -60.0, -40.0]));
        assert_relative_eq!(summary.total_wins, 300.0);
        assert_relative_eq!(summary.total_losses, 100.0);
        assert_eq!(summary.profit_factor, ProfitFactor::Finite(3.0));
    }

    #[test]
    fn profit_factor_infinite_without_losses() {
        let summary = Summary::compute(&pnls(&[20.0, 30.0]));
        assert!(summary.profit_factor.is_infinite());
        assert_eq!(summary.profit_factor.as_f64(), f64::INFINITY);
    }

    #[test]
    fn profit_factor_zero_without_wins_or_losses() {
        let summary = Summary::compute(&pnls(&[0.0, 0.0]));
        assert_eq!(summary.profit_factor, ProfitFactor::Finite(0.0));
        assert_eq!(summary.win_rate, 0.0);
    }

    #[test]
    fn totals_and_average() {
        let summary = Summary::compute(&pnls(&[150.0, -50.0]));
        assert_relative_eq!(summary.total_pnl, 100.0);
        assert_relative_eq!(summary.avg_trade, 50.0);
        assert_eq!(summary.total_trades, 2);
    }

    #[test]
    fn pnl_change_relative_to_first_trade() {
        let summary = Summary::compute(&pnls(&[-50.0, 150.0]));
        assert_relative_eq!(summary.pnl_change_percent, 200.0);

        let summary = Summary::compute(&pnls(&[0.0, 150.0]));
        assert_eq!(summary.pnl_change_percent, 0.0);
    }

    #[test]
    fn cumulative_series_runs_sum() {
        let series = pnl_series(&pnls(&[10.0, -5.0, 20.0]), ChartMode::Cumulative);
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, 5.0, 25.0]);
    }

    #[test]
    fn daily_series_is_per_trade() {
        let mut trades = pnls(&[10.0, -5.0]);
        trades.push(make_trade("X", 2, 7.0));
        let series = pnl_series(&trades, ChartMode::Daily);
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, -5.0, 7.0]);
        assert_eq!(series[1].date, series[2].date);
    }

    #[test]
    fn symbol_breakdown_ranks_by_absolute_pnl() {
        let trades = vec![
            make_trade("AAPL", 1, 50.0),
            make_trade("MSFT", 2, -200.0),
            make_trade("AAPL", 3, 25.0),
            make_trade("TSLA", 4, 100.0),
        ];
        let ranked = symbol_breakdown(&trades, TOP_SYMBOLS);
        let names: Vec<&str> = ranked.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(names, vec!["MSFT", "TSLA", "AAPL"]);
        assert_relative_eq!(ranked[2].net_pnl, 75.0);
    }

    #[test]
    fn symbol_breakdown_truncates_and_keeps_tie_order() {
        let trades = vec![
            make_trade("A", 1, 10.0),
            make_trade("B", 1, -10.0),
            make_trade("C", 1, 10.0),
            make_trade("D", 1, 30.0),
            make_trade("E", 1, 1.0),
            make_trade("F", 1, 2.0),
        ];
        let ranked = symbol_breakdown(&trades, 5);
        let names: Vec<&str> = ranked.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(names, vec!["D", "A", "B", "C", "F"]);
    }

    #[test]
    fn weekday_breakdown_sums_by_day() {
        // 2024-01-01 is a Monday, 2024-01-07 a Sunday
        let trades = vec![
            make_trade("X", 1, 10.0),
            make_trade("X", 8, 5.0),
            make_trade("X", 7, -3.0),
            make_trade("X", 5, 2.0),
        ];
        let days = weekday_breakdown(&trades);
        assert_eq!(days, [-3.0, 15.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
        assert_eq!(WEEKDAY_NAMES[1], "Monday");
    }

    #[test]
    fn chart_mode_parses() {
        assert_eq!("cumulative".parse::<ChartMode>(), Ok(ChartMode::Cumulative));
        assert_eq!(" Daily ".parse::<ChartMode>(), Ok(ChartMode::Daily));
        assert!("weekly".parse::<ChartMode>().is_err());
    }

    #[test]
    fn dashboard_empty_is_reset_state() {
        let trades: Vec<Trade> = Vec::new();
        let dashboard = Dashboard::compute(&trades, DashboardOptions::default());
        assert_eq!(dashboard, Dashboard::Empty);
        assert!(dashboard.data().is_none());
    }

    #[test]
    fn dashboard_bundles_everything() {
        let trades = pnls(&[150.0, -50.0]);
        let options = DashboardOptions {
            chart_mode: ChartMode::Daily,
            top_symbols: 1,
        };
        let dashboard = Dashboard::compute(&trades, options);
        let data = dashboard.data().unwrap();
        assert_eq!(data.summary.total_trades, 2);
        assert_eq!(data.chart_mode, ChartMode::Daily);
        assert_eq!(data.series.len(), 2);
        assert_eq!(data.symbols.len(), 1);
        assert_relative_eq!(data.weekdays.iter().sum::<f64>(), 100.0);
    }
}
