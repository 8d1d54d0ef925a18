//! Text formatting for KPI values and the trade list.

use crate::domain::metrics::ProfitFactor;

const TONE_THRESHOLD: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Gain,
    Loss,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyDisplay {
    pub formatted: String,
    pub tone: Tone,
}

/// US-dollar rendering: `$1,234.56`, `-$50.00`, `--` for NaN.
pub fn format_currency(value: f64) -> CurrencyDisplay {
    if value.is_nan() {
        return CurrencyDisplay {
            formatted: "--".into(),
            tone: Tone::Neutral,
        };
    }

    let tone = if value > TONE_THRESHOLD {
        Tone::Gain
    } else if value < -TONE_THRESHOLD {
        Tone::Loss
    } else {
        Tone::Neutral
    };

    let sign = if value < 0.0 { "-" } else { "" };
    let body = if value.is_infinite() {
        "∞".to_string()
    } else {
        group_thousands(&format!("{:.2}", value.abs()))
    };

    CurrencyDisplay {
        formatted: format!("{sign}${body}"),
        tone,
    }
}

fn group_thousands(fixed: &str) -> String {
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed, ""));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if frac_part.is_empty() {
        grouped
    } else {
        format!("{grouped}.{frac_part}")
    }
}

pub fn format_profit_factor(pf: ProfitFactor) -> String {
    match pf {
        ProfitFactor::Infinite => "∞".to_string(),
        ProfitFactor::Finite(v) => format!("{:.2}", v),
    }
}

/// One decimal, with an explicit `+` on positive values.
pub fn format_change_percent(value: f64) -> String {
    let rounded = format!("{:.1}", value);
    if value > 0.0 {
        format!("+{rounded}%")
    } else {
        format!("{rounded}%")
    }
}

/// Price or ratio cell in the trade list; zero means "not recorded".
pub fn format_optional(value: f64, prefix: &str) -> String {
    if value == 0.0 || value.is_nan() {
        "--".to_string()
    } else {
        format!("{prefix}{:.2}", value)
    }
}
