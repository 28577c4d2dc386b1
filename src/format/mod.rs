//! Human-facing number formatting: compact currency, trend badges and
//! "nice" axis ticks.

use serde::Serialize;

/// Default number of ticks on a currency axis.
pub const DEFAULT_TICK_COUNT: usize = 5;

/// Placeholder shown wherever a value is undefined.
pub const NO_DATA: &str = "—";

// ---------------------------------------------------------------------------
// Compact currency
// ---------------------------------------------------------------------------

/// Format a dollar amount as `$2.3M`, `$1M`, `$45K` or `$7`.
///
/// Millions keep one decimal unless the mantissa is whole; thousands and
/// smaller amounts round to an integer. Negative amounts get a leading minus
/// (`-$45K`).
pub fn fmt_compact(v: f64) -> String {
    if !v.is_finite() {
        return NO_DATA.to_string();
    }

    let sign = if v < 0.0 { "-" } else { "" };
    let magnitude = v.abs();

    if magnitude >= 1_000_000.0 {
        let m = magnitude / 1_000_000.0;
        if m.fract() != 0.0 {
            format!("{sign}${m:.1}M")
        } else {
            format!("{sign}${m:.0}M")
        }
    } else if magnitude >= 1_000.0 {
        format!("{sign}${:.0}K", magnitude / 1_000.0)
    } else {
        let rounded = format!("{magnitude:.0}");
        // "-$0" reads oddly for tiny negatives.
        if rounded == "0" {
            "$0".to_string()
        } else {
            format!("{sign}${rounded}")
        }
    }
}

/// Compact currency for an optional value.
pub fn fmt_compact_opt(v: Option<f64>) -> String {
    v.map(fmt_compact).unwrap_or_else(|| NO_DATA.to_string())
}

// ---------------------------------------------------------------------------
// Trend badge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
        }
    }
}

/// Period-over-period change of a KPI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trend {
    /// No usable previous value.
    NoData,
    Change {
        direction: Direction,
        /// Unsigned percentage change.
        percent: f64,
        /// Whether the change is good news for this metric.
        favorable: bool,
    },
}

impl Trend {
    /// `"10.00%"`, or `"—"` without data.
    pub fn label(&self) -> String {
        match self {
            Self::NoData => NO_DATA.to_string(),
            Self::Change { percent, .. } => format!("{percent:.2}%"),
        }
    }

    /// `"↑ 10.00%"`, or `"—"` without data.
    pub fn display(&self) -> String {
        match self {
            Self::NoData => NO_DATA.to_string(),
            Self::Change { direction, .. } => format!("{} {}", direction.arrow(), self.label()),
        }
    }
}

/// Compare `current` against `previous`.
///
/// The change is `(current − previous) / |previous| × 100`. A missing or zero
/// previous value, or a missing current value, gives [`Trend::NoData`]. With
/// `lower_is_better` a decrease is favorable. A change of exactly zero
/// reads as `Down` and is never favorable.
pub fn trend(current: Option<f64>, previous: Option<f64>, lower_is_better: bool) -> Trend {
    let (Some(current), Some(previous)) = (current, previous) else {
        return Trend::NoData;
    };
    if !current.is_finite() || !previous.is_finite() || previous == 0.0 {
        return Trend::NoData;
    }

    let pct = (current - previous) / previous.abs() * 100.0;
    let favorable = if lower_is_better { pct < 0.0 } else { pct > 0.0 };
    let direction = if pct > 0.0 { Direction::Up } else { Direction::Down };

    Trend::Change {
        direction,
        percent: pct.abs(),
        favorable,
    }
}

// ---------------------------------------------------------------------------
// Axis ticks
// ---------------------------------------------------------------------------

/// Tick positions and their compact currency labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticks {
    pub values: Vec<f64>,
    pub labels: Vec<String>,
}

/// Compute `n` evenly spaced ticks from 0 whose step is a whole multiple of
/// a power of ten and whose top tick reaches `max`.
///
/// `max <= 0` gives a single tick at 0. `n` below 2 is treated as 2.
pub fn make_ticks(max: f64, n: usize) -> Ticks {
    if !max.is_finite() || max <= 0.0 {
        return Ticks {
            values: vec![0.0],
            labels: vec![fmt_compact(0.0)],
        };
    }

    let n = n.max(2);
    let raw_step = max / (n - 1) as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let step = (raw_step / magnitude).ceil() * magnitude;

    let values: Vec<f64> = (0..n).map(|i| i as f64 * step).collect();
    let labels = values.iter().copied().map(fmt_compact).collect();

    Ticks { values, labels }
}

// ---------------------------------------------------------------------------
// Small formatters
// ---------------------------------------------------------------------------

/// Format a count with comma separators: `1,234,567`.
pub fn format_count(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Signed percentage with two decimals: `+12.34%`, `-3.00%`.
pub fn format_signed_pct(v: f64) -> String {
    format!("{v:+.2}%")
}

/// `12.35 days`, or `—`.
pub fn format_days(v: Option<f64>) -> String {
    match v {
        Some(days) if days.is_finite() => format!("{days:.2} days"),
        _ => NO_DATA.to_string(),
    }
}

/// Review score with two decimals, or `—`.
pub fn format_score(v: Option<f64>) -> String {
    match v {
        Some(score) if score.is_finite() => format!("{score:.2}"),
        _ => NO_DATA.to_string(),
    }
}

/// Five-star rating rounded to the nearest whole star. Halves round to the
/// even star, so 2.5 shows two stars and 3.5 shows four.
pub fn stars(score: Option<f64>) -> String {
    let filled = score
        .filter(|s| s.is_finite())
        .map(|s| s.round_ties_even().clamp(0.0, 5.0) as usize)
        .unwrap_or(0);
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}
