//! Reporting periods and the period filter.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::data::OrderLine;

/// Abbreviated month labels, January first.
pub const MONTH_ABBRS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Label shown for the "whole year" month choice.
pub const ALL_MONTHS: &str = "All Months";

/// A calendar year, optionally narrowed to a single month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub year: i32,
    pub month: Option<u32>,
}

impl Period {
    pub fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }

    /// The same period one year earlier. The lowest representable year is
    /// its own comparison.
    pub fn comparison(&self) -> Self {
        Self {
            year: self.year.saturating_sub(1),
            month: self.month,
        }
    }

    /// Whether a line's derived calendar falls inside this period.
    pub fn contains(&self, line: &OrderLine) -> bool {
        if line.year() != Some(self.year) {
            return false;
        }
        match self.month {
            Some(month) => line.month() == Some(month),
            None => true,
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month.and_then(month_abbr) {
            Some(abbr) => write!(f, "{abbr} {}", self.year),
            None => write!(f, "{}", self.year),
        }
    }
}

/// Keep the lines whose derived year (and month, if given) match `period`.
///
/// Lines without a derived year never match. An empty result is a normal
/// "no data" outcome.
pub fn filter_by_period(records: &[OrderLine], period: Period) -> Vec<OrderLine> {
    records
        .iter()
        .filter(|line| period.contains(line))
        .cloned()
        .collect()
}

/// Abbreviated label for a month number (1–12).
pub fn month_abbr(month: u32) -> Option<&'static str> {
    MONTH_ABBRS.get(month.checked_sub(1)? as usize).copied()
}

/// Parse a month selector value.
///
/// Accepts `Jan`…`Dec` (any case) and `1`…`12`. `All Months`, `all` and the
/// empty string select the whole year. Anything else also falls back to the
/// whole year.
pub fn parse_month(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case(ALL_MONTHS) || raw.eq_ignore_ascii_case("all") {
        return None;
    }

    if let Ok(n) = raw.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }

    MONTH_ABBRS
        .iter()
        .position(|abbr| abbr.eq_ignore_ascii_case(raw))
        .map(|idx| idx as u32 + 1)
}

/// Distinct derived years, most recent first.
pub fn available_years(records: &[OrderLine]) -> Vec<i32> {
    let years: BTreeSet<i32> = records.iter().filter_map(OrderLine::year).collect();
    years.into_iter().rev().collect()
}

/// Preferred year when present, otherwise the most recent one.
pub fn default_year(years: &[i32], preferred: i32) -> Option<i32> {
    if years.contains(&preferred) {
        Some(preferred)
    } else {
        years.iter().copied().max()
    }
}
