//! Business metric calculators.
//!
//! Every calculator is a pure function over a slice of delivered order lines
//! (plus a lookup table for the join-based ones). Empty input gives `None`
//! for scalar metrics and an empty vector for series; revenue is the one
//! exception and sums to `0.0`.

pub mod delivery;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::data::OrderLine;

pub use delivery::{
    BucketScore, DeliveryBucket, SatisfactionPoint, average_review_score, bucket_mean_scores,
    delivery_satisfaction,
};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Revenue of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub revenue: f64,
}

/// Growth of one month against the previous month that had revenue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyGrowth {
    pub year: i32,
    pub month: u32,
    /// `None` for the first month, or when the prior month's revenue was 0.
    pub pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRevenue {
    pub state: String,
    pub revenue: f64,
}

// ---------------------------------------------------------------------------
// Scalar KPIs
// ---------------------------------------------------------------------------

/// Sum of unit prices. `0.0` for no lines.
pub fn revenue(records: &[OrderLine]) -> f64 {
    records.iter().map(|line| line.price).sum()
}

/// Number of distinct orders.
pub fn order_count(records: &[OrderLine]) -> usize {
    records
        .iter()
        .map(|line| line.order_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Revenue per order, `None` without orders.
pub fn average_order_value(records: &[OrderLine]) -> Option<f64> {
    let orders = order_count(records);
    (orders > 0).then(|| revenue(records) / orders as f64)
}

/// Mean purchase-to-delivery time over lines that were delivered with a
/// known date.
pub fn average_delivery_days(records: &[OrderLine]) -> Option<f64> {
    let days: Vec<i64> = records.iter().filter_map(OrderLine::delivery_days).collect();
    if days.is_empty() {
        None
    } else {
        Some(days.iter().sum::<i64>() as f64 / days.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// Monthly series
// ---------------------------------------------------------------------------

/// Revenue per month present in the data, oldest first. Lines without a
/// derived date are left out.
pub fn monthly_revenue(records: &[OrderLine]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for line in records {
        if let (Some(year), Some(month)) = (line.year(), line.month()) {
            *months.entry((year, month)).or_default() += line.price;
        }
    }

    months
        .into_iter()
        .map(|((year, month), revenue)| MonthlyRevenue {
            year,
            month,
            revenue,
        })
        .collect()
}

/// Percentage change between consecutive months that have revenue.
///
/// Months with no sales are skipped rather than treated as zero, so the
/// comparison is always against the previous month present.
pub fn mom_growth(records: &[OrderLine]) -> Vec<MonthlyGrowth> {
    let monthly = monthly_revenue(records);

    monthly
        .iter()
        .enumerate()
        .map(|(i, current)| {
            let pct = i
                .checked_sub(1)
                .map(|prev| monthly[prev].revenue)
                .filter(|&prev| prev != 0.0)
                .map(|prev| (current.revenue - prev) / prev * 100.0);
            MonthlyGrowth {
                year: current.year,
                month: current.month,
                pct,
            }
        })
        .collect()
}

/// Mean of the defined month-over-month deltas.
///
/// Returns `0.0` when no delta is defined (no data, or a single month).
/// This is a display convention for the headline KPI, not a measured zero.
pub fn average_monthly_growth(growth: &[MonthlyGrowth]) -> f64 {
    let deltas: Vec<f64> = growth.iter().filter_map(|g| g.pct).collect();
    if deltas.is_empty() {
        0.0
    } else {
        deltas.iter().sum::<f64>() / deltas.len() as f64
    }
}

// ---------------------------------------------------------------------------
// Breakdowns
// ---------------------------------------------------------------------------

/// Revenue per product category, highest first, ties by category name.
/// Lines whose product has no category are left out.
pub fn category_revenue(
    records: &[OrderLine],
    product_categories: &HashMap<String, String>,
) -> Vec<CategoryRevenue> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for line in records {
        if let Some(category) = product_categories.get(&line.product_id) {
            *totals.entry(category.as_str()).or_default() += line.price;
        }
    }

    let mut out: Vec<CategoryRevenue> = totals
        .into_iter()
        .map(|(category, revenue)| CategoryRevenue {
            category: category.to_string(),
            revenue,
        })
        .collect();
    out.sort_by(|a, b| by_revenue_desc(a.revenue, b.revenue).then_with(|| a.category.cmp(&b.category)));
    out
}

/// Revenue per customer state (order → customer → state), highest first,
/// ties by state code. Unresolvable lines are left out.
pub fn state_revenue(
    records: &[OrderLine],
    order_customers: &HashMap<String, String>,
    customer_states: &HashMap<String, String>,
) -> Vec<StateRevenue> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for line in records {
        let state = order_customers
            .get(&line.order_id)
            .and_then(|customer| customer_states.get(customer));
        if let Some(state) = state {
            *totals.entry(state.as_str()).or_default() += line.price;
        }
    }

    let mut out: Vec<StateRevenue> = totals
        .into_iter()
        .map(|(state, revenue)| StateRevenue {
            state: state.to_string(),
            revenue,
        })
        .collect();
    out.sort_by(|a, b| by_revenue_desc(a.revenue, b.revenue).then_with(|| a.state.cmp(&b.state)));
    out
}

fn by_revenue_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
