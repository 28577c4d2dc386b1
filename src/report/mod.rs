//! Dashboard report assembly.
//!
//! Filters the delivered lines to the selected period and to the same period
//! one year earlier, runs every calculator on both, and formats the results
//! into a [`DashboardReport`] that the terminal and web front ends render
//! as-is. Each call is a fresh pass over the dataset.

use std::time::Instant;

use serde::Serialize;

use crate::config::schema::DashboardConfig;
use crate::data::Dataset;
use crate::data::period::{self, MONTH_ABBRS, Period, filter_by_period, month_abbr};
use crate::format::{self, Direction, Ticks, Trend};
use crate::logging::EventLog;
use crate::metrics::{self, BucketScore, DeliveryBucket, MonthlyRevenue};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Presentation knobs that shape the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub top_categories: usize,
    pub tick_count: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for ReportOptions {
    fn from(cfg: &DashboardConfig) -> Self {
        Self {
            top_categories: cfg.top_categories,
            tick_count: cfg.tick_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// A headline number with its comparison against last year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: &'static str,
    pub value: Option<f64>,
    pub display: String,
    pub trend: Trend,
    pub trend_display: String,
}

impl Kpi {
    fn new(label: &'static str, value: Option<f64>, display: String, trend: Trend) -> Self {
        Self {
            label,
            value,
            display,
            trend_display: trend.display(),
            trend,
        }
    }
}

/// Average month-over-month growth inside the selected period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthKpi {
    pub label: &'static str,
    /// 0.0 when no month-over-month delta exists.
    pub value: f64,
    pub display: String,
    pub direction: Direction,
    pub favorable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_revenue: Kpi,
    pub avg_monthly_growth: GrowthKpi,
    pub avg_order_value: Kpi,
    pub total_orders: Kpi,
}

/// One labelled value of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

/// Monthly revenue for the period and its comparison, on a shared axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueTrend {
    pub current: Series,
    pub comparison: Series,
    pub ticks: Ticks,
}

/// Top categories by revenue, highest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryChart {
    pub bars: Vec<SeriesPoint>,
    pub ticks: Ticks,
}

/// Mean review score of one delivery bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatisfactionBar {
    pub bucket: DeliveryBucket,
    pub mean_score: Option<f64>,
    pub reviews: usize,
    pub display: String,
}

impl From<BucketScore> for SatisfactionBar {
    fn from(score: BucketScore) -> Self {
        Self {
            bucket: score.bucket,
            mean_score: score.mean_score,
            reviews: score.reviews,
            // Empty buckets render as a blank bar label.
            display: score.mean_score.map(|s| format!("{s:.2}")).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewCard {
    pub value: Option<f64>,
    pub display: String,
    pub stars: String,
}

/// Everything the dashboard shows for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub period: Period,
    pub period_label: String,
    pub comparison: Period,
    pub comparison_label: String,
    /// Whether the comparison period has any delivered lines.
    pub has_comparison: bool,
    pub kpis: Kpis,
    pub revenue_trend: RevenueTrend,
    pub top_categories: CategoryChart,
    /// Every state with sales, highest revenue first.
    pub state_revenue: Vec<SeriesPoint>,
    pub satisfaction: Vec<SatisfactionBar>,
    pub avg_delivery: Kpi,
    pub avg_review: ReviewCard,
    pub current_lines: usize,
    pub comparison_lines: usize,
}

/// Selector contents for the year/month controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodChoices {
    pub years: Vec<i32>,
    pub default_year: Option<i32>,
    pub months: Vec<&'static str>,
}

// ---------------------------------------------------------------------------
// Period selection
// ---------------------------------------------------------------------------

/// Years available in the delivered data plus the default selection.
pub fn period_choices(dataset: &Dataset, preferred_year: i32) -> PeriodChoices {
    let years = dataset.available_years();
    let default_year = period::default_year(&years, preferred_year);
    let mut months = vec![period::ALL_MONTHS];
    months.extend(MONTH_ABBRS);
    PeriodChoices {
        years,
        default_year,
        months,
    }
}

/// Resolve the period to report on. An explicit year is used as given, even
/// if it has no data; otherwise the default year applies. `None` only when
/// no year was given and the dataset has no dated delivered lines.
pub fn resolve_period(
    dataset: &Dataset,
    year: Option<i32>,
    month: Option<u32>,
    preferred_year: i32,
) -> Option<Period> {
    let year = match year {
        Some(year) => year,
        None => period::default_year(&dataset.available_years(), preferred_year)?,
    };
    Some(Period { year, month })
}

// ---------------------------------------------------------------------------
// Report building
// ---------------------------------------------------------------------------

/// Build the report for `period`, comparing against the same period a year
/// earlier.
pub fn build_report(dataset: &Dataset, period: Period, options: &ReportOptions) -> DashboardReport {
    let comparison = period.comparison();
    let current = filter_by_period(dataset.delivered(), period);
    let previous = filter_by_period(dataset.delivered(), comparison);
    let has_comparison = !previous.is_empty();
    let refs = dataset.references();

    // Comparison values only exist when last year has data.
    let prior = |value: Option<f64>| if has_comparison { value } else { None };

    // KPIs
    let revenue = metrics::revenue(&current);
    let total_revenue = Kpi::new(
        "Total Revenue",
        Some(revenue),
        format::fmt_compact(revenue),
        format::trend(Some(revenue), prior(Some(metrics::revenue(&previous))), false),
    );

    let growth = metrics::average_monthly_growth(&metrics::mom_growth(&current));
    let avg_monthly_growth = GrowthKpi {
        label: "Avg Monthly Growth",
        value: growth,
        display: format::format_signed_pct(growth),
        direction: if growth > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        },
        favorable: growth > 0.0,
    };

    let aov = metrics::average_order_value(&current);
    let avg_order_value = Kpi::new(
        "Avg Order Value",
        aov,
        format::fmt_compact_opt(aov),
        format::trend(aov, prior(metrics::average_order_value(&previous)), false),
    );

    let orders = metrics::order_count(&current);
    let total_orders = Kpi::new(
        "Total Orders",
        Some(orders as f64),
        format::format_count(orders),
        format::trend(
            Some(orders as f64),
            prior(Some(metrics::order_count(&previous) as f64)),
            false,
        ),
    );

    // Revenue trend
    let current_monthly = metrics::monthly_revenue(&current);
    let previous_monthly = if has_comparison {
        metrics::monthly_revenue(&previous)
    } else {
        Vec::new()
    };
    let trend_max = current_monthly
        .iter()
        .chain(&previous_monthly)
        .map(|m| m.revenue)
        .fold(0.0, f64::max);
    let revenue_trend = RevenueTrend {
        current: monthly_series(period.year, &current_monthly),
        comparison: monthly_series(comparison.year, &previous_monthly),
        ticks: format::make_ticks(trend_max, options.tick_count),
    };

    // Categories
    let bars: Vec<SeriesPoint> = metrics::category_revenue(&current, &refs.product_categories)
        .into_iter()
        .take(options.top_categories)
        .map(|c| point(c.category, c.revenue))
        .collect();
    let category_max = bars.first().map(|b| b.value).unwrap_or(0.0);
    let top_categories = CategoryChart {
        ticks: format::make_ticks(category_max, options.tick_count),
        bars,
    };

    // States
    let state_revenue =
        metrics::state_revenue(&current, &refs.order_customers, &refs.customer_states)
            .into_iter()
            .map(|s| point(s.state, s.revenue))
            .collect();

    // Delivery and reviews
    let points = metrics::delivery_satisfaction(&current, &refs.review_scores);
    let satisfaction = metrics::bucket_mean_scores(&points)
        .into_iter()
        .map(SatisfactionBar::from)
        .collect();

    let delivery_days = metrics::average_delivery_days(&current);
    let avg_delivery = Kpi::new(
        "Average Delivery Time",
        delivery_days,
        format::format_days(delivery_days),
        format::trend(
            delivery_days,
            prior(metrics::average_delivery_days(&previous)),
            true,
        ),
    );

    let review_score = metrics::average_review_score(&points);
    let avg_review = ReviewCard {
        value: review_score,
        display: format::format_score(review_score),
        stars: format::stars(review_score),
    };

    DashboardReport {
        period,
        period_label: period.label(),
        comparison,
        comparison_label: comparison.label(),
        has_comparison,
        kpis: Kpis {
            total_revenue,
            avg_monthly_growth,
            avg_order_value,
            total_orders,
        },
        revenue_trend,
        top_categories,
        state_revenue,
        satisfaction,
        avg_delivery,
        avg_review,
        current_lines: current.len(),
        comparison_lines: previous.len(),
    }
}

/// Build a report and record it in `events`.
pub fn build_report_logged(
    source: &str,
    dataset: &Dataset,
    period: Period,
    options: &ReportOptions,
    events: &EventLog,
) -> DashboardReport {
    let started = Instant::now();
    let report = build_report(dataset, period, options);
    events.log_report_built(
        source,
        period,
        report.current_lines,
        report.comparison_lines,
        started.elapsed().as_millis() as u64,
    );
    report
}

fn monthly_series(year: i32, monthly: &[MonthlyRevenue]) -> Series {
    Series {
        name: year.to_string(),
        points: monthly
            .iter()
            .map(|m| point(month_abbr(m.month).unwrap_or("?").to_string(), m.revenue))
            .collect(),
    }
}

fn point(label: String, value: f64) -> SeriesPoint {
    SeriesPoint {
        display: format::fmt_compact(value),
        label,
        value,
    }
}

// ---------------------------------------------------------------------------
// Flat export
// ---------------------------------------------------------------------------

/// Flatten the report into `(section, label, value)` rows for CSV output.
pub fn flatten(report: &DashboardReport) -> Vec<(String, String, String)> {
    let mut rows = Vec::new();
    let mut push = |section: &str, label: &str, value: String| {
        rows.push((section.to_string(), label.to_string(), value));
    };
    let opt = |v: Option<f64>| v.map(|v| format!("{v:.2}")).unwrap_or_default();

    let k = &report.kpis;
    push("kpi", k.total_revenue.label, opt(k.total_revenue.value));
    push("kpi", k.avg_monthly_growth.label, format!("{:.2}", k.avg_monthly_growth.value));
    push("kpi", k.avg_order_value.label, opt(k.avg_order_value.value));
    push("kpi", k.total_orders.label, opt(k.total_orders.value));
    push("kpi", report.avg_delivery.label, opt(report.avg_delivery.value));
    push("kpi", "Average Review Score", opt(report.avg_review.value));

    for p in &report.revenue_trend.current.points {
        push(&format!("revenue_{}", report.revenue_trend.current.name), &p.label, format!("{:.2}", p.value));
    }
    for p in &report.revenue_trend.comparison.points {
        push(&format!("revenue_{}", report.revenue_trend.comparison.name), &p.label, format!("{:.2}", p.value));
    }
    for b in &report.top_categories.bars {
        push("category", &b.label, format!("{:.2}", b.value));
    }
    for s in &report.state_revenue {
        push("state", &s.label, format!("{:.2}", s.value));
    }
    for s in &report.satisfaction {
        push("delivery_bucket", s.bucket.label(), opt(s.mean_score));
    }

    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
