/// End-to-end dashboard tests.
///
/// Loads a small export from disk, picks a period the way the selectors do,
/// and checks the numbers a user would see on the cards and charts.
use std::fs;
use std::path::Path;

use salesdash::config::schema::DataConfig;
use salesdash::data::loader::load_dataset;
use salesdash::data::period::{Period, filter_by_period, parse_month};
use salesdash::data::{Dataset, OrderLine, OrderStatus, References};
use salesdash::format::{self, Direction, Trend};
use salesdash::logging::EventLog;
use salesdash::metrics::{self, DeliveryBucket};
use salesdash::report::{self, ReportOptions};

fn write_export(dir: &Path) {
    fs::write(
        dir.join("order_items.csv"),
        "order_id,product_id,price\n\
         a,p1,100\n\
         b,p2,200\n\
         c,p1,300\n\
         d,p3,150\n\
         e,p1,250\n",
    )
    .unwrap();
    fs::write(
        dir.join("orders.csv"),
        "order_id,customer_id,order_status,order_purchase_timestamp,order_delivered_customer_date\n\
         a,c1,delivered,2023-01-05 08:00:00,2023-01-07 09:00:00\n\
         b,c2,delivered,2023-01-12 08:00:00,2023-01-17 08:00:00\n\
         c,c1,delivered,2023-01-30 08:00:00,2023-02-12 08:00:00\n\
         d,c3,delivered,2023-02-14 08:00:00,not a date\n\
         e,c2,delivered,2022-01-20 08:00:00,2022-01-22 08:00:00\n",
    )
    .unwrap();
    fs::write(
        dir.join("products.csv"),
        "product_id,product_category_name\np1,toys\np2,books\np3,garden\n",
    )
    .unwrap();
    fs::write(
        dir.join("customers.csv"),
        "customer_id,customer_state\nc1,SP\nc2,RJ\nc3,MG\n",
    )
    .unwrap();
    fs::write(
        dir.join("order_reviews.csv"),
        "order_id,review_score\na,5\nb,4\nc,2\nd,3\n",
    )
    .unwrap();
}

fn load() -> Dataset {
    let tmp = tempfile::tempdir().unwrap();
    write_export(tmp.path());
    let config = DataConfig {
        dir: tmp.path().to_path_buf(),
        ..DataConfig::default()
    };
    load_dataset(&config, &EventLog::disabled()).unwrap()
}

// ---------------------------------------------------------------------------
// Calculators over a loaded dataset
// ---------------------------------------------------------------------------

#[test]
fn january_to_february_growth() {
    let dataset = load();
    let year = filter_by_period(dataset.delivered(), Period::year(2023));

    let monthly = metrics::monthly_revenue(&year);
    let values: Vec<_> = monthly.iter().map(|m| (m.month, m.revenue)).collect();
    assert_eq!(values, vec![(1, 600.0), (2, 150.0)]);

    let growth = metrics::mom_growth(&year);
    assert_eq!(growth[0].pct, None);
    assert_eq!(growth[1].pct, Some(-75.0));
    assert_eq!(format::format_signed_pct(growth[1].pct.unwrap()), "-75.00%");
}

#[test]
fn filtering_twice_changes_nothing() {
    let dataset = load();
    let period = Period::month(2023, 1);
    let once = filter_by_period(dataset.delivered(), period);
    let twice = filter_by_period(&once, period);
    assert_eq!(once, twice);
    assert_eq!(once.len(), 3);
}

#[test]
fn order_value_is_revenue_over_orders() {
    let dataset = load();
    let year = filter_by_period(dataset.delivered(), Period::year(2023));
    let revenue = metrics::revenue(&year);
    let orders = metrics::order_count(&year);
    assert_eq!(revenue, 750.0);
    assert_eq!(orders, 4);
    assert_eq!(metrics::average_order_value(&year), Some(revenue / orders as f64));
    assert_eq!(metrics::average_order_value(&[]), None);
    assert_eq!(metrics::revenue(&[]), 0.0);
}

#[test]
fn category_ranking_is_descending() {
    let dataset = load();
    let year = filter_by_period(dataset.delivered(), Period::year(2023));
    let cats = metrics::category_revenue(&year, &dataset.references().product_categories);
    let labels: Vec<_> = cats.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(labels, vec!["toys", "books", "garden"]);
    assert!(cats.windows(2).all(|w| w[0].revenue >= w[1].revenue));
}

#[test]
fn unparsable_delivery_date_lands_in_unknown() {
    let dataset = load();
    let feb = filter_by_period(dataset.delivered(), Period::month(2023, 2));
    assert_eq!(feb.len(), 1);
    assert_eq!(feb[0].delivery_days(), None);
    assert_eq!(
        DeliveryBucket::from_days(feb[0].delivery_days()),
        DeliveryBucket::Unknown
    );
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[test]
fn default_selection_report() {
    let dataset = load();
    let period = report::resolve_period(&dataset, None, parse_month("All Months"), 2023).unwrap();
    assert_eq!(period, Period::year(2023));

    let r = report::build_report(&dataset, period, &ReportOptions::default());
    assert_eq!(r.period_label, "2023");
    assert!(r.has_comparison);

    // 750 vs 250 last year
    assert_eq!(r.kpis.total_revenue.display, "$750");
    assert_eq!(r.kpis.total_revenue.trend_display, "↑ 200.00%");
    assert_eq!(r.kpis.avg_monthly_growth.display, "-75.00%");
    assert_eq!(r.kpis.avg_monthly_growth.direction, Direction::Down);
    assert_eq!(r.kpis.total_orders.display, "4");

    // 2, 5, 13 days vs 2 days last year: slower is bad news
    assert_eq!(r.avg_delivery.display, "6.67 days");
    assert!(matches!(
        r.avg_delivery.trend,
        Trend::Change {
            direction: Direction::Up,
            favorable: false,
            ..
        }
    ));

    let means: Vec<_> = r.satisfaction.iter().map(|b| b.mean_score).collect();
    assert_eq!(means, vec![Some(5.0), Some(4.0), Some(2.0)]);
    assert_eq!(r.avg_review.display, "3.50");
    assert_eq!(r.avg_review.stars, "★★★★☆");

    let states: Vec<_> = r.state_revenue.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(states, vec!["SP", "RJ", "MG"]);
}

#[test]
fn single_month_report() {
    let dataset = load();
    let r = report::build_report(&dataset, Period::month(2023, 1), &ReportOptions::default());

    assert_eq!(r.period_label, "Jan 2023");
    assert_eq!(r.comparison_label, "Jan 2022");
    assert_eq!(r.kpis.total_revenue.display, "$600");
    // 600 vs 250
    assert_eq!(r.kpis.total_revenue.trend_display, "↑ 140.00%");
    assert_eq!(r.revenue_trend.current.points.len(), 1);
    assert_eq!(r.revenue_trend.comparison.points.len(), 1);
}

#[test]
fn revenue_axis_covers_the_data() {
    let dataset = load();
    let r = report::build_report(&dataset, Period::year(2023), &ReportOptions::default());
    let ticks = &r.revenue_trend.ticks;
    assert_eq!(ticks.values[0], 0.0);
    assert!(ticks.values.windows(2).all(|w| w[0] < w[1]));
    assert!(*ticks.values.last().unwrap() >= 600.0);
    assert_eq!(ticks.values.len(), ticks.labels.len());
}

#[test]
fn report_serializes_for_the_web_ui() {
    let dataset = load();
    let r = report::build_report(&dataset, Period::year(2023), &ReportOptions::default());
    let json = serde_json::to_value(&r).unwrap();

    assert_eq!(json["period"]["year"], 2023);
    assert!(json["period"]["month"].is_null());
    assert_eq!(json["kpis"]["total_revenue"]["trend"]["kind"], "change");
    assert_eq!(json["kpis"]["total_revenue"]["trend"]["direction"], "up");
    assert_eq!(json["satisfaction"][0]["bucket"], "1-3 days");

    // The state ranking table reads `label` and `display`.
    assert_eq!(json["state_revenue"][0]["label"], "SP");
    assert_eq!(json["state_revenue"][0]["display"], "$400");
    assert!(json["state_revenue"][0].get("state").is_none());
}

// ---------------------------------------------------------------------------
// Formatting properties
// ---------------------------------------------------------------------------

#[test]
fn compact_currency_examples() {
    assert_eq!(format::fmt_compact(2_300_000.0), "$2.3M");
    assert_eq!(format::fmt_compact(1_000_000.0), "$1M");
    assert_eq!(format::fmt_compact(45_000.0), "$45K");
    assert_eq!(format::fmt_compact(7.0), "$7");
}

#[test]
fn trend_examples() {
    let up = format::trend(Some(110.0), Some(100.0), false);
    assert_eq!(
        up,
        Trend::Change {
            direction: Direction::Up,
            percent: 10.0,
            favorable: true
        }
    );
    assert_eq!(up.label(), "10.00%");

    let faster = format::trend(Some(90.0), Some(100.0), true);
    assert!(matches!(
        faster,
        Trend::Change {
            direction: Direction::Down,
            favorable: true,
            ..
        }
    ));

    assert_eq!(format::trend(Some(5.0), Some(0.0), false), Trend::NoData);
    assert_eq!(format::trend(Some(5.0), None, false), Trend::NoData);
}

#[test]
fn ticks_for_437() {
    let ticks = format::make_ticks(437.0, 5);
    assert_eq!(ticks.values[0], 0.0);
    assert!(ticks.values.windows(2).all(|w| w[0] < w[1]));
    let step = ticks.values[1] - ticks.values[0];
    assert!(step * 4.0 >= 437.0);
}

#[test]
fn canceled_orders_never_count() {
    let sales = vec![
        OrderLine::new(
            "x",
            "p",
            50.0,
            OrderStatus::Delivered,
            salesdash::data::temporal::parse_timestamp("2023-05-01 00:00:00"),
            None,
        ),
        OrderLine::new(
            "y",
            "p",
            500.0,
            OrderStatus::parse("canceled"),
            salesdash::data::temporal::parse_timestamp("2023-05-01 00:00:00"),
            None,
        ),
    ];
    let dataset = Dataset::new(sales, References::default());
    let r = report::build_report(&dataset, Period::year(2023), &ReportOptions::default());
    assert_eq!(r.kpis.total_revenue.value, Some(50.0));
}
