//! CSV loading for the five order tables.
//!
//! Reads each table with headers, keeps only the columns the dashboard uses,
//! joins order items to their orders and returns a [`Dataset`]. Any missing
//! file or malformed row fails the whole load.

use std::collections::HashMap;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::schema::DataConfig;
use crate::data::temporal::parse_timestamp;
use crate::data::{Dataset, OrderLine, OrderStatus, References};
use crate::logging::EventLog;

/// Valid review scores. Rows outside this range are skipped.
const REVIEW_SCORES: RangeInclusive<u8> = 1..=5;

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OrderItemRow {
    order_id: String,
    product_id: String,
    price: f64,
}

#[derive(Debug, Deserialize)]
struct OrderRow {
    order_id: String,
    #[serde(default)]
    customer_id: String,
    order_status: String,
    #[serde(default)]
    order_purchase_timestamp: String,
    #[serde(default)]
    order_delivered_customer_date: String,
}

#[derive(Debug, Deserialize)]
struct ProductRow {
    product_id: String,
    #[serde(default)]
    product_category_name: String,
}

#[derive(Debug, Deserialize)]
struct CustomerRow {
    customer_id: String,
    #[serde(default)]
    customer_state: String,
}

#[derive(Debug, Deserialize)]
struct ReviewRow {
    order_id: String,
    review_score: u8,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and join every table described by `config`, recording the load in
/// `events`.
pub fn load_dataset(config: &DataConfig, events: &EventLog) -> Result<Dataset> {
    let started = Instant::now();
    let dir = config.dir.as_path();

    if !dir.is_dir() {
        anyhow::bail!("data directory not found: {}", dir.display());
    }

    let items: Vec<OrderItemRow> = read_table(dir, &config.order_items_file)?;
    let orders: Vec<OrderRow> = read_table(dir, &config.orders_file)?;
    let products: Vec<ProductRow> = read_table(dir, &config.products_file)?;
    let customers: Vec<CustomerRow> = read_table(dir, &config.customers_file)?;
    let reviews: Vec<ReviewRow> = read_table(dir, &config.reviews_file)?;

    let order_customers = first_wins(
        orders
            .iter()
            .filter(|o| !o.customer_id.is_empty())
            .map(|o| (o.order_id.clone(), o.customer_id.clone())),
    );

    let references = References {
        product_categories: first_wins(
            products
                .into_iter()
                .filter(|p| !p.product_category_name.is_empty())
                .map(|p| (p.product_id, p.product_category_name)),
        ),
        customer_states: first_wins(
            customers
                .into_iter()
                .filter(|c| !c.customer_state.is_empty())
                .map(|c| (c.customer_id, c.customer_state)),
        ),
        order_customers,
        review_scores: first_wins(
            reviews
                .into_iter()
                .filter(|r| REVIEW_SCORES.contains(&r.review_score))
                .map(|r| (r.order_id, r.review_score)),
        ),
    };

    let sales = prepare_sales(items, &orders);
    let dataset = Dataset::new(sales, references);

    events.log_dataset_loaded(
        dir,
        dataset.sales().len(),
        dataset.delivered().len(),
        started.elapsed().as_millis() as u64,
    );

    Ok(dataset)
}

/// Read one CSV table into typed rows.
fn read_table<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>> {
    let path = dir.join(file);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {file} in {}", dir.display()))?;
    parse_table(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Parse CSV text with a header row. Unused columns are ignored.
fn parse_table<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    // Strip UTF-8 BOM if present
    let text = text.trim_start_matches('\u{FEFF}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("malformed row {}", i + 2)))
        .collect()
}

/// Join order items to their orders (inner join on `order_id`) and derive
/// the temporal attributes.
fn prepare_sales(items: Vec<OrderItemRow>, orders: &[OrderRow]) -> Vec<OrderLine> {
    // Reversed so the first row for a duplicated order id wins.
    let by_id: HashMap<&str, &OrderRow> = orders
        .iter()
        .rev()
        .map(|o| (o.order_id.as_str(), o))
        .collect();

    items
        .into_iter()
        .filter_map(|item| {
            let order = by_id.get(item.order_id.as_str())?;
            Some(OrderLine::new(
                item.order_id,
                item.product_id,
                item.price,
                OrderStatus::parse(&order.order_status),
                parse_timestamp(&order.order_purchase_timestamp),
                parse_timestamp(&order.order_delivered_customer_date),
            ))
        })
        .collect()
}

/// Build a lookup map keeping the first value seen for each key.
fn first_wins<V>(pairs: impl IntoIterator<Item = (String, V)>) -> HashMap<String, V> {
    let mut map = HashMap::new();
    for (key, value) in pairs {
        map.entry(key).or_insert(value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_table_ignores_extra_columns_and_bom() {
        let text = "\u{FEFF}order_id,order_item_id,product_id,seller_id,price,freight_value\n\
                    o1,1,p1,s1,10.5,2.0\n\
                    o1,2,p2,s1,4.5,2.0\n";
        let rows: Vec<OrderItemRow> = parse_table(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].order_id, "o1");
        assert_eq!(rows[1].product_id, "p2");
        assert!((rows[1].price - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_table_reports_bad_row() {
        let text = "order_id,product_id,price\no1,p1,ten\n";
        let err = parse_table::<OrderItemRow>(text).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn prepare_sales_inner_joins_orders() {
        let items = vec![
            OrderItemRow {
                order_id: "o1".into(),
                product_id: "p1".into(),
                price: 10.0,
            },
            OrderItemRow {
                order_id: "orphan".into(),
                product_id: "p1".into(),
                price: 99.0,
            },
        ];
        let orders = vec![OrderRow {
            order_id: "o1".into(),
            customer_id: "c1".into(),
            order_status: "delivered".into(),
            order_purchase_timestamp: "2023-01-02 10:00:00".into(),
            order_delivered_customer_date: "".into(),
        }];

        let sales = prepare_sales(items, &orders);
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].status, OrderStatus::Delivered);
        assert_eq!(sales[0].year(), Some(2023));
        assert_eq!(sales[0].delivery_days(), None);
    }

    #[test]
    fn first_wins_keeps_first_value() {
        let map = first_wins(vec![("o1".to_string(), 5u8), ("o1".to_string(), 1u8)]);
        assert_eq!(map["o1"], 5);
    }
}
