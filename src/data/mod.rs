//! Order data model and the read-only dataset context.
//!
//! A [`Dataset`] is built once per process (see [`loader::load_dataset`]) and
//! borrowed by every report computation afterwards. Order lines carry their
//! derived calendar attributes from construction on; nothing downstream
//! re-derives or mutates them.

pub mod loader;
pub mod period;
pub mod temporal;

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Order status
// ---------------------------------------------------------------------------

/// Lifecycle status of an order. Only [`OrderStatus::Delivered`] feeds the
/// metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Delivered,
    Shipped,
    Invoiced,
    Processing,
    Approved,
    Created,
    Canceled,
    Unavailable,
    Other(String),
}

impl OrderStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "delivered" => Self::Delivered,
            "shipped" => Self::Shipped,
            "invoiced" => Self::Invoiced,
            "processing" => Self::Processing,
            "approved" => Self::Approved,
            "created" => Self::Created,
            "canceled" | "cancelled" => Self::Canceled,
            "unavailable" => Self::Unavailable,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

// ---------------------------------------------------------------------------
// Order line
// ---------------------------------------------------------------------------

/// One purchased item within one order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub order_id: String,
    pub product_id: String,
    pub price: f64,
    pub status: OrderStatus,
    purchased_at: Option<NaiveDateTime>,
    delivered_at: Option<NaiveDateTime>,
    year: Option<i32>,
    month: Option<u32>,
    delivery_days: Option<i64>,
}

impl OrderLine {
    /// Build a line and derive its calendar and delivery-speed attributes.
    pub fn new(
        order_id: impl Into<String>,
        product_id: impl Into<String>,
        price: f64,
        status: OrderStatus,
        purchased_at: Option<NaiveDateTime>,
        delivered_at: Option<NaiveDateTime>,
    ) -> Self {
        let (year, month) = temporal::derive_calendar(purchased_at);
        Self {
            order_id: order_id.into(),
            product_id: product_id.into(),
            price,
            status,
            purchased_at,
            delivered_at,
            year,
            month,
            delivery_days: temporal::delivery_days(purchased_at, delivered_at),
        }
    }

    pub fn purchased_at(&self) -> Option<NaiveDateTime> {
        self.purchased_at
    }

    pub fn delivered_at(&self) -> Option<NaiveDateTime> {
        self.delivered_at
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    /// Days from purchase to delivery, if both are known.
    pub fn delivery_days(&self) -> Option<i64> {
        self.delivery_days
    }
}

// ---------------------------------------------------------------------------
// Dataset context
// ---------------------------------------------------------------------------

/// Lookup tables joined against order lines.
#[derive(Debug, Clone, Default)]
pub struct References {
    /// product id → category label
    pub product_categories: HashMap<String, String>,
    /// customer id → state code
    pub customer_states: HashMap<String, String>,
    /// order id → customer id
    pub order_customers: HashMap<String, String>,
    /// order id → review score (first review seen per order)
    pub review_scores: HashMap<String, u8>,
}

/// The loaded, read-only dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    sales: Vec<OrderLine>,
    delivered: Vec<OrderLine>,
    references: References,
}

impl Dataset {
    /// Assemble a dataset. Delivered lines are split out here, once.
    pub fn new(sales: Vec<OrderLine>, references: References) -> Self {
        let delivered = sales
            .iter()
            .filter(|line| line.status.is_delivered())
            .cloned()
            .collect();
        Self {
            sales,
            delivered,
            references,
        }
    }

    /// Every joined order line regardless of status.
    pub fn sales(&self) -> &[OrderLine] {
        &self.sales
    }

    /// Delivered order lines only. All metrics read from here.
    pub fn delivered(&self) -> &[OrderLine] {
        &self.delivered
    }

    pub fn references(&self) -> &References {
        &self.references
    }

    /// Distinct purchase years among delivered lines, most recent first.
    pub fn available_years(&self) -> Vec<i32> {
        period::available_years(&self.delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::temporal::parse_timestamp;

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!(OrderStatus::parse("Delivered"), OrderStatus::Delivered);
        assert_eq!(OrderStatus::parse(" canceled "), OrderStatus::Canceled);
        assert_eq!(OrderStatus::parse("cancelled"), OrderStatus::Canceled);
        assert_eq!(
            OrderStatus::parse("returned"),
            OrderStatus::Other("returned".to_string())
        );
    }

    #[test]
    fn order_line_derives_attributes_once() {
        let line = OrderLine::new(
            "o1",
            "p1",
            10.0,
            OrderStatus::Delivered,
            parse_timestamp("2023-05-02 12:00:00"),
            parse_timestamp("2023-05-09 13:00:00"),
        );
        assert_eq!(line.year(), Some(2023));
        assert_eq!(line.month(), Some(5));
        assert_eq!(line.delivery_days(), Some(7));
    }

    #[test]
    fn dataset_keeps_only_delivered_for_metrics() {
        let ts = parse_timestamp("2023-01-01 00:00:00");
        let sales = vec![
            OrderLine::new("o1", "p1", 10.0, OrderStatus::Delivered, ts, None),
            OrderLine::new("o2", "p1", 20.0, OrderStatus::Canceled, ts, None),
            OrderLine::new("o3", "p2", 30.0, OrderStatus::Shipped, None, None),
        ];
        let dataset = Dataset::new(sales, References::default());

        assert_eq!(dataset.sales().len(), 3);
        assert_eq!(dataset.delivered().len(), 1);
        assert_eq!(dataset.delivered()[0].order_id, "o1");
        assert_eq!(dataset.available_years(), vec![2023]);
    }
}
