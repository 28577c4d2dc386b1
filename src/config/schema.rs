/// Configuration schema and defaults for salesdash.
///
/// Defines the TOML-serializable configuration structure with the
/// `[data]`, `[dashboard]`, `[web]` and `[logging]` sections. Every field has
/// a built-in default; users only set what they want to override.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level salesdash configuration.
///
/// Maps directly to `~/.salesdash/config.toml` and `.salesdash.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesdashConfig {
    pub data: DataConfig,
    pub dashboard: DashboardConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [data]
// ---------------------------------------------------------------------------

/// Where the order tables live and what the files are called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the CSV exports.
    pub dir: PathBuf,
    pub order_items_file: String,
    pub orders_file: String,
    pub products_file: String,
    pub customers_file: String,
    pub reviews_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("ecommerce_data"),
            order_items_file: "order_items.csv".to_string(),
            orders_file: "orders.csv".to_string(),
            products_file: "products.csv".to_string(),
            customers_file: "customers.csv".to_string(),
            reviews_file: "order_reviews.csv".to_string(),
        }
    }
}

impl DataConfig {
    /// All configured table files, labelled, in load order.
    pub fn files(&self) -> [(&'static str, &str); 5] {
        [
            ("order items", self.order_items_file.as_str()),
            ("orders", self.orders_file.as_str()),
            ("products", self.products_file.as_str()),
            ("customers", self.customers_file.as_str()),
            ("reviews", self.reviews_file.as_str()),
        ]
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

/// Report presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Year selected by default when present in the data.
    pub preferred_year: i32,
    /// How many categories the category chart shows.
    pub top_categories: usize,
    /// Number of ticks on currency axes.
    pub tick_count: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            preferred_year: 2023,
            top_categories: 10,
            tick_count: crate::format::DEFAULT_TICK_COUNT,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Bind address for `salesdash web`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append events to `~/.salesdash/events.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// Default annotated TOML
// ---------------------------------------------------------------------------

impl SalesdashConfig {
    /// The annotated default config written by `salesdash config init`.
    pub fn default_toml() -> &'static str {
        r#"# salesdash configuration
# Values here override built-in defaults. A `.salesdash.toml` in the working
# directory overrides this file, and SALESDASH_* environment variables
# override both.

[data]
# Directory holding the CSV exports.
dir = "ecommerce_data"
order_items_file = "order_items.csv"
orders_file = "orders.csv"
products_file = "products.csv"
customers_file = "customers.csv"
reviews_file = "order_reviews.csv"

[dashboard]
# Year selected on start if the data contains it; otherwise the latest year.
preferred_year = 2023
top_categories = 10
tick_count = 5

[web]
addr = "127.0.0.1:9747"
open_browser = true

[logging]
# Append dataset/report events to ~/.salesdash/events.jsonl
enabled = true
"#
    }
}
