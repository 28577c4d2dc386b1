//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content.

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Response, StatusCode};

use crate::config::{self, SalesdashConfig};
use crate::data::period::parse_month;
use crate::report::{self, DashboardReport, ReportOptions};

use super::{AppState, content_type_json};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Years API response.
#[derive(Serialize)]
struct YearsResponse {
    years: Vec<i32>,
    default_year: Option<i32>,
    months: Vec<&'static str>,
}

/// Config API response: the effective config plus its TOML rendering.
#[derive(Serialize)]
struct ConfigResponse<'a> {
    config: &'a SalesdashConfig,
    toml_text: String,
}

/// Health API response.
#[derive(Serialize)]
struct HealthResponse {
    data_dir: String,
    lines: usize,
    delivered_lines: usize,
    years: Vec<i32>,
    config_exists: bool,
    log_exists: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// Raw value of `?key=...` in a URL.
fn query_param<'u>(url: &'u str, key: &str) -> Option<&'u str> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == key { Some(v) } else { None }
    })
}

/// `?year=` as a number; anything unparsable counts as absent.
fn parse_year_param(url: &str) -> Option<i32> {
    query_param(url, "year")?.parse().ok()
}

/// `?month=` as 1-12; unknown values mean all months.
fn parse_month_param(url: &str) -> Option<u32> {
    let raw = query_param(url, "month")?.replace("%20", " ").replace('+', " ");
    parse_month(&raw)
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/years`: selectable years, the default one, month labels.
pub fn get_years(state: &AppState<'_>) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&years_payload(state))
}

/// `GET /api/report?year=Y&month=M`: the full dashboard report.
///
/// A missing year falls back to the default year. When the dataset has no
/// dated delivered lines at all, responds with `null`.
pub fn get_report(url: &str, state: &AppState<'_>) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&report_payload(url, state))
}

/// `GET /api/config`: effective configuration the server runs with.
pub fn get_config(state: &AppState<'_>) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&config_payload(state)?)
}

/// `GET /api/health`: dataset summary and file locations.
pub fn get_health(state: &AppState<'_>) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&health_payload(state))
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

fn years_payload(state: &AppState<'_>) -> YearsResponse {
    let choices = report::period_choices(state.dataset, state.config.dashboard.preferred_year);
    YearsResponse {
        years: choices.years,
        default_year: choices.default_year,
        months: choices.months,
    }
}

fn report_payload(url: &str, state: &AppState<'_>) -> Option<DashboardReport> {
    let dashboard = &state.config.dashboard;
    let period = report::resolve_period(
        state.dataset,
        parse_year_param(url),
        parse_month_param(url),
        dashboard.preferred_year,
    )?;
    let options = ReportOptions::from(dashboard);
    Some(report::build_report_logged(
        "web",
        state.dataset,
        period,
        &options,
        &state.events,
    ))
}

fn config_payload<'a>(state: &AppState<'a>) -> Result<ConfigResponse<'a>> {
    let toml_text =
        toml::to_string_pretty(state.config).context("failed to serialize config to TOML")?;
    Ok(ConfigResponse {
        config: state.config,
        toml_text,
    })
}

fn health_payload(state: &AppState<'_>) -> HealthResponse {
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let log_exists = state.events.path().is_some_and(|p| p.exists());

    HealthResponse {
        data_dir: state.config.data.dir.display().to_string(),
        lines: state.dataset.sales().len(),
        delivered_lines: state.dataset.delivered().len(),
        years: state.dataset.available_years(),
        config_exists,
        log_exists,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::temporal::parse_timestamp;
    use crate::logging::EventLog;
    use crate::data::{Dataset, OrderLine, OrderStatus, References};

    fn json<T: Serialize>(payload: &T) -> serde_json::Value {
        serde_json::to_value(payload).unwrap()
    }

    fn dataset() -> Dataset {
        let line = |order: &str, price: f64, ts: &str| {
            OrderLine::new(
                order,
                "p1",
                price,
                OrderStatus::Delivered,
                parse_timestamp(ts),
                None,
            )
        };
        Dataset::new(
            vec![
                line("o1", 100.0, "2023-03-01 09:00:00"),
                line("o2", 50.0, "2022-03-05 09:00:00"),
            ],
            References::default(),
        )
    }

    #[test]
    fn query_param_extracts_value() {
        assert_eq!(query_param("/api/report?year=2023", "year"), Some("2023"));
        assert_eq!(
            query_param("/api/report?month=Mar&year=2022", "year"),
            Some("2022")
        );
        assert_eq!(query_param("/api/report", "year"), None);
        assert_eq!(query_param("/api/report?foo=bar", "year"), None);
    }

    #[test]
    fn year_param_ignores_garbage() {
        assert_eq!(parse_year_param("/api/report?year=2023"), Some(2023));
        assert_eq!(parse_year_param("/api/report?year=abc"), None);
        assert_eq!(parse_year_param("/api/report?year="), None);
    }

    #[test]
    fn month_param_accepts_labels_and_numbers() {
        assert_eq!(parse_month_param("/api/report?month=Mar"), Some(3));
        assert_eq!(parse_month_param("/api/report?month=12"), Some(12));
        assert_eq!(parse_month_param("/api/report?month=All%20Months"), None);
        assert_eq!(parse_month_param("/api/report?month=All+Months"), None);
        assert_eq!(parse_month_param("/api/report?month=13"), None);
        assert_eq!(parse_month_param("/api/report"), None);
    }

    #[test]
    fn report_defaults_to_preferred_year() {
        let dataset = dataset();
        let config = SalesdashConfig::default();
        let state = AppState {
            dataset: &dataset,
            config: &config,
            events: EventLog::disabled(),
        };

        let json = json(&report_payload("/api/report", &state));
        assert_eq!(json["period_label"], "2023");
        assert_eq!(json["comparison_label"], "2022");
        assert_eq!(json["kpis"]["total_revenue"]["display"], "$100");
        assert_eq!(json["kpis"]["total_revenue"]["trend"]["kind"], "change");

        let json = self::json(&report_payload("/api/report?year=2023&month=Apr", &state));
        assert_eq!(json["period_label"], "Apr 2023");
        assert_eq!(json["current_lines"], 0);
    }

    #[test]
    fn report_is_null_without_dated_data() {
        let dataset = Dataset::new(Vec::new(), References::default());
        let config = SalesdashConfig::default();
        let state = AppState {
            dataset: &dataset,
            config: &config,
            events: EventLog::disabled(),
        };
        let json = json(&report_payload("/api/report", &state));
        assert!(json.is_null());
    }

    #[test]
    fn years_and_config_serialize() {
        let dataset = dataset();
        let config = SalesdashConfig::default();
        let state = AppState {
            dataset: &dataset,
            config: &config,
            events: EventLog::disabled(),
        };

        let json = json(&years_payload(&state));
        assert_eq!(json["years"], serde_json::json!([2023, 2022]));
        assert_eq!(json["default_year"], 2023);
        assert_eq!(json["months"][0], "All Months");

        let json = self::json(&config_payload(&state).unwrap());
        assert_eq!(json["config"]["dashboard"]["preferred_year"], 2023);
        assert!(json["toml_text"].as_str().unwrap().contains("[web]"));
    }

    #[test]
    fn health_reports_counts() {
        let dataset = dataset();
        let config = SalesdashConfig::default();
        let state = AppState {
            dataset: &dataset,
            config: &config,
            events: EventLog::disabled(),
        };
        let json = json(&health_payload(&state));
        assert_eq!(json["lines"], 2);
        assert_eq!(json["delivered_lines"], 2);
        assert_eq!(json["data_dir"], "ecommerce_data");
    }
}
