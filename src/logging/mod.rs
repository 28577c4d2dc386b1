//! Structured event log: one JSON line per dataset load or report build.
//!
//! Used to see how long loads take and which periods get looked at. Logging
//! is best-effort: any I/O failure is swallowed so it can never break a
//! report. Disabled with `logging.enabled = false` or `SALESDASH_LOGGING=0`.
//!
//! Log file: `~/.salesdash/events.jsonl`

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;
use crate::data::period::Period;

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

/// A single event line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardEvent {
    pub timestamp: String,
    /// `"dataset_loaded"` or `"report_built"`.
    pub kind: String,
    /// Where the event came from: `"cli"`, `"web"` or `"loader"`.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub month: Option<u32>,
    /// Order lines involved (all lines for a load, current period for a report).
    pub lines: usize,
    /// Delivered lines for a load, comparison-period lines for a report.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub secondary_lines: Option<usize>,
    pub duration_ms: u64,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Where events go. Built once from the resolved config and handed to the
/// loader and report builder; a disabled log writes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    /// `~/.salesdash/events.jsonl` when logging is enabled, otherwise disabled.
    pub fn from_config(cfg: &LoggingConfig) -> Self {
        if cfg.enabled {
            Self {
                path: events_log_path(),
            }
        } else {
            Self::disabled()
        }
    }

    /// Log to an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append an event; failures are ignored.
    pub fn log_event(&self, event: &DashboardEvent) {
        if let Some(path) = &self.path {
            let _ = append_event(path, event);
        }
    }

    /// Record a completed dataset load.
    pub fn log_dataset_loaded(&self, dir: &Path, lines: usize, delivered: usize, duration_ms: u64) {
        self.log_event(&DashboardEvent {
            timestamp: Utc::now().to_rfc3339(),
            kind: "dataset_loaded".to_string(),
            source: "loader".to_string(),
            data_dir: Some(dir.display().to_string()),
            year: None,
            month: None,
            lines,
            secondary_lines: Some(delivered),
            duration_ms,
        });
    }

    /// Record a built report.
    pub fn log_report_built(
        &self,
        source: &str,
        period: Period,
        current_lines: usize,
        comparison_lines: usize,
        duration_ms: u64,
    ) {
        self.log_event(&DashboardEvent {
            timestamp: Utc::now().to_rfc3339(),
            kind: "report_built".to_string(),
            source: source.to_string(),
            data_dir: None,
            year: Some(period.year),
            month: period.month,
            lines: current_lines,
            secondary_lines: Some(comparison_lines),
            duration_ms,
        });
    }
}

fn append_event(path: &Path, event: &DashboardEvent) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(event)?;
    writeln!(file, "{json}")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read events back, skipping malformed lines. Missing file → empty.
pub fn read_events(path: &Path) -> Vec<DashboardEvent> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<DashboardEvent>(&line).ok())
        .collect()
}

/// Return the path to the event log file.
pub fn events_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".salesdash").join("events.jsonl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: &str) -> DashboardEvent {
        DashboardEvent {
            timestamp: "2024-02-01T10:00:00+00:00".to_string(),
            kind: kind.to_string(),
            source: "cli".to_string(),
            data_dir: None,
            year: Some(2023),
            month: None,
            lines: 42,
            secondary_lines: Some(40),
            duration_ms: 3,
        }
    }

    #[test]
    fn optional_fields_are_omitted() {
        let json = serde_json::to_string(&sample("report_built")).unwrap();
        assert!(json.contains("\"year\":2023"));
        assert!(!json.contains("month"));
        assert!(!json.contains("data_dir"));
    }

    #[test]
    fn append_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.jsonl");

        append_event(&path, &sample("dataset_loaded")).unwrap();
        append_event(&path, &sample("report_built")).unwrap();
        fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .and_then(|mut f| writeln!(f, "not json"))
            .unwrap();

        let events = read_events(&path);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, "dataset_loaded");
        assert_eq!(events[1], sample("report_built"));
    }

    #[test]
    fn event_log_writes_only_where_told() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let log = EventLog::at(&path);
        log.log_dataset_loaded(dir.path(), 10, 8, 1);
        log.log_report_built("web", Period::month(2023, 3), 5, 0, 2);

        let events = read_events(&path);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, "dataset_loaded");
        assert_eq!(events[0].secondary_lines, Some(8));
        assert_eq!(events[1].source, "web");
        assert_eq!(events[1].month, Some(3));

        EventLog::disabled().log_report_built("cli", Period::year(2023), 1, 1, 1);
        assert_eq!(read_events(&path).len(), 2);
    }

    #[test]
    fn disabled_config_gives_no_path() {
        let off = LoggingConfig { enabled: false };
        assert_eq!(EventLog::from_config(&off).path(), None);
        assert_eq!(EventLog::from_config(&off), EventLog::disabled());
    }

    #[test]
    fn missing_log_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_events(&dir.path().join("absent.jsonl")).is_empty());
    }
}
