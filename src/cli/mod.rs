//! CLI command implementations for salesdash.
//!
//! Provides subcommand handlers for:
//! - `salesdash report`: KPI cards and chart tables for one period
//! - `salesdash years`: years available for selection
//! - `salesdash health`: config, dataset files, event log
//! - `salesdash config show|init|set|reset`: configuration management

use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::{self, SalesdashConfig};
use crate::data::Dataset;
use crate::data::loader;
use crate::format::{self, Direction, Trend};
use crate::logging::{self, EventLog};
use crate::report::{self, DashboardReport, Kpi, ReportOptions, Series};

/// Output format for report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Load the dataset named by the config, with a user-facing error.
pub fn load_dataset(cfg: &SalesdashConfig) -> Result<Dataset> {
    loader::load_dataset(&cfg.data, &EventLog::from_config(&cfg.logging)).with_context(|| {
        format!(
            "could not load order data from {} (set data.dir or pass --data-dir)",
            cfg.data.dir.display()
        )
    })
}

// ---------------------------------------------------------------------------
// salesdash report
// ---------------------------------------------------------------------------

/// Print the dashboard report for a period.
pub fn run_report(
    cfg: &SalesdashConfig,
    year: Option<i32>,
    month: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let dataset = load_dataset(cfg)?;

    let Some(period) =
        report::resolve_period(&dataset, year, month, cfg.dashboard.preferred_year)
    else {
        println!(
            "{}",
            "No delivered orders with a purchase date in this dataset.".yellow()
        );
        return Ok(());
    };

    let options = ReportOptions::from(&cfg.dashboard);
    let events = EventLog::from_config(&cfg.logging);
    let report = report::build_report_logged("cli", &dataset, period, &options, &events);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Csv => write_report_csv(&report, io::stdout().lock())?,
        OutputFormat::Table => print_report_table(&report),
    }

    Ok(())
}

fn print_report_table(report: &DashboardReport) {
    println!(
        "{}",
        format!("E-Commerce Sales Performance — {}", report.period_label)
            .bold()
            .cyan()
    );
    println!("{}", "=".repeat(60));
    if report.has_comparison {
        println!(
            "  {}",
            format!("Compared with {}", report.comparison_label).dimmed()
        );
    } else {
        println!(
            "  {}",
            format!("No data for {} to compare against", report.comparison_label).dimmed()
        );
    }
    println!();

    // KPI cards
    let k = &report.kpis;
    print_kpi(&k.total_revenue);
    let growth = &k.avg_monthly_growth;
    let arrow = match growth.direction {
        Direction::Up => "↑".green(),
        Direction::Down => "↓".red(),
    };
    println!("  {:<22} {:>12}  {}", growth.label.bold(), growth.display, arrow);
    print_kpi(&k.avg_order_value);
    print_kpi(&k.total_orders);
    println!();

    // Revenue trend
    println!("{}", "Revenue Trend".bold().cyan());
    if report.revenue_trend.current.points.is_empty() {
        println!("  {}", "No revenue in this period.".dimmed());
    } else {
        print_monthly(&report.revenue_trend.current, &report.revenue_trend.comparison);
    }
    println!();

    // Categories
    if !report.top_categories.bars.is_empty() {
        println!(
            "{}",
            format!("Top {} Categories", report.top_categories.bars.len())
                .bold()
                .cyan()
        );
        for (i, bar) in report.top_categories.bars.iter().enumerate() {
            let line = format!("  {:<32} {:>10}", truncate(&bar.label, 32), bar.display);
            if i % 2 == 0 {
                println!("{line}");
            } else {
                println!("{}", line.dimmed());
            }
        }
        println!();
    }

    // States
    if !report.state_revenue.is_empty() {
        println!("{}", "Revenue by State".bold().cyan());
        for state in report.state_revenue.iter().take(10) {
            println!("  {:<6} {:>10}", state.label, state.display);
        }
        if report.state_revenue.len() > 10 {
            println!(
                "  {}",
                format!("… {} more", report.state_revenue.len() - 10).dimmed()
            );
        }
        println!();
    }

    // Delivery vs reviews
    println!("{}", "Review Score vs Delivery Time".bold().cyan());
    for bar in &report.satisfaction {
        let shown = if bar.display.is_empty() {
            format::NO_DATA.to_string()
        } else {
            bar.display.clone()
        };
        println!(
            "  {:<10} {:>6}  {}",
            bar.bucket.label(),
            shown,
            format!("({} reviews)", bar.reviews).dimmed()
        );
    }
    println!();

    print_kpi(&report.avg_delivery);
    println!(
        "  {:<22} {:>12}  {}",
        "Average Review Score".bold(),
        report.avg_review.display,
        report.avg_review.stars.yellow()
    );
}

fn print_kpi(kpi: &Kpi) {
    println!(
        "  {:<22} {:>12}  {}",
        kpi.label.bold(),
        kpi.display,
        colorize_trend(&kpi.trend)
    );
}

fn print_monthly(current: &Series, comparison: &Series) {
    println!(
        "  {:<6} {:>12} {:>12}",
        "Month", current.name, comparison.name
    );
    println!("  {}", "-".repeat(32));

    for (i, month) in crate::data::period::MONTH_ABBRS.iter().enumerate() {
        let find = |series: &Series| {
            series
                .points
                .iter()
                .find(|p| p.label == *month)
                .map(|p| p.display.clone())
        };
        let cur = find(current);
        let prev = find(comparison);
        if cur.is_none() && prev.is_none() {
            continue;
        }
        let line = format!(
            "  {:<6} {:>12} {:>12}",
            month,
            cur.unwrap_or_else(|| format::NO_DATA.to_string()),
            prev.unwrap_or_else(|| format::NO_DATA.to_string()),
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

/// Write the flattened report as `section,label,value` rows.
fn write_report_csv<W: Write>(report: &DashboardReport, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["section", "label", "value"])?;
    for (section, label, value) in report::flatten(report) {
        writer.write_record([section, label, value])?;
    }
    writer.flush().context("failed to write CSV report")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// salesdash years
// ---------------------------------------------------------------------------

/// List the years that can be selected.
pub fn run_years(cfg: &SalesdashConfig, format: OutputFormat) -> Result<()> {
    let dataset = load_dataset(cfg)?;
    let choices = report::period_choices(&dataset, cfg.dashboard.preferred_year);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&choices)?),
        OutputFormat::Csv => {
            println!("year,default");
            for year in &choices.years {
                println!("{},{}", year, Some(*year) == choices.default_year);
            }
        }
        OutputFormat::Table => {
            if choices.years.is_empty() {
                println!("{}", "No delivered orders with a purchase date.".yellow());
                return Ok(());
            }
            println!("{}", "Available Years".bold().cyan());
            for year in &choices.years {
                if Some(*year) == choices.default_year {
                    println!("  {} {}", year.to_string().bold(), "(default)".dimmed());
                } else {
                    println!("  {year}");
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// salesdash health
// ---------------------------------------------------------------------------

/// Check config, dataset files and the event log.
pub fn run_health(cfg: &SalesdashConfig) -> Result<()> {
    println!("{}", "salesdash Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.salesdash/config.toml found"
        } else {
            "not found (run `salesdash config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".salesdash.toml found"
        } else {
            "none (optional)"
        },
    );

    let dir = &cfg.data.dir;
    let dir_ok = dir.is_dir();
    print_health_item("Data directory", dir_ok, &dir.display().to_string());

    if dir_ok {
        for (label, file) in cfg.data.files() {
            let ok = dir.join(file).is_file();
            print_health_item(label, ok, if ok { file } else { "missing" });
        }

        match loader::load_dataset(&cfg.data, &EventLog::disabled()) {
            Ok(dataset) => {
                let years = dataset.available_years();
                print_health_item(
                    "Dataset",
                    true,
                    &format!(
                        "{} lines, {} delivered",
                        format::format_count(dataset.sales().len()),
                        format::format_count(dataset.delivered().len())
                    ),
                );
                let span = match (years.last(), years.first()) {
                    (Some(first), Some(last)) => format!("{first}–{last}"),
                    _ => "no dated delivered orders".to_string(),
                };
                print_health_item("Years", !years.is_empty(), &span);
            }
            Err(e) => print_health_item("Dataset", false, &format!("{e:#}")),
        }
    }

    let events = EventLog::from_config(&cfg.logging);
    print_health_item(
        "Event log",
        cfg.logging.enabled,
        &match events.path() {
            Some(path) => format!("{} entries", logging::read_events(path).len()),
            None => "disabled".to_string(),
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// salesdash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective salesdash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.salesdash/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.salesdash/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".salesdash.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".salesdash.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "SALESDASH_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.salesdash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Color a trend by whether it's good news.
fn colorize_trend(trend: &Trend) -> colored::ColoredString {
    let text = trend.display();
    match trend {
        Trend::NoData => text.dimmed(),
        Trend::Change { favorable: true, .. } => text.green(),
        Trend::Change { favorable: false, .. } => text.red(),
    }
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
