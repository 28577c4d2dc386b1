use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use salesdash::data::period;
use salesdash::logging::EventLog;
use salesdash::{cli, config, web};

#[derive(Debug, Parser)]
#[command(name = "salesdash")]
#[command(about = "Sales performance dashboard for e-commerce order data")]
struct App {
    /// Directory holding the order CSV files (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print KPIs and chart data for a year or a single month
    Report {
        /// Year to report on (default: preferred year if present, else most recent)
        #[arg(long)]
        year: Option<i32>,
        /// Month as "Mar", "3" or "All Months" (default: all months)
        #[arg(long)]
        month: Option<String>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List the years available for selection
    Years {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Serve the interactive dashboard
    Web {
        /// Listen address (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
        /// Don't open a browser tab
        #[arg(long)]
        no_browser: bool,
    },
    /// Check config, dataset files and event log
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default ~/.salesdash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `dashboard.preferred_year 2022`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    let mut cfg = config::load();
    if let Some(dir) = app.data_dir {
        cfg.data.dir = dir;
    }

    match app.command {
        Commands::Report {
            year,
            month,
            format,
        } => {
            // Unrecognized months fall back to the whole year, as in the web UI.
            let month = month.as_deref().and_then(period::parse_month);
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_report(&cfg, year, month, fmt)
        }
        Commands::Years { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_years(&cfg, fmt)
        }
        Commands::Web { addr, no_browser } => {
            let dataset = cli::load_dataset(&cfg)?;
            let addr = addr.unwrap_or_else(|| cfg.web.addr.clone());
            let state = web::AppState {
                dataset: &dataset,
                config: &cfg,
                events: EventLog::from_config(&cfg.logging),
            };
            web::serve(&addr, &state, cfg.web.open_browser && !no_browser)
        }
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
