use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use powerbill_cli::{
    app,
    config::{AppConfig, ConfigFile, Overrides},
    logging,
};
use powerbill_core::BillingMonth;
use powerbill_core::calculations::parse_usage;
use tracing::debug;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Residential electricity bill calculator for the Korean progressive tariff.
///
/// Prices monthly usage with the seasonal tier schedule and keeps one usage
/// record per billing month.
#[derive(Debug, Parser)]
#[command(name = "powerbill", version, about)]
struct Cli {
    /// TOML config file with `[database]` and `[logging]` sections.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database backend to use (default: sqlite).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `usage.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Log filter, e.g. `debug` or `powerbill_core=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Price a month's usage and show the breakdown.
    Quote {
        /// Usage in kWh.
        #[arg(long, allow_hyphen_values = true)]
        usage: String,

        /// Calendar month, 1-12.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
    },

    /// Show which progressive tier a usage value falls into.
    Tier {
        /// Usage in kWh.
        #[arg(long, allow_hyphen_values = true)]
        usage: String,

        /// Calendar month, 1-12.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
    },

    /// Price and store usage for a billing month.
    Record {
        /// Usage in kWh.
        #[arg(long, allow_hyphen_values = true)]
        usage: String,

        /// Billing month as YYYY-MM (default: the current month).
        #[arg(long)]
        billing_month: Option<BillingMonth>,
    },

    /// Show stored usage and bills per month.
    History {
        /// Only show this calendar year.
        #[arg(long)]
        year: Option<i32>,
    },

    /// Convert a value between length, weight, temperature or area units.
    Convert {
        #[arg(long, allow_hyphen_values = true)]
        value: String,

        /// Source unit code (e.g. kg, sqm, celsius).
        #[arg(long)]
        from: String,

        /// Target unit code (e.g. lb, pyeong, fahrenheit).
        #[arg(long)]
        to: String,
    },
}

// ─── configuration ───────────────────────────────────────────────────────────

fn resolve_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let file = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let overrides = Overrides {
        backend: cli.backend.clone(),
        db: cli.db.clone(),
        log_level: cli.log_level.clone(),
        log_file: cli.log_file.clone(),
    };
    Ok(AppConfig::resolve(file, overrides))
}

fn apply_logging(config: &AppConfig) -> anyhow::Result<()> {
    if let Some(level) = &config.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &config.log_file {
        logging::enable_file_logging(path)?;
    }
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    apply_logging(&config)?;
    debug!(?config, "resolved configuration");

    match cli.command {
        Command::Quote { usage, month } => {
            println!("{}", app::quote(&usage, month)?);
        }
        Command::Tier { usage, month } => match app::tier_feedback(&usage, month)? {
            Some(tier) => println!("{tier}"),
            None => println!("no tier"),
        },
        Command::Record {
            usage,
            billing_month,
        } => {
            let usage_kwh = parse_usage(&usage)?;
            let billing_month = billing_month.unwrap_or_else(app::current_billing_month);
            let repo = app::open_repository(&config.database).await?;
            let record = app::submit_usage(&*repo, usage_kwh, billing_month).await?;
            println!(
                "{}: {} kWh, {}",
                record.billing_month,
                record.usage_kwh.normalize(),
                app::format_krw(record.bill)
            );
        }
        Command::History { year } => {
            let repo = app::open_repository(&config.database).await?;
            println!("{}", app::load_history(&*repo, year).await?);
        }
        Command::Convert { value, from, to } => {
            let converted = app::convert_value(&value, &from, &to)
                .with_context(|| format!("cannot convert {value} {from} to {to}"))?;
            println!("{value} {from} = {} {to}", converted.normalize());
        }
    }

    Ok(())
}
