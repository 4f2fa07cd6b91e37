use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use powerbill_data::UsageHistoryLoader;
use powerbill_db_sqlite::{SqliteRepository, connection_url};
use tracing_subscriber::EnvFilter;

/// Import monthly electricity usage history from a CSV file.
///
/// The CSV file should have the following columns:
/// - billing_month: The calendar month (e.g., 2025-01)
/// - usage_kwh: Metered usage for that month in kWh
///
/// Bills are computed with the tiered rate schedule of each month. Months
/// already present in the database are overwritten.
#[derive(Parser, Debug)]
#[command(name = "powerbill-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing usage history
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database path or URL (e.g., usage.db or sqlite:usage.db)
    #[arg(short, long, default_value = "usage.db")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();

    let args = Args::parse();

    let url = connection_url(&args.database);
    let repo = SqliteRepository::new(&url)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    println!("Loading usage history from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = UsageHistoryLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} records from CSV", records.len());

    let loaded = UsageHistoryLoader::load(&repo, &records)
        .await
        .context("Failed to load usage history into database")?;

    println!("Successfully loaded {} monthly records into the database.", loaded);

    Ok(())
}
