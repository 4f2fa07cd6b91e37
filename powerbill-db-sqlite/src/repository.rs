use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerbill_core::{
    BillingMonth, NewUsageRecord, RepositoryError, UsageRecord, UsageRepository,
};
use rust_decimal::Decimal;
use sqlx::{
    Executor, Row, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};
use tracing::debug;

const UPSERT: &str = "INSERT INTO usage_records (
        billing_year, billing_month, usage_kwh, bill, created_at, updated_at
    ) VALUES (?, ?, ?, ?, ?, ?)
    ON CONFLICT (billing_year, billing_month) DO UPDATE SET
        usage_kwh = excluded.usage_kwh,
        bill = excluded.bill,
        updated_at = excluded.updated_at
    RETURNING id, billing_year, billing_month, usage_kwh, bill, created_at, updated_at";

const SELECT_COLUMNS: &str = "SELECT id, billing_year, billing_month, usage_kwh, bill,
        created_at, updated_at
 FROM usage_records";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect to a sqlx-style SQLite URL (`sqlite:usage.db`,
    /// `sqlite::memory:`). Database files are created when missing.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true);

        // Every connection to `:memory:` opens its own database, so an
        // in-memory store must live on a single, never-recycled connection.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }
}

fn row_to_usage_record(row: &sqlx::sqlite::SqliteRow) -> Result<UsageRecord, RepositoryError> {
    let year: i32 = row
        .try_get("billing_year")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    let month: u32 = row
        .try_get("billing_month")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    let billing_month = BillingMonth::new(year, month)
        .map_err(|e| RepositoryError::Database(format!("Invalid stored billing month: {}", e)))?;

    Ok(UsageRecord {
        id: row
            .try_get("id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        billing_month,
        usage_kwh: get_usage(row)?,
        bill: row
            .try_get("bill")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

/// Usage is stored as decimal text so it reads back digit for digit.
fn get_usage(row: &sqlx::sqlite::SqliteRow) -> Result<Decimal, RepositoryError> {
    let text: String = row
        .try_get("usage_kwh")
        .map_err(|e| RepositoryError::Database(format!("Failed to get usage_kwh: {}", e)))?;
    Decimal::from_str(&text).map_err(|e| {
        RepositoryError::Database(format!("Invalid stored usage '{}': {}", text, e))
    })
}

async fn upsert_with<'e, E>(
    executor: E,
    record: &NewUsageRecord,
    now: DateTime<Utc>,
) -> Result<UsageRecord, RepositoryError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(UPSERT)
        .bind(record.billing_month.year())
        .bind(record.billing_month.month())
        .bind(record.usage_kwh.to_string())
        .bind(record.bill)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

    debug!(
        billing_month = %record.billing_month,
        usage_kwh = %record.usage_kwh,
        bill = record.bill,
        "stored usage record"
    );

    row_to_usage_record(&row)
}

#[async_trait]
impl UsageRepository for SqliteRepository {
    async fn upsert_record(
        &self,
        record: NewUsageRecord,
    ) -> Result<UsageRecord, RepositoryError> {
        upsert_with(&self.pool, &record, Utc::now()).await
    }

    /// All records share one transaction: a failing record rolls back the
    /// ones before it.
    async fn upsert_records(
        &self,
        records: Vec<NewUsageRecord>,
    ) -> Result<Vec<UsageRecord>, RepositoryError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let mut stored = Vec::with_capacity(records.len());
        for record in &records {
            match upsert_with(&mut *tx, record, now).await {
                Ok(row) => stored.push(row),
                Err(e) => {
                    tx.rollback()
                        .await
                        .map_err(|e| RepositoryError::Database(e.to_string()))?;
                    return Err(e);
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(stored)
    }

    async fn get_record(
        &self,
        id: i64,
    ) -> Result<UsageRecord, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_usage_record(&row)
    }

    async fn get_record_for_month(
        &self,
        billing_month: BillingMonth,
    ) -> Result<UsageRecord, RepositoryError> {
        let row = sqlx::query(&format!(
            "{} WHERE billing_year = ? AND billing_month = ?",
            SELECT_COLUMNS
        ))
        .bind(billing_month.year())
        .bind(billing_month.month())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row_to_usage_record(&row)
    }

    async fn list_records(
        &self,
        year: Option<i32>,
    ) -> Result<Vec<UsageRecord>, RepositoryError> {
        let rows = match year {
            Some(year) => {
                sqlx::query(&format!(
                    "{} WHERE billing_year = ? ORDER BY billing_year, billing_month",
                    SELECT_COLUMNS
                ))
                .bind(year)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "{} ORDER BY billing_year, billing_month",
                    SELECT_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_usage_record).collect()
    }

    async fn delete_record(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM usage_records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
