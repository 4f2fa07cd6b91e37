use std::io::Read;

use powerbill_core::calculations::{UsageError, calculate_bill, validate_usage};
use powerbill_core::{BillingMonth, BillingMonthError, NewUsageRecord, RepositoryError, UsageRepository};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when importing usage history.
#[derive(Debug, Error)]
pub enum UsageHistoryLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Row {row}: {source}")]
    InvalidBillingMonth {
        row: usize,
        #[source]
        source: BillingMonthError,
    },

    #[error("Row {row}: {source}")]
    InvalidUsage {
        row: usize,
        #[source]
        source: UsageError,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for UsageHistoryLoaderError {
    fn from(err: csv::Error) -> Self {
        UsageHistoryLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of a usage history CSV file.
///
/// - `billing_month`: calendar month formatted as `YYYY-MM`
/// - `usage_kwh`: metered usage for that month in kWh
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UsageHistoryRecord {
    pub billing_month: String,
    pub usage_kwh: Decimal,
}

impl UsageHistoryRecord {
    /// Validate the row and price it with the billing engine.
    ///
    /// `row` is 1-based, counting data rows only.
    fn to_new_record(
        &self,
        row: usize,
    ) -> Result<NewUsageRecord, UsageHistoryLoaderError> {
        let billing_month: BillingMonth = self
            .billing_month
            .parse()
            .map_err(|source| UsageHistoryLoaderError::InvalidBillingMonth { row, source })?;
        let usage_kwh = validate_usage(self.usage_kwh)
            .map_err(|source| UsageHistoryLoaderError::InvalidUsage { row, source })?;

        Ok(NewUsageRecord {
            billing_month,
            usage_kwh,
            bill: calculate_bill(usage_kwh, billing_month.month()),
        })
    }
}

/// Imports historical monthly usage into any [`UsageRepository`].
pub struct UsageHistoryLoader;

impl UsageHistoryLoader {
    /// Parse usage history rows from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<UsageHistoryRecord>, UsageHistoryLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: UsageHistoryRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Validate every row, compute its bill and upsert the batch.
    ///
    /// Nothing is written if any row is invalid. The rows go to the store in
    /// one [`UsageRepository::upsert_records`] call, so a backend with
    /// transactions also writes nothing when storing a row fails. Each
    /// billing month keeps a single record: loading the same file twice
    /// leaves the store unchanged, and a month listed twice keeps its last row.
    pub async fn load<R: UsageRepository + ?Sized>(
        repo: &R,
        records: &[UsageHistoryRecord],
    ) -> Result<usize, UsageHistoryLoaderError> {
        let priced = records
            .iter()
            .enumerate()
            .map(|(index, record)| record.to_new_record(index + 1))
            .collect::<Result<Vec<_>, _>>()?;

        for record in &priced {
            debug!(
                billing_month = %record.billing_month,
                usage_kwh = %record.usage_kwh,
                bill = record.bill,
                "importing usage record"
            );
        }
        let stored = repo.upsert_records(priced).await?;

        info!(count = stored.len(), "imported usage history");
        Ok(stored.len())
    }
}
