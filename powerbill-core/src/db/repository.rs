use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BillingMonth, NewUsageRecord, UsageRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for monthly usage records. At most one record exists per
/// billing month.
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Insert the record, or overwrite usage and bill of the record already
    /// stored for the same billing month. Returns the stored record.
    async fn upsert_record(
        &self,
        record: NewUsageRecord,
    ) -> Result<UsageRecord, RepositoryError>;

    /// Upsert every record, in order. Backends with transactions write all
    /// of them or none; this default stops at the first failure and keeps
    /// the records written before it.
    async fn upsert_records(
        &self,
        records: Vec<NewUsageRecord>,
    ) -> Result<Vec<UsageRecord>, RepositoryError> {
        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            stored.push(self.upsert_record(record).await?);
        }
        Ok(stored)
    }

    async fn get_record(&self, id: i64) -> Result<UsageRecord, RepositoryError>;

    async fn get_record_for_month(
        &self,
        billing_month: BillingMonth,
    ) -> Result<UsageRecord, RepositoryError>;

    /// Records in ascending billing month order, optionally limited to one
    /// calendar year.
    async fn list_records(
        &self,
        year: Option<i32>,
    ) -> Result<Vec<UsageRecord>, RepositoryError>;

    async fn delete_record(&self, id: i64) -> Result<(), RepositoryError>;
}
