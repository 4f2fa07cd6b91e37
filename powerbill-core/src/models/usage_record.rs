use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BillingMonth;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: i64,
    pub billing_month: BillingMonth,

    // User-provided meter reading
    pub usage_kwh: Decimal,

    // Calculated payable amount in KRW
    pub bill: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For submitting a month's usage (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUsageRecord {
    pub billing_month: BillingMonth,
    pub usage_kwh: Decimal,
    pub bill: i64,
}
