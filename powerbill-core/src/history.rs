//! Aggregation of persisted usage records into per-month totals.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{BillingMonth, UsageRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub billing_month: BillingMonth,
    pub usage_kwh: Decimal,
    pub bill: i64,
    pub record_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTotals {
    pub usage_kwh: Decimal,
    pub bill: i64,
    pub months: usize,
}

/// Groups records by billing month and sums usage and bill amounts.
/// Summaries come back in ascending month order.
pub fn summarize_by_month(records: &[UsageRecord]) -> Vec<MonthlySummary> {
    let mut by_month: BTreeMap<BillingMonth, MonthlySummary> = BTreeMap::new();

    for record in records {
        let summary = by_month
            .entry(record.billing_month)
            .or_insert_with(|| MonthlySummary {
                billing_month: record.billing_month,
                usage_kwh: Decimal::ZERO,
                bill: 0,
                record_count: 0,
            });
        summary.usage_kwh += record.usage_kwh;
        summary.bill = summary.bill.saturating_add(record.bill);
        summary.record_count += 1;
    }

    by_month.into_values().collect()
}

pub fn totals(summaries: &[MonthlySummary]) -> HistoryTotals {
    summaries
        .iter()
        .fold(HistoryTotals::default(), |mut acc, summary| {
            acc.usage_kwh += summary.usage_kwh;
            acc.bill = acc.bill.saturating_add(summary.bill);
            acc.months += 1;
            acc
        })
}
