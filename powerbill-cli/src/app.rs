//! Operations behind the `powerbill` subcommands.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, ensure};
use chrono::Local;
use powerbill_core::calculations::{
    BillBreakdown, Unit, UsageError, calculate_breakdown, convert, parse_usage, tier_index,
    validate_usage,
};
use powerbill_core::db::{DbConfig, RepositoryRegistry};
use powerbill_core::history::{HistoryTotals, MonthlySummary, summarize_by_month, totals};
use powerbill_core::{BillingMonth, NewUsageRecord, TierLevel, UsageRecord, UsageRepository};
use powerbill_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Registry with every storage backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    RepositoryRegistry::default().with_backend(SqliteRepositoryFactory)
}

pub async fn open_repository(config: &DbConfig) -> Result<Box<dyn UsageRepository>> {
    debug!(backend = %config.backend, "opening usage repository");
    build_registry()
        .open(config)
        .await
        .with_context(|| format!("cannot open {} database '{}'", config.backend, config.connection_string))
}

/// Formats a won amount with thousands separators, e.g. `65,700 KRW`.
pub fn format_krw(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped} KRW")
}

fn ensure_month(month: u32) -> Result<()> {
    ensure!((1..=12).contains(&month), "month must be between 1 and 12, got {month}");
    Ok(())
}

// ─── quote / tier ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillQuote {
    pub usage_kwh: Decimal,
    pub month: u32,
    pub breakdown: BillBreakdown,
}

impl fmt::Display for BillQuote {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let b = &self.breakdown;
        writeln!(f, "Usage:       {} kWh (month {})", self.usage_kwh.normalize(), self.month)?;
        writeln!(f, "Schedule:    {}", b.season)?;
        writeln!(f, "Tier:        {}", b.tier)?;
        writeln!(f, "Pre-tax:     {}", b.pre_tax.normalize())?;
        writeln!(f, "VAT:         {}", b.vat.normalize())?;
        writeln!(f, "Fund:        {}", b.foundation.normalize())?;
        write!(f, "Total:       {}", format_krw(b.total))
    }
}

/// Validates `usage` as typed and prices it for `month`.
pub fn quote(
    usage: &str,
    month: u32,
) -> Result<BillQuote> {
    let usage_kwh = parse_usage(usage)?;
    ensure_month(month)?;

    Ok(BillQuote {
        usage_kwh,
        month,
        breakdown: calculate_breakdown(usage_kwh, month),
    })
}

/// Tier feedback while usage is being entered. Zero and negative values
/// have no tier; text that is not a number is an error.
pub fn tier_feedback(
    usage: &str,
    month: u32,
) -> Result<Option<TierLevel>> {
    ensure_month(month)?;
    let usage_kwh = match parse_usage(usage) {
        Ok(value) | Err(UsageError::NotPositive(value)) => value,
        Err(e) => return Err(e.into()),
    };
    Ok(tier_index(usage_kwh, month))
}

// ─── record / history ────────────────────────────────────────────────────────

pub fn current_billing_month() -> BillingMonth {
    BillingMonth::from_date(Local::now().date_naive())
}

/// Prices `usage_kwh` for `billing_month` and stores it, replacing any
/// record already kept for that month.
pub async fn submit_usage(
    repo: &dyn UsageRepository,
    usage_kwh: Decimal,
    billing_month: BillingMonth,
) -> Result<UsageRecord> {
    let usage_kwh = validate_usage(usage_kwh)?;
    let breakdown = calculate_breakdown(usage_kwh, billing_month.month());

    let record = repo
        .upsert_record(NewUsageRecord {
            billing_month,
            usage_kwh,
            bill: breakdown.total,
        })
        .await
        .with_context(|| format!("cannot save usage for {billing_month}"))?;

    info!(
        %billing_month,
        %usage_kwh,
        tier = breakdown.tier.number(),
        bill = record.bill,
        "recorded monthly usage"
    );
    Ok(record)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryReport {
    pub months: Vec<MonthlySummary>,
    pub totals: HistoryTotals,
}

impl fmt::Display for HistoryReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.months.is_empty() {
            return write!(f, "No usage recorded.");
        }

        writeln!(f, "{:<9} {:>12} {:>16}", "Month", "Usage (kWh)", "Bill")?;
        for summary in &self.months {
            writeln!(
                f,
                "{:<9} {:>12} {:>16}",
                summary.billing_month.to_string(),
                summary.usage_kwh.normalize().to_string(),
                format_krw(summary.bill)
            )?;
        }
        write!(
            f,
            "{:<9} {:>12} {:>16}",
            format!("Total ({})", self.totals.months),
            self.totals.usage_kwh.normalize().to_string(),
            format_krw(self.totals.bill)
        )
    }
}

pub async fn load_history(
    repo: &dyn UsageRepository,
    year: Option<i32>,
) -> Result<HistoryReport> {
    let records = repo
        .list_records(year)
        .await
        .context("cannot read usage history")?;
    let months = summarize_by_month(&records);
    let totals = totals(&months);

    Ok(HistoryReport { months, totals })
}

// ─── convert ─────────────────────────────────────────────────────────────────

pub fn convert_value(
    value: &str,
    from: &str,
    to: &str,
) -> Result<Decimal> {
    let value = Decimal::from_str(value.trim())
        .with_context(|| format!("'{}' is not a number", value.trim()))?;
    let from: Unit = from.parse()?;
    let to: Unit = to.parse()?;
    Ok(convert(value, from, to)?)
}
