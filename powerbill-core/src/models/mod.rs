mod billing_month;
mod rate_schedule;
mod usage_record;

pub use billing_month::{BillingMonth, BillingMonthError};
pub use rate_schedule::{REGULAR_SCHEDULE, RateSchedule, SUMMER_SCHEDULE, Season, Tier, TierLevel};
pub use usage_record::{NewUsageRecord, UsageRecord};
