//! Calculation modules: the tiered electricity billing engine, usage input
//! validation and unit conversion.

pub mod common;
pub mod tiered;
pub mod units;
pub mod usage;

pub use tiered::{BillBreakdown, calculate_bill, calculate_breakdown, select_schedule, tier_index};
pub use units::{Unit, UnitError, UnitKind, convert};
pub use usage::{MAX_USAGE_KWH, UsageError, parse_usage, validate_usage};
