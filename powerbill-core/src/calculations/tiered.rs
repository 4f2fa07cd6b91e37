//! Tiered residential electricity billing.
//!
//! Monthly usage is charged progressively across three tiers. The tier the
//! usage ends in decides the base charge; every kWh is charged at the rate
//! of the tier it falls in.
//!
//! # Calculation Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Select the rate schedule from the billing month (summer: July, August) |
//! | 2    | Pre-tax charge: base of the reached tier + cumulative energy charge |
//! | 3    | VAT: pre-tax charge × 10% |
//! | 4    | Power industry foundation fund: pre-tax charge × 3.7%, floored to an integer |
//! | 5    | Payable amount: (pre-tax + VAT + fund), floored to a multiple of 10 |
//!
//! The fund is floored before the sum is floored to 10; swapping the order
//! changes the result by up to 9 won.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use powerbill_core::calculations::{calculate_bill, tier_index};
//! use powerbill_core::TierLevel;
//!
//! assert_eq!(calculate_bill(dec!(350), 1), 65700);
//! assert_eq!(tier_index(dec!(250), 1), Some(TierLevel::Second));
//! assert_eq!(tier_index(dec!(250), 7), Some(TierLevel::First));
//! ```

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::floor_to_multiple;
use crate::models::{RateSchedule, Season, TierLevel};

/// Every component of a computed bill, in KRW.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillBreakdown {
    pub season: Season,
    pub tier: TierLevel,

    /// Base charge plus cumulative energy charge.
    pub pre_tax: Decimal,

    /// Value-added tax, not rounded.
    pub vat: Decimal,

    /// Power industry foundation fund surcharge, floored.
    pub foundation: Decimal,

    /// Payable amount, a multiple of 10.
    pub total: i64,
}

/// Returns the rate schedule that applies to a calendar month.
///
/// Months 7 and 8 use the summer schedule; every other month uses the
/// regular schedule. Months outside 1..=12 are a caller error and fall back
/// to the regular schedule.
pub fn select_schedule(month: u32) -> &'static RateSchedule {
    if !(1..=12).contains(&month) {
        warn!(month, "billing month out of range, using regular schedule");
    }
    Season::from_month(month).schedule()
}

/// Returns the progressive tier `usage_kwh` falls into for `month`.
///
/// Zero or negative usage has no tier and yields `None`.
pub fn tier_index(
    usage_kwh: Decimal,
    month: u32,
) -> Option<TierLevel> {
    if usage_kwh <= Decimal::ZERO {
        return None;
    }
    Some(tier_for(select_schedule(month), usage_kwh))
}

/// Computes the payable bill (KRW) for `usage_kwh` consumed in `month`.
///
/// `usage_kwh` must be positive; validate user input with
/// [`parse_usage`](crate::calculations::parse_usage) first. Intermediate
/// amounts saturate at the `Decimal` range and the total saturates at the
/// `i64` range, so no input panics.
pub fn calculate_bill(
    usage_kwh: Decimal,
    month: u32,
) -> i64 {
    calculate_breakdown(usage_kwh, month).total
}

/// Computes the bill for `usage_kwh` consumed in `month` along with every
/// intermediate amount.
pub fn calculate_breakdown(
    usage_kwh: Decimal,
    month: u32,
) -> BillBreakdown {
    let schedule = select_schedule(month);
    let tier = tier_for(schedule, usage_kwh);

    let pre_tax = pre_tax_charge(schedule, tier, usage_kwh);
    let vat = value_added_tax(pre_tax);
    let foundation = foundation_fund(pre_tax);
    let total = payable_amount(pre_tax, vat, foundation);

    debug!(
        %usage_kwh,
        month,
        season = %schedule.season,
        tier = tier.number(),
        %pre_tax,
        %vat,
        %foundation,
        total,
        "calculated electricity bill"
    );

    BillBreakdown {
        season: schedule.season,
        tier,
        pre_tax,
        vat,
        foundation,
        total,
    }
}

fn tier_for(
    schedule: &RateSchedule,
    usage_kwh: Decimal,
) -> TierLevel {
    if usage_kwh <= schedule.first_limit() {
        TierLevel::First
    } else if usage_kwh <= schedule.second_limit() {
        TierLevel::Second
    } else {
        TierLevel::Third
    }
}

/// Base charge of the reached tier plus the energy charge accumulated
/// across every tier up to `usage_kwh`.
///
/// Arithmetic saturates at `Decimal::MAX`/`Decimal::MIN`.
fn pre_tax_charge(
    schedule: &RateSchedule,
    tier: TierLevel,
    usage_kwh: Decimal,
) -> Decimal {
    let first_limit = schedule.first_limit();
    let second_limit = schedule.second_limit();
    let first_block = first_limit * schedule.first.rate;
    let second_block = (second_limit - first_limit) * schedule.second.rate;

    match tier {
        TierLevel::First => schedule
            .first
            .base
            .saturating_add(usage_kwh.saturating_mul(schedule.first.rate)),
        TierLevel::Second => (schedule.second.base + first_block).saturating_add(
            usage_kwh
                .saturating_sub(first_limit)
                .saturating_mul(schedule.second.rate),
        ),
        TierLevel::Third => (schedule.third.base + first_block + second_block).saturating_add(
            usage_kwh
                .saturating_sub(second_limit)
                .saturating_mul(schedule.third.rate),
        ),
    }
}

/// VAT at 10%.
fn value_added_tax(pre_tax: Decimal) -> Decimal {
    pre_tax * Decimal::new(1, 1)
}

/// Foundation fund at 3.7%, floored to a whole won.
fn foundation_fund(pre_tax: Decimal) -> Decimal {
    (pre_tax * Decimal::new(37, 3)).floor()
}

fn payable_amount(
    pre_tax: Decimal,
    vat: Decimal,
    foundation: Decimal,
) -> i64 {
    let sum = pre_tax.saturating_add(vat).saturating_add(foundation);
    floor_to_multiple(sum, Decimal::TEN)
        .to_i64()
        .unwrap_or(if sum.is_sign_negative() { i64::MIN } else { i64::MAX })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{REGULAR_SCHEDULE, SUMMER_SCHEDULE};

    // =========================================================================
    // select_schedule tests
    // =========================================================================

    #[test]
    fn select_schedule_returns_summer_only_for_july_and_august() {
        for month in 1..=12 {
            let schedule = select_schedule(month);

            if month == 7 || month == 8 {
                assert_eq!(schedule, &*SUMMER_SCHEDULE, "month {month}");
            } else {
                assert_eq!(schedule, &*REGULAR_SCHEDULE, "month {month}");
            }
        }
    }

    #[test]
    fn select_schedule_falls_back_to_regular_for_invalid_month() {
        assert_eq!(select_schedule(0), &*REGULAR_SCHEDULE);
        assert_eq!(select_schedule(13), &*REGULAR_SCHEDULE);
    }

    // =========================================================================
    // tier_index tests
    // =========================================================================

    #[test]
    fn tier_index_regular_season() {
        assert_eq!(tier_index(dec!(250), 1), Some(TierLevel::Second));
    }

    #[test]
    fn tier_index_summer_season() {
        assert_eq!(tier_index(dec!(250), 7), Some(TierLevel::First));
    }

    #[test]
    fn tier_index_boundaries_are_inclusive() {
        assert_eq!(tier_index(dec!(200), 1), Some(TierLevel::First));
        assert_eq!(tier_index(dec!(200.01), 1), Some(TierLevel::Second));
        assert_eq!(tier_index(dec!(400), 1), Some(TierLevel::Second));
        assert_eq!(tier_index(dec!(400.01), 1), Some(TierLevel::Third));
        assert_eq!(tier_index(dec!(450), 8), Some(TierLevel::Second));
        assert_eq!(tier_index(dec!(451), 8), Some(TierLevel::Third));
    }

    #[test]
    fn tier_index_has_no_tier_for_zero_or_negative_usage() {
        assert_eq!(tier_index(dec!(0), 1), None);
        assert_eq!(tier_index(dec!(-5), 7), None);
    }

    // =========================================================================
    // calculate_bill tests
    // =========================================================================

    #[test]
    fn calculate_bill_first_tier() {
        // 910 + 100 * 120 = 12910; vat 1291; fund 477; 14678 -> 14670
        assert_eq!(calculate_bill(dec!(100), 1), 14670);
    }

    #[test]
    fn calculate_bill_first_tier_upper_bound() {
        // 910 + 200 * 120 = 24910; vat 2491; fund 921; 28322 -> 28320
        assert_eq!(calculate_bill(dec!(200), 1), 28320);
    }

    #[test]
    fn calculate_bill_second_tier() {
        // 1600 + 24000 + 150 * 214.6 = 57790; vat 5779; fund 2138; 65707 -> 65700
        assert_eq!(calculate_bill(dec!(350), 1), 65700);
    }

    #[test]
    fn calculate_bill_second_tier_upper_bound() {
        // 1600 + 24000 + 42920 = 68520; vat 6852; fund 2535; 77907 -> 77900
        assert_eq!(calculate_bill(dec!(400), 1), 77900);
    }

    #[test]
    fn calculate_bill_third_tier() {
        // 7300 + 24000 + 42920 + 100 * 307.3 = 104950; vat 10495; fund 3883; 119328 -> 119320
        assert_eq!(calculate_bill(dec!(500), 1), 119320);
    }

    #[test]
    fn calculate_bill_summer_first_tier() {
        // 910 + 250 * 120 = 30910; vat 3091; fund 1143; 35144 -> 35140
        assert_eq!(calculate_bill(dec!(250), 7), 35140);
    }

    #[test]
    fn calculate_bill_summer_second_tier_upper_bound() {
        // 1600 + 36000 + 150 * 214.6 = 69790; vat 6979; fund 2582; 79351 -> 79350
        assert_eq!(calculate_bill(dec!(450), 7), 79350);
    }

    #[test]
    fn calculate_bill_summer_third_tier() {
        // 7300 + 36000 + 32190 + 50 * 307.3 = 90855; vat 9085.5; fund 3361; 103301.5 -> 103300
        assert_eq!(calculate_bill(dec!(500), 7), 103300);
    }

    #[test]
    fn calculate_bill_fractional_usage() {
        // 910 + 123.4 * 120 = 15718; vat 1571.8; fund 581; 17870.8 -> 17870
        assert_eq!(calculate_bill(dec!(123.4), 3), 17870);
    }

    #[test]
    fn calculate_bill_is_always_a_multiple_of_ten() {
        let mut usage = dec!(0.5);
        while usage <= dec!(900) {
            for month in [1, 7] {
                assert_eq!(calculate_bill(usage, month) % 10, 0, "usage {usage}");
            }
            usage += dec!(7.3);
        }
    }

    #[test]
    fn calculate_bill_is_monotonic_in_usage() {
        for month in 1..=12 {
            let mut previous = 0;
            let mut usage = dec!(1);
            while usage <= dec!(1000) {
                let bill = calculate_bill(usage, month);
                assert!(bill >= previous, "month {month}, usage {usage}");
                previous = bill;
                usage += dec!(0.5);
            }
        }
    }

    #[test]
    fn calculate_bill_saturates_for_huge_usage() {
        assert_eq!(calculate_bill(Decimal::MAX, 1), i64::MAX);
        assert_eq!(calculate_bill(Decimal::MAX, 8), i64::MAX);
        assert_eq!(calculate_bill(dec!(100000000000000000000), 1), i64::MAX);
    }

    #[test]
    fn calculate_bill_stays_exact_at_the_usage_limit() {
        // 7300 + 24000 + 42920 + 999999600 * 307.3 = 307299951300;
        // vat 30729995130; fund 11370098198; 349400044628 -> 349400044620
        assert_eq!(calculate_bill(dec!(1000000000), 1), 349400044620);
    }

    #[test]
    fn calculate_breakdown_saturates_instead_of_panicking() {
        let breakdown = calculate_breakdown(Decimal::MAX, 1);

        assert_eq!(breakdown.tier, TierLevel::Third);
        assert_eq!(breakdown.pre_tax, Decimal::MAX);
        assert_eq!(breakdown.total, i64::MAX);
    }

    #[test]
    fn high_precision_usage_just_above_a_boundary_is_the_next_tier() {
        let just_above = dec!(200.000000000000000001);

        assert_eq!(tier_index(just_above, 1), Some(TierLevel::Second));
        assert!(calculate_bill(just_above, 1) > calculate_bill(dec!(200), 1));
    }

    // =========================================================================
    // calculate_breakdown tests
    // =========================================================================

    #[test]
    fn calculate_breakdown_reports_every_component() {
        let breakdown = calculate_breakdown(dec!(350), 1);

        assert_eq!(
            breakdown,
            BillBreakdown {
                season: Season::Other,
                tier: TierLevel::Second,
                pre_tax: dec!(57790),
                vat: dec!(5779),
                foundation: dec!(2138),
                total: 65700,
            }
        );
    }

    #[test]
    fn calculate_breakdown_keeps_vat_unrounded() {
        let breakdown = calculate_breakdown(dec!(500), 7);

        assert_eq!(breakdown.pre_tax, dec!(90855));
        assert_eq!(breakdown.vat, dec!(9085.5));
        assert_eq!(breakdown.foundation, dec!(3361));
    }

    #[test]
    fn pre_tax_jump_at_first_boundary_is_base_delta_plus_marginal_rate() {
        let at_limit = calculate_breakdown(dec!(200), 1).pre_tax;
        let past_limit = calculate_breakdown(dec!(200.1), 1).pre_tax;

        // (1600 - 910) + 0.1 * 214.6
        assert_eq!(past_limit - at_limit, dec!(711.46));
    }

    #[test]
    fn pre_tax_jump_at_second_boundary_is_base_delta_plus_marginal_rate() {
        let at_limit = calculate_breakdown(dec!(450), 8).pre_tax;
        let past_limit = calculate_breakdown(dec!(450.1), 8).pre_tax;

        // (7300 - 1600) + 0.1 * 307.3
        assert_eq!(past_limit - at_limit, dec!(5730.73));
    }

    #[test]
    fn foundation_fund_is_floored_before_final_rounding() {
        // 57790 * 0.037 = 2138.23
        assert_eq!(foundation_fund(dec!(57790)), dec!(2138));
        assert_eq!(payable_amount(dec!(57790), dec!(5779), dec!(2138)), 65700);
    }
}
