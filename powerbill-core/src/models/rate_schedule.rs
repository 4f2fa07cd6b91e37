use std::fmt;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Billing season. July and August are billed on the summer schedule,
/// every other month on the regular one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Summer,
    Other,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            7 | 8 => Self::Summer,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summer => "summer",
            Self::Other => "other",
        }
    }

    /// The fixed rate schedule billed during this season.
    pub fn schedule(&self) -> &'static RateSchedule {
        match self {
            Self::Summer => &SUMMER_SCHEDULE,
            Self::Other => &REGULAR_SCHEDULE,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progressive tier a usage value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TierLevel {
    First,
    Second,
    Third,
}

impl TierLevel {
    /// 1-based tier number as printed on a bill.
    pub fn number(&self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }
}

impl fmt::Display for TierLevel {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "tier {}", self.number())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    /// Upper bound of cumulative usage (kWh) covered by this tier.
    /// `None` for the last, unbounded tier.
    pub limit: Option<Decimal>,
    /// Base charge (KRW) applied once usage reaches this tier.
    pub base: Decimal,
    /// Marginal price (KRW per kWh) within this tier.
    pub rate: Decimal,
}

/// Three tiers, strictly increasing by limit, the last one unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSchedule {
    pub season: Season,
    pub first: Tier,
    pub second: Tier,
    pub third: Tier,
}

impl RateSchedule {
    /// Builds a schedule from the two tier boundaries. Base charges and
    /// rates are the same for every season.
    fn with_limits(
        season: Season,
        first_limit: Decimal,
        second_limit: Decimal,
    ) -> Self {
        Self {
            season,
            first: Tier {
                limit: Some(first_limit),
                base: Decimal::from(910),
                rate: Decimal::new(1200, 1),
            },
            second: Tier {
                limit: Some(second_limit),
                base: Decimal::from(1600),
                rate: Decimal::new(2146, 1),
            },
            third: Tier {
                limit: None,
                base: Decimal::from(7300),
                rate: Decimal::new(3073, 1),
            },
        }
    }

    /// Limit of the first tier in kWh.
    pub fn first_limit(&self) -> Decimal {
        self.first.limit.unwrap_or(Decimal::MAX)
    }

    /// Limit of the second tier in kWh.
    pub fn second_limit(&self) -> Decimal {
        self.second.limit.unwrap_or(Decimal::MAX)
    }

    pub fn tiers(&self) -> [&Tier; 3] {
        [&self.first, &self.second, &self.third]
    }
}

/// July and August: 300 / 450 kWh boundaries.
pub static SUMMER_SCHEDULE: LazyLock<RateSchedule> = LazyLock::new(|| {
    RateSchedule::with_limits(Season::Summer, Decimal::from(300), Decimal::from(450))
});

/// All other months: 200 / 400 kWh boundaries.
pub static REGULAR_SCHEDULE: LazyLock<RateSchedule> = LazyLock::new(|| {
    RateSchedule::with_limits(Season::Other, Decimal::from(200), Decimal::from(400))
});
