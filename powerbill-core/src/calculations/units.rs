//! Unit conversion for length, weight, temperature and area.
//!
//! Linear units convert through a base unit (metre, kilogram, square metre)
//! using a fixed factor. Temperature converts through degrees Celsius.
//! Results are rounded to two decimal places.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use powerbill_core::calculations::{Unit, convert};
//!
//! let feet = convert(dec!(1), Unit::Meter, Unit::Foot).unwrap();
//! assert_eq!(feet, dec!(3.28));
//!
//! let celsius = convert(dec!(98.6), Unit::Fahrenheit, Unit::Celsius).unwrap();
//! assert_eq!(celsius, dec!(37.00));
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::round_half_up;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("cannot convert {from} ({from_kind}) to {to} ({to_kind})")]
    IncompatibleUnits {
        from: Unit,
        from_kind: UnitKind,
        to: Unit,
        to_kind: UnitKind,
    },

    #[error("{value} {from} is out of range when converted to {to}")]
    OutOfRange { value: Decimal, from: Unit, to: Unit },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Length,
    Weight,
    Temperature,
    Area,
}

impl fmt::Display for UnitKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Self::Length => "length",
            Self::Weight => "weight",
            Self::Temperature => "temperature",
            Self::Area => "area",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    // Length, base: metre
    Meter,
    Kilometer,
    Centimeter,
    Millimeter,
    Inch,
    Foot,
    Yard,
    Mile,

    // Weight, base: kilogram
    Kilogram,
    Gram,
    Milligram,
    Pound,
    Ounce,
    Ton,

    Celsius,
    Fahrenheit,
    Kelvin,

    // Area, base: square metre
    SquareMeter,
    Pyeong,
}

impl Unit {
    pub const ALL: [Unit; 19] = [
        Unit::Meter,
        Unit::Kilometer,
        Unit::Centimeter,
        Unit::Millimeter,
        Unit::Inch,
        Unit::Foot,
        Unit::Yard,
        Unit::Mile,
        Unit::Kilogram,
        Unit::Gram,
        Unit::Milligram,
        Unit::Pound,
        Unit::Ounce,
        Unit::Ton,
        Unit::Celsius,
        Unit::Fahrenheit,
        Unit::Kelvin,
        Unit::SquareMeter,
        Unit::Pyeong,
    ];

    pub fn kind(&self) -> UnitKind {
        match self {
            Self::Meter
            | Self::Kilometer
            | Self::Centimeter
            | Self::Millimeter
            | Self::Inch
            | Self::Foot
            | Self::Yard
            | Self::Mile => UnitKind::Length,
            Self::Kilogram | Self::Gram | Self::Milligram | Self::Pound | Self::Ounce | Self::Ton => {
                UnitKind::Weight
            }
            Self::Celsius | Self::Fahrenheit | Self::Kelvin => UnitKind::Temperature,
            Self::SquareMeter | Self::Pyeong => UnitKind::Area,
        }
    }

    /// Short code accepted on the command line.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Meter => "m",
            Self::Kilometer => "km",
            Self::Centimeter => "cm",
            Self::Millimeter => "mm",
            Self::Inch => "inch",
            Self::Foot => "ft",
            Self::Yard => "yd",
            Self::Mile => "mile",
            Self::Kilogram => "kg",
            Self::Gram => "g",
            Self::Milligram => "mg",
            Self::Pound => "lb",
            Self::Ounce => "oz",
            Self::Ton => "ton",
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
            Self::Kelvin => "kelvin",
            Self::SquareMeter => "sqm",
            Self::Pyeong => "pyeong",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|unit| unit.code() == code)
    }

    /// Size of one unit expressed in the base unit of its kind.
    /// `None` for temperature, which is not linear.
    fn factor(&self) -> Option<Decimal> {
        let factor = match self {
            Self::Meter | Self::Kilogram | Self::SquareMeter => Decimal::ONE,
            Self::Kilometer | Self::Ton => Decimal::from(1000),
            Self::Centimeter => Decimal::new(1, 2),
            Self::Millimeter | Self::Gram => Decimal::new(1, 3),
            Self::Inch => Decimal::new(254, 4),
            Self::Foot => Decimal::new(3048, 4),
            Self::Yard => Decimal::new(9144, 4),
            Self::Mile => Decimal::new(160934, 2),
            Self::Milligram => Decimal::new(1, 6),
            Self::Pound => Decimal::new(453592, 6),
            Self::Ounce => Decimal::new(283495, 7),
            Self::Pyeong => Decimal::new(3305785, 6),
            Self::Celsius | Self::Fahrenheit | Self::Kelvin => return None,
        };
        Some(factor)
    }
}

impl fmt::Display for Unit {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnitError::UnknownUnit(s.trim().to_string()))
    }
}

/// Converts `value` from one unit to another of the same kind.
///
/// # Errors
///
/// * [`UnitError::IncompatibleUnits`] when the units measure different
///   quantities.
/// * [`UnitError::OutOfRange`] when the converted value does not fit in a
///   `Decimal`.
pub fn convert(
    value: Decimal,
    from: Unit,
    to: Unit,
) -> Result<Decimal, UnitError> {
    if from.kind() != to.kind() {
        return Err(UnitError::IncompatibleUnits {
            from,
            from_kind: from.kind(),
            to,
            to_kind: to.kind(),
        });
    }

    let converted = match (from.factor(), to.factor()) {
        (Some(from_factor), Some(to_factor)) => value
            .checked_mul(from_factor)
            .and_then(|base| base.checked_div(to_factor)),
        _ => to_celsius(value, from).and_then(|celsius| from_celsius(celsius, to)),
    };

    converted
        .map(round_half_up)
        .ok_or(UnitError::OutOfRange { value, from, to })
}

fn to_celsius(
    value: Decimal,
    unit: Unit,
) -> Option<Decimal> {
    match unit {
        Unit::Fahrenheit => value
            .checked_sub(Decimal::from(32))?
            .checked_mul(Decimal::from(5))?
            .checked_div(Decimal::from(9)),
        Unit::Kelvin => value.checked_sub(kelvin_offset()),
        _ => Some(value),
    }
}

fn from_celsius(
    celsius: Decimal,
    unit: Unit,
) -> Option<Decimal> {
    match unit {
        Unit::Fahrenheit => celsius
            .checked_mul(Decimal::from(9))?
            .checked_div(Decimal::from(5))?
            .checked_add(Decimal::from(32)),
        Unit::Kelvin => celsius.checked_add(kelvin_offset()),
        _ => Some(celsius),
    }
}

fn kelvin_offset() -> Decimal {
    Decimal::new(27315, 2)
}
