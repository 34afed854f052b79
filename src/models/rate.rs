//! Rate calculation models.
//!
//! This module contains the rounding and split policies applied when deriving
//! over/under unit rates from a monthly price, along with the [`RateInput`] and
//! [`RateOutput`] value types.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

const HALF: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// How a scaled quotient is rounded to a whole number.
///
/// # Example
///
/// ```
/// use contract_engine::models::RoundType;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let value = Decimal::from_str("428.57").unwrap();
/// assert_eq!(RoundType::Round.apply(value), Decimal::from(429));
/// assert_eq!(RoundType::Floor.apply(value), Decimal::from(428));
/// assert_eq!(RoundType::Ceil.apply(value), Decimal::from(429));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundType {
    /// Round to nearest, with halves rounded toward positive infinity.
    Round,
    /// Round toward negative infinity.
    Floor,
    /// Round toward positive infinity.
    Ceil,
}

impl RoundType {
    /// Rounds `value` to a whole number according to this rounding type.
    ///
    /// `Round` rounds halves up (`-2.5` becomes `-2`), matching the rounding
    /// the billing spreadsheets have always used.
    pub fn apply(self, value: Decimal) -> Decimal {
        match self {
            RoundType::Round => value
                .checked_add(HALF)
                .map(|v| v.floor())
                .unwrap_or_else(|| value.floor()),
            RoundType::Floor => value.floor(),
            RoundType::Ceil => value.ceil(),
        }
    }

    /// Returns the wire name of this rounding type.
    pub fn as_str(self) -> &'static str {
        match self {
            RoundType::Round => "round",
            RoundType::Floor => "floor",
            RoundType::Ceil => "ceil",
        }
    }
}

impl fmt::Display for RoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round" => Ok(RoundType::Round),
            "floor" => Ok(RoundType::Floor),
            "ceil" => Ok(RoundType::Ceil),
            other => Err(EngineError::InvalidTerms {
                field: "round_type".to_string(),
                message: format!("unknown rounding type '{}'", other),
            }),
        }
    }
}

/// How the monthly price is split into over and under unit rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SplitPolicy {
    /// Over rate divides by the upper bound, under rate by the lower bound.
    HighLow,
    /// Both rates divide by the midpoint of the hour band.
    Center,
    /// Rates are supplied explicitly by the contract.
    Other,
}

impl SplitPolicy {
    /// Returns the wire name of this split policy.
    pub fn as_str(self) -> &'static str {
        match self {
            SplitPolicy::HighLow => "highLow",
            SplitPolicy::Center => "center",
            SplitPolicy::Other => "other",
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitPolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highLow" => Ok(SplitPolicy::HighLow),
            "center" => Ok(SplitPolicy::Center),
            "other" => Ok(SplitPolicy::Other),
            other => Err(EngineError::InvalidTerms {
                field: "split_policy".to_string(),
                message: format!("unknown split policy '{}'", other),
            }),
        }
    }
}

/// Inputs to a single over/under rate calculation.
///
/// # Example
///
/// ```
/// use contract_engine::models::{RateInput, RoundType, SplitPolicy};
/// use rust_decimal::Decimal;
///
/// let input = RateInput {
///     base_price: Decimal::from(600_000),
///     hour_from: Decimal::from(140),
///     hour_to: Decimal::from(180),
///     round_type: RoundType::Round,
///     round_digit: 1,
///     split_policy: SplitPolicy::HighLow,
/// };
/// assert_eq!(input.hour_from, Decimal::from(140));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateInput {
    /// The monthly price for the contract.
    pub base_price: Decimal,
    /// Lower bound of the hour band; working less is charged at the under rate.
    pub hour_from: Decimal,
    /// Upper bound of the hour band; working more is charged at the over rate.
    pub hour_to: Decimal,
    /// Rounding applied to the scaled quotient.
    pub round_type: RoundType,
    /// Number of low-order digits zeroed out (rates are multiples of `10^round_digit`).
    pub round_digit: u32,
    /// How the price is split across the hour band.
    pub split_policy: SplitPolicy,
}

/// Over and under unit rates.
///
/// Both values are whole numbers and multiples of `10^round_digit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateOutput {
    /// Rate charged per hour worked above the band.
    pub over_price: Decimal,
    /// Rate deducted per hour worked below the band.
    pub under_price: Decimal,
}

impl RateOutput {
    /// A rate pair with both rates set to zero.
    pub const ZERO: RateOutput = RateOutput {
        over_price: Decimal::ZERO,
        under_price: Decimal::ZERO,
    };
}
