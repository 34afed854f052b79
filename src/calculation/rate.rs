//! Over/under rate calculation functionality.
//!
//! This module derives the hourly rates charged for time worked above a
//! contract's hour band and deducted for time worked below it. The monthly
//! price is divided by the relevant band bound, scaled down by
//! `10^round_digit`, rounded, and scaled back up.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::{RateInput, RateOutput, RoundType, SplitPolicy};

/// Normalizes a price typed into a form or read from a cell.
///
/// Thousands separators (`,` and `，`) and surrounding whitespace are removed.
/// Empty text is zero. Text that still isn't a number is also zero, with a
/// warning event.
///
/// # Examples
///
/// ```
/// use contract_engine::calculation::normalize_price;
/// use rust_decimal::Decimal;
///
/// assert_eq!(normalize_price("600,000"), Decimal::from(600_000));
/// assert_eq!(normalize_price(""), Decimal::ZERO);
/// assert_eq!(normalize_price("n/a"), Decimal::ZERO);
/// ```
pub fn normalize_price(text: &str) -> Decimal {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '，'))
        .collect();

    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    match Decimal::from_str(&cleaned) {
        Ok(price) => price,
        Err(e) => {
            warn!(input = %text, error = %e, "Unparseable price, using zero");
            Decimal::ZERO
        }
    }
}

/// Calculates the over and under unit rates for a contract.
///
/// The divisors depend on the split policy:
/// - `HighLow` (and `Other`, which falls through to the same arithmetic):
///   the over rate divides by `hour_to`, the under rate by `hour_from`.
/// - `Center`: both divide by the band midpoint, so both rates are equal.
///
/// Each quotient is divided by `10^round_digit`, rounded with `round_type`,
/// and multiplied back, so both rates are multiples of `10^round_digit`.
///
/// This function never fails. A zero divisor makes that rate zero, and a
/// `round_digit` too large to represent makes both rates zero.
///
/// # Examples
///
/// ```
/// use contract_engine::calculation::calc_price;
/// use contract_engine::models::{RateInput, RoundType, SplitPolicy};
/// use rust_decimal::Decimal;
///
/// let rates = calc_price(&RateInput {
///     base_price: Decimal::from(600_000),
///     hour_from: Decimal::from(140),
///     hour_to: Decimal::from(180),
///     round_type: RoundType::Round,
///     round_digit: 1,
///     split_policy: SplitPolicy::HighLow,
/// });
///
/// assert_eq!(rates.over_price, Decimal::from(3330));
/// assert_eq!(rates.under_price, Decimal::from(4290));
/// ```
pub fn calc_price(input: &RateInput) -> RateOutput {
    let (over_divisor, under_divisor) = split_divisors(input);

    let Some(scale) = digit_scale(input.round_digit) else {
        warn!(
            round_digit = input.round_digit,
            "Rounding digit out of range, rates set to zero"
        );
        return RateOutput::ZERO;
    };

    let over_price = round_to_scale(
        quotient(input.base_price, over_divisor, "over"),
        input.round_type,
        scale,
    );
    let under_price = round_to_scale(
        quotient(input.base_price, under_divisor, "under"),
        input.round_type,
        scale,
    );

    debug!(
        base_price = %input.base_price,
        split_policy = %input.split_policy,
        round_type = %input.round_type,
        round_digit = input.round_digit,
        over_price = %over_price,
        under_price = %under_price,
        "Calculated unit rates"
    );

    RateOutput {
        over_price,
        under_price,
    }
}

/// Returns the `(over, under)` divisors for the input's split policy.
pub(crate) fn split_divisors(input: &RateInput) -> (Decimal, Decimal) {
    match input.split_policy {
        SplitPolicy::Center => {
            let midpoint = input
                .hour_from
                .checked_add(input.hour_to)
                .map(|sum| sum / Decimal::TWO)
                .unwrap_or(Decimal::ZERO);
            (midpoint, midpoint)
        }
        SplitPolicy::HighLow | SplitPolicy::Other => (input.hour_to, input.hour_from),
    }
}

/// Returns `10^digit`, or `None` when it doesn't fit in a `Decimal`.
fn digit_scale(digit: u32) -> Option<Decimal> {
    (0..digit).try_fold(Decimal::ONE, |acc, _| acc.checked_mul(Decimal::TEN))
}

fn quotient(price: Decimal, divisor: Decimal, which: &str) -> Decimal {
    if divisor.is_zero() {
        warn!(rate = which, "Zero hour divisor, rate set to zero");
        return Decimal::ZERO;
    }
    price.checked_div(divisor).unwrap_or_else(|| {
        warn!(rate = which, price = %price, divisor = %divisor, "Rate overflow, rate set to zero");
        Decimal::ZERO
    })
}

fn round_to_scale(raw: Decimal, round_type: RoundType, scale: Decimal) -> Decimal {
    raw.checked_div(scale)
        .map(|scaled| round_type.apply(scaled))
        .and_then(|rounded| rounded.checked_mul(scale))
        .unwrap_or(Decimal::ZERO)
}
