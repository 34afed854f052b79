//! Payment term and billing period models.
//!
//! A [`PaymentTerm`] is the structured form of a free-text payment description
//! such as "月末締め翌月末" or "60日サイト". A [`DateRange`] is the billing
//! period of a contract, stored as `"{from}~{to}"`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculation::format_range;
use crate::error::EngineError;

/// Date format used for every date the engine renders.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Separator between the two dates of a serialized range.
pub const RANGE_SEPARATOR: char = '~';

/// A month offset token in a payment term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthOffset {
    /// "月" or "当月": the same month.
    Current,
    /// "翌月" or "来月": the following month.
    Next,
    /// "翌々月" or "再来月": two months ahead.
    AfterNext,
}

impl MonthOffset {
    /// Parses a month token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "月" | "当月" => Some(MonthOffset::Current),
            "翌月" | "来月" => Some(MonthOffset::Next),
            "翌々月" | "再来月" => Some(MonthOffset::AfterNext),
            _ => None,
        }
    }

    /// Number of months this offset adds.
    pub fn months(self) -> i64 {
        match self {
            MonthOffset::Current => 0,
            MonthOffset::Next => 1,
            MonthOffset::AfterNext => 2,
        }
    }
}

/// The day of the month a payment falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDay {
    /// A calendar day number. Values past the end of the month roll forward.
    Day(u32),
    /// "末": the last day of the payment month.
    EndOfMonth,
}

/// A parsed payment term.
///
/// # Example
///
/// ```
/// use contract_engine::calculation::parse_payment_term;
/// use contract_engine::models::{MonthOffset, PaymentDay, PaymentTerm};
///
/// let term = parse_payment_term("月末締め翌月10日");
/// assert_eq!(
///     term,
///     PaymentTerm::MonthClosing {
///         closing: Some(MonthOffset::Current),
///         payment: Some(MonthOffset::Next),
///         day: PaymentDay::Day(10),
///     }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentTerm {
    /// An explicit date, already normalized to `YYYY-MM-DD`.
    Date {
        /// The normalized date text.
        date: String,
    },
    /// A closing/payment description ("月末締め翌月10日").
    MonthClosing {
        /// The closing month token. Only its presence matters.
        closing: Option<MonthOffset>,
        /// The payment month token; `None` means the current month.
        payment: Option<MonthOffset>,
        /// The payment day.
        day: PaymentDay,
    },
    /// A net-days description ("60日サイト").
    NetDays {
        /// Number of days after today.
        days: u32,
    },
    /// Text that matched no known form.
    Unrecognized,
}

/// The billing period of a contract.
///
/// Serialized as `"{from}~{to}"`, the same text shown on documents.
///
/// # Example
///
/// ```
/// use contract_engine::models::DateRange;
/// use chrono::NaiveDate;
///
/// let range = DateRange {
///     from: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
///     to: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
/// };
/// assert_eq!(range.to_string(), "2024-06-01~2024-06-30");
/// assert_eq!("2024-06-01~2024-06-30".parse::<DateRange>().unwrap(), range);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateRange {
    /// First day of the period.
    pub from: NaiveDate,
    /// Last day of the period.
    pub to: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_range(self.from, self.to))
    }
}

impl FromStr for DateRange {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| EngineError::InvalidRange {
            input: s.to_string(),
            message: message.to_string(),
        };

        let (from, to) = s
            .split_once(RANGE_SEPARATOR)
            .ok_or_else(|| invalid("missing '~' separator"))?;
        if to.contains(RANGE_SEPARATOR) {
            return Err(invalid("more than one '~' separator"));
        }

        let from = NaiveDate::parse_from_str(from.trim(), ISO_DATE_FORMAT)
            .map_err(|e| invalid(&format!("bad start date: {}", e)))?;
        let to = NaiveDate::parse_from_str(to.trim(), ISO_DATE_FORMAT)
            .map_err(|e| invalid(&format!("bad end date: {}", e)))?;

        Ok(DateRange { from, to })
    }
}

impl TryFrom<String> for DateRange {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateRange> for String {
    fn from(range: DateRange) -> Self {
        range.to_string()
    }
}

/// The lenient result of splitting a range string.
///
/// `to` is `None` when the text has no separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeText {
    /// Text before the first separator.
    pub from: String,
    /// Text between the first and second separators, if any.
    pub to: Option<String>,
}
