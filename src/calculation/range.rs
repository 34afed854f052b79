//! Billing period range formatting.
//!
//! Contract periods are stored and printed as `"{from}~{to}"`. Parsing is
//! lenient: the text is split on `~` without validating either half, and a
//! missing separator leaves `to` empty. Use [`DateRange`]'s `FromStr` for
//! strict parsing.
//!
//! [`DateRange`]: crate::models::DateRange

use chrono::NaiveDate;

use crate::models::{ISO_DATE_FORMAT, RANGE_SEPARATOR, RangeText};

/// Formats two dates as a range string.
///
/// # Examples
///
/// ```
/// use contract_engine::calculation::format_range;
/// use chrono::NaiveDate;
///
/// let from = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let to = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
/// assert_eq!(format_range(from, to), "2024-06-01~2024-06-30");
/// ```
pub fn format_range(from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "{}{}{}",
        from.format(ISO_DATE_FORMAT),
        RANGE_SEPARATOR,
        to.format(ISO_DATE_FORMAT)
    )
}

/// Splits a range string into its two halves.
///
/// `from` is the text before the first `~` (the whole text if there is none),
/// `to` is the text between the first and second `~`. Anything after a
/// second `~` is ignored.
///
/// # Examples
///
/// ```
/// use contract_engine::calculation::parse_range;
///
/// let range = parse_range("2024-06-01~2024-06-30");
/// assert_eq!(range.from, "2024-06-01");
/// assert_eq!(range.to.as_deref(), Some("2024-06-30"));
///
/// let open = parse_range("2024-06-01");
/// assert_eq!(open.to, None);
/// ```
pub fn parse_range(text: &str) -> RangeText {
    let mut parts = text.split(RANGE_SEPARATOR);
    RangeText {
        from: parts.next().unwrap_or_default().to_string(),
        to: parts.next().map(str::to_string),
    }
}
