//! Payment due date resolution.
//!
//! Payment terms are written free-form on contracts: an explicit date
//! ("2024-07-31"), a closing/payment description ("月末締め翌月10日",
//! "20日締め翌々月末") or a net-days description ("60日サイト"). Resolution is
//! split in two steps: [`parse_payment_term`] turns the text into a
//! [`PaymentTerm`], and [`resolve_term`] does the calendar arithmetic relative
//! to an explicit `today`.

use chrono::{Datelike, Local, NaiveDate, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::models::{ISO_DATE_FORMAT, MonthOffset, PaymentDay, PaymentTerm};

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}[-/][0-9]{2}[-/][0-9]{2}$").expect("valid regex"));

static MONTH_CLOSING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<closing>翌々月|再来月|翌月|来月|当月|月)?(?:末|[0-9]+日)?締め(?P<payment>翌々月|再来月|翌月|来月|当月|月)?(?P<day>[0-9]+|末)",
    )
    .expect("valid regex")
});

static NET_DAYS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<days>[0-9]+)日サイト").expect("valid regex"));

/// Parses a free-form payment term.
///
/// An explicit date takes priority over everything else and is returned with
/// slashes normalized to dashes. Otherwise the closing/payment form is tried
/// before the net-days form. Text matching neither is
/// [`PaymentTerm::Unrecognized`].
///
/// # Examples
///
/// ```
/// use contract_engine::calculation::parse_payment_term;
/// use contract_engine::models::PaymentTerm;
///
/// assert_eq!(
///     parse_payment_term("2024/03/15"),
///     PaymentTerm::Date { date: "2024-03-15".to_string() }
/// );
/// assert_eq!(parse_payment_term("45日サイト"), PaymentTerm::NetDays { days: 45 });
/// assert_eq!(parse_payment_term("garbage text"), PaymentTerm::Unrecognized);
/// ```
pub fn parse_payment_term(expression: &str) -> PaymentTerm {
    let expression = expression.trim();

    if ISO_DATE.is_match(expression) {
        return PaymentTerm::Date {
            date: expression.replace('/', "-"),
        };
    }

    if let Some(caps) = MONTH_CLOSING.captures(expression) {
        let day = match &caps["day"] {
            "末" => Some(PaymentDay::EndOfMonth),
            digits => digits.parse().ok().map(PaymentDay::Day),
        };
        if let Some(day) = day {
            return PaymentTerm::MonthClosing {
                closing: caps
                    .name("closing")
                    .and_then(|m| MonthOffset::from_token(m.as_str())),
                payment: caps
                    .name("payment")
                    .and_then(|m| MonthOffset::from_token(m.as_str())),
                day,
            };
        }
    }

    if let Some(caps) = NET_DAYS.captures(expression) {
        if let Ok(days) = caps["days"].parse() {
            return PaymentTerm::NetDays { days };
        }
    }

    PaymentTerm::Unrecognized
}

/// Builds a date from a possibly out-of-range month and day.
///
/// `month0` is zero-based and may be any value: 12 is January of the next
/// year, -1 is December of the previous year. `day` may also overflow: 0 is
/// the last day of the previous month, 32 runs into the next month. Returns
/// `None` only when the result is outside chrono's supported range.
///
/// # Examples
///
/// ```
/// use contract_engine::calculation::roll_date;
/// use chrono::NaiveDate;
///
/// // Day 0 of September is the last day of August.
/// assert_eq!(roll_date(2024, 8, 0), NaiveDate::from_ymd_opt(2024, 8, 31));
/// // Month 13 is February of the next year.
/// assert_eq!(roll_date(2024, 13, 10), NaiveDate::from_ymd_opt(2025, 2, 10));
/// ```
pub fn roll_date(year: i32, month0: i64, day: i64) -> Option<NaiveDate> {
    let year = i64::from(year).checked_add(month0.div_euclid(12))?;
    let month = u32::try_from(month0.rem_euclid(12)).ok()? + 1;
    let first = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, 1)?;
    first.checked_add_signed(TimeDelta::try_days(day.checked_sub(1)?)?)
}

/// Resolves a parsed payment term to a date relative to `today`.
///
/// - `MonthClosing`: the captured day in the payment month (current month
///   plus the payment token's offset). `末` is the last day of that month.
/// - `NetDays`: a multiple of 30 moves whole months and lands on the last day
///   of the month before the one reached; any other count adds plain days to
///   today's day of month.
/// - `Date` resolves to the parsed date, or `None` if the text isn't a real
///   calendar date.
/// - `Unrecognized` resolves to `today`.
pub fn resolve_term(term: &PaymentTerm, today: NaiveDate) -> Option<NaiveDate> {
    let mut month0 = i64::from(today.month0());
    let mut day = i64::from(today.day());

    match term {
        PaymentTerm::Date { date } => {
            return NaiveDate::parse_from_str(date, ISO_DATE_FORMAT).ok();
        }
        PaymentTerm::MonthClosing { payment, day: payment_day, .. } => {
            month0 += payment.map_or(0, MonthOffset::months);
            match payment_day {
                PaymentDay::Day(d) => day = i64::from(*d),
                PaymentDay::EndOfMonth => {
                    month0 += 1;
                    day = 0;
                }
            }
        }
        PaymentTerm::NetDays { days } => {
            let days = i64::from(*days);
            if days % 30 == 0 {
                month0 += days / 30;
                day = 0;
            } else {
                day += days;
            }
        }
        PaymentTerm::Unrecognized => return Some(today),
    }

    roll_date(today.year(), month0, day)
}

/// Resolves a free-form payment term to a `YYYY-MM-DD` date string.
///
/// An explicit date is returned verbatim (slashes normalized to dashes).
/// Anything unrecognized, or arithmetic that leaves the supported calendar,
/// falls back to `today`. This function never fails.
///
/// # Examples
///
/// ```
/// use contract_engine::calculation::resolve_period;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
///
/// assert_eq!(resolve_period("2024/03/15", today), "2024-03-15");
/// assert_eq!(resolve_period("月末締め翌月10日", today), "2024-07-10");
/// assert_eq!(resolve_period("60日サイト", today), "2024-07-31");
/// assert_eq!(resolve_period("garbage text", today), "2024-06-10");
/// ```
pub fn resolve_period(expression: &str, today: NaiveDate) -> String {
    let term = parse_payment_term(expression);

    if let PaymentTerm::Date { date } = term {
        return date;
    }

    let resolved = match resolve_term(&term, today) {
        Some(date) => date,
        None => {
            warn!(expression = %expression, "Payment date out of range, using today");
            today
        }
    };

    if term == PaymentTerm::Unrecognized {
        warn!(expression = %expression, "Unrecognized payment term, using today");
    } else {
        debug!(expression = %expression, resolved = %resolved, "Resolved payment term");
    }

    resolved.format(ISO_DATE_FORMAT).to_string()
}

/// Resolves a payment term relative to the local current date.
pub fn resolve_period_today(expression: &str) -> String {
    resolve_period(expression, Local::now().date_naive())
}
