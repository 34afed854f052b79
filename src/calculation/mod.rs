//! Calculation logic for the Contract Engine.
//!
//! This module contains the over/under rate calculation, payment term
//! parsing and due date resolution, billing period formatting, settlement
//! against worked hours, and assembly of document figures.

mod document;
mod period;
mod range;
mod rate;
mod settlement;

pub use document::{build_document, prepare_document};
pub use period::{parse_payment_term, resolve_period, resolve_period_today, resolve_term, roll_date};
pub use range::{format_range, parse_range};
pub use rate::{calc_price, normalize_price};
pub use settlement::{SettlementResult, calculate_settlement};
