//! Core data models for the Contract Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod contract;
mod document;
mod period;
mod rate;

pub use contract::{Contract, ContractTerms, Party, Side, SideTerms};
pub use document::{
    AuditStep, AuditTrace, AuditWarning, DocumentFigures, DocumentKind, Settlement,
};
pub use period::{
    DateRange, ISO_DATE_FORMAT, MonthOffset, PaymentDay, PaymentTerm, RANGE_SEPARATOR, RangeText,
};
pub use rate::{RateInput, RateOutput, RoundType, SplitPolicy};
