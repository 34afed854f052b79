//! Contract model and related types.
//!
//! A contract binds a worker to two counterparties: the client company billed
//! for the work (the claim side) and the subcontractor company paid for it
//! (the order side). Each side carries its own billing terms.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DateRange, RateInput, RateOutput, RoundType, SplitPolicy};
use crate::error::{EngineError, EngineResult};

/// Which counterparty of a contract a document is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The client side, billed for the worker's time.
    Claim,
    /// The subcontractor side, paid for the worker's time.
    Order,
}

/// A company and the sales representative handling the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Company name.
    pub company: String,
    /// Sales representative at the company.
    #[serde(default)]
    pub sales_rep: String,
}

/// Billing terms for one side of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTerms {
    /// The monthly price.
    pub base_price: Decimal,
    /// Lower bound of the hour band.
    pub hour_from: Decimal,
    /// Upper bound of the hour band.
    pub hour_to: Decimal,
    /// Rounding applied to unit rates.
    pub round_type: RoundType,
    /// Number of low-order digits zeroed out in unit rates.
    pub round_digit: u32,
    /// How the price is split across the hour band.
    pub split_policy: SplitPolicy,
    /// Rates agreed explicitly, used with [`SplitPolicy::Other`].
    #[serde(default)]
    pub explicit_rates: Option<RateOutput>,
    /// Free-text payment term, e.g. "月末締め翌月末" or "2024-07-31".
    #[serde(default)]
    pub payment_term: String,
}

impl ContractTerms {
    /// Builds the rate calculation input for these terms.
    pub fn rate_input(&self) -> RateInput {
        RateInput {
            base_price: self.base_price,
            hour_from: self.hour_from,
            hour_to: self.hour_to,
            round_type: self.round_type,
            round_digit: self.round_digit,
            split_policy: self.split_policy,
        }
    }

    /// Checks that the terms are internally consistent.
    ///
    /// The calculations accept any terms; this check is for callers that
    /// want to reject nonsensical input before it is stored.
    ///
    /// # Example
    ///
    /// ```
    /// use contract_engine::models::{ContractTerms, RoundType, SplitPolicy};
    /// use rust_decimal::Decimal;
    ///
    /// let terms = ContractTerms {
    ///     base_price: Decimal::from(600_000),
    ///     hour_from: Decimal::from(180),
    ///     hour_to: Decimal::from(140),
    ///     round_type: RoundType::Round,
    ///     round_digit: 1,
    ///     split_policy: SplitPolicy::HighLow,
    ///     explicit_rates: None,
    ///     payment_term: String::new(),
    /// };
    /// assert!(terms.validate().is_err());
    /// ```
    pub fn validate(&self) -> EngineResult<()> {
        if self.base_price < Decimal::ZERO {
            return Err(invalid("base_price", "must not be negative"));
        }
        if self.hour_from <= Decimal::ZERO {
            return Err(invalid("hour_from", "must be positive"));
        }
        if self.hour_to < self.hour_from {
            return Err(invalid("hour_to", "must not be below hour_from"));
        }
        if self.split_policy == SplitPolicy::Other && self.explicit_rates.is_none() {
            return Err(invalid(
                "explicit_rates",
                "required when split policy is 'other'",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::InvalidTerms {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// One side of a contract: the counterparty and its terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideTerms {
    /// The counterparty.
    pub party: Party,
    /// Billing terms agreed with the counterparty.
    pub terms: ContractTerms,
}

/// A staffing contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Unique identifier for the contract.
    pub id: String,
    /// Name of the worker placed under the contract.
    pub worker: String,
    /// Client side.
    pub claim: SideTerms,
    /// Subcontractor side.
    pub order: SideTerms,
    /// Billing period.
    pub period: DateRange,
}

impl Contract {
    /// Returns the counterparty and terms for the given side.
    pub fn side(&self, side: Side) -> &SideTerms {
        match side {
            Side::Claim => &self.claim,
            Side::Order => &self.order,
        }
    }
}
