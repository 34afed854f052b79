//! Configuration types for the Contract Engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{ContractTerms, DocumentKind, RoundType, Side, SplitPolicy};

/// Default billing terms offered when a new contract is entered.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractDefaults {
    /// Default lower bound of the hour band.
    pub hour_from: Decimal,
    /// Default upper bound of the hour band.
    pub hour_to: Decimal,
    /// Default rounding type for unit rates.
    pub round_type: RoundType,
    /// Default number of low-order digits zeroed out in unit rates.
    pub round_digit: u32,
    /// Default split policy.
    pub split_policy: SplitPolicy,
    /// Default payment term text.
    #[serde(default)]
    pub payment_term: String,
}

impl ContractDefaults {
    /// Builds contract terms from these defaults with the given monthly price.
    pub fn terms(&self, base_price: Decimal) -> ContractTerms {
        ContractTerms {
            base_price,
            hour_from: self.hour_from,
            hour_to: self.hour_to,
            round_type: self.round_type,
            round_digit: self.round_digit,
            split_policy: self.split_policy,
            explicit_rates: None,
            payment_term: self.payment_term.clone(),
        }
    }
}

/// Settings for one kind of document.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSettings {
    /// Title printed in the document header.
    pub title: String,
    /// Which side of the contract the document is addressed to.
    pub side: Side,
    /// Whether the document prints a payment due date.
    #[serde(default = "default_print_payment_due")]
    pub print_payment_due: bool,
}

fn default_print_payment_due() -> bool {
    true
}

/// Documents configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsConfig {
    /// Map of document kind to its settings.
    pub documents: HashMap<DocumentKind, DocumentSettings>,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    defaults: ContractDefaults,
    documents: HashMap<DocumentKind, DocumentSettings>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        defaults: ContractDefaults,
        documents: HashMap<DocumentKind, DocumentSettings>,
    ) -> Self {
        Self {
            defaults,
            documents,
        }
    }

    /// Returns the default contract terms.
    pub fn defaults(&self) -> &ContractDefaults {
        &self.defaults
    }

    /// Returns all document settings.
    pub fn documents(&self) -> &HashMap<DocumentKind, DocumentSettings> {
        &self.documents
    }
}
