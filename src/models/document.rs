//! Document figure models for the Contract Engine.
//!
//! This module contains the [`DocumentFigures`] type and its associated
//! structures: the numbers written into an invoice, purchase order or quote,
//! together with the audit trace explaining how each number was derived.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Party, RateOutput};

/// The kind of document being generated.
///
/// # Example
///
/// ```
/// use contract_engine::models::DocumentKind;
///
/// assert_eq!(DocumentKind::PurchaseOrder.to_string(), "purchase_order");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// 請求書, sent to the client.
    Invoice,
    /// 注文書, sent to the subcontractor.
    PurchaseOrder,
    /// 見積書, sent to the client before the contract starts.
    Quote,
}

impl DocumentKind {
    /// Returns the wire name of this document kind.
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::PurchaseOrder => "purchase_order",
            DocumentKind::Quote => "quote",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The monthly amount after adjusting for hours worked outside the band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Hours actually worked in the period.
    pub worked_hours: Decimal,
    /// Hours worked above the upper bound.
    pub over_hours: Decimal,
    /// Hours short of the lower bound.
    pub under_hours: Decimal,
    /// Amount added for over hours.
    pub over_amount: Decimal,
    /// Amount deducted for under hours.
    pub under_amount: Decimal,
    /// Base price plus over amount minus under amount.
    pub total: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag input that was degraded to a default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        }
    }
}

/// The complete audit trace for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// Everything a document template needs, already computed.
///
/// # Example
///
/// ```
/// use contract_engine::models::{AuditTrace, DocumentFigures, DocumentKind, Party, RateOutput};
/// use chrono::Utc;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let figures = DocumentFigures {
///     document_id: Uuid::new_v4(),
///     generated_at: Utc::now(),
///     engine_version: "0.1.0".to_string(),
///     kind: DocumentKind::Invoice,
///     title: "請求書".to_string(),
///     contract_id: "ct_001".to_string(),
///     worker: "Tanaka".to_string(),
///     counterparty: Party {
///         company: "Client Co.".to_string(),
///         sales_rep: "Sato".to_string(),
///     },
///     period: "2024-06-01~2024-06-30".to_string(),
///     payment_due: Some("2024-07-31".to_string()),
///     base_price: Decimal::from(600_000),
///     rates: RateOutput::ZERO,
///     settlement: None,
///     audit_trace: AuditTrace {
///         steps: vec![],
///         warnings: vec![],
///         duration_us: 0,
///     },
/// };
/// assert_eq!(figures.amount_due(), Decimal::from(600_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFigures {
    /// Unique identifier for this document.
    pub document_id: Uuid,
    /// When the figures were computed.
    pub generated_at: DateTime<Utc>,
    /// The version of the engine that computed the figures.
    pub engine_version: String,
    /// The kind of document.
    pub kind: DocumentKind,
    /// The document title printed in the header.
    pub title: String,
    /// The contract the document is for.
    pub contract_id: String,
    /// The worker placed under the contract.
    pub worker: String,
    /// The company the document is addressed to.
    pub counterparty: Party,
    /// The billing period as `"{from}~{to}"`.
    pub period: String,
    /// Payment due date, when the document kind prints one.
    pub payment_due: Option<String>,
    /// The monthly price.
    pub base_price: Decimal,
    /// Over and under unit rates.
    pub rates: RateOutput,
    /// Settlement against worked hours, when hours were supplied.
    pub settlement: Option<Settlement>,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl DocumentFigures {
    /// The amount printed as the document total.
    ///
    /// This is the settled total when hours were supplied, and the base
    /// price otherwise.
    pub fn amount_due(&self) -> Decimal {
        self.settlement
            .as_ref()
            .map_or(self.base_price, |s| s.total)
    }
}
