//! Document figure assembly.
//!
//! Invoices, purchase orders and quotes all print the same kinds of numbers:
//! the monthly price, the over/under unit rates, optionally a settlement
//! against worked hours, the billing period and the payment due date. This
//! module computes them for one side of a contract and records every step in
//! an audit trace.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use super::period::{parse_payment_term, resolve_period};
use super::range::format_range;
use super::rate::{calc_price, split_divisors};
use super::settlement::calculate_settlement;
use crate::config::{ConfigLoader, DocumentSettings};
use crate::error::EngineResult;
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, Contract, ContractTerms, DocumentFigures, DocumentKind,
    PaymentTerm, RateOutput, SplitPolicy,
};

/// Computes the figures for a document of the given kind.
///
/// The side of the contract is taken from `settings`. The settlement is
/// included only when `worked_hours` is supplied, and the payment due date
/// only when the document kind prints one. Degenerate terms never fail the
/// build; they produce warnings in the audit trace.
///
/// # Arguments
///
/// * `contract` - The contract the document is for
/// * `kind` - The kind of document
/// * `settings` - Settings for that document kind
/// * `worked_hours` - Hours worked in the period, if known
/// * `today` - The reference date for payment term resolution
pub fn build_document(
    contract: &Contract,
    kind: DocumentKind,
    settings: &DocumentSettings,
    worked_hours: Option<Decimal>,
    today: NaiveDate,
) -> DocumentFigures {
    let start_time = Instant::now();
    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut step_number: u32 = 1;

    let side = contract.side(settings.side);
    let terms = &side.terms;

    let (rates, rate_step) = unit_rates(terms, step_number, &mut warnings);
    steps.push(rate_step);
    step_number += 1;

    let settlement = worked_hours.map(|hours| {
        let result = calculate_settlement(terms, &rates, hours, step_number);
        steps.push(result.audit_step);
        warnings.extend(result.warning);
        step_number += 1;
        result.settlement
    });

    let payment_due = if settings.print_payment_due {
        let (due, step) = payment_due(terms, today, step_number, &mut warnings);
        steps.push(step);
        step_number += 1;
        Some(due)
    } else {
        None
    };

    let period = format_range(contract.period.from, contract.period.to);
    steps.push(AuditStep {
        step_number,
        rule_id: "billing_period".to_string(),
        rule_name: "Billing Period".to_string(),
        input: serde_json::json!({
            "from": contract.period.from.to_string(),
            "to": contract.period.to.to_string()
        }),
        output: serde_json::json!({ "period": period }),
        reasoning: format!("Billing period printed as {}", period),
    });

    let duration_us = start_time.elapsed().as_micros() as u64;

    let figures = DocumentFigures {
        document_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        kind,
        title: settings.title.clone(),
        contract_id: contract.id.clone(),
        worker: contract.worker.clone(),
        counterparty: side.party.clone(),
        period,
        payment_due,
        base_price: terms.base_price,
        rates,
        settlement,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us,
        },
    };

    info!(
        document_id = %figures.document_id,
        contract_id = %figures.contract_id,
        kind = %kind,
        amount_due = %figures.amount_due(),
        warnings = figures.audit_trace.warnings.len(),
        duration_us,
        "Document figures assembled"
    );

    figures
}

/// Looks up the settings for `kind` and computes the document figures.
///
/// Returns `DocumentNotConfigured` if the configuration has no settings for
/// the kind.
///
/// # Example
///
/// ```no_run
/// use contract_engine::calculation::prepare_document;
/// use contract_engine::config::ConfigLoader;
/// use contract_engine::models::{Contract, DocumentKind};
/// use chrono::Local;
///
/// # fn load_contract() -> Contract { unimplemented!() }
/// let config = ConfigLoader::load("./config/default")?;
/// let contract = load_contract();
/// let figures = prepare_document(
///     &config,
///     &contract,
///     DocumentKind::Invoice,
///     None,
///     Local::now().date_naive(),
/// )?;
/// println!("{} due {:?}", figures.amount_due(), figures.payment_due);
/// # Ok::<(), contract_engine::error::EngineError>(())
/// ```
pub fn prepare_document(
    config: &ConfigLoader,
    contract: &Contract,
    kind: DocumentKind,
    worked_hours: Option<Decimal>,
    today: NaiveDate,
) -> EngineResult<DocumentFigures> {
    let settings = config.document(kind)?;
    Ok(build_document(contract, kind, settings, worked_hours, today))
}

fn unit_rates(
    terms: &ContractTerms,
    step_number: u32,
    warnings: &mut Vec<AuditWarning>,
) -> (RateOutput, AuditStep) {
    if terms.split_policy == SplitPolicy::Other {
        if let Some(rates) = terms.explicit_rates {
            let step = AuditStep {
                step_number,
                rule_id: "unit_rates".to_string(),
                rule_name: "Unit Rates".to_string(),
                input: serde_json::json!({
                    "split_policy": terms.split_policy.as_str(),
                    "explicit_over_price": rates.over_price.normalize().to_string(),
                    "explicit_under_price": rates.under_price.normalize().to_string()
                }),
                output: serde_json::json!({
                    "over_price": rates.over_price.normalize().to_string(),
                    "under_price": rates.under_price.normalize().to_string(),
                    "source": "explicit"
                }),
                reasoning: format!(
                    "Using agreed rates: over {}, under {}",
                    rates.over_price.normalize(),
                    rates.under_price.normalize()
                ),
            };
            return (rates, step);
        }

        warn!("Split policy 'other' without explicit rates, falling back to highLow");
        warnings.push(AuditWarning::new(
            "missing_explicit_rates",
            "Split policy 'other' has no explicit rates; rates computed as highLow",
            "medium",
        ));
    }

    let input = terms.rate_input();
    let (over_divisor, under_divisor) = split_divisors(&input);
    if over_divisor.is_zero() {
        warnings.push(AuditWarning::new(
            "zero_over_divisor",
            "Hour band gives a zero divisor for the over rate; over rate set to 0",
            "high",
        ));
    }
    if under_divisor.is_zero() {
        warnings.push(AuditWarning::new(
            "zero_under_divisor",
            "Hour band gives a zero divisor for the under rate; under rate set to 0",
            "high",
        ));
    }

    let rates = calc_price(&input);

    let step = AuditStep {
        step_number,
        rule_id: "unit_rates".to_string(),
        rule_name: "Unit Rates".to_string(),
        input: serde_json::json!({
            "base_price": input.base_price.normalize().to_string(),
            "hour_from": input.hour_from.normalize().to_string(),
            "hour_to": input.hour_to.normalize().to_string(),
            "split_policy": input.split_policy.as_str(),
            "round_type": input.round_type.as_str(),
            "round_digit": input.round_digit
        }),
        output: serde_json::json!({
            "over_price": rates.over_price.normalize().to_string(),
            "under_price": rates.under_price.normalize().to_string(),
            "over_divisor": over_divisor.normalize().to_string(),
            "under_divisor": under_divisor.normalize().to_string(),
            "source": "calculated"
        }),
        reasoning: format!(
            "{} / {} -> over {}, {} / {} -> under {} ({} to 10^{})",
            input.base_price.normalize(),
            over_divisor.normalize(),
            rates.over_price.normalize(),
            input.base_price.normalize(),
            under_divisor.normalize(),
            rates.under_price.normalize(),
            input.round_type,
            input.round_digit
        ),
    };

    (rates, step)
}

fn payment_due(
    terms: &ContractTerms,
    today: NaiveDate,
    step_number: u32,
    warnings: &mut Vec<AuditWarning>,
) -> (String, AuditStep) {
    let term = parse_payment_term(&terms.payment_term);
    let due = resolve_period(&terms.payment_term, today);

    let reasoning = match &term {
        PaymentTerm::Date { .. } => format!("Explicit payment date {}", due),
        PaymentTerm::MonthClosing { .. } => {
            format!("'{}' resolves to {}", terms.payment_term, due)
        }
        PaymentTerm::NetDays { days } => format!("{} days net resolves to {}", days, due),
        PaymentTerm::Unrecognized => {
            warnings.push(AuditWarning::new(
                "unrecognized_payment_term",
                format!(
                    "Payment term '{}' not recognized; due date set to {}",
                    terms.payment_term, due
                ),
                "medium",
            ));
            format!("Unrecognized payment term, using {}", due)
        }
    };

    let step = AuditStep {
        step_number,
        rule_id: "payment_due".to_string(),
        rule_name: "Payment Due Date".to_string(),
        input: serde_json::json!({
            "payment_term": terms.payment_term,
            "today": today.to_string()
        }),
        output: serde_json::json!({
            "term": term,
            "payment_due": due
        }),
        reasoning,
    };

    (due, step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateRange, Party, RoundType, Side, SideTerms};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_terms(base_price: &str, payment_term: &str) -> ContractTerms {
        ContractTerms {
            base_price: dec(base_price),
            hour_from: dec("140"),
            hour_to: dec("180"),
            round_type: RoundType::Round,
            round_digit: 1,
            split_policy: SplitPolicy::HighLow,
            explicit_rates: None,
            payment_term: payment_term.to_string(),
        }
    }

    fn create_test_contract() -> Contract {
        Contract {
            id: "ct_001".to_string(),
            worker: "Tanaka".to_string(),
            claim: SideTerms {
                party: Party {
                    company: "Client Co.".to_string(),
                    sales_rep: "Sato".to_string(),
                },
                terms: create_test_terms("600000", "月末締め翌月末"),
            },
            order: SideTerms {
                party: Party {
                    company: "Partner Co.".to_string(),
                    sales_rep: "Suzuki".to_string(),
                },
                terms: create_test_terms("500000", "60日サイト"),
            },
            period: DateRange {
                from: date(2024, 6, 1),
                to: date(2024, 6, 30),
            },
        }
    }

    fn settings(side: Side, print_payment_due: bool) -> DocumentSettings {
        DocumentSettings {
            title: "請求書".to_string(),
            side,
            print_payment_due,
        }
    }

    #[test]
    fn test_invoice_uses_claim_side() {
        let figures = build_document(
            &create_test_contract(),
            DocumentKind::Invoice,
            &settings(Side::Claim, true),
            None,
            date(2024, 6, 10),
        );

        assert_eq!(figures.counterparty.company, "Client Co.");
        assert_eq!(figures.base_price, dec("600000"));
        assert_eq!(figures.rates.over_price, dec("3330"));
        assert_eq!(figures.rates.under_price, dec("4290"));
        assert_eq!(figures.payment_due.as_deref(), Some("2024-07-31"));
        assert_eq!(figures.period, "2024-06-01~2024-06-30");
        assert!(figures.settlement.is_none());
        assert!(figures.audit_trace.warnings.is_empty());
    }

    #[test]
    fn test_purchase_order_uses_order_side() {
        let figures = build_document(
            &create_test_contract(),
            DocumentKind::PurchaseOrder,
            &settings(Side::Order, true),
            None,
            date(2024, 6, 10),
        );

        assert_eq!(figures.counterparty.company, "Partner Co.");
        // 500000 / 180 = 2777.7..., 500000 / 140 = 3571.4...
        assert_eq!(figures.rates.over_price, dec("2780"));
        assert_eq!(figures.rates.under_price, dec("3570"));
        assert_eq!(figures.payment_due.as_deref(), Some("2024-07-31"));
    }

    #[test]
    fn test_worked_hours_add_settlement_step() {
        let figures = build_document(
            &create_test_contract(),
            DocumentKind::Invoice,
            &settings(Side::Claim, true),
            Some(dec("190")),
            date(2024, 6, 10),
        );

        let settlement = figures.settlement.as_ref().unwrap();
        assert_eq!(settlement.total, dec("633300"));
        assert_eq!(figures.amount_due(), dec("633300"));

        let rule_ids: Vec<&str> = figures
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(
            rule_ids,
            vec!["unit_rates", "hour_band_settlement", "payment_due", "billing_period"]
        );
    }

    #[test]
    fn test_steps_are_numbered_sequentially() {
        let figures = build_document(
            &create_test_contract(),
            DocumentKind::Invoice,
            &settings(Side::Claim, true),
            Some(dec("150")),
            date(2024, 6, 10),
        );

        for (i, step) in figures.audit_trace.steps.iter().enumerate() {
            assert_eq!(step.step_number, i as u32 + 1);
        }
    }

    #[test]
    fn test_quote_omits_payment_due() {
        let figures = build_document(
            &create_test_contract(),
            DocumentKind::Quote,
            &settings(Side::Claim, false),
            None,
            date(2024, 6, 10),
        );

        assert!(figures.payment_due.is_none());
        assert!(
            figures
                .audit_trace
                .steps
                .iter()
                .all(|s| s.rule_id != "payment_due")
        );
    }

    #[test]
    fn test_explicit_rates_used_with_other_policy() {
        let mut contract = create_test_contract();
        contract.claim.terms.split_policy = SplitPolicy::Other;
        contract.claim.terms.explicit_rates = Some(RateOutput {
            over_price: dec("3500"),
            under_price: dec("4000"),
        });

        let figures = build_document(
            &contract,
            DocumentKind::Invoice,
            &settings(Side::Claim, true),
            None,
            date(2024, 6, 10),
        );

        assert_eq!(figures.rates.over_price, dec("3500"));
        assert_eq!(figures.rates.under_price, dec("4000"));
        assert_eq!(
            figures.audit_trace.steps[0].output["source"].as_str().unwrap(),
            "explicit"
        );
    }

    #[test]
    fn test_other_policy_without_rates_warns_and_falls_back() {
        let mut contract = create_test_contract();
        contract.claim.terms.split_policy = SplitPolicy::Other;

        let figures = build_document(
            &contract,
            DocumentKind::Invoice,
            &settings(Side::Claim, true),
            None,
            date(2024, 6, 10),
        );

        assert_eq!(figures.rates.over_price, dec("3330"));
        assert!(
            figures
                .audit_trace
                .warnings
                .iter()
                .any(|w| w.code == "missing_explicit_rates")
        );
    }

    #[test]
    fn test_zero_hour_band_warns() {
        let mut contract = create_test_contract();
        contract.claim.terms.hour_to = Decimal::ZERO;

        let figures = build_document(
            &contract,
            DocumentKind::Invoice,
            &settings(Side::Claim, true),
            None,
            date(2024, 6, 10),
        );

        assert_eq!(figures.rates.over_price, Decimal::ZERO);
        let codes: Vec<&str> = figures
            .audit_trace
            .warnings
            .iter()
            .map(|w| w.code.as_str())
            .collect();
        assert_eq!(codes, vec!["zero_over_divisor"]);
    }

    #[test]
    fn test_settlement_overflow_warns_and_keeps_base_price() {
        let mut contract = create_test_contract();
        contract.claim.terms.base_price = Decimal::MAX;

        let figures = build_document(
            &contract,
            DocumentKind::Invoice,
            &settings(Side::Claim, true),
            Some(dec("190")),
            date(2024, 6, 10),
        );

        let settlement = figures.settlement.as_ref().unwrap();
        assert_eq!(settlement.total, Decimal::MAX);
        assert_eq!(settlement.over_amount, Decimal::ZERO);
        assert_eq!(figures.amount_due(), Decimal::MAX);

        let codes: Vec<&str> = figures
            .audit_trace
            .warnings
            .iter()
            .map(|w| w.code.as_str())
            .collect();
        assert_eq!(codes, vec!["settlement_overflow"]);
    }

    #[test]
    fn test_unrecognized_payment_term_warns_and_uses_today() {
        let mut contract = create_test_contract();
        contract.claim.terms.payment_term = "要相談".to_string();

        let figures = build_document(
            &contract,
            DocumentKind::Invoice,
            &settings(Side::Claim, true),
            None,
            date(2024, 6, 10),
        );

        assert_eq!(figures.payment_due.as_deref(), Some("2024-06-10"));
        assert_eq!(figures.audit_trace.warnings.len(), 1);
        assert_eq!(
            figures.audit_trace.warnings[0].code,
            "unrecognized_payment_term"
        );
    }

    #[test]
    fn test_payment_step_records_parsed_term() {
        let figures = build_document(
            &create_test_contract(),
            DocumentKind::PurchaseOrder,
            &settings(Side::Order, true),
            None,
            date(2024, 6, 10),
        );

        let step = figures
            .audit_trace
            .steps
            .iter()
            .find(|s| s.rule_id == "payment_due")
            .unwrap();
        assert_eq!(step.output["term"]["kind"], "net_days");
        assert_eq!(step.output["payment_due"], "2024-07-31");
    }

    #[test]
    fn test_document_metadata() {
        let figures = build_document(
            &create_test_contract(),
            DocumentKind::Invoice,
            &settings(Side::Claim, true),
            None,
            date(2024, 6, 10),
        );

        assert_eq!(figures.kind, DocumentKind::Invoice);
        assert_eq!(figures.title, "請求書");
        assert_eq!(figures.contract_id, "ct_001");
        assert_eq!(figures.worker, "Tanaka");
        assert_eq!(figures.engine_version, env!("CARGO_PKG_VERSION"));
    }
}
