//! Monthly settlement against worked hours.
//!
//! A contract's monthly price covers any number of hours inside its hour
//! band. Hours above the band are charged at the over rate, and hours short
//! of the band are deducted at the under rate.

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{AuditStep, AuditWarning, ContractTerms, RateOutput, Settlement};

/// The result of settling a month, including the audit step.
#[derive(Debug, Clone)]
pub struct SettlementResult {
    /// The settled amounts.
    pub settlement: Settlement,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Set when the amounts overflowed and the base price was used instead.
    pub warning: Option<AuditWarning>,
}

/// Settles a month's worked hours against the contract's hour band.
///
/// Over and under amounts are rounded to whole units with the terms' rounding
/// type. Hours inside the band (bounds included) settle at the base price.
/// If any amount overflows, the whole settlement falls back to the base price
/// and `warning` is set.
///
/// # Arguments
///
/// * `terms` - The billing terms for the side being settled
/// * `rates` - The over/under rates for those terms
/// * `worked_hours` - Hours actually worked in the period
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use contract_engine::calculation::calculate_settlement;
/// use contract_engine::models::{ContractTerms, RateOutput, RoundType, SplitPolicy};
/// use rust_decimal::Decimal;
///
/// let terms = ContractTerms {
///     base_price: Decimal::from(600_000),
///     hour_from: Decimal::from(140),
///     hour_to: Decimal::from(180),
///     round_type: RoundType::Round,
///     round_digit: 1,
///     split_policy: SplitPolicy::HighLow,
///     explicit_rates: None,
///     payment_term: String::new(),
/// };
/// let rates = RateOutput {
///     over_price: Decimal::from(3330),
///     under_price: Decimal::from(4290),
/// };
///
/// let result = calculate_settlement(&terms, &rates, Decimal::from(190), 1);
/// assert_eq!(result.settlement.over_amount, Decimal::from(33_300));
/// assert_eq!(result.settlement.total, Decimal::from(633_300));
/// ```
pub fn calculate_settlement(
    terms: &ContractTerms,
    rates: &RateOutput,
    worked_hours: Decimal,
    step_number: u32,
) -> SettlementResult {
    let (settled, warning) = match settle(terms, rates, worked_hours) {
        Some(settled) => (settled, None),
        None => {
            warn!(
                base_price = %terms.base_price,
                worked_hours = %worked_hours,
                "Settlement overflowed, using base price"
            );
            let settled = Settlement {
                worked_hours,
                over_hours: Decimal::ZERO,
                under_hours: Decimal::ZERO,
                over_amount: Decimal::ZERO,
                under_amount: Decimal::ZERO,
                total: terms.base_price,
            };
            let warning = AuditWarning::new(
                "settlement_overflow",
                format!(
                    "Settlement of {} hours overflowed; total set to base price {}",
                    worked_hours.normalize(),
                    terms.base_price.normalize()
                ),
                "high",
            );
            (settled, Some(warning))
        }
    };
    let Settlement {
        over_hours,
        under_hours,
        over_amount,
        under_amount,
        total,
        ..
    } = settled;

    let reasoning = if let Some(warning) = &warning {
        warning.message.clone()
    } else if over_hours > Decimal::ZERO {
        format!(
            "{} hours worked exceeds {} hour upper bound: {} + {} x {} = {}",
            worked_hours.normalize(),
            terms.hour_to.normalize(),
            terms.base_price.normalize(),
            over_hours.normalize(),
            rates.over_price.normalize(),
            total.normalize()
        )
    } else if under_hours > Decimal::ZERO {
        format!(
            "{} hours worked is below {} hour lower bound: {} - {} x {} = {}",
            worked_hours.normalize(),
            terms.hour_from.normalize(),
            terms.base_price.normalize(),
            under_hours.normalize(),
            rates.under_price.normalize(),
            total.normalize()
        )
    } else {
        format!(
            "{} hours worked is within the {}-{} hour band; base price {} applies",
            worked_hours.normalize(),
            terms.hour_from.normalize(),
            terms.hour_to.normalize(),
            terms.base_price.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "hour_band_settlement".to_string(),
        rule_name: "Hour Band Settlement".to_string(),
        input: serde_json::json!({
            "base_price": terms.base_price.normalize().to_string(),
            "worked_hours": worked_hours.normalize().to_string(),
            "hour_from": terms.hour_from.normalize().to_string(),
            "hour_to": terms.hour_to.normalize().to_string(),
            "over_price": rates.over_price.normalize().to_string(),
            "under_price": rates.under_price.normalize().to_string()
        }),
        output: serde_json::json!({
            "over_hours": over_hours.normalize().to_string(),
            "under_hours": under_hours.normalize().to_string(),
            "over_amount": over_amount.normalize().to_string(),
            "under_amount": under_amount.normalize().to_string(),
            "total": total.normalize().to_string()
        }),
        reasoning,
    };

    SettlementResult {
        settlement: settled,
        audit_step,
        warning,
    }
}

/// Computes the settlement, or `None` if any step overflows.
fn settle(terms: &ContractTerms, rates: &RateOutput, worked_hours: Decimal) -> Option<Settlement> {
    let over_hours = if worked_hours > terms.hour_to {
        worked_hours.checked_sub(terms.hour_to)?
    } else {
        Decimal::ZERO
    };

    let under_hours = if worked_hours < terms.hour_from {
        terms.hour_from.checked_sub(worked_hours)?
    } else {
        Decimal::ZERO
    };

    let over_amount = terms.round_type.apply(over_hours.checked_mul(rates.over_price)?);
    let under_amount = terms.round_type.apply(under_hours.checked_mul(rates.under_price)?);
    let total = terms
        .base_price
        .checked_add(over_amount)?
        .checked_sub(under_amount)?;

    Some(Settlement {
        worked_hours,
        over_hours,
        under_hours,
        over_amount,
        under_amount,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoundType, SplitPolicy};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_terms(round_type: RoundType) -> ContractTerms {
        ContractTerms {
            base_price: dec("600000"),
            hour_from: dec("140"),
            hour_to: dec("180"),
            round_type,
            round_digit: 1,
            split_policy: SplitPolicy::HighLow,
            explicit_rates: None,
            payment_term: String::new(),
        }
    }

    fn create_test_rates() -> RateOutput {
        RateOutput {
            over_price: dec("3330"),
            under_price: dec("4290"),
        }
    }

    #[test]
    fn test_hours_inside_band_settle_at_base_price() {
        let terms = create_test_terms(RoundType::Round);
        let result = calculate_settlement(&terms, &create_test_rates(), dec("160"), 1);

        assert_eq!(result.settlement.over_hours, Decimal::ZERO);
        assert_eq!(result.settlement.under_hours, Decimal::ZERO);
        assert_eq!(result.settlement.total, dec("600000"));
        assert!(result.audit_step.reasoning.contains("within"));
    }

    #[test]
    fn test_band_bounds_are_inclusive() {
        let terms = create_test_terms(RoundType::Round);
        let rates = create_test_rates();

        let at_upper = calculate_settlement(&terms, &rates, dec("180"), 1);
        let at_lower = calculate_settlement(&terms, &rates, dec("140"), 1);

        assert_eq!(at_upper.settlement.total, dec("600000"));
        assert_eq!(at_lower.settlement.total, dec("600000"));
    }

    #[test]
    fn test_over_hours_add_over_amount() {
        let terms = create_test_terms(RoundType::Round);
        let result = calculate_settlement(&terms, &create_test_rates(), dec("190"), 1);

        assert_eq!(result.settlement.over_hours, dec("10"));
        assert_eq!(result.settlement.over_amount, dec("33300"));
        assert_eq!(result.settlement.total, dec("633300"));
        assert!(result.audit_step.reasoning.contains("exceeds"));
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_overflowing_total_falls_back_to_base_price() {
        let mut terms = create_test_terms(RoundType::Round);
        terms.base_price = Decimal::MAX;

        let result = calculate_settlement(&terms, &create_test_rates(), dec("190"), 1);

        assert_eq!(result.settlement.total, Decimal::MAX);
        assert_eq!(result.settlement.over_hours, Decimal::ZERO);
        assert_eq!(result.settlement.over_amount, Decimal::ZERO);
        assert!(result.audit_step.reasoning.contains("overflowed"));
        assert_eq!(result.warning.unwrap().code, "settlement_overflow");
    }

    #[test]
    fn test_overflowing_over_amount_falls_back_to_base_price() {
        let terms = create_test_terms(RoundType::Ceil);
        let rates = RateOutput {
            over_price: Decimal::MAX,
            under_price: dec("4290"),
        };

        let result = calculate_settlement(&terms, &rates, dec("200"), 1);

        assert_eq!(result.settlement.total, dec("600000"));
        assert!(result.warning.is_some());
    }

    #[test]
    fn test_under_hours_deduct_under_amount() {
        let terms = create_test_terms(RoundType::Round);
        let result = calculate_settlement(&terms, &create_test_rates(), dec("130"), 1);

        assert_eq!(result.settlement.under_hours, dec("10"));
        assert_eq!(result.settlement.under_amount, dec("42900"));
        assert_eq!(result.settlement.total, dec("557100"));
        assert!(result.audit_step.reasoning.contains("below"));
    }

    #[test]
    fn test_fractional_amounts_use_round_type() {
        let rates = RateOutput {
            over_price: dec("3335"),
            under_price: dec("4291"),
        };
        // 0.5 x 3335 = 1667.5
        let hours = dec("180.5");
        let round = calculate_settlement(&create_test_terms(RoundType::Round), &rates, hours, 1);
        let floor = calculate_settlement(&create_test_terms(RoundType::Floor), &rates, hours, 1);
        let ceil = calculate_settlement(&create_test_terms(RoundType::Ceil), &rates, hours, 1);

        assert_eq!(round.settlement.over_amount, dec("1668"));
        assert_eq!(floor.settlement.over_amount, dec("1667"));
        assert_eq!(ceil.settlement.over_amount, dec("1668"));
    }

    #[test]
    fn test_audit_step_records_inputs_and_outputs() {
        let terms = create_test_terms(RoundType::Round);
        let result = calculate_settlement(&terms, &create_test_rates(), dec("190"), 4);

        assert_eq!(result.audit_step.step_number, 4);
        assert_eq!(result.audit_step.rule_id, "hour_band_settlement");
        assert_eq!(result.audit_step.input["worked_hours"].as_str().unwrap(), "190");
        assert_eq!(result.audit_step.output["total"].as_str().unwrap(), "633300");
    }
}
