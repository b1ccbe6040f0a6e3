//! In-memory scenario log for comparing recast evaluations side by side.
//!
//! The log is owned by the caller and threaded through [`ScenarioLog::append`];
//! nothing is persisted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RecastError;
use crate::recast::{evaluate_recast, RecastInput, RecastOutput};
use crate::types::{
    round_cents, with_metadata, BreakEven, ComputationOutput, Money, Percent,
};
use crate::RecastResult;

/// Snapshot of one evaluation's headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub label: String,
    pub recorded_at: DateTime<Utc>,
    pub remaining_balance: Money,
    pub annual_rate_pct: Percent,
    pub years_remaining: u32,
    pub lump_sum: Money,
    pub recast_fee: Money,
    pub new_payment: Money,
    pub monthly_savings: Money,
    pub total_interest_savings: Money,
    pub net_cash_savings: Money,
    pub break_even: BreakEven,
    pub fee_recoup: BreakEven,
}

impl ScenarioRecord {
    pub fn from_evaluation(
        label: impl Into<String>,
        input: &RecastInput,
        output: &RecastOutput,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            label: label.into(),
            recorded_at,
            remaining_balance: input.remaining_balance,
            annual_rate_pct: input.annual_rate_pct,
            years_remaining: input.years_remaining,
            lump_sum: input.lump_sum,
            recast_fee: input.recast_fee,
            new_payment: output.new_payment,
            monthly_savings: output.monthly_savings,
            total_interest_savings: output.total_interest_savings,
            net_cash_savings: output.net_cash_savings,
            break_even: output.break_even,
            fee_recoup: output.fee_recoup,
        }
    }

    /// Snapshot stamped with the current time.
    pub fn capture(label: impl Into<String>, input: &RecastInput, output: &RecastOutput) -> Self {
        Self::from_evaluation(label, input, output, Utc::now())
    }
}

/// Ordered, caller-owned list of scenario records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioLog {
    records: Vec<ScenarioRecord>,
}

impl ScenarioLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the log and return it with `record` appended.
    #[must_use]
    pub fn append(mut self, record: ScenarioRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn records(&self) -> &[ScenarioRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Side-by-side view in insertion order.
    pub fn comparison(&self) -> ScenarioComparison {
        let rows = self
            .records
            .iter()
            .map(|r| ScenarioComparisonRow {
                label: r.label.clone(),
                lump_sum: r.lump_sum,
                new_payment: round_cents(r.new_payment),
                monthly_savings: round_cents(r.monthly_savings),
                total_interest_savings: round_cents(r.total_interest_savings),
                interest_saved_per_dollar: if r.lump_sum.is_zero() {
                    None
                } else {
                    Some((r.total_interest_savings / r.lump_sum).round_dp(4))
                },
                break_even: r.break_even.to_string(),
                fee_recoup: r.fee_recoup.to_string(),
            })
            .collect();

        let best_interest_savings = self
            .records
            .iter()
            .max_by(|a, b| a.total_interest_savings.cmp(&b.total_interest_savings))
            .map(|r| r.label.clone());

        let fastest_break_even = self
            .records
            .iter()
            .filter_map(|r| r.break_even.months().map(|m| (m, r)))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, r)| r.label.clone());

        ScenarioComparison {
            rows,
            best_interest_savings,
            fastest_break_even,
        }
    }
}

/// One line of the side-by-side view, rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparisonRow {
    pub label: String,
    pub lump_sum: Money,
    pub new_payment: Money,
    pub monthly_savings: Money,
    pub total_interest_savings: Money,
    /// Interest saved per unit of lump sum; absent for a zero lump sum.
    pub interest_saved_per_dollar: Option<Decimal>,
    pub break_even: String,
    pub fee_recoup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub rows: Vec<ScenarioComparisonRow>,
    pub best_interest_savings: Option<String>,
    pub fastest_break_even: Option<String>,
}

/// A labelled input, as read from a comparison file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelledScenario {
    pub label: String,
    #[serde(flatten)]
    pub input: RecastInput,
}

/// Evaluate each scenario in turn and compare them.
///
/// A scenario that fails validation aborts the whole comparison; warnings
/// from individual evaluations are carried over, prefixed by label.
pub fn compare_scenarios(
    scenarios: &[LabelledScenario],
) -> RecastResult<ComputationOutput<ScenarioComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if scenarios.is_empty() {
        return Err(RecastError::InvalidInput {
            field: "scenarios".into(),
            reason: "At least one scenario required".into(),
        });
    }

    let mut log = ScenarioLog::new();
    for scenario in scenarios {
        let evaluated = evaluate_recast(&scenario.input)?;
        warnings.extend(
            evaluated
                .warnings
                .iter()
                .map(|w| format!("{}: {}", scenario.label, w)),
        );
        log = log.append(ScenarioRecord::capture(
            scenario.label.clone(),
            &scenario.input,
            &evaluated.result,
        ));
    }
    tracing::debug!(scenarios = log.len(), "scenarios compared");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Side-by-side recast scenario comparison",
        &scenarios,
        warnings,
        elapsed,
        log.comparison(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn labelled(label: &str, lump_sum: Decimal) -> LabelledScenario {
        LabelledScenario {
            label: label.into(),
            input: RecastInput {
                lump_sum,
                ..RecastInput::default()
            },
        }
    }

    fn record(label: &str, lump_sum: Decimal) -> ScenarioRecord {
        let input = RecastInput {
            lump_sum,
            ..RecastInput::default()
        };
        let output = evaluate_recast(&input).unwrap().result;
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        ScenarioRecord::from_evaluation(label, &input, &output, at)
    }

    #[test]
    fn test_append_preserves_order() {
        let log = ScenarioLog::new()
            .append(record("small", dec!(1000)))
            .append(record("large", dec!(100000)));

        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[0].label, "small");
        assert_eq!(log.records()[1].label, "large");
    }

    #[test]
    fn test_empty_log_comparison() {
        let log = ScenarioLog::new();
        assert!(log.is_empty());
        let cmp = log.comparison();
        assert!(cmp.rows.is_empty());
        assert_eq!(cmp.best_interest_savings, None);
        assert_eq!(cmp.fastest_break_even, None);
    }

    #[test]
    fn test_record_snapshot_matches_evaluation() {
        let r = record("base", dec!(1000));
        assert_eq!(r.lump_sum, dec!(1000));
        assert_eq!(r.recast_fee, dec!(250));
        assert_eq!(r.recorded_at.to_rfc3339(), "2025-01-01T12:00:00+00:00");
        assert!(matches!(r.break_even, BreakEven::Months(_)));
    }

    #[test]
    fn test_comparison_highlights() {
        let log = ScenarioLog::new()
            .append(record("small", dec!(1000)))
            .append(record("large", dec!(100000)));
        let cmp = log.comparison();

        assert_eq!(cmp.rows.len(), 2);
        // Larger paydown lowers the payment and total interest more.
        assert_eq!(cmp.best_interest_savings.as_deref(), Some("large"));
        assert!(cmp.rows[1].new_payment < cmp.rows[0].new_payment);
        assert!(cmp.fastest_break_even.is_some());
    }

    #[test]
    fn test_compare_scenarios_envelope() {
        let scenarios = vec![labelled("a", dec!(1000)), labelled("b", dec!(20000))];
        let out = compare_scenarios(&scenarios).unwrap();
        assert_eq!(out.result.rows.len(), 2);
        assert_eq!(out.result.rows[0].label, "a");
    }

    #[test]
    fn test_compare_scenarios_rejects_empty() {
        assert!(compare_scenarios(&[]).is_err());
    }

    #[test]
    fn test_compare_scenarios_propagates_validation_error() {
        let scenarios = vec![labelled("ok", dec!(1000)), labelled("bad", dec!(600000))];
        assert!(matches!(
            compare_scenarios(&scenarios),
            Err(RecastError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_labelled_scenario_flattens_input() {
        let json = serde_json::json!({
            "label": "refi",
            "original_loan_amount": "720000",
            "remaining_balance": "529000",
            "annual_rate_pct": "7.125",
            "years_remaining": 29,
            "current_payment": "4800",
            "lump_sum": "5000"
        });
        let s: LabelledScenario = serde_json::from_value(json).unwrap();
        assert_eq!(s.label, "refi");
        assert_eq!(s.input.lump_sum, dec!(5000));
        assert_eq!(s.input.recast_fee, Decimal::ZERO);
    }
}
