//! Lump-sum paydown and recast evaluation.
//!
//! Runs the loan twice (as-is at the borrower's current payment, and
//! re-amortised after the lump sum over the same remaining term) and
//! compares the two schedules.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RecastError;
use crate::payment::{
    interest_only_payment, monthly_payment, period_count, validate_amount, validate_term,
};
use crate::schedule::{AmortizationRow, AmortizationSchedule, ScheduleSummary};
use crate::types::{
    round_cents, with_metadata, BreakEven, ComputationOutput, Money, Percent,
};
use crate::RecastResult;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Everything a borrower enters to evaluate a recast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecastInput {
    /// Amount originally borrowed. Only used to sanity-check the balance.
    pub original_loan_amount: Money,
    /// Outstanding principal today.
    pub remaining_balance: Money,
    /// Annual interest rate in percent, 0 to 100 (7.125 = 7.125%).
    pub annual_rate_pct: Percent,
    /// Whole years left on the loan; the recast keeps this term.
    pub years_remaining: u32,
    /// Monthly principal and interest currently paid.
    pub current_payment: Money,
    /// One-off principal reduction made before the recast.
    pub lump_sum: Money,
    /// Lender's fee for re-amortising the loan.
    #[serde(default)]
    pub recast_fee: Money,
    /// Date the schedules are measured from; rows are undated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl Default for RecastInput {
    fn default() -> Self {
        Self {
            original_loan_amount: dec!(720000),
            remaining_balance: dec!(529000),
            annual_rate_pct: dec!(7.125),
            years_remaining: 29,
            current_payment: dec!(4800),
            lump_sum: dec!(1000),
            recast_fee: dec!(250),
            start_date: None,
        }
    }
}

impl RecastInput {
    /// Principal left after the lump sum is applied.
    pub fn new_principal(&self) -> Money {
        self.remaining_balance - self.lump_sum
    }

    /// Field-level checks plus the lump-sum precondition.
    pub fn validate(&self) -> RecastResult<()> {
        let amounts = [
            ("original_loan_amount", self.original_loan_amount),
            ("remaining_balance", self.remaining_balance),
            ("current_payment", self.current_payment),
            ("lump_sum", self.lump_sum),
            ("recast_fee", self.recast_fee),
        ];
        for (field, value) in amounts {
            validate_amount(field, value)?;
        }
        validate_term("years_remaining", self.years_remaining)?;

        if self.annual_rate_pct < Decimal::ZERO || self.annual_rate_pct > dec!(100) {
            return Err(RecastError::InvalidInput {
                field: "annual_rate_pct".into(),
                reason: "Annual interest rate must be between 0 and 100 percent".into(),
            });
        }

        if self.new_principal() <= Decimal::ZERO {
            return Err(RecastError::FinancialImpossibility(format!(
                "Lump-sum payment {} meets or exceeds the remaining balance {}",
                self.lump_sum, self.remaining_balance
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Side-by-side comparison of the loan before and after the recast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecastOutput {
    /// Principal re-amortised by the lender.
    pub new_principal: Money,
    /// Level payment after the recast.
    pub new_payment: Money,
    /// Level payment that would retire the current balance on schedule.
    pub minimum_payment: Money,
    /// `current_payment - new_payment`; may be negative.
    pub monthly_savings: Money,
    pub total_interest_original: Money,
    pub total_interest_recast: Money,
    pub total_interest_savings: Money,
    /// Months of savings needed to earn back the lump sum.
    pub break_even: BreakEven,
    /// Months of savings needed to earn back the recast fee.
    pub fee_recoup: BreakEven,
    /// Current payment over the full nominal term.
    pub total_payment_before: Money,
    /// New payment over the full nominal term, plus lump sum and fee.
    pub total_payment_after: Money,
    /// `total_payment_before - total_payment_after`.
    pub net_cash_savings: Money,
    /// The current payment does not cover the first month's interest.
    pub negative_amortization: bool,
    pub original_summary: ScheduleSummary,
    pub recast_summary: ScheduleSummary,
    pub original_schedule: Vec<AmortizationRow>,
    pub recast_schedule: Vec<AmortizationRow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate a lump-sum paydown followed by a recast.
pub fn evaluate_recast(input: &RecastInput) -> RecastResult<ComputationOutput<RecastOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.validate()?;
    tracing::debug!(
        remaining_balance = %input.remaining_balance,
        lump_sum = %input.lump_sum,
        annual_rate_pct = %input.annual_rate_pct,
        years_remaining = input.years_remaining,
        "evaluating recast"
    );

    if input.years_remaining == 0 {
        push_warning(
            &mut warnings,
            "Years remaining is zero; there are no periods to amortise over".into(),
        );
    }

    if input.remaining_balance > input.original_loan_amount {
        push_warning(
            &mut warnings,
            format!(
                "Remaining balance {} exceeds the original loan amount {}",
                input.remaining_balance, input.original_loan_amount
            ),
        );
    }

    let minimum_payment = monthly_payment(
        input.remaining_balance,
        input.annual_rate_pct,
        input.years_remaining,
    );
    if input.current_payment < minimum_payment {
        push_warning(
            &mut warnings,
            format!(
                "Current payment {} is below the minimum payment {} for this balance, rate and term",
                input.current_payment,
                round_cents(minimum_payment)
            ),
        );
    }

    let interest_only = interest_only_payment(input.remaining_balance, input.annual_rate_pct);
    let negative_amortization = input.years_remaining > 0 && input.current_payment < interest_only;
    if negative_amortization {
        push_warning(
            &mut warnings,
            format!(
                "Current payment does not cover monthly interest of {}; the balance will grow",
                round_cents(interest_only)
            ),
        );
    }

    if input.recast_fee > input.lump_sum {
        push_warning(
            &mut warnings,
            format!(
                "Recast fee {} exceeds the lump-sum payment {}",
                input.recast_fee, input.lump_sum
            ),
        );
    }

    let new_principal = input.new_principal();
    let new_payment = monthly_payment(new_principal, input.annual_rate_pct, input.years_remaining);

    let original_schedule = build_schedule(
        input.remaining_balance,
        input.annual_rate_pct,
        input.years_remaining,
        input.current_payment,
        input.start_date,
    )?;
    let recast_schedule = build_schedule(
        new_principal,
        input.annual_rate_pct,
        input.years_remaining,
        new_payment,
        input.start_date,
    )?;

    let original_summary = ScheduleSummary::from_rows(&original_schedule);
    let recast_summary = ScheduleSummary::from_rows(&recast_schedule);

    let monthly_savings = input.current_payment - new_payment;
    if monthly_savings <= Decimal::ZERO {
        push_warning(
            &mut warnings,
            "Recast does not lower the monthly payment; break-even is undefined".into(),
        );
    }

    let nominal_periods = Decimal::from(period_count(input.years_remaining));
    let total_payment_before = input.current_payment * nominal_periods;
    let total_payment_after =
        new_payment * nominal_periods + input.lump_sum + input.recast_fee;

    let output = RecastOutput {
        new_principal,
        new_payment,
        minimum_payment,
        monthly_savings,
        total_interest_original: original_summary.total_interest,
        total_interest_recast: recast_summary.total_interest,
        total_interest_savings: original_summary.total_interest - recast_summary.total_interest,
        break_even: BreakEven::from_savings(input.lump_sum, monthly_savings),
        fee_recoup: BreakEven::from_savings(input.recast_fee, monthly_savings),
        total_payment_before,
        total_payment_after,
        net_cash_savings: total_payment_before - total_payment_after,
        negative_amortization,
        original_summary,
        recast_summary,
        original_schedule,
        recast_schedule,
    };

    tracing::debug!(
        new_payment = %round_cents(output.new_payment),
        monthly_savings = %round_cents(output.monthly_savings),
        warnings = warnings.len(),
        "recast evaluated"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Lump-sum paydown with recast over the remaining term",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn build_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    years: u32,
    payment: Money,
    start_date: Option<NaiveDate>,
) -> RecastResult<Vec<AmortizationRow>> {
    let schedule = AmortizationSchedule::new(principal, annual_rate_pct, years, payment);
    match start_date {
        Some(date) => schedule.starting(date)?.into_rows(),
        None => schedule.into_rows(),
    }
}

fn push_warning(warnings: &mut Vec<String>, message: String) {
    tracing::warn!("{message}");
    warnings.push(message);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
