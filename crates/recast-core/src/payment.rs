//! Level-payment (annuity) calculator for fixed-rate monthly loans.
//!
//! The payment is left unrounded; only presentation layers round to cents.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RecastError;
use crate::types::{
    with_metadata, ComputationOutput, Money, Percent, Rate, PERIODS_PER_YEAR,
};
use crate::RecastResult;

/// Longest accepted term. Keeps period counts and due dates well inside range.
pub const MAX_TERM_YEARS: u32 = 100;

/// Largest accepted money input. Payment times period count stays far below
/// the `Decimal` ceiling at this size.
pub const MAX_AMOUNT: Money = dec!(1000000000000000);

/// Loan terms for a standalone payment calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub principal: Money,
    /// Annual interest rate in percent, 0 to 100.
    pub annual_rate_pct: Percent,
    pub years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutput {
    pub monthly_payment: Money,
    /// Payment that only covers the first month's interest.
    pub interest_only_payment: Money,
    pub periods: u32,
    /// Level payment times the number of periods.
    pub total_of_payments: Money,
    pub total_interest: Money,
}

/// Convert an annual percentage (7.125) to a monthly decimal rate.
pub fn periodic_rate(annual_rate_pct: Percent) -> Rate {
    annual_rate_pct / dec!(100) / Decimal::from(PERIODS_PER_YEAR)
}

/// Number of monthly payments in a term of whole years.
pub fn period_count(years: u32) -> u32 {
    years.saturating_mul(PERIODS_PER_YEAR)
}

/// Fixed monthly payment that amortises `principal` over `years`.
///
/// A zero term yields zero (there is nothing to amortise over) and a zero
/// rate yields straight-line repayment. Otherwise the annuity formula
/// `r * P / (1 - (1 + r)^-n)` applies.
pub fn monthly_payment(principal: Money, annual_rate_pct: Percent, years: u32) -> Money {
    let n = period_count(years);
    if n == 0 {
        return Decimal::ZERO;
    }

    let rate = periodic_rate(annual_rate_pct);
    if rate.is_zero() {
        return principal / Decimal::from(n);
    }

    let denom = Decimal::ONE - discount_factor(rate, n);
    if denom <= Decimal::ZERO {
        // Rate too small to register at 28 digits.
        return principal / Decimal::from(n);
    }

    rate * principal / denom
}

/// Validated payment calculation wrapped in the standard envelope.
pub fn calculate_payment(input: &PaymentInput) -> RecastResult<ComputationOutput<PaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_loan_terms(input.principal, input.annual_rate_pct, input.years)?;

    if input.years == 0 {
        warnings.push("Term is zero years; payment is zero and no schedule exists".into());
    }

    let periods = period_count(input.years);
    let monthly = monthly_payment(input.principal, input.annual_rate_pct, input.years);
    let total_of_payments = monthly * Decimal::from(periods);

    let output = PaymentOutput {
        monthly_payment: monthly,
        interest_only_payment: interest_only_payment(input.principal, input.annual_rate_pct),
        periods,
        total_of_payments,
        total_interest: if periods == 0 {
            Decimal::ZERO
        } else {
            total_of_payments - input.principal
        },
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment annuity (monthly compounding)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Boundary checks shared by the standalone payment and schedule operations.
pub(crate) fn validate_loan_terms(
    principal: Money,
    annual_rate_pct: Percent,
    years: u32,
) -> RecastResult<()> {
    validate_amount("principal", principal)?;
    if annual_rate_pct < Decimal::ZERO || annual_rate_pct > dec!(100) {
        return Err(RecastError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Annual interest rate must be between 0 and 100 percent".into(),
        });
    }
    validate_term("years", years)
}

/// Reject negative amounts and amounts beyond [`MAX_AMOUNT`].
pub(crate) fn validate_amount(field: &str, value: Money) -> RecastResult<()> {
    if value < Decimal::ZERO {
        return Err(RecastError::InvalidInput {
            field: field.into(),
            reason: "Must be non-negative".into(),
        });
    }
    if value > MAX_AMOUNT {
        return Err(RecastError::InvalidInput {
            field: field.into(),
            reason: format!("Must not exceed {MAX_AMOUNT}"),
        });
    }
    Ok(())
}

/// Reject terms longer than [`MAX_TERM_YEARS`].
pub(crate) fn validate_term(field: &str, years: u32) -> RecastResult<()> {
    if years > MAX_TERM_YEARS {
        return Err(RecastError::InvalidInput {
            field: field.into(),
            reason: format!("Term must be at most {MAX_TERM_YEARS} years"),
        });
    }
    Ok(())
}

/// Interest accrued in the first month; paying less than this grows the balance.
pub fn interest_only_payment(principal: Money, annual_rate_pct: Percent) -> Money {
    principal * periodic_rate(annual_rate_pct)
}

/// `(1 + rate)^-n` as a running product of `1 / (1 + rate)`.
///
/// The product shrinks toward zero, so long terms at high rates underflow
/// gracefully instead of overflowing the decimal range.
fn discount_factor(rate: Rate, n: u32) -> Decimal {
    let v = Decimal::ONE / (Decimal::ONE + rate);
    let mut factor = Decimal::ONE;
    for _ in 0..n {
        factor *= v;
        if factor.is_zero() {
            break;
        }
    }
    factor
}
