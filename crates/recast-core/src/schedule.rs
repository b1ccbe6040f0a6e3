//! Month-by-month amortisation of a fixed-rate loan.
//!
//! [`AmortizationSchedule`] is a one-shot iterator: it owns the running
//! balance and yields each [`AmortizationRow`] in period order, stopping at
//! payoff or at the end of the nominal term, whichever comes first.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::time::Instant;

use crate::error::RecastError;
use crate::payment::{
    monthly_payment, period_count, periodic_rate, validate_amount, validate_loan_terms,
};
use crate::types::{round_cents, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::RecastResult;

/// Residual balance settled in the period that leaves it behind.
///
/// The annuity payment carries 28 significant digits, so a schedule that
/// should close out exactly can be left a few units in the last place short.
pub const BALANCE_EPSILON: Decimal = dec!(0.000001);

/// One period of an amortisation schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based payment number.
    pub period: u32,
    /// Calendar due date, when the schedule was given a start date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Cash paid this period. Equals the level payment except on a payoff row.
    pub payment: Money,
    /// Portion of the payment reducing the balance (negative under negative amortisation).
    pub principal: Money,
    pub interest: Money,
    /// Balance after this payment, never below zero.
    pub balance: Money,
    pub cumulative_interest: Money,
}

/// Lazily generated amortisation schedule.
#[derive(Debug)]
pub struct AmortizationSchedule {
    balance: Money,
    rate: Rate,
    payment: Money,
    total_periods: u32,
    period: u32,
    cumulative_interest: Money,
    start_date: Option<NaiveDate>,
    paid_off: bool,
    overflowed: bool,
}

impl AmortizationSchedule {
    pub fn new(principal: Money, annual_rate_pct: Percent, years: u32, payment: Money) -> Self {
        Self {
            balance: principal,
            rate: periodic_rate(annual_rate_pct),
            payment,
            total_periods: period_count(years),
            period: 0,
            cumulative_interest: Decimal::ZERO,
            start_date: None,
            paid_off: principal <= Decimal::ZERO,
            overflowed: false,
        }
    }

    /// Date each row, the first falling one month after `start`.
    ///
    /// Fails up front if the last nominal due date is not representable.
    pub fn starting(mut self, start: NaiveDate) -> RecastResult<Self> {
        start
            .checked_add_months(Months::new(self.total_periods))
            .ok_or_else(|| {
                RecastError::DateError(format!(
                    "{} periods from {start} overflows the calendar",
                    self.total_periods
                ))
            })?;
        self.start_date = Some(start);
        Ok(self)
    }

    /// True once the running balance left the `Decimal` range and the
    /// schedule stopped early.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Drain the schedule, failing if the balance overflowed on the way.
    pub fn into_rows(mut self) -> RecastResult<Vec<AmortizationRow>> {
        let rows: Vec<_> = self.by_ref().collect();
        if self.overflowed {
            return Err(RecastError::FinancialImpossibility(format!(
                "Balance exceeds the representable range at period {}",
                self.period
            )));
        }
        Ok(rows)
    }

    /// One period of arithmetic, `None` when any step leaves the `Decimal` range.
    fn step(&self) -> Option<(Money, Money, Money, Money)> {
        let interest = self.balance.checked_mul(self.rate)?;
        let mut principal = self.payment.checked_sub(interest)?;
        let mut payment = self.payment;

        // Payoff row: the final cash flow is only what zeroes the balance.
        if principal > Decimal::ZERO && self.balance.checked_sub(principal)? < BALANCE_EPSILON {
            principal = self.balance;
            payment = principal.checked_add(interest)?;
        }

        let balance = self.balance.checked_sub(principal)?.max(Decimal::ZERO);
        Some((payment, principal, interest, balance))
    }

    /// Upper bound on the rows still to come.
    pub fn remaining_periods(&self) -> u32 {
        if self.paid_off || self.overflowed {
            0
        } else {
            self.total_periods - self.period
        }
    }
}

impl Iterator for AmortizationSchedule {
    type Item = AmortizationRow;

    fn next(&mut self) -> Option<AmortizationRow> {
        if self.paid_off || self.overflowed || self.period >= self.total_periods {
            return None;
        }
        self.period += 1;

        let step = self.step().and_then(|(payment, principal, interest, balance)| {
            let cumulative = self.cumulative_interest.checked_add(interest)?;
            Some((payment, principal, interest, balance, cumulative))
        });
        let Some((payment, principal, interest, balance, cumulative)) = step else {
            tracing::warn!(
                period = self.period,
                "schedule balance overflowed; stopping early"
            );
            self.overflowed = true;
            return None;
        };

        self.balance = balance;
        self.cumulative_interest = cumulative;
        if self.balance.is_zero() {
            self.paid_off = true;
        }

        let date = self
            .start_date
            .and_then(|start| start.checked_add_months(Months::new(self.period)));

        Some(AmortizationRow {
            period: self.period,
            date,
            payment,
            principal,
            interest,
            balance: self.balance,
            cumulative_interest: self.cumulative_interest,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining_periods() as usize))
    }
}

impl FusedIterator for AmortizationSchedule {}

/// Collect the full schedule for a loan.
pub fn generate_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    years: u32,
    payment: Money,
) -> Vec<AmortizationRow> {
    AmortizationSchedule::new(principal, annual_rate_pct, years, payment).collect()
}

/// Totals over a generated schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub periods: u32,
    pub total_paid: Money,
    pub total_principal: Money,
    pub total_interest: Money,
    pub final_balance: Money,
    /// Period in which the balance reached zero, if it did.
    pub payoff_period: Option<u32>,
}

impl ScheduleSummary {
    pub fn from_rows(rows: &[AmortizationRow]) -> Self {
        let total_paid = rows.iter().map(|r| r.payment).sum();
        let total_principal = rows.iter().map(|r| r.principal).sum();
        let total_interest = rows.iter().map(|r| r.interest).sum();
        let final_balance = rows.last().map(|r| r.balance).unwrap_or(Decimal::ZERO);
        let payoff_period = rows
            .last()
            .filter(|r| r.balance.is_zero())
            .map(|r| r.period);

        Self {
            periods: rows.len() as u32,
            total_paid,
            total_principal,
            total_interest,
            final_balance,
            payoff_period,
        }
    }
}

/// Loan terms for a standalone schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub principal: Money,
    /// Annual interest rate in percent, 0 to 100.
    pub annual_rate_pct: Percent,
    pub years: u32,
    /// Monthly payment; the level annuity payment when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub payment: Money,
    pub summary: ScheduleSummary,
    pub rows: Vec<AmortizationRow>,
}

/// Validated schedule generation wrapped in the standard envelope.
pub fn amortize(input: &ScheduleInput) -> RecastResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_loan_terms(input.principal, input.annual_rate_pct, input.years)?;

    let level = monthly_payment(input.principal, input.annual_rate_pct, input.years);
    let payment = match input.payment {
        Some(p) => {
            validate_amount("payment", p)?;
            p
        }
        None => level,
    };

    if input.years == 0 {
        warnings.push("Term is zero years; the schedule is empty".into());
    } else if payment < level {
        warnings.push(format!(
            "Payment {} is below the level payment {}; the loan will not pay off within the term",
            payment,
            round_cents(level)
        ));
    }

    let schedule =
        AmortizationSchedule::new(input.principal, input.annual_rate_pct, input.years, payment);
    let rows = match input.start_date {
        Some(date) => schedule.starting(date)?.into_rows()?,
        None => schedule.into_rows()?,
    };
    let summary = ScheduleSummary::from_rows(&rows);
    tracing::debug!(periods = summary.periods, "schedule generated");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate amortisation, monthly compounding",
        input,
        warnings,
        elapsed,
        ScheduleOutput {
            payment,
            summary,
            rows,
        },
    ))
}
