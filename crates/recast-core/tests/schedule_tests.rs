use pretty_assertions::assert_eq;
use recast_core::payment::{monthly_payment, period_count};
use recast_core::schedule::{generate_schedule, AmortizationRow, ScheduleSummary};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const TOL: Decimal = dec!(0.0001);

fn assert_closes_out(rows: &[AmortizationRow], principal: Decimal, years: u32) {
    assert!(rows.len() <= period_count(years) as usize);
    assert_eq!(rows.last().map(|r| r.balance), Some(Decimal::ZERO));

    let principal_paid: Decimal = rows.iter().map(|r| r.principal).sum();
    assert!(
        (principal_paid - principal).abs() <= TOL,
        "principal paid {principal_paid} != {principal}"
    );

    let mut running = Decimal::ZERO;
    for (i, row) in rows.iter().enumerate() {
        running += row.interest;
        assert_eq!(row.period as usize, i + 1);
        assert_eq!(row.cumulative_interest, running);
        if i > 0 {
            assert!(row.balance <= rows[i - 1].balance);
        }
    }
}

// ===========================================================================
// Payment feeds schedule
// ===========================================================================

#[test]
fn test_round_trip_closes_out_across_loans() {
    let loans = [
        (dec!(12000), dec!(0), 1u32),
        (dec!(200000), dec!(6), 30),
        (dec!(529000), dec!(7.125), 29),
        (dec!(75000), dec!(3.5), 10),
        (dec!(1000), dec!(0), 7),
        (dec!(350000), dec!(18), 40),
        (dec!(0.01), dec!(5), 1),
    ];

    for (principal, rate, years) in loans {
        let pmt = monthly_payment(principal, rate, years);
        let rows = generate_schedule(principal, rate, years, pmt);
        assert_closes_out(&rows, principal, years);
    }
}

#[test]
fn test_no_interest_loan_scenario() {
    let pmt = monthly_payment(dec!(12000), dec!(0), 1);
    assert_eq!(pmt.round_dp(2), dec!(1000.00));

    let rows = generate_schedule(dec!(12000), dec!(0), 1, pmt);
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[0].interest, Decimal::ZERO);
    assert_eq!(rows[11].balance, Decimal::ZERO);
}

#[test]
fn test_standard_loan_totals() {
    let pmt = monthly_payment(dec!(529000), dec!(7.125), 29);
    let rows = generate_schedule(dec!(529000), dec!(7.125), 29, pmt);
    let summary = ScheduleSummary::from_rows(&rows);

    assert_eq!(summary.final_balance, Decimal::ZERO);
    assert!(summary.payoff_period.is_some());
    // Level payments: total paid is the payment times the term.
    assert!((summary.total_paid - pmt * dec!(348)).abs() <= dec!(0.01));
    assert!((summary.total_interest - (summary.total_paid - dec!(529000))).abs() <= TOL);
}

#[test]
fn test_extra_payment_shortens_term() {
    let pmt = monthly_payment(dec!(200000), dec!(6), 30);
    let level = generate_schedule(dec!(200000), dec!(6), 30, pmt);
    let extra = generate_schedule(dec!(200000), dec!(6), 30, pmt + dec!(500));

    assert!(extra.len() < level.len());
    assert_closes_out(&extra, dec!(200000), 30);

    let level_interest = level.last().unwrap().cumulative_interest;
    let extra_interest = extra.last().unwrap().cumulative_interest;
    assert!(extra_interest < level_interest);
}

#[test]
fn test_interest_only_payment_never_amortises() {
    let principal = dec!(120000);
    let interest_only = principal * dec!(6) / dec!(100) / dec!(12);
    let rows = generate_schedule(principal, dec!(6), 5, interest_only);

    assert_eq!(rows.len(), 60);
    assert!(rows.iter().all(|r| r.balance == principal));
}
