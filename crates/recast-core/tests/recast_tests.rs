use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use recast_core::export::{export_schedules, CsvWorkbookExporter, ORIGINAL_SHEET, RECAST_SHEET};
use recast_core::recast::{evaluate_recast, RecastInput};
use recast_core::scenario::{ScenarioLog, ScenarioRecord};
use recast_core::{BreakEven, RecastError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn sample_borrower() -> RecastInput {
    RecastInput {
        original_loan_amount: dec!(720000),
        remaining_balance: dec!(529000),
        annual_rate_pct: dec!(7.125),
        years_remaining: 29,
        current_payment: dec!(3599.67),
        lump_sum: dec!(100000),
        recast_fee: dec!(500),
        start_date: None,
    }
}

// ===========================================================================
// Evaluation
// ===========================================================================

#[test]
fn test_recast_lowers_payment_and_interest() {
    let out = evaluate_recast(&sample_borrower()).unwrap();
    let r = &out.result;

    assert_eq!(r.new_principal, dec!(429000));
    assert!(r.new_payment < dec!(3599.67));
    assert!(r.monthly_savings > Decimal::ZERO);
    assert!(r.total_interest_recast < r.total_interest_original);
    assert_eq!(r.recast_summary.final_balance, Decimal::ZERO);
    assert_eq!(r.original_summary.final_balance, Decimal::ZERO);
    assert!(out.warnings.is_empty(), "{:?}", out.warnings);
}

#[test]
fn test_payment_reduction_proportional_to_principal() {
    // Same rate and term: the payment scales linearly with principal.
    let out = evaluate_recast(&sample_borrower()).unwrap();
    let r = &out.result;
    let ratio = r.new_payment / r.minimum_payment;
    let expected = dec!(429000) / dec!(529000);
    assert!((ratio - expected).abs() < dec!(0.000001));
}

#[test]
fn test_break_even_metrics() {
    let out = evaluate_recast(&sample_borrower()).unwrap();
    let r = &out.result;

    match (r.break_even, r.fee_recoup) {
        (BreakEven::Months(lump), BreakEven::Months(fee)) => {
            assert!((lump * r.monthly_savings - dec!(100000)).abs() < dec!(0.01));
            assert!((fee * r.monthly_savings - dec!(500)).abs() < dec!(0.01));
            assert!(fee < lump);
        }
        other => panic!("expected finite break-even, got {other:?}"),
    }
}

#[test]
fn test_lump_sum_exceeds_balance_produces_no_result() {
    let input = RecastInput {
        lump_sum: dec!(600000),
        ..sample_borrower()
    };
    match evaluate_recast(&input) {
        Err(RecastError::FinancialImpossibility(msg)) => {
            assert!(msg.contains("600000"));
        }
        other => panic!("expected FinancialImpossibility, got {other:?}"),
    }
}

#[test]
fn test_underpayment_scenario() {
    let input = RecastInput {
        current_payment: dec!(1000),
        ..sample_borrower()
    };
    let out = evaluate_recast(&input).unwrap();

    assert!(out
        .warnings
        .iter()
        .any(|w| w.contains("below the minimum payment")));
    assert_eq!(out.result.original_schedule.len(), 348);
    assert!(out.result.original_summary.final_balance > Decimal::ZERO);
    assert_eq!(out.result.break_even, BreakEven::Never);
}

#[test]
fn test_envelope_serialises_never_sentinel() {
    let input = RecastInput {
        current_payment: dec!(1000),
        ..sample_borrower()
    };
    let out = evaluate_recast(&input).unwrap();
    let json = serde_json::to_value(&out).unwrap();

    assert_eq!(json["result"]["break_even"]["kind"], "never");
    assert_eq!(json["assumptions"]["lump_sum"], "100000");
}

// ===========================================================================
// Scenario log and export
// ===========================================================================

#[test]
fn test_scenario_log_round() {
    let mut log = ScenarioLog::new();
    for lump in [dec!(10000), dec!(50000), dec!(100000)] {
        let input = RecastInput {
            lump_sum: lump,
            ..sample_borrower()
        };
        let out = evaluate_recast(&input).unwrap();
        log = log.append(ScenarioRecord::capture(format!("lump {lump}"), &input, &out.result));
    }

    let cmp = log.comparison();
    assert_eq!(cmp.rows.len(), 3);
    assert_eq!(cmp.best_interest_savings.as_deref(), Some("lump 100000"));
    assert!(cmp.rows.windows(2).all(|w| w[1].new_payment < w[0].new_payment));
}

#[test]
fn test_export_dated_schedules() {
    let input = RecastInput {
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
        ..sample_borrower()
    };
    let out = evaluate_recast(&input).unwrap().result;
    let bytes = export_schedules(
        &CsvWorkbookExporter,
        &out.original_schedule,
        &out.recast_schedule,
    )
    .unwrap();
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.starts_with(&format!("sheet,{ORIGINAL_SHEET}")));
    assert!(text.contains(&format!("sheet,{RECAST_SHEET}")));
    assert!(text.contains("1,2025-02-01,"));
    assert!(text.contains(&format!("\n\"\"\nsheet,{RECAST_SHEET}\n")));
}
