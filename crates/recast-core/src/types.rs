use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Periodic rates expressed as decimals (0.005 = 0.5% per month).
pub type Rate = Decimal;

/// Annual rates as entered by the borrower (7.125 = 7.125% per year).
pub type Percent = Decimal;

/// Payment periods per year. Every loan here pays monthly.
pub const PERIODS_PER_YEAR: u32 = 12;

/// Round to whole cents, halves away from zero.
pub fn round_cents(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Months needed for monthly savings to pay back an up-front amount.
///
/// `Never` is used when savings are zero or negative, so callers never
/// display a misleading finite figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "months", rename_all = "snake_case")]
pub enum BreakEven {
    Months(Decimal),
    Never,
}

impl BreakEven {
    /// `amount / monthly_savings`, or `Never` when savings are not positive.
    pub fn from_savings(amount: Money, monthly_savings: Money) -> Self {
        if monthly_savings <= Decimal::ZERO {
            BreakEven::Never
        } else {
            BreakEven::Months(amount / monthly_savings)
        }
    }

    pub fn months(&self) -> Option<Decimal> {
        match self {
            BreakEven::Months(m) => Some(*m),
            BreakEven::Never => None,
        }
    }
}

impl fmt::Display for BreakEven {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakEven::Months(m) => write!(f, "{} months", m.round_dp(1)),
            BreakEven::Never => write!(f, "never"),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_cents_rounds_rather_than_truncates() {
        assert_eq!(round_cents(dec!(2.999)), dec!(3.00));
        assert_eq!(round_cents(dec!(1.005)), dec!(1.01));
        assert_eq!(round_cents(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_cents(dec!(1.004)), dec!(1.00));
    }

    #[test]
    fn test_break_even_positive_savings() {
        assert_eq!(
            BreakEven::from_savings(dec!(1000), dec!(50)),
            BreakEven::Months(dec!(20))
        );
    }

    #[test]
    fn test_break_even_without_savings_is_never() {
        assert_eq!(BreakEven::from_savings(dec!(1000), dec!(0)), BreakEven::Never);
        assert_eq!(BreakEven::from_savings(dec!(1000), dec!(-5)), BreakEven::Never);
        assert_eq!(BreakEven::Never.months(), None);
        assert_eq!(BreakEven::Never.to_string(), "never");
    }

    #[test]
    fn test_break_even_serialises_tagged() {
        let json = serde_json::to_value(BreakEven::Never).unwrap();
        assert_eq!(json["kind"], "never");
        let json = serde_json::to_value(BreakEven::Months(dec!(4))).unwrap();
        assert_eq!(json["kind"], "months");
        assert_eq!(json["months"], "4");
    }
}
