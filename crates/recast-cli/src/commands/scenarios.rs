use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use recast_core::scenario::{self, LabelledScenario};

use super::recast::RecastFlags;
use crate::input;

/// Arguments for a side-by-side scenario comparison
#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub loan: RecastFlags,

    /// Lump sums to compare against the same loan (comma-separated, e.g. "5000,25000,50000")
    #[arg(long, value_delimiter = ',')]
    pub lump_sums: Option<Vec<Decimal>>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenarios: Vec<LabelledScenario> = if let Some(ref path) = args.loan.input {
        input::file::read_input(path)?
    } else if let Some(ref lump_sums) = args.lump_sums {
        let base = args.loan.overlay(Default::default());
        lump_sums
            .iter()
            .map(|lump| LabelledScenario {
                label: format!("lump {lump}"),
                input: recast_core::recast::RecastInput {
                    lump_sum: *lump,
                    ..base.clone()
                },
            })
            .collect()
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <scenarios.json>, --lump-sums or stdin required for compare".into());
    };

    let result = scenario::compare_scenarios(&scenarios)?;
    Ok(serde_json::to_value(result)?)
}
