use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::fs;

use recast_core::export::{self, CsvWorkbookExporter, JsonWorkbookExporter, ScheduleExporter};
use recast_core::recast::{self, RecastInput};

use crate::input;

/// Loan and recast terms shared by `evaluate` and `export`.
///
/// Flags not given fall back to the built-in sample borrower.
#[derive(Args, Clone)]
pub struct RecastFlags {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount originally borrowed
    #[arg(long)]
    pub original_loan_amount: Option<Decimal>,

    /// Outstanding principal today
    #[arg(long)]
    pub remaining_balance: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 7.125)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Whole years left on the loan
    #[arg(long)]
    pub years_remaining: Option<u32>,

    /// Current monthly payment
    #[arg(long)]
    pub current_payment: Option<Decimal>,

    /// Lump-sum payment towards principal
    #[arg(long)]
    pub lump_sum: Option<Decimal>,

    /// Lender's recast fee
    #[arg(long)]
    pub recast_fee: Option<Decimal>,

    /// Date the schedules are measured from (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

impl RecastFlags {
    /// Input file, then piped stdin, then flags layered over the defaults.
    pub fn resolve(&self) -> Result<RecastInput, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return input::file::read_input(path);
        }
        if let Some(data) = input::stdin::read_stdin()? {
            return Ok(serde_json::from_value(data)?);
        }
        Ok(self.overlay(RecastInput::default()))
    }

    pub fn overlay(&self, base: RecastInput) -> RecastInput {
        RecastInput {
            original_loan_amount: self.original_loan_amount.unwrap_or(base.original_loan_amount),
            remaining_balance: self.remaining_balance.unwrap_or(base.remaining_balance),
            annual_rate_pct: self.rate.unwrap_or(base.annual_rate_pct),
            years_remaining: self.years_remaining.unwrap_or(base.years_remaining),
            current_payment: self.current_payment.unwrap_or(base.current_payment),
            lump_sum: self.lump_sum.unwrap_or(base.lump_sum),
            recast_fee: self.recast_fee.unwrap_or(base.recast_fee),
            start_date: self.start_date.or(base.start_date),
        }
    }
}

/// Arguments for a recast evaluation
#[derive(Args)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub loan: RecastFlags,

    /// Omit the full schedules and keep only headline figures and summaries
    #[arg(long)]
    pub summary_only: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Arguments for exporting both schedules
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub loan: RecastFlags,

    /// Workbook encoding
    #[arg(long, value_enum, default_value = "csv")]
    pub format: ExportFormat,

    /// Destination file (defaults to recast_schedules.<ext>)
    #[arg(long)]
    pub out: Option<String>,
}

pub fn run_evaluate(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let recast_input = args.loan.resolve()?;
    let result = recast::evaluate_recast(&recast_input)?;
    let mut value = serde_json::to_value(result)?;

    if args.summary_only {
        if let Some(Value::Object(res)) = value.get_mut("result") {
            res.remove("original_schedule");
            res.remove("recast_schedule");
        }
    }

    Ok(value)
}

pub fn run_export(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let recast_input = args.loan.resolve()?;
    let evaluated = recast::evaluate_recast(&recast_input)?;

    let exporter: Box<dyn ScheduleExporter> = match args.format {
        ExportFormat::Csv => Box::new(CsvWorkbookExporter),
        ExportFormat::Json => Box::new(JsonWorkbookExporter { pretty: true }),
    };
    let bytes = export::export_schedules(
        exporter.as_ref(),
        &evaluated.result.original_schedule,
        &evaluated.result.recast_schedule,
    )?;

    let path = args
        .out
        .unwrap_or_else(|| format!("recast_schedules.{}", exporter.file_extension()));
    fs::write(&path, &bytes).map_err(|e| format!("Failed to write '{}': {}", path, e))?;
    tracing::info!(path = %path, bytes = bytes.len(), "schedules written");

    Ok(json!({
        "result": {
            "path": path,
            "bytes": bytes.len(),
            "sheets": [export::ORIGINAL_SHEET, export::RECAST_SHEET],
            "original_rows": evaluated.result.original_schedule.len(),
            "recast_rows": evaluated.result.recast_schedule.len(),
        },
        "warnings": evaluated.warnings,
    }))
}
