use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use recast_core::export::{self, CsvWorkbookExporter, JsonWorkbookExporter, ScheduleExporter};
use recast_core::schedule::AmortizationRow;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Payment and schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_payment(input_json: String) -> NapiResult<String> {
    let input: recast_core::payment::PaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = recast_core::payment::calculate_payment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: recast_core::schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = recast_core::schedule::amortize(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Recast
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_recast(input_json: String) -> NapiResult<String> {
    let input: recast_core::recast::RecastInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = recast_core::recast::evaluate_recast(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_scenarios(input_json: String) -> NapiResult<String> {
    let scenarios: Vec<recast_core::scenario::LabelledScenario> =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = recast_core::scenario::compare_scenarios(&scenarios).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ExportRequest {
    format: String,
    original_schedule: Vec<AmortizationRow>,
    recast_schedule: Vec<AmortizationRow>,
}

/// Encode both schedules as a two-sheet workbook ("csv" or "json").
#[napi]
pub fn export_schedules(input_json: String) -> NapiResult<napi::bindgen_prelude::Buffer> {
    let request: ExportRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let exporter: Box<dyn ScheduleExporter> = match request.format.as_str() {
        "csv" => Box::new(CsvWorkbookExporter),
        "json" => Box::new(JsonWorkbookExporter { pretty: false }),
        other => return Err(to_napi_error(format!("Unknown export format: {other}"))),
    };
    let bytes = export::export_schedules(
        exporter.as_ref(),
        &request.original_schedule,
        &request.recast_schedule,
    )
    .map_err(to_napi_error)?;
    Ok(bytes.into())
}
