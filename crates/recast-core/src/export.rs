//! Serialise schedules into a two-sheet, spreadsheet-like byte buffer.
//!
//! Nothing in the calculation path calls this module; front ends pick an
//! exporter and hand it finished schedules.

use serde_json::{Map, Value};

use crate::error::RecastError;
use crate::schedule::AmortizationRow;
use crate::types::{round_cents, Money};
use crate::RecastResult;

pub const ORIGINAL_SHEET: &str = "Original Schedule";
pub const RECAST_SHEET: &str = "Recast Schedule";

const COLUMNS: [&str; 7] = [
    "Payment Number",
    "Date",
    "Payment",
    "Principal",
    "Interest",
    "Remaining Principal",
    "Cumulative Interest",
];

/// A named table of rows.
#[derive(Debug, Clone, Copy)]
pub struct Sheet<'a> {
    pub name: &'a str,
    pub rows: &'a [AmortizationRow],
}

pub trait ScheduleExporter {
    /// Encode the sheets, in order, into one buffer.
    fn export(&self, sheets: &[Sheet<'_>]) -> RecastResult<Vec<u8>>;

    /// Conventional file extension for the encoded buffer.
    fn file_extension(&self) -> &'static str;
}

/// CSV with each sheet introduced by a `sheet,<name>` record and sheets
/// separated by an empty record (written as `""`).
///
/// Money columns are rounded to cents, halves away from zero, in the text only.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWorkbookExporter;

impl ScheduleExporter for CsvWorkbookExporter {
    fn export(&self, sheets: &[Sheet<'_>]) -> RecastResult<Vec<u8>> {
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        for (i, sheet) in sheets.iter().enumerate() {
            if i > 0 {
                wtr.write_record(None::<&[u8]>)?;
            }
            wtr.write_record(["sheet", sheet.name])?;
            wtr.write_record(COLUMNS)?;
            for row in sheet.rows {
                wtr.write_record([
                    row.period.to_string(),
                    row.date.map(|d| d.to_string()).unwrap_or_default(),
                    cents(row.payment),
                    cents(row.principal),
                    cents(row.interest),
                    cents(row.balance),
                    cents(row.cumulative_interest),
                ])?;
            }
        }

        wtr.into_inner()
            .map_err(|e| RecastError::ExportError(e.to_string()))
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }
}

fn cents(value: Money) -> String {
    format!("{:.2}", round_cents(value))
}

/// JSON object keyed by sheet name, rows at full precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWorkbookExporter {
    pub pretty: bool,
}

impl ScheduleExporter for JsonWorkbookExporter {
    fn export(&self, sheets: &[Sheet<'_>]) -> RecastResult<Vec<u8>> {
        let mut book = Map::new();
        for sheet in sheets {
            book.insert(sheet.name.to_string(), serde_json::to_value(sheet.rows)?);
        }
        let book = Value::Object(book);
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&book)?
        } else {
            serde_json::to_vec(&book)?
        };
        Ok(bytes)
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }
}

/// Export the original and recast schedules under their standard sheet names.
pub fn export_schedules(
    exporter: &dyn ScheduleExporter,
    original: &[AmortizationRow],
    recast: &[AmortizationRow],
) -> RecastResult<Vec<u8>> {
    let sheets = [
        Sheet {
            name: ORIGINAL_SHEET,
            rows: original,
        },
        Sheet {
            name: RECAST_SHEET,
            rows: recast,
        },
    ];
    let bytes = exporter.export(&sheets)?;
    tracing::debug!(
        format = exporter.file_extension(),
        bytes = bytes.len(),
        "schedules exported"
    );
    Ok(bytes)
}
