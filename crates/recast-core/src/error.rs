use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecastError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RecastError {
    fn from(e: serde_json::Error) -> Self {
        RecastError::SerializationError(e.to_string())
    }
}

#[cfg(feature = "export")]
impl From<csv::Error> for RecastError {
    fn from(e: csv::Error) -> Self {
        RecastError::ExportError(e.to_string())
    }
}
