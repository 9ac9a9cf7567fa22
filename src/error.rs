//! Error types for the triage pipeline

use thiserror::Error;

/// Errors that can occur while running the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("table {table}: missing required column {column}")]
    SchemaError { table: String, column: String },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("failed to parse signup date: {0}")]
    DateParseError(String),

    #[error("model fit failed: {0}")]
    ModelFitError(String),

    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    #[error("invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
