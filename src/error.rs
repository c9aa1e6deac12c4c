// src/error.rs
use thiserror::Error;

use crate::models::YearMonth;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No {series} observation for {month}")]
    MissingData { month: YearMonth, series: &'static str },

    #[error("{series} series has no observations")]
    EmptySeries { series: &'static str },

    #[error("Timestamps not increasing: {found} follows {previous}")]
    UnsortedInput {
        previous: chrono::NaiveDate,
        found: chrono::NaiveDate,
    },

    #[error("Return undefined for {month}: prior close is zero or absent")]
    DivisionUndefined { month: YearMonth },

    #[error("More than one CPI observation for {month}")]
    DuplicateMonth { month: YearMonth },

    #[error("Column '{column}' not found in {file}")]
    MissingColumn { file: String, column: &'static str },

    #[error("Unparseable date '{value}' on line {line}")]
    InvalidDate { line: u64, value: String },

    #[error("Unparseable value '{value}' on line {line}")]
    InvalidValue { line: u64, value: String },

    #[error("Correlation window must be at least 2 months, got {window}")]
    InvalidWindow { window: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
