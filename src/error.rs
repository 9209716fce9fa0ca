//! Error types for the cepsheet library

use std::fmt::Display;
use thiserror::Error;

/// Result type alias for cepsheet operations
pub type Result<T> = std::result::Result<T, ExcelError>;

/// Main error type for all spreadsheet operations
#[derive(Error, Debug)]
pub enum ExcelError {
    /// Error occurred while reading an Excel file
    #[error("Failed to read Excel file: {0}")]
    ReadError(String),

    /// Error occurred while writing an Excel file
    #[error("Failed to write Excel file: {0}")]
    WriteError(String),

    /// Sheet not found in the workbook
    #[error("Sheet '{sheet}' not found. Available sheets: {available}")]
    SheetNotFound { sheet: String, available: String },

    /// Sheet name rejected by the writer
    #[error("Invalid sheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: String },

    /// A column does not have the same number of values as the table
    #[error("Column '{column}' has {actual} values, table has {expected} rows")]
    ShapeMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A column name is already present in the table
    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    /// An imported sheet holds no usable postal code
    #[error("No valid CEP found in {0}")]
    NoCepsFound(String),

    /// ZIP container error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// CSV export error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// IO error wrapper
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ExcelError {
    /// Wrap an error coming from the ZIP layer
    pub(crate) fn zip<E: Display>(err: E) -> Self {
        ExcelError::ZipError(err.to_string())
    }
}

impl From<csv::Error> for ExcelError {
    fn from(err: csv::Error) -> Self {
        ExcelError::CsvError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ExcelError::SheetNotFound {
            sheet: "Missing".to_string(),
            available: "Sheet1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Sheet 'Missing' not found. Available sheets: Sheet1"
        );

        let err = ExcelError::ShapeMismatch {
            column: "CEP".to_string(),
            expected: 5,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "Column 'CEP' has 4 values, table has 5 rows"
        );

        let err = ExcelError::NoCepsFound("clientes.xlsx".to_string());
        assert_eq!(err.to_string(), "No valid CEP found in clientes.xlsx");
    }

    #[test]
    fn test_zip_error_keeps_message() {
        let err = ExcelError::zip("Entry not found: xl/workbook.xml");
        assert!(err.to_string().contains("xl/workbook.xml"));
    }
}
