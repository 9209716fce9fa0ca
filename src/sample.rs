//! The sample CEP spreadsheet
//!
//! One column, `CEP`, with five fixed postal codes, written without an
//! index column to `exemplo_ceps.xlsx`.

use crate::error::Result;
use crate::table::{ExcelOptions, Table};
use std::path::{Path, PathBuf};

/// Header of the only column
pub const CEP_COLUMN: &str = "CEP";

/// The sample postal codes, in output order
pub const SAMPLE_CEPS: [&str; 5] = [
    "01310-100",
    "20040-020",
    "30112-000",
    "40070-110",
    "50030-230",
];

/// File name written by [`write_sample`]
pub const OUTPUT_FILE: &str = "exemplo_ceps.xlsx";

/// Line printed once the file is written
pub const SUCCESS_MESSAGE: &str = "Arquivo Excel criado com sucesso!";

/// The sample table
pub fn sample_table() -> Table {
    Table::with_column(CEP_COLUMN, SAMPLE_CEPS)
}

/// Write the sample table to `dir/exemplo_ceps.xlsx`, replacing any existing file
pub fn write_sample<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
    let path = dir.as_ref().join(OUTPUT_FILE);
    sample_table().to_excel(&path, &ExcelOptions::default())?;
    tracing::info!(path = %path.display(), rows = SAMPLE_CEPS.len(), "sample written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;
    use tempfile::TempDir;

    #[test]
    fn test_sample_table_shape() {
        let table = sample_table();
        assert_eq!(table.column_names(), vec![CEP_COLUMN]);
        assert_eq!(table.row_count(), 5);

        let values: Vec<&str> = table
            .column(CEP_COLUMN)
            .unwrap()
            .iter()
            .filter_map(CellValue::as_str)
            .collect();
        assert_eq!(values, SAMPLE_CEPS);
    }

    #[test]
    fn test_write_sample_path() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(dir.path()).unwrap();

        assert_eq!(path, dir.path().join("exemplo_ceps.xlsx"));
        assert!(path.exists());
    }
}
