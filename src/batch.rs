//! Import CEPs from a spreadsheet and export them normalized
//!
//! The postal codes of the first sheet are located with
//! [`Table::extract_ceps`] and written twice, as `ceps_processados.xlsx`
//! (sheet `CEPs Processados`) and as `ceps_processados.csv`. Each record
//! keeps the digits found in the source and the formatted code.

use crate::cep::format_cep;
use crate::error::{ExcelError, Result};
use crate::table::{ExcelOptions, Table};
use std::path::{Path, PathBuf};

/// Sheet holding the exported records
pub const PROCESSED_SHEET: &str = "CEPs Processados";

/// File name, without extension, of both exports
pub const PROCESSED_STEM: &str = "ceps_processados";

/// Column with the eight digits taken from the source sheet
pub const ORIGINAL_COLUMN: &str = "CEP_Original";

/// Column with the `NNNNN-NNN` form
pub const FORMATTED_COLUMN: &str = "CEP";

/// Result of [`process_workbook`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedCeps {
    /// Normalized codes, in source order
    pub ceps: Vec<String>,
    /// Path of the XLSX export
    pub xlsx: PathBuf,
    /// Path of the CSV export
    pub csv: PathBuf,
}

/// One record per code: the digits and the formatted code
pub fn processed_table(ceps: &[String]) -> Result<Table> {
    Table::from_columns([
        (ORIGINAL_COLUMN, ceps.to_vec()),
        (
            FORMATTED_COLUMN,
            ceps.iter().map(|cep| format_cep(cep)).collect::<Vec<_>>(),
        ),
    ])
}

/// Read the CEPs of `input` and write both exports into `out_dir`
///
/// Existing exports are replaced. Fails with [`ExcelError::NoCepsFound`]
/// when the sheet is empty or no value has eight digits.
///
/// # Examples
///
/// ```no_run
/// use cepsheet::batch::process_workbook;
///
/// let processed = process_workbook("clientes.xlsx", ".")?;
/// println!("{} CEPs -> {}", processed.ceps.len(), processed.xlsx.display());
/// # Ok::<(), cepsheet::ExcelError>(())
/// ```
pub fn process_workbook<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    out_dir: Q,
) -> Result<ProcessedCeps> {
    let input = input.as_ref();
    let ceps = Table::read_excel(input)?.extract_ceps();
    if ceps.is_empty() {
        return Err(ExcelError::NoCepsFound(input.display().to_string()));
    }
    tracing::debug!(input = %input.display(), count = ceps.len(), "extracted CEPs");

    let table = processed_table(&ceps)?;
    let out_dir = out_dir.as_ref();
    let xlsx = out_dir.join(format!("{}.xlsx", PROCESSED_STEM));
    let csv = out_dir.join(format!("{}.csv", PROCESSED_STEM));

    let options = ExcelOptions {
        sheet_name: PROCESSED_SHEET.to_string(),
        ..ExcelOptions::default()
    };
    table.to_excel(&xlsx, &options)?;
    table.to_csv(&csv)?;

    tracing::info!(
        input = %input.display(),
        count = ceps.len(),
        xlsx = %xlsx.display(),
        csv = %csv.display(),
        "processed CEPs"
    );
    Ok(ProcessedCeps { ceps, xlsx, csv })
}
