//! XLSX file writing with streaming support
//!
//! Data is written to the archive as you call `write_row()`, not kept in memory.

use crate::error::Result;
use crate::fast_writer::FastWorkbook;
use crate::types::{CellStyle, CellValue, StyledCell};
use std::path::{Path, PathBuf};

/// Default sheet name, the same one spreadsheet tools use for new workbooks
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Default deflate level: balance between speed and size
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// XLSX file writer with streaming capabilities
///
/// # Examples
///
/// ```no_run
/// use cepsheet::writer::ExcelWriter;
///
/// let mut writer = ExcelWriter::new("output.xlsx").unwrap();
/// writer.write_header(&["CEP"]).unwrap();
/// writer.write_row(&["01310-100"]).unwrap();
/// writer.save().unwrap();
/// ```
pub struct ExcelWriter {
    inner: FastWorkbook,
    current_sheet_name: String,
    current_row: u32,
}

impl ExcelWriter {
    /// Create a new writer with a single `Sheet1`
    ///
    /// An existing file at `path` is truncated.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        ExcelWriterBuilder::new(path).build()
    }

    /// Write a row of strings
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cepsheet::writer::ExcelWriter;
    ///
    /// let mut writer = ExcelWriter::new("output.xlsx").unwrap();
    /// writer.write_row(&["20040-020"]).unwrap();
    /// writer.write_row(&["30112-000"]).unwrap();
    /// writer.save().unwrap();
    /// ```
    pub fn write_row<I, S>(&mut self, data: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner.write_row(data)?;
        self.current_row += 1;
        Ok(())
    }

    /// Write multiple rows at once
    pub fn write_rows_batch<I, R, S>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for row_data in rows {
            self.write_row(row_data)?;
        }
        Ok(())
    }

    /// Write a row with typed cell values and default style
    ///
    /// Numbers and booleans keep their type in the sheet.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cepsheet::writer::ExcelWriter;
    /// use cepsheet::types::CellValue;
    ///
    /// let mut writer = ExcelWriter::new("output.xlsx").unwrap();
    /// writer.write_row_typed(&[
    ///     CellValue::String("01310-100".to_string()),
    ///     CellValue::Int(1),
    ///     CellValue::Bool(true),
    /// ]).unwrap();
    /// writer.save().unwrap();
    /// ```
    pub fn write_row_typed(&mut self, cells: &[CellValue]) -> Result<()> {
        self.write_row_with_style(cells, CellStyle::Default)
    }

    /// Write a row with a style per cell
    pub fn write_row_styled(&mut self, cells: &[(CellValue, CellStyle)]) -> Result<()> {
        let styled_cells: Vec<StyledCell> = cells
            .iter()
            .map(|(value, style)| StyledCell::new(value.clone(), *style))
            .collect();

        self.inner.write_row_styled(&styled_cells)?;
        self.current_row += 1;
        Ok(())
    }

    /// Write a row with all cells using the same style
    pub fn write_row_with_style(&mut self, values: &[CellValue], style: CellStyle) -> Result<()> {
        let cells: Vec<_> = values.iter().map(|v| (v.clone(), style)).collect();
        self.write_row_styled(&cells)
    }

    /// Write header row with bold, bordered cells
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cepsheet::writer::ExcelWriter;
    ///
    /// let mut writer = ExcelWriter::new("output.xlsx").unwrap();
    /// writer.write_header_bold(&["CEP"]).unwrap();
    /// writer.write_row(&["40070-110"]).unwrap();
    /// writer.save().unwrap();
    /// ```
    pub fn write_header_bold<I, S>(&mut self, headers: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cells: Vec<_> = headers
            .into_iter()
            .map(|h| (CellValue::String(h.as_ref().to_string()), CellStyle::HeaderBold))
            .collect();
        self.write_row_styled(&cells)
    }

    /// Write header row without formatting
    pub fn write_header<I, S>(&mut self, headers: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.write_row(headers)
    }

    /// Add a new sheet and switch to it
    pub fn add_sheet(&mut self, name: &str) -> Result<()> {
        self.inner.add_worksheet(name)?;
        self.current_sheet_name = name.to_string();
        self.current_row = 0;
        Ok(())
    }

    /// Name of the sheet rows currently go to
    pub fn current_sheet_name(&self) -> &str {
        &self.current_sheet_name
    }

    /// Rows written to the current sheet
    pub fn current_row(&self) -> u32 {
        self.current_row
    }

    /// Save and finalize the workbook
    ///
    /// This closes the archive; the file is not a valid workbook before this returns.
    pub fn save(self) -> Result<()> {
        let sheets = self.inner.worksheet_names().len();
        self.inner.close()?;
        tracing::info!(sheets, "workbook saved");
        Ok(())
    }
}

/// Builder for creating configured writers
pub struct ExcelWriterBuilder {
    path: PathBuf,
    sheet_name: Option<String>,
    compression_level: Option<u32>,
}

impl ExcelWriterBuilder {
    /// Create a new builder
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ExcelWriterBuilder {
            path: path.as_ref().to_path_buf(),
            sheet_name: None,
            compression_level: None,
        }
    }

    /// Set the first sheet's name
    pub fn with_sheet_name(mut self, name: &str) -> Self {
        self.sheet_name = Some(name.to_string());
        self
    }

    /// Set the deflate level (0-9, higher values are clamped)
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Build the writer
    pub fn build(self) -> Result<ExcelWriter> {
        let level = self.compression_level.unwrap_or(DEFAULT_COMPRESSION_LEVEL);
        let mut inner = FastWorkbook::with_compression(&self.path, level)?;

        let sheet_name = self
            .sheet_name
            .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
        inner.add_worksheet(&sheet_name)?;

        tracing::debug!(path = %self.path.display(), sheet = %sheet_name, "opened writer");

        Ok(ExcelWriter {
            inner,
            current_sheet_name: sheet_name,
            current_row: 0,
        })
    }
}
