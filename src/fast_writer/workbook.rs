//! Streaming workbook - row XML goes straight into the ZIP compressor

use super::xml;
use crate::error::{ExcelError, Result};
use crate::types::{CellValue, StyledCell};
use s_zip::StreamingZipWriter;
use std::fs::File;
use std::path::Path;

/// Characters Excel refuses in sheet names
const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Maximum sheet name length accepted by Excel
const MAX_SHEET_NAME_LEN: usize = 31;

/// Workbook that streams each worksheet into the archive as rows arrive
///
/// Worksheets are written first, in order. The remaining package parts
/// (content types, relationships, styles, properties) are written by
/// [`FastWorkbook::close`], once the sheet list is known.
pub struct FastWorkbook {
    zip_writer: StreamingZipWriter<File>,
    worksheets: Vec<String>,
    current_row: u32,
    max_col: u32,
    xml_buffer: Vec<u8>,
    in_worksheet: bool,
}

impl FastWorkbook {
    /// Create the output file with the default compression level (6)
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_compression(path, 6)
    }

    /// Create the output file, truncating any existing one
    ///
    /// `compression_level` is clamped to 0-9.
    pub fn with_compression<P: AsRef<Path>>(path: P, compression_level: u32) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_str().ok_or_else(|| {
            ExcelError::WriteError(format!("Path is not valid UTF-8: {}", path.display()))
        })?;
        let zip_writer = StreamingZipWriter::with_compression(path_str, compression_level.min(9))
            .map_err(ExcelError::zip)?;

        tracing::debug!(path = %path.display(), compression_level, "created workbook");

        Ok(Self {
            zip_writer,
            worksheets: Vec::new(),
            current_row: 0,
            max_col: 0,
            xml_buffer: Vec::with_capacity(4096),
            in_worksheet: false,
        })
    }

    /// Finish the current worksheet (if any) and start a new one
    pub fn add_worksheet(&mut self, name: &str) -> Result<()> {
        self.validate_sheet_name(name)?;
        self.finish_current_worksheet()?;

        self.worksheets.push(name.to_string());
        self.current_row = 0;
        self.max_col = 0;

        let entry_name = format!("xl/worksheets/sheet{}.xml", self.worksheets.len());
        self.zip_writer
            .start_entry(&entry_name)
            .map_err(ExcelError::zip)?;
        self.zip_writer
            .write_data(xml::WORKSHEET_START.as_bytes())
            .map_err(ExcelError::zip)?;
        self.in_worksheet = true;

        tracing::debug!(sheet = name, entry = %entry_name, "started worksheet");
        Ok(())
    }

    /// Write a row of plain strings as inline-string cells
    ///
    /// Empty strings become empty cells.
    pub fn write_row<I, S>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.begin_row()?;

        let mut num_buffer = itoa::Buffer::new();
        let mut col_count = 0;
        for (col_idx, value) in values.into_iter().enumerate() {
            col_count += 1;
            self.push_cell_ref(&mut num_buffer, col_idx as u32);

            let v = value.as_ref();
            if v.is_empty() {
                self.xml_buffer.extend_from_slice(b"\"/>");
            } else {
                self.xml_buffer
                    .extend_from_slice(b"\" t=\"inlineStr\"><is><t>");
                xml::write_escaped(&mut self.xml_buffer, v);
                self.xml_buffer.extend_from_slice(b"</t></is></c>");
            }
        }
        self.max_col = self.max_col.max(col_count);

        self.end_row()
    }

    /// Write a row with typed values and cell styles
    pub fn write_row_styled(&mut self, cells: &[StyledCell]) -> Result<()> {
        self.begin_row()?;
        self.max_col = self.max_col.max(cells.len() as u32);

        let mut num_buffer = itoa::Buffer::new();
        for (col_idx, styled_cell) in cells.iter().enumerate() {
            self.push_cell_ref(&mut num_buffer, col_idx as u32);
            self.xml_buffer.extend_from_slice(b"\"");

            let style_id = styled_cell.style.index();
            if style_id > 0 {
                self.xml_buffer.extend_from_slice(b" s=\"");
                self.xml_buffer
                    .extend_from_slice(num_buffer.format(style_id).as_bytes());
                self.xml_buffer.extend_from_slice(b"\"");
            }

            match &styled_cell.value {
                CellValue::Empty => {
                    self.xml_buffer.extend_from_slice(b"/>");
                }
                CellValue::Int(i) => {
                    self.xml_buffer.extend_from_slice(b" t=\"n\"><v>");
                    self.xml_buffer
                        .extend_from_slice(num_buffer.format(*i).as_bytes());
                    self.xml_buffer.extend_from_slice(b"</v></c>");
                }
                CellValue::Float(f) if f.is_finite() => {
                    // `{:?}` keeps the fraction ("3.0") so the cell reads back as a float
                    self.xml_buffer.extend_from_slice(b" t=\"n\"><v>");
                    self.xml_buffer
                        .extend_from_slice(format!("{:?}", f).as_bytes());
                    self.xml_buffer.extend_from_slice(b"</v></c>");
                }
                CellValue::Float(_) => {
                    // NaN and infinities have no numeric cell form
                    self.xml_buffer
                        .extend_from_slice(b" t=\"e\"><v>#NUM!</v></c>");
                }
                CellValue::Bool(b) => {
                    self.xml_buffer.extend_from_slice(b" t=\"b\"><v>");
                    self.xml_buffer
                        .extend_from_slice(if *b { b"1" } else { b"0" });
                    self.xml_buffer.extend_from_slice(b"</v></c>");
                }
                CellValue::String(s) => {
                    self.xml_buffer
                        .extend_from_slice(b" t=\"inlineStr\"><is><t>");
                    xml::write_escaped(&mut self.xml_buffer, s);
                    self.xml_buffer.extend_from_slice(b"</t></is></c>");
                }
            }
        }

        self.end_row()
    }

    /// Rows written to the current worksheet
    pub fn current_row(&self) -> u32 {
        self.current_row
    }

    /// Widest row written to the current worksheet
    pub fn max_col(&self) -> u32 {
        self.max_col
    }

    /// Names of the worksheets added so far
    pub fn worksheet_names(&self) -> &[String] {
        &self.worksheets
    }

    /// Write the remaining package parts and finish the archive
    pub fn close(mut self) -> Result<()> {
        self.finish_current_worksheet()?;

        let sheet_count = self.worksheets.len();
        let parts = [
            ("[Content_Types].xml", xml::content_types(sheet_count)),
            ("_rels/.rels", xml::ROOT_RELS.to_string()),
            ("xl/workbook.xml", xml::workbook(&self.worksheets)),
            ("xl/_rels/workbook.xml.rels", xml::workbook_rels(sheet_count)),
            ("xl/styles.xml", xml::STYLES.to_string()),
            ("xl/sharedStrings.xml", xml::SHARED_STRINGS.to_string()),
            ("docProps/app.xml", xml::APP_PROPS.to_string()),
            ("docProps/core.xml", xml::CORE_PROPS.to_string()),
        ];

        for (name, content) in &parts {
            self.write_part(name, content)?;
        }

        self.zip_writer.finish().map_err(ExcelError::zip)?;
        tracing::debug!(sheets = sheet_count, "closed workbook");
        Ok(())
    }

    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        let reason = if name.is_empty() {
            Some("name is empty".to_string())
        } else if name.chars().count() > MAX_SHEET_NAME_LEN {
            Some(format!("longer than {} characters", MAX_SHEET_NAME_LEN))
        } else if let Some(c) = name.chars().find(|c| INVALID_SHEET_CHARS.contains(c)) {
            Some(format!("contains '{}'", c))
        } else if self
            .worksheets
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(name))
        {
            Some("a sheet with this name already exists".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ExcelError::InvalidSheetName {
                name: name.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn begin_row(&mut self) -> Result<()> {
        if !self.in_worksheet {
            return Err(ExcelError::WriteError("No worksheet started".to_string()));
        }

        self.current_row += 1;

        self.xml_buffer.clear();
        self.xml_buffer.extend_from_slice(b"<row r=\"");
        let mut num_buffer = itoa::Buffer::new();
        self.xml_buffer
            .extend_from_slice(num_buffer.format(self.current_row).as_bytes());
        self.xml_buffer.extend_from_slice(b"\">");
        Ok(())
    }

    // Leaves the attribute quote open: `<c r="B3`
    fn push_cell_ref(&mut self, num_buffer: &mut itoa::Buffer, col_idx: u32) {
        self.xml_buffer.extend_from_slice(b"<c r=\"");
        xml::push_column_letter(&mut self.xml_buffer, col_idx + 1);
        self.xml_buffer
            .extend_from_slice(num_buffer.format(self.current_row).as_bytes());
    }

    fn end_row(&mut self) -> Result<()> {
        self.xml_buffer.extend_from_slice(b"</row>");
        self.zip_writer
            .write_data(&self.xml_buffer)
            .map_err(ExcelError::zip)
    }

    fn finish_current_worksheet(&mut self) -> Result<()> {
        if self.in_worksheet {
            self.zip_writer
                .write_data(xml::WORKSHEET_END)
                .map_err(ExcelError::zip)?;
            self.in_worksheet = false;
        }
        Ok(())
    }

    fn write_part(&mut self, name: &str, content: &str) -> Result<()> {
        self.zip_writer.start_entry(name).map_err(ExcelError::zip)?;
        self.zip_writer
            .write_data(content.as_bytes())
            .map_err(ExcelError::zip)?;
        tracing::debug!(part = name, bytes = content.len(), "wrote package part");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellStyle;
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_before_sheet_fails() {
        let temp = NamedTempFile::new().unwrap();
        let mut workbook = FastWorkbook::new(temp.path()).unwrap();

        let err = workbook.write_row(["A"]).unwrap_err();
        assert!(matches!(err, ExcelError::WriteError(_)));
    }

    #[test]
    fn test_row_and_column_tracking() {
        let temp = NamedTempFile::new().unwrap();
        let mut workbook = FastWorkbook::new(temp.path()).unwrap();
        workbook.add_worksheet("Sheet1").unwrap();

        workbook.write_row(["A", "B", "C"]).unwrap();
        workbook
            .write_row_styled(&[StyledCell::new(CellValue::Int(1), CellStyle::HeaderBold)])
            .unwrap();
        assert_eq!(workbook.current_row(), 2);
        assert_eq!(workbook.max_col(), 3);

        workbook.add_worksheet("Sheet2").unwrap();
        assert_eq!(workbook.current_row(), 0);
        assert_eq!(workbook.worksheet_names(), ["Sheet1", "Sheet2"]);

        workbook.close().unwrap();
    }

    #[test]
    fn test_sheet_name_rules() {
        let temp = NamedTempFile::new().unwrap();
        let mut workbook = FastWorkbook::new(temp.path()).unwrap();

        assert!(workbook.add_worksheet("").is_err());
        assert!(workbook.add_worksheet("a/b").is_err());
        assert!(workbook.add_worksheet(&"x".repeat(32)).is_err());
        assert!(workbook.add_worksheet(&"x".repeat(31)).is_ok());

        workbook.add_worksheet("Dados").unwrap();
        let err = workbook.add_worksheet("DADOS").unwrap_err();
        assert!(matches!(err, ExcelError::InvalidSheetName { .. }));

        workbook.close().unwrap();
    }
}
