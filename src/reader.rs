//! XLSX file reading
//!
//! The reader understands the subset of SpreadsheetML that simple data
//! sheets use: shared strings, inline strings, numbers and booleans.
//! Styles, formulas and merged cells are ignored.
//!
//! **Memory Usage:**
//! - Shared Strings Table (SST): loaded fully in `open()`
//! - Worksheet XML: loaded when `rows()` is called for that sheet

use crate::error::{ExcelError, Result};
use crate::fast_writer::xml::decode_entities;
use crate::types::{column_index, CellValue, Row};
use s_zip::StreamingZipReader;
use std::path::{Path, PathBuf};

/// XLSX reader
///
/// # Examples
///
/// ```no_run
/// use cepsheet::reader::ExcelReader;
///
/// let mut reader = ExcelReader::open("exemplo_ceps.xlsx")?;
/// for row in reader.rows("Sheet1")? {
///     let row = row?;
///     println!("Row {}: {:?}", row.index, row.to_strings());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ExcelReader {
    path: PathBuf,
    sst: Vec<String>,
    sheet_names: Vec<String>,
    sheet_paths: Vec<String>,
}

impl ExcelReader {
    /// Open an XLSX file, loading its shared strings and sheet list
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut archive = StreamingZipReader::open(&path)
            .map_err(|e| ExcelError::ReadError(format!("Failed to open ZIP: {}", e)))?;

        // No SST means every string cell is inline
        let sst = match archive.read_entry_by_name("xl/sharedStrings.xml") {
            Ok(data) => parse_shared_strings(&String::from_utf8_lossy(&data)),
            Err(_) => Vec::new(),
        };

        let workbook_xml = archive
            .read_entry_by_name("xl/workbook.xml")
            .map_err(|e| ExcelError::ReadError(format!("Failed to open workbook.xml: {}", e)))?;
        let rels_xml = archive
            .read_entry_by_name("xl/_rels/workbook.xml.rels")
            .map_err(|e| {
                ExcelError::ReadError(format!("Failed to open workbook.xml.rels: {}", e))
            })?;

        let (sheet_names, sheet_paths) = parse_sheet_info(
            &String::from_utf8_lossy(&workbook_xml),
            &String::from_utf8_lossy(&rels_xml),
        )?;

        tracing::info!(
            path = %path.display(),
            sheets = sheet_names.len(),
            shared_strings = sst.len(),
            "opened workbook"
        );

        Ok(ExcelReader {
            path,
            sst,
            sheet_names,
            sheet_paths,
        })
    }

    /// Get list of sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheet_names.clone()
    }

    /// Get the number of sheets in the workbook
    pub fn sheet_count(&self) -> usize {
        self.sheet_names.len()
    }

    /// Read all rows of a sheet
    ///
    /// Rows with no cells in the file are skipped; `Row::index` keeps the
    /// sheet position (0-based) so gaps stay visible.
    pub fn rows(&mut self, sheet_name: &str) -> Result<RowIterator<'_>> {
        let sheet_path = self
            .sheet_names
            .iter()
            .position(|name| name == sheet_name)
            .and_then(|idx| self.sheet_paths.get(idx))
            .ok_or_else(|| ExcelError::SheetNotFound {
                sheet: sheet_name.to_string(),
                available: self.sheet_names.join(", "),
            })?
            .clone();

        let mut archive = StreamingZipReader::open(&self.path)
            .map_err(|e| ExcelError::ReadError(format!("Failed to open ZIP: {}", e)))?;
        let data = archive
            .read_entry_by_name(&sheet_path)
            .map_err(|e| ExcelError::ReadError(format!("Failed to open sheet: {}", e)))?;
        let xml = String::from_utf8(data)
            .map_err(|e| ExcelError::ReadError(format!("Sheet XML is not UTF-8: {}", e)))?;

        tracing::debug!(sheet = sheet_name, entry = %sheet_path, bytes = xml.len(), "loaded worksheet");

        Ok(RowIterator {
            xml,
            pos: 0,
            next_index: 0,
            sst: &self.sst,
        })
    }

    /// Read all rows from a sheet by index (0-based)
    pub fn rows_by_index(&mut self, index: usize) -> Result<RowIterator<'_>> {
        let sheet_name = self
            .sheet_names
            .get(index)
            .ok_or_else(|| ExcelError::SheetNotFound {
                sheet: format!("index {}", index),
                available: self.sheet_names.join(", "),
            })?
            .clone();

        self.rows(&sheet_name)
    }

    /// Count rows and the widest row of a sheet
    pub fn dimensions(&mut self, sheet_name: &str) -> Result<(usize, usize)> {
        let mut row_count = 0;
        let mut max_cols = 0;

        for row in self.rows(sheet_name)? {
            let row = row?;
            row_count += 1;
            max_cols = max_cols.max(row.len());
        }

        Ok((row_count, max_cols))
    }
}

/// Iterator over the rows of one worksheet
pub struct RowIterator<'a> {
    xml: String,
    pos: usize,
    next_index: u32,
    sst: &'a [String],
}

impl Iterator for RowIterator<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let start = self.pos + find_tag(&self.xml[self.pos..], "row")?;
            let open_end = start + self.xml[start..].find('>')?;
            let open_tag = &self.xml[start..=open_end];

            let index = attribute(open_tag, "r")
                .and_then(|r| r.parse::<u32>().ok())
                .map(|r| r.saturating_sub(1))
                .unwrap_or(self.next_index);
            self.next_index = index + 1;

            if open_tag.ends_with("/>") {
                self.pos = open_end + 1;
                continue;
            }

            let Some(close) = self.xml[open_end..].find("</row>") else {
                self.pos = self.xml.len();
                return Some(Err(ExcelError::ReadError(format!(
                    "Unterminated <row> at row {}",
                    index + 1
                ))));
            };
            let body_end = open_end + close;
            self.pos = body_end + "</row>".len();

            let cells = parse_cells(&self.xml[open_end + 1..body_end], self.sst);
            return Some(Ok(Row::new(index, cells)));
        }
    }
}

/// Find the next `<name` start tag (not a longer tag sharing the prefix)
fn find_tag(xml: &str, name: &str) -> Option<usize> {
    let needle = format!("<{}", name);
    let mut from = 0;
    while let Some(found) = xml[from..].find(&needle) {
        let at = from + found;
        match xml.as_bytes().get(at + needle.len()) {
            Some(b' ') | Some(b'>') | Some(b'/') | Some(b'\t') | Some(b'\n') | Some(b'\r') => {
                return Some(at)
            }
            Some(_) => from = at + needle.len(),
            None => return None,
        }
    }
    None
}

/// Value of `name="..."` inside a start tag
fn attribute<'t>(tag: &'t str, name: &str) -> Option<&'t str> {
    let needle = format!(" {}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let end = tag[start..].find('"')?;
    Some(&tag[start..start + end])
}

/// Text between `<name>` (with optional attributes) and `</name>`
fn element_text<'t>(xml: &'t str, name: &str) -> Option<&'t str> {
    let start = find_tag(xml, name)?;
    let open_end = start + xml[start..].find('>')?;
    if xml[..=open_end].ends_with("/>") {
        return Some("");
    }
    let close = format!("</{}>", name);
    let end = xml[open_end..].find(&close)?;
    Some(&xml[open_end + 1..open_end + end])
}

/// Concatenate every `<t>` run in a fragment (rich text has several)
fn collect_text(xml: &str) -> String {
    let mut text = String::new();
    let mut pos = 0;
    while let Some(found) = find_tag(&xml[pos..], "t") {
        let start = pos + found;
        let Some(open_len) = xml[start..].find('>') else {
            break;
        };
        let open_end = start + open_len;
        if xml[..=open_end].ends_with("/>") {
            pos = open_end + 1;
            continue;
        }
        let Some(close) = xml[open_end..].find("</t>") else {
            break;
        };
        text.push_str(&decode_entities(&xml[open_end + 1..open_end + close]));
        pos = open_end + close + "</t>".len();
    }
    text
}

fn parse_shared_strings(xml: &str) -> Vec<String> {
    let mut sst = Vec::new();
    let mut pos = 0;
    while let Some(found) = find_tag(&xml[pos..], "si") {
        let start = pos + found;
        let Some(end) = xml[start..].find("</si>") else {
            break;
        };
        sst.push(collect_text(&xml[start..start + end]));
        pos = start + end + "</si>".len();
    }
    sst
}

/// Map sheet names (workbook order) to archive paths through the rels part
fn parse_sheet_info(workbook_xml: &str, rels_xml: &str) -> Result<(Vec<String>, Vec<String>)> {
    let mut sheet_names = Vec::new();
    let mut sheet_paths = Vec::new();

    let mut pos = 0;
    while let Some(found) = find_tag(&workbook_xml[pos..], "sheet") {
        let start = pos + found;
        let Some(end) = workbook_xml[start..].find('>') else {
            break;
        };
        let tag = &workbook_xml[start..=start + end];
        pos = start + end + 1;

        let (Some(name), Some(rid)) = (attribute(tag, "name"), attribute(tag, "r:id")) else {
            return Err(ExcelError::ReadError(format!(
                "Malformed sheet entry in workbook.xml: {}",
                tag
            )));
        };

        let target = relationship_target(rels_xml, rid).ok_or_else(|| {
            ExcelError::ReadError(format!("No relationship for sheet '{}' ({})", name, rid))
        })?;
        let full_path = match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("xl/{}", target),
        };

        sheet_names.push(decode_entities(name));
        sheet_paths.push(full_path);
    }

    Ok((sheet_names, sheet_paths))
}

fn relationship_target<'x>(rels_xml: &'x str, rid: &str) -> Option<&'x str> {
    let mut pos = 0;
    while let Some(found) = find_tag(&rels_xml[pos..], "Relationship") {
        let start = pos + found;
        let end = start + rels_xml[start..].find('>')?;
        let tag = &rels_xml[start..=end];
        if attribute(tag, "Id") == Some(rid) {
            return attribute(tag, "Target");
        }
        pos = end + 1;
    }
    None
}

fn parse_cells(row_xml: &str, sst: &[String]) -> Vec<CellValue> {
    let mut cells = Vec::new();
    let mut pos = 0;

    while let Some(found) = find_tag(&row_xml[pos..], "c") {
        let start = pos + found;
        let Some(open_len) = row_xml[start..].find('>') else {
            break;
        };
        let open_end = start + open_len;
        let open_tag = &row_xml[start..=open_end];

        let (body, cell_end) = if open_tag.ends_with("/>") {
            ("", open_end + 1)
        } else {
            match row_xml[open_end..].find("</c>") {
                Some(close) => (
                    &row_xml[open_end + 1..open_end + close],
                    open_end + close + "</c>".len(),
                ),
                None => break,
            }
        };
        pos = cell_end;

        let col_idx = attribute(open_tag, "r")
            .map(column_index)
            .unwrap_or(cells.len());

        // Fill skipped columns
        while cells.len() < col_idx {
            cells.push(CellValue::Empty);
        }

        let value = cell_value(attribute(open_tag, "t"), body, sst);
        if col_idx < cells.len() {
            cells[col_idx] = value;
        } else {
            cells.push(value);
        }
    }

    cells
}

fn cell_value(cell_type: Option<&str>, body: &str, sst: &[String]) -> CellValue {
    if cell_type == Some("inlineStr") {
        return match element_text(body, "is") {
            Some(is) => CellValue::String(collect_text(is)),
            None => CellValue::Empty,
        };
    }

    let Some(raw) = element_text(body, "v") else {
        return CellValue::Empty;
    };
    let raw = decode_entities(raw);

    match cell_type {
        Some("s") => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|idx| sst.get(idx))
            .map(|s| CellValue::String(s.clone()))
            .unwrap_or(CellValue::Empty),
        Some("b") => CellValue::Bool(raw.trim() == "1"),
        Some("str") | Some("e") => CellValue::String(raw),
        _ => {
            let trimmed = raw.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                CellValue::Int(i)
            } else if let Ok(f) = trimmed.parse::<f64>() {
                CellValue::Float(f)
            } else {
                CellValue::String(raw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tag_skips_longer_names() {
        let xml = "<cols/><c r=\"A1\"/>";
        assert_eq!(find_tag(xml, "c"), Some(7));
        assert_eq!(find_tag("<sheets><sheet name=\"a\"/>", "sheet"), Some(8));
        assert_eq!(find_tag("<rows>", "row"), None);
    }

    #[test]
    fn test_parse_shared_strings() {
        let xml = r#"<sst count="3" uniqueCount="3"><si><t>CEP</t></si><si><t xml:space="preserve"> 01310-100 </t></si><si><r><t>a</t></r><r><rPr><b/></rPr><t>b</t></r></si></sst>"#;
        assert_eq!(parse_shared_strings(xml), vec!["CEP", " 01310-100 ", "ab"]);
    }

    #[test]
    fn test_parse_sheet_info() {
        let workbook = r#"<workbook><sheets><sheet name="Dados &amp; CEPs" sheetId="1" r:id="rId3"/><sheet name="Outra" sheetId="2" r:id="rId1"/></sheets></workbook>"#;
        let rels = r#"<Relationships><Relationship Id="rId1" Type="x" Target="worksheets/sheet2.xml"/><Relationship Id="rId3" Type="x" Target="/xl/worksheets/sheet1.xml"/></Relationships>"#;

        let (names, paths) = parse_sheet_info(workbook, rels).unwrap();
        assert_eq!(names, vec!["Dados & CEPs", "Outra"]);
        assert_eq!(
            paths,
            vec!["xl/worksheets/sheet1.xml", "xl/worksheets/sheet2.xml"]
        );
    }

    #[test]
    fn test_parse_cells_types_and_gaps() {
        let sst = vec!["CEP".to_string()];
        let row = r#"<c r="A1" t="s"><v>0</v></c><c r="C1" t="inlineStr"><is><t>x &amp; y</t></is></c><c r="D1"><v>42</v></c><c r="E1" t="n"><v>1.5</v></c><c r="F1" t="b"><v>1</v></c><c r="G1" s="1"/>"#;

        let cells = parse_cells(row, &sst);
        assert_eq!(
            cells,
            vec![
                CellValue::String("CEP".to_string()),
                CellValue::Empty,
                CellValue::String("x & y".to_string()),
                CellValue::Int(42),
                CellValue::Float(1.5),
                CellValue::Bool(true),
                CellValue::Empty,
            ]
        );
    }

    #[test]
    fn test_row_iterator_keeps_sheet_positions() {
        let xml = r#"<sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>CEP</t></is></c></row><row r="2"/><row r="4"><c r="A4" t="inlineStr"><is><t>01310-100</t></is></c></row></sheetData>"#;
        let sst = Vec::new();
        let rows: Vec<Row> = RowIterator {
            xml: xml.to_string(),
            pos: 0,
            next_index: 0,
            sst: &sst,
        }
        .collect::<Result<_>>()
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[1].index, 3);
        assert_eq!(rows[1].to_strings(), vec!["01310-100"]);
    }
}
