//! In-memory table of named columns
//!
//! A [`Table`] keeps its columns in insertion order and guarantees every
//! column has the same number of values. It is the unit that gets exported
//! to XLSX or CSV and the shape a sheet is read back into.

use crate::cep::normalize_cep;
use crate::error::{ExcelError, Result};
use crate::reader::ExcelReader;
use crate::types::{CellStyle, CellValue};
use crate::writer::{ExcelWriterBuilder, DEFAULT_COMPRESSION_LEVEL, DEFAULT_SHEET_NAME};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Options for [`Table::to_excel`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcelOptions {
    /// Name of the single sheet written
    pub sheet_name: String,
    /// Write a leading unnamed column holding the row number (0-based)
    pub index: bool,
    /// Render header (and index) cells bold with borders
    pub header_bold: bool,
    /// Deflate level, 0-9
    pub compression_level: u32,
}

impl Default for ExcelOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            index: false,
            header_bold: true,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

/// Ordered set of equally long, uniquely named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexMap<String, Vec<CellValue>>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a single-column table
    ///
    /// One column can never disagree on length, so this cannot fail.
    pub fn with_column<N, V, C>(name: N, values: V) -> Self
    where
        N: Into<String>,
        V: IntoIterator<Item = C>,
        C: Into<CellValue>,
    {
        let mut columns = IndexMap::new();
        columns.insert(name.into(), values.into_iter().map(Into::into).collect());
        Self { columns }
    }

    /// Build a table from `(name, values)` pairs, in order
    ///
    /// # Examples
    ///
    /// ```
    /// use cepsheet::table::Table;
    ///
    /// let table = Table::from_columns([("CEP", vec!["01310-100", "20040-020"])])?;
    /// assert_eq!(table.row_count(), 2);
    /// assert_eq!(table.column_names(), vec!["CEP"]);
    /// # Ok::<(), cepsheet::ExcelError>(())
    /// ```
    pub fn from_columns<I, N, V, C>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: IntoIterator<Item = C>,
        C: Into<CellValue>,
    {
        let mut table = Self::new();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Append a column at the end
    ///
    /// Fails if the name is taken or the length differs from the existing
    /// columns. The first column fixes the row count.
    pub fn push_column<N, V, C>(&mut self, name: N, values: V) -> Result<()>
    where
        N: Into<String>,
        V: IntoIterator<Item = C>,
        C: Into<CellValue>,
    {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(ExcelError::DuplicateColumn(name));
        }

        let values: Vec<CellValue> = values.into_iter().map(Into::into).collect();
        if let Some(expected) = self.columns.values().next().map(Vec::len) {
            if values.len() != expected {
                return Err(ExcelError::ShapeMismatch {
                    column: name,
                    expected,
                    actual: values.len(),
                });
            }
        }

        self.columns.insert(name, values);
        Ok(())
    }

    /// Column names in output order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Values of a column
    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// First column whose name contains `needle`, ignoring case
    ///
    /// This is how an imported sheet's CEP column is located when the header
    /// is spelled "cep", "CEP_Original" and so on.
    pub fn find_column_containing(&self, needle: &str) -> Option<&str> {
        let needle = needle.to_lowercase();
        self.columns
            .keys()
            .find(|name| name.to_lowercase().contains(&needle))
            .map(String::as_str)
    }

    /// Postal codes found in an imported sheet, as 8-digit strings
    ///
    /// The column is the first whose header contains "cep" (any case). When
    /// no header matches, the first column is used and its header cell is
    /// treated as data, since such a sheet has no header row. Every value is
    /// stripped to its digits and kept only when exactly 8 remain.
    ///
    /// # Examples
    ///
    /// ```
    /// use cepsheet::table::Table;
    ///
    /// let table = Table::from_columns([
    ///     ("Nome", vec!["Sede", "Filial", "Depósito"]),
    ///     ("Cep do cliente", vec!["01310-100", "sem cep", "20.040-020"]),
    /// ])?;
    /// assert_eq!(table.extract_ceps(), vec!["01310100", "20040020"]);
    /// # Ok::<(), cepsheet::ExcelError>(())
    /// ```
    pub fn extract_ceps(&self) -> Vec<String> {
        let (name, header_is_data) = match self.find_column_containing("cep") {
            Some(name) => (name, false),
            None => match self.columns.keys().next() {
                Some(first) => (first.as_str(), true),
                None => return Vec::new(),
            },
        };

        let header = header_is_data.then(|| CellValue::String(name.to_string()));
        header
            .iter()
            .chain(self.columns[name].iter())
            .filter_map(|cell| normalize_cep(&cell.as_string()))
            .collect()
    }

    /// Number of data rows (header excluded)
    pub fn row_count(&self) -> usize {
        self.columns.values().next().map(Vec::len).unwrap_or(0)
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Row-major view of the values
    pub fn rows(&self) -> Vec<Vec<CellValue>> {
        (0..self.row_count())
            .map(|row| {
                self.columns
                    .values()
                    .map(|column| column[row].clone())
                    .collect()
            })
            .collect()
    }

    /// Write the table to an XLSX file with one sheet
    ///
    /// The first row holds the column names; each following row is a record.
    /// With `options.index` a leading column numbers the records from 0 and
    /// its header cell is left empty.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cepsheet::table::{ExcelOptions, Table};
    ///
    /// let table = Table::from_columns([("CEP", vec!["01310-100"])])?;
    /// table.to_excel("ceps.xlsx", &ExcelOptions::default())?;
    /// # Ok::<(), cepsheet::ExcelError>(())
    /// ```
    pub fn to_excel<P: AsRef<Path>>(&self, path: P, options: &ExcelOptions) -> Result<()> {
        let mut writer = ExcelWriterBuilder::new(path.as_ref())
            .with_sheet_name(&options.sheet_name)
            .with_compression_level(options.compression_level)
            .build()?;

        let header_style = if options.header_bold {
            CellStyle::HeaderBold
        } else {
            CellStyle::Default
        };

        let mut header = Vec::with_capacity(self.column_count() + 1);
        if options.index {
            header.push((CellValue::Empty, CellStyle::Default));
        }
        header.extend(
            self.columns
                .keys()
                .map(|name| (CellValue::String(name.clone()), header_style)),
        );
        writer.write_row_styled(&header)?;

        for (i, row) in self.rows().into_iter().enumerate() {
            let mut cells = Vec::with_capacity(row.len() + 1);
            if options.index {
                cells.push((CellValue::Int(i as i64), header_style));
            }
            cells.extend(row.into_iter().map(|value| (value, CellStyle::Default)));
            writer.write_row_styled(&cells)?;
        }

        tracing::debug!(
            path = %path.as_ref().display(),
            rows = self.row_count(),
            columns = self.column_count(),
            index = options.index,
            "exported table"
        );
        writer.save()
    }

    /// Write the table as comma-separated values with a header line
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        writer.write_record(self.columns.keys())?;
        for row in self.rows() {
            writer.write_record(row.iter().map(CellValue::as_string))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read the first sheet of an XLSX file
    ///
    /// The first row is the header. Rows shorter than the header are padded
    /// with `Empty`; cells beyond the header are dropped. Empty header cells
    /// become `Unnamed: <n>`, and a name seen before gets a `.1`, `.2`, ...
    /// suffix, so any header row gives a valid table.
    pub fn read_excel<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = ExcelReader::open(path)?;
        let mut rows = reader.rows_by_index(0)?;

        let Some(header) = rows.next().transpose()? else {
            return Ok(Self::new());
        };

        let names = unique_names(header.cells.iter().enumerate().map(|(i, cell)| match cell {
            CellValue::Empty => format!("Unnamed: {}", i),
            other => other.as_string(),
        }));

        let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];
        for row in rows {
            let row = row?;
            for (col, values) in columns.iter_mut().enumerate() {
                values.push(row.get(col).cloned().unwrap_or(CellValue::Empty));
            }
        }

        Self::from_columns(names.into_iter().zip(columns))
    }
}

/// Rename repeated header names `name.1`, `name.2`, ... in order of appearance
fn unique_names<I: IntoIterator<Item = String>>(raw: I) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::new();

    for name in raw {
        let suffix = suffixes.entry(name.clone()).or_insert(0);
        let mut candidate = name.clone();
        while taken.contains(&candidate) {
            *suffix += 1;
            candidate = format!("{}.{}", name, suffix);
        }
        taken.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ceps() -> Table {
        Table::from_columns([("CEP", vec!["01310-100", "20040-020"])]).unwrap()
    }

    #[test]
    fn test_shape_is_enforced() {
        let mut table = ceps();
        let err = table.push_column("Cidade", vec!["São Paulo"]).unwrap_err();
        assert!(matches!(
            err,
            ExcelError::ShapeMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));

        let err = table.push_column("CEP", vec!["x", "y"]).unwrap_err();
        assert!(matches!(err, ExcelError::DuplicateColumn(_)));

        table
            .push_column("Cidade", vec!["São Paulo", "Rio de Janeiro"])
            .unwrap();
        assert_eq!(table.column_names(), vec!["CEP", "Cidade"]);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_rows_are_row_major() {
        let mut table = ceps();
        table.push_column("N", vec![1i64, 2]).unwrap();

        assert_eq!(
            table.rows(),
            vec![
                vec![CellValue::from("01310-100"), CellValue::Int(1)],
                vec![CellValue::from("20040-020"), CellValue::Int(2)],
            ]
        );
    }

    #[test]
    fn test_find_column_containing() {
        let table = Table::from_columns([
            ("Nome", vec!["a"]),
            ("cep_original", vec!["01310100"]),
            ("CEP", vec!["01310-100"]),
        ])
        .unwrap();

        assert_eq!(table.find_column_containing("CEP"), Some("cep_original"));
        assert_eq!(table.find_column_containing("bairro"), None);
    }

    #[test]
    fn test_extract_ceps_from_matching_column() {
        let table = Table::from_columns([
            ("Nome", vec!["Sede", "Filial", "Loja", "Depósito"]),
            ("Cep", vec!["01310-100", "123", "", "30.112-000"]),
        ])
        .unwrap();

        assert_eq!(table.extract_ceps(), vec!["01310100", "30112000"]);
    }

    #[test]
    fn test_extract_ceps_falls_back_to_first_column() {
        // No header row: the first CEP was taken as the column name
        let table = Table::from_columns([
            ("01310-100", vec!["20040-020", "não é cep"]),
            ("São Paulo", vec!["Rio de Janeiro", ""]),
        ])
        .unwrap();

        assert_eq!(table.extract_ceps(), vec!["01310100", "20040020"]);
        assert!(Table::new().extract_ceps().is_empty());
    }

    #[test]
    fn test_with_column() {
        let table = Table::with_column("CEP", ["01310-100", "20040-020"]);
        assert_eq!(table.column_names(), vec!["CEP"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_unique_names() {
        let names = unique_names(["CEP", "CEP", "CEP.1", "CEP"].map(String::from));
        assert_eq!(names, vec!["CEP", "CEP.1", "CEP.1.1", "CEP.2"]);
    }

    #[test]
    fn test_read_excel_with_repeated_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("repetidos.xlsx");

        let mut writer = ExcelWriterBuilder::new(&path).build().unwrap();
        writer.write_header(["CEP", "CEP", "", "Unnamed: 2"]).unwrap();
        writer
            .write_row(["01310-100", "20040-020", "x", "y"])
            .unwrap();
        writer.save().unwrap();

        let table = Table::read_excel(&path).unwrap();
        assert_eq!(
            table.column_names(),
            vec!["CEP", "CEP.1", "Unnamed: 2", "Unnamed: 2.1"]
        );
        assert_eq!(table.column("CEP.1").unwrap()[0].as_str(), Some("20040-020"));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert!(table.rows().is_empty());
    }

    #[test]
    fn test_excel_round_trip_with_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("indexed.xlsx");

        let options = ExcelOptions {
            index: true,
            ..ExcelOptions::default()
        };
        ceps().to_excel(&path, &options).unwrap();

        let back = Table::read_excel(&path).unwrap();
        assert_eq!(back.column_names(), vec!["Unnamed: 0", "CEP"]);
        assert_eq!(
            back.column("Unnamed: 0").unwrap(),
            &[CellValue::Int(0), CellValue::Int(1)]
        );
    }

    #[test]
    fn test_to_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ceps.csv");

        let mut table = ceps();
        table.push_column("Cidade", vec!["São Paulo, SP", "Rio"]).unwrap();
        table.to_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.lines().collect::<Vec<_>>(),
            vec!["CEP,Cidade", "01310-100,\"São Paulo, SP\"", "20040-020,Rio"]
        );
    }
}
