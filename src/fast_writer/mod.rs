//! Fast XLSX writer optimized for streaming
//!
//! Rows are rendered into a reusable buffer and handed to the `s-zip`
//! compressor immediately, so nothing but the current row is held in memory.
//!
//! # Examples
//!
//! ```no_run
//! use cepsheet::fast_writer::FastWorkbook;
//!
//! let mut workbook = FastWorkbook::new("output.xlsx")?;
//! workbook.add_worksheet("Sheet1")?;
//!
//! workbook.write_row(&["CEP"])?;
//! workbook.write_row(&["01310-100"])?;
//!
//! workbook.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod workbook;
pub(crate) mod xml;

pub use workbook::FastWorkbook;
