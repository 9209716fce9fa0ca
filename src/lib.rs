//! # cepsheet
//!
//! Builds the sample CEP (Brazilian postal code) spreadsheet, on top of a
//! small streaming XLSX writer and reader.
//!
//! ## Features
//!
//! - **Streaming Write**: rows are compressed into the archive as they are written
//! - **Typed Cells**: strings, integers, floats and booleans keep their type
//! - **Read Back**: shared and inline strings, numbers and booleans
//! - **Tables**: ordered named columns exported to XLSX (with or without an index column) or CSV
//! - **CEP import**: pull the postal codes out of a spreadsheet and export them normalized
//!
//! ## Quick Start
//!
//! ### Writing the sample file
//!
//! ```rust,no_run
//! use cepsheet::sample::write_sample;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let path = write_sample(".")?;
//! println!("{}", path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading it back
//!
//! ```rust,no_run
//! use cepsheet::table::Table;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let table = Table::read_excel("exemplo_ceps.xlsx")?;
//! for value in table.column("CEP").unwrap_or_default() {
//!     println!("{}", value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod cep;
pub mod error;
pub mod fast_writer;
pub mod logging;
pub mod reader;
pub mod sample;
pub mod table;
pub mod types;
pub mod writer;

pub use error::{ExcelError, Result};
pub use reader::ExcelReader;
pub use table::{ExcelOptions, Table};
pub use types::{CellStyle, CellValue, Row, StyledCell};
pub use writer::{ExcelWriter, ExcelWriterBuilder};
