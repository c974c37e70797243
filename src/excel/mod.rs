//! Spreadsheet reading and header-to-field mapping.

pub mod mapping;
pub mod parser;

pub use mapping::{ColumnIndex, HeaderMapping, ItemField, DEFAULT_PROFILE};
pub use parser::{parse_decimal, parse_rows, parse_workbook, read_sheet_rows, ParsedItems};
