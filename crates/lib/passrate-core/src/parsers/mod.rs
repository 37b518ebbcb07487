//! Parsers for uploaded result sheets.
//!
//! The workbook reader turns a spreadsheet into header-keyed rows; the
//! normalizer expands those rows into teacher-result records.

pub mod normalize;
pub mod workbook;

pub use normalize::{NormalizeError, NormalizeOutput, expand_row, normalize_rows, validate_rows};
pub use workbook::{CellValue, RawRow, WorkbookParseError, WorkbookParser};
