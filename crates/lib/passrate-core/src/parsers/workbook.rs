use std::{collections::BTreeMap, error::Error, fmt, io::Cursor};

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use passrate_store::models::number_text;

/// A single non-empty spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Empty text, zero and `false` count as absent.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::Number(number) => *number != 0.0 && !number.is_nan(),
            Self::Bool(flag) => *flag,
        }
    }

    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number_text(*number),
            Self::Bool(flag) => flag.to_string(),
        }
    }
}

/// One data row keyed by the header row's text. Empty cells are absent.
pub type RawRow = BTreeMap<String, CellValue>;

#[derive(Debug)]
pub struct WorkbookParseError {
    message: String,
}

impl WorkbookParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for WorkbookParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "workbook parse error: {}", self.message)
    }
}

impl Error for WorkbookParseError {}

impl From<calamine::Error> for WorkbookParseError {
    fn from(err: calamine::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<tokio::task::JoinError> for WorkbookParseError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::new(err.to_string())
    }
}

/// Reader for `.xls`/`.xlsx` result sheets.
pub struct WorkbookParser;

impl WorkbookParser {
    /// Reads the first worksheet of a workbook into header-keyed rows.
    ///
    /// # Errors
    /// Returns `WorkbookParseError` if the bytes are not a readable workbook.
    pub fn parse(bytes: Vec<u8>) -> Result<Vec<RawRow>, WorkbookParseError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let Some(first_sheet) = workbook.sheet_names().first().cloned() else {
            return Ok(Vec::new());
        };
        let range = workbook.worksheet_range(&first_sheet)?;
        Ok(rows_from_range(&range))
    }

    /// Reads a workbook on the blocking pool.
    ///
    /// # Errors
    /// Returns `WorkbookParseError` if parsing fails or the task panics.
    pub async fn parse_async(bytes: Vec<u8>) -> Result<Vec<RawRow>, WorkbookParseError> {
        tokio::task::spawn_blocking(move || Self::parse(bytes)).await?
    }
}

/// Uses the first row as headers; rows without any value are skipped.
#[must_use]
pub fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<Option<String>> = header_row
        .iter()
        .map(|cell| cell_value(cell).map(|value| value.to_text()))
        .collect();

    rows.filter_map(|cells| {
        let row: RawRow = cells
            .iter()
            .zip(&headers)
            .filter_map(|(cell, header)| {
                let header = header.as_ref()?;
                Some((header.clone(), cell_value(cell)?))
            })
            .collect();
        (!row.is_empty()).then_some(row)
    })
    .collect()
}

fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            Some(CellValue::Text(text.clone()))
        }
        #[allow(clippy::cast_precision_loss)]
        Data::Int(number) => Some(CellValue::Number(*number as f64)),
        Data::Float(number) => Some(CellValue::Number(*number)),
        Data::Bool(flag) => Some(CellValue::Bool(*flag)),
        Data::DateTime(date) => Some(CellValue::Number(date.as_f64())),
        Data::Error(err) => Some(CellValue::Text(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use rust_xlsxwriter::Workbook;

    use super::*;

    fn text(value: &str) -> Data {
        Data::String(value.to_string())
    }

    #[test]
    fn header_row_keys_each_data_row() {
        let mut range = Range::new((0, 0), (3, 2));
        range.set_value((0, 0), text("Sl. No"));
        range.set_value((0, 1), text("Section"));
        range.set_value((0, 2), text("% of Pass"));
        range.set_value((1, 0), Data::Float(1.0));
        range.set_value((1, 1), text("CSE-A"));
        range.set_value((1, 2), Data::Float(88.5));
        range.set_value((3, 0), Data::Int(2));

        let rows = rows_from_range(&range);

        assert_eq!(rows.len(), 2, "blank row 2 should be skipped");
        assert_eq!(rows[0].get("Sl. No"), Some(&CellValue::Number(1.0)));
        assert_eq!(rows[0].get("Section"), Some(&CellValue::Text("CSE-A".to_string())));
        assert_eq!(rows[1].get("Sl. No"), Some(&CellValue::Number(2.0)));
        assert!(rows[1].get("Section").is_none(), "empty cells are omitted");
    }

    #[test]
    fn cells_under_blank_headers_are_ignored() {
        let mut range = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), text("Sem"));
        range.set_value((1, 0), text("I"));
        range.set_value((1, 1), text("stray"));

        let rows = rows_from_range(&range);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 1);
    }

    #[test]
    fn empty_range_has_no_rows() {
        assert!(rows_from_range(&Range::<Data>::empty()).is_empty());
    }

    #[test]
    fn rejects_bytes_that_are_not_a_workbook() {
        let err = WorkbookParser::parse(b"definitely not a spreadsheet".to_vec())
            .expect_err("garbage should not parse");
        assert!(err.to_string().starts_with("workbook parse error"));
    }

    #[test]
    fn reads_first_sheet_of_xlsx_bytes() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Sl. No").expect("header");
        sheet.write_string(0, 1, "Name of the teacher").expect("header");
        sheet.write_string(0, 2, "% of Pass").expect("header");
        sheet.write_number(1, 0, 1.0).expect("cell");
        sheet.write_string(1, 1, "Dr. Rao/Ms. Kaur").expect("cell");
        sheet.write_number(1, 2, 85.5).expect("cell");
        sheet.write_number(3, 0, 2.0).expect("cell");
        let other = workbook.add_worksheet();
        other.write_string(0, 0, "ignored").expect("cell");
        let bytes = workbook.save_to_buffer().expect("workbook should serialize");

        let rows = WorkbookParser::parse(bytes).expect("xlsx should parse");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Sl. No"), Some(&CellValue::Number(1.0)));
        assert_eq!(
            rows[0].get("Name of the teacher"),
            Some(&CellValue::Text("Dr. Rao/Ms. Kaur".to_string()))
        );
        assert_eq!(rows[0].get("% of Pass"), Some(&CellValue::Number(85.5)));
        assert_eq!(rows[1].len(), 1);
        assert!(rows.iter().all(|row| !row.contains_key("ignored")));
    }

    #[test]
    fn truthiness_follows_cell_contents() {
        assert!(!CellValue::Text(String::new()).is_truthy());
        assert!(!CellValue::Number(0.0).is_truthy());
        assert!(CellValue::Text(" ".to_string()).is_truthy());
        assert_eq!(CellValue::Number(3.0).to_text(), "3");
    }
}
