use std::{error::Error, fmt};

use passrate_store::models::{TeacherResult, count_from_number, count_from_text, percentage_from_text};
use passrate_store::schema::{
    COL_ACADEMIC_YEAR,
    COL_EMP_CODE,
    COL_PASS_PERCENTAGE,
    COL_PROGRAM_YEAR,
    COL_SECTION,
    COL_SEMESTER,
    COL_SERIAL_NO,
    COL_STUDENTS_APPEARED,
    COL_STUDENTS_PASSED,
    COL_SUBJECT_NAME,
    COL_TEACHER_NAME,
    NOT_AVAILABLE,
    REQUIRED_COLUMNS,
    TEACHER_SEPARATOR,
    branch_from_section,
};

use super::workbook::{CellValue, RawRow};

/// Why a sheet was rejected before any record was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    EmptySheet,
    MissingFields(Vec<String>),
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySheet => f.write_str("Excel file is empty or invalid."),
            Self::MissingFields(fields) => {
                write!(f, "Missing required fields: {}", fields.join(", "))
            }
        }
    }
}

impl Error for NormalizeError {}

/// Records produced from a sheet plus the rows that yielded none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeOutput {
    pub records: Vec<TeacherResult>,
    pub source_rows: usize,
    /// Rows that named no teacher and therefore produced no record.
    pub dropped_rows: usize,
}

/// Checks that the first row carries every required column.
///
/// # Errors
/// Returns `NormalizeError` when there are no rows or fields are missing.
pub fn validate_rows(rows: &[RawRow]) -> Result<(), NormalizeError> {
    let Some(first) = rows.first() else {
        return Err(NormalizeError::EmptySheet);
    };
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !first.contains_key(**column))
        .map(|column| (*column).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(NormalizeError::MissingFields(missing))
    }
}

/// Validates and expands every row of a sheet.
///
/// # Errors
/// Returns `NormalizeError` if the first row fails validation.
pub fn normalize_rows(rows: &[RawRow]) -> Result<NormalizeOutput, NormalizeError> {
    validate_rows(rows)?;
    let mut output = NormalizeOutput {
        source_rows: rows.len(),
        ..NormalizeOutput::default()
    };
    for row in rows {
        let expanded = expand_row(row);
        if expanded.is_empty() {
            output.dropped_rows += 1;
        }
        output.records.extend(expanded);
    }
    Ok(output)
}

/// Expands one sheet row into a record per listed teacher.
///
/// A row without a teacher name yields nothing.
#[must_use]
pub fn expand_row(row: &RawRow) -> Vec<TeacherResult> {
    let teachers = split_cell(row.get(COL_TEACHER_NAME));
    let codes = split_cell(row.get(COL_EMP_CODE));
    let section = text_field(row, COL_SECTION);
    let branch = branch_from_section(Some(section.as_str()));

    teachers
        .iter()
        .enumerate()
        .map(|(index, teacher)| {
            let emp_code = codes
                .get(index)
                .map(|code| code.trim())
                .filter(|code| !code.is_empty())
                .map_or_else(|| NOT_AVAILABLE.to_string(), str::to_string);
            TeacherResult {
                id: None,
                serial_no: text_field(row, COL_SERIAL_NO),
                academic_year: text_field(row, COL_ACADEMIC_YEAR),
                program_year: text_field(row, COL_PROGRAM_YEAR),
                semester: text_field(row, COL_SEMESTER),
                section: section.clone(),
                branch: branch.clone(),
                subject_name: text_field(row, COL_SUBJECT_NAME),
                teacher_name: teacher.trim().to_string(),
                emp_code,
                students_appeared: count_field(row, COL_STUDENTS_APPEARED),
                students_passed: count_field(row, COL_STUDENTS_PASSED),
                pass_percentage: percentage_field(row, COL_PASS_PERCENTAGE),
                department: None,
                designation: None,
            }
        })
        .collect()
}

fn split_cell(cell: Option<&CellValue>) -> Vec<String> {
    cell.filter(|value| value.is_truthy())
        .map(|value| {
            value
                .to_text()
                .split(TEACHER_SEPARATOR)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn text_field(row: &RawRow, column: &str) -> String {
    row.get(column).map(CellValue::to_text).unwrap_or_default()
}

fn count_field(row: &RawRow, column: &str) -> u32 {
    match row.get(column) {
        Some(CellValue::Number(number)) => count_from_number(*number),
        Some(CellValue::Text(text)) => count_from_text(text),
        Some(CellValue::Bool(_)) | None => 0,
    }
}

fn percentage_field(row: &RawRow, column: &str) -> f64 {
    match row.get(column) {
        Some(CellValue::Number(number)) if number.is_finite() => *number,
        Some(CellValue::Text(text)) => percentage_from_text(text),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row(teachers: &str, codes: &str) -> RawRow {
        let mut row = RawRow::new();
        row.insert(COL_SERIAL_NO.to_string(), CellValue::Number(1.0));
        row.insert(COL_ACADEMIC_YEAR.to_string(), CellValue::Text("2023-24".to_string()));
        row.insert(COL_PROGRAM_YEAR.to_string(), CellValue::Text("II".to_string()));
        row.insert(COL_SEMESTER.to_string(), CellValue::Text("I".to_string()));
        row.insert(COL_SECTION.to_string(), CellValue::Text("CSE-A".to_string()));
        row.insert(
            COL_SUBJECT_NAME.to_string(),
            CellValue::Text("Data Structures".to_string()),
        );
        row.insert(COL_TEACHER_NAME.to_string(), CellValue::Text(teachers.to_string()));
        row.insert(COL_EMP_CODE.to_string(), CellValue::Text(codes.to_string()));
        row.insert(COL_STUDENTS_APPEARED.to_string(), CellValue::Number(60.0));
        row.insert(COL_STUDENTS_PASSED.to_string(), CellValue::Number(51.0));
        row.insert(COL_PASS_PERCENTAGE.to_string(), CellValue::Number(85.0));
        row
    }

    #[test]
    fn expands_one_record_per_teacher() {
        let records = expand_row(&full_row("Dr. Rao / Ms. Kaur/Mr. Das", "GNI1/ GNI2 /GNI3"));

        assert_eq!(records.len(), 3);
        let names: Vec<_> = records.iter().map(|r| r.teacher_name.as_str()).collect();
        let codes: Vec<_> = records.iter().map(|r| r.emp_code.as_str()).collect();
        assert_eq!(names, ["Dr. Rao", "Ms. Kaur", "Mr. Das"]);
        assert_eq!(codes, ["GNI1", "GNI2", "GNI3"]);
        for record in &records {
            assert_eq!(record.branch, "CSE");
            assert_eq!(record.section, "CSE-A");
            assert_eq!(record.serial_no, "1");
            assert_eq!(record.students_appeared, 60);
            assert_eq!(record.students_passed, 51);
        }
    }

    #[test]
    fn missing_codes_become_not_available() {
        let records = expand_row(&full_row("A/B/C", "X1"));
        let codes: Vec<_> = records.iter().map(|r| r.emp_code.as_str()).collect();
        assert_eq!(codes, ["X1", NOT_AVAILABLE, NOT_AVAILABLE]);

        let records = expand_row(&full_row("A/B", "X1//X3"));
        assert_eq!(records[1].emp_code, NOT_AVAILABLE);
    }

    #[test]
    fn k_names_always_yield_k_records() {
        for k in 1..=6 {
            let names: Vec<String> = (0..k).map(|i| format!("T{i}")).collect();
            for code_count in 0..=k {
                let codes: Vec<String> = (0..code_count).map(|i| format!("C{i}")).collect();
                let records = expand_row(&full_row(&names.join("/"), &codes.join("/")));
                assert_eq!(records.len(), k);
                for (i, record) in records.iter().enumerate() {
                    let expected = if i < code_count { format!("C{i}") } else { NOT_AVAILABLE.to_string() };
                    assert_eq!(record.emp_code, expected);
                }
            }
        }
    }

    #[test]
    fn row_without_teacher_yields_nothing() {
        let mut row = full_row("", "X1");
        assert!(expand_row(&row).is_empty());
        row.remove(COL_TEACHER_NAME);
        assert!(expand_row(&row).is_empty());
    }

    #[test]
    fn missing_section_gives_not_available_branch() {
        let mut row = full_row("A", "X1");
        row.remove(COL_SECTION);
        let records = expand_row(&row);
        assert_eq!(records[0].section, "");
        assert_eq!(records[0].branch, NOT_AVAILABLE);
    }

    #[test]
    fn missing_scalars_take_defaults() {
        let mut row = full_row("A", "X1");
        row.remove(COL_ACADEMIC_YEAR);
        row.remove(COL_STUDENTS_APPEARED);
        row.insert(COL_PASS_PERCENTAGE.to_string(), CellValue::Text("not graded".to_string()));
        let records = expand_row(&row);
        assert_eq!(records[0].academic_year, "");
        assert_eq!(records[0].students_appeared, 0);
        assert!(records[0].pass_percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn first_row_missing_fields_rejects_sheet() {
        let mut row = full_row("A", "X1");
        row.remove(COL_SEMESTER);
        row.remove(COL_EMP_CODE);
        let err = normalize_rows(&[row]).expect_err("sheet should be rejected");
        assert_eq!(
            err,
            NormalizeError::MissingFields(vec![COL_SEMESTER.to_string(), COL_EMP_CODE.to_string()])
        );
        assert_eq!(err.to_string(), "Missing required fields: Sem, EMP Code");
    }

    #[test]
    fn empty_sheet_is_rejected() {
        assert_eq!(normalize_rows(&[]), Err(NormalizeError::EmptySheet));
    }

    #[test]
    fn later_rows_are_not_validated() {
        let mut sparse = RawRow::new();
        sparse.insert(COL_TEACHER_NAME.to_string(), CellValue::Text("Late".to_string()));
        let blank_teacher = full_row("", "");

        let output = normalize_rows(&[full_row("A/B", "1/2"), sparse, blank_teacher])
            .expect("first row is complete");

        assert_eq!(output.source_rows, 3);
        assert_eq!(output.records.len(), 3);
        assert_eq!(output.dropped_rows, 1);
        assert_eq!(output.records[2].branch, NOT_AVAILABLE);
    }
}
