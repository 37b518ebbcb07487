//! Tabular projection of records for the results table and the PDF report.

pub mod pdf;

use passrate_store::models::TeacherResult;
use passrate_store::schema::NOT_AVAILABLE;

pub use pdf::{ExportError, ExportOutcome, render_pdf};

pub const DEFAULT_INSTITUTION: &str = "Guru Nanak Institutions Technical Campus";
pub const DEFAULT_REPORT_TITLE: &str = "Result Analysis";

pub const REPORT_COLUMNS: [&str; 6] = [
    "Faculty Name",
    "Department",
    "Designation",
    "Employee ID",
    "Subject Type",
    "% of Pass",
];

pub const SIGNATURE_LINES: [&str; 2] = [
    "Signature of COE: ________________________",
    "Signature of Director: ________________________",
];

/// The two heading lines printed above the results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeading {
    pub institution: String,
    pub title: String,
}

impl ReportHeading {
    #[must_use]
    pub fn new(institution: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            institution: institution.into(),
            title: title.into(),
        }
    }
}

impl Default for ReportHeading {
    fn default() -> Self {
        Self::new(DEFAULT_INSTITUTION, DEFAULT_REPORT_TITLE)
    }
}

/// One display row, in `REPORT_COLUMNS` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub faculty_name: String,
    pub department: String,
    pub designation: String,
    pub employee_id: String,
    pub subject_type: String,
    pub pass_percentage: String,
}

impl ReportRow {
    #[must_use]
    pub fn cells(&self) -> [&str; 6] {
        [
            self.faculty_name.as_str(),
            self.department.as_str(),
            self.designation.as_str(),
            self.employee_id.as_str(),
            self.subject_type.as_str(),
            self.pass_percentage.as_str(),
        ]
    }
}

impl From<&TeacherResult> for ReportRow {
    fn from(record: &TeacherResult) -> Self {
        Self {
            faculty_name: or_not_available(Some(&record.teacher_name)),
            department: or_not_available(record.department()),
            designation: or_not_available(record.designation()),
            employee_id: or_not_available(Some(&record.emp_code)),
            subject_type: record.subject_type().label().to_string(),
            pass_percentage: percentage_cell(record.pass_percentage),
        }
    }
}

/// A zero or unreadable percentage counts as missing.
fn percentage_cell(value: f64) -> String {
    if value.is_finite() && value != 0.0 {
        format!("{value:.2}")
    } else {
        NOT_AVAILABLE.to_string()
    }
}

fn or_not_available(value: Option<&str>) -> String {
    value
        .filter(|value| !value.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}
