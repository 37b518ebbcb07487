pub const TABLE_TEACHERS: &str = "teachers";

pub const COL_SERIAL_NO: &str = "Sl. No";
pub const COL_ACADEMIC_YEAR: &str = "Academic Year";
pub const COL_PROGRAM_YEAR: &str = "B. Tech. Year";
pub const COL_SEMESTER: &str = "Sem";
pub const COL_SECTION: &str = "Section";
pub const COL_BRANCH: &str = "Branch";
pub const COL_SUBJECT_NAME: &str = "Name of the subject";
pub const COL_TEACHER_NAME: &str = "Name of the teacher";
pub const COL_EMP_CODE: &str = "EMP Code";
pub const COL_STUDENTS_APPEARED: &str = "No of Students Appeared";
pub const COL_STUDENTS_PASSED: &str = "No of Students passed";
pub const COL_PASS_PERCENTAGE: &str = "% of Pass";
pub const COL_DEPARTMENT: &str = "Department";
pub const COL_DESIGNATION: &str = "Designation";

/// Columns every uploaded sheet must carry, in the order they are reported.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    COL_SERIAL_NO,
    COL_ACADEMIC_YEAR,
    COL_PROGRAM_YEAR,
    COL_SEMESTER,
    COL_SECTION,
    COL_SUBJECT_NAME,
    COL_TEACHER_NAME,
    COL_EMP_CODE,
    COL_STUDENTS_APPEARED,
    COL_STUDENTS_PASSED,
    COL_PASS_PERCENTAGE,
];

/// Placeholder for values that are absent or could not be derived.
pub const NOT_AVAILABLE: &str = "N/A";

/// Separator between co-teachers in the name and code cells.
pub const TEACHER_SEPARATOR: char = '/';

pub fn branch_from_section(section: Option<&str>) -> String {
    match section {
        Some(section) if !section.is_empty() => section
            .split('-')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}
