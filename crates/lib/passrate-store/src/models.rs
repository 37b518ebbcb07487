use std::{error::Error, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One normalized teacher/subject pass-rate row.
///
/// Field names on the wire are the sheet headers the records were
/// normalized from, so stored documents stay readable next to the source
/// spreadsheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TeacherResult {
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(rename = "Sl. No", default, deserialize_with = "lenient::text")]
    pub serial_no: String,
    #[serde(rename = "Academic Year", default, deserialize_with = "lenient::text")]
    pub academic_year: String,
    #[serde(rename = "B. Tech. Year", default, deserialize_with = "lenient::text")]
    pub program_year: String,
    #[serde(rename = "Sem", default, deserialize_with = "lenient::text")]
    pub semester: String,
    #[serde(rename = "Section", default, deserialize_with = "lenient::text")]
    pub section: String,
    #[serde(rename = "Branch", default, deserialize_with = "lenient::text")]
    pub branch: String,
    #[serde(rename = "Name of the subject", default, deserialize_with = "lenient::text")]
    pub subject_name: String,
    #[serde(rename = "Name of the teacher", default, deserialize_with = "lenient::text")]
    pub teacher_name: String,
    #[serde(rename = "EMP Code", default, deserialize_with = "lenient::text")]
    pub emp_code: String,
    #[serde(
        rename = "No of Students Appeared",
        default,
        deserialize_with = "lenient::count"
    )]
    pub students_appeared: u32,
    #[serde(
        rename = "No of Students passed",
        default,
        deserialize_with = "lenient::count"
    )]
    pub students_passed: u32,
    #[serde(rename = "% of Pass", default, deserialize_with = "lenient::percentage")]
    pub pass_percentage: f64,
    /// Only present when seeded outside the spreadsheet upload.
    #[serde(
        rename = "Department",
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub department: Option<String>,
    /// Only present when seeded outside the spreadsheet upload.
    #[serde(
        rename = "Designation",
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub designation: Option<String>,
}

impl TeacherResult {
    #[must_use]
    pub fn subject_type(&self) -> SubjectType {
        SubjectType::classify(&self.subject_name)
    }

    /// Department used for search and reports: the explicit field when set,
    /// otherwise the branch derived from the section.
    #[must_use]
    pub fn department(&self) -> Option<&str> {
        non_blank(self.department.as_deref()).or_else(|| non_blank(Some(&self.branch)))
    }

    #[must_use]
    pub fn designation(&self) -> Option<&str> {
        non_blank(self.designation.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Theory or lab, inferred from the subject name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Theory,
    Lab,
}

impl SubjectType {
    /// Any subject whose name mentions "lab" (or "laboratory") in any case is
    /// a lab; everything else is theory.
    #[must_use]
    pub fn classify(subject_name: &str) -> Self {
        if subject_name.to_lowercase().contains("lab") {
            Self::Lab
        } else {
            Self::Theory
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Theory => "Theory",
            Self::Lab => "Lab",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Theory => "theory",
            Self::Lab => "lab",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSubjectType(pub String);

impl fmt::Display for UnknownSubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown subject type: {} (expected theory or lab)", self.0)
    }
}

impl Error for UnknownSubjectType {}

impl FromStr for SubjectType {
    type Err = UnknownSubjectType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "theory" => Ok(Self::Theory),
            "lab" | "laboratory" => Ok(Self::Lab),
            _ => Err(UnknownSubjectType(value.to_string())),
        }
    }
}

/// Renders a numeric cell as text; whole numbers drop the fraction.
#[must_use]
pub fn number_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Reads a student count; anything that is not a non-negative number is 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn count_from_number(value: f64) -> u32 {
    if value.is_finite() && value >= 0.0 {
        value.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

#[must_use]
pub fn count_from_text(value: &str) -> u32 {
    value.trim().parse::<f64>().map_or(0, count_from_number)
}

/// Reads a pass percentage, tolerating a trailing `%`; unreadable text is 0.
#[must_use]
pub fn percentage_from_text(value: &str) -> f64 {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Field deserializers that accept whatever scalar a spreadsheet export or
/// hand-written payload carries.
mod lenient {
    use serde::{Deserialize, Deserializer, de};
    use serde_json::Value;

    use super::{count_from_number, count_from_text, number_text, percentage_from_text};

    fn scalar_text<E: de::Error>(value: Value) -> Result<Option<String>, E> {
        match value {
            Value::Null => Ok(None),
            Value::String(text) => Ok(Some(text)),
            Value::Bool(flag) => Ok(Some(flag.to_string())),
            Value::Number(number) => Ok(Some(
                number.as_f64().map_or_else(|| number.to_string(), number_text),
            )),
            Value::Array(_) | Value::Object(_) => {
                Err(E::custom("expected a text or numeric value"))
            }
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(scalar_text(value)?.unwrap_or_default())
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        scalar_text(value)
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(number) => number.as_f64().map_or(0, count_from_number),
            Value::String(text) => count_from_text(&text),
            _ => 0,
        })
    }

    pub fn percentage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(number) => number.as_f64().unwrap_or_default(),
            Value::String(text) => percentage_from_text(&text),
            _ => 0.0,
        })
    }
}
