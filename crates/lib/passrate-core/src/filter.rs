//! Search criteria applied to the full record list.
//!
//! Every supplied criterion narrows the current set; blank ones are skipped.

use passrate_store::models::{SubjectType, TeacherResult};
use serde::{Deserialize, Serialize};

/// One narrowing condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Exact match once all whitespace is removed from both sides.
    EmpCode(String),
    Department(String),
    /// No uploaded record carries a designation, so this only matches
    /// records seeded with one directly.
    Designation(String),
    SubjectType(SubjectType),
}

impl Criterion {
    #[must_use]
    pub fn matches(&self, record: &TeacherResult) -> bool {
        match self {
            Self::EmpCode(code) => strip_whitespace(&record.emp_code) == strip_whitespace(code),
            Self::Department(department) => record.department() == Some(department.as_str()),
            Self::Designation(designation) => {
                record.designation() == Some(designation.as_str())
            }
            Self::SubjectType(subject_type) => record.subject_type() == *subject_type,
        }
    }
}

/// The four optional search-form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emp_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_type: Option<SubjectType>,
}

impl SearchCriteria {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.criteria().is_empty()
    }

    /// The supplied criteria in a fixed order.
    #[must_use]
    pub fn criteria(&self) -> Vec<Criterion> {
        let mut criteria = Vec::new();
        if let Some(code) = supplied(self.emp_code.as_deref()) {
            criteria.push(Criterion::EmpCode(code.to_string()));
        }
        if let Some(department) = supplied(self.department.as_deref()) {
            criteria.push(Criterion::Department(department.to_string()));
        }
        if let Some(designation) = supplied(self.designation.as_deref()) {
            criteria.push(Criterion::Designation(designation.to_string()));
        }
        if let Some(subject_type) = self.subject_type {
            criteria.push(Criterion::SubjectType(subject_type));
        }
        criteria
    }

    #[must_use]
    pub fn apply(&self, records: &[TeacherResult]) -> Vec<TeacherResult> {
        apply_criteria(records, &self.criteria())
    }
}

/// Narrows `records` by each criterion in turn.
#[must_use]
pub fn apply_criteria(records: &[TeacherResult], criteria: &[Criterion]) -> Vec<TeacherResult> {
    criteria
        .iter()
        .fold(records.to_vec(), |current, criterion| {
            current
                .into_iter()
                .filter(|record| criterion.matches(record))
                .collect()
        })
}

fn supplied(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|ch| !ch.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, branch: &str, subject: &str) -> TeacherResult {
        TeacherResult {
            teacher_name: format!("{code}-{subject}"),
            emp_code: code.to_string(),
            branch: branch.to_string(),
            subject_name: subject.to_string(),
            ..TeacherResult::default()
        }
    }

    fn sample() -> Vec<TeacherResult> {
        vec![
            record("GNI 101", "CSE", "Data Structures"),
            record("GNI101", "CSE", "DBMS Lab"),
            record("GNI101", "ECE", "Signals"),
            record("GNI202", "CSE", "Operating Systems"),
            record("N/A", "IT", "Physics Laboratory"),
        ]
    }

    #[test]
    fn no_criteria_returns_everything() {
        let records = sample();
        assert_eq!(SearchCriteria::default().apply(&records), records);
        assert!(SearchCriteria::default().is_empty());
    }

    #[test]
    fn emp_code_ignores_whitespace_on_both_sides() {
        let criteria = SearchCriteria {
            emp_code: Some(" GNI 10 1 ".to_string()),
            ..SearchCriteria::default()
        };
        let found = criteria.apply(&sample());
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|r| r.emp_code.replace(' ', "") == "GNI101"));
    }

    #[test]
    fn criteria_combine_with_and() {
        let criteria = SearchCriteria {
            emp_code: Some("GNI101".to_string()),
            department: Some("CSE".to_string()),
            subject_type: Some(SubjectType::Theory),
            ..SearchCriteria::default()
        };
        let found = criteria.apply(&sample());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].subject_name, "Data Structures");
    }

    #[test]
    fn order_of_criteria_does_not_matter() {
        let records = sample();
        let code = Criterion::EmpCode("GNI101".to_string());
        let department = Criterion::Department("CSE".to_string());
        let lab = Criterion::SubjectType(SubjectType::Lab);

        let forward = apply_criteria(&records, &[code.clone(), department.clone()]);
        let backward = apply_criteria(&records, &[department.clone(), code.clone()]);
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);

        let all_three = apply_criteria(&records, &[lab.clone(), code.clone(), department.clone()]);
        assert_eq!(all_three, apply_criteria(&records, &[department, lab, code]));
        assert_eq!(all_three.len(), 1);
    }

    #[test]
    fn subject_type_splits_lab_and_theory() {
        let records = sample();
        let labs = apply_criteria(&records, &[Criterion::SubjectType(SubjectType::Lab)]);
        let theory = apply_criteria(&records, &[Criterion::SubjectType(SubjectType::Theory)]);
        assert_eq!(labs.len(), 2);
        assert_eq!(theory.len(), 3);
    }

    #[test]
    fn designation_never_matches_uploaded_records() {
        let criteria = SearchCriteria {
            designation: Some("Professor".to_string()),
            ..SearchCriteria::default()
        };
        assert!(criteria.apply(&sample()).is_empty());

        let mut seeded = record("GNI303", "ME", "Thermodynamics");
        seeded.designation = Some("Professor".to_string());
        assert_eq!(criteria.apply(&[seeded]).len(), 1);
    }

    #[test]
    fn department_prefers_explicit_field() {
        let mut seeded = record("GNI404", "CSE", "Compilers");
        seeded.department = Some("AIML".to_string());
        let records = vec![seeded];

        let by_branch = SearchCriteria {
            department: Some("CSE".to_string()),
            ..SearchCriteria::default()
        };
        let by_department = SearchCriteria {
            department: Some("AIML".to_string()),
            ..SearchCriteria::default()
        };
        assert!(by_branch.apply(&records).is_empty());
        assert_eq!(by_department.apply(&records).len(), 1);
    }

    #[test]
    fn blank_criteria_are_skipped() {
        let criteria = SearchCriteria {
            emp_code: Some("   ".to_string()),
            department: Some(String::new()),
            ..SearchCriteria::default()
        };
        assert!(criteria.is_empty());
        assert_eq!(criteria.apply(&sample()).len(), 5);
    }
}
