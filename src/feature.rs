//! Feature specification: which attributes are numeric vs categorical,
//! and the order they appear in every feature vector.
//!
//! Column order is the central correctness contract of the whole crate:
//! the transformer emits numeric columns in `NUMERIC_COLUMNS` order,
//! followed by categorical indicator blocks in `CATEGORICAL_COLUMNS`
//! order. Fitting and inference both go through the accessors below, so
//! the order can never diverge between the two.

use serde::{Deserialize, Serialize};

/// Numeric attribute column names, in feature-vector order.
pub const NUMERIC_COLUMNS: [&str; 4] = [
    "Study_Hours_Per_Week",
    "Attendance_Rate",
    "Teacher_Quality",
    "Assignments_Completed",
];

/// Categorical attribute column names, in feature-vector order.
pub const CATEGORICAL_COLUMNS: [&str; 7] = [
    "School_Type",
    "School_Location",
    "Extra_Tutorials",
    "Socioeconomic_Status",
    "IT_Knowledge",
    "Parent_Education_Level",
    "Parent_Involvement",
];

/// One student's profile.
///
/// Field names map to the case-sensitive CSV headers of the historical
/// dataset. Categorical values are free strings: values never seen at
/// fit time are legal at inference and encode as all zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "Study_Hours_Per_Week")]
    pub study_hours_per_week: f64,
    #[serde(rename = "Attendance_Rate")]
    pub attendance_rate: f64,
    #[serde(rename = "Teacher_Quality")]
    pub teacher_quality: f64,
    #[serde(rename = "Assignments_Completed")]
    pub assignments_completed: f64,
    #[serde(rename = "School_Type")]
    pub school_type: String,
    #[serde(rename = "School_Location")]
    pub school_location: String,
    #[serde(rename = "Extra_Tutorials")]
    pub extra_tutorials: String,
    #[serde(rename = "Socioeconomic_Status")]
    pub socioeconomic_status: String,
    #[serde(rename = "IT_Knowledge")]
    pub it_knowledge: String,
    #[serde(rename = "Parent_Education_Level")]
    pub parent_education_level: String,
    #[serde(rename = "Parent_Involvement")]
    pub parent_involvement: String,
}

impl StudentRecord {
    /// Numeric attribute values in `NUMERIC_COLUMNS` order.
    pub fn numeric_values(&self) -> [f64; 4] {
        [
            self.study_hours_per_week,
            self.attendance_rate,
            self.teacher_quality,
            self.assignments_completed,
        ]
    }

    /// Categorical attribute values in `CATEGORICAL_COLUMNS` order.
    pub fn categorical_values(&self) -> [&str; 7] {
        [
            &self.school_type,
            &self.school_location,
            &self.extra_tutorials,
            &self.socioeconomic_status,
            &self.it_knowledge,
            &self.parent_education_level,
            &self.parent_involvement,
        ]
    }
}

/// Shared test fixture: one mid-range profile.
#[cfg(test)]
pub(crate) fn sample_record() -> StudentRecord {
    StudentRecord {
        study_hours_per_week: 20.0,
        attendance_rate: 85.0,
        teacher_quality: 3.0,
        assignments_completed: 2.0,
        school_type: "Public".to_string(),
        school_location: "Urban".to_string(),
        extra_tutorials: "No".to_string(),
        socioeconomic_status: "Medium".to_string(),
        it_knowledge: "Medium".to_string(),
        parent_education_level: "Secondary".to_string(),
        parent_involvement: "Medium".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_values_follow_declared_order() {
        let record = sample_record();
        let values = record.numeric_values();
        assert_eq!(values, [20.0, 85.0, 3.0, 2.0]);
        assert_eq!(values.len(), NUMERIC_COLUMNS.len());
    }

    #[test]
    fn test_categorical_values_follow_declared_order() {
        let record = sample_record();
        let values = record.categorical_values();
        assert_eq!(values[0], "Public");
        assert_eq!(values[6], "Medium");
        assert_eq!(values.len(), CATEGORICAL_COLUMNS.len());
    }

    #[test]
    fn test_csv_header_roundtrip() {
        let record = sample_record();
        let json = serde_json::to_value(&record).unwrap();
        for col in NUMERIC_COLUMNS.iter().chain(CATEGORICAL_COLUMNS.iter()) {
            assert!(json.get(col).is_some(), "missing serialized column {col}");
        }
    }
}
