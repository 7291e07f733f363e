//! Ledger data model.
//!
//! These types are the authoritative shape of what the ledger stores per
//! student: the historical record map and the personal profile. They are
//! marshalled as JSON when pushed through a gateway, so everything here
//! derives serde traits.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gradechain_core::{ClassroomId, StudentId, SubjectId};

/// The whole record owned by one student: one [`ClassRecord`] per
/// classroom the student has attended.
///
/// Mutated only by the merge algorithm and restore. Writes to the ledger
/// always replace the whole record; it is never partially persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Per-classroom records, keyed by classroom id.
    #[serde(default)]
    pub class_records: HashMap<ClassroomId, ClassRecord>,
}

impl StudentRecord {
    /// True when the student has no classroom records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.class_records.is_empty()
    }
}

/// One classroom's slice of a student record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Classroom display name.
    pub class_name: String,
    /// School year.
    pub year: i32,
    /// Grade level.
    pub grade: i32,
    /// Per-subject scores, keyed by subject id.
    #[serde(default)]
    pub subjects: HashMap<SubjectId, SubjectScore>,
    /// Derived ranks. Always a pure function of `subjects`; never edited
    /// independently.
    #[serde(default)]
    pub classification: Classification,
}

/// Scores for one subject within a classroom.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectScore {
    /// Subject display name, set from the subject registry.
    pub name: String,
    pub first_half_score: f32,
    pub second_half_score: f32,
    pub final_score: f32,
}

/// Categorical rank derived from a set of subject scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationLevel {
    Excellent,
    Good,
    Average,
    Weak,
    /// No scores available to classify.
    #[default]
    Unclassified,
}

impl std::fmt::Display for ClassificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "excellent"),
            Self::Good => write!(f, "good"),
            Self::Average => write!(f, "average"),
            Self::Weak => write!(f, "weak"),
            Self::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// The three per-term ranks of a class record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub first_half: ClassificationLevel,
    pub second_half: ClassificationLevel,
    #[serde(rename = "final")]
    pub final_term: ClassificationLevel,
}

/// A student's personal profile as stored in the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Personal {
    pub first_name: String,
    pub last_name: String,
    pub male: bool,
    #[serde(default)]
    pub avatar: String,
    pub birth_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub ethnic: String,
    #[serde(default)]
    pub father_name: String,
    #[serde(default)]
    pub father_job: String,
    #[serde(default)]
    pub mother_name: String,
    #[serde(default)]
    pub mother_job: String,
    #[serde(default)]
    pub guardian_name: String,
    #[serde(default)]
    pub guardian_job: String,
    #[serde(default)]
    pub home_town: String,
}

/// One historical snapshot of a student record.
///
/// History sequences are ordered ascending by timestamp and are used to
/// enrich reads with entries not yet reflected in the primary record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordHistory {
    pub timestamp: DateTime<Utc>,
    pub record: StudentRecord,
    /// Identity of the writer that produced this snapshot.
    pub updated_by: String,
}

/// Convenience alias for full personal dumps (restore input).
pub type PersonalDump = HashMap<StudentId, Personal>;

/// Convenience alias for full record dumps (restore input).
pub type RecordDump = HashMap<StudentId, StudentRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_empty() {
        let record = StudentRecord::default();
        assert!(record.is_empty());
        assert_eq!(
            record.class_records.len(),
            0,
        );
    }

    #[test]
    fn test_classification_defaults_unclassified() {
        let classification = Classification::default();
        assert_eq!(classification.first_half, ClassificationLevel::Unclassified);
        assert_eq!(classification.final_term, ClassificationLevel::Unclassified);
    }

    #[test]
    fn test_record_json_roundtrip() {
        let mut record = StudentRecord::default();
        let mut class_record = ClassRecord {
            class_name: "10A".to_string(),
            year: 2026,
            grade: 10,
            ..ClassRecord::default()
        };
        class_record.subjects.insert(
            SubjectId::new(1),
            SubjectScore {
                name: "Math".to_string(),
                first_half_score: 7.5,
                second_half_score: 8.0,
                final_score: 8.5,
            },
        );
        record
            .class_records
            .insert(ClassroomId::new(3), class_record);

        let json = serde_json::to_string(&record).unwrap();
        let back: StudentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_classification_level_serde_rename() {
        let json = serde_json::to_string(&ClassificationLevel::Excellent).unwrap();
        assert_eq!(json, "\"excellent\"");
        let classification = Classification {
            final_term: ClassificationLevel::Good,
            ..Classification::default()
        };
        let json = serde_json::to_value(&classification).unwrap();
        assert_eq!(json.get("final").unwrap(), "good");
    }
}
