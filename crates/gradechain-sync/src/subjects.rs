//! Subject registry.
//!
//! Lookup of registered subjects by id. The merge algorithm and restore
//! reject any subject the registry does not know, so an unregistered
//! subject can never reach a ledger record or a classification.

use std::collections::HashMap;

use gradechain_core::SubjectId;

/// A registered subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: SubjectId,
    /// Display name written into ledger subject scores.
    pub name: String,
}

/// Lookup contract consumed by merge and restore.
pub trait SubjectRegistry: Send + Sync {
    /// Look up a subject by id; `None` for unregistered subjects.
    fn lookup(&self, id: SubjectId) -> Option<&Subject>;
}

/// Registry backed by a fixed in-process table.
pub struct StaticSubjectRegistry {
    subjects: HashMap<SubjectId, Subject>,
}

impl StaticSubjectRegistry {
    /// Create a registry from an explicit subject list.
    #[must_use]
    pub fn new(subjects: impl IntoIterator<Item = Subject>) -> Self {
        Self {
            subjects: subjects
                .into_iter()
                .map(|subject| (subject.id, subject))
                .collect(),
        }
    }

    /// The standard curriculum table.
    #[must_use]
    pub fn with_defaults() -> Self {
        let names = [
            "Math",
            "Literature",
            "Foreign Language",
            "Physics",
            "Chemistry",
            "Biology",
            "History",
            "Geography",
            "Civic Education",
            "Technology",
            "Informatics",
            "Physical Education",
        ];
        Self::new(names.iter().enumerate().map(|(index, name)| Subject {
            id: SubjectId::new(index as i64 + 1),
            name: (*name).to_string(),
        }))
    }

    /// Number of registered subjects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// True when no subjects are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

impl SubjectRegistry for StaticSubjectRegistry {
    fn lookup(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_lookup() {
        let registry = StaticSubjectRegistry::with_defaults();
        assert_eq!(registry.len(), 12);
        assert_eq!(registry.lookup(SubjectId::new(1)).unwrap().name, "Math");
        assert!(registry.lookup(SubjectId::new(999)).is_none());
    }

    #[test]
    fn test_custom_table() {
        let registry = StaticSubjectRegistry::new([Subject {
            id: SubjectId::new(42),
            name: "Astronomy".to_string(),
        }]);
        assert_eq!(
            registry.lookup(SubjectId::new(42)).unwrap().name,
            "Astronomy"
        );
    }
}
