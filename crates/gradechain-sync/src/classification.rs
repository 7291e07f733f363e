//! Classification engine.
//!
//! Pure, deterministic mapping from a set of per-subject scores to a
//! categorical rank. No side effects, no I/O; invoked three times per
//! classroom per merge pass (first-half, second-half, final) with three
//! independently extracted score mappings.

use std::collections::HashMap;

use gradechain_core::SubjectId;
use gradechain_ledger::{Classification, ClassificationLevel, SubjectScore};

/// Classify a score mapping on the conventional 10-point scheme.
///
/// An empty mapping is unclassifiable. Identical inputs always yield
/// identical labels.
#[must_use]
pub fn classify(scores: &HashMap<SubjectId, f32>) -> ClassificationLevel {
    if scores.is_empty() {
        return ClassificationLevel::Unclassified;
    }

    let count = scores.len() as f32;
    let average = scores.values().sum::<f32>() / count;
    let minimum = scores.values().copied().fold(f32::INFINITY, f32::min);

    if average >= 8.0 && minimum >= 6.5 {
        ClassificationLevel::Excellent
    } else if average >= 6.5 && minimum >= 5.0 {
        ClassificationLevel::Good
    } else if average >= 5.0 && minimum >= 3.5 {
        ClassificationLevel::Average
    } else {
        ClassificationLevel::Weak
    }
}

/// Recompute all three classifications from a subject-score mapping.
#[must_use]
pub fn classify_subjects(subjects: &HashMap<SubjectId, SubjectScore>) -> Classification {
    let mut first_half = HashMap::with_capacity(subjects.len());
    let mut second_half = HashMap::with_capacity(subjects.len());
    let mut final_term = HashMap::with_capacity(subjects.len());
    for (subject_id, score) in subjects {
        first_half.insert(*subject_id, score.first_half_score);
        second_half.insert(*subject_id, score.second_half_score);
        final_term.insert(*subject_id, score.final_score);
    }

    Classification {
        first_half: classify(&first_half),
        second_half: classify(&second_half),
        final_term: classify(&final_term),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[(i64, f32)]) -> HashMap<SubjectId, f32> {
        values
            .iter()
            .map(|(id, score)| (SubjectId::new(*id), *score))
            .collect()
    }

    #[test]
    fn test_empty_map_is_unclassified() {
        assert_eq!(classify(&HashMap::new()), ClassificationLevel::Unclassified);
    }

    #[test]
    fn test_rank_thresholds() {
        assert_eq!(
            classify(&scores(&[(1, 9.0), (2, 8.0), (3, 8.5)])),
            ClassificationLevel::Excellent
        );
        assert_eq!(
            classify(&scores(&[(1, 7.0), (2, 6.5), (3, 7.0)])),
            ClassificationLevel::Good
        );
        assert_eq!(
            classify(&scores(&[(1, 5.0), (2, 5.5), (3, 4.5)])),
            ClassificationLevel::Average
        );
        assert_eq!(
            classify(&scores(&[(1, 2.0), (2, 9.0)])),
            ClassificationLevel::Weak
        );
    }

    #[test]
    fn test_low_minimum_caps_rank() {
        // High average but one subject below the excellent floor.
        assert_eq!(
            classify(&scores(&[(1, 10.0), (2, 10.0), (3, 6.0)])),
            ClassificationLevel::Good
        );
    }

    #[test]
    fn test_determinism() {
        let input = scores(&[(1, 7.3), (2, 6.8), (3, 9.1)]);
        assert_eq!(classify(&input), classify(&input));
    }

    #[test]
    fn test_classify_subjects_three_independent_terms() {
        let mut subjects = HashMap::new();
        subjects.insert(
            SubjectId::new(1),
            SubjectScore {
                name: "Math".to_string(),
                first_half_score: 9.0,
                second_half_score: 6.0,
                final_score: 2.0,
            },
        );

        let classification = classify_subjects(&subjects);
        assert_eq!(classification.first_half, ClassificationLevel::Excellent);
        assert_eq!(classification.second_half, ClassificationLevel::Average);
        assert_eq!(classification.final_term, ClassificationLevel::Weak);
    }
}
