//! Record merge.
//!
//! Folds a student's pending entries into their ledger record. The
//! read-modify-write is whole-record: the engine fetches the current
//! record, applies every pending entry grouped by classroom, recomputes
//! classifications, and pushes the full record back.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use gradechain_core::{ClassroomId, EntryId, StudentId};
use gradechain_ledger::{ClassRecord, LedgerClient, SubjectScore};

use crate::classification::classify_subjects;
use crate::error::SyncResult;
use crate::staging::PendingEntry;
use crate::subjects::SubjectRegistry;

/// What happened to one student's merge.
#[derive(Debug)]
pub struct MergeOutcome {
    pub student_id: StudentId,
    /// Entries gathered for this student, to be marked complete on a
    /// successful push.
    pub entry_ids: Vec<EntryId>,
    /// True when the ledger accepted the write.
    pub pushed: bool,
    /// Error detail for failed merges.
    pub error: Option<String>,
}

impl MergeOutcome {
    pub fn pushed(student_id: StudentId, entry_ids: Vec<EntryId>) -> Self {
        Self {
            student_id,
            entry_ids,
            pushed: true,
            error: None,
        }
    }

    pub fn rejected(student_id: StudentId, entry_ids: Vec<EntryId>) -> Self {
        Self {
            student_id,
            entry_ids,
            pushed: false,
            error: None,
        }
    }

    pub fn failed(
        student_id: StudentId,
        entry_ids: Vec<EntryId>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            student_id,
            entry_ids,
            pushed: false,
            error: Some(error.into()),
        }
    }
}

/// Merge one student's pending entries, grouped by classroom, into
/// their ledger record and push the result.
///
/// Entries within a classroom apply in ascending approval order, so the
/// last-approved score for a subject wins. Entries whose subject the
/// registry does not know are skipped with a warning; they are still
/// reported in the outcome and marked complete with the rest on a
/// successful push.
pub async fn merge_student(
    ledger: &Arc<dyn LedgerClient>,
    registry: &Arc<dyn SubjectRegistry>,
    student_id: StudentId,
    groups: HashMap<ClassroomId, Vec<PendingEntry>>,
) -> SyncResult<MergeOutcome> {
    let entry_ids: Vec<EntryId> = groups
        .values()
        .flat_map(|entries| entries.iter().map(|entry| entry.id))
        .collect();

    if groups.is_empty() {
        debug!(student_id = %student_id, "No pending entries; nothing to push");
        return Ok(MergeOutcome::pushed(student_id, entry_ids));
    }

    let mut record = ledger.get_record(student_id).await?;

    for (classroom_id, mut entries) in groups {
        entries.sort_by_key(|entry| entry.approval_date);

        let class_record = record.class_records.entry(classroom_id).or_default();
        apply_entries(class_record, &entries, registry.as_ref());
        class_record.classification = classify_subjects(&class_record.subjects);
    }

    let pushed = ledger.update_record(student_id, &record).await?;
    if pushed {
        Ok(MergeOutcome::pushed(student_id, entry_ids))
    } else {
        warn!(student_id = %student_id, "Ledger rejected record update");
        Ok(MergeOutcome::rejected(student_id, entry_ids))
    }
}

fn apply_entries(
    class_record: &mut ClassRecord,
    entries: &[PendingEntry],
    registry: &dyn SubjectRegistry,
) {
    // Metadata follows the first sorted entry with a known classroom,
    // refreshed on every pass.
    let mut metadata_set = false;
    for entry in entries {
        let Some(subject) = registry.lookup(entry.subject_id) else {
            warn!(
                entry_id = %entry.id,
                subject_id = %entry.subject_id,
                "Skipping entry with unregistered subject"
            );
            continue;
        };

        class_record.subjects.insert(
            entry.subject_id,
            SubjectScore {
                name: subject.name.clone(),
                first_half_score: entry.first_half_score,
                second_half_score: entry.second_half_score,
                final_score: entry.final_score,
            },
        );

        if !metadata_set {
            if let Some(classroom) = &entry.classroom {
                class_record.class_name = classroom.name.clone();
                class_record.year = classroom.year;
                class_record.grade = classroom.grade;
                metadata_set = true;
            }
        }
    }
}
