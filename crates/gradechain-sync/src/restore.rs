//! Restore from ledger dumps.
//!
//! Rebuilds the staging store from the authoritative ledger in two
//! phases: first every personal profile, then every record. The ledger
//! is never written; existing staging rows are never duplicated.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use gradechain_ledger::LedgerClient;

use crate::error::SyncResult;
use crate::staging::{ClassroomInfo, NewRecordEntry, StagingStore};
use crate::subjects::SubjectRegistry;

/// Counters reported by a completed restore.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Students synthesized in phase one.
    pub students_restored: usize,
    /// Students skipped because their account already exists.
    pub students_skipped: usize,
    /// Classrooms created in phase two.
    pub classrooms_created: usize,
    /// Student/classroom record rows created in phase two.
    pub records_created: usize,
    /// Historical entries inserted in phase two.
    pub entries_restored: usize,
    /// Subject scores dropped because the subject is unregistered.
    pub subjects_skipped: usize,
    /// Units skipped because a staging write or lookup failed.
    pub failures: usize,
}

/// Rebuild the staging store from full ledger dumps.
///
/// Phase one restores accounts, profiles, and student rows from the
/// personal dump; an existing account skips the student entirely.
/// Phase two restores classrooms, record rows, and one already-complete
/// historical entry per dumped subject score, timestamped with the
/// restore time. Students are processed in ascending id order so reruns
/// are deterministic.
///
/// Only the dump reads are fatal. A failed staging write or lookup is
/// logged, counted, and skipped so the rest of the dump still lands.
pub async fn run_restore(
    ledger: &Arc<dyn LedgerClient>,
    staging: &Arc<dyn StagingStore>,
    registry: &Arc<dyn SubjectRegistry>,
    default_password: &str,
) -> SyncResult<RestoreSummary> {
    let mut summary = RestoreSummary::default();

    let personal_dump = ledger.get_all_personal().await?;
    let mut personals: Vec<_> = personal_dump.into_iter().collect();
    personals.sort_by_key(|(id, _)| *id);

    for (student_id, personal) in personals {
        info!(student_id = %student_id, "Restoring student");
        match staging.account_exists(student_id).await {
            Ok(true) => {
                warn!(student_id = %student_id, "Account already exists; skipping restore");
                summary.students_skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(student_id = %student_id, error = %e, "Account lookup failed; skipping student");
                summary.failures += 1;
                continue;
            }
        }

        let username =
            crate::account::generate_username(&personal.first_name, &personal.last_name);
        if let Err(e) = staging
            .create_student(student_id, &personal, &username, default_password)
            .await
        {
            warn!(student_id = %student_id, error = %e, "Student restore failed; continuing");
            summary.failures += 1;
            continue;
        }
        summary.students_restored += 1;
        info!(student_id = %student_id, username = %username, "Restored student");
    }

    let record_dump = ledger.get_all_records().await?;
    let mut records: Vec<_> = record_dump.into_iter().collect();
    records.sort_by_key(|(id, _)| *id);

    for (student_id, record) in records {
        info!(student_id = %student_id, "Restoring record");
        match staging.student_exists(student_id).await {
            Ok(false) => {
                warn!(student_id = %student_id, "Student does not exist; skipping record restore");
                continue;
            }
            Ok(true) => {}
            Err(e) => {
                warn!(student_id = %student_id, error = %e, "Student lookup failed; skipping record restore");
                summary.failures += 1;
                continue;
            }
        }

        let mut class_records: Vec<_> = record.class_records.into_iter().collect();
        class_records.sort_by_key(|(id, _)| *id);

        for (classroom_id, class_record) in class_records {
            let info = ClassroomInfo {
                name: class_record.class_name.clone(),
                year: class_record.year,
                grade: class_record.grade,
            };
            match staging.ensure_classroom(classroom_id, &info).await {
                Ok(true) => {
                    info!(classroom_id = %classroom_id, "Created classroom");
                    summary.classrooms_created += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(classroom_id = %classroom_id, error = %e, "Classroom restore failed; skipping classroom");
                    summary.failures += 1;
                    continue;
                }
            }
            match staging.ensure_record(student_id, classroom_id).await {
                Ok(true) => summary.records_created += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        student_id = %student_id,
                        classroom_id = %classroom_id,
                        error = %e,
                        "Record row restore failed; skipping classroom"
                    );
                    summary.failures += 1;
                    continue;
                }
            }

            for (subject_id, score) in class_record.subjects {
                if registry.lookup(subject_id).is_none() {
                    warn!(
                        student_id = %student_id,
                        subject_id = %subject_id,
                        "Subject is not registered; skipping score"
                    );
                    summary.subjects_skipped += 1;
                    continue;
                }

                let now = Utc::now();
                let entry = NewRecordEntry {
                    subject_id,
                    first_half_score: score.first_half_score,
                    second_half_score: score.second_half_score,
                    final_score: score.final_score,
                    request_date: now,
                    approval_date: now,
                };
                if let Err(e) = staging
                    .insert_record_entry(student_id, classroom_id, entry)
                    .await
                {
                    warn!(
                        student_id = %student_id,
                        subject_id = %subject_id,
                        error = %e,
                        "Entry restore failed; continuing"
                    );
                    summary.failures += 1;
                    continue;
                }
                summary.entries_restored += 1;
            }
        }
    }

    info!(
        students_restored = summary.students_restored,
        students_skipped = summary.students_skipped,
        entries_restored = summary.entries_restored,
        failures = summary.failures,
        "Restore finished"
    );
    Ok(summary)
}
