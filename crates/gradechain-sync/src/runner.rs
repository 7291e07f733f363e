//! Synchronization runner.
//!
//! Background loop that periodically drains the staging store into the
//! ledger. Each pass snapshots the pending entries, fans the per-student
//! merges out, joins them, and commits all completion marks in a single
//! atomic batch. A single-flight slot guarantees that passes never
//! overlap; an overdue pass makes the next tick a no-op, not a queue.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use gradechain_core::{ClassroomId, EntryId, StudentId};
use gradechain_ledger::LedgerClient;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::merge::merge_student;
use crate::restore::{run_restore, RestoreSummary};
use crate::runstate::RunSlot;
use crate::staging::{PendingEntry, StagingStore};
use crate::subjects::SubjectRegistry;

/// Counters from the record half of a pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordPassSummary {
    /// Students with at least one pending entry.
    pub students: usize,
    /// Students whose merged record the ledger accepted.
    pub students_pushed: usize,
    /// Students whose merge failed or was rejected.
    pub students_failed: usize,
    /// Entries marked complete.
    pub entries_completed: usize,
}

/// Counters from the profile half of a pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PersonalPassSummary {
    /// Profiles flagged as updated.
    pub profiles: usize,
    /// Profiles the ledger accepted and that were unflagged.
    pub profiles_synced: usize,
}

/// Combined result of one synchronization pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub records: RecordPassSummary,
    pub personal: PersonalPassSummary,
}

/// Result of a restore request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A restore was already in flight; the request was ignored.
    AlreadyRunning,
    /// The restore ran to completion.
    Completed(RestoreSummary),
}

/// Periodic synchronization engine.
pub struct SyncRunner {
    ledger: Arc<dyn LedgerClient>,
    staging: Arc<dyn StagingStore>,
    subjects: Arc<dyn SubjectRegistry>,
    config: SyncConfig,
    sync_slot: RunSlot,
    restore_slot: RunSlot,
    shutdown: Arc<AtomicBool>,
}

impl SyncRunner {
    /// Create a new runner.
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        staging: Arc<dyn StagingStore>,
        subjects: Arc<dyn SubjectRegistry>,
        config: SyncConfig,
    ) -> Self {
        Self {
            ledger,
            staging,
            subjects,
            config,
            sync_slot: RunSlot::new("sync"),
            restore_slot: RunSlot::new("restore"),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the underlying ledger client.
    pub async fn start(&self) -> SyncResult<()> {
        self.ledger.start().await?;
        Ok(())
    }

    /// Request shutdown and release the ledger client.
    pub async fn stop(&self) -> SyncResult<()> {
        info!("Shutdown requested");
        self.shutdown.store(true, Ordering::Relaxed);
        self.ledger.stop().await?;
        Ok(())
    }

    /// Check if shutdown was requested.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Run the periodic loop until shutdown.
    pub async fn run(self: Arc<Self>) {
        let period = Duration::from_secs(self.config.effective_period_secs());
        info!(
            period_secs = period.as_secs(),
            "Starting synchronization runner"
        );

        let mut ticker = interval(period);
        // The first interval tick fires immediately; wait a full period
        // before the first pass.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if self.shutdown.load(Ordering::Relaxed) {
                info!("Shutdown requested, stopping synchronization loop");
                break;
            }
            self.tick();
        }
    }

    /// Trigger one pass in the background, skipping when the previous
    /// pass is still in flight.
    pub fn tick(self: &Arc<Self>) {
        let Some(guard) = self.sync_slot.try_claim() else {
            info!(
                slot = self.sync_slot.name(),
                "Previous pass still running, skipping tick"
            );
            return;
        };

        let runner = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = guard;
            match runner.run_pass().await {
                Ok(summary) => {
                    debug!(
                        students = summary.records.students,
                        entries_completed = summary.records.entries_completed,
                        profiles_synced = summary.personal.profiles_synced,
                        "Synchronization pass finished"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Synchronization pass failed");
                }
            }
        });
    }

    /// Run one pass inline, claiming the single-flight slot. Returns
    /// `None` when a pass is already in flight.
    pub async fn sync_once(&self) -> SyncResult<Option<PassSummary>> {
        let Some(_guard) = self.sync_slot.try_claim() else {
            info!(
                slot = self.sync_slot.name(),
                "Previous pass still running, skipping request"
            );
            return Ok(None);
        };
        Ok(Some(self.run_pass().await?))
    }

    async fn run_pass(&self) -> SyncResult<PassSummary> {
        let records = self.sync_records().await?;
        let personal = self.sync_personal().await?;
        Ok(PassSummary { records, personal })
    }

    /// Merge and push all pending record entries, then commit every
    /// completion mark in one batch.
    async fn sync_records(&self) -> SyncResult<RecordPassSummary> {
        let pending = self.staging.find_pending_record_entries().await?;
        if pending.is_empty() {
            return Ok(RecordPassSummary::default());
        }

        let mut per_student: HashMap<StudentId, HashMap<ClassroomId, Vec<PendingEntry>>> =
            HashMap::new();
        for entry in pending {
            per_student
                .entry(entry.student_id)
                .or_default()
                .entry(entry.classroom_id)
                .or_default()
                .push(entry);
        }

        let mut summary = RecordPassSummary {
            students: per_student.len(),
            ..RecordPassSummary::default()
        };

        let mut tasks = JoinSet::new();
        for (student_id, groups) in per_student {
            let ledger = Arc::clone(&self.ledger);
            let registry = Arc::clone(&self.subjects);
            tasks.spawn(
                async move { merge_student(&ledger, &registry, student_id, groups).await },
            );
        }

        // Join barrier: every merge settles before any mark commits.
        let mut completed: Vec<EntryId> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let result = joined.map_err(|e| SyncError::join(e.to_string()))?;
            match result {
                Ok(outcome) => {
                    if self.config.dev_mode {
                        info!(
                            student_id = %outcome.student_id,
                            success = outcome.pushed,
                            "Updated record"
                        );
                    }
                    if outcome.pushed {
                        summary.students_pushed += 1;
                        completed.extend(outcome.entry_ids);
                    } else {
                        summary.students_failed += 1;
                        if let Some(error) = outcome.error {
                            warn!(student_id = %outcome.student_id, error = %error, "Record push failed");
                        }
                    }
                }
                Err(e) => {
                    summary.students_failed += 1;
                    warn!(error = %e, "Record merge failed");
                }
            }
        }

        if !completed.is_empty() {
            summary.entries_completed = completed.len();
            self.staging.mark_record_entries_complete(&completed).await?;
        }
        Ok(summary)
    }

    /// Push every updated profile, then clear the flags that the ledger
    /// accepted in one batch.
    async fn sync_personal(&self) -> SyncResult<PersonalPassSummary> {
        let profiles = self.staging.find_updated_profiles().await?;
        let mut summary = PersonalPassSummary {
            profiles: profiles.len(),
            ..PersonalPassSummary::default()
        };

        let mut synced: Vec<StudentId> = Vec::new();
        for update in &profiles {
            match self
                .ledger
                .update_personal(update.student_id, &update.personal)
                .await
            {
                Ok(success) => {
                    if self.config.dev_mode {
                        info!(student_id = %update.student_id, success, "Updated personal");
                    }
                    if success {
                        synced.push(update.student_id);
                    } else {
                        warn!(student_id = %update.student_id, "Ledger rejected profile update");
                    }
                }
                Err(e) => {
                    warn!(student_id = %update.student_id, error = %e, "Profile push failed");
                }
            }
        }

        if !synced.is_empty() {
            summary.profiles_synced = synced.len();
            self.staging.mark_profiles_synced(&synced).await?;
        }
        Ok(summary)
    }

    /// Run a restore, single-flighted independently of the sync pass.
    pub async fn restore(&self) -> SyncResult<RestoreOutcome> {
        let Some(_guard) = self.restore_slot.try_claim() else {
            info!(
                slot = self.restore_slot.name(),
                "Restore already running, ignoring request"
            );
            return Ok(RestoreOutcome::AlreadyRunning);
        };

        let summary = run_restore(
            &self.ledger,
            &self.staging,
            &self.subjects,
            &self.config.default_password,
        )
        .await?;
        Ok(RestoreOutcome::Completed(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use gradechain_core::SubjectId;
    use gradechain_ledger::{EphemeralLedger, Personal};

    use crate::staging::{ClassroomInfo, MemoryStagingStore};
    use crate::subjects::StaticSubjectRegistry;

    fn pending_entry(subject: i64, final_score: f32) -> PendingEntry {
        PendingEntry {
            id: EntryId::new(0),
            student_id: StudentId::new(1),
            classroom_id: ClassroomId::new(10),
            classroom: Some(ClassroomInfo {
                name: "10A".to_string(),
                year: 2026,
                grade: 10,
            }),
            subject_id: SubjectId::new(subject),
            first_half_score: final_score,
            second_half_score: final_score,
            final_score,
            requested_by: StudentId::new(1),
            approved_by: 99,
            request_date: Utc::now(),
            approval_date: Utc::now(),
            complete: false,
        }
    }

    fn runner_with(store: Arc<MemoryStagingStore>) -> (SyncRunner, Arc<dyn LedgerClient>) {
        let ledger: Arc<dyn LedgerClient> = Arc::new(EphemeralLedger::new());
        let runner = SyncRunner::new(
            Arc::clone(&ledger),
            store as Arc<dyn StagingStore>,
            Arc::new(StaticSubjectRegistry::with_defaults()),
            SyncConfig::default(),
        );
        (runner, ledger)
    }

    #[tokio::test]
    async fn test_pass_pushes_and_marks_complete() {
        let store = Arc::new(MemoryStagingStore::new());
        let entry_id = store.stage_pending_entry(pending_entry(1, 8.0)).await;
        let (runner, ledger) = runner_with(Arc::clone(&store));

        let summary = runner.sync_once().await.unwrap().expect("slot free");
        assert_eq!(summary.records.students, 1);
        assert_eq!(summary.records.students_pushed, 1);
        assert_eq!(summary.records.entries_completed, 1);
        assert_eq!(store.entry_complete(entry_id).await, Some(true));

        let record = ledger.get_record(StudentId::new(1)).await.unwrap();
        assert!(record.class_records.contains_key(&ClassroomId::new(10)));
    }

    #[tokio::test]
    async fn test_pass_syncs_profiles() {
        let store = Arc::new(MemoryStagingStore::new());
        let student = StudentId::new(7);
        store
            .stage_profile_update(
                student,
                Personal {
                    first_name: "Long".to_string(),
                    ..Personal::default()
                },
            )
            .await;
        let (runner, ledger) = runner_with(Arc::clone(&store));

        let summary = runner.sync_once().await.unwrap().expect("slot free");
        assert_eq!(summary.personal.profiles, 1);
        assert_eq!(summary.personal.profiles_synced, 1);
        assert!(!store.profile_updated(student).await);
        assert_eq!(
            ledger.get_personal(student).await.unwrap().unwrap().first_name,
            "Long"
        );
    }

    #[tokio::test]
    async fn test_dev_mode_does_not_alter_pass_semantics() {
        let store = Arc::new(MemoryStagingStore::new());
        let entry_id = store.stage_pending_entry(pending_entry(1, 8.0)).await;
        store
            .stage_profile_update(StudentId::new(2), Personal::default())
            .await;

        let runner = SyncRunner::new(
            Arc::new(EphemeralLedger::new()),
            Arc::clone(&store) as Arc<dyn StagingStore>,
            Arc::new(StaticSubjectRegistry::with_defaults()),
            SyncConfig {
                dev_mode: true,
                ..SyncConfig::default()
            },
        );

        let summary = runner.sync_once().await.unwrap().expect("slot free");
        assert_eq!(summary.records.entries_completed, 1);
        assert_eq!(summary.personal.profiles_synced, 1);
        assert_eq!(store.entry_complete(entry_id).await, Some(true));
    }

    #[tokio::test]
    async fn test_busy_slot_skips_pass() {
        let store = Arc::new(MemoryStagingStore::new());
        store.stage_pending_entry(pending_entry(1, 8.0)).await;
        let (runner, _ledger) = runner_with(Arc::clone(&store));

        let _guard = runner.sync_slot.try_claim().expect("slot free");
        assert!(runner.sync_once().await.unwrap().is_none());
        // Nothing was pushed or marked.
        assert_eq!(store.find_pending_record_entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_pass_is_a_noop() {
        let store = Arc::new(MemoryStagingStore::new());
        let (runner, _ledger) = runner_with(store);
        let summary = runner.sync_once().await.unwrap().expect("slot free");
        assert_eq!(summary, PassSummary::default());
    }

    #[tokio::test]
    async fn test_restore_single_flight() {
        let store = Arc::new(MemoryStagingStore::new());
        let (runner, _ledger) = runner_with(store);

        let _guard = runner.restore_slot.try_claim().expect("slot free");
        assert_eq!(
            runner.restore().await.unwrap(),
            RestoreOutcome::AlreadyRunning
        );
        drop(_guard);
        assert!(matches!(
            runner.restore().await.unwrap(),
            RestoreOutcome::Completed(_)
        ));
    }
}
