//! In-memory staging store.
//!
//! Implements both the [`StagingStore`] contract and the ledger's
//! [`MirrorStore`] seam over process-local maps. Used by tests and by
//! deployments configured without a relational database.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use gradechain_core::{ClassroomId, EntryId, StudentId};
use gradechain_ledger::{
    LedgerResult, MirrorStore, Personal, RecordHistory, StudentRecord,
};

use super::{
    ClassroomInfo, NewRecordEntry, PendingEntry, ProfileUpdate, StagingError, StagingResult,
    StagingStore,
};

#[derive(Debug, Clone)]
struct StagedAccount {
    username: String,
}

#[derive(Default)]
struct StagingState {
    next_entry_id: i64,
    accounts: HashMap<StudentId, StagedAccount>,
    students: HashSet<StudentId>,
    profiles: HashMap<StudentId, Personal>,
    updated_profiles: HashSet<StudentId>,
    classrooms: HashMap<ClassroomId, ClassroomInfo>,
    records: HashSet<(StudentId, ClassroomId)>,
    entries: HashMap<EntryId, PendingEntry>,
}

#[derive(Default)]
struct MirrorState {
    records: HashMap<StudentId, StudentRecord>,
    personals: HashMap<StudentId, Personal>,
    history: HashMap<StudentId, Vec<RecordHistory>>,
}

/// Process-local staging store.
#[derive(Default)]
pub struct MemoryStagingStore {
    staging: RwLock<StagingState>,
    mirror: RwLock<MirrorState>,
}

impl MemoryStagingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an approved entry, as the verification handler would.
    /// Returns the assigned entry id.
    pub async fn stage_pending_entry(&self, mut entry: PendingEntry) -> EntryId {
        let mut state = self.staging.write().await;
        state.next_entry_id += 1;
        let id = EntryId::new(state.next_entry_id);
        entry.id = id;
        state.entries.insert(id, entry);
        id
    }

    /// Flag a profile as updated, as the profile handler would.
    pub async fn stage_profile_update(&self, student_id: StudentId, personal: Personal) {
        let mut state = self.staging.write().await;
        state.profiles.insert(student_id, personal);
        state.students.insert(student_id);
        state.updated_profiles.insert(student_id);
    }

    /// Completion flag of an entry, if it exists.
    pub async fn entry_complete(&self, entry_id: EntryId) -> Option<bool> {
        self.staging
            .read()
            .await
            .entries
            .get(&entry_id)
            .map(|entry| entry.complete)
    }

    /// Whether a profile is still flagged as updated.
    pub async fn profile_updated(&self, student_id: StudentId) -> bool {
        self.staging
            .read()
            .await
            .updated_profiles
            .contains(&student_id)
    }

    /// Username of a staged account, if it exists.
    pub async fn account_username(&self, student_id: StudentId) -> Option<String> {
        self.staging
            .read()
            .await
            .accounts
            .get(&student_id)
            .map(|account| account.username.clone())
    }

    /// Number of staged accounts.
    pub async fn account_count(&self) -> usize {
        self.staging.read().await.accounts.len()
    }

    /// Number of staged classrooms.
    pub async fn classroom_count(&self) -> usize {
        self.staging.read().await.classrooms.len()
    }

    /// Number of record entry rows for one student/classroom pair.
    pub async fn entry_count(&self, student_id: StudentId, classroom_id: ClassroomId) -> usize {
        self.staging
            .read()
            .await
            .entries
            .values()
            .filter(|entry| {
                entry.student_id == student_id && entry.classroom_id == classroom_id
            })
            .count()
    }
}

#[async_trait]
impl StagingStore for MemoryStagingStore {
    async fn find_pending_record_entries(&self) -> StagingResult<Vec<PendingEntry>> {
        Ok(self
            .staging
            .read()
            .await
            .entries
            .values()
            .filter(|entry| !entry.complete)
            .cloned()
            .collect())
    }

    async fn mark_record_entries_complete(&self, entry_ids: &[EntryId]) -> StagingResult<()> {
        let mut state = self.staging.write().await;
        for entry_id in entry_ids {
            if let Some(entry) = state.entries.get_mut(entry_id) {
                entry.complete = true;
            }
        }
        Ok(())
    }

    async fn find_updated_profiles(&self) -> StagingResult<Vec<ProfileUpdate>> {
        let state = self.staging.read().await;
        Ok(state
            .updated_profiles
            .iter()
            .filter(|id| state.students.contains(id))
            .filter_map(|id| {
                state.profiles.get(id).map(|personal| ProfileUpdate {
                    student_id: *id,
                    personal: personal.clone(),
                })
            })
            .collect())
    }

    async fn mark_profiles_synced(&self, student_ids: &[StudentId]) -> StagingResult<()> {
        let mut state = self.staging.write().await;
        for student_id in student_ids {
            state.updated_profiles.remove(student_id);
        }
        Ok(())
    }

    async fn account_exists(&self, student_id: StudentId) -> StagingResult<bool> {
        Ok(self.staging.read().await.accounts.contains_key(&student_id))
    }

    async fn student_exists(&self, student_id: StudentId) -> StagingResult<bool> {
        Ok(self.staging.read().await.students.contains(&student_id))
    }

    async fn create_student(
        &self,
        student_id: StudentId,
        personal: &Personal,
        username: &str,
        _default_password: &str,
    ) -> StagingResult<()> {
        let mut state = self.staging.write().await;
        state.accounts.insert(
            student_id,
            StagedAccount {
                username: username.to_string(),
            },
        );
        state.students.insert(student_id);
        state.profiles.insert(student_id, personal.clone());
        Ok(())
    }

    async fn ensure_classroom(
        &self,
        classroom_id: ClassroomId,
        info: &ClassroomInfo,
    ) -> StagingResult<bool> {
        let mut state = self.staging.write().await;
        if state.classrooms.contains_key(&classroom_id) {
            return Ok(false);
        }
        state.classrooms.insert(classroom_id, info.clone());
        Ok(true)
    }

    async fn ensure_record(
        &self,
        student_id: StudentId,
        classroom_id: ClassroomId,
    ) -> StagingResult<bool> {
        Ok(self
            .staging
            .write()
            .await
            .records
            .insert((student_id, classroom_id)))
    }

    async fn insert_record_entry(
        &self,
        student_id: StudentId,
        classroom_id: ClassroomId,
        entry: NewRecordEntry,
    ) -> StagingResult<()> {
        let mut state = self.staging.write().await;
        if !state.records.contains(&(student_id, classroom_id)) {
            return Err(StagingError::NotFound {
                entity: "record",
                id: student_id.value(),
            });
        }
        state.next_entry_id += 1;
        let id = EntryId::new(state.next_entry_id);
        state.entries.insert(
            id,
            PendingEntry {
                id,
                student_id,
                classroom_id,
                classroom: None,
                subject_id: entry.subject_id,
                first_half_score: entry.first_half_score,
                second_half_score: entry.second_half_score,
                final_score: entry.final_score,
                requested_by: student_id,
                approved_by: 0,
                request_date: entry.request_date,
                approval_date: entry.approval_date,
                complete: true,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl MirrorStore for MemoryStagingStore {
    async fn load_record(&self, student_id: StudentId) -> LedgerResult<Option<StudentRecord>> {
        Ok(self.mirror.read().await.records.get(&student_id).cloned())
    }

    async fn store_record(
        &self,
        student_id: StudentId,
        record: &StudentRecord,
    ) -> LedgerResult<()> {
        self.mirror
            .write()
            .await
            .records
            .insert(student_id, record.clone());
        Ok(())
    }

    async fn load_personal(&self, student_id: StudentId) -> LedgerResult<Option<Personal>> {
        Ok(self.mirror.read().await.personals.get(&student_id).cloned())
    }

    async fn store_personal(
        &self,
        student_id: StudentId,
        personal: &Personal,
    ) -> LedgerResult<()> {
        self.mirror
            .write()
            .await
            .personals
            .insert(student_id, personal.clone());
        Ok(())
    }

    async fn load_history(&self, student_id: StudentId) -> LedgerResult<Vec<RecordHistory>> {
        Ok(self
            .mirror
            .read()
            .await
            .history
            .get(&student_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_history(
        &self,
        student_id: StudentId,
        entry: RecordHistory,
    ) -> LedgerResult<()> {
        self.mirror
            .write()
            .await
            .history
            .entry(student_id)
            .or_default()
            .push(entry);
        Ok(())
    }

    async fn dump_personal(&self) -> LedgerResult<HashMap<StudentId, Personal>> {
        Ok(self.mirror.read().await.personals.clone())
    }

    async fn dump_records(&self) -> LedgerResult<HashMap<StudentId, StudentRecord>> {
        Ok(self.mirror.read().await.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gradechain_core::SubjectId;

    fn sample_entry(student: i64, classroom: i64, subject: i64) -> PendingEntry {
        PendingEntry {
            id: EntryId::new(0),
            student_id: StudentId::new(student),
            classroom_id: ClassroomId::new(classroom),
            classroom: None,
            subject_id: SubjectId::new(subject),
            first_half_score: 5.0,
            second_half_score: 6.0,
            final_score: 7.0,
            requested_by: StudentId::new(student),
            approved_by: 99,
            request_date: Utc::now(),
            approval_date: Utc::now(),
            complete: false,
        }
    }

    #[tokio::test]
    async fn test_pending_snapshot_excludes_complete_entries() {
        let store = MemoryStagingStore::new();
        let first = store.stage_pending_entry(sample_entry(1, 1, 1)).await;
        let second = store.stage_pending_entry(sample_entry(1, 1, 2)).await;

        store.mark_record_entries_complete(&[first]).await.unwrap();

        let pending = store.find_pending_record_entries().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second);
        assert_eq!(store.entry_complete(first).await, Some(true));
    }

    #[tokio::test]
    async fn test_profile_flags() {
        let store = MemoryStagingStore::new();
        let id = StudentId::new(3);
        store.stage_profile_update(id, Personal::default()).await;

        assert_eq!(store.find_updated_profiles().await.unwrap().len(), 1);
        store.mark_profiles_synced(&[id]).await.unwrap();
        assert!(!store.profile_updated(id).await);
        assert!(store.find_updated_profiles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_entry_requires_record_row() {
        let store = MemoryStagingStore::new();
        let student = StudentId::new(1);
        let classroom = ClassroomId::new(2);
        let entry = NewRecordEntry {
            subject_id: SubjectId::new(1),
            first_half_score: 5.0,
            second_half_score: 5.0,
            final_score: 5.0,
            request_date: Utc::now(),
            approval_date: Utc::now(),
        };

        let err = store
            .insert_record_entry(student, classroom, entry.clone())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StagingError::NotFound {
                entity: "record",
                ..
            }
        ));

        store.ensure_record(student, classroom).await.unwrap();
        store
            .insert_record_entry(student, classroom, entry)
            .await
            .unwrap();
        assert_eq!(store.entry_count(student, classroom).await, 1);
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let store = MemoryStagingStore::new();
        let classroom = ClassroomId::new(1);
        let info = ClassroomInfo {
            name: "10A".to_string(),
            year: 2026,
            grade: 10,
        };

        assert!(store.ensure_classroom(classroom, &info).await.unwrap());
        assert!(!store.ensure_classroom(classroom, &info).await.unwrap());

        let student = StudentId::new(1);
        assert!(store.ensure_record(student, classroom).await.unwrap());
        assert!(!store.ensure_record(student, classroom).await.unwrap());
    }
}
