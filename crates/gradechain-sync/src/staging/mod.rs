//! Staging store contract.
//!
//! The staging store is the relational system holding pending,
//! teacher-approved grade changes and profile updates. The engine does
//! not own the entity/query layer; it consumes these operations against
//! it. Transaction commit/rollback boundaries belong to the
//! implementation, with one contractual guarantee: the batch completion
//! methods are atomic — either every mark in the batch is committed or
//! none is.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use gradechain_core::{ClassroomId, EntryId, StudentId, SubjectId};
use gradechain_ledger::Personal;

pub use memory::MemoryStagingStore;

/// Errors surfaced by staging store implementations.
#[derive(Debug, Error)]
pub enum StagingError {
    /// A read query failed.
    #[error("query failed: {message}")]
    Query { message: String },

    /// A transaction could not be committed.
    #[error("commit failed: {message}")]
    Commit { message: String },

    /// A write violated a store constraint.
    #[error("constraint violation: {message}")]
    Constraint { message: String },

    /// A referenced row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },
}

impl StagingError {
    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a commit error.
    pub fn commit(message: impl Into<String>) -> Self {
        Self::Commit {
            message: message.into(),
        }
    }

    /// Create a constraint violation error.
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint {
            message: message.into(),
        }
    }
}

/// Result type for staging operations.
pub type StagingResult<T> = Result<T, StagingError>;

/// Classroom display metadata carried on pending entries and dumped
/// class records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassroomInfo {
    pub name: String,
    pub year: i32,
    pub grade: i32,
}

/// A teacher-approved grade change not yet pushed to the ledger.
///
/// Created when a teacher verifies a student-initiated request; its
/// completion flag is set only after a successful ledger write. The
/// engine never deletes these rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    pub id: EntryId,
    pub student_id: StudentId,
    pub classroom_id: ClassroomId,
    /// Display metadata of the source classroom, when known.
    pub classroom: Option<ClassroomInfo>,
    pub subject_id: SubjectId,
    pub first_half_score: f32,
    pub second_half_score: f32,
    pub final_score: f32,
    /// Account that requested the change.
    pub requested_by: StudentId,
    /// Teacher account that approved the change.
    pub approved_by: i64,
    pub request_date: DateTime<Utc>,
    pub approval_date: DateTime<Utc>,
    pub complete: bool,
}

/// A profile flagged as updated and awaiting a ledger push.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub student_id: StudentId,
    pub personal: Personal,
}

/// A historical record entry inserted by restore: already approved,
/// already complete.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecordEntry {
    pub subject_id: SubjectId,
    pub first_half_score: f32,
    pub second_half_score: f32,
    pub final_score: f32,
    pub request_date: DateTime<Utc>,
    pub approval_date: DateTime<Utc>,
}

/// Operations the engine performs against the staging store.
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Snapshot of all approved entries whose completion flag is unset.
    async fn find_pending_record_entries(&self) -> StagingResult<Vec<PendingEntry>>;

    /// Set the completion flag on the given entries. Atomic: all marks
    /// commit together or not at all.
    async fn mark_record_entries_complete(&self, entry_ids: &[EntryId]) -> StagingResult<()>;

    /// Snapshot of all profiles flagged as updated, joined with their
    /// student rows.
    async fn find_updated_profiles(&self) -> StagingResult<Vec<ProfileUpdate>>;

    /// Clear the updated flag on the given profiles. Atomic.
    async fn mark_profiles_synced(&self, student_ids: &[StudentId]) -> StagingResult<()>;

    /// Whether an account row exists for the id.
    async fn account_exists(&self, student_id: StudentId) -> StagingResult<bool>;

    /// Whether a student row exists for the id.
    async fn student_exists(&self, student_id: StudentId) -> StagingResult<bool>;

    /// Synthesize account, profile, and student rows from dumped
    /// personal data. The store owns password hashing and
    /// username-collision suffixing.
    async fn create_student(
        &self,
        student_id: StudentId,
        personal: &Personal,
        username: &str,
        default_password: &str,
    ) -> StagingResult<()>;

    /// Create the classroom if missing. Returns true when created.
    async fn ensure_classroom(
        &self,
        classroom_id: ClassroomId,
        info: &ClassroomInfo,
    ) -> StagingResult<bool>;

    /// Create the student/classroom record row if missing. Returns true
    /// when created.
    async fn ensure_record(
        &self,
        student_id: StudentId,
        classroom_id: ClassroomId,
    ) -> StagingResult<bool>;

    /// Insert one restored historical entry.
    async fn insert_record_entry(
        &self,
        student_id: StudentId,
        classroom_id: ClassroomId,
        entry: NewRecordEntry,
    ) -> StagingResult<()>;
}
