//! Ledger client capability trait.
//!
//! Capability-based trait definition for the authoritative record store.
//! Implementations are selected at composition time (see
//! [`select_ledger`](crate::select_ledger)), never at call time.

use async_trait::async_trait;

use gradechain_core::StudentId;

use crate::error::LedgerResult;
use crate::types::{Personal, PersonalDump, RecordDump, RecordHistory, StudentRecord};

/// Client for the authoritative store of finalized student records.
///
/// All operations are asynchronous and may fail. Write operations return
/// a success flag: `Ok(false)` means the ledger rejected or could not
/// apply the write, and the caller must not assume partial application.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Lifecycle hook for any underlying connection or gateway.
    async fn start(&self) -> LedgerResult<()>;

    /// Release any underlying connection or gateway.
    async fn stop(&self) -> LedgerResult<()>;

    /// Fetch a student's record.
    ///
    /// An absent student yields an empty default record, not an error.
    async fn get_record(&self, student_id: StudentId) -> LedgerResult<StudentRecord>;

    /// Replace a student's whole record.
    async fn update_record(
        &self,
        student_id: StudentId,
        record: &StudentRecord,
    ) -> LedgerResult<bool>;

    /// Fetch a student's personal profile, if present.
    async fn get_personal(&self, student_id: StudentId) -> LedgerResult<Option<Personal>>;

    /// Replace a student's personal profile.
    async fn update_personal(
        &self,
        student_id: StudentId,
        personal: &Personal,
    ) -> LedgerResult<bool>;

    /// Fetch the ordered history of record snapshots for a student,
    /// ascending by timestamp.
    async fn get_record_history(&self, student_id: StudentId)
        -> LedgerResult<Vec<RecordHistory>>;

    /// Full dump of every personal profile. Used only by restore.
    async fn get_all_personal(&self) -> LedgerResult<PersonalDump>;

    /// Full dump of every student record. Used only by restore.
    async fn get_all_records(&self) -> LedgerResult<RecordDump>;
}
