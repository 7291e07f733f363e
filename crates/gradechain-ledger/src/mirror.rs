//! Local-mirror ledger variant.
//!
//! Used when no external ledger network is configured: records are kept
//! in the same relational store the rest of the system uses. The store
//! itself is an external collaborator and is reached through the
//! [`MirrorStore`] seam.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use gradechain_core::StudentId;

use crate::client::LedgerClient;
use crate::error::LedgerResult;
use crate::types::{Personal, RecordHistory, StudentRecord};

const UPDATED_BY: &str = "local-mirror";

/// Storage seam for the local-mirror ledger variant.
///
/// Implemented by the relational layer that also backs the staging
/// store. All methods map storage failures to
/// [`LedgerError`](crate::error::LedgerError) so the mirror surfaces
/// them like any other ledger failure.
#[async_trait]
pub trait MirrorStore: Send + Sync {
    async fn load_record(&self, student_id: StudentId) -> LedgerResult<Option<StudentRecord>>;

    async fn store_record(
        &self,
        student_id: StudentId,
        record: &StudentRecord,
    ) -> LedgerResult<()>;

    async fn load_personal(&self, student_id: StudentId) -> LedgerResult<Option<Personal>>;

    async fn store_personal(
        &self,
        student_id: StudentId,
        personal: &Personal,
    ) -> LedgerResult<()>;

    async fn load_history(&self, student_id: StudentId) -> LedgerResult<Vec<RecordHistory>>;

    async fn append_history(
        &self,
        student_id: StudentId,
        entry: RecordHistory,
    ) -> LedgerResult<()>;

    async fn dump_personal(&self) -> LedgerResult<HashMap<StudentId, Personal>>;

    async fn dump_records(&self) -> LedgerResult<HashMap<StudentId, StudentRecord>>;
}

/// Ledger variant that mirrors records into the local relational store.
pub struct LocalMirrorLedger {
    store: Arc<dyn MirrorStore>,
}

impl LocalMirrorLedger {
    /// Create a mirror over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn MirrorStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LedgerClient for LocalMirrorLedger {
    async fn start(&self) -> LedgerResult<()> {
        Ok(())
    }

    async fn stop(&self) -> LedgerResult<()> {
        Ok(())
    }

    async fn get_record(&self, student_id: StudentId) -> LedgerResult<StudentRecord> {
        Ok(self
            .store
            .load_record(student_id)
            .await?
            .unwrap_or_default())
    }

    async fn update_record(
        &self,
        student_id: StudentId,
        record: &StudentRecord,
    ) -> LedgerResult<bool> {
        self.store.store_record(student_id, record).await?;
        self.store
            .append_history(
                student_id,
                RecordHistory {
                    timestamp: Utc::now(),
                    record: record.clone(),
                    updated_by: UPDATED_BY.to_string(),
                },
            )
            .await?;
        Ok(true)
    }

    async fn get_personal(&self, student_id: StudentId) -> LedgerResult<Option<Personal>> {
        self.store.load_personal(student_id).await
    }

    async fn update_personal(
        &self,
        student_id: StudentId,
        personal: &Personal,
    ) -> LedgerResult<bool> {
        self.store.store_personal(student_id, personal).await?;
        Ok(true)
    }

    async fn get_record_history(
        &self,
        student_id: StudentId,
    ) -> LedgerResult<Vec<RecordHistory>> {
        self.store.load_history(student_id).await
    }

    async fn get_all_personal(&self) -> LedgerResult<HashMap<StudentId, Personal>> {
        self.store.dump_personal().await
    }

    async fn get_all_records(&self) -> LedgerResult<HashMap<StudentId, StudentRecord>> {
        self.store.dump_records().await
    }
}
