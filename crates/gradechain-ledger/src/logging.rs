//! Logging decorator for ledger clients.
//!
//! Wraps any [`LedgerClient`] variant, forwarding every call and logging
//! id and result. Composed around the selected variant in dev mode; must
//! not alter success/failure semantics.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use gradechain_core::StudentId;

use crate::client::LedgerClient;
use crate::error::LedgerResult;
use crate::types::{Personal, RecordHistory, StudentRecord};

/// Decorator that logs every ledger call.
pub struct LoggingLedger {
    inner: Arc<dyn LedgerClient>,
}

impl LoggingLedger {
    /// Wrap a ledger client.
    #[must_use]
    pub fn new(inner: Arc<dyn LedgerClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LedgerClient for LoggingLedger {
    async fn start(&self) -> LedgerResult<()> {
        info!("Starting ledger client");
        self.inner.start().await
    }

    async fn stop(&self) -> LedgerResult<()> {
        info!("Stopping ledger client");
        self.inner.stop().await
    }

    async fn get_record(&self, student_id: StudentId) -> LedgerResult<StudentRecord> {
        let result = self.inner.get_record(student_id).await;
        info!(student_id = %student_id, ok = result.is_ok(), "getRecord");
        result
    }

    async fn update_record(
        &self,
        student_id: StudentId,
        record: &StudentRecord,
    ) -> LedgerResult<bool> {
        let result = self.inner.update_record(student_id, record).await;
        info!(
            student_id = %student_id,
            success = matches!(result, Ok(true)),
            "updateRecord"
        );
        result
    }

    async fn get_personal(&self, student_id: StudentId) -> LedgerResult<Option<Personal>> {
        let result = self.inner.get_personal(student_id).await;
        info!(student_id = %student_id, ok = result.is_ok(), "getPersonal");
        result
    }

    async fn update_personal(
        &self,
        student_id: StudentId,
        personal: &Personal,
    ) -> LedgerResult<bool> {
        let result = self.inner.update_personal(student_id, personal).await;
        info!(
            student_id = %student_id,
            success = matches!(result, Ok(true)),
            "updatePersonal"
        );
        result
    }

    async fn get_record_history(
        &self,
        student_id: StudentId,
    ) -> LedgerResult<Vec<RecordHistory>> {
        let result = self.inner.get_record_history(student_id).await;
        info!(student_id = %student_id, ok = result.is_ok(), "getRecordHistory");
        result
    }

    async fn get_all_personal(&self) -> LedgerResult<HashMap<StudentId, Personal>> {
        let result = self.inner.get_all_personal().await;
        info!(ok = result.is_ok(), "getAllPersonal");
        result
    }

    async fn get_all_records(&self) -> LedgerResult<HashMap<StudentId, StudentRecord>> {
        let result = self.inner.get_all_records().await;
        info!(ok = result.is_ok(), "getAllRecords");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::EphemeralLedger;

    #[tokio::test]
    async fn test_decorator_forwards_without_altering_semantics() {
        let inner = Arc::new(EphemeralLedger::new());
        inner
            .seed_personal(StudentId::new(1), Personal::default())
            .await;

        let logged = LoggingLedger::new(inner.clone());

        assert!(logged.start().await.is_ok());
        assert!(logged
            .get_personal(StudentId::new(1))
            .await
            .unwrap()
            .is_some());
        assert!(logged
            .update_record(StudentId::new(2), &StudentRecord::default())
            .await
            .unwrap());

        // Write went through to the wrapped client.
        assert_eq!(inner.get_record_history(StudentId::new(2)).await.unwrap().len(), 1);
        assert!(logged.stop().await.is_ok());
    }
}
