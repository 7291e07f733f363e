//! In-memory ledger variant.
//!
//! No persistence; used for tests and deployments configured with an
//! in-memory database. Every successful write appends a history snapshot
//! so history reads behave like the real ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use gradechain_core::StudentId;

use crate::client::LedgerClient;
use crate::error::LedgerResult;
use crate::types::{Personal, RecordHistory, StudentRecord};

const UPDATED_BY: &str = "ephemeral";

/// Ephemeral, in-memory ledger.
#[derive(Default)]
pub struct EphemeralLedger {
    records: RwLock<HashMap<StudentId, StudentRecord>>,
    personals: RwLock<HashMap<StudentId, Personal>>,
    history: RwLock<HashMap<StudentId, Vec<RecordHistory>>>,
}

impl EphemeralLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, without generating history. Intended for
    /// test and bootstrap setups.
    pub async fn seed_record(&self, student_id: StudentId, record: StudentRecord) {
        self.records.write().await.insert(student_id, record);
    }

    /// Seed a personal profile directly.
    pub async fn seed_personal(&self, student_id: StudentId, personal: Personal) {
        self.personals.write().await.insert(student_id, personal);
    }
}

#[async_trait]
impl LedgerClient for EphemeralLedger {
    async fn start(&self) -> LedgerResult<()> {
        Ok(())
    }

    async fn stop(&self) -> LedgerResult<()> {
        Ok(())
    }

    async fn get_record(&self, student_id: StudentId) -> LedgerResult<StudentRecord> {
        Ok(self
            .records
            .read()
            .await
            .get(&student_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_record(
        &self,
        student_id: StudentId,
        record: &StudentRecord,
    ) -> LedgerResult<bool> {
        self.records
            .write()
            .await
            .insert(student_id, record.clone());
        self.history
            .write()
            .await
            .entry(student_id)
            .or_default()
            .push(RecordHistory {
                timestamp: Utc::now(),
                record: record.clone(),
                updated_by: UPDATED_BY.to_string(),
            });
        Ok(true)
    }

    async fn get_personal(&self, student_id: StudentId) -> LedgerResult<Option<Personal>> {
        Ok(self.personals.read().await.get(&student_id).cloned())
    }

    async fn update_personal(
        &self,
        student_id: StudentId,
        personal: &Personal,
    ) -> LedgerResult<bool> {
        self.personals
            .write()
            .await
            .insert(student_id, personal.clone());
        Ok(true)
    }

    async fn get_record_history(
        &self,
        student_id: StudentId,
    ) -> LedgerResult<Vec<RecordHistory>> {
        Ok(self
            .history
            .read()
            .await
            .get(&student_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_all_personal(&self) -> LedgerResult<HashMap<StudentId, Personal>> {
        Ok(self.personals.read().await.clone())
    }

    async fn get_all_records(&self) -> LedgerResult<HashMap<StudentId, StudentRecord>> {
        Ok(self.records.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_absent_student_yields_default_record() {
        let ledger = EphemeralLedger::new();
        let record = ledger.get_record(StudentId::new(1)).await.unwrap();
        assert!(record.is_empty());
        assert!(ledger.get_personal(StudentId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_appends_history_in_order() {
        let ledger = EphemeralLedger::new();
        let id = StudentId::new(5);

        let first = StudentRecord::default();
        assert!(ledger.update_record(id, &first).await.unwrap());

        let mut second = StudentRecord::default();
        second
            .class_records
            .insert(gradechain_core::ClassroomId::new(1), Default::default());
        assert!(ledger.update_record(id, &second).await.unwrap());

        let history = ledger.get_record_history(id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].timestamp <= history[1].timestamp);
        assert_eq!(history[0].record, first);
        assert_eq!(history[1].record, second);
        assert_eq!(history[0].updated_by, UPDATED_BY);
    }

    #[tokio::test]
    async fn test_full_dumps() {
        let ledger = EphemeralLedger::new();
        ledger
            .seed_personal(StudentId::new(1), Personal::default())
            .await;
        ledger
            .seed_record(StudentId::new(2), StudentRecord::default())
            .await;

        assert_eq!(ledger.get_all_personal().await.unwrap().len(), 1);
        assert_eq!(ledger.get_all_records().await.unwrap().len(), 1);
    }
}
