//! Distributed ledger variant.
//!
//! Delegates to an external consensus-based ledger network through an
//! opaque gateway handle. The wire protocol belongs to the gateway
//! implementation; this variant only marshals records as JSON and maps
//! gateway failures into the ledger contract: write-path failures and
//! timeouts surface as `Ok(false)` (never silent data loss), read-path
//! failures as errors.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use gradechain_core::StudentId;

use crate::client::LedgerClient;
use crate::error::{LedgerError, LedgerResult};
use crate::types::{Personal, RecordHistory, StudentRecord};

/// Opaque handle to the ledger network.
///
/// `evaluate` performs a read-only query; `submit` sends a transaction
/// through consensus. Both take the contract function name and its
/// string arguments and return the raw response payload.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn connect(&self) -> LedgerResult<()>;

    async fn close(&self) -> LedgerResult<()>;

    async fn evaluate(&self, function: &str, args: &[String]) -> LedgerResult<Vec<u8>>;

    async fn submit(&self, function: &str, args: &[String]) -> LedgerResult<Vec<u8>>;
}

/// Configuration for the distributed ledger variant.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteLedgerConfig {
    /// Channel the record contract is deployed on.
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Name of the record contract.
    #[serde(default = "default_contract")]
    pub contract: String,
    /// Upper bound for any single gateway call.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_channel() -> String {
    "studentchannel".to_string()
}

fn default_contract() -> String {
    "studentrecord".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for RemoteLedgerConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            contract: default_contract(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Ledger variant backed by an external ledger network.
pub struct DistributedLedger {
    gateway: Arc<dyn LedgerGateway>,
    config: RemoteLedgerConfig,
}

impl DistributedLedger {
    /// Create a client over the given gateway.
    #[must_use]
    pub fn new(gateway: Arc<dyn LedgerGateway>, config: RemoteLedgerConfig) -> Self {
        Self { gateway, config }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    /// Read-only query, bounded by the configured timeout. Failures
    /// propagate as errors.
    async fn evaluate(&self, function: &str, args: &[String]) -> LedgerResult<Vec<u8>> {
        match tokio::time::timeout(self.timeout(), self.gateway.evaluate(function, args)).await
        {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Timeout {
                timeout_secs: self.config.request_timeout_secs,
            }),
        }
    }

    /// Transaction submission, bounded by the configured timeout.
    /// Failures and timeouts surface as `false`.
    async fn submit(&self, function: &str, args: &[String]) -> bool {
        let result =
            tokio::time::timeout(self.timeout(), self.gateway.submit(function, args)).await;
        match result {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(function, error = %e, "Ledger transaction failed");
                false
            }
            Err(_) => {
                warn!(
                    function,
                    timeout_secs = self.config.request_timeout_secs,
                    "Ledger transaction timed out"
                );
                false
            }
        }
    }
}

#[async_trait]
impl LedgerClient for DistributedLedger {
    async fn start(&self) -> LedgerResult<()> {
        info!(
            channel = %self.config.channel,
            contract = %self.config.contract,
            "Connecting to ledger gateway"
        );
        self.gateway.connect().await
    }

    async fn stop(&self) -> LedgerResult<()> {
        self.gateway.close().await
    }

    async fn get_record(&self, student_id: StudentId) -> LedgerResult<StudentRecord> {
        let payload = self
            .evaluate("getStudentRecord", &[student_id.to_string()])
            .await?;
        if payload.is_empty() {
            return Ok(StudentRecord::default());
        }
        Ok(serde_json::from_slice(&payload)?)
    }

    async fn update_record(
        &self,
        student_id: StudentId,
        record: &StudentRecord,
    ) -> LedgerResult<bool> {
        let json = serde_json::to_string(record)?;
        Ok(self
            .submit("updateStudentRecord", &[student_id.to_string(), json])
            .await)
    }

    async fn get_personal(&self, student_id: StudentId) -> LedgerResult<Option<Personal>> {
        let payload = self
            .evaluate("getStudentPersonal", &[student_id.to_string()])
            .await?;
        if payload.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&payload)?))
    }

    async fn update_personal(
        &self,
        student_id: StudentId,
        personal: &Personal,
    ) -> LedgerResult<bool> {
        let json = serde_json::to_string(personal)?;
        Ok(self
            .submit("updateStudentPersonal", &[student_id.to_string(), json])
            .await)
    }

    async fn get_record_history(
        &self,
        student_id: StudentId,
    ) -> LedgerResult<Vec<RecordHistory>> {
        let payload = self
            .evaluate("getStudentRecordHistory", &[student_id.to_string()])
            .await?;
        if payload.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&payload)?)
    }

    async fn get_all_personal(&self) -> LedgerResult<HashMap<StudentId, Personal>> {
        let payload = self.evaluate("getAllStudentPersonal", &[]).await?;
        if payload.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_slice(&payload)?)
    }

    async fn get_all_records(&self) -> LedgerResult<HashMap<StudentId, StudentRecord>> {
        let payload = self.evaluate("getAllStudentRecord", &[]).await?;
        if payload.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_slice(&payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    // Mock gateway holding one record, optionally failing all submits.
    struct MockGateway {
        record_json: Vec<u8>,
        fail_submit: AtomicBool,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                record_json: Vec::new(),
                fail_submit: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl LedgerGateway for MockGateway {
        async fn connect(&self) -> LedgerResult<()> {
            Ok(())
        }

        async fn close(&self) -> LedgerResult<()> {
            Ok(())
        }

        async fn evaluate(&self, _function: &str, _args: &[String]) -> LedgerResult<Vec<u8>> {
            Ok(self.record_json.clone())
        }

        async fn submit(&self, _function: &str, _args: &[String]) -> LedgerResult<Vec<u8>> {
            if self.fail_submit.load(Ordering::SeqCst) {
                Err(LedgerError::unavailable("network partition"))
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[tokio::test]
    async fn test_empty_payload_yields_default_record() {
        let ledger = DistributedLedger::new(
            Arc::new(MockGateway::new()),
            RemoteLedgerConfig::default(),
        );
        let record = ledger.get_record(StudentId::new(1)).await.unwrap();
        assert!(record.is_empty());
        assert!(ledger.get_personal(StudentId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_submit_failure_surfaces_as_false() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_submit.store(true, Ordering::SeqCst);
        let ledger = DistributedLedger::new(gateway, RemoteLedgerConfig::default());

        let pushed = ledger
            .update_record(StudentId::new(1), &StudentRecord::default())
            .await
            .unwrap();
        assert!(!pushed);
    }

    #[tokio::test]
    async fn test_submit_success_surfaces_as_true() {
        let ledger = DistributedLedger::new(
            Arc::new(MockGateway::new()),
            RemoteLedgerConfig::default(),
        );
        let pushed = ledger
            .update_personal(StudentId::new(1), &Personal::default())
            .await
            .unwrap();
        assert!(pushed);
    }

    #[test]
    fn test_config_defaults() {
        let config: RemoteLedgerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.channel, "studentchannel");
        assert_eq!(config.contract, "studentrecord");
        assert_eq!(config.request_timeout_secs, 30);
    }
}
