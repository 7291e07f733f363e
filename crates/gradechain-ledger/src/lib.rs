//! # Ledger Client
//!
//! Capability abstraction over the authoritative store of finalized
//! student records, with swappable variants selected at composition time:
//!
//! - [`EphemeralLedger`] — in-memory, no persistence (tests and
//!   disabled-database configurations)
//! - [`LocalMirrorLedger`] — backed by the local relational store through
//!   the [`MirrorStore`] seam (no external ledger configured)
//! - [`DistributedLedger`] — backed by an external consensus network
//!   through the opaque [`LedgerGateway`] handle
//! - [`LoggingLedger`] — decorator that logs every call, composed in dev
//!   mode
//!
//! Network and timeout failures surface as `Ok(false)` on the write path
//! or as failed futures, never as silent data loss.

pub mod client;
pub mod error;
pub mod logging;
pub mod memory;
pub mod mirror;
pub mod remote;
pub mod types;

use std::sync::Arc;

use tracing::info;

// Re-exports for convenience
pub use client::LedgerClient;
pub use error::{LedgerError, LedgerResult};
pub use logging::LoggingLedger;
pub use memory::EphemeralLedger;
pub use mirror::{LocalMirrorLedger, MirrorStore};
pub use remote::{DistributedLedger, LedgerGateway, RemoteLedgerConfig};
pub use types::{
    ClassRecord, Classification, ClassificationLevel, Personal, PersonalDump, RecordDump,
    RecordHistory, StudentRecord, SubjectScore,
};

/// Compose the ledger client for a deployment.
///
/// Selection order: an in-memory database configuration always gets the
/// ephemeral variant; otherwise a configured gateway selects the
/// distributed variant, and the local mirror is the fallback. Dev mode
/// wraps the selected variant with the logging decorator.
pub fn select_ledger(
    in_memory: bool,
    dev_mode: bool,
    gateway: Option<Arc<dyn LedgerGateway>>,
    remote_config: RemoteLedgerConfig,
    mirror: Arc<dyn MirrorStore>,
) -> Arc<dyn LedgerClient> {
    let ledger: Arc<dyn LedgerClient> = if in_memory {
        info!("Using ephemeral ledger");
        Arc::new(EphemeralLedger::new())
    } else if let Some(gateway) = gateway {
        info!("Using distributed ledger");
        Arc::new(DistributedLedger::new(gateway, remote_config))
    } else {
        info!("Using local-mirror ledger");
        Arc::new(LocalMirrorLedger::new(mirror))
    };

    if dev_mode {
        Arc::new(LoggingLedger::new(ledger))
    } else {
        ledger
    }
}
