//! # Record Synchronization Engine
//!
//! Periodically drains teacher-approved grade changes and profile
//! updates from the staging store into the authoritative ledger, and
//! rebuilds the staging store from ledger dumps on demand.
//!
//! The engine is batch-oriented: each pass snapshots the pending work,
//! merges it into whole ledger records per student, pushes, and only
//! then marks the drained rows complete in one atomic batch. Failed
//! pushes leave their rows pending for the next pass; nothing is ever
//! lost silently.

pub mod account;
pub mod classification;
pub mod config;
pub mod error;
pub mod merge;
pub mod restore;
pub mod runner;
pub mod runstate;
pub mod staging;
pub mod subjects;

// Re-exports for convenience
pub use classification::{classify, classify_subjects};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use merge::{merge_student, MergeOutcome};
pub use restore::{run_restore, RestoreSummary};
pub use runner::{
    PassSummary, PersonalPassSummary, RecordPassSummary, RestoreOutcome, SyncRunner,
};
pub use runstate::{RunGuard, RunSlot};
pub use staging::{
    ClassroomInfo, MemoryStagingStore, NewRecordEntry, PendingEntry, ProfileUpdate, StagingError,
    StagingResult, StagingStore,
};
pub use subjects::{StaticSubjectRegistry, Subject, SubjectRegistry};
