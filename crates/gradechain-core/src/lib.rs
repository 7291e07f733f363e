//! gradechain Core Library
//!
//! Shared identifier types for gradechain.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (StudentId, ClassroomId, SubjectId, EntryId)

pub mod ids;

// Re-export main types for convenient access
pub use ids::{ClassroomId, EntryId, ParseIdError, StudentId, SubjectId};
