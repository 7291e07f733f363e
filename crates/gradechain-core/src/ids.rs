//! Strongly Typed Identifiers
//!
//! This module provides type-safe identifier types for gradechain.
//! Using the newtype pattern, these types prevent accidental misuse of
//! different ID types at compile time. All identifiers wrap the numeric
//! account/row ids the ledger and staging store key their data by.
//!
//! # Example
//!
//! ```
//! use gradechain_core::{StudentId, ClassroomId};
//!
//! let student = StudentId::new(42);
//! let classroom = ClassroomId::new(7);
//!
//! // Type safety: cannot pass ClassroomId where StudentId is expected
//! fn requires_student(id: StudentId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_student(student);
//! // requires_student(classroom); // This would not compile!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying integer parse error message
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID type
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an ID from a raw numeric value.
            #[must_use]
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the underlying numeric value.
            #[must_use]
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.parse::<i64>()
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Strongly typed identifier for student accounts.
    ///
    /// Student records and personal profiles in the ledger are keyed by
    /// this id; it equals the staging-store account id for the student.
    StudentId
);

define_id!(
    /// Strongly typed identifier for classrooms.
    ClassroomId
);

define_id!(
    /// Strongly typed identifier for subjects.
    ///
    /// Subjects are registered in the subject registry; an id unknown to
    /// the registry is never written into a ledger record.
    SubjectId
);

define_id!(
    /// Strongly typed identifier for staging-store record entry rows.
    EntryId
);
