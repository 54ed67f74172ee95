//! Newtype domain identifiers.
//!
//! Every identity carried by a webhook payload is represented as a distinct
//! newtype wrapping a primitive. This prevents accidentally interchanging, for
//! example, a [`ProjectId`] with a [`JobId`] even though both are `u64` on the
//! wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (platform-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: platform-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// Identifies a project (repository) on the source platform.
    ProjectId
}

u64_id! {
    /// Identifies one run: a whole pipeline for pipeline events, a single
    /// job for job/build events.
    RunId
}

u64_id! {
    /// Identifies a single job inside a pipeline.
    ///
    /// Used when asking the platform whether the job produced artifacts.
    JobId
}

impl From<RunId> for JobId {
    fn from(id: RunId) -> Self {
        Self(id.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies the handling of one webhook delivery.
///
/// Generated fresh for every incoming request and recorded on the handling
/// span so all log lines from a single delivery can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryId(Uuid);

impl DeliveryId {
    /// Generates a new random delivery identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (Git names)
// ---------------------------------------------------------------------------

string_id! {
    /// A Git commit SHA (40-character lowercase hex string).
    CommitSha
}

/// The all-zero revision the platform sends as `before_sha` when there is no
/// prior revision (e.g. the first push of a new branch).
pub const BLANK_SHA: &str = "0000000000000000000000000000000000000000";

impl CommitSha {
    /// Returns `true` if this is the all-zero "no prior revision" sentinel.
    pub fn is_blank(&self) -> bool {
        self.0 == BLANK_SHA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_sha_rejects_empty() {
        assert!(CommitSha::new("").is_none());
    }

    #[test]
    fn blank_sha_is_detected() {
        let blank = CommitSha::new(BLANK_SHA).unwrap();
        assert!(blank.is_blank());
        let real = CommitSha::new("a".repeat(40)).unwrap();
        assert!(!real.is_blank());
    }
}
