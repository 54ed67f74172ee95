//! Shared value types for the Relay normalization domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! the vocabulary of the canonical event model: lifecycle kinds, build
//! results, cause kinds, and timestamps.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle stage a webhook payload reports for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEventKind {
    /// The run is waiting to be picked up.
    Queued,
    /// The run has started.
    Started,
    /// The run reached a terminal status.
    Finished,
    /// Companion event carrying source-control data for a started run.
    Scm,
    /// The status carries no information worth publishing.
    Undefined,
}

impl LifecycleEventKind {
    /// Returns `true` if payloads of this kind produce canonical events.
    ///
    /// [`Queued`](Self::Queued) and [`Undefined`](Self::Undefined) payloads are
    /// discarded without side effects.
    pub fn is_processable(self) -> bool {
        !matches!(self, Self::Queued | Self::Undefined)
    }
}

impl std::fmt::Display for LifecycleEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Scm => "scm",
            Self::Undefined => "undefined",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------

/// Outcome of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildResult {
    Success,
    Failure,
    Aborted,
    Unstable,
    /// Default when the status is unmapped or the run has not finished.
    Unavailable,
}

impl BuildResult {
    /// Maps a platform status string to a result.
    ///
    /// Total: any status outside the table maps to [`BuildResult::Unavailable`].
    pub fn from_status(status: &str) -> Self {
        match status {
            "success" => Self::Success,
            "failed" => Self::Failure,
            "drop" | "skipped" | "canceled" => Self::Aborted,
            "unstable" => Self::Unstable,
            _ => Self::Unavailable,
        }
    }
}

// ---------------------------------------------------------------------------
// Causes
// ---------------------------------------------------------------------------

/// What triggered a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CauseKind {
    User,
    Timer,
    Scm,
    /// The run was triggered by a parent pipeline; wraps the parent's cause.
    Upstream,
}

// ---------------------------------------------------------------------------

/// Distinguishes whole-pipeline events from the events of jobs inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseType {
    /// Pipeline-level event.
    Post,
    /// Job/build-level event.
    Internal,
}

// ---------------------------------------------------------------------------
// Source control
// ---------------------------------------------------------------------------

/// Version-control system of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScmType {
    Git,
}

/// How a commit touched a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Delete,
    Edit,
}

impl ChangeType {
    /// Derives the change type from the new/deleted flags of a file diff.
    ///
    /// A diff flagged as both new and deleted is reported as an addition.
    pub fn from_flags(is_new: bool, is_deleted: bool) -> Self {
        if is_new {
            Self::Add
        } else if is_deleted {
            Self::Delete
        } else {
            Self::Edit
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly. Serialised as milliseconds since the Unix epoch, which is what the
/// downstream event model expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Creates a [`Timestamp`] from milliseconds since the Unix epoch.
    ///
    /// Returns `None` if the value is out of range.
    pub fn from_epoch_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Returns milliseconds since the Unix epoch.
    pub fn as_epoch_millis(self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_epoch_millis())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        Self::from_epoch_millis(millis)
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {millis}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_table_is_total() {
        assert_eq!(BuildResult::from_status("success"), BuildResult::Success);
        assert_eq!(BuildResult::from_status("failed"), BuildResult::Failure);
        assert_eq!(BuildResult::from_status("drop"), BuildResult::Aborted);
        assert_eq!(BuildResult::from_status("skipped"), BuildResult::Aborted);
        assert_eq!(BuildResult::from_status("canceled"), BuildResult::Aborted);
        assert_eq!(BuildResult::from_status("unstable"), BuildResult::Unstable);
        assert_eq!(BuildResult::from_status("running"), BuildResult::Unavailable);
        assert_eq!(BuildResult::from_status(""), BuildResult::Unavailable);
    }

    #[test]
    fn only_started_finished_and_scm_are_processable() {
        assert!(!LifecycleEventKind::Queued.is_processable());
        assert!(!LifecycleEventKind::Undefined.is_processable());
        assert!(LifecycleEventKind::Started.is_processable());
        assert!(LifecycleEventKind::Finished.is_processable());
    }

    #[test]
    fn change_type_prefers_add_over_delete() {
        assert_eq!(ChangeType::from_flags(true, false), ChangeType::Add);
        assert_eq!(ChangeType::from_flags(false, true), ChangeType::Delete);
        assert_eq!(ChangeType::from_flags(false, false), ChangeType::Edit);
        assert_eq!(ChangeType::from_flags(true, true), ChangeType::Add);
    }

    #[test]
    fn timestamp_serialises_as_epoch_millis() {
        let ts = Timestamp::from_epoch_millis(1_471_015_408_000).unwrap();
        assert_eq!(serde_json::to_string(&ts).unwrap(), "1471015408000");
        let back: Timestamp = serde_json::from_str("1471015408000").unwrap();
        assert_eq!(back, ts);
    }
}
