//! The vendor-neutral event model handed to the downstream service.
//!
//! Field names serialise in camelCase and enum values in lowercase, matching
//! the downstream integration's event schema.

use serde::{Deserialize, Serialize};

use crate::{BuildResult, CauseKind, ChangeType, CommitSha, LifecycleEventKind, PhaseType, ScmType, Timestamp};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One normalized CI event.
///
/// Invariants upheld by [`crate::build_events`]:
///
/// - a [`LifecycleEventKind::Started`] event carries neither `result` nor
///   `duration`;
/// - a [`LifecycleEventKind::Scm`] companion event carries only identity,
///   `scm_data`, and causes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    /// Short run name: the ref for pipelines, the job name for jobs.
    pub project_display_name: String,
    pub event_type: LifecycleEventKind,
    pub build_ci_id: String,
    /// Build number; absent on companion SCM events.
    pub number: Option<String>,
    /// Full path identifying the run (e.g. `"pipeline:ns/proj/main"`).
    pub project: String,
    pub result: Option<BuildResult>,
    pub start_time: Option<Timestamp>,
    /// Never populated; kept for schema compatibility.
    pub estimated_duration: Option<i64>,
    /// Whole seconds.
    pub duration: Option<i64>,
    pub scm_data: Option<ScmData>,
    pub causes: Vec<EventCause>,
    pub phase_type: Option<PhaseType>,
}

impl CanonicalEvent {
    /// Replaces a missing result with [`BuildResult::Unavailable`].
    ///
    /// Applied at the publication boundary only; events under construction
    /// keep `None` so the started/SCM invariants stay checkable.
    #[must_use]
    pub fn with_default_result(mut self) -> Self {
        if self.result.is_none() {
            self.result = Some(BuildResult::Unavailable);
        }
        self
    }
}

// ---------------------------------------------------------------------------

/// One link of a cause chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCause {
    #[serde(rename = "type")]
    pub kind: CauseKind,
    /// Only set for [`CauseKind::User`].
    pub user: Option<String>,
    /// Full name of the upstream run; only set for [`CauseKind::Upstream`].
    pub project: Option<String>,
    /// Id of the upstream run; only set for [`CauseKind::Upstream`].
    pub build_ci_id: Option<String>,
    /// Nested causes of an upstream run.
    pub causes: Vec<EventCause>,
}

impl EventCause {
    /// A root cause with no upstream identity.
    pub fn root(kind: CauseKind, user: Option<String>) -> Self {
        Self {
            kind,
            user,
            project: None,
            build_ci_id: None,
            causes: Vec::new(),
        }
    }

    /// An [`CauseKind::Upstream`] cause wrapping the parent's root cause.
    pub fn upstream(project: String, build_ci_id: Option<String>, root: EventCause) -> Self {
        Self {
            kind: CauseKind::Upstream,
            user: None,
            project: Some(project),
            build_ci_id,
            causes: vec![root],
        }
    }
}

// ---------------------------------------------------------------------------
// Source control data
// ---------------------------------------------------------------------------

/// Commits and file changes between the previous and the built revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScmData {
    pub repository: ScmRepository,
    pub built_rev_id: CommitSha,
    /// In the order the platform's compare returned them.
    pub commits: Vec<ScmCommit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScmRepository {
    #[serde(rename = "type")]
    pub scm_type: ScmType,
    pub url: String,
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScmCommit {
    pub time: Timestamp,
    pub user: Option<String>,
    pub user_email: Option<String>,
    pub rev_id: CommitSha,
    /// The built revision, not the commit's git parent.
    pub parent_rev_id: CommitSha,
    pub comment: Option<String>,
    /// Empty when the diff for this commit could not be fetched.
    pub changes: Vec<ScmChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScmChange {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub file: String,
}
