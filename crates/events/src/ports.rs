//! Port traits the engine depends on.
//!
//! The engine sees only these traits. The `gitlab` crate implements
//! [`SourcePlatform`] over the platform's REST API and the `publisher` crate
//! implements [`Dispatcher`] over the downstream integration service; tests
//! substitute in-memory fakes.

use async_trait::async_trait;

use crate::{CanonicalEvent, CommitSha, DispatchError, JobId, PlatformError, ProjectId, Timestamp};

// ---------------------------------------------------------------------------
// Source platform
// ---------------------------------------------------------------------------

/// A commit as returned by the platform's compare call.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCommit {
    pub id: CommitSha,
    pub committer_name: Option<String>,
    pub committer_email: Option<String>,
    /// `None` when the platform did not report a time.
    pub timestamp: Option<Timestamp>,
    pub message: Option<String>,
}

/// One file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Path after the change.
    pub path: String,
    pub is_new: bool,
    pub is_deleted: bool,
}

/// What the engine needs to know about a job after it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobInfo {
    /// Whether the job uploaded an artifacts archive.
    pub has_artifacts: bool,
}

/// Read access to the source platform.
///
/// Implementations bound each call with a timeout and report a timeout as an
/// error like any other failure. Calls are never retried.
#[async_trait]
pub trait SourcePlatform: Send + Sync {
    /// Commits reachable from `to` but not from `from`, in platform order.
    async fn compare(
        &self,
        project: ProjectId,
        from: &CommitSha,
        to: &CommitSha,
    ) -> Result<Vec<RemoteCommit>, PlatformError>;

    /// Files touched by one commit.
    async fn commit_diff(&self, project: ProjectId, commit: &CommitSha) -> Result<Vec<FileDiff>, PlatformError>;

    /// Details of one job.
    async fn job(&self, project: ProjectId, job: JobId) -> Result<JobInfo, PlatformError>;
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Hands finished events to the downstream service.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Publishes one canonical event.
    async fn publish(&self, event: &CanonicalEvent) -> Result<(), DispatchError>;

    /// Asks the downstream service to collect the test results of a finished job.
    async fn request_test_results(&self, project: ProjectId, job: JobId) -> Result<(), DispatchError>;
}
