//! In-memory fakes for the port traits (testing only).

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use events::{
    CanonicalEvent, CommitSha, DispatchError, Dispatcher, FileDiff, JobId, JobInfo, PlatformError, ProjectId,
    RemoteCommit, SourcePlatform, Timestamp,
};

// ---------------------------------------------------------------------------
// ScriptedPlatform
// ---------------------------------------------------------------------------

/// Source platform that answers from pre-loaded data and records every call.
#[derive(Debug, Default)]
pub struct ScriptedPlatform {
    pub commits: Option<Vec<RemoteCommit>>,
    pub diffs: HashMap<String, Vec<FileDiff>>,
    pub failing_diffs: HashSet<String>,
    pub jobs: HashMap<u64, JobInfo>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare returns these commits; without this call compare fails.
    pub fn with_commits(mut self, commits: Vec<RemoteCommit>) -> Self {
        self.commits = Some(commits);
        self
    }

    pub fn with_diff(mut self, sha: &str, diffs: Vec<FileDiff>) -> Self {
        self.diffs.insert(sha.to_string(), diffs);
        self
    }

    pub fn with_failing_diff(mut self, sha: &str) -> Self {
        self.failing_diffs.insert(sha.to_string());
        self
    }

    pub fn with_job(mut self, id: u64, has_artifacts: bool) -> Self {
        self.jobs.insert(id, JobInfo { has_artifacts });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SourcePlatform for ScriptedPlatform {
    async fn compare(
        &self,
        project: ProjectId,
        from: &CommitSha,
        to: &CommitSha,
    ) -> Result<Vec<RemoteCommit>, PlatformError> {
        self.record(format!("compare {project} {from}..{to}"));
        self.commits.clone().ok_or_else(|| PlatformError::Status {
            status: 404,
            body: "404 Not found".into(),
        })
    }

    async fn commit_diff(&self, project: ProjectId, commit: &CommitSha) -> Result<Vec<FileDiff>, PlatformError> {
        self.record(format!("diff {project} {commit}"));
        if self.failing_diffs.contains(commit.as_str()) {
            return Err(PlatformError::Transport {
                message: "connection reset".into(),
            });
        }
        Ok(self.diffs.get(commit.as_str()).cloned().unwrap_or_default())
    }

    async fn job(&self, project: ProjectId, job: JobId) -> Result<JobInfo, PlatformError> {
        self.record(format!("job {project} {job}"));
        self.jobs.get(&job.as_u64()).copied().ok_or_else(|| PlatformError::Status {
            status: 404,
            body: "404 Job Not Found".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// RecordingDispatcher
// ---------------------------------------------------------------------------

/// Dispatcher that keeps everything it is handed.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    pub published: Mutex<Vec<CanonicalEvent>>,
    pub test_result_requests: Mutex<Vec<(ProjectId, JobId)>>,
    pub fail_publish: bool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_publish: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<CanonicalEvent> {
        self.published.lock().unwrap().clone()
    }

    pub fn test_result_requests(&self) -> Vec<(ProjectId, JobId)> {
        self.test_result_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn publish(&self, event: &CanonicalEvent) -> Result<(), DispatchError> {
        self.published.lock().unwrap().push(event.clone());
        if self.fail_publish {
            return Err(DispatchError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(())
    }

    async fn request_test_results(&self, project: ProjectId, job: JobId) -> Result<(), DispatchError> {
        self.test_result_requests.lock().unwrap().push((project, job));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn sha(c: char) -> CommitSha {
    CommitSha::new(c.to_string().repeat(40)).unwrap()
}

pub fn remote_commit(id: &CommitSha, message: &str) -> RemoteCommit {
    RemoteCommit {
        id: id.clone(),
        committer_name: Some("Alice".into()),
        committer_email: Some("alice@example.com".into()),
        timestamp: Timestamp::from_epoch_millis(1_471_015_408_000),
        message: Some(message.into()),
    }
}

pub fn file(path: &str, is_new: bool, is_deleted: bool) -> FileDiff {
    FileDiff {
        path: path.into(),
        is_new,
        is_deleted,
    }
}
