//! Source-control enrichment for pipeline start events.
//!
//! For a started pipeline the engine asks the platform which commits lie
//! between the previous head (`before_sha`) and the built revision (`sha`),
//! then fetches the file changes of each commit. Failures degrade: a failed
//! compare means "no SCM data", a failed diff means "this commit has no
//! changes listed". Neither aborts the event.

use futures::stream::{self, StreamExt};

use crate::{
    ChangeType, CommitSha, FileDiff, PipelinePayload, PlatformError, ProjectId, RemoteCommit, ScmChange, ScmCommit,
    ScmData, ScmRepository, ScmType, SourcePlatform, Timestamp,
};

/// Default number of commit diffs fetched concurrently.
pub const DEFAULT_DIFF_CONCURRENCY: usize = 4;

/// Returns `true` when a non-started pipeline carries no source-control delta.
///
/// Decided from the payload alone: the previous head is the all-zero sentinel
/// (or missing), so there is nothing to compare against. No remote call.
pub fn scm_absent_from_payload(pipeline: &PipelinePayload) -> bool {
    pipeline.before_sha.as_ref().map_or(true, CommitSha::is_blank)
}

/// Builds [`ScmData`] for a started pipeline.
pub struct ScmEnricher<'a> {
    platform: &'a dyn SourcePlatform,
    diff_concurrency: usize,
}

impl<'a> ScmEnricher<'a> {
    /// Creates an enricher that fetches up to `diff_concurrency` diffs at once.
    pub fn new(platform: &'a dyn SourcePlatform, diff_concurrency: usize) -> Self {
        Self {
            platform,
            diff_concurrency: diff_concurrency.max(1),
        }
    }

    /// Fetches the commits and changes of a started pipeline.
    ///
    /// Returns `None` when the payload lacks the project or revisions needed to
    /// ask, or when the compare call fails.
    #[tracing::instrument(skip(self, pipeline), fields(pipeline_id = %pipeline.id))]
    pub async fn enrich(&self, pipeline: &PipelinePayload) -> Option<ScmData> {
        let (Some(project), Some(sha), Some(before_sha)) =
            (pipeline.project_id, pipeline.sha.as_ref(), pipeline.before_sha.as_ref())
        else {
            tracing::debug!("Pipeline payload lacks project id or revisions; skipping SCM enrichment");
            return None;
        };

        let remote_commits = match self.platform.compare(project, before_sha, sha).await {
            Ok(commits) => commits,
            Err(error) => {
                tracing::debug!(%error, %before_sha, %sha, "Compare failed; no SCM data for this pipeline");
                return None;
            }
        };

        let commits = stream::iter(remote_commits)
            .map(|remote| self.commit_with_changes(project, sha, remote))
            .buffered(self.diff_concurrency)
            .collect::<Vec<_>>()
            .await;

        Some(ScmData {
            repository: ScmRepository {
                scm_type: ScmType::Git,
                url: pipeline.git_http_url.clone().unwrap_or_default(),
                branch: pipeline.ref_name.clone().unwrap_or_default(),
            },
            built_rev_id: sha.clone(),
            commits,
        })
    }

    async fn commit_with_changes(&self, project: ProjectId, built: &CommitSha, remote: RemoteCommit) -> ScmCommit {
        let changes = match self.platform.commit_diff(project, &remote.id).await {
            Ok(diffs) => diffs.into_iter().map(change_from_diff).collect(),
            Err(error) => {
                log_diff_failure(&remote.id, &error);
                Vec::new()
            }
        };

        ScmCommit {
            time: remote.timestamp.unwrap_or_else(Timestamp::now),
            user: remote.committer_name,
            user_email: remote.committer_email,
            rev_id: remote.id,
            parent_rev_id: built.clone(),
            comment: remote.message,
            changes,
        }
    }
}

fn change_from_diff(diff: FileDiff) -> ScmChange {
    ScmChange {
        change_type: ChangeType::from_flags(diff.is_new, diff.is_deleted),
        file: diff.path,
    }
}

fn log_diff_failure(commit: &CommitSha, error: &PlatformError) {
    tracing::debug!(%commit, %error, "Diff fetch failed; commit kept with no changes");
}
