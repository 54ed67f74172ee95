//! Response shapes of the GitLab REST v4 endpoints the adapter calls, and
//! their conversion into the port types.

use chrono::{DateTime, Utc};
use events::{CommitSha, FileDiff, JobInfo, RemoteCommit, Timestamp};
use serde::Deserialize;

/// `GET /projects/:id/repository/compare`
#[derive(Debug, Deserialize)]
pub(crate) struct CompareResponse {
    #[serde(default)]
    pub commits: Vec<CommitDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitDto {
    pub id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub committer_name: Option<String>,
    #[serde(default)]
    pub committer_email: Option<String>,
    #[serde(default)]
    pub committed_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One element of `GET /projects/:id/repository/commits/:sha/diff`.
#[derive(Debug, Deserialize)]
pub(crate) struct DiffDto {
    pub new_path: String,
    #[serde(default)]
    pub new_file: bool,
    #[serde(default)]
    pub deleted_file: bool,
}

/// `GET /projects/:id/jobs/:job_id`
#[derive(Debug, Deserialize)]
pub(crate) struct JobDto {
    #[serde(default)]
    pub artifacts_file: Option<ArtifactsFileDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtifactsFileDto {
    #[serde(default)]
    pub filename: Option<String>,
}

impl CommitDto {
    /// Converts to a [`RemoteCommit`]; `None` if the commit has no id.
    pub fn into_remote(self) -> Option<RemoteCommit> {
        let id = CommitSha::new(self.id)?;
        let timestamp = self
            .committed_date
            .as_deref()
            .and_then(parse_api_time)
            .or_else(|| self.created_at.as_deref().and_then(parse_api_time));

        Some(RemoteCommit {
            id,
            committer_name: self.committer_name,
            committer_email: self.committer_email,
            timestamp,
            message: self.message,
        })
    }
}

impl From<DiffDto> for FileDiff {
    fn from(dto: DiffDto) -> Self {
        Self {
            path: dto.new_path,
            is_new: dto.new_file,
            is_deleted: dto.deleted_file,
        }
    }
}

impl From<JobDto> for JobInfo {
    fn from(dto: JobDto) -> Self {
        let has_artifacts = dto
            .artifacts_file
            .and_then(|file| file.filename)
            .is_some_and(|name| !name.is_empty());
        Self { has_artifacts }
    }
}

/// The REST API reports times in RFC 3339 (`2012-09-20T09:06:12.000+03:00`).
fn parse_api_time(raw: &str) -> Option<Timestamp> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| Timestamp::from_utc(dt.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn commit_prefers_committed_date() {
        let dto: CommitDto = serde_json::from_value(json!({
            "id": "6104942438c14ec7bd21c6cd5bd995272b3faff6",
            "message": "Sanitize for network graph",
            "committer_name": "randx",
            "committer_email": "user@example.com",
            "committed_date": "2012-09-20T09:06:12+03:00",
            "created_at": "2012-09-20T10:06:12+03:00",
        }))
        .unwrap();

        let commit = dto.into_remote().unwrap();
        assert_eq!(commit.committer_name.as_deref(), Some("randx"));
        assert_eq!(commit.timestamp.unwrap().as_epoch_millis(), 1_348_121_172_000);
    }

    #[test]
    fn commit_without_dates_has_no_timestamp() {
        let dto: CommitDto = serde_json::from_value(json!({ "id": "abc" })).unwrap();
        assert_eq!(dto.into_remote().unwrap().timestamp, None);
    }

    #[test]
    fn commit_without_id_is_dropped() {
        let dto: CommitDto = serde_json::from_value(json!({ "id": "" })).unwrap();
        assert!(dto.into_remote().is_none());
    }

    #[test]
    fn job_has_artifacts_only_with_a_filename() {
        let with: JobDto = serde_json::from_value(json!({
            "artifacts_file": { "filename": "artifacts.zip", "size": 1000 }
        }))
        .unwrap();
        assert!(JobInfo::from(with).has_artifacts);

        let without: JobDto = serde_json::from_value(json!({ "artifacts_file": null })).unwrap();
        assert!(!JobInfo::from(without).has_artifacts);

        let missing: JobDto = serde_json::from_value(json!({ "id": 9 })).unwrap();
        assert!(!JobInfo::from(missing).has_artifacts);
    }
}
