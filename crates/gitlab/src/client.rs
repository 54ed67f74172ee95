use std::time::Duration;

use async_trait::async_trait;
use events::{CommitSha, FileDiff, JobId, JobInfo, PlatformError, ProjectId, RemoteCommit, SourcePlatform};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::dto::{CompareResponse, DiffDto, JobDto};

/// Per-request bound applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Connection settings for a GitLab instance.
#[derive(Debug, Clone)]
pub struct GitLabConfig {
    /// Instance root (e.g. `"https://gitlab.example.com"`), without `/api/v4`.
    pub base_url: String,
    /// Personal or project access token sent as `PRIVATE-TOKEN`.
    pub token: Option<String>,
    /// Upper bound for each request, connection included.
    pub timeout: Duration,
}

impl GitLabConfig {
    /// Creates a configuration with the default timeout and no token.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// [`SourcePlatform`] backed by the GitLab REST API.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl GitLabClient {
    /// Builds a client from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Configuration`] if the token is not a valid
    /// header value or the HTTP client cannot be built.
    pub fn new(config: GitLabConfig) -> Result<Self, PlatformError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(token).map_err(|e| PlatformError::Configuration {
                message: format!("access token is not a valid header value: {e}"),
            })?;
            value.set_sensitive(true);
            headers.insert(TOKEN_HEADER, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| PlatformError::Configuration {
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout: config.timeout,
        })
    }

    /// Instance root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn project_url(&self, project: ProjectId, path: &str) -> String {
        format!("{}/api/v4/projects/{}/{}", self.base_url, project, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, PlatformError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PlatformError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.request_error(e)
            } else {
                PlatformError::Decode {
                    message: e.to_string(),
                }
            }
        })
    }

    fn request_error(&self, error: reqwest::Error) -> PlatformError {
        if error.is_timeout() {
            PlatformError::Timeout { after: self.timeout }
        } else {
            PlatformError::Transport {
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl SourcePlatform for GitLabClient {
    #[tracing::instrument(skip_all, fields(%project, %from, %to))]
    async fn compare(
        &self,
        project: ProjectId,
        from: &CommitSha,
        to: &CommitSha,
    ) -> Result<Vec<RemoteCommit>, PlatformError> {
        let url = self.project_url(project, "repository/compare");
        let response: CompareResponse = self
            .get_json(&url, &[("from", from.as_str()), ("to", to.as_str())])
            .await?;

        let commits: Vec<RemoteCommit> = response
            .commits
            .into_iter()
            .filter_map(|dto| {
                let remote = dto.into_remote();
                if remote.is_none() {
                    tracing::debug!("Compare returned a commit without an id; skipping it");
                }
                remote
            })
            .collect();
        tracing::debug!(count = commits.len(), "Compared revisions");
        Ok(commits)
    }

    #[tracing::instrument(skip_all, fields(%project, %commit))]
    async fn commit_diff(&self, project: ProjectId, commit: &CommitSha) -> Result<Vec<FileDiff>, PlatformError> {
        let url = self.project_url(project, &format!("repository/commits/{commit}/diff"));
        let diffs: Vec<DiffDto> = self.get_json(&url, &[]).await?;
        Ok(diffs.into_iter().map(FileDiff::from).collect())
    }

    #[tracing::instrument(skip_all, fields(%project, %job))]
    async fn job(&self, project: ProjectId, job: JobId) -> Result<JobInfo, PlatformError> {
        let url = self.project_url(project, &format!("jobs/{job}"));
        let dto: JobDto = self.get_json(&url, &[]).await?;
        Ok(JobInfo::from(dto))
    }
}
