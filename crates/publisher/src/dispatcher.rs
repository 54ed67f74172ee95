use std::time::Duration;

use async_trait::async_trait;
use events::{CanonicalEvent, DispatchError, Dispatcher, JobId, ProjectId};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;

/// Per-request bound applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to reach the downstream integration service.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Service root; `/events` and `/test-results` are appended to it.
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl PublisherConfig {
    /// Creates a configuration with the default timeout and no token.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TestResultsRequest {
    project_id: ProjectId,
    job_id: JobId,
}

/// [`Dispatcher`] that POSTs JSON to the downstream integration service.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl HttpDispatcher {
    /// Builds a dispatcher from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] if the base URL is empty or
    /// the HTTP client cannot be built.
    pub fn new(config: PublisherConfig) -> Result<Self, DispatchError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(DispatchError::Configuration {
                message: "downstream base URL is empty".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DispatchError::Configuration {
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url,
            token: config.token.filter(|t| !t.is_empty()),
            client,
        })
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let request = self.client.post(format!("{}/{}", self.base_url, path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(), DispatchError> {
        let response = self
            .post(path)
            .json(body)
            .send()
            .await
            .map_err(|e| DispatchError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    #[tracing::instrument(skip_all, fields(event_type = %event.event_type, build = %event.build_ci_id))]
    async fn publish(&self, event: &CanonicalEvent) -> Result<(), DispatchError> {
        self.send("events", event).await?;
        tracing::debug!("Event accepted downstream");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(%project, %job))]
    async fn request_test_results(&self, project: ProjectId, job: JobId) -> Result<(), DispatchError> {
        self.send(
            "test-results",
            &TestResultsRequest {
                project_id: project,
                job_id: job,
            },
        )
        .await
    }
}
