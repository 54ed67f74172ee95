//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use events::EngineConfig;
use gitlab::GitLabConfig;
use publisher::PublisherConfig;

/// Log line encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "relay", version, about = "Normalizes GitLab CI webhooks into canonical CI events")]
pub struct Cli {
    /// Address the webhook listener binds to
    #[arg(long, env = "RELAY_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: SocketAddr,

    /// GitLab instance root, without /api/v4
    #[arg(long, env = "RELAY_GITLAB_URL")]
    pub gitlab_url: String,

    /// GitLab access token sent as PRIVATE-TOKEN
    #[arg(long, env = "RELAY_GITLAB_TOKEN", hide_env_values = true)]
    pub gitlab_token: Option<String>,

    /// Root URL of the downstream integration service
    #[arg(long, env = "RELAY_DOWNSTREAM_URL")]
    pub downstream_url: String,

    /// Bearer token for the downstream integration service
    #[arg(long, env = "RELAY_DOWNSTREAM_TOKEN", hide_env_values = true)]
    pub downstream_token: Option<String>,

    /// Per-request timeout for outbound HTTP calls, in seconds
    #[arg(long, env = "RELAY_HTTP_TIMEOUT_SECS", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub http_timeout_secs: u64,

    /// Maximum number of commit diffs fetched at once
    #[arg(long, env = "RELAY_DIFF_CONCURRENCY", default_value_t = 4, value_parser = clap::value_parser!(u64).range(1..=64))]
    pub diff_concurrency: u64,

    #[arg(long, env = "RELAY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint; spans are exported only when set
    #[arg(long, env = "RELAY_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Cli {
    fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn gitlab(&self) -> GitLabConfig {
        GitLabConfig {
            base_url: self.gitlab_url.clone(),
            token: self.gitlab_token.clone(),
            timeout: self.http_timeout(),
        }
    }

    pub fn publisher(&self) -> PublisherConfig {
        PublisherConfig {
            base_url: self.downstream_url.clone(),
            token: self.downstream_token.clone(),
            timeout: self.http_timeout(),
        }
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            diff_concurrency: usize::try_from(self.diff_concurrency).unwrap_or(usize::MAX),
        }
    }
}
