//! Relay entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration** from flags and `RELAY_*` environment variables.
//! 2. **Wire observability**: `tracing-subscriber` with text or JSON output and,
//!    when `RELAY_OTLP_ENDPOINT` is set, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: [`gitlab::GitLabClient`] and
//!    [`publisher::HttpDispatcher`], injected into [`events::EventEngine`].
//! 4. **Serve** the webhook listener until SIGINT or SIGTERM.

mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use events::EventEngine;
use gitlab::GitLabClient;
use publisher::HttpDispatcher;

use crate::config::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _telemetry = telemetry::init(cli.log_format, cli.otlp_endpoint.as_deref())?;

    let platform = GitLabClient::new(cli.gitlab()).context("building the GitLab client")?;
    let dispatcher = HttpDispatcher::new(cli.publisher()).context("building the downstream dispatcher")?;
    tracing::info!(
        gitlab = platform.base_url(),
        downstream = %cli.downstream_url,
        diff_concurrency = cli.diff_concurrency,
        "Starting relay"
    );

    let engine = Arc::new(EventEngine::new(
        Arc::new(platform),
        Arc::new(dispatcher),
        cli.engine(),
    ));

    listener::serve(cli.listen_addr, listener::router(engine))
        .await
        .context("running the webhook listener")?;

    tracing::info!("Shutdown complete");
    Ok(())
}
