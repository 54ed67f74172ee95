//! The per-delivery normalization flow.
//!
//! payload → [`classify`] → (started pipeline) [`ScmEnricher`] →
//! [`build_events`] → [`Dispatcher::publish`] → (finished job) test-result
//! collection.
//!
//! [`EventEngine::handle`] never fails. Whatever goes wrong is logged and
//! summarised in the returned [`HandleOutcome`]; the transport acknowledges the
//! delivery regardless.

use std::sync::Arc;

use serde_json::Value;

use crate::scm::{scm_absent_from_payload, DEFAULT_DIFF_CONCURRENCY};
use crate::{
    build_events, classify, CanonicalEvent, DeliveryId, Dispatcher, JobId, LifecycleEventKind, RawEvent, ScmData,
    ScmEnricher, SourcePlatform,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of commit diffs fetched at the same time.
    pub diff_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            diff_concurrency: DEFAULT_DIFF_CONCURRENCY,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why a delivery produced no events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// The body could not be parsed into a typed payload.
    Malformed {
        /// Rendered [`crate::PayloadError`].
        message: String,
    },
    /// The payload classified as queued or undefined.
    NotProcessable {
        kind: LifecycleEventKind,
    },
}

impl std::fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { message } => write!(f, "malformed payload: {message}"),
            Self::NotProcessable { kind } => write!(f, "{kind} events are not published"),
        }
    }
}

/// Summary of what handling one delivery did.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleOutcome {
    /// Nothing was published and no side effect was triggered.
    Discarded { reason: DiscardReason },
    /// Events were built and handed to the dispatcher.
    Processed {
        /// The events as handed to the dispatcher, in order. Includes events
        /// whose publication failed.
        events: Vec<CanonicalEvent>,
        /// Whether test-result collection was requested for a finished job.
        test_results_requested: bool,
    },
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Normalizes webhook deliveries and hands the results to a [`Dispatcher`].
///
/// Holds no per-delivery state, so one instance can be shared behind an
/// [`Arc`] by concurrently handled requests.
pub struct EventEngine {
    platform: Arc<dyn SourcePlatform>,
    dispatcher: Arc<dyn Dispatcher>,
    config: EngineConfig,
}

impl EventEngine {
    /// Creates an engine over the given ports.
    pub fn new(platform: Arc<dyn SourcePlatform>, dispatcher: Arc<dyn Dispatcher>, config: EngineConfig) -> Self {
        Self {
            platform,
            dispatcher,
            config,
        }
    }

    /// Handles one raw webhook body.
    #[tracing::instrument(name = "handle_delivery", skip_all, fields(delivery_id = %DeliveryId::new_random()))]
    pub async fn handle(&self, body: &Value) -> HandleOutcome {
        match RawEvent::parse(body) {
            Ok(event) => self.handle_event(&event).await,
            Err(error) => {
                tracing::debug!(%error, "Discarding webhook payload");
                HandleOutcome::Discarded {
                    reason: DiscardReason::Malformed {
                        message: error.to_string(),
                    },
                }
            }
        }
    }

    /// Handles an already parsed payload.
    #[tracing::instrument(skip_all, fields(run_id = %event.run_id(), pipeline = event.is_pipeline(), kind = tracing::field::Empty))]
    pub async fn handle_event(&self, event: &RawEvent) -> HandleOutcome {
        let kind = classify(event);
        tracing::Span::current().record("kind", tracing::field::display(kind));

        if !kind.is_processable() {
            tracing::trace!(status = event.status(), "Payload not published");
            return HandleOutcome::Discarded {
                reason: DiscardReason::NotProcessable { kind },
            };
        }

        let (scm, scm_absent) = self.source_control(event, kind).await;
        let built = build_events(event, kind, scm, scm_absent);

        let mut events = Vec::with_capacity(built.len());
        for canonical in built {
            let canonical = canonical.with_default_result();
            if let Err(error) = self.dispatcher.publish(&canonical).await {
                tracing::warn!(%error, event_type = %canonical.event_type, "Failed to publish event");
            }
            events.push(canonical);
        }

        let test_results_requested = kind == LifecycleEventKind::Finished && self.collect_test_results(event).await;

        HandleOutcome::Processed {
            events,
            test_results_requested,
        }
    }

    /// SCM data for the payload, and whether SCM is to be treated as absent.
    ///
    /// Only started pipelines are enriched. Other pipelines decide absence from
    /// `before_sha`; job payloads never carry SCM data.
    async fn source_control(&self, event: &RawEvent, kind: LifecycleEventKind) -> (Option<ScmData>, bool) {
        match event {
            RawEvent::Pipeline(pipeline) if kind == LifecycleEventKind::Started => {
                let scm = ScmEnricher::new(self.platform.as_ref(), self.config.diff_concurrency)
                    .enrich(pipeline)
                    .await;
                let absent = scm.is_none();
                (scm, absent)
            }
            RawEvent::Pipeline(pipeline) => (None, scm_absent_from_payload(pipeline)),
            RawEvent::Job(_) => (None, true),
        }
    }

    /// Requests test-result collection for a finished job that has artifacts.
    ///
    /// Returns `true` if the request was accepted by the dispatcher.
    async fn collect_test_results(&self, event: &RawEvent) -> bool {
        let RawEvent::Job(job) = event else {
            return false;
        };
        let Some(project) = job.project_id else {
            tracing::debug!("Finished job payload has no project id; skipping test results");
            return false;
        };
        let job_id = JobId::from(job.id);

        match self.platform.job(project, job_id).await {
            Ok(info) if info.has_artifacts => {}
            Ok(_) => return false,
            Err(error) => {
                tracing::debug!(%error, %project, %job_id, "Job lookup failed; skipping test results");
                return false;
            }
        }

        match self.dispatcher.request_test_results(project, job_id).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%error, %project, %job_id, "Failed to request test results");
                false
            }
        }
    }
}
