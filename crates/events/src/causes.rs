//! Infers what triggered a run and builds its cause chain.

use serde_json::Value;

use crate::{CauseKind, EventCause, RawEvent};

/// Builds the cause chain of a payload.
///
/// `scm_absent` tells whether the run has no source-control delta attached.
/// Pipeline payloads get a single root cause; job payloads get an
/// [`CauseKind::Upstream`] cause naming their pipeline, wrapping the root.
pub fn resolve_causes(event: &RawEvent, scm_absent: bool) -> Vec<EventCause> {
    let kind = infer_cause_kind(event, scm_absent);
    let user = match kind {
        CauseKind::User => event.user_name().map(str::to_owned),
        _ => None,
    };
    let root = EventCause::root(kind, user);

    match event {
        RawEvent::Pipeline(_) => vec![root],
        // The upstream id is the payload's `commit.id`. For job events the
        // platform puts the owning pipeline's id there.
        RawEvent::Job(job) => vec![EventCause::upstream(
            event.pipeline_full_name(),
            job.commit_id.map(|id| id.to_string()),
            root,
        )],
    }
}

/// Decides the root cause kind.
///
/// With SCM data present the run is SCM-triggered. Otherwise a pipeline whose
/// `pipeline_schedule` flag is set was started by a timer, and everything else
/// (including every job payload) is attributed to a user.
pub fn infer_cause_kind(event: &RawEvent, scm_absent: bool) -> CauseKind {
    if !scm_absent {
        return CauseKind::Scm;
    }

    match event {
        RawEvent::Pipeline(p) if is_schedule_flag(p.pipeline_schedule.as_ref()) => CauseKind::Timer,
        _ => CauseKind::User,
    }
}

fn is_schedule_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s == "true",
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            tracing::debug!(value = %other, "Unrecognised pipeline_schedule value; attributing run to user");
            false
        }
        None => false,
    }
}
