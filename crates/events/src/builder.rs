//! Assembles canonical events from a classified payload.

use crate::extract::{parse_platform_time, round_duration};
use crate::{
    resolve_causes, BuildResult, CanonicalEvent, LifecycleEventKind, PhaseType, RawEvent, ScmData, Timestamp,
};

/// Builds the events for one payload.
///
/// Always returns the lifecycle event first. When `scm` is present a
/// companion [`LifecycleEventKind::Scm`] event follows, carrying the SCM data
/// and a cause chain resolved as SCM-triggered.
///
/// Results are left `None` where the run has none; the engine applies
/// [`CanonicalEvent::with_default_result`] when publishing.
pub fn build_events(
    event: &RawEvent,
    kind: LifecycleEventKind,
    scm: Option<ScmData>,
    scm_absent: bool,
) -> Vec<CanonicalEvent> {
    let run_id = event.run_id().to_string();
    let display_name = event.display_name().to_string();
    let full_name = event.full_name();
    let started = kind == LifecycleEventKind::Started;

    let mut events = vec![CanonicalEvent {
        project_display_name: display_name.clone(),
        event_type: kind,
        build_ci_id: run_id.clone(),
        number: Some(run_id.clone()),
        project: full_name.clone(),
        result: (!started).then(|| BuildResult::from_status(event.status())),
        start_time: start_time(event),
        estimated_duration: None,
        duration: if started { None } else { duration(event) },
        scm_data: None,
        causes: resolve_causes(event, scm_absent),
        phase_type: Some(phase_type(event)),
    }];

    if let Some(scm) = scm {
        events.push(CanonicalEvent {
            project_display_name: display_name,
            event_type: LifecycleEventKind::Scm,
            build_ci_id: run_id,
            number: None,
            project: full_name,
            result: None,
            start_time: None,
            estimated_duration: None,
            duration: None,
            scm_data: Some(scm),
            causes: resolve_causes(event, false),
            phase_type: None,
        });
    }

    events
}

/// `started_at`, falling back to `created_at`. `None` if neither parses.
fn start_time(event: &RawEvent) -> Option<Timestamp> {
    let (started_at, created_at) = match event {
        RawEvent::Pipeline(p) => (p.started_at.as_deref(), p.created_at.as_deref()),
        RawEvent::Job(j) => (j.started_at.as_deref(), j.created_at.as_deref()),
    };

    started_at
        .and_then(parse_platform_time)
        .or_else(|| created_at.and_then(parse_platform_time))
}

fn duration(event: &RawEvent) -> Option<i64> {
    let raw = match event {
        RawEvent::Pipeline(p) => p.duration,
        RawEvent::Job(j) => j.duration,
    };
    raw.and_then(round_duration)
}

fn phase_type(event: &RawEvent) -> PhaseType {
    if event.is_pipeline() {
        PhaseType::Post
    } else {
        PhaseType::Internal
    }
}
