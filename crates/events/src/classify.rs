//! Maps payload status strings to lifecycle event kinds.

use crate::{LifecycleEventKind, RawEvent};

const QUEUED_STATUSES: &[&str] = &["process", "enqueue", "pending", "created"];
const FINISHED_STATUSES: &[&str] = &["success", "failed", "canceled", "skipped"];
const STARTED_STATUSES: &[&str] = &["running", "manual"];

/// Classifies a payload into a [`LifecycleEventKind`].
///
/// Pipeline payloads are checked first for two early exits: `pending` means
/// the pipeline has started (its jobs are what queue), and `running` carries
/// nothing new and is suppressed. After that both shapes share one table.
pub fn classify(event: &RawEvent) -> LifecycleEventKind {
    let status = event.status();

    if event.is_pipeline() {
        match status {
            "pending" => return LifecycleEventKind::Started,
            "running" => return LifecycleEventKind::Undefined,
            _ => {}
        }
    }

    if QUEUED_STATUSES.contains(&status) {
        LifecycleEventKind::Queued
    } else if FINISHED_STATUSES.contains(&status) {
        LifecycleEventKind::Finished
    } else if STARTED_STATUSES.contains(&status) {
        LifecycleEventKind::Started
    } else {
        LifecycleEventKind::Undefined
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn pipeline(status: &str) -> RawEvent {
        RawEvent::parse(&json!({
            "object_kind": "pipeline",
            "object_attributes": { "status": status, "id": 1 },
        }))
        .unwrap()
    }

    fn job(status: &str) -> RawEvent {
        RawEvent::parse(&json!({ "object_kind": "build", "build_status": status, "build_id": 1 })).unwrap()
    }

    #[test]
    fn pipeline_pending_is_started() {
        assert_eq!(classify(&pipeline("pending")), LifecycleEventKind::Started);
    }

    #[test]
    fn pipeline_running_is_suppressed() {
        assert_eq!(classify(&pipeline("running")), LifecycleEventKind::Undefined);
    }

    #[test]
    fn job_pending_and_running_follow_the_shared_table() {
        assert_eq!(classify(&job("pending")), LifecycleEventKind::Queued);
        assert_eq!(classify(&job("running")), LifecycleEventKind::Started);
        assert_eq!(classify(&job("manual")), LifecycleEventKind::Started);
    }

    #[test]
    fn terminal_statuses_are_finished_for_both_shapes() {
        for status in ["success", "failed", "canceled", "skipped"] {
            assert_eq!(classify(&pipeline(status)), LifecycleEventKind::Finished, "{status}");
            assert_eq!(classify(&job(status)), LifecycleEventKind::Finished, "{status}");
        }
    }

    #[test]
    fn queued_statuses() {
        for status in ["process", "enqueue", "created"] {
            assert_eq!(classify(&pipeline(status)), LifecycleEventKind::Queued, "{status}");
            assert_eq!(classify(&job(status)), LifecycleEventKind::Queued, "{status}");
        }
    }

    #[test]
    fn unknown_status_is_undefined() {
        assert_eq!(classify(&job("drop")), LifecycleEventKind::Undefined);
        assert_eq!(classify(&pipeline("")), LifecycleEventKind::Undefined);
    }
}
