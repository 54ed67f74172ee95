//! Ingress routes driven through `tower::ServiceExt::oneshot`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use events::{
    CanonicalEvent, CommitSha, DispatchError, Dispatcher, EngineConfig, EventEngine, FileDiff, JobId, JobInfo,
    LifecycleEventKind, PlatformError, ProjectId, RemoteCommit, SourcePlatform,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Platform that fails every call; enrichment degrades instead of stopping.
struct OfflinePlatform;

#[async_trait]
impl SourcePlatform for OfflinePlatform {
    async fn compare(&self, _: ProjectId, _: &CommitSha, _: &CommitSha) -> Result<Vec<RemoteCommit>, PlatformError> {
        Err(PlatformError::Transport {
            message: "offline".into(),
        })
    }

    async fn commit_diff(&self, _: ProjectId, _: &CommitSha) -> Result<Vec<FileDiff>, PlatformError> {
        Err(PlatformError::Transport {
            message: "offline".into(),
        })
    }

    async fn job(&self, _: ProjectId, _: JobId) -> Result<JobInfo, PlatformError> {
        Err(PlatformError::Transport {
            message: "offline".into(),
        })
    }
}

#[derive(Default)]
struct Collecting {
    events: Mutex<Vec<CanonicalEvent>>,
    fail: bool,
}

#[async_trait]
impl Dispatcher for Collecting {
    async fn publish(&self, event: &CanonicalEvent) -> Result<(), DispatchError> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            return Err(DispatchError::Status {
                status: 500,
                body: "boom".into(),
            });
        }
        Ok(())
    }

    async fn request_test_results(&self, _: ProjectId, _: JobId) -> Result<(), DispatchError> {
        Ok(())
    }
}

fn app(dispatcher: Arc<Collecting>) -> axum::Router {
    let engine = EventEngine::new(Arc::new(OfflinePlatform), dispatcher, EngineConfig::default());
    listener::router(Arc::new(engine))
}

fn post_events(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/events")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn finished_pipeline() -> Value {
    json!({
        "object_kind": "pipeline",
        "object_attributes": {
            "status": "success",
            "id": 42,
            "sha": "abc",
            "before_sha": "0000000000000000000000000000000000000000",
            "ref": "main",
            "duration": 120,
        },
        "project": { "id": 7, "namespace": "ns", "name": "proj", "git_http_url": "https://x/ns/proj.git" },
    })
}

#[tokio::test]
async fn webhook_is_processed_and_acknowledged() {
    let dispatcher = Arc::new(Collecting::default());
    let response = app(dispatcher.clone())
        .oneshot(post_events(finished_pipeline().to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let published = dispatcher.events.lock().unwrap().clone();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].event_type, LifecycleEventKind::Finished);
    assert_eq!(published[0].project, "pipeline:ns/proj/main");
}

#[tokio::test]
async fn invalid_json_is_acknowledged() {
    let dispatcher = Arc::new(Collecting::default());
    let response = app(dispatcher.clone()).oneshot(post_events("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(dispatcher.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn discarded_payload_is_acknowledged() {
    let dispatcher = Arc::new(Collecting::default());
    let body = json!({ "object_kind": "build", "build_status": "pending", "build_id": 9 });
    let response = app(dispatcher.clone()).oneshot(post_events(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(dispatcher.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn downstream_failure_is_acknowledged() {
    let dispatcher = Arc::new(Collecting {
        fail: true,
        ..Collecting::default()
    });
    let response = app(dispatcher.clone())
        .oneshot(post_events(finished_pipeline().to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(dispatcher.events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn started_pipeline_survives_an_offline_platform() {
    let dispatcher = Arc::new(Collecting::default());
    let mut body = finished_pipeline();
    body["object_attributes"]["status"] = json!("pending");
    body["object_attributes"]["before_sha"] = json!("1111111111111111111111111111111111111111");
    body["user"] = json!({ "name": "alice" });

    let response = app(dispatcher.clone()).oneshot(post_events(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let published = dispatcher.events.lock().unwrap().clone();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].event_type, LifecycleEventKind::Started);
    assert!(published[0].scm_data.is_none());
}

#[tokio::test]
async fn multi_megabyte_delivery_is_processed() {
    let dispatcher = Arc::new(Collecting::default());
    let mut body = finished_pipeline();
    body["padding"] = json!("x".repeat(3 * 1024 * 1024));

    let response = app(dispatcher.clone()).oneshot(post_events(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(dispatcher.events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn oversized_delivery_is_acknowledged_without_processing() {
    let dispatcher = Arc::new(Collecting::default());
    let body = vec![b' '; listener::MAX_WEBHOOK_BYTES + 1];

    let response = app(dispatcher.clone()).oneshot(post_events(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(dispatcher.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app(Arc::new(Collecting::default())).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let response = app(Arc::new(Collecting::default())).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
