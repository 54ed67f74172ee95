//! Typed webhook payloads.
//!
//! The platform sends two structurally different documents: pipeline events
//! (`object_kind = "pipeline"`, fields nested under `object_attributes` and
//! `project`) and job/build events (flat `build_*` fields plus `repository`
//! and `commit`). [`RawEvent::parse`] validates the handful of fields without
//! which no event can be built and turns everything else into optional typed
//! fields, so the rest of the crate never performs a dynamic key lookup.

use serde::Deserialize;
use serde_json::Value;

use crate::extract::{lenient, lenient_u64, project_path_from_homepage};
use crate::{CommitSha, PayloadError, ProjectId, RunId};

/// Value of `object_kind` that marks a pipeline-level payload.
pub const PIPELINE_OBJECT_KIND: &str = "pipeline";

// ---------------------------------------------------------------------------
// Typed payloads
// ---------------------------------------------------------------------------

/// An incoming webhook payload, discriminated by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    /// Status transition of a whole pipeline run.
    Pipeline(PipelinePayload),
    /// Status transition of one job within a pipeline.
    Job(JobPayload),
}

/// A pipeline-level payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelinePayload {
    /// `object_attributes.id`.
    pub id: RunId,
    /// `object_attributes.status`.
    pub status: String,
    /// `object_attributes.sha`: the revision being built.
    pub sha: Option<CommitSha>,
    /// `object_attributes.before_sha`: the previous head of the ref.
    pub before_sha: Option<CommitSha>,
    /// `object_attributes.ref`.
    pub ref_name: Option<String>,
    /// `object_attributes.duration` (seconds).
    pub duration: Option<f64>,
    /// `object_attributes.started_at`, unparsed.
    pub started_at: Option<String>,
    /// `object_attributes.created_at`, unparsed.
    pub created_at: Option<String>,
    /// `object_attributes.pipeline_schedule`, kept raw because its type varies.
    pub pipeline_schedule: Option<Value>,
    /// `project.id`.
    pub project_id: Option<ProjectId>,
    /// `project.namespace`.
    pub namespace: Option<String>,
    /// `project.name`.
    pub project_name: Option<String>,
    /// `project.git_http_url`.
    pub git_http_url: Option<String>,
    /// `user.name`.
    pub user_name: Option<String>,
}

/// A job/build-level payload.
#[derive(Debug, Clone, PartialEq)]
pub struct JobPayload {
    /// `build_id`.
    pub id: RunId,
    /// `build_status`.
    pub status: String,
    /// `build_name`.
    pub name: Option<String>,
    /// `build_started_at`, unparsed.
    pub started_at: Option<String>,
    /// `build_created_at`, unparsed.
    pub created_at: Option<String>,
    /// `build_duration` (seconds).
    pub duration: Option<f64>,
    /// `project_id`.
    pub project_id: Option<ProjectId>,
    /// `repository.homepage`.
    pub homepage: Option<String>,
    /// `commit.id` read as an integer. Used as the upstream pipeline reference.
    pub commit_id: Option<u64>,
    /// `ref`.
    pub ref_name: Option<String>,
    /// `user.name`.
    pub user_name: Option<String>,
}

impl RawEvent {
    /// Parses a webhook body into a typed payload.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] if `body` is not an object or if the status or
    /// run id of the detected shape is missing.
    pub fn parse(body: &Value) -> Result<Self, PayloadError> {
        let object = body.as_object().ok_or(PayloadError::NotAnObject)?;
        let is_pipeline = object.get("object_kind").and_then(Value::as_str) == Some(PIPELINE_OBJECT_KIND);

        if is_pipeline {
            let wire: PipelineWire = serde_json::from_value(body.clone())
                .map_err(|source| PayloadError::Malformed { kind: "pipeline", source })?;
            PipelinePayload::from_wire(wire).map(Self::Pipeline)
        } else {
            let wire: JobWire = serde_json::from_value(body.clone())
                .map_err(|source| PayloadError::Malformed { kind: "job", source })?;
            JobPayload::from_wire(wire).map(Self::Job)
        }
    }

    /// Returns `true` for pipeline-level payloads.
    pub fn is_pipeline(&self) -> bool {
        matches!(self, Self::Pipeline(_))
    }

    /// The raw status string of the run.
    pub fn status(&self) -> &str {
        match self {
            Self::Pipeline(p) => &p.status,
            Self::Job(j) => &j.status,
        }
    }

    /// The id of the run this payload describes.
    pub fn run_id(&self) -> RunId {
        match self {
            Self::Pipeline(p) => p.id,
            Self::Job(j) => j.id,
        }
    }

    /// The project the run belongs to, when the payload names one.
    pub fn project_id(&self) -> Option<ProjectId> {
        match self {
            Self::Pipeline(p) => p.project_id,
            Self::Job(j) => j.project_id,
        }
    }

    /// Name of the user who caused the transition, when present.
    pub fn user_name(&self) -> Option<&str> {
        match self {
            Self::Pipeline(p) => p.user_name.as_deref(),
            Self::Job(j) => j.user_name.as_deref(),
        }
    }

    /// Short run name: the ref for pipelines, the job name for jobs.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pipeline(p) => p.ref_name.as_deref().unwrap_or_default(),
            Self::Job(j) => j.name.as_deref().unwrap_or_default(),
        }
    }

    /// `"namespace/project"` of the repository the run belongs to.
    ///
    /// Pipelines name it directly; jobs only carry the repository homepage,
    /// whose URL path is used instead (`""` if it cannot be parsed).
    pub fn project_path(&self) -> String {
        match self {
            Self::Pipeline(p) => format!(
                "{}/{}",
                p.namespace.as_deref().unwrap_or_default(),
                p.project_name.as_deref().unwrap_or_default()
            ),
            Self::Job(j) => j
                .homepage
                .as_deref()
                .map(project_path_from_homepage)
                .unwrap_or_default(),
        }
    }

    /// Full path identifying the run.
    ///
    /// `"pipeline:<project path>/<ref>"` for pipelines,
    /// `"<project path>/<job name>"` for jobs.
    pub fn full_name(&self) -> String {
        let full = format!("{}/{}", self.project_path(), self.display_name());
        if self.is_pipeline() {
            format!("pipeline:{full}")
        } else {
            full
        }
    }

    /// Full path of the pipeline that owns the run.
    pub fn pipeline_full_name(&self) -> String {
        let ref_name = match self {
            Self::Pipeline(p) => p.ref_name.as_deref(),
            Self::Job(j) => j.ref_name.as_deref(),
        };
        format!("pipeline:{}/{}", self.project_path(), ref_name.unwrap_or_default())
    }
}

impl PipelinePayload {
    fn from_wire(wire: PipelineWire) -> Result<Self, PayloadError> {
        let attrs = wire.object_attributes.ok_or(PayloadError::MissingField {
            field: "object_attributes",
        })?;
        let status = attrs.status.ok_or(PayloadError::MissingField {
            field: "object_attributes.status",
        })?;
        let id = attrs.id.ok_or(PayloadError::MissingField {
            field: "object_attributes.id",
        })?;
        let project = wire.project.unwrap_or_default();

        Ok(Self {
            id: RunId::new(id),
            status,
            sha: attrs.sha.and_then(CommitSha::new),
            before_sha: attrs.before_sha.and_then(CommitSha::new),
            ref_name: attrs.ref_name,
            duration: attrs.duration,
            started_at: attrs.started_at,
            created_at: attrs.created_at,
            pipeline_schedule: attrs.pipeline_schedule,
            project_id: project.id.map(ProjectId::new),
            namespace: project.namespace,
            project_name: project.name,
            git_http_url: project.git_http_url,
            user_name: wire.user.and_then(|u| u.name),
        })
    }
}

impl JobPayload {
    fn from_wire(wire: JobWire) -> Result<Self, PayloadError> {
        let status = wire.build_status.ok_or(PayloadError::MissingField {
            field: "build_status",
        })?;
        let id = wire.build_id.ok_or(PayloadError::MissingField { field: "build_id" })?;

        Ok(Self {
            id: RunId::new(id),
            status,
            name: wire.build_name,
            started_at: wire.build_started_at,
            created_at: wire.build_created_at,
            duration: wire.build_duration,
            project_id: wire.project_id.map(ProjectId::new),
            homepage: wire.repository.and_then(|r| r.homepage),
            commit_id: wire.commit.and_then(|c| c.id),
            ref_name: wire.ref_name,
            user_name: wire.user.and_then(|u| u.name),
        })
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PipelineWire {
    #[serde(default, deserialize_with = "lenient")]
    object_attributes: Option<PipelineAttributesWire>,
    #[serde(default, deserialize_with = "lenient")]
    project: Option<ProjectWire>,
    #[serde(default, deserialize_with = "lenient")]
    user: Option<UserWire>,
}

#[derive(Debug, Deserialize)]
struct PipelineAttributesWire {
    #[serde(default, deserialize_with = "lenient_u64")]
    id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    sha: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    before_sha: Option<String>,
    #[serde(rename = "ref", default, deserialize_with = "lenient")]
    ref_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    started_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    created_at: Option<String>,
    #[serde(default)]
    pipeline_schedule: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectWire {
    #[serde(default, deserialize_with = "lenient_u64")]
    id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    namespace: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    git_http_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserWire {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobWire {
    #[serde(default, deserialize_with = "lenient_u64")]
    build_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    build_status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    build_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    build_started_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    build_created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    build_duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    project_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    repository: Option<RepositoryWire>,
    #[serde(default, deserialize_with = "lenient")]
    commit: Option<CommitWire>,
    #[serde(rename = "ref", default, deserialize_with = "lenient")]
    ref_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    user: Option<UserWire>,
}

#[derive(Debug, Deserialize)]
struct RepositoryWire {
    #[serde(default, deserialize_with = "lenient")]
    homepage: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitWire {
    #[serde(default, deserialize_with = "lenient_u64")]
    id: Option<u64>,
}
