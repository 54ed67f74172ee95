//! Core normalization domain for Relay.
//!
//! Turns CI webhook payloads (pipeline-level and job-level) into the
//! vendor-neutral [`CanonicalEvent`] model, attaching cause chains and, for
//! started pipelines, the commits and file changes that went into the run.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! Remote calls go through [`SourcePlatform`] and [`Dispatcher`]; the `gitlab`
//! and `publisher` crates implement them.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ProjectId`, `RunId`, `CommitSha`, etc.) |
//! | [`types`] | Lifecycle, result, and cause vocabularies; `Timestamp` |
//! | [`errors`] | Payload, platform, and dispatch error types |
//! | [`extract`] | Lenient field readers, time and duration parsing, homepage paths |
//! | [`payload`] | Typed parse of the two webhook shapes |
//! | [`classify`] | Status string → lifecycle kind |
//! | [`causes`] | Cause-chain inference |
//! | [`scm`] | Commit/diff enrichment for started pipelines |
//! | [`builder`] | Canonical event assembly |
//! | [`canonical`] | The canonical event model |
//! | [`ports`] | `SourcePlatform` and `Dispatcher` traits |
//! | [`engine`] | `EventEngine`, the per-delivery flow |

pub mod builder;
pub mod canonical;
pub mod causes;
pub mod classify;
pub mod engine;
pub mod errors;
pub mod extract;
pub mod identifiers;
pub mod payload;
pub mod ports;
pub mod scm;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use builder::build_events;
pub use canonical::{CanonicalEvent, EventCause, ScmChange, ScmCommit, ScmData, ScmRepository};
pub use causes::{infer_cause_kind, resolve_causes};
pub use classify::classify;
pub use engine::{DiscardReason, EngineConfig, EventEngine, HandleOutcome};
pub use errors::{DispatchError, PayloadError, PlatformError};
pub use identifiers::{CommitSha, DeliveryId, JobId, ProjectId, RunId, BLANK_SHA};
pub use payload::{JobPayload, PipelinePayload, RawEvent};
pub use ports::{Dispatcher, FileDiff, JobInfo, RemoteCommit, SourcePlatform};
pub use scm::{scm_absent_from_payload, ScmEnricher};
pub use types::{BuildResult, CauseKind, ChangeType, LifecycleEventKind, PhaseType, ScmType, Timestamp};
