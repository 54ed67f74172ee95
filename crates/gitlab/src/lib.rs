//! Relay GitLab infrastructure adapter.
//!
//! Implements the [`events::SourcePlatform`] trait over the GitLab REST v4 API
//! with `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. Transport,
//! authentication headers, timeouts, and response decoding live here; the
//! [`events`] crate sees only [`events::SourcePlatform`].
//!
//! ## Endpoints
//!
//! | Port method | Endpoint |
//! |-------------|----------|
//! | `compare` | `GET /api/v4/projects/:id/repository/compare?from=&to=` |
//! | `commit_diff` | `GET /api/v4/projects/:id/repository/commits/:sha/diff` |
//! | `job` | `GET /api/v4/projects/:id/jobs/:job_id` |

mod client;
mod dto;

pub use client::{GitLabClient, GitLabConfig, DEFAULT_TIMEOUT};
