//! Relay webhook ingress.
//!
//! Receives GitLab pipeline and job webhooks over HTTP and hands every body to
//! [`events::EventEngine::handle`].
//!
//! ## Routes
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `POST /events` | Runs the engine on the JSON body, then answers `200 OK` |
//! | `GET /health` | Liveness probe, `200 OK` with `{"status":"ok"}` |
//!
//! `POST /events` answers `200 OK` even when the body is not JSON, exceeds
//! [`MAX_WEBHOOK_BYTES`], or the engine discarded the payload. Processing problems are visible in the logs
//! only; the sender never sees them.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP framing and the server lifecycle live here. The
//! [`events`] crate never sees a request.

mod routes;
mod server;

pub use routes::{router, MAX_WEBHOOK_BYTES};
pub use server::{serve, ListenerError};
