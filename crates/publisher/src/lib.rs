//! Relay downstream dispatcher adapter.
//!
//! Implements the [`events::Dispatcher`] trait over the HTTP API of the
//! integration service that forwards canonical events to the CI-tracking
//! server.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport, authentication, and serialisation live
//! here. The [`events`] crate sees only [`events::Dispatcher`].
//!
//! ## Wire protocol
//!
//! | Port method | Request | Body |
//! |-------------|---------|------|
//! | `publish` | `POST {base}/events` | the canonical event, camelCase JSON |
//! | `request_test_results` | `POST {base}/test-results` | `{"projectId": .., "jobId": ..}` |
//!
//! When a token is configured every request carries
//! `Authorization: Bearer <token>`. Any 2xx status counts as accepted.

mod dispatcher;

pub use dispatcher::{HttpDispatcher, PublisherConfig, DEFAULT_TIMEOUT};
