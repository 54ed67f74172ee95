//! Error types for the Relay normalization domain.
//!
//! None of these ever reach the webhook caller. [`PayloadError`] discards a
//! whole delivery; [`PlatformError`] degrades one enrichment step;
//! [`DispatchError`] is logged after the fact. The engine turns all of them
//! into a [`crate::HandleOutcome`] plus a log line.

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Payload errors
// ---------------------------------------------------------------------------

/// The webhook body could not be turned into a typed [`crate::RawEvent`].
///
/// Only fields without which no event can be built are checked here (the
/// status string and the run id). Everything else degrades to a documented
/// default instead.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The body is not a JSON object.
    #[error("Payload is not a JSON object")]
    NotAnObject,

    /// A field required to classify the payload or identify the run is absent.
    #[error("Required field '{field}' is missing")]
    MissingField {
        /// Dotted path of the missing field (e.g. `"object_attributes.status"`).
        field: &'static str,
    },

    /// The payload is structurally invalid for its discriminant.
    #[error("Malformed {kind} payload: {source}")]
    Malformed {
        /// `"pipeline"` or `"job"`.
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Source platform errors
// ---------------------------------------------------------------------------

/// A call to the source platform failed.
///
/// Produced by [`crate::SourcePlatform`] implementations. Never retried.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The request could not be sent or the connection failed.
    #[error("Source platform request failed: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The request did not complete within the configured bound.
    #[error("Source platform request timed out after {after:?}")]
    Timeout {
        /// The configured per-request timeout.
        after: Duration,
    },

    /// The platform answered with a non-success status.
    #[error("Source platform returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("Could not decode source platform response: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },

    /// The client could not be constructed from its configuration.
    #[error("Invalid source platform configuration: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

/// Handing an event or a test-result request to the downstream service failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request could not be sent or the connection failed.
    #[error("Dispatch request failed: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The downstream service answered with a non-success status.
    #[error("Downstream service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// The dispatcher could not be constructed from its configuration.
    #[error("Invalid dispatcher configuration: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}
