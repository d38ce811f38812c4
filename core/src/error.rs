//! Error types for the todo API client and query layer.
//!
//! # Design
//! `ApiError` describes what went wrong with a single request/response pair.
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `HttpError` with the raw
//! status code and body for debugging.
//!
//! `QueryError` is what the query service hands to the presentation layer:
//! only two kinds exist, one for reads and one for writes. Both are
//! recoverable. Every error is `Clone` so one in-flight result can be
//! shared by all callers that joined it.

use thiserror::Error;

/// Errors produced while building, executing or parsing a request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server returned 404, the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request payload was rejected before being sent.
    #[error("invalid request: {0}")]
    Validation(String),
}

/// Errors surfaced by `TodoService`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unable to load: {0}")]
    Network(#[source] ApiError),

    #[error("failed to create: {0}")]
    Creation(#[source] ApiError),
}

impl QueryError {
    /// The underlying request-level error.
    pub fn api_error(&self) -> &ApiError {
        match self {
            QueryError::Network(e) | QueryError::Creation(e) => e,
        }
    }
}
