//
//  lighthouse-cli
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for the Lighthouse API
//!
//! This module provides the shared error type used by the transport, the client
//! and every resource service, together with the helpers that turn a raw
//! response into either a success or a descriptive error.
//!
//! # Overview
//!
//! - [`ApiError`] - Unified error type for all API operations
//! - [`Unprocessable`] / [`Unprocessables`] - Field-level validation failures (HTTP 422)
//! - [`check_response`] - Compares a response against the status a caller expects
//! - [`envelope`] - Wrapping and unwrapping the `{"ticket": {...}}` JSON envelopes
//! - Pagination helpers (re-exported from the `pagination` submodule)
//!
//! # Example
//!
//! ```rust
//! use lighthouse_cli::api::common::ApiError;
//!
//! fn handle_result<T>(result: Result<T, ApiError>) {
//!     match result {
//!         Ok(_) => println!("Success!"),
//!         Err(ApiError::Cancelled) => println!("Request cancelled"),
//!         Err(ApiError::Unprocessable(errors)) => println!("Validation failed: {}", errors),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```

use std::fmt;

use bytes::Bytes;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::transport::RawResponse;

pub mod envelope;
mod pagination;

pub use pagination::*;

/// Boxed error produced by an HTTP backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type for all Lighthouse API operations.
///
/// # Variants
///
/// | Variant | Raised by | Description |
/// |---------|-----------|-------------|
/// | `InvalidUrl` | Transport | Target could not be resolved against the base URL |
/// | `InvalidCredential` | Transport | Token or password is not a valid header value |
/// | `Body` | Transport | A streamed request body could not be buffered |
/// | `Transport` | Transport | Connection, DNS, TLS or timeout failure |
/// | `Cancelled` | Transport | Cancellation fired during a rate limit wait or backoff |
/// | `Unprocessable` | Client | HTTP 422 with field-level validation failures |
/// | `UnexpectedResponse` | Client | Any other status that differs from the expected one |
/// | `Decode` | Client | The body could not be decoded as JSON |
/// | `NoSuchResource` | Services | A name could not be resolved to an ID |
///
/// # Notes
///
/// - A rate limit that is still in force after every retry surfaces as
///   `UnexpectedResponse` with status `429 Too Many Requests`
/// - Transport errors are never retried
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request target could not be parsed or joined onto the base URL.
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        /// The target as given by the caller
        url: String,
        /// The parse failure
        #[source]
        source: url::ParseError,
    },

    /// The configured token or password cannot be sent in an HTTP header.
    #[error("invalid credential: {0}")]
    InvalidCredential(#[from] reqwest::header::InvalidHeaderValue),

    /// The request body could not be read into memory.
    #[error("failed to read request body: {0}")]
    Body(#[source] std::io::Error),

    /// A network-level error occurred while dispatching the request.
    #[error("network error: {0}")]
    Transport(#[source] BoxError),

    /// The call was cancelled while waiting for a rate limit token or a backoff sleep.
    #[error("request cancelled")]
    Cancelled,

    /// The server rejected the request body (HTTP 422).
    #[error("{0}")]
    Unprocessable(Unprocessables),

    /// The server answered with a status the caller did not expect.
    #[error("expected {expected} response, received {status}")]
    UnexpectedResponse {
        /// The status the caller expected
        expected: StatusCode,
        /// The status actually received
        status: StatusCode,
        /// The raw response body
        body: Bytes,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A lookup by name found nothing.
    #[error("no such {kind} {name:?}")]
    NoSuchResource {
        /// Resource kind, e.g. `"project"`
        kind: &'static str,
        /// The name that was looked up
        name: String,
    },
}

impl ApiError {
    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::UnexpectedResponse { status, .. } => Some(*status),
            Self::Unprocessable(_) => Some(StatusCode::UNPROCESSABLE_ENTITY),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// A single field-level validation failure.
///
/// Lighthouse encodes each failure as a two element JSON array,
/// `["title", "can't be blank"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Unprocessable {
    /// Name of the offending field
    pub field: String,
    /// Human readable reason
    pub message: String,
}

impl From<(String, String)> for Unprocessable {
    fn from((field, message): (String, String)) -> Self {
        Self { field, message }
    }
}

impl From<Unprocessable> for (String, String) {
    fn from(value: Unprocessable) -> Self {
        (value.field, value.message)
    }
}

impl fmt::Display for Unprocessable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All validation failures returned with one 422 response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Unprocessables(pub Vec<Unprocessable>);

impl fmt::Display for Unprocessables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

/// Checks that a response carries the status the caller expects.
///
/// # Parameters
///
/// * `response` - The raw response returned by the transport
/// * `expected` - The status the calling service expects (usually 200 or 201)
///
/// # Returns
///
/// The response unchanged when the status matches.
///
/// # Errors
///
/// - [`ApiError::Unprocessable`] when the status is 422 and the body decodes as
///   a list of `[field, message]` pairs
/// - [`ApiError::UnexpectedResponse`] for any other mismatch, including a 422
///   whose body is not such a list
pub fn check_response(response: RawResponse, expected: StatusCode) -> Result<RawResponse, ApiError> {
    if response.status == expected {
        return Ok(response);
    }

    if response.status == StatusCode::UNPROCESSABLE_ENTITY {
        if let Ok(errors) = serde_json::from_slice::<Unprocessables>(&response.body) {
            return Err(ApiError::Unprocessable(errors));
        }
    }

    Err(ApiError::UnexpectedResponse {
        expected,
        status: response.status,
        body: response.body,
    })
}
