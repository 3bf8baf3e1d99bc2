//
//  lighthouse-cli
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! This module provides the HTTP stack for the Lighthouse REST API at
//! `https://<account>.lighthouseapp.com`.
//!
//! ## Architecture
//!
//! The API layer is organized as follows:
//!
//! - [`transport`]: Authentication, rate limiting, 429 retries and redirects
//! - [`rate_limit`]: Shared token bucket used by the transport
//! - [`client`]: Status checking and JSON envelopes on top of the transport
//! - [`resources`]: Typed services for projects, tickets, milestones and so on
//! - [`common`]: Shared types (errors, envelopes, pagination)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lighthouse_cli::api::{LighthouseClient, Projects, RateLimitConfig, RetryPolicy};
//! use lighthouse_cli::auth::{Credential, TokenMode};
//!
//! # async fn example() -> Result<(), lighthouse_cli::api::ApiError> {
//! let client = LighthouseClient::builder("acme")
//!     .credential(Credential::from_parts(Some("abc123"), TokenMode::Header, None, None))
//!     .rate_limit(RateLimitConfig::default())
//!     .retry(RetryPolicy::default())
//!     .build()?;
//!
//! for project in Projects::new(&client).list().await? {
//!     println!("{} {}", project.id, project.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every call returns [`ApiError`]. HTTP failures keep their status:
//!
//! - `UnexpectedResponse`: any status other than the expected one, including
//!   a `429` left over after every retry
//! - `Unprocessable`: `422` with field-level validation messages
//! - `Cancelled`: the client's cancellation token fired during a wait

pub mod client;
pub mod common;
pub mod rate_limit;
pub mod resources;
pub mod transport;

pub use client::{LighthouseClient, LighthouseClientBuilder};
pub use common::{ApiError, Unprocessable, Unprocessables};
pub use rate_limit::RateLimitConfig;
pub use resources::*;
pub use transport::{HttpBackend, PreparedRequest, RawResponse, Request, RetryPolicy, Transport};
