//
//  lighthouse-cli
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Lighthouse CLI Library
//!
//! A client library and command-line interface for the
//! [Lighthouse](https://lighthouseapp.com) issue tracker.
//!
//! ## Overview
//!
//! This library provides typed access to the Lighthouse REST API and the core
//! functionality of the `lh` CLI tool: projects, tickets, milestones, ticket
//! bins, messages, changesets, users and tokens.
//!
//! ## Features
//!
//! - **Typed Resources**: One service per API resource, with JSON envelopes handled for you
//! - **Flexible Authentication**: Token header, token as Basic Auth or query parameter, or email/password
//! - **Polite by Default**: Client-side rate limiting and `429 Too Many Requests` retries
//! - **Cancellable**: Every wait observes a cancellation token
//! - **Scriptable**: Table output for people, JSON output for automation
//!
//! ## Module Structure
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`api`]: Transport, client and resource services
//! - [`auth`]: Credentials and how they are attached to requests
//! - [`config`]: Configuration file management
//! - [`context`]: Resolves options into an authenticated session
//! - [`output`]: Output formatting (Table, JSON)
//! - [`interactive`]: Confirmation prompts
//! - [`util`]: Utility functions
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use lighthouse_cli::api::{LighthouseClient, TicketListOptions, Tickets};
//! use lighthouse_cli::auth::{Credential, TokenMode};
//!
//! # async fn example() -> Result<(), lighthouse_cli::api::ApiError> {
//! let client = LighthouseClient::builder("acme")
//!     .credential(Credential::from_parts(Some("abc123"), TokenMode::Header, None, None))
//!     .build()?;
//!
//! let open = Tickets::new(&client, 42)
//!     .list_all(&TicketListOptions {
//!         query: Some("state:open".into()),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{} open tickets", open.len());
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
///
/// Contains all CLI commands, arguments, and subcommands defined using the clap derive API.
pub mod cli;

/// Lighthouse API client.
///
/// The transport handles authentication, rate limiting, retries and
/// redirects; the resource services handle paths and JSON envelopes.
pub mod api;

/// Authentication credentials.
pub mod auth;

/// Configuration file management.
///
/// Manages the CLI's configuration stored in platform-specific locations:
/// - Linux: `~/.config/lh/config.toml`
/// - macOS: `~/Library/Application Support/lh/config.toml`
/// - Windows: `%APPDATA%\lh\config.toml`
pub mod config;

/// Session resolution from flags, environment and config file.
pub mod context;

/// Output formatting.
///
/// - Table format: Human-readable output for interactive use
/// - JSON format: Structured output for scripting and automation
pub mod output;

/// Interactive terminal prompts.
pub mod interactive;

/// Utility functions and helpers.
pub mod util;

pub use cli::Cli;

pub use config::Config;

pub use context::Session;

/// The name of the CLI binary.
pub const APP_NAME: &str = "lh";

/// Crate version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process exit codes.
///
/// | Code | Meaning |
/// |------|---------|
/// | 0 | Success |
/// | 1 | General error |
/// | 2 | Usage error |
/// | 4 | Authentication failed (401/403) |
/// | 8 | Not found (404 or unknown name) |
/// | 16 | Cancelled |
/// | 32 | Still rate limited after every retry |
pub mod exit_codes {
    use reqwest::StatusCode;

    use crate::api::ApiError;

    pub const SUCCESS: i32 = 0;

    pub const ERROR: i32 = 1;

    pub const USAGE: i32 = 2;

    pub const AUTH_ERROR: i32 = 4;

    pub const NOT_FOUND: i32 = 8;

    pub const CANCELLED: i32 = 16;

    pub const RATE_LIMIT: i32 = 32;

    /// Exit code for a command line that failed to parse.
    ///
    /// `--help` and `--version` also arrive as parse errors but are not failures.
    pub fn for_parse_error(err: &clap::Error) -> i32 {
        if err.use_stderr() {
            USAGE
        } else {
            SUCCESS
        }
    }

    /// Picks the exit code for an error, looking for an [`ApiError`]
    /// anywhere in its chain.
    pub fn for_error(err: &anyhow::Error) -> i32 {
        let Some(api) = err.chain().find_map(|e| e.downcast_ref::<ApiError>()) else {
            return ERROR;
        };
        match api {
            ApiError::Cancelled => CANCELLED,
            ApiError::NoSuchResource { .. } => NOT_FOUND,
            ApiError::InvalidCredential(_) => AUTH_ERROR,
            _ => match api.status() {
                Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => AUTH_ERROR,
                Some(StatusCode::NOT_FOUND) => NOT_FOUND,
                Some(StatusCode::TOO_MANY_REQUESTS) => RATE_LIMIT,
                _ => ERROR,
            },
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use anyhow::Context;

        fn unexpected(status: StatusCode) -> anyhow::Error {
            anyhow::Error::new(ApiError::UnexpectedResponse {
                expected: StatusCode::OK,
                status,
                body: Default::default(),
            })
        }

        #[test]
        fn test_status_codes_map_to_exit_codes() {
            assert_eq!(for_error(&unexpected(StatusCode::UNAUTHORIZED)), AUTH_ERROR);
            assert_eq!(for_error(&unexpected(StatusCode::FORBIDDEN)), AUTH_ERROR);
            assert_eq!(for_error(&unexpected(StatusCode::NOT_FOUND)), NOT_FOUND);
            assert_eq!(for_error(&unexpected(StatusCode::TOO_MANY_REQUESTS)), RATE_LIMIT);
            assert_eq!(for_error(&unexpected(StatusCode::INTERNAL_SERVER_ERROR)), ERROR);
        }

        #[test]
        fn test_api_error_found_through_context() {
            let err: anyhow::Result<()> = Err(ApiError::Cancelled).context("Failed to list tickets");
            assert_eq!(for_error(&err.unwrap_err()), CANCELLED);

            let err: anyhow::Result<()> = Err(ApiError::NoSuchResource {
                kind: "project",
                name: "Widgets".into(),
            })
            .context("lookup");
            assert_eq!(for_error(&err.unwrap_err()), NOT_FOUND);
        }

        #[test]
        fn test_parse_errors_are_usage_errors() {
            use clap::Parser;

            let err = crate::Cli::try_parse_from(["lh", "frobnicate"]).unwrap_err();
            assert_eq!(for_parse_error(&err), USAGE);

            let err = crate::Cli::try_parse_from(["lh", "ticket", "bulk-edit", "--all"]).unwrap_err();
            assert_eq!(for_parse_error(&err), USAGE);

            let help = crate::Cli::try_parse_from(["lh", "--help"]).unwrap_err();
            assert_eq!(for_parse_error(&help), SUCCESS);
        }

        #[test]
        fn test_other_errors_are_general() {
            assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
        }
    }
}
