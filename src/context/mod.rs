//
//  lighthouse-cli
//  context/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Session Context Module
//!
//! Turns global options, `LH_*` environment variables and the config file
//! into a ready-to-use [`Session`]: an authenticated [`LighthouseClient`]
//! plus the project the command operates on.
//!
//! ## Overview
//!
//! - [`ContextResolver`]: merges options over the config file and builds the client
//! - [`Session`]: the resolved client, and name-to-ID lookups for projects,
//!   users, milestones, bins and messages
//!
//! Every lookup accepts either a numeric ID, which is used as is, or a name,
//! which is resolved through a list call.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lighthouse_cli::cli::GlobalOptions;
//! use lighthouse_cli::config::Config;
//! use lighthouse_cli::context::ContextResolver;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let options = GlobalOptions::default();
//! let session = ContextResolver::new(Config::load()?).resolve(&options)?;
//! let project_id = session.project_id().await?;
//! println!("Working in project {}", project_id);
//! # Ok(())
//! # }
//! ```

mod resolver;

pub use resolver::*;

use anyhow::{Context, Result};

use crate::api::{Bins, LighthouseClient, Messages, Milestones, Projects};

/// Message shown when a project-scoped command runs without a project.
pub const MISSING_PROJECT: &str =
    "Please specify project ID via -p, --project, LH_PROJECT or config file";

/// A resolved command context.
#[derive(Debug, Clone)]
pub struct Session {
    client: LighthouseClient,
    project: Option<String>,
}

impl Session {
    pub fn new(client: LighthouseClient, project: Option<String>) -> Self {
        Self {
            client,
            project: project.filter(|p| !p.is_empty()),
        }
    }

    pub fn client(&self) -> &LighthouseClient {
        &self.client
    }

    /// The project as given on the command line or in config, unresolved.
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Resolves the session's project to its numeric ID.
    ///
    /// # Errors
    ///
    /// Fails with [`MISSING_PROJECT`] when no project is configured, or when
    /// a project name matches nothing.
    pub async fn project_id(&self) -> Result<u64> {
        let project = self.project.as_deref().context(MISSING_PROJECT)?;
        self.resolve_project(project).await
    }

    /// Resolves a project ID or name.
    pub async fn resolve_project(&self, value: &str) -> Result<u64> {
        if let Ok(id) = value.parse() {
            return Ok(id);
        }
        Ok(Projects::new(&self.client).find_by_name(value).await?.id)
    }

    /// Resolves a user ID, or the name of a member of `project_id`.
    pub async fn resolve_user(&self, project_id: u64, value: &str) -> Result<u64> {
        if let Ok(id) = value.parse() {
            return Ok(id);
        }
        Ok(Projects::new(&self.client).find_member(project_id, value).await?.id)
    }

    /// Resolves a milestone ID or title.
    pub async fn resolve_milestone(&self, project_id: u64, value: &str) -> Result<u64> {
        if let Ok(id) = value.parse() {
            return Ok(id);
        }
        Ok(Milestones::new(&self.client, project_id).find_by_title(value).await?.id)
    }

    /// Resolves a ticket bin ID or name.
    pub async fn resolve_bin(&self, project_id: u64, value: &str) -> Result<u64> {
        if let Ok(id) = value.parse() {
            return Ok(id);
        }
        Ok(Bins::new(&self.client, project_id).find_by_name(value).await?.id)
    }

    /// Resolves a message ID or title.
    pub async fn resolve_message(&self, project_id: u64, value: &str) -> Result<u64> {
        if let Ok(id) = value.parse() {
            return Ok(id);
        }
        Ok(Messages::new(&self.client, project_id).find_by_title(value).await?.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(project: Option<&str>) -> Session {
        let client = LighthouseClient::builder("acme").build().unwrap();
        Session::new(client, project.map(str::to_string))
    }

    #[tokio::test]
    async fn test_missing_project_is_error() {
        let err = session(None).project_id().await.unwrap_err();
        assert_eq!(err.to_string(), MISSING_PROJECT);

        let err = session(Some("")).project_id().await.unwrap_err();
        assert_eq!(err.to_string(), MISSING_PROJECT);
    }

    #[tokio::test]
    async fn test_numeric_ids_skip_lookups() {
        let session = session(Some("42"));
        assert_eq!(session.project_id().await.unwrap(), 42);
        assert_eq!(session.resolve_user(42, "7").await.unwrap(), 7);
        assert_eq!(session.resolve_milestone(42, "3").await.unwrap(), 3);
        assert_eq!(session.resolve_bin(42, "9").await.unwrap(), 9);
        assert_eq!(session.resolve_message(42, "11").await.unwrap(), 11);
    }
}
