//
//  lighthouse-cli
//  api/resources/users.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Users, account memberships and the authenticated user's profile.
//!
//! Lighthouse has no user search endpoint. [`Users::get_by_name`] walks the
//! memberships of every visible project instead.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use super::projects::{Membership, Projects};
use crate::api::client::LighthouseClient;
use crate::api::common::envelope::null_as_default;
use crate::api::common::ApiError;

const KEY: &str = "user";

/// A ticket the user is responsible for.
///
/// Encoded as `[number, title, url, updated_at_unix_seconds]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTicket {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub updated_at: DateTime<Utc>,
}

impl Serialize for ActiveTicket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.number, &self.title, &self.url, self.updated_at.timestamp()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ActiveTicket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (number, title, url, seconds) = <(u64, String, String, i64)>::deserialize(deserializer)?;
        let updated_at = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| D::Error::custom(format!("timestamp {seconds} out of range")))?;
        Ok(Self {
            number,
            title,
            url,
            updated_at,
        })
    }
}

/// A Lighthouse user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub job: Option<String>,
    pub website: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub active_tickets: Vec<ActiveTicket>,
}

/// Fields a user may change on their own record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserInput {
    pub name: String,
    pub job: String,
    pub website: String,
}

impl From<&User> for UserInput {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            job: user.job.clone().unwrap_or_default(),
            website: user.website.clone().unwrap_or_default(),
        }
    }
}

/// User operations for one account.
#[derive(Debug, Clone, Copy)]
pub struct Users<'a> {
    client: &'a LighthouseClient,
}

impl<'a> Users<'a> {
    pub fn new(client: &'a LighthouseClient) -> Self {
        Self { client }
    }

    pub async fn get_by_id(&self, id: u64) -> Result<User, ApiError> {
        self.client.get_json(&format!("/users/{id}.json"), KEY).await
    }

    /// Finds a user by full name or first name, ignoring case.
    ///
    /// # Errors
    ///
    /// [`ApiError::NoSuchResource`] when no member of any visible project matches.
    pub async fn get_by_name(&self, name: &str) -> Result<User, ApiError> {
        let projects = Projects::new(self.client);
        let wanted = name.to_lowercase();
        let mut seen = HashSet::new();

        for project in projects.list().await? {
            for membership in projects.memberships(project.id).await? {
                let Some(user) = membership.user else {
                    continue;
                };
                if !seen.insert(user.id) {
                    continue;
                }
                if name_matches(&user.name, &wanted) {
                    debug!("resolved user {:?} to id {} via project {}", name, user.id, project.id);
                    return self.get_by_id(user.id).await;
                }
            }
        }

        Err(ApiError::NoSuchResource {
            kind: "user",
            name: name.to_string(),
        })
    }

    /// Looks a user up by numeric ID when `id_or_name` parses as one, by name otherwise.
    pub async fn get(&self, id_or_name: &str) -> Result<User, ApiError> {
        match id_or_name.parse::<u64>() {
            Ok(id) => self.get_by_id(id).await,
            Err(_) => self.get_by_name(id_or_name).await,
        }
    }

    pub async fn update(&self, id: u64, input: &UserInput) -> Result<(), ApiError> {
        self.client.put_json(&format!("/users/{id}.json"), KEY, input).await
    }

    /// Lists the accounts and projects the user belongs to.
    pub async fn memberships(&self, id: u64) -> Result<Vec<Membership>, ApiError> {
        self.client
            .get_list(&format!("/users/{id}/memberships.json"), "memberships", "membership")
            .await
    }
}

/// `wanted` must already be lowercase.
fn name_matches(full_name: &str, wanted: &str) -> bool {
    let full = full_name.to_lowercase();
    let first = full.split(' ').next().unwrap_or_default();
    full == wanted || first == wanted
}

/// A Lighthouse API token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Token {
    pub token: String,
    pub note: Option<String>,
    pub user_id: u64,
    /// Set when the token is scoped to a single project.
    pub project_id: Option<u64>,
    pub read_only: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Token lookups.
#[derive(Debug, Clone, Copy)]
pub struct Tokens<'a> {
    client: &'a LighthouseClient,
}

impl<'a> Tokens<'a> {
    pub fn new(client: &'a LighthouseClient) -> Self {
        Self { client }
    }

    /// Fetches the details of `token`.
    pub async fn get(&self, token: &str) -> Result<Token, ApiError> {
        self.client.get_json(&format!("/tokens/{token}.json"), "token").await
    }
}

/// The authenticated user's profile.
#[derive(Debug, Clone, Copy)]
pub struct Profile<'a> {
    client: &'a LighthouseClient,
}

impl<'a> Profile<'a> {
    pub fn new(client: &'a LighthouseClient) -> Self {
        Self { client }
    }

    /// Returns the user the credential belongs to.
    pub async fn get(&self) -> Result<User, ApiError> {
        self.client.get_json("/profile.json", KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_active_ticket_wire_format() {
        let ticket: ActiveTicket =
            serde_json::from_value(json!([12, "Crash", "https://acme.lighthouseapp.com/t/12", 1700000000]))
                .unwrap();
        assert_eq!(ticket.number, 12);
        assert_eq!(ticket.updated_at.timestamp(), 1_700_000_000);
        assert_eq!(
            serde_json::to_value(&ticket).unwrap(),
            json!([12, "Crash", "https://acme.lighthouseapp.com/t/12", 1700000000])
        );

        assert!(serde_json::from_value::<ActiveTicket>(json!([12, "Crash"])).is_err());
    }

    #[test]
    fn test_name_matches_full_or_first_name() {
        assert!(name_matches("Ada Lovelace", "ada lovelace"));
        assert!(name_matches("Ada Lovelace", "ada"));
        assert!(name_matches("Grace", "grace"));
        assert!(!name_matches("Ada Lovelace", "lovelace"));
    }

    #[test]
    fn test_user_decodes_null_active_tickets() {
        let user: User = serde_json::from_value(json!({"id": 1, "name": "Ada", "active_tickets": null}))
            .unwrap();
        assert!(user.active_tickets.is_empty());
    }

    #[test]
    fn test_token_decodes() {
        let token: Token = serde_json::from_value(json!({
            "token": "abc123", "user_id": 4, "project_id": null, "read_only": true, "note": "ci"
        }))
        .unwrap();
        assert!(token.read_only);
        assert_eq!(token.project_id, None);
    }
}
