//
//  lighthouse-cli
//  api/resources/projects.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Projects and project memberships.
//!
//! # Endpoints
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | list | GET | `/projects.json` |
//! | get | GET | `/projects/{id}.json` |
//! | new_template | GET | `/projects/new.json` |
//! | create | POST | `/projects.json` |
//! | update | PUT | `/projects/{id}.json` |
//! | delete | DELETE | `/projects/{id}.json` |
//! | memberships | GET | `/projects/{id}/memberships.json` |

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::client::LighthouseClient;
use crate::api::common::ApiError;

const KEY: &str = "project";
const PLURAL: &str = "projects";

/// A comma separated list sent over the wire as a single string.
///
/// `"new,open,hold"` decodes to `["new", "open", "hold"]`. Empty entries are
/// dropped, so `""` decodes to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommaList(pub Vec<String>);

impl CommaList {
    /// Whether `value` is one of the entries.
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|entry| entry == value)
    }
}

impl fmt::Display for CommaList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

impl Serialize for CommaList {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CommaList {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Self(
            raw.split(',')
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }
}

/// Which onboarding steps are done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Todos {
    pub projects: bool,
    pub tickets: bool,
    pub milestones: bool,
}

/// A Lighthouse project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub permalink: String,
    pub archived: bool,
    pub hidden: bool,
    pub public: bool,
    pub description: Option<String>,
    pub description_html: Option<String>,
    pub license: Option<String>,
    pub default_assigned_user_id: Option<u64>,
    pub default_milestone_id: Option<u64>,
    pub default_ticket_text: Option<String>,
    pub enable_points: bool,
    pub points_scale: Option<String>,
    pub open_tickets_count: u64,
    pub oss_readonly: bool,
    pub send_changesets_to_events: bool,
    /// Raw open state definitions, one `name/color` per line.
    pub open_states: String,
    /// Raw closed state definitions, one `name/color` per line.
    pub closed_states: String,
    /// Names of the open states.
    pub open_states_list: CommaList,
    /// Names of the closed states.
    pub closed_states_list: CommaList,
    pub todos_completed: Todos,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields accepted when creating or updating a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectInput {
    pub name: String,
    pub archived: bool,
    pub public: bool,
}

impl From<&Project> for ProjectInput {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            archived: project.archived,
            public: project.public,
        }
    }
}

/// A user as embedded in a membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberUser {
    pub id: u64,
    pub name: String,
    pub job: Option<String>,
    pub website: Option<String>,
    pub avatar_url: Option<String>,
}

/// Links a user to a project or an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Membership {
    pub id: u64,
    pub user_id: u64,
    pub user: Option<MemberUser>,
    pub account: Option<String>,
}

/// Project operations for one account.
#[derive(Debug, Clone, Copy)]
pub struct Projects<'a> {
    client: &'a LighthouseClient,
}

impl<'a> Projects<'a> {
    pub fn new(client: &'a LighthouseClient) -> Self {
        Self { client }
    }

    /// Lists every project visible to the credential.
    pub async fn list(&self) -> Result<Vec<Project>, ApiError> {
        self.client.get_list("/projects.json", PLURAL, KEY).await
    }

    pub async fn get(&self, id: u64) -> Result<Project, ApiError> {
        self.client.get_json(&format!("/projects/{id}.json"), KEY).await
    }

    /// Fetches the server's defaults for a new project.
    pub async fn new_template(&self) -> Result<Project, ApiError> {
        self.client.get_json("/projects/new.json", KEY).await
    }

    pub async fn create(&self, input: &ProjectInput) -> Result<Project, ApiError> {
        self.client.post_json("/projects.json", KEY, input).await
    }

    pub async fn update(&self, id: u64, input: &ProjectInput) -> Result<(), ApiError> {
        self.client.put_json(&format!("/projects/{id}.json"), KEY, input).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete(&format!("/projects/{id}.json")).await
    }

    pub async fn memberships(&self, id: u64) -> Result<Vec<Membership>, ApiError> {
        self.client
            .get_list(&format!("/projects/{id}/memberships.json"), "memberships", "membership")
            .await
    }

    /// Finds a member of project `id` by user name.
    ///
    /// # Errors
    ///
    /// [`ApiError::NoSuchResource`] when nobody on the project has that name.
    pub async fn find_member(&self, id: u64, name: &str) -> Result<MemberUser, ApiError> {
        let users: Vec<MemberUser> = self
            .memberships(id)
            .await?
            .into_iter()
            .filter_map(|m| m.user)
            .collect();
        pick_by_name(users, name, |u| u.name.as_str()).ok_or_else(|| ApiError::NoSuchResource {
            kind: "user",
            name: name.to_string(),
        })
    }

    /// Finds a project by exact name, falling back to a case-insensitive match.
    ///
    /// # Errors
    ///
    /// [`ApiError::NoSuchResource`] when no project matches.
    pub async fn find_by_name(&self, name: &str) -> Result<Project, ApiError> {
        let projects = self.list().await?;
        pick_by_name(projects, name, |p| p.name.as_str()).ok_or_else(|| ApiError::NoSuchResource {
            kind: "project",
            name: name.to_string(),
        })
    }
}

/// Picks the item whose name equals `name`, preferring an exact match over a
/// case-insensitive one.
pub(crate) fn pick_by_name<T>(items: Vec<T>, name: &str, name_of: impl Fn(&T) -> &str) -> Option<T> {
    let mut folded = None;
    for item in items {
        let candidate = name_of(&item);
        if candidate == name {
            return Some(item);
        }
        if folded.is_none() && candidate.eq_ignore_ascii_case(name) {
            folded = Some(item);
        }
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_list_decodes_and_drops_empty() {
        let list: CommaList = serde_json::from_str(r#""new,open,,hold,""#).unwrap();
        assert_eq!(list.0, vec!["new", "open", "hold"]);
        assert!(list.contains("open"));

        let empty: CommaList = serde_json::from_str(r#""""#).unwrap();
        assert!(empty.0.is_empty());

        let null: CommaList = serde_json::from_str("null").unwrap();
        assert!(null.0.is_empty());
    }

    #[test]
    fn test_comma_list_encodes_joined() {
        let list = CommaList(vec!["resolved".into(), "invalid".into()]);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#""resolved,invalid""#);
    }

    #[test]
    fn test_project_decodes_with_nulls() {
        let project: Project = serde_json::from_str(
            r#"{
                "id": 42,
                "name": "Widgets",
                "description": null,
                "default_milestone_id": null,
                "open_states_list": "new,open",
                "closed_states_list": "resolved",
                "created_at": "2012-04-26T16:38:22Z"
            }"#,
        )
        .unwrap();

        assert_eq!(project.id, 42);
        assert_eq!(project.description, None);
        assert_eq!(project.open_states_list.0, vec!["new", "open"]);
        assert!(project.created_at.is_some());
    }

    #[test]
    fn test_project_input_from_project() {
        let project = Project {
            name: "Widgets".into(),
            public: true,
            ..Default::default()
        };
        let json = serde_json::to_value(ProjectInput::from(&project)).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Widgets", "archived": false, "public": true}));
    }

    #[test]
    fn test_pick_by_name_prefers_exact() {
        let names = vec!["widgets".to_string(), "Widgets".to_string()];
        assert_eq!(pick_by_name(names.clone(), "Widgets", |s| s.as_str()).as_deref(), Some("Widgets"));
        assert_eq!(pick_by_name(names.clone(), "WIDGETS", |s| s.as_str()).as_deref(), Some("widgets"));
        assert_eq!(pick_by_name(names, "gadgets", |s| s.as_str()), None);
    }
}
