//
//  lighthouse-cli
//  api/resources/changesets.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Source control changesets attached to a project.
//!
//! Changesets are addressed by revision string rather than numeric ID.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::api::client::{with_query, LighthouseClient};
use crate::api::common::envelope::null_as_default;
use crate::api::common::{collect_pages, ApiError};

const KEY: &str = "changeset";
const PLURAL: &str = "changesets";

/// One file touched by a changeset.
///
/// Encoded as `["M", "src/main.rs"]`. Lighthouse truncates very long change
/// lists down to `["M"]`, which decodes with an empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Change {
    /// Operation code such as `A`, `M` or `D`.
    pub operation: String,
    pub path: String,
}

impl Serialize for Change {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.path.is_empty() {
            [&self.operation].serialize(serializer)
        } else {
            [&self.operation, &self.path].serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Change {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut parts = Vec::<String>::deserialize(deserializer)?;
        match parts.len() {
            1 | 2 => {
                let path = if parts.len() == 2 { parts.remove(1) } else { String::new() };
                Ok(Self {
                    operation: parts.remove(0),
                    path,
                })
            }
            n => Err(D::Error::custom(format!("change has {n} elements, expected 1 or 2"))),
        }
    }
}

/// A changeset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Changeset {
    pub revision: String,
    pub project_id: u64,
    pub ticket_id: Option<u64>,
    pub user_id: Option<u64>,
    pub committer: Option<String>,
    pub title: String,
    pub body: Option<String>,
    pub body_html: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub changes: Vec<Change>,
    pub changed_at: Option<DateTime<Utc>>,
}

/// Fields accepted when creating a changeset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangesetInput {
    pub revision: String,
    pub title: String,
    pub body: String,
    pub body_html: String,
    pub changes: Vec<Change>,
    pub changed_at: Option<DateTime<Utc>>,
    pub user_id: Option<u64>,
}

/// Changeset operations for one project.
#[derive(Debug, Clone, Copy)]
pub struct Changesets<'a> {
    client: &'a LighthouseClient,
    project_id: u64,
}

impl<'a> Changesets<'a> {
    pub fn new(client: &'a LighthouseClient, project_id: u64) -> Self {
        Self { client, project_id }
    }

    fn path(&self, suffix: &str) -> String {
        format!("/projects/{}/changesets{}.json", self.project_id, suffix)
    }

    /// Lists one page of changesets.
    pub async fn list(&self, page: Option<u32>) -> Result<Vec<Changeset>, ApiError> {
        let pairs: Vec<(&str, String)> = page
            .filter(|p| *p > 0)
            .map(|p| ("page", p.to_string()))
            .into_iter()
            .collect();
        self.client
            .get_list(&with_query(&self.path(""), &pairs), PLURAL, KEY)
            .await
    }

    /// Lists every changeset, one page at a time.
    pub async fn list_all(&self) -> Result<Vec<Changeset>, ApiError> {
        collect_pages(|page| async move { self.list(Some(page)).await }).await
    }

    pub async fn get(&self, revision: &str) -> Result<Changeset, ApiError> {
        self.client.get_json(&self.path(&format!("/{revision}")), KEY).await
    }

    pub async fn new_template(&self) -> Result<Changeset, ApiError> {
        self.client.get_json(&self.path("/new"), KEY).await
    }

    pub async fn create(&self, input: &ChangesetInput) -> Result<Changeset, ApiError> {
        self.client.post_json(&self.path(""), KEY, input).await
    }

    pub async fn delete(&self, revision: &str) -> Result<(), ApiError> {
        self.client.delete(&self.path(&format!("/{revision}"))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_accepts_one_or_two_elements() {
        let changes: Vec<Change> =
            serde_json::from_value(json!([["M", "src/lib.rs"], ["D"]])).unwrap();
        assert_eq!(changes[0].operation, "M");
        assert_eq!(changes[0].path, "src/lib.rs");
        assert_eq!(changes[1], Change { operation: "D".into(), path: String::new() });
    }

    #[test]
    fn test_change_rejects_other_lengths() {
        assert!(serde_json::from_value::<Change>(json!([])).is_err());
        assert!(serde_json::from_value::<Change>(json!(["M", "a", "b"])).is_err());
    }

    #[test]
    fn test_change_encodes_without_empty_path() {
        let short = Change { operation: "A".into(), path: String::new() };
        let full = Change { operation: "A".into(), path: "README".into() };
        assert_eq!(serde_json::to_value(&short).unwrap(), json!(["A"]));
        assert_eq!(serde_json::to_value(&full).unwrap(), json!(["A", "README"]));
    }

    #[test]
    fn test_changeset_decodes() {
        let changeset: Changeset = serde_json::from_value(json!({
            "revision": "abc123",
            "title": "Fix crash",
            "changes": [["M", "src/main.rs"]],
            "changed_at": "2026-10-01T12:00:00Z",
            "ticket_id": null
        }))
        .unwrap();

        assert_eq!(changeset.revision, "abc123");
        assert_eq!(changeset.changes.len(), 1);
        assert_eq!(changeset.ticket_id, None);
    }
}
