//
//  lighthouse-cli
//  api/resources/milestones.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project milestones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::projects::pick_by_name;
use crate::api::client::{with_query, LighthouseClient};
use crate::api::common::{collect_pages, ApiError};

const KEY: &str = "milestone";
const PLURAL: &str = "milestones";

/// A milestone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Milestone {
    pub id: u64,
    pub project_id: u64,
    pub title: String,
    pub goals: Option<String>,
    pub goals_html: Option<String>,
    pub permalink: String,
    pub url: String,
    pub position: i64,
    pub tickets_count: u64,
    pub open_tickets_count: u64,
    pub attachments_count: u64,
    pub max_points: u64,
    pub points_open: u64,
    pub points_closed: u64,
    pub user_name: Option<String>,
    pub due_on: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Milestone {
    /// Completed milestones carry a completion timestamp.
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Fields accepted when creating or updating a milestone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MilestoneInput {
    pub title: String,
    pub goals: String,
    pub due_on: Option<DateTime<Utc>>,
}

impl From<&Milestone> for MilestoneInput {
    fn from(milestone: &Milestone) -> Self {
        Self {
            title: milestone.title.clone(),
            goals: milestone.goals.clone().unwrap_or_default(),
            due_on: milestone.due_on,
        }
    }
}

/// Milestone operations for one project.
#[derive(Debug, Clone, Copy)]
pub struct Milestones<'a> {
    client: &'a LighthouseClient,
    project_id: u64,
}

impl<'a> Milestones<'a> {
    pub fn new(client: &'a LighthouseClient, project_id: u64) -> Self {
        Self { client, project_id }
    }

    fn path(&self, suffix: &str) -> String {
        format!("/projects/{}/milestones{}.json", self.project_id, suffix)
    }

    /// Lists one page of milestones, or the server's default page when `page` is `None`.
    pub async fn list(&self, page: Option<u32>) -> Result<Vec<Milestone>, ApiError> {
        let pairs: Vec<(&str, String)> = page
            .filter(|p| *p > 0)
            .map(|p| ("page", p.to_string()))
            .into_iter()
            .collect();
        self.client
            .get_list(&with_query(&self.path(""), &pairs), PLURAL, KEY)
            .await
    }

    /// Lists every milestone, one page at a time.
    pub async fn list_all(&self) -> Result<Vec<Milestone>, ApiError> {
        collect_pages(|page| async move { self.list(Some(page)).await }).await
    }

    pub async fn get(&self, id: u64) -> Result<Milestone, ApiError> {
        self.client.get_json(&self.path(&format!("/{id}")), KEY).await
    }

    pub async fn new_template(&self) -> Result<Milestone, ApiError> {
        self.client.get_json(&self.path("/new"), KEY).await
    }

    pub async fn create(&self, input: &MilestoneInput) -> Result<Milestone, ApiError> {
        self.client.post_json(&self.path(""), KEY, input).await
    }

    pub async fn update(&self, id: u64, input: &MilestoneInput) -> Result<(), ApiError> {
        self.client.put_json(&self.path(&format!("/{id}")), KEY, input).await
    }

    /// Marks the milestone completed.
    pub async fn close(&self, id: u64) -> Result<(), ApiError> {
        self.client.put_empty(&self.path(&format!("/{id}/close"))).await
    }

    /// Reopens a completed milestone.
    pub async fn open(&self, id: u64) -> Result<(), ApiError> {
        self.client.put_empty(&self.path(&format!("/{id}/open"))).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete(&self.path(&format!("/{id}"))).await
    }

    /// Finds a milestone by title across every page.
    ///
    /// # Errors
    ///
    /// [`ApiError::NoSuchResource`] when no milestone has that title.
    pub async fn find_by_title(&self, title: &str) -> Result<Milestone, ApiError> {
        let milestones = self.list_all().await?;
        pick_by_name(milestones, title, |m| m.title.as_str()).ok_or_else(|| {
            ApiError::NoSuchResource {
                kind: "milestone",
                name: title.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_milestone_decodes() {
        let milestone: Milestone = serde_json::from_value(json!({
            "id": 5,
            "title": "1.0",
            "goals": null,
            "due_on": "2026-11-01T00:00:00Z",
            "completed_at": null,
            "open_tickets_count": 3
        }))
        .unwrap();

        assert_eq!(milestone.id, 5);
        assert!(milestone.due_on.is_some());
        assert!(!milestone.is_completed());
    }

    #[test]
    fn test_input_sends_null_due_date() {
        let input = MilestoneInput {
            title: "1.0".into(),
            goals: "ship it".into(),
            due_on: None,
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"title": "1.0", "goals": "ship it", "due_on": null})
        );
    }
}
