//
//  lighthouse-cli
//  api/resources/messages.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project messages and their comments.
//!
//! Comments share the message shape. Posting a comment returns the parent
//! message with the new comment appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::projects::pick_by_name;
use crate::api::client::LighthouseClient;
use crate::api::common::envelope::null_as_default;
use crate::api::common::ApiError;

const KEY: &str = "message";
const PLURAL: &str = "messages";

/// A comment on a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub project_id: u64,
    pub milestone_id: Option<u64>,
    pub user_id: u64,
    pub user_name: Option<String>,
    pub title: String,
    pub body: Option<String>,
    pub body_html: Option<String>,
    pub permalink: String,
    pub url: String,
    pub attachments_count: u64,
    pub all_attachments_count: u64,
    pub comments_count: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A message thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub project_id: u64,
    pub milestone_id: Option<u64>,
    pub user_id: u64,
    pub user_name: Option<String>,
    pub title: String,
    pub body: Option<String>,
    pub body_html: Option<String>,
    pub permalink: String,
    pub url: String,
    pub attachments_count: u64,
    pub all_attachments_count: u64,
    pub comments_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub comments: Vec<Comment>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Title and body of a new or updated message, or of a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageInput {
    pub title: String,
    pub body: String,
}

impl From<&Message> for MessageInput {
    fn from(message: &Message) -> Self {
        Self {
            title: message.title.clone(),
            body: message.body.clone().unwrap_or_default(),
        }
    }
}

/// Message operations for one project.
#[derive(Debug, Clone, Copy)]
pub struct Messages<'a> {
    client: &'a LighthouseClient,
    project_id: u64,
}

impl<'a> Messages<'a> {
    pub fn new(client: &'a LighthouseClient, project_id: u64) -> Self {
        Self { client, project_id }
    }

    fn path(&self, suffix: &str) -> String {
        format!("/projects/{}/messages{}.json", self.project_id, suffix)
    }

    pub async fn list(&self) -> Result<Vec<Message>, ApiError> {
        self.client.get_list(&self.path(""), PLURAL, KEY).await
    }

    pub async fn get(&self, id: u64) -> Result<Message, ApiError> {
        self.client.get_json(&self.path(&format!("/{id}")), KEY).await
    }

    pub async fn new_template(&self) -> Result<Message, ApiError> {
        self.client.get_json(&self.path("/new"), KEY).await
    }

    pub async fn create(&self, input: &MessageInput) -> Result<Message, ApiError> {
        self.client.post_json(&self.path(""), KEY, input).await
    }

    /// Adds a comment and returns the updated message.
    pub async fn create_comment(&self, id: u64, input: &MessageInput) -> Result<Message, ApiError> {
        self.client
            .post_json_as(&self.path(&format!("/{id}/comments")), "comment", KEY, input)
            .await
    }

    pub async fn update(&self, id: u64, input: &MessageInput) -> Result<(), ApiError> {
        self.client.put_json(&self.path(&format!("/{id}")), KEY, input).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete(&self.path(&format!("/{id}"))).await
    }

    /// Finds a message by title.
    pub async fn find_by_title(&self, title: &str) -> Result<Message, ApiError> {
        let messages = self.list().await?;
        pick_by_name(messages, title, |m| m.title.as_str()).ok_or_else(|| {
            ApiError::NoSuchResource {
                kind: "message",
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
    fn test_message_decodes_comments() {
        let message: Message = serde_json::from_value(json!({
            "id": 3,
            "title": "Release notes",
            "body": "Draft",
            "comments_count": 1,
            "comments": [{"id": 4, "parent_id": 3, "title": "Re: Release notes", "body": "LGTM"}]
        }))
        .unwrap();

        assert_eq!(message.comments.len(), 1);
        assert_eq!(message.comments[0].parent_id, Some(3));
    }

    #[test]
    fn test_null_comments_are_empty() {
        let message: Message = serde_json::from_value(json!({"id": 3, "comments": null})).unwrap();
        assert!(message.comments.is_empty());
    }
}
