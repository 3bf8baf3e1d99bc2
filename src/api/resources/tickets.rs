//
//  lighthouse-cli
//  api/resources/tickets.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project tickets.
//!
//! Tickets are addressed by their per-project `number`, not a global ID.
//!
//! # Searching
//!
//! [`TicketListOptions::query`] takes Lighthouse search syntax, e.g.
//! `state:open responsible:me sort:updated`.
//!
//! # Updating
//!
//! A non-empty `body` on update is added to the ticket as a new comment, so
//! [`TicketInput::from`] leaves it empty when starting from a fetched ticket.
//!
//! # Attachments
//!
//! Attachment URLs usually redirect to file storage on another host.
//! [`Tickets::get_attachment`] follows that redirect through the transport,
//! which drops credentials once the target leaves the API origin.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::api::client::{with_query, LighthouseClient};
use crate::api::common::envelope::null_as_default;
use crate::api::common::{collect_pages, ApiError};
use crate::api::transport::Request;

const KEY: &str = "ticket";
const PLURAL: &str = "tickets";

/// Largest page size Lighthouse accepts for ticket lists.
pub const MAX_LIMIT: u32 = 100;

/// A tag and the number of tickets that carry it.
///
/// Sent over the wire as a two element array, `["bug", 12]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphabeticalTag {
    pub tag: String,
    pub count: u64,
}

impl Serialize for AlphabeticalTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.tag, self.count).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AlphabeticalTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (tag, count) = <(String, u64)>::deserialize(deserializer)?;
        Ok(Self { tag, count })
    }
}

/// A project tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
struct TagEnvelope {
    tag: Tag,
}

fn unwrap_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Tag>, D::Error> {
    let wrapped: Option<Vec<TagEnvelope>> = Option::deserialize(deserializer)?;
    Ok(wrapped
        .unwrap_or_default()
        .into_iter()
        .map(|entry| entry.tag)
        .collect())
}

/// A file attached to a ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub id: u64,
    pub project_id: u64,
    pub uploader_id: Option<u64>,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: u64,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub code: Option<String>,
    /// Download URL. Absolute, and usually redirects off the API host.
    pub url: String,
    pub attachment_file_processing: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct AttachmentEnvelope {
    attachment: Attachment,
}

fn unwrap_attachments<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Attachment>, D::Error> {
    let wrapped: Option<Vec<AttachmentEnvelope>> = Option::deserialize(deserializer)?;
    Ok(wrapped
        .unwrap_or_default()
        .into_iter()
        .map(|entry| entry.attachment)
        .collect())
}

/// Attributes that changed in one ticket version, holding their previous values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffableAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// One entry in a ticket's history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketVersion {
    pub number: u64,
    pub version: u64,
    pub title: String,
    pub state: Option<String>,
    pub closed: bool,
    pub body: Option<String>,
    pub body_html: Option<String>,
    pub tag: Option<String>,
    pub user_id: Option<u64>,
    pub user_name: Option<String>,
    pub creator_id: Option<u64>,
    pub creator_name: Option<String>,
    pub assigned_user_id: Option<u64>,
    pub milestone_id: Option<u64>,
    pub diffable_attributes: Option<DiffableAttributes>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A ticket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ticket {
    pub number: u64,
    pub project_id: u64,
    pub title: String,
    pub state: String,
    pub state_color: Option<String>,
    pub closed: bool,
    pub spam: bool,
    pub body: Option<String>,
    pub body_html: Option<String>,
    pub original_body: Option<String>,
    pub original_body_html: Option<String>,
    pub latest_body: Option<String>,
    pub priority: i64,
    pub importance: i64,
    pub importance_name: Option<String>,
    /// Space separated tag string as last set on the ticket.
    pub tag: Option<String>,
    #[serde(deserialize_with = "unwrap_tags")]
    pub tags: Vec<Tag>,
    #[serde(deserialize_with = "null_as_default")]
    pub alphabetical_tags: Vec<AlphabeticalTag>,
    pub user_id: Option<u64>,
    pub user_name: Option<String>,
    pub creator_id: Option<u64>,
    pub creator_name: Option<String>,
    pub assigned_user_id: Option<u64>,
    pub assigned_user_name: Option<String>,
    pub milestone_id: Option<u64>,
    pub milestone_title: Option<String>,
    pub milestone_order: Option<i64>,
    pub milestone_due_on: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub watchers_ids: Vec<u64>,
    pub attachments_count: u64,
    #[serde(deserialize_with = "unwrap_attachments")]
    pub attachments: Vec<Attachment>,
    pub version: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub versions: Vec<TicketVersion>,
    pub permalink: String,
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields accepted when creating or updating a ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TicketInput {
    pub title: String,
    /// Ticket description on create; a new comment on update.
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Sent even when `None`, which unassigns the ticket on update.
    pub assigned_user_id: Option<u64>,
    /// Sent even when `None`, which clears the milestone on update.
    pub milestone_id: Option<u64>,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_all: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub multiple_watchers: Vec<u64>,
}

impl Ticket {
    /// Finds an attachment by exact filename.
    pub fn attachment(&self, filename: &str) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.filename == filename)
    }
}

impl From<&Ticket> for TicketInput {
    fn from(ticket: &Ticket) -> Self {
        Self {
            title: ticket.title.clone(),
            body: String::new(),
            state: Some(ticket.state.clone()).filter(|s| !s.is_empty()),
            assigned_user_id: ticket.assigned_user_id,
            milestone_id: ticket.milestone_id,
            tag: ticket.tag.clone().unwrap_or_default(),
            notify_all: None,
            multiple_watchers: Vec::new(),
        }
    }
}

/// Create requests leave out unset assignee and milestone so the project
/// defaults apply.
#[derive(Serialize)]
struct CreateBody<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assigned_user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    milestone_id: Option<u64>,
    tag: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notify_all: Option<bool>,
    #[serde(skip_serializing_if = "<[u64]>::is_empty")]
    multiple_watchers: &'a [u64],
}

impl<'a> From<&'a TicketInput> for CreateBody<'a> {
    fn from(input: &'a TicketInput) -> Self {
        Self {
            title: &input.title,
            body: &input.body,
            state: input.state.as_deref(),
            assigned_user_id: input.assigned_user_id,
            milestone_id: input.milestone_id,
            tag: &input.tag,
            notify_all: input.notify_all,
            multiple_watchers: &input.multiple_watchers,
        }
    }
}

/// A keyword command applied to every ticket matching a query.
///
/// Sent as a bare JSON object, without the `ticket` envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkEditOptions {
    /// Search query selecting the tickets, or `all`.
    pub query: String,
    /// Keyword command such as `state:resolved tagged:done`.
    pub command: String,
    /// Token with access to the destination when the command moves tickets
    /// to another project or account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration_token: Option<String>,
}

/// Ticket list filters. Unset fields are left off the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketListOptions {
    /// Lighthouse search query.
    pub query: Option<String>,
    /// Page size, at most [`MAX_LIMIT`].
    pub limit: Option<u32>,
    /// 1-indexed page number.
    pub page: Option<u32>,
}

impl TicketListOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(query) = self.query.as_ref().filter(|q| !q.is_empty()) {
            pairs.push(("q", query.clone()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

/// Ticket operations for one project.
#[derive(Debug, Clone, Copy)]
pub struct Tickets<'a> {
    client: &'a LighthouseClient,
    project_id: u64,
}

impl<'a> Tickets<'a> {
    pub fn new(client: &'a LighthouseClient, project_id: u64) -> Self {
        Self { client, project_id }
    }

    fn path(&self, suffix: &str) -> String {
        format!("/projects/{}/tickets{}.json", self.project_id, suffix)
    }

    /// Lists one page of tickets.
    pub async fn list(&self, options: &TicketListOptions) -> Result<Vec<Ticket>, ApiError> {
        let path = with_query(&self.path(""), &options.query_pairs());
        self.client.get_list(&path, PLURAL, KEY).await
    }

    /// Lists every matching ticket, one page at a time.
    ///
    /// `options.page` is ignored. Without an explicit limit the largest page
    /// size is used to keep the number of requests down.
    pub async fn list_all(&self, options: &TicketListOptions) -> Result<Vec<Ticket>, ApiError> {
        let limit = options.limit.or(Some(MAX_LIMIT));
        collect_pages(|page| {
            let options = TicketListOptions {
                query: options.query.clone(),
                limit,
                page: Some(page),
            };
            async move { self.list(&options).await }
        })
        .await
    }

    pub async fn get(&self, number: u64) -> Result<Ticket, ApiError> {
        self.client.get_json(&self.path(&format!("/{number}")), KEY).await
    }

    /// Fetches the server's defaults for a new ticket.
    pub async fn new_template(&self) -> Result<Ticket, ApiError> {
        self.client.get_json(&self.path("/new"), KEY).await
    }

    pub async fn create(&self, input: &TicketInput) -> Result<Ticket, ApiError> {
        self.client
            .post_json(&self.path(""), KEY, &CreateBody::from(input))
            .await
    }

    pub async fn update(&self, number: u64, input: &TicketInput) -> Result<(), ApiError> {
        self.client
            .put_json(&self.path(&format!("/{number}")), KEY, input)
            .await
    }

    pub async fn delete(&self, number: u64) -> Result<(), ApiError> {
        self.client.delete(&self.path(&format!("/{number}"))).await
    }

    /// Applies `options.command` to every ticket matching `options.query`.
    pub async fn bulk_edit(&self, options: &BulkEditOptions) -> Result<(), ApiError> {
        let request = Request::new(Method::PUT, self.path("/bulk_edit")).json(options)?;
        self.client.request(request, StatusCode::OK).await?;
        Ok(())
    }

    /// Downloads the contents of `attachment`.
    pub async fn get_attachment(&self, attachment: &Attachment) -> Result<Bytes, ApiError> {
        let response = self
            .client
            .request(Request::get(attachment.url.as_str()), StatusCode::OK)
            .await?;
        Ok(response.body)
    }
}
