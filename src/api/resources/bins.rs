//
//  lighthouse-cli
//  api/resources/bins.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Ticket bins (saved searches).
//!
//! Bins live under `/projects/{id}/bins` but the JSON envelope key is
//! `ticket_bin`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::projects::pick_by_name;
use crate::api::client::LighthouseClient;
use crate::api::common::ApiError;

const KEY: &str = "ticket_bin";
const PLURAL: &str = "ticket_bins";

/// A saved ticket search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bin {
    pub id: u64,
    pub project_id: u64,
    pub user_id: u64,
    pub name: String,
    pub query: String,
    pub position: i64,
    pub tickets_count: u64,
    pub default: bool,
    pub shared: bool,
    pub global: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields accepted when creating or updating a bin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BinInput {
    pub name: String,
    pub query: String,
    pub default: bool,
}

impl From<&Bin> for BinInput {
    fn from(bin: &Bin) -> Self {
        Self {
            name: bin.name.clone(),
            query: bin.query.clone(),
            default: bin.default,
        }
    }
}

/// Bin operations for one project.
#[derive(Debug, Clone, Copy)]
pub struct Bins<'a> {
    client: &'a LighthouseClient,
    project_id: u64,
}

impl<'a> Bins<'a> {
    pub fn new(client: &'a LighthouseClient, project_id: u64) -> Self {
        Self { client, project_id }
    }

    fn path(&self, suffix: &str) -> String {
        format!("/projects/{}/bins{}.json", self.project_id, suffix)
    }

    pub async fn list(&self) -> Result<Vec<Bin>, ApiError> {
        self.client.get_list(&self.path(""), PLURAL, KEY).await
    }

    pub async fn get(&self, id: u64) -> Result<Bin, ApiError> {
        self.client.get_json(&self.path(&format!("/{id}")), KEY).await
    }

    pub async fn create(&self, input: &BinInput) -> Result<Bin, ApiError> {
        self.client.post_json(&self.path(""), KEY, input).await
    }

    pub async fn update(&self, id: u64, input: &BinInput) -> Result<(), ApiError> {
        self.client.put_json(&self.path(&format!("/{id}")), KEY, input).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete(&self.path(&format!("/{id}"))).await
    }

    /// Finds a bin by name.
    pub async fn find_by_name(&self, name: &str) -> Result<Bin, ApiError> {
        let bins = self.list().await?;
        pick_by_name(bins, name, |b| b.name.as_str()).ok_or_else(|| ApiError::NoSuchResource {
            kind: "bin",
            name: name.to_string(),
        })
    }
}
