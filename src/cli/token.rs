//
//  lighthouse-cli
//  cli/token.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! API token commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::api::{Token, Tokens};
use crate::context::ContextResolver;
use crate::output::{format_bool, format_optional, print_field, TableOutput};
use crate::util::format_time;

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct TokenCommand {
    #[command(subcommand)]
    pub command: TokenSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TokenSubcommand {
    /// Show what a token grants
    View(TokenArg),
}

#[derive(Args, Debug)]
pub struct TokenArg {
    /// Token to inspect (defaults to the configured token)
    pub token: Option<String>,
}

impl TableOutput for Token {
    fn print_table(&self, color: bool) {
        print_field("Note", &format_optional(self.note.as_deref()), color);
        print_field("User", &self.user_id.to_string(), color);
        print_field(
            "Project",
            &self.project_id.map(|p| p.to_string()).unwrap_or_else(|| "all".into()),
            color,
        );
        print_field("Read only", &format_bool(self.read_only, color), color);
        print_field("Created", &format_time(self.created_at), color);
    }
}

impl TokenCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            TokenSubcommand::View(args) => {
                let resolver = ContextResolver::from_options(global)?;
                let token = match &args.token {
                    Some(token) => token.clone(),
                    None => resolver
                        .effective_config(global)
                        .token
                        .filter(|t| !t.is_empty())
                        .context("Please supply a token or configure one via -t, --token, LH_TOKEN or config file")?,
                };
                let session = resolver.resolve(global)?;
                let details = Tokens::new(session.client()).get(&token).await?;
                global.writer().write(&details)
            }
        }
    }
}
