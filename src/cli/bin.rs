//
//  lighthouse-cli
//  cli/bin.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Ticket bin commands (require `--project`)
//!
//! A bin is a saved ticket search.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::api::{Bin, BinInput, Bins};
use crate::interactive::confirm_delete;
use crate::output::{format_bool, print_field, TableOutput};
use crate::util::format_time;

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct BinCommand {
    #[command(subcommand)]
    pub command: BinSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum BinSubcommand {
    /// List bins
    #[command(visible_alias = "ls")]
    List,

    /// Show a bin
    View(BinArg),

    /// Create a bin
    Create(CreateArgs),

    /// Update a bin
    #[command(visible_alias = "edit")]
    Update(UpdateArgs),

    /// Delete a bin
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct BinArg {
    /// Bin ID or name
    pub bin: String,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Bin name
    #[arg(long)]
    pub name: String,

    /// Ticket search query
    #[arg(long, short = 'q')]
    pub query: String,

    /// Make this the project's default bin
    #[arg(long)]
    pub default: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Bin ID or name
    pub bin: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New search query
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// Set whether this is the project's default bin
    #[arg(long, value_name = "BOOL")]
    pub default: Option<bool>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Bin ID or name
    pub bin: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl TableOutput for Bin {
    fn print_table(&self, color: bool) {
        let name = if color {
            style(&self.name).bold().to_string()
        } else {
            self.name.clone()
        };
        println!("{} (#{})", name, self.id);
        println!();
        print_field("Query", &self.query, color);
        print_field("Tickets", &self.tickets_count.to_string(), color);
        print_field("Default", &format_bool(self.default, color), color);
        print_field("Shared", &format_bool(self.shared, color), color);
        print_field("Updated", &format_time(self.updated_at), color);
    }
}

impl BinCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = global.session()?;
        let project_id = session.project_id().await?;
        let bins = Bins::new(session.client(), project_id);
        let writer = global.writer();

        match &self.command {
            BinSubcommand::List => {
                let found = bins.list().await?;
                writer.write_table(
                    &found,
                    ["ID", "Name", "Query", "Tickets", "Default"],
                    "No bins found.",
                    |b| {
                        [
                            b.id.to_string(),
                            b.name.clone(),
                            b.query.clone(),
                            b.tickets_count.to_string(),
                            format_bool(b.default, false),
                        ]
                    },
                )
            }
            BinSubcommand::View(args) => {
                let id = session.resolve_bin(project_id, &args.bin).await?;
                writer.write(&bins.get(id).await?)
            }
            BinSubcommand::Create(args) => {
                let input = BinInput {
                    name: args.name.clone(),
                    query: args.query.clone(),
                    default: args.default,
                };
                let bin = bins.create(&input).await.context("Failed to create bin")?;
                writer.write(&bin)?;
                if !writer.is_json() {
                    writer.write_success(&format!("Created bin {} (#{})", bin.name, bin.id));
                }
                Ok(())
            }
            BinSubcommand::Update(args) => {
                let id = session.resolve_bin(project_id, &args.bin).await?;
                let mut bin = bins.get(id).await?;
                if let Some(name) = &args.name {
                    bin.name = name.clone();
                }
                if let Some(query) = &args.query {
                    bin.query = query.clone();
                }
                if let Some(default) = args.default {
                    bin.default = default;
                }
                bins.update(id, &BinInput::from(&bin))
                    .await
                    .with_context(|| format!("Failed to update bin #{id}"))?;
                writer.write(&bin)?;
                if !writer.is_json() {
                    writer.write_success(&format!("Updated bin #{}", id));
                }
                Ok(())
            }
            BinSubcommand::Delete(args) => {
                let id = session.resolve_bin(project_id, &args.bin).await?;
                if !args.yes && !confirm_delete(&format!("bin #{id}"))? {
                    writer.write_info("Cancelled.");
                    return Ok(());
                }
                bins.delete(id).await?;
                writer.write_success(&format!("Deleted bin #{}", id));
                Ok(())
            }
        }
    }
}
