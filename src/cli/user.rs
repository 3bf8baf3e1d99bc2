//
//  lighthouse-cli
//  cli/user.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! User commands
//!
//! Users may be given by ID or by name. Names are matched against the
//! members of every project the credential can see.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::api::{User, UserInput, Users};
use crate::output::{format_optional, print_field, TableOutput};
use crate::util::{format_relative_time, truncate};

use super::project::member_row;
use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum UserSubcommand {
    /// Show a user and their active tickets
    View(UserArg),

    /// Update a user's profile
    #[command(visible_alias = "edit")]
    Update(UpdateArgs),

    /// List a user's project memberships
    Memberships(UserArg),
}

#[derive(Args, Debug)]
pub struct UserArg {
    /// User ID or name
    pub user: String,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// User ID or name
    pub user: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New job title
    #[arg(long)]
    pub job: Option<String>,

    /// New website
    #[arg(long)]
    pub website: Option<String>,
}

impl TableOutput for User {
    fn print_table(&self, color: bool) {
        let name = if color {
            style(&self.name).bold().to_string()
        } else {
            self.name.clone()
        };
        println!("{} (#{})", name, self.id);
        println!();
        print_field("Job", &format_optional(self.job.as_deref()), color);
        print_field("Website", &format_optional(self.website.as_deref()), color);

        if self.active_tickets.is_empty() {
            return;
        }
        println!();
        print_field("Active tickets", &self.active_tickets.len().to_string(), color);
        let now = chrono::Utc::now();
        for ticket in &self.active_tickets {
            let number = if color {
                style(format!("#{}", ticket.number)).cyan().to_string()
            } else {
                format!("#{}", ticket.number)
            };
            println!(
                "  {:<8} {:<60} {}",
                number,
                truncate(&ticket.title, 60),
                format_relative_time(ticket.updated_at, now)
            );
        }
    }
}

impl UserCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = global.session()?;
        let users = Users::new(session.client());
        let writer = global.writer();

        match &self.command {
            UserSubcommand::View(args) => writer.write(&users.get(&args.user).await?),
            UserSubcommand::Update(args) => {
                let mut user = users.get(&args.user).await?;
                if let Some(name) = &args.name {
                    user.name = name.clone();
                }
                if let Some(job) = &args.job {
                    user.job = Some(job.clone());
                }
                if let Some(website) = &args.website {
                    user.website = Some(website.clone());
                }
                users
                    .update(user.id, &UserInput::from(&user))
                    .await
                    .with_context(|| format!("Failed to update user #{}", user.id))?;

                let user = users.get_by_id(user.id).await?;
                writer.write(&user)?;
                if !writer.is_json() {
                    writer.write_success(&format!("Updated user #{}", user.id));
                }
                Ok(())
            }
            UserSubcommand::Memberships(args) => {
                let id = match args.user.parse::<u64>() {
                    Ok(id) => id,
                    Err(_) => users.get_by_name(&args.user).await?.id,
                };
                let memberships = users.memberships(id).await?;
                writer.write_table(
                    &memberships,
                    ["User ID", "Name", "Job"],
                    "No memberships found.",
                    member_row,
                )
            }
        }
    }
}
