//
//  lighthouse-cli
//  cli/ticket.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Ticket commands
//!
//! All ticket commands are scoped to the global `--project`. Users and
//! milestones may be given by ID or by name.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Subcommand};
use console::style;

use crate::api::resources::tickets::MAX_LIMIT;
use crate::api::{BulkEditOptions, Ticket, TicketInput, TicketListOptions, Tickets};
use crate::context::Session;
use crate::interactive::confirm_delete;
use crate::output::{format_optional, format_state, print_field, TableOutput};
use crate::util::{format_relative_time, format_time, parse_id_list, truncate};

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct TicketCommand {
    #[command(subcommand)]
    pub command: TicketSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TicketSubcommand {
    /// List tickets
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show a ticket
    View(NumberArg),

    /// Show the defaults Lighthouse uses for a new ticket
    New,

    /// Create a ticket
    Create(CreateArgs),

    /// Update a ticket
    #[command(visible_alias = "edit")]
    Update(UpdateArgs),

    /// Delete a ticket
    Delete(DeleteArgs),

    /// Download a ticket attachment
    Attachment(AttachmentArgs),

    /// Apply keyword commands to every ticket matching a query
    BulkEdit(BulkEditArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Search query, e.g. "state:open responsible:me"
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// Tickets per page (at most 100)
    #[arg(long, short = 'L', value_parser = clap::value_parser!(u32).range(1..=MAX_LIMIT as i64))]
    pub limit: Option<u32>,

    /// Page number, starting at 1
    #[arg(long, conflicts_with = "all")]
    pub page: Option<u32>,

    /// Fetch every page
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct NumberArg {
    /// Ticket number
    pub number: u64,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Ticket title
    #[arg(long)]
    pub title: String,

    /// Ticket body
    #[arg(long)]
    pub body: Option<String>,

    /// Ticket state
    #[arg(long)]
    pub state: Option<String>,

    /// Assign the ticket to a user (ID or name)
    #[arg(long)]
    pub assigned: Option<String>,

    /// Assign the ticket to a milestone (ID or title)
    #[arg(long)]
    pub milestone: Option<String>,

    /// Tags, space separated; quote multi-word tags
    #[arg(long)]
    pub tags: Option<String>,

    /// Comma-separated user IDs to add as watchers
    #[arg(long)]
    pub watchers: Option<String>,

    /// Notify every project member
    #[arg(long)]
    pub notify_all: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Ticket number
    pub number: u64,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// Add a comment
    #[arg(long)]
    pub comment: Option<String>,

    /// New state
    #[arg(long)]
    pub state: Option<String>,

    /// Assign the ticket to a user (ID or name)
    #[arg(long, conflicts_with = "unassign")]
    pub assigned: Option<String>,

    /// Remove the assignee
    #[arg(long)]
    pub unassign: bool,

    /// Move the ticket to a milestone (ID or title)
    #[arg(long, conflicts_with = "no_milestone")]
    pub milestone: Option<String>,

    /// Remove the ticket from its milestone
    #[arg(long)]
    pub no_milestone: bool,

    /// Replace the tags
    #[arg(long)]
    pub tags: Option<String>,

    /// Notify every project member
    #[arg(long)]
    pub notify_all: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Ticket number
    pub number: u64,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct AttachmentArgs {
    /// Ticket number
    pub number: u64,

    /// Attachment filename
    pub filename: String,

    /// Write to this file instead of standard output
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BulkEditArgs {
    /// Search query selecting the tickets
    #[arg(long, short = 'q', required_unless_present = "all")]
    pub query: Option<String>,

    /// Update every ticket in the project
    #[arg(long, conflicts_with = "query")]
    pub all: bool,

    /// Keyword command, e.g. "state:resolved tagged:done"
    #[arg(long)]
    pub command: String,

    /// API token with access to the destination project when the command
    /// moves tickets with the `project` or `account` keywords
    #[arg(long)]
    pub migration_token: Option<String>,
}

impl BulkEditArgs {
    fn options(&self) -> Result<BulkEditOptions> {
        let query = if self.all {
            "all".to_string()
        } else {
            self.query.clone().unwrap_or_default()
        };
        if query.trim().is_empty() {
            bail!("Please specify a search query with --query, or --all");
        }
        if self.command.trim().is_empty() {
            bail!("Please specify keywords with --command");
        }
        Ok(BulkEditOptions {
            query,
            command: self.command.clone(),
            migration_token: self.migration_token.clone().filter(|t| !t.is_empty()),
        })
    }
}

impl TableOutput for Ticket {
    fn print_table(&self, color: bool) {
        let heading = if color {
            style(format!("#{}", self.number)).cyan().bold().to_string()
        } else {
            format!("#{}", self.number)
        };
        let title = if color {
            style(&self.title).bold().to_string()
        } else {
            self.title.clone()
        };
        println!("{} {}", heading, title);
        println!();
        print_field("State", &format_state(&self.state, self.closed, color), color);
        print_field("Assigned", &format_optional(self.assigned_user_name.as_deref()), color);
        print_field("Milestone", &format_optional(self.milestone_title.as_deref()), color);
        print_field("Tags", &format_optional(self.tag.as_deref()), color);
        print_field("Reporter", &format_optional(self.creator_name.as_deref()), color);
        print_field("Watchers", &self.watchers_ids.len().to_string(), color);
        print_field("Versions", &self.version.to_string(), color);
        print_field("Created", &format_time(self.created_at), color);
        print_field("Updated", &format_time(self.updated_at), color);
        if !self.url.is_empty() {
            print_field("URL", &self.url, color);
        }
        if !self.attachments.is_empty() {
            let names: Vec<&str> = self.attachments.iter().map(|a| a.filename.as_str()).collect();
            print_field("Attachments", &names.join(", "), color);
        }

        let body = self
            .latest_body
            .as_deref()
            .or(self.original_body.as_deref())
            .or(self.body.as_deref())
            .filter(|b| !b.trim().is_empty());
        if let Some(body) = body {
            println!();
            for line in body.lines() {
                println!("  {}", line);
            }
        }
    }
}

impl TicketCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = global.session()?;
        let project_id = session.project_id().await?;
        let tickets = Tickets::new(session.client(), project_id);

        match &self.command {
            TicketSubcommand::List(args) => self.list(args, &tickets, global).await,
            TicketSubcommand::View(args) => {
                let ticket = tickets.get(args.number).await?;
                global.writer().write(&ticket)
            }
            TicketSubcommand::New => {
                let ticket = tickets.new_template().await?;
                global.writer().write(&ticket)
            }
            TicketSubcommand::Create(args) => {
                self.create(args, &tickets, &session, project_id, global).await
            }
            TicketSubcommand::Update(args) => {
                self.update(args, &tickets, &session, project_id, global).await
            }
            TicketSubcommand::Delete(args) => self.delete(args, &tickets, global).await,
            TicketSubcommand::Attachment(args) => self.attachment(args, &tickets, global).await,
            TicketSubcommand::BulkEdit(args) => {
                let options = args.options()?;
                tickets
                    .bulk_edit(&options)
                    .await
                    .context("Failed to bulk edit tickets")?;
                global.writer().write_success(&format!(
                    "Applied {:?} to tickets matching {:?}",
                    options.command, options.query
                ));
                Ok(())
            }
        }
    }

    async fn list(&self, args: &ListArgs, tickets: &Tickets<'_>, global: &GlobalOptions) -> Result<()> {
        let options = TicketListOptions {
            query: args.query.clone(),
            limit: args.limit,
            page: args.page,
        };
        let found = if args.all {
            tickets.list_all(&options).await?
        } else {
            tickets.list(&options).await?
        };

        let now = Utc::now();
        global.writer().write_table(
            &found,
            ["#", "State", "Title", "Assigned", "Milestone", "Updated"],
            "No tickets found.",
            |t| {
                [
                    t.number.to_string(),
                    t.state.clone(),
                    truncate(&t.title, 60),
                    format_optional(t.assigned_user_name.as_deref()),
                    format_optional(t.milestone_title.as_deref()),
                    t.updated_at
                        .map(|at| format_relative_time(at, now))
                        .unwrap_or_else(|| "-".to_string()),
                ]
            },
        )
    }

    async fn create(
        &self,
        args: &CreateArgs,
        tickets: &Tickets<'_>,
        session: &Session,
        project_id: u64,
        global: &GlobalOptions,
    ) -> Result<()> {
        if args.title.trim().is_empty() {
            bail!("Please specify ticket title with --title");
        }

        let mut input = TicketInput {
            title: args.title.clone(),
            body: args.body.clone().unwrap_or_default(),
            state: args.state.clone(),
            tag: args.tags.clone().unwrap_or_default(),
            notify_all: args.notify_all.then_some(true),
            ..Default::default()
        };
        if let Some(user) = &args.assigned {
            input.assigned_user_id = Some(session.resolve_user(project_id, user).await?);
        }
        if let Some(milestone) = &args.milestone {
            input.milestone_id = Some(session.resolve_milestone(project_id, milestone).await?);
        }
        if let Some(watchers) = &args.watchers {
            input.multiple_watchers = parse_id_list(watchers)?;
        }

        let ticket = tickets.create(&input).await.context("Failed to create ticket")?;

        let writer = global.writer();
        writer.write(&ticket)?;
        if !writer.is_json() {
            writer.write_success(&format!("Created ticket #{}", ticket.number));
        }
        Ok(())
    }

    async fn update(
        &self,
        args: &UpdateArgs,
        tickets: &Tickets<'_>,
        session: &Session,
        project_id: u64,
        global: &GlobalOptions,
    ) -> Result<()> {
        let mut ticket = tickets.get(args.number).await?;
        let mut input = TicketInput::from(&ticket);

        if let Some(title) = &args.title {
            input.title = title.clone();
        }
        if let Some(comment) = &args.comment {
            input.body = comment.clone();
        }
        if let Some(state) = &args.state {
            input.state = Some(state.clone());
        }
        if let Some(user) = &args.assigned {
            input.assigned_user_id = Some(session.resolve_user(project_id, user).await?);
        } else if args.unassign {
            input.assigned_user_id = None;
        }
        if let Some(milestone) = &args.milestone {
            input.milestone_id = Some(session.resolve_milestone(project_id, milestone).await?);
        } else if args.no_milestone {
            input.milestone_id = None;
        }
        if let Some(tags) = &args.tags {
            input.tag = tags.clone();
        }
        if args.notify_all {
            input.notify_all = Some(true);
        }

        tickets
            .update(args.number, &input)
            .await
            .with_context(|| format!("Failed to update ticket #{}", args.number))?;

        apply_input(&mut ticket, &input);
        let writer = global.writer();
        writer.write(&ticket)?;
        if !writer.is_json() {
            writer.write_success(&format!("Updated ticket #{}", args.number));
        }
        Ok(())
    }

    async fn delete(&self, args: &DeleteArgs, tickets: &Tickets<'_>, global: &GlobalOptions) -> Result<()> {
        let writer = global.writer();
        if !args.yes && !confirm_delete(&format!("ticket #{}", args.number))? {
            writer.write_info("Cancelled.");
            return Ok(());
        }

        tickets.delete(args.number).await?;
        writer.write_success(&format!("Deleted ticket #{}", args.number));
        Ok(())
    }

    async fn attachment(&self, args: &AttachmentArgs, tickets: &Tickets<'_>, global: &GlobalOptions) -> Result<()> {
        let ticket = tickets.get(args.number).await?;
        let Some(attachment) = ticket.attachment(&args.filename) else {
            bail!("No attachment named {:?} on ticket #{}", args.filename, args.number);
        };

        let contents = tickets
            .get_attachment(attachment)
            .await
            .with_context(|| format!("Failed to download {}", attachment.filename))?;

        match &args.output {
            Some(path) => {
                std::fs::write(path, &contents)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                global
                    .writer()
                    .write_success(&format!("Saved {} to {}", attachment.filename, path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&contents)?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

/// Mirrors a successful update onto the locally held ticket, since the
/// update response carries no body.
fn apply_input(ticket: &mut Ticket, input: &TicketInput) {
    ticket.title = input.title.clone();
    if let Some(state) = &input.state {
        ticket.state = state.clone();
    }
    if ticket.assigned_user_id != input.assigned_user_id {
        ticket.assigned_user_id = input.assigned_user_id;
        ticket.assigned_user_name = None;
    }
    if ticket.milestone_id != input.milestone_id {
        ticket.milestone_id = input.milestone_id;
        ticket.milestone_title = None;
    }
    ticket.tag = Some(input.tag.clone()).filter(|t| !t.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_input_clears_stale_names() {
        let mut ticket = Ticket {
            number: 3,
            title: "Old".into(),
            state: "new".into(),
            assigned_user_id: Some(7),
            assigned_user_name: Some("Ada".into()),
            milestone_id: Some(2),
            milestone_title: Some("1.0".into()),
            ..Default::default()
        };
        let input = TicketInput {
            title: "New".into(),
            state: Some("open".into()),
            assigned_user_id: None,
            milestone_id: Some(2),
            tag: "ui crash".into(),
            ..Default::default()
        };

        apply_input(&mut ticket, &input);

        assert_eq!(ticket.title, "New");
        assert_eq!(ticket.state, "open");
        assert_eq!(ticket.assigned_user_id, None);
        assert_eq!(ticket.assigned_user_name, None);
        assert_eq!(ticket.milestone_title.as_deref(), Some("1.0"));
        assert_eq!(ticket.tag.as_deref(), Some("ui crash"));
    }

    fn bulk_edit(args: &[&str]) -> Result<BulkEditArgs, clap::Error> {
        #[derive(clap::Parser)]
        struct Harness {
            #[command(flatten)]
            args: BulkEditArgs,
        }
        let argv = std::iter::once("bulk-edit").chain(args.iter().copied());
        <Harness as clap::Parser>::try_parse_from(argv).map(|h| h.args)
    }

    #[test]
    fn test_bulk_edit_all_becomes_query() {
        let args = bulk_edit(&["--all", "--command", "state:resolved"]).unwrap();
        let options = args.options().unwrap();
        assert_eq!(options.query, "all");
        assert_eq!(options.migration_token, None);
    }

    #[test]
    fn test_bulk_edit_usage_checks() {
        assert!(bulk_edit(&["--all", "-q", "state:open", "--command", "x"]).is_err());
        assert!(bulk_edit(&["--command", "state:resolved"]).is_err());
        assert!(bulk_edit(&["-q", "state:open"]).is_err());

        let blank = bulk_edit(&["-q", "state:open", "--command", " "]).unwrap();
        assert!(blank.options().is_err());
    }
}
