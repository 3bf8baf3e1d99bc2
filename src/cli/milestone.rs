//
//  lighthouse-cli
//  cli/milestone.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Milestone commands (require `--project`)

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::api::{Milestone, MilestoneInput, Milestones};
use crate::context::Session;
use crate::interactive::confirm_delete;
use crate::output::{format_bool, print_field, TableOutput};
use crate::util::{format_date, format_time, parse_date, truncate};

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct MilestoneCommand {
    #[command(subcommand)]
    pub command: MilestoneSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum MilestoneSubcommand {
    /// List milestones
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show a milestone
    View(MilestoneArg),

    /// Show the defaults Lighthouse uses for a new milestone
    New,

    /// Create a milestone
    Create(CreateArgs),

    /// Update a milestone
    #[command(visible_alias = "edit")]
    Update(UpdateArgs),

    /// Mark a milestone as completed
    Close(MilestoneArg),

    /// Reopen a completed milestone
    Open(MilestoneArg),

    /// Delete a milestone
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page number, starting at 1
    #[arg(long, conflicts_with = "all")]
    pub page: Option<u32>,

    /// Fetch every page
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct MilestoneArg {
    /// Milestone ID or title
    pub milestone: String,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Milestone title
    #[arg(long)]
    pub title: String,

    /// Milestone goals
    #[arg(long)]
    pub goals: Option<String>,

    /// Due date, YYYY-MM-DD
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Milestone ID or title
    pub milestone: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New goals
    #[arg(long)]
    pub goals: Option<String>,

    /// New due date, YYYY-MM-DD
    #[arg(long, conflicts_with = "no_due")]
    pub due: Option<String>,

    /// Remove the due date
    #[arg(long)]
    pub no_due: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Milestone ID or title
    pub milestone: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl TableOutput for Milestone {
    fn print_table(&self, color: bool) {
        let title = if color {
            style(&self.title).bold().to_string()
        } else {
            self.title.clone()
        };
        println!("{} (#{})", title, self.id);
        println!();
        print_field("Due", &format_date(self.due_on), color);
        print_field("Completed", &format_bool(self.is_completed(), color), color);
        print_field(
            "Tickets",
            &format!("{} open of {}", self.open_tickets_count, self.tickets_count),
            color,
        );
        print_field("Created", &format_time(self.created_at), color);
        print_field("Updated", &format_time(self.updated_at), color);
        if !self.url.is_empty() {
            print_field("URL", &self.url, color);
        }

        if let Some(goals) = self.goals.as_deref().filter(|g| !g.trim().is_empty()) {
            println!();
            for line in goals.lines() {
                println!("  {}", line);
            }
        }
    }
}

impl MilestoneCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = global.session()?;
        let project_id = session.project_id().await?;
        let milestones = Milestones::new(session.client(), project_id);
        let writer = global.writer();

        match &self.command {
            MilestoneSubcommand::List(args) => {
                let found = if args.all {
                    milestones.list_all().await?
                } else {
                    milestones.list(args.page).await?
                };
                writer.write_table(
                    &found,
                    ["ID", "Title", "Due", "Open", "Total", "Completed"],
                    "No milestones found.",
                    |m| {
                        [
                            m.id.to_string(),
                            truncate(&m.title, 50),
                            format_date(m.due_on),
                            m.open_tickets_count.to_string(),
                            m.tickets_count.to_string(),
                            format_bool(m.is_completed(), false),
                        ]
                    },
                )
            }
            MilestoneSubcommand::View(args) => {
                let id = session.resolve_milestone(project_id, &args.milestone).await?;
                writer.write(&milestones.get(id).await?)
            }
            MilestoneSubcommand::New => writer.write(&milestones.new_template().await?),
            MilestoneSubcommand::Create(args) => self.create(args, &milestones, global).await,
            MilestoneSubcommand::Update(args) => {
                self.update(args, &milestones, &session, project_id, global).await
            }
            MilestoneSubcommand::Close(args) => {
                let id = session.resolve_milestone(project_id, &args.milestone).await?;
                milestones.close(id).await?;
                writer.write_success(&format!("Closed milestone #{}", id));
                Ok(())
            }
            MilestoneSubcommand::Open(args) => {
                let id = session.resolve_milestone(project_id, &args.milestone).await?;
                milestones.open(id).await?;
                writer.write_success(&format!("Reopened milestone #{}", id));
                Ok(())
            }
            MilestoneSubcommand::Delete(args) => {
                let id = session.resolve_milestone(project_id, &args.milestone).await?;
                if !args.yes && !confirm_delete(&format!("milestone #{id}"))? {
                    writer.write_info("Cancelled.");
                    return Ok(());
                }
                milestones.delete(id).await?;
                writer.write_success(&format!("Deleted milestone #{}", id));
                Ok(())
            }
        }
    }

    async fn create(&self, args: &CreateArgs, milestones: &Milestones<'_>, global: &GlobalOptions) -> Result<()> {
        if args.title.trim().is_empty() {
            bail!("Please specify milestone title with --title");
        }
        let input = MilestoneInput {
            title: args.title.clone(),
            goals: args.goals.clone().unwrap_or_default(),
            due_on: args.due.as_deref().map(parse_date).transpose()?,
        };

        let milestone = milestones
            .create(&input)
            .await
            .context("Failed to create milestone")?;

        let writer = global.writer();
        writer.write(&milestone)?;
        if !writer.is_json() {
            writer.write_success(&format!("Created milestone {} (#{})", milestone.title, milestone.id));
        }
        Ok(())
    }

    async fn update(
        &self,
        args: &UpdateArgs,
        milestones: &Milestones<'_>,
        session: &Session,
        project_id: u64,
        global: &GlobalOptions,
    ) -> Result<()> {
        let id = session.resolve_milestone(project_id, &args.milestone).await?;
        let mut milestone = milestones.get(id).await?;

        if let Some(title) = &args.title {
            milestone.title = title.clone();
        }
        if let Some(goals) = &args.goals {
            milestone.goals = Some(goals.clone());
        }
        if let Some(due) = &args.due {
            milestone.due_on = Some(parse_date(due)?);
        } else if args.no_due {
            milestone.due_on = None;
        }

        milestones
            .update(id, &MilestoneInput::from(&milestone))
            .await
            .with_context(|| format!("Failed to update milestone #{id}"))?;

        let writer = global.writer();
        writer.write(&milestone)?;
        if !writer.is_json() {
            writer.write_success(&format!("Updated milestone #{}", id));
        }
        Ok(())
    }
}
