//
//  lighthouse-cli
//  cli/project.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project commands
//!
//! Projects are addressed by numeric ID or by name. Commands that take an
//! optional project argument fall back to the global `--project`.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::api::{Membership, Project, ProjectInput, Projects};
use crate::context::{Session, MISSING_PROJECT};
use crate::interactive::confirm_delete;
use crate::output::{format_bool, format_optional, print_field, TableOutput};
use crate::util::{format_time, truncate};

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectSubcommand {
    /// List projects
    #[command(visible_alias = "ls")]
    List,

    /// Show a project
    View(ProjectArg),

    /// Show the defaults Lighthouse uses for a new project
    New,

    /// Create a project
    Create(CreateArgs),

    /// Update a project
    #[command(visible_alias = "edit")]
    Update(UpdateArgs),

    /// Delete a project
    Delete(DeleteArgs),

    /// List a project's members
    #[command(visible_alias = "memberships")]
    Members(ProjectArg),
}

#[derive(Args, Debug)]
pub struct ProjectArg {
    /// Project ID or name (defaults to --project)
    pub project: Option<String>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project name
    #[arg(long)]
    pub name: String,

    /// Make the project public
    #[arg(long)]
    pub public: bool,

    /// Create the project archived
    #[arg(long)]
    pub archived: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Project ID or name (defaults to --project)
    pub project: Option<String>,

    /// New project name
    #[arg(long)]
    pub name: Option<String>,

    /// Set whether the project is public
    #[arg(long, value_name = "BOOL")]
    pub public: Option<bool>,

    /// Set whether the project is archived
    #[arg(long, value_name = "BOOL")]
    pub archived: Option<bool>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Project ID or name (defaults to --project)
    pub project: Option<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl TableOutput for Project {
    fn print_table(&self, color: bool) {
        let name = if color {
            style(&self.name).bold().to_string()
        } else {
            self.name.clone()
        };
        println!("{} (#{})", name, self.id);
        println!();
        print_field("Permalink", &self.permalink, color);
        print_field("Public", &format_bool(self.public, color), color);
        print_field("Archived", &format_bool(self.archived, color), color);
        print_field("Open tickets", &self.open_tickets_count.to_string(), color);
        print_field("Open states", &self.open_states_list.to_string(), color);
        print_field("Closed states", &self.closed_states_list.to_string(), color);
        print_field("Created", &format_time(self.created_at), color);
        print_field("Updated", &format_time(self.updated_at), color);

        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            println!();
            println!("{}", description);
        }
    }
}

impl ProjectCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = global.session()?;
        match &self.command {
            ProjectSubcommand::List => self.list(&session, global).await,
            ProjectSubcommand::View(args) => self.view(args, &session, global).await,
            ProjectSubcommand::New => self.new_template(&session, global).await,
            ProjectSubcommand::Create(args) => self.create(args, &session, global).await,
            ProjectSubcommand::Update(args) => self.update(args, &session, global).await,
            ProjectSubcommand::Delete(args) => self.delete(args, &session, global).await,
            ProjectSubcommand::Members(args) => self.members(args, &session, global).await,
        }
    }

    async fn project_id(&self, arg: Option<&str>, session: &Session) -> Result<u64> {
        match arg.or(session.project()) {
            Some(project) => session.resolve_project(project).await,
            None => Err(anyhow::anyhow!(MISSING_PROJECT)),
        }
    }

    async fn list(&self, session: &Session, global: &GlobalOptions) -> Result<()> {
        let projects = Projects::new(session.client()).list().await?;
        global.writer().write_table(
            &projects,
            ["ID", "Name", "Open", "Public", "Archived", "Description"],
            "No projects found.",
            |p| {
                [
                    p.id.to_string(),
                    p.name.clone(),
                    p.open_tickets_count.to_string(),
                    format_bool(p.public, false),
                    format_bool(p.archived, false),
                    truncate(p.description.as_deref().unwrap_or_default(), 50),
                ]
            },
        )
    }

    async fn view(&self, args: &ProjectArg, session: &Session, global: &GlobalOptions) -> Result<()> {
        let id = self.project_id(args.project.as_deref(), session).await?;
        let project = Projects::new(session.client()).get(id).await?;
        global.writer().write(&project)
    }

    async fn new_template(&self, session: &Session, global: &GlobalOptions) -> Result<()> {
        let project = Projects::new(session.client()).new_template().await?;
        global.writer().write(&project)
    }

    async fn create(&self, args: &CreateArgs, session: &Session, global: &GlobalOptions) -> Result<()> {
        let input = ProjectInput {
            name: args.name.clone(),
            archived: args.archived,
            public: args.public,
        };
        let project = Projects::new(session.client())
            .create(&input)
            .await
            .context("Failed to create project")?;

        let writer = global.writer();
        writer.write(&project)?;
        if !writer.is_json() {
            writer.write_success(&format!("Created project {} (#{})", project.name, project.id));
        }
        Ok(())
    }

    async fn update(&self, args: &UpdateArgs, session: &Session, global: &GlobalOptions) -> Result<()> {
        let id = self.project_id(args.project.as_deref(), session).await?;
        let projects = Projects::new(session.client());
        let mut project = projects.get(id).await?;

        if let Some(name) = &args.name {
            project.name = name.clone();
        }
        if let Some(public) = args.public {
            project.public = public;
        }
        if let Some(archived) = args.archived {
            project.archived = archived;
        }

        projects
            .update(id, &ProjectInput::from(&project))
            .await
            .with_context(|| format!("Failed to update project #{id}"))?;

        let writer = global.writer();
        writer.write(&project)?;
        if !writer.is_json() {
            writer.write_success(&format!("Updated project #{}", id));
        }
        Ok(())
    }

    async fn delete(&self, args: &DeleteArgs, session: &Session, global: &GlobalOptions) -> Result<()> {
        let id = self.project_id(args.project.as_deref(), session).await?;
        let writer = global.writer();

        if !args.yes && !confirm_delete(&format!("project #{id}"))? {
            writer.write_info("Cancelled.");
            return Ok(());
        }

        Projects::new(session.client()).delete(id).await?;
        writer.write_success(&format!("Deleted project #{}", id));
        Ok(())
    }

    async fn members(&self, args: &ProjectArg, session: &Session, global: &GlobalOptions) -> Result<()> {
        let id = self.project_id(args.project.as_deref(), session).await?;
        let memberships = Projects::new(session.client()).memberships(id).await?;
        global.writer().write_table(
            &memberships,
            ["User ID", "Name", "Job"],
            "No members found.",
            member_row,
        )
    }
}

/// One table row for a membership, shared with `lh user memberships`.
pub(crate) fn member_row(membership: &Membership) -> [String; 3] {
    let user = membership.user.as_ref();
    [
        membership.user_id.to_string(),
        format_optional(user.map(|u| u.name.as_str())),
        format_optional(user.and_then(|u| u.job.as_deref())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemberUser;

    #[test]
    fn test_member_row_without_user() {
        let membership = Membership {
            id: 1,
            user_id: 7,
            ..Default::default()
        };
        assert_eq!(member_row(&membership), ["7".to_string(), "-".into(), "-".into()]);
    }

    #[test]
    fn test_member_row_with_user() {
        let membership = Membership {
            id: 1,
            user_id: 7,
            user: Some(MemberUser {
                id: 7,
                name: "Ada Lovelace".into(),
                job: Some("Analyst".into()),
                ..Default::default()
            }),
            account: None,
        };
        assert_eq!(member_row(&membership)[1], "Ada Lovelace");
        assert_eq!(member_row(&membership)[2], "Analyst");
    }
}
