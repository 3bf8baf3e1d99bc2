//
//  lighthouse-cli
//  cli/changeset.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Changeset commands (require `--project`)

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Args, Subcommand};
use console::style;

use crate::api::{Change, Changeset, ChangesetInput, Changesets};
use crate::interactive::confirm_delete;
use crate::output::{format_optional, print_field, TableOutput};
use crate::util::{format_time, truncate};

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct ChangesetCommand {
    #[command(subcommand)]
    pub command: ChangesetSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ChangesetSubcommand {
    /// List changesets
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show a changeset
    View(RevisionArg),

    /// Show the defaults Lighthouse uses for a new changeset
    New,

    /// Record a changeset
    Create(CreateArgs),

    /// Delete a changeset
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
pub struct RevisionArg {
    /// Changeset revision
    pub revision: String,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Changeset revision
    #[arg(long)]
    pub revision: String,

    /// Changeset title
    #[arg(long)]
    pub title: String,

    /// Changeset body
    #[arg(long)]
    pub body: Option<String>,

    /// Comma-separated changes 'OP PATH, OP PATH'
    #[arg(long)]
    pub changes: String,

    /// Commit time in UTC, 'YYYY-MM-DD HH:MM:SS'
    #[arg(long)]
    pub time: Option<String>,

    /// Committer (user ID or name)
    #[arg(long)]
    pub user: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Changeset revision
    pub revision: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl TableOutput for Changeset {
    fn print_table(&self, color: bool) {
        let revision = if color {
            style(&self.revision).yellow().to_string()
        } else {
            self.revision.clone()
        };
        println!("{} {}", revision, self.title);
        println!();
        print_field("Committer", &format_optional(self.committer.as_deref()), color);
        print_field(
            "Ticket",
            &self.ticket_id.map(|t| format!("#{t}")).unwrap_or_else(|| "-".into()),
            color,
        );
        print_field("Changed", &format_time(self.changed_at), color);

        if let Some(body) = self.body.as_deref().filter(|b| !b.trim().is_empty()) {
            println!();
            for line in body.lines() {
                println!("  {}", line);
            }
        }

        if !self.changes.is_empty() {
            println!();
            for change in &self.changes {
                println!("  {} {}", change.operation, change.path);
            }
        }
    }
}

impl ChangesetCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = global.session()?;
        let project_id = session.project_id().await?;
        let changesets = Changesets::new(session.client(), project_id);
        let writer = global.writer();

        match &self.command {
            ChangesetSubcommand::List(args) => {
                let found = if args.all {
                    changesets.list_all().await?
                } else {
                    changesets.list(args.page).await?
                };
                writer.write_table(
                    &found,
                    ["Revision", "Title", "Committer", "Changes", "Changed"],
                    "No changesets found.",
                    |c| {
                        [
                            truncate(&c.revision, 12),
                            truncate(&c.title, 60),
                            format_optional(c.committer.as_deref()),
                            c.changes.len().to_string(),
                            format_time(c.changed_at),
                        ]
                    },
                )
            }
            ChangesetSubcommand::View(args) => writer.write(&changesets.get(&args.revision).await?),
            ChangesetSubcommand::New => writer.write(&changesets.new_template().await?),
            ChangesetSubcommand::Create(args) => {
                if args.revision.trim().is_empty() {
                    bail!("Please specify changeset revision with --revision");
                }
                if args.title.trim().is_empty() {
                    bail!("Please specify changeset title with --title");
                }

                let mut input = ChangesetInput {
                    revision: args.revision.clone(),
                    title: args.title.clone(),
                    body: args.body.clone().unwrap_or_default(),
                    changes: parse_changes(&args.changes)?,
                    changed_at: args.time.as_deref().map(parse_timestamp).transpose()?,
                    ..Default::default()
                };
                if let Some(user) = &args.user {
                    input.user_id = Some(session.resolve_user(project_id, user).await?);
                }

                let changeset = changesets
                    .create(&input)
                    .await
                    .context("Failed to create changeset")?;
                writer.write(&changeset)?;
                if !writer.is_json() {
                    writer.write_success(&format!("Recorded changeset {}", changeset.revision));
                }
                Ok(())
            }
            ChangesetSubcommand::Delete(args) => {
                if !args.yes && !confirm_delete(&format!("changeset {}", args.revision))? {
                    writer.write_info("Cancelled.");
                    return Ok(());
                }
                changesets.delete(&args.revision).await?;
                writer.write_success(&format!("Deleted changeset {}", args.revision));
                Ok(())
            }
        }
    }
}

/// Parses `"M src/a.rs, A README"` into changes.
fn parse_changes(s: &str) -> Result<Vec<Change>> {
    let mut changes = Vec::new();
    for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((operation, path)) = entry.split_once(char::is_whitespace) else {
            bail!("Unable to parse change {entry:?}, expected 'OP PATH'");
        };
        changes.push(Change {
            operation: operation.to_string(),
            path: path.trim().to_string(),
        });
    }
    if changes.is_empty() {
        bail!("Please specify changeset changes with --changes");
    }
    Ok(changes)
}

/// Parses a 24-hour `YYYY-MM-DD HH:MM:SS` timestamp as UTC.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("Invalid time {s:?}, expected 'YYYY-MM-DD HH:MM:SS'"))?;
    Ok(naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_changes() {
        let changes = parse_changes("M src/main.rs, A  docs/read me.md").unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].operation, "M");
        assert_eq!(changes[0].path, "src/main.rs");
        assert_eq!(changes[1].path, "docs/read me.md");
    }

    #[test]
    fn test_parse_changes_rejects_bad_entries() {
        assert!(parse_changes("M").is_err());
        assert!(parse_changes(" , ").is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(
            parse_timestamp("2026-10-19 08:30:00").unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap()
        );
        assert!(parse_timestamp("2026-10-19").is_err());
    }
}
