//
//  lighthouse-cli
//  cli/message.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Message commands (require `--project`)

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::api::{Message, MessageInput, Messages};
use crate::interactive::confirm_delete;
use crate::output::{format_optional, print_field, TableOutput};
use crate::util::{format_time, truncate};

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct MessageCommand {
    #[command(subcommand)]
    pub command: MessageSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum MessageSubcommand {
    /// List messages
    #[command(visible_alias = "ls")]
    List,

    /// Show a message and its comments
    View(MessageArg),

    /// Show the defaults Lighthouse uses for a new message
    New,

    /// Post a message
    Create(CreateArgs),

    /// Update a message
    #[command(visible_alias = "edit")]
    Update(UpdateArgs),

    /// Comment on a message
    Comment(CommentArgs),

    /// Delete a message
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct MessageArg {
    /// Message ID or title
    pub message: String,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Message title
    #[arg(long)]
    pub title: String,

    /// Message body
    #[arg(long)]
    pub body: String,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Message ID or title
    pub message: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New body
    #[arg(long)]
    pub body: Option<String>,
}

#[derive(Args, Debug)]
pub struct CommentArgs {
    /// Message ID or title
    pub message: String,

    /// Comment text
    #[arg(long)]
    pub body: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Message ID or title
    pub message: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl TableOutput for Message {
    fn print_table(&self, color: bool) {
        let title = if color {
            style(&self.title).bold().to_string()
        } else {
            self.title.clone()
        };
        println!("{} (#{})", title, self.id);
        println!();
        print_field("Author", &format_optional(self.user_name.as_deref()), color);
        print_field("Comments", &self.comments_count.to_string(), color);
        print_field("Created", &format_time(self.created_at), color);
        if !self.url.is_empty() {
            print_field("URL", &self.url, color);
        }

        if let Some(body) = self.body.as_deref().filter(|b| !b.trim().is_empty()) {
            println!();
            for line in body.lines() {
                println!("  {}", line);
            }
        }

        for comment in &self.comments {
            let author = format_optional(comment.user_name.as_deref());
            let author = if color {
                style(author).cyan().bold().to_string()
            } else {
                author
            };
            println!();
            println!("  {} commented {}", author, format_time(comment.created_at));
            for line in comment.body.as_deref().unwrap_or_default().lines() {
                println!("    {}", line);
            }
        }
    }
}

impl MessageCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = global.session()?;
        let project_id = session.project_id().await?;
        let messages = Messages::new(session.client(), project_id);
        let writer = global.writer();

        match &self.command {
            MessageSubcommand::List => {
                let found = messages.list().await?;
                writer.write_table(
                    &found,
                    ["ID", "Title", "Author", "Comments", "Created"],
                    "No messages found.",
                    |m| {
                        [
                            m.id.to_string(),
                            truncate(&m.title, 60),
                            format_optional(m.user_name.as_deref()),
                            m.comments_count.to_string(),
                            format_time(m.created_at),
                        ]
                    },
                )
            }
            MessageSubcommand::View(args) => {
                let id = session.resolve_message(project_id, &args.message).await?;
                writer.write(&messages.get(id).await?)
            }
            MessageSubcommand::New => writer.write(&messages.new_template().await?),
            MessageSubcommand::Create(args) => {
                if args.title.trim().is_empty() {
                    bail!("Please specify message title with --title");
                }
                let input = MessageInput {
                    title: args.title.clone(),
                    body: args.body.clone(),
                };
                let message = messages.create(&input).await.context("Failed to create message")?;
                writer.write(&message)?;
                if !writer.is_json() {
                    writer.write_success(&format!("Posted message #{}", message.id));
                }
                Ok(())
            }
            MessageSubcommand::Update(args) => {
                let id = session.resolve_message(project_id, &args.message).await?;
                let mut message = messages.get(id).await?;
                if let Some(title) = &args.title {
                    message.title = title.clone();
                }
                if let Some(body) = &args.body {
                    message.body = Some(body.clone());
                }
                messages
                    .update(id, &MessageInput::from(&message))
                    .await
                    .with_context(|| format!("Failed to update message #{id}"))?;
                writer.write(&message)?;
                if !writer.is_json() {
                    writer.write_success(&format!("Updated message #{}", id));
                }
                Ok(())
            }
            MessageSubcommand::Comment(args) => {
                if args.body.trim().is_empty() {
                    bail!("Please specify comment text with --body");
                }
                let id = session.resolve_message(project_id, &args.message).await?;
                let input = MessageInput {
                    title: String::new(),
                    body: args.body.clone(),
                };
                let message = messages
                    .create_comment(id, &input)
                    .await
                    .with_context(|| format!("Failed to comment on message #{id}"))?;
                writer.write(&message)?;
                if !writer.is_json() {
                    writer.write_success(&format!("Commented on message #{}", id));
                }
                Ok(())
            }
            MessageSubcommand::Delete(args) => {
                let id = session.resolve_message(project_id, &args.message).await?;
                if !args.yes && !confirm_delete(&format!("message #{id}"))? {
                    writer.write_info("Cancelled.");
                    return Ok(());
                }
                messages.delete(id).await?;
                writer.write_success(&format!("Deleted message #{}", id));
                Ok(())
            }
        }
    }
}
