//
//  lighthouse-cli
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod bin;
mod changeset;
mod completion;
mod message;
mod milestone;
mod profile;
mod project;
mod ticket;
mod token;
mod user;

pub use bin::BinCommand;
pub use changeset::ChangesetCommand;
pub use completion::CompletionCommand;
pub use message::MessageCommand;
pub use milestone::MilestoneCommand;
pub use profile::ProfileCommand;
pub use project::ProjectCommand;
pub use ticket::TicketCommand;
pub use token::TokenCommand;
pub use user::UserCommand;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::context::{ContextResolver, Session};
use crate::output::{OutputFormat, OutputWriter};

/// Lighthouse command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "lh",
    version,
    about = "Work with Lighthouse from the command line",
    long_about = "lh provides CLI access to the Lighthouse API.\n\n\
                  Specify your account name via -a, --account, LH_ACCOUNT or the config file. \
                  If your Lighthouse URL is https://acme.lighthouseapp.com the account is 'acme'.\n\n\
                  Authenticate with an API token (-t, --token, LH_TOKEN) or with --email and \
                  --password. A password of the form '@FILE' is read from FILE.\n\n\
                  Project-scoped commands need a project via -p, --project, LH_PROJECT or the \
                  config file.",
    propagate_version = true,
    after_help = "Use 'lh <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Options accepted by every command.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Lighthouse account name
    #[arg(long, short = 'a', global = true, env = "LH_ACCOUNT")]
    pub account: Option<String>,

    /// Lighthouse API token
    #[arg(long, short = 't', global = true, env = "LH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Send the token as the Basic Auth username
    #[arg(
        long,
        global = true,
        env = "LH_TOKEN_AS_BASIC_AUTH",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub token_as_basic_auth: Option<bool>,

    /// Send the token as the _token query parameter
    #[arg(
        long,
        global = true,
        env = "LH_TOKEN_AS_PARAMETER",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub token_as_parameter: Option<bool>,

    /// Lighthouse email (ignored when a token is given)
    #[arg(long, global = true, env = "LH_EMAIL")]
    pub email: Option<String>,

    /// Lighthouse password, or @FILE to read it from FILE
    #[arg(long, global = true, env = "LH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Project ID or name
    #[arg(long, short = 'p', global = true, env = "LH_PROJECT")]
    pub project: Option<String>,

    /// Config file (default is the platform config dir, e.g. ~/.config/lh/config.toml)
    #[arg(long, global = true, env = "LH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Minimum milliseconds between requests, 0 disables rate limiting
    #[arg(long, global = true, env = "LH_RATE_LIMIT_INTERVAL_MS", value_name = "MS")]
    pub rate_limit_interval_ms: Option<u64>,

    /// Requests allowed back to back before the interval applies
    #[arg(long, global = true, env = "LH_RATE_LIMIT_BURST", value_name = "N")]
    pub rate_limit_burst: Option<u32>,

    /// Retry requests rejected with 429 Too Many Requests
    #[arg(long, global = true, env = "LH_RETRY", value_name = "BOOL")]
    pub retry: Option<bool>,

    /// Maximum attempts per request when retrying
    #[arg(long, global = true, env = "LH_RETRY_ATTEMPTS", value_name = "N")]
    pub retry_attempts: Option<u32>,

    /// Longest Retry-After wait to honour, in seconds
    #[arg(long, global = true, env = "LH_RETRY_MAX_AFTER_SECS", value_name = "SECS")]
    pub retry_max_after_secs: Option<u64>,

    /// Extra seconds to wait on top of Retry-After
    #[arg(long, global = true, env = "LH_RETRY_MARGIN_SECS", value_name = "SECS")]
    pub retry_margin_secs: Option<u64>,

    /// Override the API base URL
    #[arg(long, global = true, env = "LH_BASE_URL", hide = true)]
    pub base_url: Option<String>,

    /// Cancelled on Ctrl-C; every client built from these options observes it.
    #[arg(skip)]
    pub cancel: CancellationToken,
}

impl GlobalOptions {
    /// Output format selected by `--json`.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }

    pub fn writer(&self) -> OutputWriter {
        OutputWriter::new(self.output_format())
    }

    /// Loads the config file and resolves an authenticated session.
    pub fn session(&self) -> Result<Session> {
        ContextResolver::from_options(self)?.resolve(self)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Work with projects
    #[command(visible_alias = "proj")]
    Project(ProjectCommand),

    /// Work with tickets (requires -p)
    #[command(visible_alias = "t")]
    Ticket(TicketCommand),

    /// Work with milestones (requires -p)
    #[command(visible_alias = "ms")]
    Milestone(MilestoneCommand),

    /// Work with ticket bins (requires -p)
    Bin(BinCommand),

    /// Work with messages (requires -p)
    #[command(visible_alias = "msg")]
    Message(MessageCommand),

    /// Work with changesets (requires -p)
    Changeset(ChangesetCommand),

    /// Work with users
    User(UserCommand),

    /// Inspect API tokens
    Token(TokenCommand),

    /// Show the authenticated user
    Profile(ProfileCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),

    /// Print version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "lh", "ticket", "list", "-a", "acme", "-p", "Widgets", "--json", "--retry", "false",
        ])
        .unwrap();

        assert_eq!(cli.global.account.as_deref(), Some("acme"));
        assert_eq!(cli.global.project.as_deref(), Some("Widgets"));
        assert_eq!(cli.global.retry, Some(false));
        assert_eq!(cli.global.output_format(), OutputFormat::Json);
    }

    #[test]
    fn test_token_mode_flags_take_optional_value() {
        let cli = Cli::try_parse_from(["lh", "--token-as-basic-auth", "profile"]).unwrap();
        assert_eq!(cli.global.token_as_basic_auth, Some(true));
        assert_eq!(cli.global.token_as_parameter, None);

        let cli = Cli::try_parse_from(["lh", "profile", "--token-as-basic-auth=false"]).unwrap();
        assert_eq!(cli.global.token_as_basic_auth, Some(false));
    }
}
