//
//  lighthouse-cli
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lighthouse_cli::api::ApiError;
use lighthouse_cli::cli::{Cli, Commands};
use lighthouse_cli::exit_codes;

#[tokio::main]
async fn main() {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(exit_codes::for_parse_error(&e));
        }
    };

    // Ctrl-C cancels rate limit and backoff waits in every client
    let cancel = cli.global.cancel.clone();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupted, cancelling outstanding requests");
            trigger.cancel();
        }
    });

    // An in-flight request is dropped rather than awaited once cancelled
    let result = tokio::select! {
        result = run(cli) => result,
        _ = cancel.cancelled() => Err(ApiError::Cancelled.into()),
    };

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_codes::for_error(&e));
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("LH_DEBUG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Project(cmd) => cmd.run(&cli.global).await,
        Commands::Ticket(cmd) => cmd.run(&cli.global).await,
        Commands::Milestone(cmd) => cmd.run(&cli.global).await,
        Commands::Bin(cmd) => cmd.run(&cli.global).await,
        Commands::Message(cmd) => cmd.run(&cli.global).await,
        Commands::Changeset(cmd) => cmd.run(&cli.global).await,
        Commands::User(cmd) => cmd.run(&cli.global).await,
        Commands::Token(cmd) => cmd.run(&cli.global).await,
        Commands::Profile(cmd) => cmd.run(&cli.global).await,
        Commands::Completion(cmd) => cmd.run(&cli.global).await,
        Commands::Version => {
            println!("{} version {}", lighthouse_cli::APP_NAME, lighthouse_cli::VERSION);
            Ok(())
        }
    }
}
