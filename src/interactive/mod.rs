//
//  lighthouse-cli
//  interactive/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Interactive prompts.
//!
//! Wraps `dialoguer` so destructive commands can ask before acting. Every
//! prompt has a flag that skips it (`--yes`), so scripts never block.

use anyhow::{bail, Result};
use console::Term;
use dialoguer::Confirm;

/// Asks whether to delete `what`, defaulting to no.
///
/// # Errors
///
/// Fails when stdin is not a terminal, since nobody could answer.
pub fn confirm_delete(what: &str) -> Result<bool> {
    if !Term::stderr().is_term() {
        bail!("Refusing to delete {what} without confirmation; pass --yes to skip the prompt");
    }
    let confirmed = Confirm::new()
        .with_prompt(format!("Delete {what}?"))
        .default(false)
        .interact()?;
    Ok(confirmed)
}
