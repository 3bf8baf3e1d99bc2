//
//  lighthouse-cli
//  cli/profile.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Profile command

use anyhow::Result;
use clap::Args;

use crate::api::Profile;

use super::GlobalOptions;

/// Shows the user the credential belongs to.
#[derive(Args, Debug)]
pub struct ProfileCommand {}

impl ProfileCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = global.session()?;
        let user = Profile::new(session.client()).get().await?;
        global.writer().write(&user)
    }
}
