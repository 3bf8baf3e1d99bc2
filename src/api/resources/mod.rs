//
//  lighthouse-cli
//  api/resources/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Typed services for each Lighthouse resource.
//!
//! Every service borrows a [`LighthouseClient`](crate::api::LighthouseClient);
//! project-scoped services also take the project ID. Creates expect
//! `201 Created`, everything else expects `200 OK`.
//!
//! # Example
//!
//! ```rust,no_run
//! use lighthouse_cli::api::{LighthouseClient, Tickets, TicketListOptions};
//!
//! # async fn example(client: &LighthouseClient) -> Result<(), lighthouse_cli::api::ApiError> {
//! let open = Tickets::new(client, 42)
//!     .list(&TicketListOptions {
//!         query: Some("state:open".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! for ticket in open {
//!     println!("#{} {}", ticket.number, ticket.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bins;
pub mod changesets;
pub mod messages;
pub mod milestones;
pub mod projects;
pub mod tickets;
pub mod users;

pub use bins::{Bin, BinInput, Bins};
pub use changesets::{Change, Changeset, ChangesetInput, Changesets};
pub use messages::{Comment, Message, MessageInput, Messages};
pub use milestones::{Milestone, MilestoneInput, Milestones};
pub use projects::{CommaList, MemberUser, Membership, Project, ProjectInput, Projects, Todos};
pub use tickets::{
    AlphabeticalTag, Attachment, BulkEditOptions, DiffableAttributes, Tag, Ticket, TicketInput,
    TicketListOptions, TicketVersion, Tickets,
};
pub use users::{ActiveTicket, Profile, Token, Tokens, User, UserInput, Users};
