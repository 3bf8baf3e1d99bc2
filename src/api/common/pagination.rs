//
//  lighthouse-cli
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pagination Helpers for Lighthouse List Endpoints
//!
//! Lighthouse list endpoints take a 1-indexed `page` query parameter and do not
//! report a total count or a next link. The only way to know that every item has
//! been seen is to keep requesting pages until one comes back empty.
//!
//! # Example
//!
//! ```rust,no_run
//! use lighthouse_cli::api::common::collect_pages;
//! use lighthouse_cli::api::{LighthouseClient, Tickets, TicketListOptions};
//!
//! # async fn example(client: &LighthouseClient) -> Result<(), lighthouse_cli::api::ApiError> {
//! let tickets = Tickets::new(client, 42);
//! let all = collect_pages(|page| {
//!     let options = TicketListOptions { page: Some(page), ..Default::default() };
//!     let tickets = &tickets;
//!     async move { tickets.list(&options).await }
//! })
//! .await?;
//! println!("{} tickets", all.len());
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use tracing::debug;

use super::ApiError;

/// First page number accepted by Lighthouse list endpoints.
pub const FIRST_PAGE: u32 = 1;

/// Fetches consecutive pages until an empty page is returned.
///
/// # Parameters
///
/// * `fetch` - Called with page numbers 1, 2, 3 and so on
///
/// # Returns
///
/// Every item from every non-empty page, in page order.
///
/// # Errors
///
/// The first error returned by `fetch` stops pagination and is returned as-is.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, ApiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ApiError>>,
{
    let mut items = Vec::new();
    let mut page = FIRST_PAGE;

    loop {
        let batch = fetch(page).await?;
        debug!("page {} returned {} item(s)", page, batch.len());
        if batch.is_empty() {
            return Ok(items);
        }
        items.extend(batch);
        page += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_collect_pages_stops_on_empty_page() {
        let calls = AtomicU32::new(0);
        let all = collect_pages(|page| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(match page {
                    1 => vec![1, 2],
                    2 => vec![3],
                    _ => vec![],
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(all, vec![1, 2, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_collect_pages_propagates_errors() {
        let result: Result<Vec<u32>, _> = collect_pages(|page| async move {
            if page == 2 {
                Err(ApiError::Cancelled)
            } else {
                Ok(vec![page])
            }
        })
        .await;

        assert!(matches!(result, Err(ApiError::Cancelled)));
    }
}
