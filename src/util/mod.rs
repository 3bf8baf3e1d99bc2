//
//  lighthouse-cli
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Utility Module
//!
//! Small helpers shared by the CLI commands.
//!
//! ## Categories
//!
//! - **Time Utilities**: [`format_time`], [`format_date`], [`format_relative_time`], [`parse_date`]
//! - **String Utilities**: [`truncate`], [`parse_id_list`]
//!
//! ## Example
//!
//! ```rust
//! use lighthouse_cli::util::{parse_date, truncate};
//!
//! let due = parse_date("2026-11-01").unwrap();
//! assert_eq!(due.to_rfc3339(), "2026-11-01T00:00:00+00:00");
//! assert_eq!(truncate("Crash when saving large files", 12), "Crash whe...");
//! ```

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};

/// Formats a timestamp in the local timezone as `YYYY-MM-DD HH:MM:SS`.
///
/// Returns `-` for a missing timestamp.
pub fn format_time(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(dt) => {
            let local: DateTime<Local> = dt.into();
            local.format("%Y-%m-%d %H:%M:%S").to_string()
        }
        None => "-".to_string(),
    }
}

/// Formats a timestamp as a calendar date, for due dates.
pub fn format_date(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}

/// Formats a timestamp relative to `now`, e.g. "3 hours ago".
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - timestamp).num_seconds();

    if diff < 0 {
        return "in the future".to_string();
    }

    let diff = diff as u64;
    let plural = |n: u64, unit: &str| format!("{} {}{} ago", n, unit, if n == 1 { "" } else { "s" });

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        plural(diff / 60, "minute")
    } else if diff < 86400 {
        plural(diff / 3600, "hour")
    } else if diff < 604800 {
        plural(diff / 86400, "day")
    } else if diff < 2592000 {
        plural(diff / 604800, "week")
    } else if diff < 31536000 {
        plural(diff / 2592000, "month")
    } else {
        plural(diff / 31536000, "year")
    }
}

/// Parses a `YYYY-MM-DD` date as midnight UTC.
///
/// # Errors
///
/// Returns an error when `s` is not a valid calendar date.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date {s:?}, expected YYYY-MM-DD"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("Invalid date {s:?}"))?;
    Ok(midnight.and_utc())
}

/// Parses a comma-separated list of numeric IDs, ignoring blanks.
///
/// # Errors
///
/// Returns an error naming the first entry that is not a number.
pub fn parse_id_list(s: &str) -> Result<Vec<u64>> {
    let mut ids = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse() {
            Ok(id) => ids.push(id),
            Err(_) => bail!("Invalid ID {part:?} in list"),
        }
    }
    Ok(ids)
}

/// Truncates a string to at most `max_len` characters, ending in `...`
/// when shortened.
///
/// Counts characters, not bytes, so multi-byte titles never split.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_len).collect()
    }
}
