//
//  lighthouse-cli
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! This module loads the `lh` configuration file. Every value can
//! also be given as a command line flag or an `LH_*` environment variable;
//! those always win over the file.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/lh/config.toml`
//! - **macOS**: `~/Library/Application Support/lh/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\lh\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! account = "acme"
//! token = "0123456789abcdef"
//! project = "Widgets"
//!
//! [rate_limit]
//! interval_ms = 600
//! burst = 1
//!
//! [retry]
//! enabled = true
//! max_attempts = 3
//! max_retry_after_secs = 125
//! safety_margin_secs = 5
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lighthouse_cli::config::Config;
//!
//! let config = Config::load()?;
//! if let Some(account) = &config.account {
//!     println!("Using account: {}", account);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::rate_limit::{RateLimitConfig, DEFAULT_BURST, DEFAULT_INTERVAL};
use crate::api::transport::{
    RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_RETRY_AFTER, DEFAULT_SAFETY_MARGIN,
};

/// Global configuration for the Lighthouse CLI.
///
/// # Notes
///
/// - All fields use `#[serde(default)]` so a partial file is fine
/// - A token takes precedence over email/password
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lighthouse account name, the `acme` in `acme.lighthouseapp.com`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// API token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Send the token as the Basic Auth username.
    pub token_as_basic_auth: bool,

    /// Send the token as the `_token` query parameter.
    pub token_as_parameter: bool,

    /// Account email, used with `password` when no token is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Account password. `@FILE` reads the password from FILE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Default project, by ID or name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Client side rate limiting.
    pub rate_limit: RateLimitSettings,

    /// Handling of `429 Too Many Requests`.
    pub retry: RetrySettings,
}

/// `[rate_limit]` table.
///
/// | Field | Default |
/// |-------|---------|
/// | `interval_ms` | `600` (`0` disables rate limiting) |
/// | `burst` | `1` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub interval_ms: u64,
    pub burst: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            burst: DEFAULT_BURST,
        }
    }
}

impl RateLimitSettings {
    /// Converts to the transport's rate limit configuration.
    pub fn to_config(self) -> RateLimitConfig {
        RateLimitConfig::new(Duration::from_millis(self.interval_ms), self.burst)
    }
}

/// `[retry]` table.
///
/// | Field | Default |
/// |-------|---------|
/// | `enabled` | `true` |
/// | `max_attempts` | `3` |
/// | `max_retry_after_secs` | `125` |
/// | `safety_margin_secs` | `5` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub enabled: bool,
    pub max_attempts: u32,
    pub max_retry_after_secs: u64,
    pub safety_margin_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_retry_after_secs: DEFAULT_MAX_RETRY_AFTER.as_secs(),
            safety_margin_secs: DEFAULT_SAFETY_MARGIN.as_secs(),
        }
    }
}

impl RetrySettings {
    /// Converts to a retry policy, or `None` when retries are disabled.
    pub fn to_policy(self) -> Option<RetryPolicy> {
        self.enabled.then(|| RetryPolicy {
            max_attempts: self.max_attempts,
            max_retry_after: Duration::from_secs(self.max_retry_after_secs),
            safety_margin: Duration::from_secs(self.safety_margin_secs),
        })
    }
}

impl Config {
    /// Loads configuration from the default location.
    ///
    /// A missing file is not an error; defaults are used.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads configuration from `path`, or defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or is not
    /// valid TOML for this schema.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Returns the path to the default configuration file.
    ///
    /// The file may not exist; this only returns where it would be.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "lh")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}
