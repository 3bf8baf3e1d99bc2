//
//  lighthouse-cli
//  context/resolver.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Session Resolver
//!
//! Builds a [`Session`] from command line options and the config file.
//!
//! ## Resolution Priority
//!
//! 1. CLI flags
//! 2. `LH_*` environment variables (handled by clap, so they arrive as flags)
//! 3. Configuration file
//! 4. Built-in defaults

use anyhow::{bail, Context, Result};
use tracing::debug;

use super::Session;
use crate::api::LighthouseClient;
use crate::auth::{resolve_password, Credential, TokenMode};
use crate::cli::GlobalOptions;
use crate::config::Config;

/// Message shown when no account is configured anywhere.
pub const MISSING_ACCOUNT: &str =
    "Please specify Lighthouse account name via -a, --account, LH_ACCOUNT or config file";

/// Message shown when neither a token nor email/password is configured.
pub const MISSING_CREDENTIAL: &str =
    "Please specify token via -t, --token, LH_TOKEN or email & password via --email, --password";

pub struct ContextResolver {
    config: Config,
}

impl ContextResolver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Loads the config file named by `--config`, or the default one.
    pub fn from_options(options: &GlobalOptions) -> Result<Self> {
        let config = match &options.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        Ok(Self::new(config))
    }

    /// Returns the config file with every option that was given on the
    /// command line laid over it.
    pub fn effective_config(&self, options: &GlobalOptions) -> Config {
        let mut config = self.config.clone();

        fn overlay<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                target.clone_from(value);
            }
        }

        overlay(&mut config.account, &options.account);
        overlay(&mut config.token, &options.token);
        overlay(&mut config.email, &options.email);
        overlay(&mut config.password, &options.password);
        overlay(&mut config.project, &options.project);
        if let Some(basic) = options.token_as_basic_auth {
            config.token_as_basic_auth = basic;
        }
        if let Some(parameter) = options.token_as_parameter {
            config.token_as_parameter = parameter;
        }

        if let Some(interval) = options.rate_limit_interval_ms {
            config.rate_limit.interval_ms = interval;
        }
        if let Some(burst) = options.rate_limit_burst {
            config.rate_limit.burst = burst;
        }
        if let Some(enabled) = options.retry {
            config.retry.enabled = enabled;
        }
        if let Some(attempts) = options.retry_attempts {
            config.retry.max_attempts = attempts;
        }
        if let Some(ceiling) = options.retry_max_after_secs {
            config.retry.max_retry_after_secs = ceiling;
        }
        if let Some(margin) = options.retry_margin_secs {
            config.retry.safety_margin_secs = margin;
        }

        config
    }

    /// Builds the session.
    ///
    /// # Errors
    ///
    /// Fails when no account or no credential is configured, when a
    /// `@FILE` password cannot be read, or when the account does not form a
    /// valid URL.
    pub fn resolve(&self, options: &GlobalOptions) -> Result<Session> {
        let config = self.effective_config(options);

        let account = config
            .account
            .as_deref()
            .filter(|a| !a.is_empty())
            .context(MISSING_ACCOUNT)?;

        let password = config
            .password
            .as_deref()
            .map(resolve_password)
            .transpose()?;

        let credential = Credential::from_parts(
            config.token.as_deref(),
            TokenMode::from_flags(config.token_as_basic_auth, config.token_as_parameter),
            config.email.as_deref(),
            password.as_deref(),
        );
        if credential == Credential::Anonymous {
            bail!(MISSING_CREDENTIAL);
        }
        debug!("authenticating with {}", credential.describe());

        let mut builder = LighthouseClient::builder(account)
            .credential(credential)
            .rate_limit(config.rate_limit.to_config())
            .cancellation(options.cancel.clone());
        if let Some(policy) = config.retry.to_policy() {
            builder = builder.retry(policy);
        }
        if let Some(base_url) = &options.base_url {
            builder = builder.base_url(base_url.clone());
        }

        let client = builder
            .build()
            .with_context(|| format!("Invalid Lighthouse account {account:?}"))?;
        Ok(Session::new(client, config.project))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn options() -> GlobalOptions {
        GlobalOptions::default()
    }

    #[test]
    fn test_flags_override_config() {
        let resolver = ContextResolver::new(Config {
            account: Some("from-file".into()),
            project: Some("1".into()),
            ..Default::default()
        });
        let config = resolver.effective_config(&GlobalOptions {
            account: Some("from-flag".into()),
            retry: Some(false),
            rate_limit_burst: Some(4),
            ..options()
        });

        assert_eq!(config.account.as_deref(), Some("from-flag"));
        assert_eq!(config.project.as_deref(), Some("1"));
        assert!(!config.retry.enabled);
        assert_eq!(config.rate_limit.burst, 4);
        assert_eq!(config.rate_limit.interval_ms, 600);
    }

    #[test]
    fn test_token_mode_flags_override_config_both_ways() {
        let resolver = ContextResolver::new(Config {
            token_as_basic_auth: true,
            ..Default::default()
        });

        let off = resolver.effective_config(&GlobalOptions {
            token_as_basic_auth: Some(false),
            token_as_parameter: Some(true),
            ..options()
        });
        assert!(!off.token_as_basic_auth);
        assert!(off.token_as_parameter);

        let unset = resolver.effective_config(&options());
        assert!(unset.token_as_basic_auth);
        assert!(!unset.token_as_parameter);
    }

    #[test]
    fn test_missing_account_is_error() {
        let resolver = ContextResolver::new(Config::default());
        let err = resolver
            .resolve(&GlobalOptions {
                token: Some("abc".into()),
                ..options()
            })
            .unwrap_err();
        assert_eq!(err.to_string(), MISSING_ACCOUNT);
    }

    #[test]
    fn test_missing_credential_is_error() {
        let resolver = ContextResolver::new(Config {
            account: Some("acme".into()),
            email: Some("ada@example.com".into()),
            ..Default::default()
        });
        let err = resolver.resolve(&options()).unwrap_err();
        assert_eq!(err.to_string(), MISSING_CREDENTIAL);
    }

    #[test]
    fn test_resolve_builds_client() {
        let resolver = ContextResolver::new(Config {
            account: Some("acme".into()),
            token: Some("abc".into()),
            project: Some("Widgets".into()),
            ..Default::default()
        });
        let session = resolver.resolve(&options()).unwrap();

        assert_eq!(session.client().base_url().as_str(), "https://acme.lighthouseapp.com/");
        assert_eq!(session.project(), Some("Widgets"));
        assert!(session.client().transport().retry_policy().is_some());
    }

    #[test]
    fn test_base_url_and_no_retry() {
        let resolver = ContextResolver::new(Config::default());
        let session = resolver
            .resolve(&GlobalOptions {
                account: Some("acme".into()),
                token: Some("abc".into()),
                base_url: Some("http://127.0.0.1:9999".into()),
                retry: Some(false),
                ..options()
            })
            .unwrap();

        assert_eq!(session.client().base_url().as_str(), "http://127.0.0.1:9999/");
        assert!(session.client().transport().retry_policy().is_none());
    }

    #[test]
    fn test_password_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "s3cret").unwrap();

        let resolver = ContextResolver::new(Config::default());
        let session = resolver.resolve(&GlobalOptions {
            account: Some("acme".into()),
            email: Some("ada@example.com".into()),
            password: Some(format!("@{}", file.path().display())),
            ..options()
        });
        assert!(session.is_ok());

        let missing = resolver.resolve(&GlobalOptions {
            account: Some("acme".into()),
            email: Some("ada@example.com".into()),
            password: Some("@/nonexistent/lh-password".into()),
            ..options()
        });
        assert!(missing.is_err());
    }
}
