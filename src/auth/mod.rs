//
//  lighthouse-cli
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Lighthouse accepts either an API token or an email/password pair. A token
//! can be delivered three different ways, so the credential is modelled as an
//! enum plus a [`TokenMode`].
//!
//! ## Supported Authentication Methods
//!
//! - **Token header** (default): `X-LighthouseToken: <token>`
//! - **Token as Basic Auth**: username `<token>`, password `x`
//! - **Token as query parameter**: `?_token=<token>`
//! - **Email and password**: standard HTTP Basic authentication
//! - **Anonymous**: no credentials, for public projects
//!
//! ## Example
//!
//! ```rust
//! use lighthouse_cli::auth::{Credential, TokenMode};
//!
//! let credential = Credential::from_parts(Some("abc123"), TokenMode::BasicAuth, None, None);
//! assert!(matches!(credential, Credential::Token { mode: TokenMode::BasicAuth, .. }));
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, AUTHORIZATION};
use url::Url;

/// Header used to carry the API token in [`TokenMode::Header`].
pub const TOKEN_HEADER: &str = "X-LighthouseToken";

/// Query parameter used to carry the API token in [`TokenMode::Parameter`].
pub const TOKEN_PARAMETER: &str = "_token";

/// Password sent alongside the token in [`TokenMode::BasicAuth`].
pub const TOKEN_PLACEHOLDER_PASSWORD: &str = "x";

/// How an API token is attached to outgoing requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenMode {
    /// Send the token in the `X-LighthouseToken` header.
    #[default]
    Header,
    /// Send the token as the Basic Auth username with a placeholder password.
    BasicAuth,
    /// Send the token in the `_token` query parameter.
    Parameter,
}

impl TokenMode {
    /// Picks a mode from the two boolean switches exposed in configuration.
    ///
    /// Basic Auth wins when both switches are set.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lighthouse_cli::auth::TokenMode;
    ///
    /// assert_eq!(TokenMode::from_flags(false, false), TokenMode::Header);
    /// assert_eq!(TokenMode::from_flags(true, true), TokenMode::BasicAuth);
    /// assert_eq!(TokenMode::from_flags(false, true), TokenMode::Parameter);
    /// ```
    pub fn from_flags(as_basic_auth: bool, as_parameter: bool) -> Self {
        if as_basic_auth {
            Self::BasicAuth
        } else if as_parameter {
            Self::Parameter
        } else {
            Self::Header
        }
    }
}

/// Credentials used to authenticate against one Lighthouse account.
///
/// Immutable once built. Exactly one mode is active; token modes take
/// precedence over email/password.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credential {
    /// No credentials are attached.
    #[default]
    Anonymous,
    /// An API token delivered according to `mode`.
    Token {
        /// The API token.
        token: String,
        /// How the token is attached.
        mode: TokenMode,
    },
    /// Email (or username) and password sent as HTTP Basic authentication.
    Password {
        /// Account email or username.
        email: String,
        /// Account password.
        password: String,
    },
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Token { mode, .. } => f
                .debug_struct("Token")
                .field("token", &"<redacted>")
                .field("mode", mode)
                .finish(),
            Self::Password { email, .. } => f
                .debug_struct("Password")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

impl Credential {
    /// Builds a credential from optional configuration values.
    ///
    /// Empty strings count as unset. A token always wins; email/password is
    /// used only when both are present.
    ///
    /// # Parameters
    ///
    /// * `token` - API token, if any
    /// * `mode` - Delivery mode for the token
    /// * `email` - Account email or username
    /// * `password` - Account password
    pub fn from_parts(
        token: Option<&str>,
        mode: TokenMode,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Self {
        let non_empty = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);

        if let Some(token) = non_empty(token) {
            return Self::Token { token, mode };
        }

        match (non_empty(email), non_empty(password)) {
            (Some(email), Some(password)) => Self::Password { email, password },
            _ => Self::Anonymous,
        }
    }

    /// Short label for logs. Never includes secrets.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Token { mode: TokenMode::Header, .. } => "token header",
            Self::Token { mode: TokenMode::BasicAuth, .. } => "token basic auth",
            Self::Token { mode: TokenMode::Parameter, .. } => "token parameter",
            Self::Password { .. } => "email/password",
        }
    }

    /// Precomputes how this credential is attached to a request.
    ///
    /// # Errors
    ///
    /// Returns an error when the token or password contains bytes that are not
    /// valid in an HTTP header.
    pub(crate) fn authorizer(&self) -> Result<Authorizer, InvalidHeaderValue> {
        let authorizer = match self {
            Self::Anonymous => Authorizer::None,
            Self::Token { token, mode: TokenMode::Header } => {
                let mut value = HeaderValue::from_str(token)?;
                value.set_sensitive(true);
                Authorizer::Header(HeaderName::from_static("x-lighthousetoken"), value)
            }
            Self::Token { token, mode: TokenMode::BasicAuth } => {
                Authorizer::Header(AUTHORIZATION, basic_auth(token, TOKEN_PLACEHOLDER_PASSWORD)?)
            }
            Self::Token { token, mode: TokenMode::Parameter } => Authorizer::Query(token.clone()),
            Self::Password { email, password } => {
                Authorizer::Header(AUTHORIZATION, basic_auth(email, password)?)
            }
        };
        Ok(authorizer)
    }
}

/// A credential resolved into the exact header or query change it causes.
#[derive(Debug, Clone)]
pub(crate) enum Authorizer {
    None,
    Header(HeaderName, HeaderValue),
    Query(String),
}

impl Authorizer {
    /// Attaches the credential to a fresh copy of a request.
    pub(crate) fn apply(&self, headers: &mut HeaderMap, url: &mut Url) {
        match self {
            Self::None => {}
            Self::Header(name, value) => {
                headers.insert(name.clone(), value.clone());
            }
            Self::Query(token) => set_query_param(url, TOKEN_PARAMETER, token),
        }
    }
}

/// Builds an `Authorization: Basic ...` header value.
fn basic_auth(username: &str, password: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let encoded = STANDARD.encode(format!("{username}:{password}"));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Sets `name` to `value`, replacing any existing occurrences.
fn set_query_param(url: &mut Url, name: &str, value: &str) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    pairs.extend_pairs(kept);
    pairs.append_pair(name, value);
}

/// Resolves a configured password.
///
/// A value of the form `@FILE` is replaced by the trimmed contents of `FILE`.
/// A lone `@` is treated as a literal password.
///
/// # Example
///
/// ```rust
/// use lighthouse_cli::auth::resolve_password;
///
/// assert_eq!(resolve_password("hunter2").unwrap(), "hunter2");
/// ```
pub fn resolve_password(value: &str) -> Result<String> {
    match value.strip_prefix('@') {
        Some(path) if !path.is_empty() => {
            let path = Path::new(path);
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read password file {}", path.display()))?;
            Ok(contents.trim().to_string())
        }
        _ => Ok(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn apply(credential: &Credential) -> (HeaderMap, Url) {
        let mut headers = HeaderMap::new();
        let mut url = Url::parse("https://acme.lighthouseapp.com/projects.json?page=2").unwrap();
        credential.authorizer().unwrap().apply(&mut headers, &mut url);
        (headers, url)
    }

    #[test]
    fn test_token_header_is_default() {
        let credential = Credential::from_parts(Some("abc123"), TokenMode::default(), None, None);
        let (headers, url) = apply(&credential);

        assert_eq!(headers[TOKEN_HEADER], "abc123");
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(url.query(), Some("page=2"));
    }

    #[test]
    fn test_token_as_basic_auth() {
        let credential = Credential::from_parts(Some("abc123"), TokenMode::BasicAuth, None, None);
        let (headers, _) = apply(&credential);

        // base64("abc123:x")
        assert_eq!(headers[AUTHORIZATION], "Basic YWJjMTIzOng=");
        assert!(headers.get(TOKEN_HEADER).is_none());
    }

    #[test]
    fn test_token_as_parameter_replaces_existing() {
        let credential = Credential::from_parts(Some("abc123"), TokenMode::Parameter, None, None);
        let mut headers = HeaderMap::new();
        let mut url = Url::parse("https://acme.lighthouseapp.com/x.json?_token=old&q=a").unwrap();
        credential.authorizer().unwrap().apply(&mut headers, &mut url);

        assert!(headers.is_empty());
        assert_eq!(url.query(), Some("q=a&_token=abc123"));
    }

    #[test]
    fn test_token_beats_password() {
        let credential =
            Credential::from_parts(Some("abc123"), TokenMode::Header, Some("me@acme.com"), Some("pw"));
        assert_eq!(credential.describe(), "token header");
    }

    #[test]
    fn test_email_password_basic_auth() {
        let credential = Credential::from_parts(None, TokenMode::Header, Some("me"), Some("pw"));
        let (headers, _) = apply(&credential);

        // base64("me:pw")
        assert_eq!(headers[AUTHORIZATION], "Basic bWU6cHc=");
    }

    #[test]
    fn test_incomplete_credentials_are_anonymous() {
        assert_eq!(Credential::from_parts(Some(""), TokenMode::Header, Some("me"), None), Credential::Anonymous);
        let (headers, url) = apply(&Credential::Anonymous);
        assert!(headers.is_empty());
        assert_eq!(url.query(), Some("page=2"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credential = Credential::from_parts(Some("abc123"), TokenMode::Header, None, None);
        let debug = format!("{credential:?}");
        assert!(!debug.contains("abc123"));
    }

    #[test]
    fn test_resolve_password_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  s3cret  ").unwrap();

        let value = format!("@{}", file.path().display());
        assert_eq!(resolve_password(&value).unwrap(), "s3cret");
        assert_eq!(resolve_password("@").unwrap(), "@");
        assert!(resolve_password("@/does/not/exist").is_err());
    }
}
