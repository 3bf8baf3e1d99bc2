//
//  lighthouse-cli
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client for the Lighthouse API
//!
//! [`LighthouseClient`] sits on top of a [`Transport`] and adds the pieces
//! every resource service needs:
//!
//! - Base URL derived from the account name
//! - Status checking against the status each call expects
//! - JSON envelope wrapping and unwrapping
//! - A shared [`CancellationToken`] for every call made through it
//!
//! ## Example
//!
//! ```rust,no_run
//! use lighthouse_cli::api::LighthouseClient;
//! use lighthouse_cli::auth::{Credential, TokenMode};
//!
//! # async fn example() -> Result<(), lighthouse_cli::api::ApiError> {
//! let client = LighthouseClient::builder("acme")
//!     .credential(Credential::from_parts(Some("abc123"), TokenMode::Header, None, None))
//!     .build()?;
//!
//! assert_eq!(client.base_url().as_str(), "https://acme.lighthouseapp.com/");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::common::envelope::{unwrap_list, unwrap_one, wrap};
use super::common::{check_response, ApiError};
use super::rate_limit::RateLimitConfig;
use super::transport::{HttpBackend, RawResponse, Request, RetryPolicy, Transport};
use crate::auth::Credential;

/// Returns the API base URL for a Lighthouse account.
///
/// # Example
///
/// ```rust
/// use lighthouse_cli::api::client::account_url;
///
/// assert_eq!(account_url("acme"), "https://acme.lighthouseapp.com");
/// ```
pub fn account_url(account: &str) -> String {
    format!("https://{account}.lighthouseapp.com")
}

/// Builder for [`LighthouseClient`].
///
/// Rate limiting and retries are off unless configured.
pub struct LighthouseClientBuilder {
    base_url: String,
    credential: Credential,
    rate_limit: Option<RateLimitConfig>,
    retry: Option<RetryPolicy>,
    backend: Option<Arc<dyn HttpBackend>>,
    cancel: CancellationToken,
}

impl LighthouseClientBuilder {
    /// Points the client at a different base URL, e.g. a local test server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the credential. Defaults to anonymous.
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    /// Enables rate limiting.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Enables retrying rate limited requests.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Replaces the HTTP backend.
    pub fn backend(mut self, backend: Arc<dyn HttpBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Uses `cancel` for every call made through the client.
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Anything [`TransportBuilder::build`](super::transport::TransportBuilder::build)
    /// rejects.
    pub fn build(self) -> Result<LighthouseClient, ApiError> {
        let mut builder = Transport::builder(self.base_url).credential(self.credential);
        if let Some(config) = self.rate_limit {
            builder = builder.rate_limit(config);
        }
        if let Some(policy) = self.retry {
            builder = builder.retry(policy);
        }
        if let Some(backend) = self.backend {
            builder = builder.backend(backend);
        }

        Ok(LighthouseClient {
            transport: Arc::new(builder.build()?),
            cancel: self.cancel,
        })
    }
}

/// Client for one Lighthouse account.
///
/// Cheap to clone; clones share the transport, and therefore the rate limiter.
///
/// # Status Expectations
///
/// | Helper | Method | Expected status |
/// |--------|--------|-----------------|
/// | [`get_json`](Self::get_json), [`get_list`](Self::get_list) | GET | 200 |
/// | [`post_json`](Self::post_json), [`post_json_as`](Self::post_json_as) | POST | 201 |
/// | [`put_json`](Self::put_json), [`put_empty`](Self::put_empty) | PUT | 200 |
/// | [`delete`](Self::delete) | DELETE | 200 |
#[derive(Debug, Clone)]
pub struct LighthouseClient {
    transport: Arc<Transport>,
    cancel: CancellationToken,
}

impl LighthouseClient {
    /// Starts building a client for `account`.
    pub fn builder(account: &str) -> LighthouseClientBuilder {
        LighthouseClientBuilder {
            base_url: account_url(account),
            credential: Credential::Anonymous,
            rate_limit: None,
            retry: None,
            backend: None,
            cancel: CancellationToken::new(),
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    /// The token that cancels every call made through this client.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns a clone sharing the transport but using a different token.
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            cancel,
        }
    }

    /// Sends `request` and checks the final status against `expected`.
    ///
    /// # Errors
    ///
    /// - Any error raised by [`Transport::send`]
    /// - [`ApiError::Unprocessable`] for a 422 response
    /// - [`ApiError::UnexpectedResponse`] for any other mismatch
    pub async fn request(
        &self,
        request: Request,
        expected: StatusCode,
    ) -> Result<RawResponse, ApiError> {
        let response = self.transport.send(&request, &self.cancel).await?;
        check_response(response, expected)
    }

    /// GETs `path` and unwraps the object stored under `key`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<T, ApiError> {
        let response = self.request(Request::get(path), StatusCode::OK).await?;
        unwrap_one(key, &response.body)
    }

    /// GETs `path` and unwraps a `{"<plural>": [{"<key>": ...}]}` list.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        plural: &str,
        key: &str,
    ) -> Result<Vec<T>, ApiError> {
        let response = self.request(Request::get(path), StatusCode::OK).await?;
        unwrap_list(plural, key, &response.body)
    }

    /// POSTs `body` wrapped under `key`, expects 201 and unwraps the created object.
    pub async fn post_json<B, T>(&self, path: &str, key: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post_json_as(path, key, key, body).await
    }

    /// Like [`post_json`](Self::post_json) for endpoints that answer with a
    /// different resource than the one posted.
    pub async fn post_json_as<B, T>(
        &self,
        path: &str,
        request_key: &str,
        response_key: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = Request::new(Method::POST, path).json(&wrap(request_key, body)?)?;
        let response = self.request(request, StatusCode::CREATED).await?;
        unwrap_one(response_key, &response.body)
    }

    /// PUTs `body` wrapped under `key` and expects 200. The response body is ignored.
    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        key: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let request = Request::new(Method::PUT, path).json(&wrap(key, body)?)?;
        self.request(request, StatusCode::OK).await?;
        Ok(())
    }

    /// PUTs with no body and expects 200.
    pub async fn put_empty(&self, path: &str) -> Result<(), ApiError> {
        self.request(Request::new(Method::PUT, path), StatusCode::OK).await?;
        Ok(())
    }

    /// DELETEs `path` and expects 200.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(Request::new(Method::DELETE, path), StatusCode::OK).await?;
        Ok(())
    }
}

/// Appends `pairs` to `path` as a query string, skipping it when empty.
pub(crate) fn with_query(path: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }

    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();
    format!("{path}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_uses_account_host() {
        let client = LighthouseClient::builder("acme").build().unwrap();
        assert_eq!(client.base_url().as_str(), "https://acme.lighthouseapp.com/");
    }

    #[test]
    fn test_base_url_override() {
        let client = LighthouseClient::builder("acme")
            .base_url("http://127.0.0.1:9999")
            .build()
            .unwrap();
        assert_eq!(client.base_url().host_str(), Some("127.0.0.1"));
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let err = LighthouseClient::builder("acme")
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn test_with_cancellation_shares_transport() {
        let client = LighthouseClient::builder("acme").build().unwrap();
        let token = CancellationToken::new();
        let other = client.with_cancellation(token.clone());

        token.cancel();
        assert!(other.cancellation().is_cancelled());
        assert!(!client.cancellation().is_cancelled());
        assert!(Arc::ptr_eq(&client.transport, &other.transport));
    }

    #[test]
    fn test_with_query() {
        assert_eq!(with_query("/t.json", &[]), "/t.json");
        assert_eq!(
            with_query("/t.json", &[("q", "state:open tagged:\"a b\"".into()), ("page", "2".into())]),
            "/t.json?q=state%3Aopen+tagged%3A%22a+b%22&page=2"
        );
    }
}
