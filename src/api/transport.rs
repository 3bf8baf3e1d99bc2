//
//  lighthouse-cli
//  api/transport.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authenticating, Rate-Limited, Retrying Transport
//!
//! Every request to Lighthouse goes through [`Transport::send`]. For each
//! attempt the transport:
//!
//! 1. Copies the immutable [`Request`] template (headers and buffered body)
//! 2. Attaches credentials, but only when the target shares the API's origin
//! 3. Defaults `Content-Type` from the path extension (`.json`, `.xml`)
//! 4. Waits for a token from the shared [`RateLimiter`], if configured
//! 5. Dispatches through the [`HttpBackend`]
//!
//! A `429 Too Many Requests` response is retried according to the
//! [`RetryPolicy`], sleeping for the number of seconds named in the
//! `X-Rate-Limit-Retry-After` header (bounded by a ceiling) plus a safety
//! margin. Any other status is handed back to the caller untouched, and
//! backend errors are never retried.
//!
//! Redirects are followed here rather than in the backend so that credentials
//! are re-evaluated for every hop and never leak to a foreign host.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lighthouse_cli::api::transport::{Request, RetryPolicy, Transport};
//! use lighthouse_cli::api::rate_limit::RateLimitConfig;
//! use lighthouse_cli::auth::{Credential, TokenMode};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), lighthouse_cli::api::ApiError> {
//! let transport = Transport::builder("https://acme.lighthouseapp.com")
//!     .credential(Credential::from_parts(Some("abc123"), TokenMode::Header, None, None))
//!     .rate_limit(RateLimitConfig::default())
//!     .retry(RetryPolicy::default())
//!     .build()?;
//!
//! let response = transport
//!     .send(&Request::get("/projects.json"), &CancellationToken::new())
//!     .await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, LOCATION};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::common::{ApiError, BoxError};
use super::rate_limit::{RateLimitConfig, RateLimiter};
use crate::auth::{Authorizer, Credential};

/// Response header carrying the number of seconds to wait after a 429.
pub const RETRY_AFTER_HEADER: &str = "X-Rate-Limit-Retry-After";

/// Default number of attempts for a rate limited request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default upper bound on a single backoff.
pub const DEFAULT_MAX_RETRY_AFTER: Duration = Duration::from_secs(125);

/// Default extra delay added to every backoff.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(5);

/// Redirect hops followed per attempt before the redirect itself is returned.
pub const MAX_REDIRECTS: usize = 10;

/// Retry behaviour for `429 Too Many Requests` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total dispatch attempts, including the first. Zero means the default.
    pub max_attempts: u32,
    /// Ceiling for the server supplied wait. Zero means the default.
    pub max_retry_after: Duration,
    /// Added to every computed wait.
    pub safety_margin: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_retry_after: DEFAULT_MAX_RETRY_AFTER,
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

impl RetryPolicy {
    /// Replaces zero attempts and a zero ceiling with their defaults.
    pub fn normalized(self) -> Self {
        Self {
            max_attempts: if self.max_attempts == 0 {
                DEFAULT_MAX_ATTEMPTS
            } else {
                self.max_attempts
            },
            max_retry_after: if self.max_retry_after.is_zero() {
                DEFAULT_MAX_RETRY_AFTER
            } else {
                self.max_retry_after
            },
            safety_margin: self.safety_margin,
        }
    }

    /// Computes how long to sleep after a 429 response.
    ///
    /// The header value is a whole number of seconds. A missing, unparseable
    /// or non-positive value falls back to the ceiling, and larger values are
    /// clamped to it. The safety margin is always added.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use lighthouse_cli::api::transport::RetryPolicy;
    /// use reqwest::header::{HeaderMap, HeaderValue};
    ///
    /// let policy = RetryPolicy {
    ///     max_attempts: 3,
    ///     max_retry_after: Duration::from_secs(10),
    ///     safety_margin: Duration::from_secs(5),
    /// };
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("X-Rate-Limit-Retry-After", HeaderValue::from_static("30"));
    /// assert_eq!(policy.backoff(&headers), Duration::from_secs(15));
    /// assert_eq!(policy.backoff(&HeaderMap::new()), Duration::from_secs(15));
    /// ```
    pub fn backoff(&self, headers: &HeaderMap) -> Duration {
        let ceiling = self.max_retry_after;
        let wait = headers
            .get(RETRY_AFTER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|secs| *secs > 0)
            .map(|secs| Duration::from_secs(secs.unsigned_abs()))
            .map_or(ceiling, |wait| wait.min(ceiling));

        wait + self.safety_margin
    }
}

/// Immutable request template.
///
/// The body is held as [`Bytes`] so it can be replayed on every attempt.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, or a path relative to the transport's base URL.
    pub target: String,
    /// Caller supplied headers.
    pub headers: HeaderMap,
    /// Fully buffered body.
    pub body: Option<Bytes>,
}

impl Request {
    /// Creates a request with no headers and no body.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    /// Adds or replaces a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_vec(value)?;
        Ok(self.body(body))
    }

    /// Reads `reader` to the end once and uses the bytes as the body.
    ///
    /// Most body sources are single pass, so this is how streamed content
    /// becomes replayable across retries.
    pub async fn body_from_reader<R>(self, mut reader: R) -> Result<Self, ApiError>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await.map_err(ApiError::Body)?;
        Ok(self.body(buf))
    }
}

/// A single attempt, fully resolved and ready for the backend.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute target URL, including any credential query parameter.
    pub url: Url,
    /// Headers after credentials and content type were applied.
    pub headers: HeaderMap,
    /// Body bytes for this attempt.
    pub body: Option<Bytes>,
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

/// Performs one HTTP exchange without following redirects.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Sends `request` and buffers the whole response.
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, BoxError>;
}

/// [`HttpBackend`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    http: Client,
}

impl ReqwestBackend {
    /// Builds a client with redirects disabled and the CLI user agent.
    pub fn new() -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(format!("lh/{}", crate::VERSION))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, BoxError> {
        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RawResponse { status, headers, body })
    }
}

/// Builder for [`Transport`].
pub struct TransportBuilder {
    base_url: String,
    credential: Credential,
    rate_limit: Option<RateLimitConfig>,
    retry: Option<RetryPolicy>,
    backend: Option<Arc<dyn HttpBackend>>,
}

impl TransportBuilder {
    /// Sets the credential. Defaults to anonymous.
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    /// Enables rate limiting. A zero interval leaves it disabled.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Enables retrying 429 responses.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Replaces the `reqwest` backend.
    pub fn backend(mut self, backend: Arc<dyn HttpBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Validates the configuration and builds the transport.
    ///
    /// The rate limiter is created here, once, and shared by every call.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidUrl`] when the base URL does not parse
    /// - [`ApiError::InvalidCredential`] when the credential is not header safe
    /// - [`ApiError::Transport`] when the HTTP client cannot be created
    pub fn build(self) -> Result<Transport, ApiError> {
        let base_url = Url::parse(&self.base_url).map_err(|source| ApiError::InvalidUrl {
            url: self.base_url.clone(),
            source,
        })?;

        let authorizer = self.credential.authorizer()?;

        let backend = match self.backend {
            Some(backend) => backend,
            None => Arc::new(ReqwestBackend::new()?),
        };

        let limiter = self.rate_limit.and_then(RateLimiter::new);

        debug!(
            "transport for {} using {} credentials, rate limit {:?}, retry {:?}",
            base_url,
            self.credential.describe(),
            limiter.as_ref().map(RateLimiter::config),
            self.retry
        );

        Ok(Transport {
            backend,
            base_url,
            authorizer,
            limiter,
            retry: self.retry.map(RetryPolicy::normalized),
        })
    }
}

/// Authenticating, rate limited, retrying HTTP transport.
///
/// `Transport` is `Send + Sync`; share one instance per account with `Arc`.
pub struct Transport {
    backend: Arc<dyn HttpBackend>,
    base_url: Url,
    authorizer: Authorizer,
    limiter: Option<RateLimiter>,
    retry: Option<RetryPolicy>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field("limiter", &self.limiter)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Starts building a transport for the API at `base_url`.
    pub fn builder(base_url: impl Into<String>) -> TransportBuilder {
        TransportBuilder {
            base_url: base_url.into(),
            credential: Credential::Anonymous,
            rate_limit: None,
            retry: None,
            backend: None,
        }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The retry policy, when retries are enabled.
    pub fn retry_policy(&self) -> Option<RetryPolicy> {
        self.retry
    }

    /// Resolves a request target against the base URL.
    ///
    /// Relative targets are appended to the base URL's path, so a base of
    /// `https://proxy/lighthouse` sends `/projects.json` to
    /// `https://proxy/lighthouse/projects.json`. Absolute targets are used as-is.
    pub fn resolve(&self, target: &str) -> Result<Url, ApiError> {
        let invalid = |source| ApiError::InvalidUrl {
            url: target.to_string(),
            source,
        };

        match Url::parse(target) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self.base_url.as_str().trim_end_matches('/');
                let path = target.trim_start_matches('/');
                Url::parse(&format!("{base}/{path}")).map_err(invalid)
            }
            Err(source) => Err(invalid(source)),
        }
    }

    /// Sends `request`, retrying 429 responses when retries are enabled.
    ///
    /// # Returns
    ///
    /// The final response, whatever its status. When every attempt was rate
    /// limited the last 429 response is returned as-is.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidUrl`] before any attempt when the target is malformed
    /// - [`ApiError::Cancelled`] when `cancel` fires during a rate limit wait or
    ///   a backoff sleep; no request is dispatched for that attempt
    /// - [`ApiError::Transport`] on the first backend failure, without retrying
    pub async fn send(
        &self,
        request: &Request,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, ApiError> {
        let url = self.resolve(&request.target)?;
        let attempts = self.retry.map_or(1, |policy| policy.max_attempts);
        let mut attempt = 1;

        loop {
            let response = self.round_trip(request, url.clone(), cancel).await?;

            let Some(policy) = self.retry else {
                return Ok(response);
            };

            if response.status != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            if attempt >= attempts {
                warn!(
                    "{} {} still rate limited after {} attempt(s)",
                    request.method,
                    url.path(),
                    attempt
                );
                return Ok(response);
            }

            let wait = policy.backoff(&response.headers);
            warn!(
                "{} {} rate limited (attempt {}/{}), retrying in {:?}",
                request.method,
                url.path(),
                attempt,
                attempts,
                wait
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ApiError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }

            attempt += 1;
        }
    }

    /// Buffers `body` into `request` once, then behaves like [`send`](Self::send).
    pub async fn send_reader<R>(
        &self,
        request: Request,
        body: R,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, ApiError>
    where
        R: AsyncRead + Unpin,
    {
        let request = request.body_from_reader(body).await?;
        self.send(&request, cancel).await
    }

    /// One attempt, following redirects hop by hop.
    async fn round_trip(
        &self,
        request: &Request,
        mut url: Url,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, ApiError> {
        let mut method = request.method.clone();
        let mut headers = request.headers.clone();
        let mut body = request.body.clone();
        let mut hops = 0;

        loop {
            let prepared = self.prepare(method.clone(), url.clone(), headers.clone(), body.clone());
            let response = self.dispatch(prepared, cancel).await?;

            let Some(next) = redirect_target(&url, &response) else {
                return Ok(response);
            };

            if hops >= MAX_REDIRECTS {
                warn!("giving up after {} redirects from {}", hops, request.target);
                return Ok(response);
            }

            let switch_to_get = response.status == StatusCode::SEE_OTHER
                || (method == Method::POST
                    && matches!(response.status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND));
            if switch_to_get {
                method = Method::GET;
                body = None;
                headers.remove(CONTENT_TYPE);
            }

            debug!("following {} redirect to {}", response.status, next.origin().ascii_serialization());
            url = next;
            hops += 1;
        }
    }

    /// Builds a fresh copy of the request for one dispatch.
    fn prepare(&self, method: Method, mut url: Url, mut headers: HeaderMap, body: Option<Bytes>) -> PreparedRequest {
        if self.is_api_origin(&url) {
            self.authorizer.apply(&mut headers, &mut url);
        }

        if !headers.contains_key(CONTENT_TYPE) {
            if let Some(content_type) = default_content_type(&url) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
        }

        PreparedRequest { method, url, headers, body }
    }

    async fn dispatch(
        &self,
        request: PreparedRequest,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, ApiError> {
        if let Some(limiter) = &self.limiter {
            limiter.acquire(cancel).await?;
        }

        debug!("{} {}", request.method, request.url.path());
        let response = self.backend.execute(request).await.map_err(ApiError::Transport)?;
        debug!("-> {}", response.status);

        Ok(response)
    }

    /// Whether `url` points at the API itself (same host and port).
    fn is_api_origin(&self, url: &Url) -> bool {
        url.host_str() == self.base_url.host_str()
            && url.port_or_known_default() == self.base_url.port_or_known_default()
    }
}

/// Picks a `Content-Type` from the path extension.
fn default_content_type(url: &Url) -> Option<&'static str> {
    match Path::new(url.path()).extension()?.to_str()? {
        "json" => Some("application/json"),
        "xml" => Some("application/xml"),
        _ => None,
    }
}

/// Returns the next URL when `response` is a followable redirect.
fn redirect_target(current: &Url, response: &RawResponse) -> Option<Url> {
    if !matches!(
        response.status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    ) {
        return None;
    }

    let location = response.headers.get(LOCATION)?.to_str().ok()?;
    current.join(location).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenMode, TOKEN_HEADER};
    use reqwest::header::AUTHORIZATION;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    const BASE: &str = "https://acme.lighthouseapp.com";

    /// Replays scripted responses and records what was sent.
    #[derive(Default)]
    struct ScriptedBackend {
        script: Mutex<VecDeque<Result<RawResponse, BoxError>>>,
        seen: Mutex<Vec<(Instant, PreparedRequest)>>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<RawResponse, BoxError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<(Instant, PreparedRequest)> {
            self.seen.lock().unwrap().clone()
        }

        fn count(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpBackend for ScriptedBackend {
        async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, BoxError> {
            self.seen.lock().unwrap().push((Instant::now(), request));
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(reply(200, None, "")))
        }
    }

    fn reply(status: u16, retry_after: Option<&'static str>, body: &'static str) -> RawResponse {
        let mut headers = HeaderMap::new();
        if let Some(value) = retry_after {
            headers.insert(RETRY_AFTER_HEADER, HeaderValue::from_static(value));
        }
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers,
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    fn redirect(location: &'static str) -> RawResponse {
        let mut response = reply(302, None, "");
        response.headers.insert(LOCATION, HeaderValue::from_static(location));
        response
    }

    fn policy(max_attempts: u32, ceiling_secs: u64) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            max_retry_after: Duration::from_secs(ceiling_secs),
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }

    fn token(mode: TokenMode) -> Credential {
        Credential::from_parts(Some("abc123"), mode, None, None)
    }

    fn transport(backend: Arc<ScriptedBackend>, credential: Credential, retry: Option<RetryPolicy>) -> Transport {
        let mut builder = Transport::builder(BASE).credential(credential).backend(backend);
        if let Some(retry) = retry {
            builder = builder.retry(retry);
        }
        builder.build().unwrap()
    }

    fn gaps(seen: &[(Instant, PreparedRequest)]) -> Vec<Duration> {
        seen.windows(2).map(|pair| pair[1].0 - pair[0].0).collect()
    }

    fn assert_close(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(100),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    #[tokio::test]
    async fn test_credentials_only_sent_to_api_origin() {
        for mode in [TokenMode::Header, TokenMode::BasicAuth, TokenMode::Parameter] {
            let backend = ScriptedBackend::new(vec![]);
            let transport = transport(backend.clone(), token(mode), None);
            let cancel = CancellationToken::new();

            for target in [
                "https://s3.amazonaws.com/attachments/1.png",
                "https://acme.lighthouseapp.com:8443/projects.json",
                "http://evil.example.com/projects.json",
            ] {
                transport.send(&Request::get(target), &cancel).await.unwrap();
            }

            for (_, request) in backend.seen() {
                assert!(request.headers.get(TOKEN_HEADER).is_none(), "{mode:?}");
                assert!(request.headers.get(AUTHORIZATION).is_none(), "{mode:?}");
                assert!(!request.url.query_pairs().any(|(k, _)| k == "_token"), "{mode:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_token_modes_on_api_host() {
        let cases = [
            (TokenMode::Header, Some(("x-lighthousetoken", "abc123")), None),
            (TokenMode::BasicAuth, Some(("authorization", "Basic YWJjMTIzOng=")), None),
            (TokenMode::Parameter, None, Some("_token=abc123")),
        ];

        for (mode, header, query) in cases {
            let backend = ScriptedBackend::new(vec![]);
            let transport = transport(backend.clone(), token(mode), None);
            transport
                .send(&Request::get("/projects.json"), &CancellationToken::new())
                .await
                .unwrap();

            let (_, request) = &backend.seen()[0];
            assert_eq!(request.url.host_str(), Some("acme.lighthouseapp.com"));
            if let Some((name, value)) = header {
                assert_eq!(request.headers[name], value);
            }
            assert_eq!(request.url.query(), query);
        }
    }

    #[tokio::test]
    async fn test_anonymous_sends_no_credentials() {
        let backend = ScriptedBackend::new(vec![]);
        let transport = transport(backend.clone(), Credential::Anonymous, None);
        transport
            .send(&Request::get("/projects.json"), &CancellationToken::new())
            .await
            .unwrap();

        let (_, request) = &backend.seen()[0];
        assert!(request.headers.get(AUTHORIZATION).is_none());
        assert!(request.headers.get(TOKEN_HEADER).is_none());
        assert_eq!(request.url.query(), None);
    }

    #[tokio::test]
    async fn test_content_type_defaults_from_extension() {
        let backend = ScriptedBackend::new(vec![]);
        let transport = transport(backend.clone(), Credential::Anonymous, None);
        let cancel = CancellationToken::new();

        transport.send(&Request::get("/projects.json"), &cancel).await.unwrap();
        transport.send(&Request::get("/plan.xml"), &cancel).await.unwrap();
        transport.send(&Request::get("/profile"), &cancel).await.unwrap();
        transport
            .send(
                &Request::get("/tickets.json")
                    .header(CONTENT_TYPE, HeaderValue::from_static("text/plain")),
                &cancel,
            )
            .await
            .unwrap();

        let seen = backend.seen();
        assert_eq!(seen[0].1.headers[CONTENT_TYPE], "application/json");
        assert_eq!(seen[1].1.headers[CONTENT_TYPE], "application/xml");
        assert!(seen[2].1.headers.get(CONTENT_TYPE).is_none());
        assert_eq!(seen[3].1.headers[CONTENT_TYPE], "text/plain");
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_429_statuses_return_after_one_attempt() {
        for status in [200, 201, 404, 422, 500, 503] {
            let backend = ScriptedBackend::new(vec![Ok(reply(status, Some("1"), ""))]);
            let transport = transport(backend.clone(), token(TokenMode::Header), Some(policy(3, 10)));
            let start = Instant::now();

            let response = transport
                .send(&Request::get("/projects.json"), &CancellationToken::new())
                .await
                .unwrap();

            assert_eq!(response.status.as_u16(), status);
            assert_eq!(backend.count(), 1);
            assert_eq!(start.elapsed(), Duration::ZERO);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_429_makes_exactly_max_attempts() {
        let backend = ScriptedBackend::new(vec![
            Ok(reply(429, Some("1"), "first")),
            Ok(reply(429, Some("1"), "second")),
            Ok(reply(429, Some("1"), "third")),
            Ok(reply(429, Some("1"), "fourth")),
            Ok(reply(200, None, "never")),
        ]);
        let transport = transport(backend.clone(), token(TokenMode::Header), Some(policy(4, 10)));
        let start = Instant::now();

        let response = transport
            .send(&Request::get("/projects.json"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(&response.body[..], b"fourth");
        assert_eq!(backend.count(), 4);
        // three backoffs of 1s + 5s, none after the last attempt
        assert_close(start.elapsed(), Duration::from_secs(18));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_disabled_returns_first_429() {
        let backend = ScriptedBackend::new(vec![Ok(reply(429, Some("1"), ""))]);
        let transport = transport(backend.clone(), token(TokenMode::Header), None);

        let response = transport
            .send(&Request::get("/projects.json"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(backend.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_clamps_and_falls_back_to_ceiling() {
        let backend = ScriptedBackend::new(vec![
            Ok(reply(429, Some("500"), "")),
            Ok(reply(429, None, "")),
            Ok(reply(429, Some("soon"), "")),
            Ok(reply(429, Some("0"), "")),
            Ok(reply(429, Some("-3"), "")),
            Ok(reply(429, Some("2"), "")),
            Ok(reply(200, None, "")),
        ]);
        let transport = transport(backend.clone(), token(TokenMode::Header), Some(policy(7, 10)));

        transport
            .send(&Request::get("/projects.json"), &CancellationToken::new())
            .await
            .unwrap();

        let gaps = gaps(&backend.seen());
        assert_eq!(gaps.len(), 6);
        for gap in &gaps[..5] {
            assert_close(*gap, Duration::from_secs(15));
        }
        assert_close(gaps[5], Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_body_is_replayed_on_every_attempt() {
        let backend = ScriptedBackend::new(vec![
            Ok(reply(429, Some("1"), "")),
            Ok(reply(429, Some("1"), "")),
            Ok(reply(201, None, "")),
        ]);
        let transport = transport(backend.clone(), token(TokenMode::Header), Some(policy(3, 10)));
        let body = br#"{"ticket":{"title":"Broken build"}}"#;

        let response = transport
            .send_reader(
                Request::new(Method::POST, "/projects/1/tickets.json"),
                &body[..],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        let seen = backend.seen();
        assert_eq!(seen.len(), 3);
        for (_, sent) in seen {
            assert_eq!(sent.method, Method::POST);
            assert_eq!(sent.body.as_deref(), Some(&body[..]));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_errors_are_not_retried() {
        let failure: BoxError = Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        let backend = ScriptedBackend::new(vec![Err(failure), Ok(reply(200, None, ""))]);
        let transport = transport(backend.clone(), token(TokenMode::Header), Some(policy(3, 10)));

        let result = transport
            .send(&Request::get("/projects.json"), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(ApiError::Transport(_))));
        assert_eq!(backend.count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_target_fails_before_dispatch() {
        let backend = ScriptedBackend::new(vec![]);
        let transport = transport(backend.clone(), token(TokenMode::Header), None);

        let result = transport
            .send(&Request::get("http://[::1/projects.json"), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(ApiError::InvalidUrl { .. })));
        assert_eq!(backend.count(), 0);
    }

    #[test]
    fn test_relative_targets_keep_base_path() {
        let based = Transport::builder("http://127.0.0.1:9999/lighthouse")
            .backend(ScriptedBackend::new(vec![]))
            .build()
            .unwrap();
        assert_eq!(
            based.resolve("/projects.json").unwrap().as_str(),
            "http://127.0.0.1:9999/lighthouse/projects.json"
        );
        assert_eq!(
            based.resolve("projects/1/tickets.json?page=2").unwrap().as_str(),
            "http://127.0.0.1:9999/lighthouse/projects/1/tickets.json?page=2"
        );

        let trailing = Transport::builder("http://127.0.0.1:9999/lighthouse/")
            .backend(ScriptedBackend::new(vec![]))
            .build()
            .unwrap();
        assert_eq!(
            trailing.resolve("/profile.json").unwrap().as_str(),
            "http://127.0.0.1:9999/lighthouse/profile.json"
        );

        let root = transport(ScriptedBackend::new(vec![]), Credential::Anonymous, None);
        assert_eq!(
            root.resolve("/projects.json").unwrap().as_str(),
            "https://acme.lighthouseapp.com/projects.json"
        );
        assert_eq!(
            root.resolve("https://s3.example.com/a.png").unwrap().as_str(),
            "https://s3.example.com/a.png"
        );
    }

    #[tokio::test]
    async fn test_invalid_base_url_and_credential_fail_at_build() {
        assert!(matches!(
            Transport::builder("not a url").build(),
            Err(ApiError::InvalidUrl { .. })
        ));

        let bad = Credential::from_parts(Some("line\nbreak"), TokenMode::Header, None, None);
        assert!(matches!(
            Transport::builder(BASE).credential(bad).backend(ScriptedBackend::new(vec![])).build(),
            Err(ApiError::InvalidCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_redirect_to_foreign_host_drops_credentials() {
        let backend = ScriptedBackend::new(vec![
            Ok(redirect("https://s3.amazonaws.com/bucket/file.png?sig=1")),
            Ok(reply(200, None, "png")),
        ]);
        let transport = transport(backend.clone(), token(TokenMode::Parameter), None);

        let response = transport
            .send(&Request::get("/attachments/1/file.png"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(&response.body[..], b"png");
        let seen = backend.seen();
        assert_eq!(seen[0].1.url.query(), Some("_token=abc123"));
        assert_eq!(seen[1].1.url.host_str(), Some("s3.amazonaws.com"));
        assert_eq!(seen[1].1.url.query(), Some("sig=1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let backend = ScriptedBackend::new(vec![Ok(reply(429, Some("100"), ""))]);
        let transport = transport(backend.clone(), token(TokenMode::Header), Some(policy(3, 125)));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let result = transport.send(&Request::get("/projects.json"), &cancel).await;

        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert_eq!(backend.count(), 1);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_cancel_during_rate_limit_wait() {
        let backend = ScriptedBackend::new(vec![]);
        let transport = Transport::builder(BASE)
            .credential(token(TokenMode::Header))
            .rate_limit(RateLimitConfig::new(Duration::from_secs(30), 1))
            .backend(backend.clone())
            .build()
            .unwrap();
        let cancel = CancellationToken::new();

        transport.send(&Request::get("/projects.json"), &cancel).await.unwrap();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let start = std::time::Instant::now();
        let result = transport.send(&Request::get("/projects.json"), &cancel).await;

        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert_eq!(backend.count(), 1);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_share_the_bucket() {
        let backend = ScriptedBackend::new(vec![]);
        let transport = Arc::new(
            Transport::builder(BASE)
                .rate_limit(RateLimitConfig::new(Duration::from_millis(100), 2))
                .backend(backend.clone())
                .build()
                .unwrap(),
        );
        let start = Instant::now();

        let handles: Vec<_> = (0..5)
            .map(|i| {
                let transport = transport.clone();
                tokio::spawn(async move {
                    transport
                        .send(&Request::get(format!("/projects/{i}.json")), &CancellationToken::new())
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut times: Vec<Duration> = backend.seen().iter().map(|(at, _)| *at - start).collect();
        times.sort();

        assert_eq!(times.len(), 5);
        assert!(times[1] < Duration::from_millis(50), "burst of two should be immediate: {times:?}");
        for pair in times[1..].windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(80), "spacing too small: {times:?}");
        }
        assert!(times[4] >= Duration::from_millis(280));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_twice_then_success() {
        let backend = ScriptedBackend::new(vec![
            Ok(reply(429, Some("2"), "")),
            Ok(reply(429, Some("30"), "")),
            Ok(reply(200, None, r#"{"ok":true}"#)),
        ]);
        let transport = transport(backend.clone(), token(TokenMode::BasicAuth), Some(policy(3, 10)));
        let start = Instant::now();

        let response = transport
            .send(&Request::get("/projects.json"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(&response.body[..], br#"{"ok":true}"#);

        let seen = backend.seen();
        assert_eq!(seen.len(), 3);
        let gaps = gaps(&seen);
        assert_close(gaps[0], Duration::from_secs(7));
        assert_close(gaps[1], Duration::from_secs(15));
        assert_close(start.elapsed(), Duration::from_secs(22));
        for (_, request) in &seen {
            assert_eq!(request.headers[AUTHORIZATION], "Basic YWJjMTIzOng=");
        }
    }

    #[test]
    fn test_retry_policy_normalizes_zero_values() {
        let policy = RetryPolicy {
            max_attempts: 0,
            max_retry_after: Duration::ZERO,
            safety_margin: Duration::ZERO,
        }
        .normalized();

        assert_eq!(policy.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(policy.max_retry_after, DEFAULT_MAX_RETRY_AFTER);
        assert_eq!(policy.safety_margin, Duration::ZERO);
    }
}
