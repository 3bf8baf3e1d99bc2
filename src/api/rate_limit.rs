//
//  lighthouse-cli
//  api/rate_limit.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Token bucket rate limiting for outgoing requests.
//!
//! The bucket itself is a `governor` direct limiter. Waiters queue on a fair
//! `tokio::sync::Mutex` first so tokens are handed out first-come first-served,
//! and every wait races a [`CancellationToken`].

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use super::common::ApiError;

/// Default spacing between requests.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(600);

/// Default number of requests allowed back to back.
pub const DEFAULT_BURST: u32 = 1;

/// Rate limit settings.
///
/// An `interval` of zero disables rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// One token is added to the bucket per interval.
    pub interval: Duration,
    /// Bucket capacity. Zero is treated as one.
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            burst: DEFAULT_BURST,
        }
    }
}

impl RateLimitConfig {
    /// Creates a config with the given interval and burst size.
    pub fn new(interval: Duration, burst: u32) -> Self {
        Self { interval, burst }
    }

    /// Returns a config that turns rate limiting off.
    pub fn disabled() -> Self {
        Self {
            interval: Duration::ZERO,
            burst: DEFAULT_BURST,
        }
    }

    /// Whether this config limits anything.
    pub fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }
}

/// Shared token bucket.
///
/// Cloning is cheap and clones share the same bucket.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
    queue: Arc<Mutex<()>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Builds a limiter, or `None` when the config is disabled.
    pub fn new(config: RateLimitConfig) -> Option<Self> {
        let quota = Quota::with_period(config.interval)?
            .allow_burst(NonZeroU32::new(config.burst).unwrap_or(NonZeroU32::MIN));

        Some(Self {
            limiter: Arc::new(Governor::direct(quota)),
            queue: Arc::new(Mutex::new(())),
            config,
        })
    }

    /// The settings this limiter was built from.
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Waits for one token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Cancelled`] as soon as `cancel` fires, whether the
    /// caller is still queued behind other waiters or waiting on the bucket.
    /// No token is consumed in that case.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), ApiError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            _ = self.take() => Ok(()),
        }
    }

    async fn take(&self) {
        let _turn = self.queue.lock().await;
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("interval", &self.config.interval)
            .field("burst", &self.config.burst)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_zero_interval_disables() {
        assert!(RateLimiter::new(RateLimitConfig::disabled()).is_none());
        assert!(!RateLimitConfig::disabled().is_enabled());
        assert!(RateLimitConfig::default().is_enabled());
    }

    #[tokio::test]
    async fn test_burst_is_immediate_then_spaced() {
        let limiter = RateLimiter::new(RateLimitConfig::new(Duration::from_millis(100), 2)).unwrap();
        let cancel = CancellationToken::new();
        let start = Instant::now();

        limiter.acquire(&cancel).await.unwrap();
        limiter.acquire(&cancel).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(50));

        limiter.acquire(&cancel).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_zero_burst_is_treated_as_one() {
        let limiter = RateLimiter::new(RateLimitConfig::new(Duration::from_millis(100), 0)).unwrap();
        let cancel = CancellationToken::new();
        let start = Instant::now();

        limiter.acquire(&cancel).await.unwrap();
        limiter.acquire(&cancel).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_cancel_while_waiting() {
        let limiter = RateLimiter::new(RateLimitConfig::new(Duration::from_secs(30), 1)).unwrap();
        let cancel = CancellationToken::new();
        limiter.acquire(&cancel).await.unwrap();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let result = limiter.acquire(&cancel).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_already_cancelled_returns_immediately() {
        let limiter = RateLimiter::new(RateLimitConfig::default()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(matches!(limiter.acquire(&cancel).await, Err(ApiError::Cancelled)));
    }
}
