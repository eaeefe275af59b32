// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Middleware module for HTTP request processing
//!
//! Per-IP fixed-window rate limiting for the `/v1` routes.

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, StatusCode, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use shared_types::BalanceResponse;
use tracing::{debug, warn};

use crate::config::RateLimitingConfig;

const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);
const MAX_RATE_LIMIT_ENTRIES: usize = 10_000;

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Request may proceed
    Allowed,
    /// Request exceeds the window budget; retry after the given delay
    Limited {
        /// Time until the client's window resets
        retry_after: Duration,
    },
}

/// Rate limiting middleware state
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitingConfig,
    window: Duration,
    windows: Arc<DashMap<IpAddr, Window>>,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

impl RateLimiter {
    /// Create a limiter with one-minute windows
    pub fn new(config: RateLimitingConfig) -> Self {
        Self::with_window(config, RATE_LIMIT_WINDOW)
    }

    /// Create a limiter with a custom window length
    pub fn with_window(config: RateLimitingConfig, window: Duration) -> Self {
        Self {
            config,
            window,
            windows: Arc::new(DashMap::new()),
        }
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Count a request from `ip` and decide whether it may proceed
    pub fn check(&self, ip: IpAddr) -> RateDecision {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> RateDecision {
        if !self.config.enabled {
            return RateDecision::Allowed;
        }

        if self.windows.len() > MAX_RATE_LIMIT_ENTRIES {
            self.evict_expired(now);
        }

        let window = *self
            .windows
            .entry(ip)
            .and_modify(|window| {
                if now.duration_since(window.started) >= self.window {
                    *window = Window {
                        count: 1,
                        started: now,
                    };
                } else {
                    window.count = window.count.saturating_add(1);
                }
            })
            .or_insert(Window {
                count: 1,
                started: now,
            });

        if window.count > self.config.requests_per_minute {
            let retry_after = self
                .window
                .saturating_sub(now.duration_since(window.started));
            debug!(%ip, count = window.count, "rate limiting client");
            RateDecision::Limited { retry_after }
        } else {
            RateDecision::Allowed
        }
    }

    fn evict_expired(&self, now: Instant) {
        let before = self.windows.len();
        self.windows
            .retain(|_, window| now.duration_since(window.started) < self.window);
        let evicted = before.saturating_sub(self.windows.len());
        if evicted > 0 {
            debug!(evicted, "evicted expired rate limiter windows");
        }

        // Every window is live: drop the oldest half.
        if self.windows.len() > MAX_RATE_LIMIT_ENTRIES {
            let mut oldest: Vec<_> = self
                .windows
                .iter()
                .map(|entry| (*entry.key(), entry.value().started))
                .collect();
            oldest.sort_by_key(|(_, started)| *started);

            let excess = self.windows.len() - MAX_RATE_LIMIT_ENTRIES / 2;
            warn!(excess, "rate limiter table full, dropping oldest windows");
            for (ip, _) in oldest.into_iter().take(excess) {
                self.windows.remove(&ip);
            }
        }
    }
}

/// Reject clients that exhausted their window with `429 Too Many Requests`
pub async fn rate_limiting_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(rate_limiter): State<RateLimiter>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match rate_limiter.check(addr.ip()) {
        RateDecision::Allowed => next.run(req).await,
        RateDecision::Limited { retry_after } => {
            warn!(client = %addr.ip(), "rate limit exceeded");
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(BalanceResponse::failure("Rate limit exceeded")),
            )
                .into_response();
            response.headers_mut().insert(
                RETRY_AFTER,
                HeaderValue::from(retry_after.as_secs().max(1)),
            );
            response
        }
    }
}
