//! Per-client request rate limiting
//!
//! Every client IP gets a fixed window (30 requests per 5 minutes by default).
//! The window starts with the first request and resets once it has elapsed.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Requests allowed per window
pub const DEFAULT_LIMIT: u32 = 30;

/// Window length in seconds
pub const DEFAULT_PERIOD_SECS: i64 = 5 * 60;

/// Outcome of one rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Requests allowed per window
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// Seconds until the current window resets
    pub retry_after_secs: u64,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: DateTime<Utc>,
    count: u32,
}

/// Fixed window rate limiter keyed by client IP
pub struct RequestRateLimiter {
    limit: u32,
    period: Duration,
    windows: Arc<RwLock<HashMap<IpAddr, Window>>>,
}

impl RequestRateLimiter {
    /// Create a limiter with the default limits
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_LIMIT, Duration::seconds(DEFAULT_PERIOD_SECS))
    }

    /// Create a limiter allowing `limit` requests per `period`
    pub fn with_limits(limit: u32, period: Duration) -> Self {
        Self {
            limit,
            period,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Count a request from `ip` and decide whether it may proceed
    pub async fn check(&self, ip: IpAddr) -> RateLimitDecision {
        self.check_at(ip, Utc::now()).await
    }

    async fn check_at(&self, ip: IpAddr, now: DateTime<Utc>) -> RateLimitDecision {
        let mut windows = self.windows.write().await;

        let window = windows.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        if now - window.started >= self.period {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        let allowed = window.count < self.limit;
        if allowed {
            window.count += 1;
        }

        let resets_in = (window.started + self.period - now).num_seconds().max(1);
        RateLimitDecision {
            allowed,
            limit: self.limit,
            remaining: self.limit.saturating_sub(window.count),
            retry_after_secs: resets_in as u64,
        }
    }

    /// Drop expired windows (called periodically)
    pub async fn cleanup(&self) {
        self.cleanup_at(Utc::now()).await;
    }

    async fn cleanup_at(&self, now: DateTime<Utc>) {
        let mut windows = self.windows.write().await;
        windows.retain(|_, window| now - window.started < self.period);
    }

    /// Number of clients with an open window
    pub async fn tracked_clients(&self) -> usize {
        self.windows.read().await.len()
    }
}

impl Default for RequestRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn ip(s: &str) -> IpAddr {
        IpAddr::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_limit_is_enforced() {
        let limiter = RequestRateLimiter::with_limits(3, Duration::minutes(5));
        let client = ip("127.0.0.1");

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check(client).await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
            assert_eq!(decision.limit, 3);
        }

        let decision = limiter.check(client).await;
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert!(decision.retry_after_secs > 0);
        assert!(decision.retry_after_secs <= 300);
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let limiter = RequestRateLimiter::with_limits(1, Duration::minutes(5));

        assert!(limiter.check(ip("10.0.0.1")).await.allowed);
        assert!(!limiter.check(ip("10.0.0.1")).await.allowed);
        assert!(limiter.check(ip("10.0.0.2")).await.allowed);
    }

    #[tokio::test]
    async fn test_window_resets_after_period() {
        let limiter = RequestRateLimiter::with_limits(1, Duration::minutes(5));
        let client = ip("::1");
        let start = Utc::now();

        assert!(limiter.check_at(client, start).await.allowed);
        assert!(!limiter.check_at(client, start + Duration::minutes(4)).await.allowed);

        let decision = limiter.check_at(client, start + Duration::minutes(5)).await;
        assert!(decision.allowed);
        assert_eq!(decision.retry_after_secs, 300);
    }

    #[tokio::test]
    async fn test_cleanup_drops_expired_windows() {
        let limiter = RequestRateLimiter::new();
        let start = Utc::now();

        limiter.check_at(ip("10.0.0.1"), start).await;
        limiter.check_at(ip("10.0.0.2"), start + Duration::minutes(3)).await;
        assert_eq!(limiter.tracked_clients().await, 2);

        limiter.cleanup_at(start + Duration::minutes(6)).await;
        assert_eq!(limiter.tracked_clients().await, 1);
    }

    #[test]
    fn test_default_limits() {
        let limiter = RequestRateLimiter::default();
        assert_eq!(limiter.limit, DEFAULT_LIMIT);
        assert_eq!(limiter.period, Duration::seconds(300));
    }
}
