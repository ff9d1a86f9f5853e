//! Transport-level retries for the two market-data endpoints.
//!
//! A failed history fetch is normally final: the dashboard shows the error
//! and the next selection change fetches again. Retries here only paper over
//! transient transport trouble (timeouts, refused connections, 502/503/504,
//! 429) and are scoped per endpoint, so a caller can retry the cheap
//! order-book snapshot without ever re-issuing a history request.

use std::time::Duration;

use crate::error::HttpError;

/// The backend request being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /klines`
    Klines,
    /// `GET /orderbook`
    OrderBook,
}

/// Which requests are retried, and how.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RetryPolicy {
    /// Every failure is reported as-is.
    #[default]
    None,
    /// Retry the order-book snapshot with [`RetryConfig::default`]; history is never retried.
    OrderBookOnly,
    /// Caller-supplied config.
    Custom(RetryConfig),
}

impl RetryPolicy {
    /// The config to use for `endpoint`, or `None` for a single attempt.
    pub fn config_for(&self, endpoint: Endpoint) -> Option<RetryConfig> {
        let config = match self {
            RetryPolicy::None => return None,
            RetryPolicy::OrderBookOnly => RetryConfig::default(),
            RetryPolicy::Custom(config) => config.clone(),
        };
        config.covers(endpoint).then_some(config)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Backoff ceiling for the first retry; doubled per retry.
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Off by default: history is re-fetched by the next selection change.
    pub retry_klines: bool,
    pub retry_order_book: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            retry_klines: false,
            retry_order_book: true,
        }
    }
}

impl RetryConfig {
    pub fn covers(&self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::Klines => self.retry_klines,
            Endpoint::OrderBook => self.retry_order_book,
        }
    }

    /// Whether `err` is worth another attempt.
    pub fn is_transient(err: &HttpError) -> bool {
        match err {
            HttpError::Timeout | HttpError::RateLimited { .. } => true,
            HttpError::ServerError { status, .. } => matches!(status, 502..=504),
            #[cfg(feature = "http")]
            HttpError::Reqwest(e) => e.is_connect(),
            _ => false,
        }
    }

    /// Backoff ceiling before retry number `retry` (0-based).
    ///
    /// A server-supplied `Retry-After` wins when it is longer.
    pub fn ceiling(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        let doubled = self
            .base_delay
            .saturating_mul(1u32 << retry.min(16))
            .min(self.max_delay);
        retry_after.map_or(doubled, |hint| hint.max(doubled))
    }

    /// Full-jitter delay in `[0, ceiling]`, except that a `Retry-After`
    /// hint is honoured exactly.
    pub fn delay(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(hint) = retry_after {
            return self.ceiling(retry, Some(hint));
        }
        let cap = self.ceiling(retry, None).as_millis() as u64;
        if cap == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::random::<u64>() % (cap + 1))
    }
}
