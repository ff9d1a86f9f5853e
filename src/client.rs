//! High-level client: `MarketClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder and accessor methods.

use crate::domain::candle::client::Candles;
use crate::domain::orderbook::client::Orderbooks;
use crate::error::SdkError;
use crate::http::{MarketHttp, RetryPolicy};
use crate::network;
use crate::ws::WsConfig;

// Re-export sub-client types for convenience.
pub use crate::domain::candle::client::Candles as CandlesClient;
pub use crate::domain::orderbook::client::Orderbooks as OrderbooksClient;

/// The primary entry point for market data.
///
/// Provides nested sub-client accessors for each domain:
/// `client.candles()`, `client.orderbooks()`.
#[derive(Clone)]
pub struct MarketClient {
    pub(crate) http: MarketHttp,
    pub(crate) ws_config: WsConfig,
}

impl MarketClient {
    pub fn builder() -> MarketClientBuilder {
        MarketClientBuilder::default()
    }

    /// Build a client from `MARKET_API_URL`, `MARKET_ORDERBOOK_URL` and
    /// `MARKET_WS_URL`, using the local defaults for anything unset.
    pub fn from_env() -> Result<Self, SdkError> {
        MarketClientBuilder::from_env().build()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn candles(&self) -> Candles<'_> {
        Candles { client: self }
    }

    pub fn orderbooks(&self) -> Orderbooks<'_> {
        Orderbooks { client: self }
    }

    /// Get a WS config for creating a WebSocket connection.
    ///
    /// The WS client is not embedded in `MarketClient`; its lifetime belongs
    /// to whatever drives the dashboard.
    pub fn ws_config(&self) -> &WsConfig {
        &self.ws_config
    }

    /// Create a new native WS client from the current config.
    #[cfg(feature = "ws-native")]
    pub fn ws_native(&self) -> crate::ws::native::WsClient {
        crate::ws::native::WsClient::new(self.ws_config.clone())
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct MarketClientBuilder {
    api_url: String,
    orderbook_url: String,
    ws_url: String,
    retry_policy: RetryPolicy,
    ws_max_reconnect_attempts: Option<u32>,
}

impl Default for MarketClientBuilder {
    fn default() -> Self {
        Self {
            api_url: network::DEFAULT_API_URL.to_string(),
            orderbook_url: network::DEFAULT_ORDERBOOK_URL.to_string(),
            ws_url: network::DEFAULT_WS_URL.to_string(),
            retry_policy: RetryPolicy::None,
            ws_max_reconnect_attempts: None,
        }
    }
}

impl MarketClientBuilder {
    /// Start from the environment instead of the compiled-in defaults.
    pub fn from_env() -> Self {
        Self {
            api_url: network::env_or(network::ENV_API_URL, network::DEFAULT_API_URL),
            orderbook_url: network::env_or(
                network::ENV_ORDERBOOK_URL,
                network::DEFAULT_ORDERBOOK_URL,
            ),
            ws_url: network::env_or(network::ENV_WS_URL, network::DEFAULT_WS_URL),
            ..Self::default()
        }
    }

    pub fn api_url(mut self, url: &str) -> Self {
        self.api_url = url.to_string();
        self
    }

    pub fn orderbook_url(mut self, url: &str) -> Self {
        self.orderbook_url = url.to_string();
        self
    }

    pub fn ws_url(mut self, url: &str) -> Self {
        self.ws_url = url.to_string();
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Cap WS reconnect attempts. Unlimited by default.
    pub fn ws_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.ws_max_reconnect_attempts = Some(attempts);
        self
    }

    pub fn build(self) -> Result<MarketClient, SdkError> {
        if self.ws_url.trim().is_empty() {
            return Err(SdkError::Validation("ws_url must not be empty".into()));
        }
        let http = MarketHttp::new(&self.api_url, &self.orderbook_url)?
            .with_retry_policy(self.retry_policy);

        Ok(MarketClient {
            http,
            ws_config: WsConfig {
                url: self.ws_url,
                max_reconnect_attempts: self.ws_max_reconnect_attempts,
                ..WsConfig::default()
            },
        })
    }
}
