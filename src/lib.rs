//! # market-sync
//!
//! Keeps a live crypto-market dashboard consistent: a candle series seeded
//! from a one-shot history fetch and kept current by a push stream of klines,
//! trades and order-book snapshots, for one (symbol, interval) at a time.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: Shared newtypes, domain slices (candle, orderbook, trade), errors
//! 2. **HTTP API**: `MarketHttp` with a configurable retry policy
//! 3. **WebSocket**: Stream envelope parsing + `tokio-tungstenite` transport
//! 4. **Live synchronizer**: `TickMerger`, `SubscriptionManager`, `DashboardSession`
//!    and the async `run_dashboard` driver
//! 5. **High-Level Client**: `MarketClient` with nested sub-clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use market_sync::prelude::*;
//!
//! let client = MarketClient::from_env()?;
//! let mut ws = client.ws_native();
//! ws.connect().await?;
//!
//! let (selection_tx, selection_rx) = tokio::sync::mpsc::channel(8);
//! let (view_tx, mut view_rx) = tokio::sync::watch::channel(DashboardView::default());
//! selection_tx.send(Selection::new("BTCUSDT", Interval::Minute1)).await?;
//!
//! run_dashboard(&client, &ws, ws.events(), selection_rx, view_tx).await;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network URL constants.
pub mod network;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 3: WebSocket ───────────────────────────────────────────────────────

/// WebSocket client: messages, subscriptions, events.
pub mod ws;

// ── Layer 4: Live synchronizer ───────────────────────────────────────────────

/// Tick merging, subscription tracking, and the dashboard session.
pub mod live;

// ── Layer 5: High-Level Client ───────────────────────────────────────────────

/// `MarketClient`: the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Interval, Selection, Symbol};

    // Domain types
    pub use crate::domain::candle::{Candle, CandleSeries, Kline, SeriesUpdate};
    pub use crate::domain::orderbook::{BookState, OrderBookSnapshot, OrderBookView, PriceLevel};
    pub use crate::domain::trade::Tick;

    // Errors
    pub use crate::error::{InvalidSeriesError, SdkError};

    // Network
    pub use crate::network::{DEFAULT_API_URL, DEFAULT_ORDERBOOK_URL, DEFAULT_WS_URL};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{CandlesClient, MarketClient, MarketClientBuilder, OrderbooksClient};
    #[cfg(feature = "http")]
    pub use crate::http::retry::{Endpoint, RetryConfig, RetryPolicy};

    // WebSocket types
    pub use crate::ws::{MessageOut, StreamMessage, SubscribeParams, WsConfig, WsEvent};
    #[cfg(feature = "ws-native")]
    pub use crate::ws::native::WsClient;

    // Live synchronizer
    pub use crate::live::{
        DashboardSession, DashboardView, Effect, LoadStatus, MergeOutcome, SessionEvent,
        SubscriptionManager, TickMerger,
    };
    #[cfg(feature = "ws-native")]
    pub use crate::live::{run_dashboard, MarketDataSource, StreamSink};
}
