//! WebSocket layer: messages, subscriptions, events.
//!
//! The transport lives in `native.rs` (`ws-native` feature, `tokio-tungstenite`).
//! This module defines the shared message/event types and the envelope parser.

pub mod subscriptions;

#[cfg(feature = "ws-native")]
pub mod native;

use crate::domain::candle::wire::WsKlineEvent;
use crate::domain::candle::Kline;
use crate::domain::orderbook::wire::WsOrderBook;
use crate::domain::orderbook::OrderBookSnapshot;
use crate::domain::trade::wire::WsTrade;
use crate::domain::trade::Tick;
use crate::error::WsError;
use serde::{Deserialize, Serialize};

pub use subscriptions::{SubscribeParams, Subscription};

// ─── Outbound messages ───────────────────────────────────────────────────────

/// Messages sent from client to server.
///
/// The stream server takes the bare params object; each subscribe replaces
/// the previous subscription on that connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MessageOut {
    Subscribe(SubscribeParams),
}

impl MessageOut {
    pub fn subscribe(params: impl Subscription) -> Self {
        MessageOut::Subscribe(params.to_subscribe_params())
    }
}

// ─── Inbound messages ────────────────────────────────────────────────────────

/// Raw inbound envelope: `{"type": ..., "data": {...}}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Kind {
    #[serde(rename = "kline")]
    Kline(WsKlineEvent),
    #[serde(rename = "trade")]
    Trade(WsTrade),
    #[serde(rename = "orderbook")]
    OrderBook(WsOrderBook),
}

/// A validated stream message, ready for the session.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    Kline(Kline),
    Trade(Tick),
    OrderBook(OrderBookSnapshot),
}

impl TryFrom<Kind> for StreamMessage {
    type Error = WsError;

    fn try_from(kind: Kind) -> Result<Self, Self::Error> {
        Ok(match kind {
            Kind::Kline(k) => StreamMessage::Kline(Kline::try_from(k)?),
            Kind::Trade(t) => StreamMessage::Trade(Tick::try_from(t)?),
            Kind::OrderBook(b) => StreamMessage::OrderBook(OrderBookSnapshot::try_from(b)?),
        })
    }
}

/// Parse one text frame into a [`StreamMessage`].
///
/// Unknown `type`, missing fields and unparseable numbers all surface as
/// [`WsError::Deserialization`].
pub fn parse_stream_message(text: &str) -> Result<StreamMessage, WsError> {
    let kind: Kind =
        serde_json::from_str(text).map_err(|e| WsError::Deserialization(e.to_string()))?;
    StreamMessage::try_from(kind)
}

// ─── WsEvent ─────────────────────────────────────────────────────────────────

/// High-level events emitted by the WS client to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum WsEvent {
    /// A parsed message from the server.
    Message(StreamMessage),
    /// Connection established (first connect or any reconnect).
    Connected,
    /// Connection lost (may trigger reconnect).
    Disconnected { code: Option<u16>, reason: String },
    /// A protocol or transport error that did not end the session.
    Error(String),
    /// Reconnect attempts exhausted; the background task has stopped.
    MaxReconnectReached,
}

/// Transport connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl From<u16> for ReadyState {
    fn from(v: u16) -> Self {
        match v {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            2 => ReadyState::Closing,
            _ => ReadyState::Closed,
        }
    }
}

/// Configuration for the WS client.
#[derive(Debug, Clone)]
pub struct WsConfig {
    pub url: String,
    pub reconnect: bool,
    /// First reconnect delay; doubled per consecutive failed attempt.
    pub base_reconnect_delay_ms: u64,
    /// `None` retries forever.
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: crate::network::DEFAULT_WS_URL.to_string(),
            reconnect: true,
            base_reconnect_delay_ms: 1000,
            max_reconnect_attempts: None,
        }
    }
}
