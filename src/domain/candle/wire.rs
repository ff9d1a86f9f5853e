//! Wire types for candles (REST history + WS kline).

use crate::shared::{WireDecimal, WireTime};
use serde::{Deserialize, Serialize};

// ─── REST wire types ─────────────────────────────────────────────────────────

/// One record of the `/klines` history response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlineRecord {
    pub time: WireTime,
    #[serde(default)]
    pub symbol: Option<String>,
    pub open: WireDecimal,
    pub high: WireDecimal,
    pub low: WireDecimal,
    pub close: WireDecimal,
    /// 20-period SMA computed server-side; not carried into the domain type.
    #[serde(default)]
    pub sma: Option<WireDecimal>,
}

// ─── WS wire types ───────────────────────────────────────────────────────────

/// Binance kline event relayed by the stream server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsKlineEvent {
    #[serde(rename = "s", default)]
    pub symbol: Option<String>,
    #[serde(rename = "k")]
    pub kline: WsKline,
}

/// The `k` payload of a kline event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsKline {
    /// Bucket open time, epoch milliseconds.
    #[serde(rename = "t")]
    pub open_time: i64,
    #[serde(rename = "s", default)]
    pub symbol: Option<String>,
    #[serde(rename = "i")]
    pub interval: String,
    #[serde(rename = "o")]
    pub open: WireDecimal,
    #[serde(rename = "h")]
    pub high: WireDecimal,
    #[serde(rename = "l")]
    pub low: WireDecimal,
    #[serde(rename = "c")]
    pub close: WireDecimal,
    #[serde(rename = "x", default)]
    pub is_closed: bool,
}
