//! Wire types for orderbook responses (REST + WS).

use crate::shared::WireDecimal;
use serde::{Deserialize, Serialize};

/// A single price level as sent by the order-book service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireLevel {
    pub price: WireDecimal,
    pub amount: WireDecimal,
}

// ─── REST wire types ─────────────────────────────────────────────────────────

/// REST response for `/orderbook?symbol=`.
///
/// The symbol is implicit from the request. Empty sides may arrive as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookResponse {
    #[serde(default)]
    pub bids: Option<Vec<WireLevel>>,
    #[serde(default)]
    pub asks: Option<Vec<WireLevel>>,
    #[serde(rename = "lastUpdateId", default)]
    pub last_update_id: Option<i64>,
}

// ─── WS wire types ───────────────────────────────────────────────────────────

/// WS order-book snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsOrderBook {
    pub symbol: String,
    #[serde(default)]
    pub bids: Option<Vec<WireLevel>>,
    #[serde(default)]
    pub asks: Option<Vec<WireLevel>>,
    #[serde(rename = "lastUpdateId", default)]
    pub last_update_id: Option<i64>,
}
