//! Wire types for trade events (WS only).

use crate::shared::WireDecimal;
use serde::{Deserialize, Serialize};

/// WS trade event, relayed from Binance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WsTrade {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "p")]
    pub price: WireDecimal,
    #[serde(rename = "q", default)]
    pub quantity: Option<WireDecimal>,
    #[serde(rename = "T", default)]
    pub trade_time: Option<i64>,
}
