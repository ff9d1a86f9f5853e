//! Trade domain: last-traded price ticks from the stream.

mod convert;
pub mod wire;

use crate::shared::Symbol;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single trade execution.
///
/// Only `price` takes part in candle merging; quantity and execution time are
/// carried through when the stream supplies them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tick {
    pub symbol: Symbol,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub executed_at: Option<DateTime<Utc>>,
}

impl Tick {
    pub fn new(symbol: impl Into<Symbol>, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            quantity: None,
            executed_at: None,
        }
    }
}
