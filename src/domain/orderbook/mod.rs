//! Orderbook domain: price levels, full-depth snapshots, and the view state.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod state;
pub mod wire;

use crate::shared::Symbol;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::{BookState, OrderBookView};

/// A single resting price level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub amount: Decimal,
}

impl PriceLevel {
    pub fn new(price: Decimal, amount: Decimal) -> Self {
        Self { price, amount }
    }
}

/// A complete order book for one symbol.
///
/// `bids` are ordered by price descending, `asks` ascending, as delivered by
/// the source. Levels are never merged or deduplicated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub symbol: Symbol,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    #[serde(default)]
    pub last_update_id: Option<i64>,
}

impl OrderBookSnapshot {
    /// A snapshot with no levels on either side.
    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: Vec::new(),
            asks: Vec::new(),
            last_update_id: None,
        }
    }

    /// Highest bid price.
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.price)
    }

    /// Lowest ask price.
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.price)
    }

    /// Mid price (average of best bid and best ask).
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::from(2)),
            _ => None,
        }
    }

    /// Spread between best ask and best bid.
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// The best `depth` levels of each side.
    pub fn top(&self, depth: usize) -> (&[PriceLevel], &[PriceLevel]) {
        (
            &self.bids[..depth.min(self.bids.len())],
            &self.asks[..depth.min(self.asks.len())],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(price: i64, amount: i64) -> PriceLevel {
        PriceLevel::new(Decimal::from(price), Decimal::from(amount))
    }

    fn book() -> OrderBookSnapshot {
        OrderBookSnapshot {
            symbol: Symbol::from("BTCUSDT"),
            bids: vec![level(50, 10), level(49, 3), level(48, 1)],
            asks: vec![level(52, 5), level(53, 2)],
            last_update_id: Some(7),
        }
    }

    #[test]
    fn test_best_prices() {
        let b = book();
        assert_eq!(b.best_bid(), Some(Decimal::from(50)));
        assert_eq!(b.best_ask(), Some(Decimal::from(52)));
    }

    #[test]
    fn test_mid_price_and_spread() {
        let b = book();
        assert_eq!(b.mid_price(), Some(Decimal::from(51)));
        assert_eq!(b.spread(), Some(Decimal::from(2)));
    }

    #[test]
    fn test_one_sided_book_has_no_mid() {
        let mut b = book();
        b.asks.clear();
        assert_eq!(b.mid_price(), None);
        assert_eq!(b.spread(), None);
        assert!(!b.is_empty());
    }

    #[test]
    fn test_top_depth() {
        let b = book();
        let (bids, asks) = b.top(2);
        assert_eq!(bids, &[level(50, 10), level(49, 3)]);
        assert_eq!(asks, &[level(52, 5), level(53, 2)]);

        let (bids, asks) = b.top(0);
        assert!(bids.is_empty() && asks.is_empty());
    }

    #[test]
    fn test_empty() {
        let b = OrderBookSnapshot::empty(Symbol::from("ETHUSDT"));
        assert!(b.is_empty());
        assert_eq!(b.best_bid(), None);
    }
}
