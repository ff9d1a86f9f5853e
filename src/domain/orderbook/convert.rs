//! Conversion: order-book wire payloads → OrderBookSnapshot (TryFrom + validation).

use super::wire::{OrderBookResponse, WireLevel, WsOrderBook};
use super::{OrderBookSnapshot, PriceLevel};
use crate::error::ParseError;
use crate::shared::Symbol;

impl TryFrom<&WireLevel> for PriceLevel {
    type Error = ParseError;

    fn try_from(level: &WireLevel) -> Result<Self, Self::Error> {
        Ok(PriceLevel {
            price: level.price.to_decimal()?,
            amount: level.amount.to_decimal()?,
        })
    }
}

fn levels(side: Option<Vec<WireLevel>>) -> Result<Vec<PriceLevel>, ParseError> {
    side.unwrap_or_default()
        .iter()
        .map(PriceLevel::try_from)
        .collect()
}

impl TryFrom<(Symbol, OrderBookResponse)> for OrderBookSnapshot {
    type Error = ParseError;

    fn try_from(value: (Symbol, OrderBookResponse)) -> Result<Self, Self::Error> {
        let (symbol, resp) = value;
        Ok(OrderBookSnapshot {
            symbol,
            bids: levels(resp.bids)?,
            asks: levels(resp.asks)?,
            last_update_id: resp.last_update_id,
        })
    }
}

impl TryFrom<WsOrderBook> for OrderBookSnapshot {
    type Error = ParseError;

    fn try_from(book: WsOrderBook) -> Result<Self, Self::Error> {
        if book.symbol.trim().is_empty() {
            return Err(ParseError::MissingField("symbol"));
        }
        Ok(OrderBookSnapshot {
            symbol: Symbol::new(&book.symbol),
            bids: levels(book.bids)?,
            asks: levels(book.asks)?,
            last_update_id: book.last_update_id,
        })
    }
}
