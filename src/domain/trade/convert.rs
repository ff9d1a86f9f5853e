//! Conversions from wire types to domain types for trades.

use super::wire::WsTrade;
use super::Tick;
use crate::error::ParseError;
use crate::shared::Symbol;
use chrono::{TimeZone, Utc};

impl TryFrom<WsTrade> for Tick {
    type Error = ParseError;

    fn try_from(t: WsTrade) -> Result<Self, Self::Error> {
        if t.symbol.trim().is_empty() {
            return Err(ParseError::MissingField("symbol"));
        }
        let quantity = t.quantity.as_ref().map(|q| q.to_decimal()).transpose()?;
        let executed_at = match t.trade_time {
            Some(ms) => Some(
                Utc.timestamp_millis_opt(ms)
                    .single()
                    .ok_or_else(|| ParseError::Timestamp(ms.to_string()))?,
            ),
            None => None,
        };
        Ok(Self {
            symbol: Symbol::new(&t.symbol),
            price: t.price.to_decimal()?,
            quantity,
            executed_at,
        })
    }
}
