//! Conversions from wire types to domain types for candles.

use super::wire::{KlineRecord, WsKlineEvent};
use super::{Candle, Kline};
use crate::error::ParseError;
use crate::shared::{Interval, Symbol};

impl TryFrom<KlineRecord> for Candle {
    type Error = ParseError;

    fn try_from(r: KlineRecord) -> Result<Self, Self::Error> {
        Ok(Candle {
            time: r.time.to_epoch_seconds()?,
            open: r.open.to_decimal()?,
            high: r.high.to_decimal()?,
            low: r.low.to_decimal()?,
            close: r.close.to_decimal()?,
        })
    }
}

impl TryFrom<WsKlineEvent> for Kline {
    type Error = ParseError;

    fn try_from(event: WsKlineEvent) -> Result<Self, Self::Error> {
        let k = event.kline;
        let symbol = k
            .symbol
            .or(event.symbol)
            .filter(|s| !s.trim().is_empty())
            .ok_or(ParseError::MissingField("symbol"))?;
        let interval: Interval = k.interval.parse()?;

        Ok(Kline {
            symbol: Symbol::new(symbol),
            interval,
            candle: Candle {
                time: k.open_time.div_euclid(1000),
                open: k.open.to_decimal()?,
                high: k.high.to_decimal()?,
                low: k.low.to_decimal()?,
                close: k.close.to_decimal()?,
            },
            is_closed: k.is_closed,
        })
    }
}
