//! Candle domain: OHLC buckets, the live kline tick, and the series store.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod state;
pub mod wire;

use crate::shared::{Interval, Selection, Symbol};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::{CandleSeries, SeriesUpdate};

/// OHLC aggregate for one time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time, epoch seconds.
    pub time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Candle {
    pub fn new(time: i64, open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }

    /// Fold a last-traded price into this bucket.
    ///
    /// `close` becomes the price and the range only ever widens; `time` and
    /// `open` are untouched.
    pub fn with_trade(&self, price: Decimal) -> Candle {
        Candle {
            time: self.time,
            open: self.open,
            high: self.high.max(price),
            low: self.low.min(price),
            close: price,
        }
    }
}

/// An authoritative kline from the stream, tagged with its series.
#[derive(Debug, Clone, PartialEq)]
pub struct Kline {
    pub symbol: Symbol,
    pub interval: Interval,
    pub candle: Candle,
    /// Whether the server reports the bucket as final.
    pub is_closed: bool,
}

impl Kline {
    pub fn belongs_to(&self, selection: &Selection) -> bool {
        selection.matches(&self.symbol, self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: i64, high: i64, low: i64, close: i64) -> Candle {
        Candle::new(
            100,
            Decimal::from(open),
            Decimal::from(high),
            Decimal::from(low),
            Decimal::from(close),
        )
    }

    #[test]
    fn test_trade_inside_range_only_moves_close() {
        let c = candle(100, 110, 95, 104).with_trade(Decimal::from(102));
        assert_eq!(c, candle(100, 110, 95, 102));
    }

    #[test]
    fn test_trade_widens_high() {
        let c = candle(100, 110, 95, 104).with_trade(Decimal::from(115));
        assert_eq!(c.high, Decimal::from(115));
        assert_eq!(c.low, Decimal::from(95));
        assert_eq!(c.close, Decimal::from(115));
    }

    #[test]
    fn test_trade_widens_low() {
        let c = candle(100, 110, 95, 104).with_trade(Decimal::from(90));
        assert_eq!(c.high, Decimal::from(110));
        assert_eq!(c.low, Decimal::from(90));
        assert_eq!(c.open, Decimal::from(100));
        assert_eq!(c.time, 100);
    }

    #[test]
    fn test_kline_belongs_to_selection() {
        let kline = Kline {
            symbol: Symbol::from("BTCUSDT"),
            interval: Interval::Minute1,
            candle: candle(1, 1, 1, 1),
            is_closed: false,
        };
        assert!(kline.belongs_to(&Selection::new("btcusdt", Interval::Minute1)));
        assert!(!kline.belongs_to(&Selection::new("BTCUSDT", Interval::Minute5)));
    }
}
