//! Candle series state container: app-owned, SDK-provided update logic.

use super::Candle;
use crate::error::InvalidSeriesError;
use rust_decimal::Decimal;

/// Result of [`CandleSeries::append_or_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesUpdate {
    /// A new tail bucket was pushed.
    Appended,
    /// The tail bucket was replaced in place.
    Updated,
    /// The candle was older than the tail and ignored.
    Dropped,
}

/// Ordered candle sequence for the active selection.
///
/// Times strictly increase from front to back; there is exactly one candle
/// per distinct time. Only the last candle is ever mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole series with a historical snapshot.
    ///
    /// The input must be strictly increasing in time; on error the current
    /// series is left untouched.
    pub fn replace_all(&mut self, candles: Vec<Candle>) -> Result<(), InvalidSeriesError> {
        if let Some(index) = candles.windows(2).position(|w| w[1].time <= w[0].time) {
            return Err(InvalidSeriesError {
                index: index + 1,
                previous: candles[index].time,
                time: candles[index + 1].time,
            });
        }
        self.candles = candles;
        Ok(())
    }

    /// Apply a single candle at the tail.
    ///
    /// Same time as the tail replaces it, a later time appends, an earlier
    /// time is dropped. An empty series accepts any candle.
    pub fn append_or_update(&mut self, candle: Candle) -> SeriesUpdate {
        if let Some(last) = self.candles.last_mut() {
            if candle.time == last.time {
                *last = candle;
                return SeriesUpdate::Updated;
            }
            if candle.time < last.time {
                return SeriesUpdate::Dropped;
            }
        }
        self.candles.push(candle);
        SeriesUpdate::Appended
    }

    /// The most recent candle, if any.
    pub fn current_tail(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn clear(&mut self) {
        self.candles.clear();
    }

    /// Simple moving average of closes, aligned index-for-index with the series.
    ///
    /// Entries before the first full window are `None`.
    pub fn sma(&self, period: usize) -> Vec<Option<Decimal>> {
        let mut out = vec![None; self.candles.len()];
        if period == 0 || self.candles.len() < period {
            return out;
        }

        let divisor = Decimal::from(period as u64);
        let mut window: Decimal = self.candles[..period].iter().map(|c| c.close).sum();
        out[period - 1] = Some(window / divisor);

        for i in period..self.candles.len() {
            window += self.candles[i].close - self.candles[i - period].close;
            out[i] = Some(window / divisor);
        }
        out
    }
}
