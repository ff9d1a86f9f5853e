//! Tick merger: folds stream klines and trades into the candle series.

use crate::domain::candle::{CandleSeries, Kline, SeriesUpdate};
use crate::domain::trade::Tick;
use crate::shared::Selection;

/// What a single merge did to the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The message reached the series; the inner value says how it landed.
    Applied(SeriesUpdate),
    /// Symbol or interval belongs to another selection.
    OtherSelection,
    /// A trade arrived before any candle existed to fold it into.
    NoTail,
}

impl MergeOutcome {
    /// Whether the series changed.
    pub fn changed(&self) -> bool {
        matches!(
            self,
            MergeOutcome::Applied(SeriesUpdate::Appended | SeriesUpdate::Updated)
        )
    }
}

/// Borrowed view over the active selection's series.
///
/// Holds no state of its own; the tail it updates is always
/// `series.current_tail()`.
pub struct TickMerger<'a> {
    selection: &'a Selection,
    series: &'a mut CandleSeries,
}

impl<'a> TickMerger<'a> {
    pub fn new(selection: &'a Selection, series: &'a mut CandleSeries) -> Self {
        Self { selection, series }
    }

    /// Authoritative OHLC for one bucket: append, replace the tail, or drop
    /// if older than the tail.
    pub fn apply_kline(&mut self, kline: &Kline) -> MergeOutcome {
        if !kline.belongs_to(self.selection) {
            return MergeOutcome::OtherSelection;
        }
        MergeOutcome::Applied(self.series.append_or_update(kline.candle.clone()))
    }

    /// Last-traded price: moves `close` and widens the tail's range.
    pub fn apply_trade(&mut self, tick: &Tick) -> MergeOutcome {
        if tick.symbol != self.selection.symbol {
            return MergeOutcome::OtherSelection;
        }
        let updated = match self.series.current_tail() {
            Some(tail) => tail.with_trade(tick.price),
            None => return MergeOutcome::NoTail,
        };
        MergeOutcome::Applied(self.series.append_or_update(updated))
    }
}
