//! Dashboard session: the single place dashboard state changes.
//!
//! Every external happening is a [`SessionEvent`]. [`DashboardSession::handle`]
//! applies it to the stores and returns the I/O the driver should start
//! next. Nothing here awaits, so the session can be driven by the async
//! runner or stepped by hand in tests.

use crate::domain::candle::{Candle, CandleSeries};
use crate::domain::orderbook::{BookState, OrderBookSnapshot, OrderBookView};
use crate::error::SdkError;
use crate::live::merger::TickMerger;
use crate::live::subscription::SubscriptionManager;
use crate::shared::Selection;
use crate::ws::{MessageOut, StreamMessage};

// ─── Events and effects ──────────────────────────────────────────────────────

/// Input to [`DashboardSession::handle`].
#[derive(Debug)]
pub enum SessionEvent {
    /// The user picked a (symbol, interval).
    SelectionChanged(Selection),
    /// A history fetch finished. `selection` is the one it was started for.
    HistoryLoaded {
        selection: Selection,
        result: Result<Vec<Candle>, SdkError>,
    },
    /// An order-book fetch finished. `selection` is the one it was started for.
    OrderBookLoaded {
        selection: Selection,
        result: Result<OrderBookSnapshot, SdkError>,
    },
    /// A parsed stream message.
    Stream(StreamMessage),
    /// The transport (re)connected.
    Connected,
    /// The transport dropped; it reconnects on its own.
    Disconnected { reason: String },
}

/// I/O requested by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchHistory(Selection),
    FetchOrderBook(Selection),
    Send(MessageOut),
}

/// Loading indicator for one view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Read-only snapshot handed to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub selection: Option<Selection>,
    pub candles: Vec<Candle>,
    pub history: LoadStatus,
    pub order_book: BookState,
    pub order_book_status: LoadStatus,
    pub connected: bool,
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Owns the candle series, the order book view and the one subscription
/// manager for the dashboard.
#[derive(Debug, Default)]
pub struct DashboardSession {
    subscription: SubscriptionManager,
    series: CandleSeries,
    book: OrderBookView,
    history: LoadStatus,
    order_book_status: LoadStatus,
    connected: bool,
    revision: u64,
}

impl DashboardSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event and return the effects to run, in order.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::SelectionChanged(selection) => self.on_selection(selection),
            SessionEvent::HistoryLoaded { selection, result } => {
                self.on_history(selection, result);
                Vec::new()
            }
            SessionEvent::OrderBookLoaded { selection, result } => {
                self.on_order_book(selection, result);
                Vec::new()
            }
            SessionEvent::Stream(message) => {
                self.on_stream(message);
                Vec::new()
            }
            SessionEvent::Connected => {
                self.connected = true;
                self.touch();
                tracing::info!(selection = ?self.subscription.current(), "Stream connected");
                self.subscription
                    .on_reconnect()
                    .map(Effect::Send)
                    .into_iter()
                    .collect()
            }
            SessionEvent::Disconnected { reason } => {
                self.connected = false;
                self.touch();
                tracing::info!(%reason, "Stream disconnected");
                Vec::new()
            }
        }
    }

    fn on_selection(&mut self, selection: Selection) -> Vec<Effect> {
        let Some(subscribe) = self.subscription.set_selection(selection.clone()) else {
            tracing::debug!(%selection, "Selection unchanged");
            return Vec::new();
        };

        tracing::info!(%selection, "Selection changed");
        self.touch();
        self.series.clear();
        self.book.reset(selection.symbol.clone());
        self.history = LoadStatus::Loading;
        self.order_book_status = LoadStatus::Loading;

        let mut effects = vec![
            Effect::FetchHistory(selection.clone()),
            Effect::FetchOrderBook(selection),
        ];
        // While disconnected the next Connected replays the subscription.
        if self.connected {
            effects.push(Effect::Send(subscribe));
        }
        effects
    }

    fn is_current(&self, selection: &Selection) -> bool {
        self.subscription.current() == Some(selection)
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn on_history(&mut self, selection: Selection, result: Result<Vec<Candle>, SdkError>) {
        if !self.is_current(&selection) {
            tracing::debug!(%selection, "Discarding history for inactive selection");
            return;
        }
        self.touch();

        let candles = match result {
            Ok(candles) => candles,
            Err(e) => {
                tracing::warn!(%selection, error = %e, "History fetch failed");
                self.history = LoadStatus::Failed(e.to_string());
                return;
            }
        };

        // Everything in the store so far came from the stream. Buckets at or
        // past the end of history are replayed on top of it.
        let history_end = candles.last().map(|c| c.time);
        let live: Vec<Candle> = self
            .series
            .candles()
            .iter()
            .filter(|c| history_end.map_or(true, |end| c.time >= end))
            .cloned()
            .collect();
        if let Err(e) = self.series.replace_all(candles) {
            tracing::warn!(%selection, error = %e, "Rejected out-of-order history");
            self.history = LoadStatus::Failed(e.to_string());
            return;
        }
        if !live.is_empty() {
            tracing::debug!(%selection, live = live.len(), "Re-applying live candles over history");
        }
        for candle in live {
            self.series.append_or_update(candle);
        }

        tracing::debug!(%selection, candles = self.series.len(), "History loaded");
        self.history = LoadStatus::Ready;
    }

    fn on_order_book(
        &mut self,
        selection: Selection,
        result: Result<OrderBookSnapshot, SdkError>,
    ) {
        if !self.is_current(&selection) {
            tracing::debug!(%selection, "Discarding order book for inactive selection");
            return;
        }
        self.touch();

        match result {
            Ok(snapshot) => {
                // A stream snapshot that beat the fetch is at least as fresh.
                if self.book.is_loaded() {
                    tracing::debug!(%selection, "Order book already live, ignoring fetched snapshot");
                } else {
                    self.book.apply(snapshot);
                }
                self.order_book_status = LoadStatus::Ready;
            }
            Err(e) => {
                tracing::warn!(%selection, error = %e, "Order book fetch failed");
                if !self.book.is_loaded() {
                    self.book
                        .apply(OrderBookSnapshot::empty(selection.symbol.clone()));
                }
                self.order_book_status = LoadStatus::Failed(e.to_string());
            }
        }
    }

    fn on_stream(&mut self, message: StreamMessage) {
        match message {
            StreamMessage::Kline(kline) => {
                let Some(selection) = self.subscription.current() else {
                    return;
                };
                let outcome = TickMerger::new(selection, &mut self.series).apply_kline(&kline);
                if outcome.changed() {
                    self.touch();
                } else {
                    tracing::debug!(
                        symbol = %kline.symbol,
                        interval = %kline.interval,
                        time = kline.candle.time,
                        ?outcome,
                        "Kline not applied"
                    );
                }
            }
            StreamMessage::Trade(tick) => {
                let Some(selection) = self.subscription.current() else {
                    return;
                };
                let outcome = TickMerger::new(selection, &mut self.series).apply_trade(&tick);
                if outcome.changed() {
                    self.touch();
                } else {
                    tracing::debug!(symbol = %tick.symbol, ?outcome, "Trade not applied");
                }
            }
            StreamMessage::OrderBook(snapshot) => {
                let symbol = snapshot.symbol.clone();
                if self.book.apply(snapshot) {
                    self.order_book_status = LoadStatus::Ready;
                    self.touch();
                } else {
                    tracing::debug!(%symbol, "Order book for inactive symbol");
                }
            }
        }
    }

    // ── Read access ──────────────────────────────────────────────────────

    pub fn selection(&self) -> Option<&Selection> {
        self.subscription.current()
    }

    pub fn subscription(&self) -> &SubscriptionManager {
        &self.subscription
    }

    pub fn series(&self) -> &CandleSeries {
        &self.series
    }

    pub fn order_book(&self) -> &OrderBookView {
        &self.book
    }

    pub fn history_status(&self) -> &LoadStatus {
        &self.history
    }

    pub fn order_book_status(&self) -> &LoadStatus {
        &self.order_book_status
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Bumped whenever [`view`](Self::view) would return something different.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            selection: self.subscription.current().cloned(),
            candles: self.series.candles().to_vec(),
            history: self.history.clone(),
            order_book: self.book.state().clone(),
            order_book_status: self.order_book_status.clone(),
            connected: self.connected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::Kline;
    use crate::domain::orderbook::PriceLevel;
    use crate::domain::trade::Tick;
    use crate::error::HttpError;
    use crate::shared::{Interval, Symbol};
    use rust_decimal::Decimal;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn btc() -> Selection {
        Selection::new("BTCUSDT", Interval::Minute1)
    }

    fn candle(time: i64, close: i64) -> Candle {
        Candle::new(time, d(close), d(close), d(close), d(close))
    }

    fn kline(selection: &Selection, time: i64, close: i64) -> SessionEvent {
        SessionEvent::Stream(StreamMessage::Kline(Kline {
            symbol: selection.symbol.clone(),
            interval: selection.interval,
            candle: candle(time, close),
            is_closed: false,
        }))
    }

    fn book(symbol: &str, bid: i64) -> OrderBookSnapshot {
        OrderBookSnapshot {
            symbol: Symbol::from(symbol),
            bids: vec![PriceLevel::new(d(bid), d(1))],
            asks: vec![],
            last_update_id: None,
        }
    }

    fn fetch_error() -> SdkError {
        SdkError::Http(HttpError::ServerError {
            status: 500,
            body: "boom".into(),
        })
    }

    #[test]
    fn test_selection_requests_fetches() {
        let mut session = DashboardSession::new();
        let effects = session.handle(SessionEvent::SelectionChanged(btc()));

        assert_eq!(
            effects,
            vec![Effect::FetchHistory(btc()), Effect::FetchOrderBook(btc())]
        );
        assert_eq!(session.history_status(), &LoadStatus::Loading);
        assert_eq!(session.order_book_status(), &LoadStatus::Loading);
    }

    #[test]
    fn test_selection_while_connected_also_subscribes() {
        let mut session = DashboardSession::new();
        assert!(session.handle(SessionEvent::Connected).is_empty());

        let effects = session.handle(SessionEvent::SelectionChanged(btc()));
        assert_eq!(effects.len(), 3);
        assert_eq!(effects[2], Effect::Send(MessageOut::subscribe(btc())));
    }

    #[test]
    fn test_same_selection_twice_is_noop() {
        let mut session = DashboardSession::new();
        session.handle(SessionEvent::Connected);
        session.handle(SessionEvent::SelectionChanged(btc()));
        assert!(session.handle(SessionEvent::SelectionChanged(btc())).is_empty());
    }

    #[test]
    fn test_history_then_stream() {
        let mut session = DashboardSession::new();
        session.handle(SessionEvent::SelectionChanged(btc()));
        session.handle(SessionEvent::HistoryLoaded {
            selection: btc(),
            result: Ok(vec![candle(60, 10), candle(120, 11)]),
        });
        session.handle(kline(&btc(), 120, 12));
        session.handle(kline(&btc(), 180, 13));

        let times: Vec<i64> = session.series().candles().iter().map(|c| c.time).collect();
        assert_eq!(times, vec![60, 120, 180]);
        assert_eq!(session.series().candles()[1].close, d(12));
        assert_eq!(session.history_status(), &LoadStatus::Ready);
    }

    #[test]
    fn test_live_candle_survives_late_history() {
        let mut session = DashboardSession::new();
        session.handle(SessionEvent::SelectionChanged(btc()));
        session.handle(kline(&btc(), 180, 13));
        session.handle(SessionEvent::HistoryLoaded {
            selection: btc(),
            result: Ok(vec![candle(60, 10), candle(120, 11)]),
        });

        let times: Vec<i64> = session.series().candles().iter().map(|c| c.time).collect();
        assert_eq!(times, vec![60, 120, 180]);
    }

    #[test]
    fn test_every_live_bucket_survives_late_history() {
        let mut session = DashboardSession::new();
        session.handle(SessionEvent::SelectionChanged(btc()));
        session.handle(kline(&btc(), 120, 12));
        session.handle(kline(&btc(), 180, 13));
        session.handle(SessionEvent::HistoryLoaded {
            selection: btc(),
            result: Ok(vec![candle(0, 9), candle(60, 10)]),
        });

        let times: Vec<i64> = session.series().candles().iter().map(|c| c.time).collect();
        assert_eq!(times, vec![0, 60, 120, 180]);
        assert_eq!(session.series().candles()[2].close, d(12));
    }

    #[test]
    fn test_live_bucket_overrides_history_tail() {
        let mut session = DashboardSession::new();
        session.handle(SessionEvent::SelectionChanged(btc()));
        session.handle(kline(&btc(), 60, 3));
        session.handle(kline(&btc(), 120, 4));
        session.handle(SessionEvent::HistoryLoaded {
            selection: btc(),
            result: Ok(vec![candle(0, 1), candle(60, 2), candle(120, 2)]),
        });

        let closes: Vec<Decimal> = session.series().candles().iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![d(1), d(2), d(4)]);
    }

    #[test]
    fn test_revision_moves_only_on_visible_change() {
        let mut session = DashboardSession::new();
        session.handle(SessionEvent::SelectionChanged(btc()));
        session.handle(kline(&btc(), 120, 12));
        let before = session.revision();

        // An older bucket, a foreign trade and a repeated selection are no-ops.
        session.handle(kline(&btc(), 60, 1));
        session.handle(SessionEvent::Stream(StreamMessage::Trade(Tick::new("ETHUSDT", d(5)))));
        session.handle(SessionEvent::SelectionChanged(btc()));
        assert_eq!(session.revision(), before);

        session.handle(SessionEvent::Stream(StreamMessage::Trade(Tick::new("BTCUSDT", d(13)))));
        assert_ne!(session.revision(), before);
    }

    #[test]
    fn test_invalid_history_keeps_live_data() {
        let mut session = DashboardSession::new();
        session.handle(SessionEvent::SelectionChanged(btc()));
        session.handle(kline(&btc(), 180, 13));
        session.handle(SessionEvent::HistoryLoaded {
            selection: btc(),
            result: Ok(vec![candle(120, 11), candle(60, 10)]),
        });

        assert_eq!(session.series().len(), 1);
        assert!(matches!(session.history_status(), LoadStatus::Failed(_)));
    }

    #[test]
    fn test_history_failure_reports_status() {
        let mut session = DashboardSession::new();
        session.handle(SessionEvent::SelectionChanged(btc()));
        session.handle(SessionEvent::HistoryLoaded {
            selection: btc(),
            result: Err(fetch_error()),
        });

        assert!(session.series().is_empty());
        match session.history_status() {
            LoadStatus::Failed(msg) => assert!(msg.contains("500")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_order_book_fetch_failure_falls_back_to_empty() {
        let mut session = DashboardSession::new();
        session.handle(SessionEvent::SelectionChanged(btc()));
        session.handle(SessionEvent::OrderBookLoaded {
            selection: btc(),
            result: Err(fetch_error()),
        });

        let snapshot = session.order_book().snapshot().unwrap();
        assert!(snapshot.is_empty());
        assert!(matches!(session.order_book_status(), LoadStatus::Failed(_)));
    }

    #[test]
    fn test_stream_book_beats_fetch() {
        let mut session = DashboardSession::new();
        session.handle(SessionEvent::SelectionChanged(btc()));
        session.handle(SessionEvent::Stream(StreamMessage::OrderBook(book("BTCUSDT", 50))));
        session.handle(SessionEvent::OrderBookLoaded {
            selection: btc(),
            result: Ok(book("BTCUSDT", 40)),
        });

        assert_eq!(
            session.order_book().snapshot().unwrap().best_bid(),
            Some(d(50))
        );
        assert_eq!(session.order_book_status(), &LoadStatus::Ready);
    }

    #[test]
    fn test_stream_book_for_other_symbol_ignored() {
        let mut session = DashboardSession::new();
        session.handle(SessionEvent::SelectionChanged(btc()));
        session.handle(SessionEvent::Stream(StreamMessage::OrderBook(book("ETHUSDT", 50))));

        assert!(!session.order_book().is_loaded());
        assert_eq!(session.order_book_status(), &LoadStatus::Loading);
    }

    #[test]
    fn test_trade_before_any_candle_dropped() {
        let mut session = DashboardSession::new();
        session.handle(SessionEvent::SelectionChanged(btc()));
        session.handle(SessionEvent::Stream(StreamMessage::Trade(Tick::new(
            "BTCUSDT",
            d(100),
        ))));
        assert!(session.series().is_empty());
    }

    #[test]
    fn test_stream_before_selection_ignored() {
        let mut session = DashboardSession::new();
        session.handle(kline(&btc(), 60, 1));
        session.handle(SessionEvent::Stream(StreamMessage::OrderBook(book("BTCUSDT", 50))));

        assert!(session.series().is_empty());
        assert!(!session.order_book().is_loaded());
    }

    #[test]
    fn test_connection_flag_and_view() {
        let mut session = DashboardSession::new();
        session.handle(SessionEvent::SelectionChanged(btc()));
        session.handle(SessionEvent::Connected);
        session.handle(kline(&btc(), 60, 1));

        let view = session.view();
        assert!(view.connected);
        assert_eq!(view.selection, Some(btc()));
        assert_eq!(view.candles.len(), 1);
        assert_eq!(view.order_book, BookState::NotLoaded);

        session.handle(SessionEvent::Disconnected {
            reason: "reset".into(),
        });
        assert!(!session.view().connected);
    }
}
