//! `run_dashboard` against an in-memory source and sink.
//!
//! Time is paused, so fetch delays resolve in virtual time and the ordering
//! of slow and fast fetches is deterministic.

#![cfg(feature = "ws-native")]

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use futures_util::stream::{self, Stream};
use market_sync::domain::candle::Candle;
use market_sync::domain::orderbook::{BookState, OrderBookSnapshot, PriceLevel};
use market_sync::error::{SdkError, WsError};
use market_sync::live::{run_dashboard, DashboardView, LoadStatus, MarketDataSource, StreamSink};
use market_sync::shared::{Interval, Selection, Symbol};
use market_sync::ws::{MessageOut, WsEvent};
use rust_decimal::Decimal;
use tokio::sync::{mpsc, watch};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeSource {
    /// `None` candles means the fetch fails.
    history: HashMap<Selection, (Duration, Option<Vec<Candle>>)>,
    books: HashMap<Symbol, OrderBookSnapshot>,
}

impl MarketDataSource for FakeSource {
    fn fetch_history(
        &self,
        selection: &Selection,
    ) -> impl Future<Output = Result<Vec<Candle>, SdkError>> + Send {
        let entry = self.history.get(selection).cloned();
        async move {
            match entry {
                Some((delay, candles)) => {
                    tokio::time::sleep(delay).await;
                    candles.ok_or_else(|| SdkError::Other("history unavailable".into()))
                }
                None => Err(SdkError::Other("unknown selection".into())),
            }
        }
    }

    fn fetch_order_book(
        &self,
        symbol: &Symbol,
    ) -> impl Future<Output = Result<OrderBookSnapshot, SdkError>> + Send {
        let book = self.books.get(symbol).cloned();
        async move { book.ok_or_else(|| SdkError::Other("order book unavailable".into())) }
    }
}

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<MessageOut>>,
}

impl StreamSink for RecordingSink {
    fn send(&self, msg: MessageOut) -> Result<(), WsError> {
        self.sent.lock().unwrap().push(msg);
        Ok(())
    }
}

impl RecordingSink {
    fn sent(&self) -> Vec<MessageOut> {
        self.sent.lock().unwrap().clone()
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn btc() -> Selection {
    Selection::new("BTCUSDT", Interval::Minute1)
}

fn eth() -> Selection {
    Selection::new("ETHUSDT", Interval::Minute1)
}

fn flat(time: i64, price: i64) -> Candle {
    let p = Decimal::from(price);
    Candle::new(time, p, p, p, p)
}

fn book(symbol: &str, bid: i64) -> OrderBookSnapshot {
    OrderBookSnapshot {
        symbol: Symbol::from(symbol),
        bids: vec![PriceLevel::new(Decimal::from(bid), Decimal::ONE)],
        asks: vec![],
        last_update_id: None,
    }
}

fn event_stream(rx: mpsc::Receiver<WsEvent>) -> impl Stream<Item = WsEvent> {
    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|e| (e, rx)) })
}

async fn step() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_slow_old_fetch_is_discarded() {
    let mut source = FakeSource::default();
    source
        .history
        .insert(btc(), (Duration::from_millis(500), Some(vec![flat(60, 1), flat(120, 1)])));
    source
        .history
        .insert(eth(), (Duration::from_millis(50), Some(vec![flat(60, 2)])));
    source.books.insert(Symbol::from("ETHUSDT"), book("ETHUSDT", 2));
    let sink = RecordingSink::default();

    let (event_tx, event_rx) = mpsc::channel(16);
    let (selection_tx, selection_rx) = mpsc::channel(4);
    let (view_tx, view_rx) = watch::channel(DashboardView::default());

    let driver = async move {
        event_tx.send(WsEvent::Connected).await.unwrap();
        step().await;
        selection_tx.send(btc()).await.unwrap();
        step().await;
        selection_tx.send(eth()).await.unwrap();
        // Long enough for both fetches, including the slow one for BTC.
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(selection_tx);
        drop(event_tx);
    };

    let (session, ()) = tokio::join!(
        run_dashboard(&source, &sink, event_stream(event_rx), selection_rx, view_tx),
        driver
    );

    assert_eq!(session.selection(), Some(&eth()));
    assert_eq!(session.series().candles(), &[flat(60, 2)]);
    assert_eq!(session.history_status(), &LoadStatus::Ready);
    assert_eq!(
        sink.sent(),
        vec![MessageOut::subscribe(btc()), MessageOut::subscribe(eth())]
    );

    let view = view_rx.borrow().clone();
    assert_eq!(view.selection, Some(eth()));
    assert_eq!(view.candles, vec![flat(60, 2)]);
    assert!(matches!(view.order_book, BookState::Loaded(ref b) if b.symbol.as_str() == "ETHUSDT"));
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_replays_current_selection() {
    let mut source = FakeSource::default();
    source.history.insert(btc(), (Duration::ZERO, Some(vec![])));
    source.history.insert(eth(), (Duration::ZERO, Some(vec![])));
    let sink = RecordingSink::default();

    let (event_tx, event_rx) = mpsc::channel(16);
    let (selection_tx, selection_rx) = mpsc::channel(4);
    let (view_tx, _view_rx) = watch::channel(DashboardView::default());

    let driver = async move {
        event_tx.send(WsEvent::Connected).await.unwrap();
        step().await;
        selection_tx.send(btc()).await.unwrap();
        step().await;
        event_tx
            .send(WsEvent::Disconnected {
                code: None,
                reason: "reset".into(),
            })
            .await
            .unwrap();
        step().await;
        selection_tx.send(eth()).await.unwrap();
        step().await;
        event_tx.send(WsEvent::Connected).await.unwrap();
        step().await;
        drop(selection_tx);
        drop(event_tx);
    };

    let (session, ()) = tokio::join!(
        run_dashboard(&source, &sink, event_stream(event_rx), selection_rx, view_tx),
        driver
    );

    assert!(session.is_connected());
    assert_eq!(
        sink.sent(),
        vec![MessageOut::subscribe(btc()), MessageOut::subscribe(eth())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failures_surface_in_view() {
    let mut source = FakeSource::default();
    source.history.insert(btc(), (Duration::ZERO, None));
    let sink = RecordingSink::default();

    let (event_tx, event_rx) = mpsc::channel(16);
    let (selection_tx, selection_rx) = mpsc::channel(4);
    let (view_tx, view_rx) = watch::channel(DashboardView::default());

    let driver = async move {
        selection_tx.send(btc()).await.unwrap();
        step().await;
        drop(selection_tx);
        drop(event_tx);
    };

    tokio::join!(
        run_dashboard(&source, &sink, event_stream(event_rx), selection_rx, view_tx),
        driver
    );

    let view = view_rx.borrow().clone();
    assert!(matches!(view.history, LoadStatus::Failed(_)));
    assert!(matches!(view.order_book_status, LoadStatus::Failed(_)));
    match view.order_book {
        BookState::Loaded(b) => assert!(b.is_empty()),
        BookState::NotLoaded => panic!("expected empty fallback book"),
    }
    assert!(!view.connected);
    assert!(sink.sent().is_empty());
}
