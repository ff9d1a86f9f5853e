//! Async driver for [`DashboardSession`].
//!
//! One task, one `select!` loop: user selections, transport events and
//! finished fetches each become a [`SessionEvent`]. The session is the only
//! thing that mutates state; the loop just runs the effects it asks for and
//! publishes a fresh [`DashboardView`] whenever the session revision moves.

use std::future::Future;

use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesUnordered, Stream, StreamExt};
use tokio::sync::{mpsc, watch};

use crate::domain::candle::Candle;
use crate::domain::orderbook::OrderBookSnapshot;
use crate::error::{SdkError, WsError};
use crate::live::session::{DashboardSession, DashboardView, Effect, SessionEvent};
use crate::shared::{Selection, Symbol};
use crate::ws::{MessageOut, WsEvent};

// ─── Seams ───────────────────────────────────────────────────────────────────

/// Request/response market data.
pub trait MarketDataSource {
    fn fetch_history(
        &self,
        selection: &Selection,
    ) -> impl Future<Output = Result<Vec<Candle>, SdkError>> + Send;

    fn fetch_order_book(
        &self,
        symbol: &Symbol,
    ) -> impl Future<Output = Result<OrderBookSnapshot, SdkError>> + Send;
}

/// Outbound half of the stream session.
pub trait StreamSink {
    fn send(&self, msg: MessageOut) -> Result<(), WsError>;
}

#[cfg(feature = "http")]
impl MarketDataSource for crate::client::MarketClient {
    fn fetch_history(
        &self,
        selection: &Selection,
    ) -> impl Future<Output = Result<Vec<Candle>, SdkError>> + Send {
        async move { self.candles().history(selection).await }
    }

    fn fetch_order_book(
        &self,
        symbol: &Symbol,
    ) -> impl Future<Output = Result<OrderBookSnapshot, SdkError>> + Send {
        async move { self.orderbooks().snapshot(symbol).await }
    }
}

// ─── Runner ──────────────────────────────────────────────────────────────────

impl SessionEvent {
    /// Map a transport event onto the session. Transport errors that did not
    /// end the connection carry nothing for the session.
    pub fn from_ws(event: WsEvent) -> Option<SessionEvent> {
        match event {
            WsEvent::Message(message) => Some(SessionEvent::Stream(message)),
            WsEvent::Connected => Some(SessionEvent::Connected),
            WsEvent::Disconnected { code, reason } => {
                tracing::debug!(?code, %reason, "Transport disconnected");
                Some(SessionEvent::Disconnected { reason })
            }
            WsEvent::Error(e) => {
                tracing::debug!(error = %e, "Transport error");
                None
            }
            WsEvent::MaxReconnectReached => {
                tracing::warn!("Stream reconnection exhausted");
                Some(SessionEvent::Disconnected {
                    reason: "reconnect attempts exhausted".into(),
                })
            }
        }
    }
}

/// Drive a [`DashboardSession`] until `selections` closes or `events` ends.
///
/// Returns the session so the caller can inspect its final state.
pub async fn run_dashboard<S, K, E>(
    source: &S,
    sink: &K,
    events: E,
    mut selections: mpsc::Receiver<Selection>,
    view_tx: watch::Sender<DashboardView>,
) -> DashboardSession
where
    S: MarketDataSource + Sync,
    K: StreamSink,
    E: Stream<Item = WsEvent>,
{
    let mut session = DashboardSession::new();
    let mut published = session.revision();
    let mut in_flight: FuturesUnordered<BoxFuture<'_, SessionEvent>> = FuturesUnordered::new();
    tokio::pin!(events);

    loop {
        let event = tokio::select! {
            selection = selections.recv() => match selection {
                Some(selection) => SessionEvent::SelectionChanged(selection),
                None => {
                    tracing::info!("Selection channel closed, stopping dashboard");
                    break;
                }
            },
            ws_event = events.next() => match ws_event {
                Some(ws_event) => match SessionEvent::from_ws(ws_event) {
                    Some(event) => event,
                    None => continue,
                },
                None => {
                    tracing::info!("Stream events ended, stopping dashboard");
                    break;
                }
            },
            Some(done) = in_flight.next(), if !in_flight.is_empty() => done,
        };

        for effect in session.handle(event) {
            match effect {
                Effect::FetchHistory(selection) => {
                    in_flight.push(Box::pin(async move {
                        let result = source.fetch_history(&selection).await;
                        SessionEvent::HistoryLoaded { selection, result }
                    }));
                }
                Effect::FetchOrderBook(selection) => {
                    in_flight.push(Box::pin(async move {
                        let result = source.fetch_order_book(&selection.symbol).await;
                        SessionEvent::OrderBookLoaded { selection, result }
                    }));
                }
                Effect::Send(msg) => {
                    if let Err(e) = sink.send(msg) {
                        tracing::warn!(error = %e, "Failed to send subscribe");
                    }
                }
            }
        }

        if session.revision() != published {
            published = session.revision();
            view_tx.send_replace(session.view());
        }
    }

    session
}
