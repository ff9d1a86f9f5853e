//! Terminal demo: drives a dashboard session against the live services and
//! logs every view change.
//!
//! ```bash
//! cargo run --features cli --bin live-dashboard -- BTCUSDT@1m ETHUSDT@5m
//! ```
//!
//! With more than one selection the dashboard rotates through them every
//! `DASHBOARD_ROTATE_SECS` seconds (default 30). Service URLs come from
//! `MARKET_API_URL`, `MARKET_ORDERBOOK_URL` and `MARKET_WS_URL`, optionally
//! via a `.env` file.

use std::time::Duration;

use market_sync::network::env_or;
use market_sync::prelude::*;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const ROTATE_ENV: &str = "DASHBOARD_ROTATE_SECS";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut selections = std::env::args()
        .skip(1)
        .map(|arg| arg.parse::<Selection>())
        .collect::<Result<Vec<_>, _>>()?;
    if selections.is_empty() {
        selections.push(Selection::new("BTCUSDT", Interval::Minute1));
    }

    let rotate = env_or(ROTATE_ENV, "30").parse::<u64>().unwrap_or_else(|_| {
        warn!(var = ROTATE_ENV, "Not a number of seconds, using 30");
        30
    });

    // ── 2. Clients ───────────────────────────────────────────────────────
    let client = MarketClient::from_env()?;
    let mut ws = client.ws_native();
    ws.connect().await?;
    info!(url = %client.ws_config().url, "Stream session started");

    let (selection_tx, selection_rx) = mpsc::channel(8);
    let (view_tx, mut view_rx) = watch::channel(DashboardView::default());

    // ── 3. Selection feed ────────────────────────────────────────────────
    let feed = async move {
        for selection in selections.iter().cycle() {
            if selection_tx.send(selection.clone()).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_secs(rotate)).await;
        }
    };

    // ── 4. View logger ───────────────────────────────────────────────────
    let render = async move {
        while view_rx.changed().await.is_ok() {
            let view = view_rx.borrow_and_update().clone();
            log_view(&view);
        }
    };

    // ── 5. Run until interrupted ─────────────────────────────────────────
    tokio::select! {
        _ = run_dashboard(&client, &ws, ws.events(), selection_rx, view_tx) => {}
        _ = feed => {}
        _ = render => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    ws.disconnect().await?;
    Ok(())
}

fn log_view(view: &DashboardView) {
    let Some(selection) = &view.selection else {
        return;
    };
    let tail = view.candles.last();
    let (best_bid, best_ask) = match &view.order_book {
        BookState::Loaded(book) => (book.best_bid(), book.best_ask()),
        BookState::NotLoaded => (None, None),
    };

    info!(
        %selection,
        connected = view.connected,
        history = ?view.history,
        book = ?view.order_book_status,
        candles = view.candles.len(),
        time = tail.map(|c| c.time),
        close = %tail.map(|c| c.close.to_string()).unwrap_or_else(|| "-".into()),
        best_bid = ?best_bid,
        best_ask = ?best_ask,
        "dashboard"
    );
}
