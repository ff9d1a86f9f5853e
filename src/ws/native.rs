//! Native WebSocket client: `tokio-tungstenite`.
//!
//! - Background tokio task for connection management
//! - Exponential backoff reconnection with jitter
//! - Text frames parsed into [`StreamMessage`](crate::ws::StreamMessage);
//!   malformed frames are dropped
//! - Stream-based event delivery to consumer
//!
//! The transport keeps no subscription state. Every (re)connect is reported
//! as [`WsEvent::Connected`] and the owner of the selection re-subscribes.

use std::pin::Pin;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream, Stream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::WsError;
use crate::ws::subscriptions::Subscription;
use crate::ws::{parse_stream_message, MessageOut, ReadyState, WsConfig, WsEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const CLOSE_POLICY_VIOLATION: u16 = 1008;

// ─── Commands from public API to background task ─────────────────────────────

enum Command {
    Send(MessageOut),
    Disconnect,
}

// ─── Disconnect reasons for reconnection decision ────────────────────────────

enum DisconnectReason {
    UserRequested,
    RateLimited,
    Error(String),
}

// ─── Background task state ───────────────────────────────────────────────────

struct TaskState {
    config: WsConfig,
    event_tx: mpsc::Sender<WsEvent>,
    cmd_rx: mpsc::Receiver<Command>,
    reconnect_attempts: u32,
    ready_state: Arc<AtomicU16>,
}

impl TaskState {
    async fn emit(&self, event: WsEvent) {
        if self.event_tx.send(event).await.is_err() {
            tracing::trace!("WS event receiver dropped");
        }
    }

    fn set_ready_state(&self, state: ReadyState) {
        self.ready_state.store(state as u16, Ordering::SeqCst);
    }

    fn should_reconnect(&self) -> bool {
        self.config.reconnect
            && self
                .config
                .max_reconnect_attempts
                .map_or(true, |max| self.reconnect_attempts < max)
    }
}

// ─── Public WsClient ─────────────────────────────────────────────────────────

/// Native WebSocket client using `tokio-tungstenite`.
///
/// Uses a background tokio task for connection management.
/// The public API communicates with it via mpsc channels.
pub struct WsClient {
    config: WsConfig,
    cmd_tx: Option<mpsc::Sender<Command>>,
    event_rx: tokio::sync::Mutex<mpsc::Receiver<WsEvent>>,
    event_tx: mpsc::Sender<WsEvent>,
    task_handle: Option<JoinHandle<()>>,
    ready_state: Arc<AtomicU16>,
}

impl WsClient {
    /// Create a new WS client. Does not connect yet.
    pub fn new(config: WsConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(1024);
        Self {
            config,
            cmd_tx: None,
            event_rx: tokio::sync::Mutex::new(event_rx),
            event_tx,
            task_handle: None,
            ready_state: Arc::new(AtomicU16::new(ReadyState::Closed as u16)),
        }
    }

    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    /// Connect to the WebSocket server.
    ///
    /// Spawns a background tokio task that manages the connection and
    /// reconnection. Returns immediately; watch [`events`](Self::events) for
    /// [`WsEvent::Connected`].
    pub async fn connect(&mut self) -> Result<(), WsError> {
        if self.cmd_tx.is_some() {
            return Ok(());
        }

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        self.cmd_tx = Some(cmd_tx);
        self.ready_state
            .store(ReadyState::Connecting as u16, Ordering::SeqCst);

        let state = TaskState {
            config: self.config.clone(),
            event_tx: self.event_tx.clone(),
            cmd_rx,
            reconnect_attempts: 0,
            ready_state: Arc::clone(&self.ready_state),
        };

        let handle = tokio::spawn(run_task(state));
        self.task_handle = Some(handle);

        Ok(())
    }

    /// Disconnect from the WebSocket server.
    ///
    /// Sends a graceful close to the background task and waits for it to finish.
    pub async fn disconnect(&mut self) -> Result<(), WsError> {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(Command::Disconnect).await;
        }

        if let Some(handle) = self.task_handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }

        self.ready_state
            .store(ReadyState::Closed as u16, Ordering::SeqCst);
        Ok(())
    }

    /// Send a message to the server.
    ///
    /// Hands the message to the background task. While the socket is down the
    /// task drops it; the next [`WsEvent::Connected`] is the cue to re-send.
    /// Returns `WsError::NotConnected` if `connect` has not been called.
    pub fn send(&self, msg: MessageOut) -> Result<(), WsError> {
        match &self.cmd_tx {
            Some(tx) => tx.try_send(Command::Send(msg)).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    WsError::SendFailed("Command channel full".into())
                }
                mpsc::error::TrySendError::Closed(_) => WsError::NotConnected,
            }),
            None => Err(WsError::NotConnected),
        }
    }

    /// Subscribe to klines, trades and order book for one selection.
    ///
    /// Replaces whatever this connection was subscribed to before.
    pub fn subscribe(&self, subscription: impl Subscription) -> Result<(), WsError> {
        tracing::debug!(key = %subscription.subscription_key(), "WS subscribe");
        self.send(MessageOut::subscribe(subscription))
    }

    /// Whether the WebSocket is currently open.
    pub fn is_connected(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    /// Current connection state.
    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from(self.ready_state.load(Ordering::SeqCst))
    }

    /// Force a fresh connection attempt.
    ///
    /// Tears down the current connection (if any), resets the reconnect
    /// counter, and spawns a new background task.
    pub async fn restart_connection(&mut self) {
        if self.ready_state() == ReadyState::Connecting && self.cmd_tx.is_some() {
            tracing::info!("Already connecting, skipping restart");
            return;
        }

        tracing::info!("Manual reconnection requested");
        self.disconnect().await.ok();
        self.connect().await.ok();
    }

    /// Get a stream of events from the WebSocket connection.
    ///
    /// The returned stream borrows `self`, so it must be dropped
    /// before calling `disconnect()`.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = WsEvent> + Send + '_>> {
        Box::pin(futures_util::stream::unfold(
            &self.event_rx,
            |rx| async move {
                let mut guard = rx.lock().await;
                guard.recv().await.map(|event| (event, rx))
            },
        ))
    }
}

impl crate::live::StreamSink for WsClient {
    fn send(&self, msg: MessageOut) -> Result<(), WsError> {
        WsClient::send(self, msg)
    }
}

impl Drop for WsClient {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task(mut state: TaskState) {
    loop {
        // ── 1. Attempt connection ────────────────────────────────────────
        state.set_ready_state(ReadyState::Connecting);
        let (sink, stream) = match attempt_connect(&state.config.url).await {
            Ok(parts) => parts,
            Err(e) => {
                tracing::warn!(url = %state.config.url, error = %e, "WebSocket connection failed");
                state
                    .emit(WsEvent::Error(format!("Connection failed: {}", e)))
                    .await;

                if !state.should_reconnect() {
                    finish(&state, true).await;
                    return;
                }
                if !backoff_sleep(&mut state, false).await {
                    finish(&state, false).await;
                    return;
                }
                continue;
            }
        };

        // ── 2. Connected ─────────────────────────────────────────────────
        state.reconnect_attempts = 0;
        state.set_ready_state(ReadyState::Open);
        tracing::info!(url = %state.config.url, "WebSocket connected");
        state.emit(WsEvent::Connected).await;

        // ── 3. Inner select! loop ────────────────────────────────────────
        let reason = run_connected(&mut state, sink, stream).await;

        // ── 4. Post-disconnect decision ──────────────────────────────────
        state.set_ready_state(ReadyState::Closed);

        let rate_limited = match reason {
            DisconnectReason::UserRequested => return,
            DisconnectReason::RateLimited => true,
            DisconnectReason::Error(reason) => {
                tracing::info!(%reason, "WebSocket disconnected");
                false
            }
        };

        if !state.should_reconnect() {
            finish(&state, true).await;
            return;
        }
        if !backoff_sleep(&mut state, rate_limited).await {
            finish(&state, false).await;
            return;
        }
    }
}

/// Terminal bookkeeping when the task stops on its own.
async fn finish(state: &TaskState, exhausted: bool) {
    state.set_ready_state(ReadyState::Closed);
    if exhausted && state.config.reconnect {
        tracing::warn!(
            attempts = state.reconnect_attempts,
            "Giving up on WebSocket reconnection"
        );
        state.emit(WsEvent::MaxReconnectReached).await;
    }
}

/// The inner connected loop: runs until the connection breaks.
async fn run_connected(
    state: &mut TaskState,
    mut sink: SplitSink<WsStream, Message>,
    mut stream: SplitStream<WsStream>,
) -> DisconnectReason {
    loop {
        tokio::select! {
            // ── a) Incoming WS message ───────────────────────────────────
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let text_str: &str = text.as_ref();
                        match parse_stream_message(text_str) {
                            Ok(message) => state.emit(WsEvent::Message(message)).await,
                            Err(e) => {
                                tracing::debug!(error = %e, raw = text_str, "Dropping malformed stream frame");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = extract_close(frame.as_ref());
                        state.set_ready_state(ReadyState::Closing);
                        state.emit(WsEvent::Disconnected {
                            code: Some(code),
                            reason: reason.clone(),
                        }).await;
                        return match code {
                            CLOSE_POLICY_VIOLATION => DisconnectReason::RateLimited,
                            _ => DisconnectReason::Error(reason),
                        };
                    }
                    Some(Ok(_)) => {} // Pong, Binary, Frame: ignore
                    Some(Err(e)) => {
                        let reason = e.to_string();
                        tracing::warn!(error = %reason, "WebSocket error");
                        state.emit(WsEvent::Disconnected {
                            code: None,
                            reason: reason.clone(),
                        }).await;
                        return DisconnectReason::Error(reason);
                    }
                    None => {
                        state.emit(WsEvent::Disconnected {
                            code: None,
                            reason: "Stream ended".into(),
                        }).await;
                        return DisconnectReason::Error("Stream ended".into());
                    }
                }
            }

            // ── b) Command from public API ───────────────────────────────
            cmd = state.cmd_rx.recv() => {
                match cmd {
                    Some(Command::Send(msg_out)) => {
                        if let Err(e) = send_msg(&mut sink, &msg_out).await {
                            tracing::warn!(error = %e, "WS send failed");
                        }
                    }
                    Some(Command::Disconnect) | None => {
                        state.set_ready_state(ReadyState::Closing);
                        let _ = sink.send(Message::Close(Some(CloseFrame {
                            code: CloseCode::Normal,
                            reason: "Client disconnect".into(),
                        }))).await;
                        return DisconnectReason::UserRequested;
                    }
                }
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Attempt to establish a WebSocket connection with a 30-second timeout.
async fn attempt_connect(
    url: &str,
) -> Result<(SplitSink<WsStream, Message>, SplitStream<WsStream>), String> {
    let (ws_stream, _) = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(url))
        .await
        .map_err(|_| "Connection timeout".to_string())?
        .map_err(|e| e.to_string())?;

    Ok(ws_stream.split())
}

/// Serialize and send a MessageOut over the sink.
async fn send_msg(
    sink: &mut SplitSink<WsStream, Message>,
    msg: &MessageOut,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| e.to_string())
}

/// Extract close code and reason from an optional CloseFrame.
fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1006, "No close frame".into()),
    }
}

// ─── Reconnection backoff ────────────────────────────────────────────────────

/// Delay before reconnect attempt number `attempt` (1-based).
fn reconnect_delay_ms(base_ms: u64, attempt: u32, rate_limited: bool, jitter: u64) -> u64 {
    let exp = attempt.saturating_sub(1).min(10);
    let base = base_ms.saturating_mul(1u64 << exp);
    let cap = if rate_limited { 300_000 } else { 60_000 };
    base.saturating_add(jitter).min(cap)
}

/// Sleep out the backoff delay, dropping any commands that arrive meanwhile.
///
/// Returns `false` if a disconnect was requested during the wait.
async fn backoff_sleep(state: &mut TaskState, rate_limited: bool) -> bool {
    state.reconnect_attempts += 1;

    let jitter_max = if rate_limited { 1000 } else { 500 };
    let jitter = rand::random::<u64>() % jitter_max;
    let delay = reconnect_delay_ms(
        state.config.base_reconnect_delay_ms,
        state.reconnect_attempts,
        rate_limited,
        jitter,
    );

    tracing::info!(
        attempt = state.reconnect_attempts,
        max_attempts = ?state.config.max_reconnect_attempts,
        delay_ms = delay,
        rate_limited,
        "Scheduling WebSocket reconnect"
    );

    let sleep = tokio::time::sleep(Duration::from_millis(delay));
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            () = &mut sleep => return true,
            cmd = state.cmd_rx.recv() => match cmd {
                Some(Command::Send(msg)) => {
                    tracing::debug!(?msg, "Dropping message while disconnected");
                }
                Some(Command::Disconnect) | None => return false,
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
