//! Live synchronizer: reconciles fetched history with the push stream.
//!
//! - [`merger`] folds klines and trades into the candle series
//! - [`subscription`] tracks which selection the stream carries
//! - [`session`] is the event → effects state machine over both stores
//! - [`runner`] drives a session from real I/O (`ws-native` feature)

pub mod merger;
#[cfg(feature = "ws-native")]
pub mod runner;
pub mod session;
pub mod subscription;

pub use merger::{MergeOutcome, TickMerger};
#[cfg(feature = "ws-native")]
pub use runner::{run_dashboard, MarketDataSource, StreamSink};
pub use session::{DashboardSession, DashboardView, Effect, LoadStatus, SessionEvent};
pub use subscription::{SubscriptionManager, SubscriptionState};
