//! HTTP client layer: `MarketHttp` with per-endpoint retry.

pub mod client;
pub mod retry;

pub use client::MarketHttp;
pub use retry::{Endpoint, RetryConfig, RetryPolicy};
