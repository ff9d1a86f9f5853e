//! Network URL constants and environment overrides.

/// Default REST API base URL (historical candles).
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default order-book service base URL.
pub const DEFAULT_ORDERBOOK_URL: &str = "http://localhost:8081";

/// Default WebSocket URL.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8080/ws";

/// Environment variable overriding [`DEFAULT_API_URL`].
pub const ENV_API_URL: &str = "MARKET_API_URL";

/// Environment variable overriding [`DEFAULT_ORDERBOOK_URL`].
pub const ENV_ORDERBOOK_URL: &str = "MARKET_ORDERBOOK_URL";

/// Environment variable overriding [`DEFAULT_WS_URL`].
pub const ENV_WS_URL: &str = "MARKET_WS_URL";

/// Read `key` from the environment, falling back to `default` when unset or blank.
pub fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}
