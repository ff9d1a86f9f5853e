//! Low-level HTTP client: `MarketHttp`.
//!
//! One method per endpoint. Returns wire types (conversion to domain types
//! happens in the domain sub-clients). Internal to the SDK; `MarketClient`
//! wraps this.

use crate::domain::candle::wire::KlineRecord;
use crate::domain::orderbook::wire::OrderBookResponse;
use crate::error::HttpError;
use crate::http::retry::{Endpoint, RetryConfig, RetryPolicy};
use crate::shared::Interval;

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Low-level HTTP client for the candle and order-book services.
///
/// The two services may live on different hosts, so each has its own base URL.
#[derive(Clone)]
pub struct MarketHttp {
    api_url: String,
    orderbook_url: String,
    client: Client,
    retry: RetryPolicy,
}

impl MarketHttp {
    pub fn new(api_url: &str, orderbook_url: &str) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            orderbook_url: orderbook_url.trim_end_matches('/').to_string(),
            client,
            retry: RetryPolicy::default(),
        })
    }

    /// Per-endpoint retry policy. Defaults to [`RetryPolicy::None`].
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn orderbook_url(&self) -> &str {
        &self.orderbook_url
    }

    // ── Candles ──────────────────────────────────────────────────────────

    /// Historical klines, ascending by time. A `null` body is an empty history.
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Vec<KlineRecord>, HttpError> {
        let url = format!(
            "{}/klines?symbol={}&interval={}",
            self.api_url,
            urlencoding::encode(symbol),
            interval.as_str()
        );
        let records: Option<Vec<KlineRecord>> = self.get(Endpoint::Klines, &url).await?;
        Ok(records.unwrap_or_default())
    }

    // ── Orderbooks ───────────────────────────────────────────────────────

    pub async fn get_orderbook(&self, symbol: &str) -> Result<OrderBookResponse, HttpError> {
        let url = format!(
            "{}/orderbook?symbol={}",
            self.orderbook_url,
            urlencoding::encode(symbol)
        );
        self.get(Endpoint::OrderBook, &url).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint, url: &str) -> Result<T, HttpError> {
        let Some(config) = self.retry.config_for(endpoint) else {
            return self.do_get(url).await;
        };

        let mut retry = 0;
        loop {
            let err = match self.do_get::<T>(url).await {
                Ok(resp) => return Ok(resp),
                Err(e) => e,
            };
            if !RetryConfig::is_transient(&err) {
                return Err(err);
            }
            if retry >= config.max_retries {
                return Err(HttpError::MaxRetriesExceeded {
                    attempts: retry + 1,
                    last_error: err.to_string(),
                });
            }

            let retry_after = match &err {
                HttpError::RateLimited { retry_after_ms } => {
                    retry_after_ms.map(Duration::from_millis)
                }
                _ => None,
            };
            let delay = config.delay(retry, retry_after);
            tracing::debug!(
                ?endpoint,
                retry = retry + 1,
                max = config.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying request"
            );
            futures_timer::Delay::new(delay).await;
            retry += 1;
        }
    }

    async fn do_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let resp = self.client.get(url).send().await.map_err(classify)?;
        let status = resp.status();

        if status.is_success() {
            let parsed = resp.json::<T>().await.map_err(classify)?;
            return Ok(parsed);
        }

        let status_code = status.as_u16();
        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs.saturating_mul(1000));
        let body_text = resp.text().await.unwrap_or_default();

        Err(status_error(status_code, body_text, retry_after_ms))
    }
}

fn classify(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout
    } else {
        HttpError::Reqwest(err)
    }
}

fn status_error(status: u16, body: String, retry_after_ms: Option<u64>) -> HttpError {
    match status {
        404 => HttpError::NotFound(body),
        429 => HttpError::RateLimited { retry_after_ms },
        400..=499 => HttpError::BadRequest(body),
        _ => HttpError::ServerError { status, body },
    }
}
