//! Candles sub-client: historical kline fetch.

use crate::client::MarketClient;
use crate::domain::candle::Candle;
use crate::error::SdkError;
use crate::shared::Selection;

/// Sub-client for candle history.
pub struct Candles<'a> {
    pub(crate) client: &'a MarketClient,
}

impl<'a> Candles<'a> {
    /// Fetch the historical series for `selection`, oldest first.
    ///
    /// Records that fail to convert are skipped with a warning rather than
    /// failing the whole fetch.
    pub async fn history(&self, selection: &Selection) -> Result<Vec<Candle>, SdkError> {
        let records = self
            .client
            .http
            .get_klines(selection.symbol.as_str(), selection.interval)
            .await?;

        let total = records.len();
        let candles: Vec<Candle> = records
            .into_iter()
            .filter_map(|record| match Candle::try_from(record) {
                Ok(candle) => Some(candle),
                Err(e) => {
                    tracing::warn!(%selection, error = %e, "Skipping malformed history record");
                    None
                }
            })
            .collect();

        tracing::debug!(%selection, total, kept = candles.len(), "Fetched candle history");
        Ok(candles)
    }
}
