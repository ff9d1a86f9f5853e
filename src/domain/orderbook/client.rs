//! Orderbooks sub-client: full-depth REST snapshot.

use crate::client::MarketClient;
use crate::domain::orderbook::OrderBookSnapshot;
use crate::error::SdkError;
use crate::shared::Symbol;

/// Sub-client for orderbook operations.
pub struct Orderbooks<'a> {
    pub(crate) client: &'a MarketClient,
}

impl<'a> Orderbooks<'a> {
    /// Get the current order book for `symbol` (never cached, always fresh).
    pub async fn snapshot(&self, symbol: &Symbol) -> Result<OrderBookSnapshot, SdkError> {
        let resp = self.client.http.get_orderbook(symbol.as_str()).await?;
        Ok(OrderBookSnapshot::try_from((symbol.clone(), resp))?)
    }
}
