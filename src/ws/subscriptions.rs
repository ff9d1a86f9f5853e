//! Subscription params and matching.

use crate::shared::{Interval, Selection, Symbol};
use serde::{Deserialize, Serialize};

/// Parameters for subscribing to the market stream.
///
/// Wire format is the bare `{"symbol": ..., "interval": ...}` object. The
/// server treats every subscribe as a replacement, so there is no
/// unsubscribe counterpart.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct SubscribeParams {
    pub symbol: Symbol,
    pub interval: Interval,
}

impl From<&Selection> for SubscribeParams {
    fn from(selection: &Selection) -> Self {
        Self {
            symbol: selection.symbol.clone(),
            interval: selection.interval,
        }
    }
}

/// Trait for types that can be turned into a stream subscription.
pub trait Subscription {
    fn to_subscribe_params(&self) -> SubscribeParams;

    /// Stable identity of the subscription, for logging and dedup.
    fn subscription_key(&self) -> String {
        let params = self.to_subscribe_params();
        format!("kline:{}:{}", params.symbol, params.interval)
    }
}

impl Subscription for SubscribeParams {
    fn to_subscribe_params(&self) -> SubscribeParams {
        self.clone()
    }
}

impl Subscription for Selection {
    fn to_subscribe_params(&self) -> SubscribeParams {
        SubscribeParams::from(self)
    }
}

impl<T: Subscription + ?Sized> Subscription for &T {
    fn to_subscribe_params(&self) -> SubscribeParams {
        (**self).to_subscribe_params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_params_serialization() {
        let params = Selection::new("solusdt", Interval::Hour1).to_subscribe_params();
        let json = serde_json::to_string(&params).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["symbol"], "SOLUSDT");
        assert_eq!(parsed["interval"], "1h");
        // No envelope: the server reads the params object directly.
        assert!(parsed.get("type").is_none());
    }

    #[test]
    fn test_subscription_key_deterministic() {
        let a = Selection::new("BTCUSDT", Interval::Minute1);
        let b = SubscribeParams {
            symbol: Symbol::from("btcusdt"),
            interval: Interval::Minute1,
        };
        assert_eq!(a.subscription_key(), "kline:BTCUSDT:1m");
        assert_eq!(a.subscription_key(), b.subscription_key());
    }

    #[test]
    fn test_reference_forwards() {
        let selection = Selection::new("ETHUSDT", Interval::Day1);
        let by_ref: &Selection = &selection;
        assert_eq!(
            Subscription::to_subscribe_params(&by_ref),
            selection.to_subscribe_params()
        );
    }
}
