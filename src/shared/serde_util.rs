//! Custom serde helpers for backend wire formats.
//!
//! The stream relays Binance payloads verbatim (prices as JSON strings) while
//! the REST services emit plain JSON numbers, so numeric wire fields accept
//! either shape. Strings and integers convert to `Decimal` exactly. A JSON
//! number with a fraction is read by `serde_json` as `f64`, so it keeps at
//! most 17 significant digits; the conversion uses the shortest decimal
//! text that round-trips that `f64`.

use crate::error::ParseError;
use chrono::DateTime;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A decimal as it appears on the wire: `"123.45"`, `123` or `123.45`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireDecimal {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl WireDecimal {
    pub fn to_decimal(&self) -> Result<Decimal, ParseError> {
        match self {
            WireDecimal::Text(s) => parse_decimal(s),
            WireDecimal::Int(n) => Ok(Decimal::from(*n)),
            WireDecimal::UInt(n) => Ok(Decimal::from(*n)),
            WireDecimal::Float(f) if f.is_finite() => parse_decimal(&f.to_string()),
            WireDecimal::Float(f) => Err(ParseError::Decimal(f.to_string())),
        }
    }
}

impl From<&str> for WireDecimal {
    fn from(s: &str) -> Self {
        WireDecimal::Text(s.to_string())
    }
}

impl<'de> Deserialize<'de> for WireDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct WireDecimalVisitor;

        impl<'de> Visitor<'de> for WireDecimalVisitor {
            type Value = WireDecimal;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal as a string or a number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(WireDecimal::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(WireDecimal::Text(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(WireDecimal::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(WireDecimal::UInt(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(WireDecimal::Float(v))
            }
        }

        deserializer.deserialize_any(WireDecimalVisitor)
    }
}

fn parse_decimal(raw: &str) -> Result<Decimal, ParseError> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| ParseError::Decimal(raw.to_string()))
}

/// A candle timestamp as it appears on the wire: RFC 3339 text or epoch millis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireTime {
    Millis(i64),
    Text(String),
}

impl WireTime {
    /// Epoch seconds, truncating any sub-second part.
    pub fn to_epoch_seconds(&self) -> Result<i64, ParseError> {
        match self {
            WireTime::Millis(ms) => Ok(ms.div_euclid(1000)),
            WireTime::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| dt.timestamp())
                .map_err(|_| ParseError::Timestamp(s.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_decimal_accepts_string_and_number() {
        let text: WireDecimal = serde_json::from_str("\"64250.10\"").unwrap();
        let number: WireDecimal = serde_json::from_str("64250.1").unwrap();
        assert_eq!(text.to_decimal().unwrap(), Decimal::from_str("64250.10").unwrap());
        assert_eq!(number.to_decimal().unwrap(), Decimal::from_str("64250.1").unwrap());
    }

    #[test]
    fn test_wire_decimal_large_integer_is_exact() {
        let big: WireDecimal = serde_json::from_str("9007199254740993").unwrap();
        assert_eq!(big, WireDecimal::UInt(9_007_199_254_740_993));
        assert_eq!(big.to_decimal().unwrap(), Decimal::from(9_007_199_254_740_993u64));

        let negative: WireDecimal = serde_json::from_str("-42").unwrap();
        assert_eq!(negative.to_decimal().unwrap(), Decimal::from(-42));
    }

    #[test]
    fn test_wire_decimal_fraction_limited_to_f64_digits() {
        // Text keeps every digit; a JSON number is capped at f64 precision.
        let text: WireDecimal = serde_json::from_str("\"12345678901234567.89\"").unwrap();
        assert_eq!(
            text.to_decimal().unwrap(),
            Decimal::from_str("12345678901234567.89").unwrap()
        );

        let number: WireDecimal = serde_json::from_str("12345678901234567.89").unwrap();
        assert!(matches!(number, WireDecimal::Float(_)));
        assert_eq!(
            number.to_decimal().unwrap(),
            Decimal::from_str("12345678901234568").unwrap()
        );
    }

    #[test]
    fn test_wire_decimal_rejects_non_numeric_json() {
        assert!(serde_json::from_str::<WireDecimal>("true").is_err());
        assert!(serde_json::from_str::<WireDecimal>("null").is_err());
    }

    #[test]
    fn test_wire_decimal_scientific() {
        let d = WireDecimal::from("1e-7").to_decimal().unwrap();
        assert_eq!(d, Decimal::from_str("0.0000001").unwrap());
    }

    #[test]
    fn test_wire_decimal_rejects_garbage() {
        assert_eq!(
            WireDecimal::from("abc").to_decimal(),
            Err(ParseError::Decimal("abc".to_string()))
        );
    }

    #[test]
    fn test_wire_time_rfc3339() {
        let t: WireTime = serde_json::from_str("\"2024-01-01T00:01:00Z\"").unwrap();
        assert_eq!(t.to_epoch_seconds().unwrap(), 1_704_067_260);

        let offset: WireTime = serde_json::from_str("\"2024-01-01T02:01:00+02:00\"").unwrap();
        assert_eq!(offset.to_epoch_seconds().unwrap(), 1_704_067_260);
    }

    #[test]
    fn test_wire_time_millis() {
        let t: WireTime = serde_json::from_str("1704067260000").unwrap();
        assert_eq!(t.to_epoch_seconds().unwrap(), 1_704_067_260);
    }

    #[test]
    fn test_wire_time_bad_text() {
        let t = WireTime::Text("yesterday".to_string());
        assert!(matches!(t.to_epoch_seconds(), Err(ParseError::Timestamp(_))));
    }
}
