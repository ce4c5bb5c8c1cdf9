//! Typed currency record decoded from one element of the ticker array.
//!
//! Metric values are kept as opaque JSON: the upstream API serializes them as
//! strings, numbers, or null depending on the endpoint version.

use super::provider::MarketError;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The ten metric fields copied out of each currency record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarketField {
    MarketCapUsd,
    PriceUsd,
    PriceBtc,
    Volume24hUsd,
    PercentChange7d,
    AvailableSupply,
    TotalSupply,
    MaxSupply,
    PercentChange1h,
    PercentChange24h,
}

impl MarketField {
    /// All fields, in the order they appear in the ticker response.
    pub const ALL: [MarketField; 10] = [
        MarketField::MarketCapUsd,
        MarketField::PriceUsd,
        MarketField::PriceBtc,
        MarketField::Volume24hUsd,
        MarketField::PercentChange7d,
        MarketField::AvailableSupply,
        MarketField::TotalSupply,
        MarketField::MaxSupply,
        MarketField::PercentChange1h,
        MarketField::PercentChange24h,
    ];

    /// JSON key of the field in the ticker response.
    pub fn key(self) -> &'static str {
        match self {
            MarketField::MarketCapUsd => "market_cap_usd",
            MarketField::PriceUsd => "price_usd",
            MarketField::PriceBtc => "price_btc",
            MarketField::Volume24hUsd => "24h_volume_usd",
            MarketField::PercentChange7d => "percent_change_7d",
            MarketField::AvailableSupply => "available_supply",
            MarketField::TotalSupply => "total_supply",
            MarketField::MaxSupply => "max_supply",
            MarketField::PercentChange1h => "percent_change_1h",
            MarketField::PercentChange24h => "percent_change_24h",
        }
    }
}

impl fmt::Display for MarketField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MarketField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MarketField::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = MarketField::ALL.iter().map(|f| f.key()).collect();
                format!("unknown market field '{s}'. Valid: {}", valid.join(", "))
            })
    }
}

/// One ranked cryptocurrency's market metrics at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyRecord {
    pub id: String,
    pub market_cap_usd: Value,
    pub price_usd: Value,
    pub price_btc: Value,
    #[serde(rename = "24h_volume_usd")]
    pub volume_24h_usd: Value,
    pub percent_change_7d: Value,
    pub available_supply: Value,
    pub total_supply: Value,
    pub max_supply: Value,
    pub percent_change_1h: Value,
    pub percent_change_24h: Value,
}

impl CurrencyRecord {
    /// Decode array element `index` into a record.
    ///
    /// Every field must be present; `null` counts as present. Extra keys in the
    /// element (name, symbol, rank, ...) are ignored.
    pub fn decode(index: usize, element: &Value) -> Result<Self, MarketError> {
        let obj = element.as_object().ok_or_else(|| {
            MarketError::Parse(format!("record {index} is not a JSON object"))
        })?;

        let take = |field: &'static str| -> Result<Value, MarketError> {
            obj.get(field)
                .cloned()
                .ok_or(MarketError::MissingField { index, field })
        };

        let id = match take("id")? {
            Value::String(s) => s,
            other => {
                return Err(MarketError::Parse(format!(
                    "record {index} has a non-string id: {other}"
                )))
            }
        };

        Ok(Self {
            id,
            market_cap_usd: take(MarketField::MarketCapUsd.key())?,
            price_usd: take(MarketField::PriceUsd.key())?,
            price_btc: take(MarketField::PriceBtc.key())?,
            volume_24h_usd: take(MarketField::Volume24hUsd.key())?,
            percent_change_7d: take(MarketField::PercentChange7d.key())?,
            available_supply: take(MarketField::AvailableSupply.key())?,
            total_supply: take(MarketField::TotalSupply.key())?,
            max_supply: take(MarketField::MaxSupply.key())?,
            percent_change_1h: take(MarketField::PercentChange1h.key())?,
            percent_change_24h: take(MarketField::PercentChange24h.key())?,
        })
    }

    /// Raw JSON value of a metric field.
    pub fn value(&self, field: MarketField) -> &Value {
        match field {
            MarketField::MarketCapUsd => &self.market_cap_usd,
            MarketField::PriceUsd => &self.price_usd,
            MarketField::PriceBtc => &self.price_btc,
            MarketField::Volume24hUsd => &self.volume_24h_usd,
            MarketField::PercentChange7d => &self.percent_change_7d,
            MarketField::AvailableSupply => &self.available_supply,
            MarketField::TotalSupply => &self.total_supply,
            MarketField::MaxSupply => &self.max_supply,
            MarketField::PercentChange1h => &self.percent_change_1h,
            MarketField::PercentChange24h => &self.percent_change_24h,
        }
    }

    /// Metric as a float: JSON numbers and numeric strings. Null, empty and
    /// non-numeric strings yield `None`.
    pub fn numeric(&self, field: MarketField) -> Option<f64> {
        match self.value(field) {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}
