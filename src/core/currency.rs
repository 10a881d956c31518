//! Exchange rate types and the FX gateway abstraction

use crate::core::error::GatewayResult;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

/// Source tag used for rates computed locally instead of fetched.
pub const INTERNAL_SOURCE: &str = "internal";

/// Point exchange rate, optionally enriched with 24h statistics.
///
/// `rate` is the price of one unit of `from_currency` in `to_currency`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRate {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    #[serde(rename = "change24h")]
    pub change_24h: Option<f64>,
    #[serde(rename = "changePercent24h")]
    pub change_percent_24h: Option<f64>,
    #[serde(rename = "high24h")]
    pub high_24h: Option<f64>,
    #[serde(rename = "low24h")]
    pub low_24h: Option<f64>,
    #[serde(rename = "volume24h")]
    pub volume_24h: Option<f64>,
}

impl CurrencyRate {
    /// Identity rate for `currency/currency`.
    pub fn identity(currency: &str, timestamp: DateTime<Utc>) -> Self {
        CurrencyRate {
            from_currency: currency.to_string(),
            to_currency: currency.to_string(),
            rate: 1.0,
            timestamp,
            source: INTERNAL_SOURCE.to_string(),
            change_24h: None,
            change_percent_24h: None,
            high_24h: None,
            low_24h: None,
            volume_24h: None,
        }
    }

    pub fn pair_symbol(&self) -> String {
        pair_symbol(&self.from_currency, &self.to_currency)
    }

    pub fn with_stats(mut self, stats: MarketStats) -> Self {
        self.change_24h = Some(stats.change_24h);
        self.change_percent_24h = Some(stats.change_percent_24h);
        self.high_24h = Some(stats.high_24h);
        self.low_24h = Some(stats.low_24h);
        self.volume_24h = Some(stats.volume_24h);
        self
    }
}

/// Display-oriented view of a rate and its 24h statistics, keyed `"{from}/{to}"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyPair {
    pub symbol: String,
    pub base: String,
    pub quote: String,
    pub rate: f64,
    pub change_24h: f64,
    pub change_percent_24h: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub volume_24h: f64,
    pub last_updated: DateTime<Utc>,
}

impl From<&CurrencyRate> for CurrencyPair {
    fn from(rate: &CurrencyRate) -> Self {
        CurrencyPair {
            symbol: rate.pair_symbol(),
            base: rate.from_currency.clone(),
            quote: rate.to_currency.clone(),
            rate: rate.rate,
            change_24h: rate.change_24h.unwrap_or(0.0),
            change_percent_24h: rate.change_percent_24h.unwrap_or(0.0),
            high_24h: rate.high_24h.unwrap_or(rate.rate),
            low_24h: rate.low_24h.unwrap_or(rate.rate),
            volume_24h: rate.volume_24h.unwrap_or(0.0),
            last_updated: rate.timestamp,
        }
    }
}

/// One daily OHLCV bar for a currency pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRate {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Synthetic 24h statistics attached to a point rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketStats {
    pub change_24h: f64,
    pub change_percent_24h: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub volume_24h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Sideways,
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Trend::Bullish => "bullish",
                Trend::Bearish => "bearish",
                Trend::Sideways => "sideways",
            }
        )
    }
}

/// Technical indicators derived from a historical series. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyAnalytics {
    pub volatility: f64,
    pub trend: Trend,
    pub support: f64,
    pub resistance: f64,
    pub rsi: f64,
    #[serde(rename = "movingAverage7")]
    pub moving_average_7: f64,
    #[serde(rename = "movingAverage30")]
    pub moving_average_30: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatus {
    pub is_open: bool,
    pub next_open: DateTime<Utc>,
    pub next_close: DateTime<Utc>,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Raw point rate as returned by the gateway. `timestamp` is absent when the
/// API omits it.
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuote {
    pub rate: f64,
    pub timestamp: Option<DateTime<Utc>>,
    pub source: String,
}

/// Raw conversion as returned by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionQuote {
    pub converted_amount: f64,
    pub rate: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Conversion with the flat fee applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub converted_amount: f64,
    pub rate: f64,
    pub timestamp: DateTime<Utc>,
    pub fees: f64,
    pub total_cost: f64,
}

pub fn pair_symbol(from: &str, to: &str) -> String {
    format!("{from}/{to}")
}

/// Boundary to the external banking/FX API.
#[async_trait]
pub trait RateGateway: Send + Sync {
    async fn fetch_rate(
        &self,
        from: &str,
        to: &str,
        date: Option<NaiveDate>,
    ) -> GatewayResult<RateQuote>;

    async fn fetch_historical(
        &self,
        from: &str,
        to: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> GatewayResult<Vec<HistoricalRate>>;

    async fn fetch_conversion(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> GatewayResult<ConversionQuote>;

    async fn fetch_currencies(&self) -> GatewayResult<HashMap<String, CurrencyInfo>>;
}
