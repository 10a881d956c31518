use crate::core::currency::{
    ConversionQuote, CurrencyInfo, HistoricalRate, RateGateway, RateQuote,
};
use crate::core::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

const EXCHANGE_RATE: &str = "exchange-rate";
const HISTORICAL_RATES: &str = "historical-rates";
const CONVERT: &str = "convert";
const CURRENCIES: &str = "currencies";

/// HTTP client for the banking/FX API.
pub struct BankingApiGateway {
    base_url: String,
    client: reqwest::Client,
}

impl BankingApiGateway {
    pub fn new(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxpulse/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::network("client", e))?;
        Ok(BankingApiGateway {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn read_json<T: DeserializeOwned>(
        endpoint: &str,
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> GatewayResult<T> {
        let response = response.map_err(|e| GatewayError::network(endpoint, e))?;
        debug!(status = %response.status(), "Received response from {}", endpoint);

        if !response.status().is_success() {
            return Err(GatewayError::Http {
                status: response.status().as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::network(endpoint, e))?;
        serde_json::from_str(&text).map_err(|e| GatewayError::malformed(endpoint, e))
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeRateResponse {
    rate: Option<f64>,
    timestamp: Option<DateTime<Utc>>,
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoricalRatesResponse {
    rates: Option<Vec<HistoricalRate>>,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    conversion: Option<ConversionPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversionPayload {
    converted_amount: f64,
    rate: f64,
    timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CurrenciesResponse {
    currencies: Option<HashMap<String, CurrencyInfo>>,
}

#[async_trait]
impl RateGateway for BankingApiGateway {
    #[instrument(name = "FxRateFetch", skip(self), fields(pair = %format!("{from}/{to}")))]
    async fn fetch_rate(
        &self,
        from: &str,
        to: &str,
        date: Option<NaiveDate>,
    ) -> GatewayResult<RateQuote> {
        let url = self.url(EXCHANGE_RATE);
        debug!("Requesting exchange rate from {}", url);

        let mut query = vec![("from", from.to_string()), ("to", to.to_string())];
        if let Some(date) = date {
            query.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        let response = self.client.get(&url).query(&query).send().await;
        let data: ExchangeRateResponse = Self::read_json(EXCHANGE_RATE, response).await?;

        let rate = data
            .rate
            .ok_or_else(|| GatewayError::malformed(EXCHANGE_RATE, "missing rate"))?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(GatewayError::malformed(
                EXCHANGE_RATE,
                format!("rate must be positive, got {rate}"),
            ));
        }

        Ok(RateQuote {
            rate,
            timestamp: data.timestamp,
            source: data.source.unwrap_or_else(|| "api".to_string()),
        })
    }

    #[instrument(name = "FxHistoryFetch", skip(self))]
    async fn fetch_historical(
        &self,
        from: &str,
        to: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> GatewayResult<Vec<HistoricalRate>> {
        let url = self.url(HISTORICAL_RATES);
        debug!("Requesting historical rates from {}", url);

        let query = [
            ("from", from.to_string()),
            ("to", to.to_string()),
            ("startDate", start_date.format("%Y-%m-%d").to_string()),
            ("endDate", end_date.format("%Y-%m-%d").to_string()),
        ];
        let response = self.client.get(&url).query(&query).send().await;
        let data: HistoricalRatesResponse = Self::read_json(HISTORICAL_RATES, response).await?;

        data.rates
            .ok_or_else(|| GatewayError::malformed(HISTORICAL_RATES, "missing rates"))
    }

    #[instrument(name = "FxConvert", skip(self))]
    async fn fetch_conversion(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> GatewayResult<ConversionQuote> {
        let url = self.url(CONVERT);
        debug!("Requesting conversion from {}", url);

        let body = serde_json::json!({ "amount": amount, "from": from, "to": to });
        let response = self.client.post(&url).json(&body).send().await;
        let data: ConvertResponse = Self::read_json(CONVERT, response).await?;

        let conversion = data
            .conversion
            .ok_or_else(|| GatewayError::malformed(CONVERT, "missing conversion"))?;

        Ok(ConversionQuote {
            converted_amount: conversion.converted_amount,
            rate: conversion.rate,
            timestamp: conversion.timestamp,
        })
    }

    #[instrument(name = "FxCurrenciesFetch", skip(self))]
    async fn fetch_currencies(&self) -> GatewayResult<HashMap<String, CurrencyInfo>> {
        let url = self.url(CURRENCIES);
        debug!("Requesting supported currencies from {}", url);

        let response = self.client.get(&url).send().await;
        let data: CurrenciesResponse = Self::read_json(CURRENCIES, response).await?;

        data.currencies
            .ok_or_else(|| GatewayError::malformed(CURRENCIES, "missing currencies"))
    }
}
