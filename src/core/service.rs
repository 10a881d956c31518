//! Currency rate service: cache, retry and enrichment around a [`RateGateway`].
//!
//! Every read goes cache first. On a miss the gateway is called through
//! [`with_retry`], the result is enriched (synthetic 24h stats for point rates,
//! sorting and de-duplication for history) and written back with its TTL.

use crate::core::analytics::{self, round_to};
use crate::core::cache::{CacheStats, TtlCache, cache_key};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::AppConfig;
use crate::core::currency::{
    ConversionResult, CurrencyAnalytics, CurrencyInfo, CurrencyPair, CurrencyRate,
    HistoricalRate, MarketStatus, RateGateway,
};
use crate::core::error::{GatewayResult, ServiceError, ServiceResult};
use crate::core::market_clock::market_status;
use crate::core::market_stats::MarketStatsEstimator;
use crate::providers::banking_api::BankingApiGateway;
use crate::providers::util::with_retry;
use anyhow::Context;
use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Flat conversion fee, as a fraction of the converted amount.
pub const FEE_RATE: f64 = 0.001;
pub const DEFAULT_ANALYTICS_DAYS: i64 = 30;
/// Longest history window, in days, that [`CurrencyService::recent_window`] yields.
pub const MAX_WINDOW_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub enum CachedValue {
    Rate(CurrencyRate),
    History(Vec<HistoricalRate>),
    Currencies(HashMap<String, CurrencyInfo>),
}

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub rate_ttl: Duration,
    pub historical_ttl: Duration,
    pub currencies_ttl: Duration,
    pub max_cache_entries: Option<usize>,
    pub retry_attempts: usize,
    pub retry_delay_ms: u64,
    pub popular_pairs: Vec<(String, String)>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        let config = AppConfig::default();
        Self {
            rate_ttl: Duration::minutes(5),
            historical_ttl: Duration::hours(1),
            currencies_ttl: Duration::days(1),
            max_cache_entries: None,
            retry_attempts: config.retry.attempts,
            retry_delay_ms: config.retry.delay_ms,
            popular_pairs: config.popular_pairs().unwrap_or_default(),
        }
    }
}

impl ServiceSettings {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let cache = &config.cache;
        Ok(Self {
            rate_ttl: ttl_from_secs("rate_ttl_secs", cache.rate_ttl_secs)?,
            historical_ttl: ttl_from_secs("historical_ttl_secs", cache.historical_ttl_secs)?,
            currencies_ttl: ttl_from_secs("currencies_ttl_secs", cache.currencies_ttl_secs)?,
            max_cache_entries: config.cache.max_entries,
            retry_attempts: config.retry.attempts,
            retry_delay_ms: config.retry.delay_ms,
            popular_pairs: config.popular_pairs()?,
        })
    }
}

fn ttl_from_secs(field: &str, secs: u64) -> anyhow::Result<Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .with_context(|| format!("cache.{field} is out of range: {secs}"))
}

pub struct CurrencyService {
    gateway: Arc<dyn RateGateway>,
    cache: TtlCache<CachedValue>,
    clock: Arc<dyn Clock>,
    estimator: MarketStatsEstimator,
    settings: ServiceSettings,
}

impl CurrencyService {
    pub fn new(
        gateway: Arc<dyn RateGateway>,
        clock: Arc<dyn Clock>,
        settings: ServiceSettings,
    ) -> Self {
        let mut cache = TtlCache::new(Arc::clone(&clock), settings.rate_ttl);
        if let Some(max) = settings.max_cache_entries {
            cache = cache.with_max_entries(max);
        }
        Self {
            gateway,
            cache,
            clock,
            estimator: MarketStatsEstimator::new(),
            settings,
        }
    }

    /// Wires the HTTP gateway and the system clock from configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let banking = &config.providers.banking;
        let gateway = BankingApiGateway::new(
            &banking.base_url,
            std::time::Duration::from_secs(banking.timeout_secs),
        )
        .context("Failed to build banking API client")?;
        let settings = ServiceSettings::from_config(config)?;
        Ok(Self::new(Arc::new(gateway), Arc::new(SystemClock), settings))
    }

    pub fn with_estimator(mut self, estimator: MarketStatsEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    async fn retrying<T, F, Fut>(&self, operation: F) -> GatewayResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        with_retry(
            operation,
            self.settings.retry_attempts,
            self.settings.retry_delay_ms,
        )
        .await
    }

    /// Point rate for `from/to`, enriched with synthetic 24h stats.
    ///
    /// `from == to` returns rate 1 from source `internal` without touching the
    /// cache or the gateway.
    pub async fn get_exchange_rate(
        &self,
        from: &str,
        to: &str,
        date: Option<NaiveDate>,
    ) -> ServiceResult<CurrencyRate> {
        if from == to {
            return Ok(CurrencyRate::identity(from, self.clock.now()));
        }

        let key = rate_key(from, to, date);
        if let Some(CachedValue::Rate(rate)) = self.cache.get(&key).await {
            return Ok(rate);
        }
        self.fetch_and_cache_rate(&key, from, to, date).await
    }

    /// Like [`get_exchange_rate`](Self::get_exchange_rate) but skips the cache
    /// read. The fresh rate still replaces the cached one.
    pub async fn refresh_exchange_rate(&self, from: &str, to: &str) -> ServiceResult<CurrencyRate> {
        if from == to {
            return Ok(CurrencyRate::identity(from, self.clock.now()));
        }
        let key = rate_key(from, to, None);
        self.fetch_and_cache_rate(&key, from, to, None).await
    }

    async fn fetch_and_cache_rate(
        &self,
        key: &str,
        from: &str,
        to: &str,
        date: Option<NaiveDate>,
    ) -> ServiceResult<CurrencyRate> {
        let quote = self
            .retrying(|| async {
                self.gateway
                    .fetch_rate(from, to, date)
                    .await
                    .inspect_err(|e| {
                        debug!(retryable = e.is_retryable(), "Rate fetch failed: {}", e)
                    })
            })
            .await?;

        let rate = round_to(quote.rate, 6);
        let stats = self.estimator.estimate(from, to, rate);
        let currency_rate = CurrencyRate {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            rate,
            timestamp: quote.timestamp.unwrap_or_else(|| self.clock.now()),
            source: quote.source,
            change_24h: None,
            change_percent_24h: None,
            high_24h: None,
            low_24h: None,
            volume_24h: None,
        }
        .with_stats(stats);

        self.cache
            .set(
                key,
                CachedValue::Rate(currency_rate.clone()),
                Some(self.settings.rate_ttl),
            )
            .await;
        Ok(currency_rate)
    }

    /// Daily bars between `start_date` and `end_date`, oldest first.
    ///
    /// Gateway failures are logged and yield an empty series; empty results
    /// are not cached.
    pub async fn get_historical_rates(
        &self,
        from: &str,
        to: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Vec<HistoricalRate> {
        if start_date > end_date {
            warn!(%start_date, %end_date, "Historical range is reversed, returning no data");
            return Vec::new();
        }

        let key = cache_key(
            "historical-rates",
            &json!({ "from": from, "to": to, "startDate": start_date, "endDate": end_date }),
        );
        if let Some(CachedValue::History(rates)) = self.cache.get(&key).await {
            return rates;
        }

        match self
            .retrying(|| self.gateway.fetch_historical(from, to, start_date, end_date))
            .await
        {
            Ok(rates) => {
                let rates = analytics::normalize_series(rates);
                if !rates.is_empty() {
                    self.cache
                        .set(
                            &key,
                            CachedValue::History(rates.clone()),
                            Some(self.settings.historical_ttl),
                        )
                        .await;
                }
                rates
            }
            Err(e) => {
                warn!("Failed to fetch historical rates for {from}/{to}: {e}");
                Vec::new()
            }
        }
    }

    /// The window covering the last `days` days, ending today.
    ///
    /// `days` is clamped to `1..=MAX_WINDOW_DAYS`.
    pub fn recent_window(&self, days: i64) -> (NaiveDate, NaiveDate) {
        let end_date = self.clock.now().date_naive();
        let span = Duration::days(days.clamp(1, MAX_WINDOW_DAYS));
        let start_date = end_date.checked_sub_signed(span).unwrap_or(NaiveDate::MIN);
        (start_date, end_date)
    }

    /// Indicators over the last `days` days of history, ending today.
    pub async fn get_currency_analytics(
        &self,
        from: &str,
        to: &str,
        days: i64,
    ) -> CurrencyAnalytics {
        let (start_date, end_date) = self.recent_window(days);
        let rates = self
            .get_historical_rates(from, to, start_date, end_date)
            .await;
        debug!("Computing analytics for {from}/{to} over {} bars", rates.len());
        analytics::analyze(&rates)
    }

    /// Converts `amount` and applies the flat [`FEE_RATE`].
    pub async fn convert_currency(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> ServiceResult<ConversionResult> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ServiceError::InvalidAmount(amount));
        }

        let (converted_amount, rate, timestamp) = if from == to {
            (amount, 1.0, self.clock.now())
        } else {
            let quote = self
                .retrying(|| self.gateway.fetch_conversion(amount, from, to))
                .await?;
            let timestamp = quote.timestamp.unwrap_or_else(|| self.clock.now());
            (quote.converted_amount, quote.rate, timestamp)
        };

        let fees = converted_amount * FEE_RATE;
        info!("Converted {amount} {from} to {converted_amount} {to} (fees {fees})");
        Ok(ConversionResult {
            amount,
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            converted_amount,
            rate,
            timestamp,
            fees,
            total_cost: converted_amount + fees,
        })
    }

    /// Rates for the configured popular pairs. Pairs that fail are dropped.
    pub async fn get_popular_pairs(&self) -> Vec<CurrencyPair> {
        let futures = self.settings.popular_pairs.iter().map(|(from, to)| async move {
            match self.get_exchange_rate(from, to, None).await {
                Ok(rate) => Some(CurrencyPair::from(&rate)),
                Err(e) => {
                    warn!("Dropping pair {from}/{to}: {e}");
                    None
                }
            }
        });
        join_all(futures).await.into_iter().flatten().collect()
    }

    pub async fn get_supported_currencies(&self) -> ServiceResult<HashMap<String, CurrencyInfo>> {
        let key = cache_key("currencies", &json!({}));
        if let Some(CachedValue::Currencies(currencies)) = self.cache.get(&key).await {
            return Ok(currencies);
        }

        let currencies = self.retrying(|| self.gateway.fetch_currencies()).await?;
        self.cache
            .set(
                &key,
                CachedValue::Currencies(currencies.clone()),
                Some(self.settings.currencies_ttl),
            )
            .await;
        Ok(currencies)
    }

    pub fn get_market_status(&self) -> MarketStatus {
        market_status(self.clock.now())
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    pub async fn sweep_cache(&self) -> usize {
        self.cache.sweep_expired().await
    }
}

fn rate_key(from: &str, to: &str, date: Option<NaiveDate>) -> String {
    cache_key(
        "exchange-rate",
        &json!({ "from": from, "to": to, "date": date }),
    )
}
