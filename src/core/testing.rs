//! In-memory gateway double shared by unit tests.

use crate::core::currency::{
    ConversionQuote, CurrencyInfo, HistoricalRate, RateGateway, RateQuote,
};
use crate::core::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct MockGateway {
    rates: HashMap<String, f64>,
    history: Vec<HistoricalRate>,
    failing_pairs: Vec<String>,
    fail_first: AtomicUsize,
    always_fail: bool,
    omit_timestamps: bool,
    pub rate_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    pub conversion_calls: AtomicUsize,
    pub currency_calls: AtomicUsize,
    pub history_ranges: Mutex<Vec<(NaiveDate, NaiveDate)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: f64) -> Self {
        self.rates.insert(format!("{from}/{to}"), rate);
        self
    }

    pub fn with_history(mut self, history: Vec<HistoricalRate>) -> Self {
        self.history = history;
        self
    }

    /// The next `n` calls of any kind fail with a network error.
    pub fn failing_first(self, n: usize) -> Self {
        self.fail_first.store(n, Ordering::SeqCst);
        self
    }

    pub fn failing_pair(mut self, from: &str, to: &str) -> Self {
        self.failing_pairs.push(format!("{from}/{to}"));
        self
    }

    pub fn always_failing(mut self) -> Self {
        self.always_fail = true;
        self
    }

    /// Quotes come back without a timestamp, like a terse API response.
    pub fn without_timestamps(mut self) -> Self {
        self.omit_timestamps = true;
        self
    }

    fn quote_time(&self) -> Option<DateTime<Utc>> {
        (!self.omit_timestamps).then(|| Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn check(&self, endpoint: &str) -> GatewayResult<()> {
        if self.always_fail {
            return Err(GatewayError::network(endpoint, "connection refused"));
        }
        let remaining = self.fail_first.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_first.store(remaining - 1, Ordering::SeqCst);
            return Err(GatewayError::network(endpoint, "connection reset"));
        }
        Ok(())
    }

    fn rate_for(&self, from: &str, to: &str) -> GatewayResult<f64> {
        let key = format!("{from}/{to}");
        if self.failing_pairs.contains(&key) {
            return Err(GatewayError::Http {
                status: 503,
                endpoint: "exchange-rate".to_string(),
            });
        }
        self.rates
            .get(&key)
            .copied()
            .ok_or_else(|| GatewayError::malformed("exchange-rate", "missing rate"))
    }
}

#[async_trait]
impl RateGateway for MockGateway {
    async fn fetch_rate(
        &self,
        from: &str,
        to: &str,
        _date: Option<NaiveDate>,
    ) -> GatewayResult<RateQuote> {
        self.rate_calls.fetch_add(1, Ordering::SeqCst);
        self.check("exchange-rate")?;
        Ok(RateQuote {
            rate: self.rate_for(from, to)?,
            timestamp: self.quote_time(),
            source: "mock".to_string(),
        })
    }

    async fn fetch_historical(
        &self,
        _from: &str,
        _to: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> GatewayResult<Vec<HistoricalRate>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history_ranges
            .lock()
            .unwrap()
            .push((start_date, end_date));
        self.check("historical-rates")?;
        Ok(self.history.clone())
    }

    async fn fetch_conversion(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> GatewayResult<ConversionQuote> {
        self.conversion_calls.fetch_add(1, Ordering::SeqCst);
        self.check("convert")?;
        let rate = self.rate_for(from, to)?;
        Ok(ConversionQuote {
            converted_amount: amount * rate,
            rate,
            timestamp: self.quote_time(),
        })
    }

    async fn fetch_currencies(&self) -> GatewayResult<HashMap<String, CurrencyInfo>> {
        self.currency_calls.fetch_add(1, Ordering::SeqCst);
        self.check("currencies")?;
        let mut currencies = HashMap::new();
        currencies.insert(
            "USD".to_string(),
            CurrencyInfo {
                name: "US Dollar".to_string(),
                symbol: "$".to_string(),
                decimals: 2,
            },
        );
        Ok(currencies)
    }
}
