//! Core business logic: rate types, caching, analytics and the rate service

pub mod analytics;
pub mod cache;
pub mod clock;
pub mod config;
pub mod currency;
pub mod error;
pub mod live;
pub mod log;
pub mod market_clock;
pub mod market_stats;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for cleaner imports
pub use currency::{
    ConversionResult, CurrencyAnalytics, CurrencyPair, CurrencyRate, HistoricalRate,
    MarketStatus, RateGateway, Trend,
};
pub use error::{GatewayError, ServiceError};
pub use service::CurrencyService;
