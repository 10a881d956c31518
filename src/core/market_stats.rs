//! Synthetic 24h statistics for a point rate.
//!
//! The point-rate endpoint carries no tick history, so change, range and volume
//! are drawn around the fetched rate. The numbers are presentational only.

use crate::core::analytics::round_to;
use crate::core::currency::MarketStats;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Pairs that get the higher volume multiplier. Direction matters.
pub const MAJOR_PAIRS: [(&str, &str); 4] = [
    ("USD", "EUR"),
    ("USD", "GBP"),
    ("USD", "JPY"),
    ("EUR", "GBP"),
];

const BASE_VOLUME: f64 = 1_000_000.0;
const MAJOR_MULTIPLIER: f64 = 1.5;
const MINOR_MULTIPLIER: f64 = 0.8;

pub fn is_major_pair(from: &str, to: &str) -> bool {
    MAJOR_PAIRS.iter().any(|(f, t)| *f == from && *t == to)
}

pub fn volume_24h(from: &str, to: &str) -> f64 {
    let multiplier = if is_major_pair(from, to) {
        MAJOR_MULTIPLIER
    } else {
        MINOR_MULTIPLIER
    };
    (BASE_VOLUME * multiplier).floor()
}

/// Draws stats for `rate` from `rng`.
///
/// `low_24h <= rate <= high_24h` always holds, including after rounding.
pub fn estimate_with<R: Rng>(from: &str, to: &str, rate: f64, rng: &mut R) -> MarketStats {
    let change_24h = rng.random_range(-0.5_f64..=0.5) * rate * 0.02;
    let change_percent_24h = if rate > 0.0 {
        change_24h / rate * 100.0
    } else {
        0.0
    };
    let high_24h = rate * (1.0 + rng.random::<f64>() * 0.01);
    let low_24h = rate * (1.0 - rng.random::<f64>() * 0.01);

    MarketStats {
        change_24h: round_to(change_24h, 6),
        change_percent_24h: round_to(change_percent_24h, 4),
        high_24h: round_to(high_24h, 6).max(rate),
        low_24h: round_to(low_24h, 6).min(rate),
        volume_24h: volume_24h(from, to),
    }
}

pub struct MarketStatsEstimator {
    rng: Mutex<StdRng>,
}

impl MarketStatsEstimator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic estimator for reproducible output.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn estimate(&self, from: &str, to: &str, rate: f64) -> MarketStats {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        estimate_with(from, to, rate, &mut *rng)
    }
}

impl Default for MarketStatsEstimator {
    fn default() -> Self {
        Self::new()
    }
}
