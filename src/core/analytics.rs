//! Technical indicators over a daily rate series.
//!
//! Every function expects bars ordered by date ascending (see
//! [`normalize_series`]) and reads `close` unless stated otherwise.
use crate::core::currency::{CurrencyAnalytics, HistoricalRate, Trend};

pub const RSI_PERIOD: usize = 14;
const TREND_THRESHOLD: f64 = 0.02;

/// Rounds `value` to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Sorts bars by date and keeps the first bar seen for each date.
pub fn normalize_series(mut rates: Vec<HistoricalRate>) -> Vec<HistoricalRate> {
    rates.sort_by_key(|r| r.date);
    rates.dedup_by_key(|r| r.date);
    rates
}

/// Standard deviation of daily log returns, in percent.
pub fn volatility(rates: &[HistoricalRate]) -> f64 {
    if rates.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = rates
        .windows(2)
        .filter(|w| w[0].close > 0.0 && w[1].close > 0.0)
        .map(|w| (w[1].close / w[0].close).ln())
        .collect();
    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    round_to(variance.sqrt() * 100.0, 4)
}

pub fn trend(rates: &[HistoricalRate]) -> Trend {
    let (Some(first), Some(last)) = (rates.first(), rates.last()) else {
        return Trend::Sideways;
    };
    if rates.len() < 2 || first.close <= 0.0 {
        return Trend::Sideways;
    }

    let change = (last.close - first.close) / first.close;
    if change > TREND_THRESHOLD {
        Trend::Bullish
    } else if change < -TREND_THRESHOLD {
        Trend::Bearish
    } else {
        Trend::Sideways
    }
}

/// Lowest `low` and highest `high` over the series; `(0, 0)` when empty.
pub fn support_resistance(rates: &[HistoricalRate]) -> (f64, f64) {
    if rates.is_empty() {
        return (0.0, 0.0);
    }
    let support = rates.iter().map(|r| r.low).fold(f64::INFINITY, f64::min);
    let resistance = rates
        .iter()
        .map(|r| r.high)
        .fold(f64::NEG_INFINITY, f64::max);
    (round_to(support, 6), round_to(resistance, 6))
}

/// RSI with simple averages over the last [`RSI_PERIOD`] close-to-close deltas.
///
/// Neutral 50 below `RSI_PERIOD` bars; 100 when none of the deltas is a loss.
pub fn rsi(rates: &[HistoricalRate]) -> f64 {
    if rates.len() < RSI_PERIOD {
        return 50.0;
    }

    let deltas: Vec<f64> = rates.windows(2).map(|w| w[1].close - w[0].close).collect();
    let recent = &deltas[deltas.len().saturating_sub(RSI_PERIOD)..];
    let n = recent.len() as f64;
    let avg_gain = recent.iter().filter(|d| **d > 0.0).sum::<f64>() / n;
    let avg_loss = recent.iter().filter(|d| **d < 0.0).map(|d| -d).sum::<f64>() / n;

    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    round_to(100.0 - 100.0 / (1.0 + rs), 2)
}

/// Mean of the last `period` closes, or 0 when the series is shorter.
pub fn moving_average(rates: &[HistoricalRate], period: usize) -> f64 {
    if period == 0 || rates.len() < period {
        return 0.0;
    }
    let window = &rates[rates.len() - period..];
    let sum: f64 = window.iter().map(|r| r.close).sum();
    round_to(sum / period as f64, 6)
}

pub fn analyze(rates: &[HistoricalRate]) -> CurrencyAnalytics {
    let (support, resistance) = support_resistance(rates);
    CurrencyAnalytics {
        volatility: volatility(rates),
        trend: trend(rates),
        support,
        resistance,
        rsi: rsi(rates),
        moving_average_7: moving_average(rates, 7),
        moving_average_30: moving_average(rates, 30),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(closes: &[f64]) -> Vec<HistoricalRate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| HistoricalRate {
                date: start + Duration::days(i as i64),
                open: *close,
                high: close + 0.01,
                low: close - 0.01,
                close: *close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn test_trend_classification() {
        assert_eq!(trend(&series(&[100.0, 100.5, 103.0])), Trend::Bullish);
        assert_eq!(trend(&series(&[100.0, 99.0, 96.0])), Trend::Bearish);
        assert_eq!(trend(&series(&[100.0, 100.3, 100.1])), Trend::Sideways);
        assert_eq!(trend(&series(&[100.0])), Trend::Sideways);
        assert_eq!(trend(&[]), Trend::Sideways);
    }

    #[test]
    fn test_volatility() {
        assert_eq!(volatility(&series(&[1.1])), 0.0);
        assert_eq!(volatility(&series(&[1.1, 1.1, 1.1])), 0.0);

        // Alternating +/- log returns of equal size have std == |r|
        let up = 1.1f64 * 1.01;
        let v = volatility(&series(&[1.1, up, 1.1, up, 1.1]));
        let expected = round_to((up / 1.1).ln() * 100.0, 4);
        assert!((v - expected).abs() < 2e-4);
    }

    #[test]
    fn test_support_resistance() {
        assert_eq!(support_resistance(&[]), (0.0, 0.0));
        let (support, resistance) = support_resistance(&series(&[1.10, 1.12, 1.11, 1.15, 1.20]));
        assert_eq!(support, 1.09);
        assert_eq!(resistance, 1.21);
    }

    #[test]
    fn test_rsi_short_series_is_neutral() {
        assert_eq!(rsi(&series(&[1.0; 13])), 50.0);
        assert_eq!(rsi(&[]), 50.0);
    }

    #[test]
    fn test_rsi_without_losses_is_100() {
        let closes: Vec<f64> = (0..15).map(|i| 1.0 + i as f64 * 0.01).collect();
        assert_eq!(rsi(&series(&closes)), 100.0);

        let flat = vec![1.2; 20];
        assert_eq!(rsi(&series(&flat)), 100.0);
    }

    #[test]
    fn test_rsi_at_exactly_fourteen_bars() {
        // 14 bars give 13 deltas, all of them used
        let rising: Vec<f64> = (0..14).map(|i| 1.0 + i as f64 * 0.01).collect();
        assert_eq!(rsi(&series(&rising)), 100.0);

        // 7 gains and 6 losses of 1 -> rs = 7/6
        let closes: Vec<f64> = (0..14).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        assert_eq!(rsi(&series(&closes)), 53.85);
    }

    #[test]
    fn test_rsi_balanced_moves() {
        let closes: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        assert_eq!(rsi(&series(&closes)), 50.0);
    }

    #[test]
    fn test_rsi_uses_only_recent_deltas() {
        // Early crash falls outside the last 14 deltas
        let mut closes = vec![20.0, 15.0, 10.0, 5.0, 2.0, 1.0];
        closes.extend((1..=14).map(|i| 1.0 + i as f64 * 0.1));
        assert_eq!(rsi(&series(&closes)), 100.0);

        // 3 gains of 1, 11 losses of 1 -> rs = 3/11
        let mut closes = vec![50.0];
        for i in 0..14 {
            let last = *closes.last().unwrap();
            closes.push(if i < 3 { last + 1.0 } else { last - 1.0 });
        }
        let expected = round_to(100.0 - 100.0 / (1.0 + 3.0 / 11.0), 2);
        assert_eq!(rsi(&series(&closes)), expected);
    }

    #[test]
    fn test_rsi_in_range() {
        let closes = [
            1.1, 1.3, 1.05, 1.2, 0.95, 1.4, 1.0, 1.25, 1.15, 1.35, 0.9, 1.1, 1.2, 1.05, 1.3,
        ];
        let value = rsi(&series(&closes));
        assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn test_moving_average() {
        let rates = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(moving_average(&rates, 7), 5.0);
        assert_eq!(moving_average(&rates, 8), 4.5);
        assert_eq!(moving_average(&rates, 9), 0.0);
        assert_eq!(moving_average(&rates, 0), 0.0);
    }

    #[test]
    fn test_normalize_series() {
        let mut rates = series(&[1.0, 2.0, 3.0]);
        rates.reverse();
        let mut duplicate = rates[0].clone();
        duplicate.close = 99.0;
        rates.push(duplicate);

        let normalized = normalize_series(rates);
        assert_eq!(normalized.len(), 3);
        assert!(normalized.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(normalized[2].close, 3.0);
    }

    #[test]
    fn test_analyze_eur_usd_scenario() {
        let rates = series(&[1.10, 1.12, 1.11, 1.15, 1.20]);
        let analytics = analyze(&rates);

        assert_eq!(analytics.trend, Trend::Bullish);
        assert_eq!(analytics.support, 1.09);
        assert_eq!(analytics.resistance, 1.21);
        assert_eq!(analytics.rsi, 50.0);
        assert_eq!(analytics.moving_average_7, 0.0);
        assert_eq!(analytics.moving_average_30, 0.0);
        assert!(analytics.volatility > 0.0);
    }
}
