use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BankingProviderConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BankingProviderConfig {
    fn default() -> Self {
        BankingProviderConfig {
            base_url: "http://localhost:8080/api/banking".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub banking: BankingProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub rate_ttl_secs: u64,
    pub historical_ttl_secs: u64,
    pub currencies_ttl_secs: u64,
    /// Upper bound on cached entries; unbounded when absent.
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            rate_ttl_secs: 5 * 60,
            historical_ttl_secs: 60 * 60,
            currencies_ttl_secs: 24 * 60 * 60,
            max_entries: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: usize,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            attempts: 3,
            delay_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LiveConfig {
    pub interval_secs: u64,
    pub pairs: Vec<String>,
}

impl Default for LiveConfig {
    fn default() -> Self {
        LiveConfig {
            interval_secs: 30,
            pairs: vec!["EUR/USD".to_string(), "GBP/USD".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub live: LiveConfig,
    #[serde(default = "default_popular_pairs")]
    pub popular_pairs: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            base_currency: default_base_currency(),
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            live: LiveConfig::default(),
            popular_pairs: default_popular_pairs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// Longest cache TTL accepted from a config file, ten years.
pub const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_popular_pairs() -> Vec<String> {
    ["USD/EUR", "USD/GBP", "USD/JPY", "EUR/GBP", "USD/CHF", "AUD/USD", "USD/CAD"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

/// Splits `"EUR/USD"` into `("EUR", "USD")`, upper-casing both codes.
pub fn parse_pair(pair: &str) -> Result<(String, String)> {
    let (from, to) = pair
        .split_once('/')
        .with_context(|| format!("Invalid currency pair '{pair}', expected FROM/TO"))?;
    let (from, to) = (from.trim(), to.trim());
    if from.is_empty() || to.is_empty() {
        anyhow::bail!("Invalid currency pair '{pair}', expected FROM/TO");
    }
    Ok((from.to_uppercase(), to.to_uppercase()))
}

impl AppConfig {
    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxpulse", "fxpulse")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Parsed `live.pairs`.
    pub fn live_pairs(&self) -> Result<Vec<(String, String)>> {
        self.live.pairs.iter().map(|p| parse_pair(p)).collect()
    }

    /// Parsed `popular_pairs`.
    pub fn popular_pairs(&self) -> Result<Vec<(String, String)>> {
        self.popular_pairs.iter().map(|p| parse_pair(p)).collect()
    }

    fn validate(&self) -> Result<()> {
        self.live_pairs().context("Invalid live.pairs")?;
        self.popular_pairs().context("Invalid popular_pairs")?;
        if self.live.interval_secs == 0 {
            anyhow::bail!("live.interval_secs must be greater than zero");
        }
        let ttls = [
            ("rate_ttl_secs", self.cache.rate_ttl_secs),
            ("historical_ttl_secs", self.cache.historical_ttl_secs),
            ("currencies_ttl_secs", self.cache.currencies_ttl_secs),
        ];
        for (field, secs) in ttls {
            if secs > MAX_TTL_SECS {
                anyhow::bail!("cache.{field} must be at most {MAX_TTL_SECS} seconds, got {secs}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_empty_document() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.cache.rate_ttl_secs, 300);
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.retry.delay_ms, 1000);
        assert_eq!(config.live.interval_secs, 30);
        assert!(config.cache.max_entries.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  banking:
    base_url: "http://example.com/api"
base_currency: "EUR"
cache:
  rate_ttl_secs: 60
  max_entries: 500
retry:
  attempts: 5
live:
  interval_secs: 10
  pairs: ["usd/jpy"]
popular_pairs:
  - "EUR/USD"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.providers.banking.base_url, "http://example.com/api");
        assert_eq!(config.providers.banking.timeout_secs, 10);
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(config.cache.rate_ttl_secs, 60);
        assert_eq!(config.cache.historical_ttl_secs, 3600);
        assert_eq!(config.cache.max_entries, Some(500));
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.delay_ms, 1000);
        assert_eq!(
            config.live_pairs().unwrap(),
            vec![("USD".to_string(), "JPY".to_string())]
        );
        assert_eq!(config.popular_pairs().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("eur/usd").unwrap(),
            ("EUR".to_string(), "USD".to_string())
        );
        assert!(parse_pair("EURUSD").is_err());
        assert!(parse_pair("EUR/").is_err());
    }

    #[test]
    fn test_load_rejects_bad_pairs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "live:\n  pairs: [\"EURUSD\"]\n").unwrap();

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid live.pairs"));
    }

    #[test]
    fn test_load_rejects_oversized_ttl() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        for secs in ["18446744073709551615", "10000000000000000"] {
            std::fs::write(&path, format!("cache:\n  rate_ttl_secs: {secs}\n")).unwrap();
            let err = AppConfig::load_from_path(&path).unwrap_err();
            assert!(err.to_string().contains("cache.rate_ttl_secs must be at most"));
        }

        let at_limit = format!("cache:\n  historical_ttl_secs: {MAX_TTL_SECS}\n");
        std::fs::write(&path, at_limit).unwrap();
        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.cache.historical_ttl_secs, MAX_TTL_SECS);
    }
}
