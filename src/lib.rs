pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::service::CurrencyService;
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Rate {
        from: String,
        to: Option<String>,
        date: Option<NaiveDate>,
    },
    History {
        from: String,
        to: Option<String>,
        days: i64,
    },
    Analytics {
        from: String,
        to: Option<String>,
        days: i64,
    },
    Convert {
        amount: f64,
        from: String,
        to: Option<String>,
    },
    Pairs,
    Currencies,
    Status,
    Live {
        ticks: Option<u64>,
    },
}

/// Loads the config at `config_path`, else the default location, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => {
            let path = AppConfig::default_config_path()?;
            if path.exists() {
                AppConfig::load_from_path(&path)?
            } else {
                debug!("No config at {}, using defaults", path.display());
                AppConfig::default()
            }
        }
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxpulse starting...");

    let config = load_config(config_path)?;
    let service = Arc::new(CurrencyService::from_config(&config)?);
    let quote = |to: Option<String>| to.unwrap_or_else(|| config.base_currency.to_uppercase());

    match command {
        AppCommand::Rate { from, to, date } => {
            cli::rate::run_rate(&service, &from, &quote(to), date).await
        }
        AppCommand::History { from, to, days } => {
            cli::history::run_history(&service, &from, &quote(to), days).await
        }
        AppCommand::Analytics { from, to, days } => {
            cli::history::run_analytics(&service, &from, &quote(to), days).await
        }
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(&service, amount, &from, &quote(to)).await
        }
        AppCommand::Pairs => cli::rate::run_pairs(&service).await,
        AppCommand::Currencies => cli::rate::run_currencies(&service).await,
        AppCommand::Status => cli::rate::run_status(&service),
        AppCommand::Live { ticks } => {
            cli::live::run(
                service,
                config.live_pairs()?,
                Duration::from_secs(config.live.interval_secs),
                ticks,
            )
            .await
        }
    }
}
