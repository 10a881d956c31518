use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use fxpulse::core::log::init_logging;
use fxpulse::core::service::{DEFAULT_ANALYTICS_DAYS, MAX_WINDOW_DAYS};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn currency_code(value: &str) -> Result<String, String> {
    let code = value.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(format!("'{value}' is not a three letter currency code"))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the exchange rate for a pair
    Rate {
        #[arg(value_parser = currency_code)]
        from: String,
        /// Quote currency, defaults to base_currency
        #[arg(value_parser = currency_code)]
        to: Option<String>,
        /// Rate as of this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Display daily historical rates
    History {
        #[arg(value_parser = currency_code)]
        from: String,
        #[arg(value_parser = currency_code)]
        to: Option<String>,
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_ANALYTICS_DAYS,
            value_parser = clap::value_parser!(i64).range(1..=MAX_WINDOW_DAYS)
        )]
        days: i64,
    },
    /// Display technical indicators for a pair
    Analytics {
        #[arg(value_parser = currency_code)]
        from: String,
        #[arg(value_parser = currency_code)]
        to: Option<String>,
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_ANALYTICS_DAYS,
            value_parser = clap::value_parser!(i64).range(1..=MAX_WINDOW_DAYS)
        )]
        days: i64,
    },
    /// Convert an amount between currencies
    Convert {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        #[arg(value_parser = currency_code)]
        from: String,
        #[arg(value_parser = currency_code)]
        to: Option<String>,
    },
    /// Display the popular currency pairs
    Pairs,
    /// List supported currencies
    Currencies,
    /// Display market open/close status
    Status,
    /// Stream live rates for the configured pairs
    Live {
        /// Stop after this many updates
        #[arg(short, long)]
        ticks: Option<u64>,
    },
}

impl From<Commands> for fxpulse::AppCommand {
    fn from(cmd: Commands) -> fxpulse::AppCommand {
        match cmd {
            Commands::Rate { from, to, date } => fxpulse::AppCommand::Rate { from, to, date },
            Commands::History { from, to, days } => fxpulse::AppCommand::History { from, to, days },
            Commands::Analytics { from, to, days } => {
                fxpulse::AppCommand::Analytics { from, to, days }
            }
            Commands::Convert { amount, from, to } => {
                fxpulse::AppCommand::Convert { amount, from, to }
            }
            Commands::Pairs => fxpulse::AppCommand::Pairs,
            Commands::Currencies => fxpulse::AppCommand::Currencies,
            Commands::Status => fxpulse::AppCommand::Status,
            Commands::Live { ticks } => fxpulse::AppCommand::Live { ticks },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => fxpulse::cli::setup::setup_at_path(path),
            None => fxpulse::cli::setup::setup(),
        },
        Some(cmd) => fxpulse::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_must_be_within_window() {
        let args = ["fxpulse", "history", "usd", "eur", "--days", "90"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Some(Commands::History { days: 90, .. })));

        for days in ["0", "-5", "999999", "9223372036854775807"] {
            let args = ["fxpulse", "analytics", "usd", "--days", days];
            assert!(Cli::try_parse_from(args).is_err(), "accepted --days {days}");
        }
    }
}
