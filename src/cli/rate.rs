use super::ui;
use crate::core::currency::{CurrencyInfo, CurrencyPair, CurrencyRate, MarketStatus};
use crate::core::service::CurrencyService;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;
use std::collections::HashMap;

pub async fn run_rate(
    service: &CurrencyService,
    from: &str,
    to: &str,
    date: Option<NaiveDate>,
) -> Result<()> {
    let pb = ui::new_spinner(&format!("Fetching {from}/{to}"));
    let result = service.get_exchange_rate(from, to, date).await;
    pb.finish_and_clear();

    let rate = result?;
    println!("{}", format_rate(&rate));
    Ok(())
}

pub async fn run_pairs(service: &CurrencyService) -> Result<()> {
    let pb = ui::new_spinner("Fetching popular pairs");
    let pairs = service.get_popular_pairs().await;
    pb.finish_and_clear();

    if pairs.is_empty() {
        println!("No currency pairs could be fetched.");
        return Ok(());
    }
    println!("{}", format_pairs(&pairs));
    Ok(())
}

pub async fn run_currencies(service: &CurrencyService) -> Result<()> {
    let currencies = service.get_supported_currencies().await?;
    println!("{}", format_currencies(&currencies));
    Ok(())
}

pub fn run_status(service: &CurrencyService) -> Result<()> {
    println!("{}", format_status(&service.get_market_status()));
    Ok(())
}

pub fn format_rate(rate: &CurrencyRate) -> String {
    let mut table = ui::new_table(&["Pair", "Rate", "24h Change", "24h High", "24h Low", "Source"]);
    table.add_row(vec![
        Cell::new(rate.pair_symbol()),
        ui::rate_cell(rate.rate),
        ui::change_cell(rate.change_percent_24h),
        ui::optional_rate_cell(rate.high_24h),
        ui::optional_rate_cell(rate.low_24h),
        Cell::new(&rate.source),
    ]);

    format!(
        "{}\n{}",
        table,
        ui::style_text(
            &format!("As of {}", rate.timestamp.format("%Y-%m-%d %H:%M:%S UTC")),
            ui::StyleType::Subtle
        )
    )
}

pub fn format_pairs(pairs: &[CurrencyPair]) -> String {
    let mut table = ui::new_table(&["Pair", "Rate", "24h Change", "24h Range", "Volume"]);

    for pair in pairs {
        table.add_row(vec![
            Cell::new(&pair.symbol),
            ui::rate_cell(pair.rate),
            ui::change_cell(Some(pair.change_percent_24h)),
            ui::number_cell(format!("{:.6} - {:.6}", pair.low_24h, pair.high_24h)),
            ui::number_cell(format!("{:.0}", pair.volume_24h)),
        ]);
    }
    table.to_string()
}

pub fn format_currencies(currencies: &HashMap<String, CurrencyInfo>) -> String {
    let mut table = ui::new_table(&["Code", "Name", "Symbol", "Decimals"]);

    let mut codes: Vec<&String> = currencies.keys().collect();
    codes.sort();
    for code in codes {
        let info = &currencies[code];
        table.add_row(vec![
            Cell::new(code),
            Cell::new(&info.name),
            Cell::new(&info.symbol),
            ui::number_cell(info.decimals.to_string()),
        ]);
    }
    table.to_string()
}

pub fn format_status(status: &MarketStatus) -> String {
    format!(
        "Market: {}\nNext close: {}\nNext open: {}\nTimezone: {}",
        ui::market_state(status.is_open),
        status.next_close.format("%Y-%m-%d %H:%M"),
        status.next_open.format("%Y-%m-%d %H:%M"),
        status.timezone
    )
}
