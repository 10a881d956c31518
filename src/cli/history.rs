use super::ui;
use crate::core::currency::{CurrencyAnalytics, HistoricalRate, pair_symbol};
use crate::core::service::CurrencyService;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run_history(service: &CurrencyService, from: &str, to: &str, days: i64) -> Result<()> {
    let (start_date, end_date) = service.recent_window(days);

    let pb = ui::new_spinner(&format!("Fetching {from}/{to} history"));
    let rates = service
        .get_historical_rates(from, to, start_date, end_date)
        .await;
    pb.finish_and_clear();

    if rates.is_empty() {
        println!(
            "{}",
            ui::style_text(
                &format!("No historical data available for {}", pair_symbol(from, to)),
                ui::StyleType::Negative
            )
        );
        return Ok(());
    }

    println!(
        "\n{}",
        ui::style_text(
            &format!("{} from {start_date} to {end_date}", pair_symbol(from, to)),
            ui::StyleType::Title
        )
    );
    println!("{}", format_history(&rates));
    Ok(())
}

pub async fn run_analytics(
    service: &CurrencyService,
    from: &str,
    to: &str,
    days: i64,
) -> Result<()> {
    let pb = ui::new_spinner(&format!("Analyzing {from}/{to}"));
    let analytics = service.get_currency_analytics(from, to, days).await;
    pb.finish_and_clear();

    println!(
        "\n{}",
        ui::style_text(
            &format!("{} over {days} days", pair_symbol(from, to)),
            ui::StyleType::Title
        )
    );
    println!("{}", format_analytics(&analytics));
    Ok(())
}

pub fn format_history(rates: &[HistoricalRate]) -> String {
    let mut table = ui::new_table(&["Date", "Open", "High", "Low", "Close", "Volume"]);

    for bar in rates {
        table.add_row(vec![
            Cell::new(bar.date.to_string()),
            ui::rate_cell(bar.open),
            ui::rate_cell(bar.high),
            ui::rate_cell(bar.low),
            ui::rate_cell(bar.close),
            ui::number_cell(format!("{:.0}", bar.volume)),
        ]);
    }
    table.to_string()
}

pub fn format_analytics(analytics: &CurrencyAnalytics) -> String {
    let mut table = ui::new_table(&["Indicator", "Value"]);
    table.add_row(vec![Cell::new("Trend"), ui::trend_cell(analytics.trend)]);
    table.add_row(vec![
        Cell::new("Volatility"),
        ui::number_cell(format!("{:.4}%", analytics.volatility)),
    ]);
    table.add_row(vec![Cell::new("Support"), ui::rate_cell(analytics.support)]);
    table.add_row(vec![
        Cell::new("Resistance"),
        ui::rate_cell(analytics.resistance),
    ]);
    table.add_row(vec![
        Cell::new("RSI (14)"),
        ui::number_cell(format!("{:.2}", analytics.rsi)),
    ]);
    table.add_row(vec![Cell::new("MA 7"), ui::rate_cell(analytics.moving_average_7)]);
    table.add_row(vec![
        Cell::new("MA 30"),
        ui::rate_cell(analytics.moving_average_30),
    ]);
    table.to_string()
}
