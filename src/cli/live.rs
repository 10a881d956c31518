use super::rate::format_status;
use super::ui;
use crate::core::live::{LiveFeed, LiveUpdate};
use crate::core::service::CurrencyService;
use anyhow::Result;
use comfy_table::Cell;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Streams live updates until ctrl-c, or until `ticks` updates were printed.
pub async fn run(
    service: Arc<CurrencyService>,
    pairs: Vec<(String, String)>,
    interval: Duration,
    ticks: Option<u64>,
) -> Result<()> {
    let (mut feed, mut updates) = LiveFeed::new(service, pairs, interval);
    feed.start();
    println!(
        "{}",
        ui::style_text(
            &format!("Live rates every {}s, press Ctrl-C to stop", interval.as_secs()),
            ui::StyleType::Subtle
        )
    );

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                ui::print_separator();
                println!("{}", format_update(&update));
                if ticks.is_some_and(|limit| update.tick >= limit) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping live feed");
                break;
            }
        }
    }

    feed.stop();
    Ok(())
}

pub fn format_update(update: &LiveUpdate) -> String {
    let mut table = ui::new_table(&["Pair", "Rate", "24h Change", "Updated"]);
    for rate in &update.rates {
        table.add_row(vec![
            Cell::new(rate.pair_symbol()),
            ui::rate_cell(rate.rate),
            ui::change_cell(rate.change_percent_24h),
            Cell::new(rate.timestamp.format("%H:%M:%S").to_string()),
        ]);
    }

    format!(
        "{}\n{}\n{}",
        ui::style_text(&format!("Update #{}", update.tick), ui::StyleType::Title),
        table,
        format_status(&update.market_status)
    )
}
