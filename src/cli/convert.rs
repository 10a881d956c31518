use super::ui;
use crate::core::currency::ConversionResult;
use crate::core::service::CurrencyService;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(service: &CurrencyService, amount: f64, from: &str, to: &str) -> Result<()> {
    let pb = ui::new_spinner(&format!("Converting {amount} {from} to {to}"));
    let result = service.convert_currency(amount, from, to).await;
    pb.finish_and_clear();

    println!("{}", format_conversion(&result?));
    Ok(())
}

pub fn format_conversion(result: &ConversionResult) -> String {
    let mut table = ui::new_table(&["Item", "Value"]);
    table.add_row(vec![
        Cell::new("Amount"),
        ui::number_cell(format!("{:.2} {}", result.amount, result.from_currency)),
    ]);
    table.add_row(vec![Cell::new("Rate"), ui::rate_cell(result.rate)]);
    table.add_row(vec![
        Cell::new("Converted"),
        ui::number_cell(format!(
            "{:.2} {}",
            result.converted_amount, result.to_currency
        )),
    ]);
    table.add_row(vec![
        Cell::new("Fees"),
        ui::number_cell(format!("{:.2} {}", result.fees, result.to_currency)),
    ]);

    format!(
        "{}\n{} {}",
        table,
        ui::style_text("Total cost:", ui::StyleType::Label),
        ui::style_text(
            &format!("{:.2} {}", result.total_cost, result.to_currency),
            ui::StyleType::Positive
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_conversion_shows_total() {
        let result = ConversionResult {
            amount: 100.0,
            from_currency: "USD".to_string(),
            to_currency: "EUR".to_string(),
            converted_amount: 92.0,
            rate: 0.92,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            fees: 0.092,
            total_cost: 92.092,
        };
        let output = format_conversion(&result);
        assert!(output.contains("100.00 USD"));
        assert!(output.contains("0.920000"));
        assert!(output.contains("0.09 EUR"));
        assert!(output.contains("92.09 EUR"));
    }
}
