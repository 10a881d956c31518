use crate::core::currency::Trend;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub enum StyleType {
    Title,
    Label,
    Positive,
    Negative,
    Subtle,
}

pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Positive => style(text).green().bold(),
        StyleType::Negative => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Rounded UTF-8 table that wraps to the terminal width.
pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| {
            Cell::new(h)
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold)
        }));
    table
}

pub fn number_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

pub fn rate_cell(rate: f64) -> Cell {
    number_cell(format!("{rate:.6}"))
}

fn na_cell() -> Cell {
    Cell::new("N/A")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

/// Rate cell for synthetic stats that may be absent.
pub fn optional_rate_cell(rate: Option<f64>) -> Cell {
    rate.map_or_else(na_cell, rate_cell)
}

/// Signed percentage, green when up and red when down. `None` renders as "N/A".
pub fn change_cell(change_percent: Option<f64>) -> Cell {
    match change_percent {
        Some(change) => {
            let color = if change >= 0.0 { Color::Green } else { Color::Red };
            number_cell(format!("{change:+.2}%")).fg(color)
        }
        None => na_cell(),
    }
}

pub fn trend_cell(trend: Trend) -> Cell {
    let color = match trend {
        Trend::Bullish => Color::Green,
        Trend::Bearish => Color::Red,
        Trend::Sideways => Color::DarkGrey,
    };
    Cell::new(trend.to_string()).fg(color)
}

pub fn market_state(is_open: bool) -> String {
    if is_open {
        style_text("OPEN", StyleType::Positive)
    } else {
        style_text("CLOSED", StyleType::Negative)
    }
}

/// Spinner shown while a request is in flight. Clear it before printing output.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
