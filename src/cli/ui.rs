use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::core::rate::{ExchangeRateInfo, Trend};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Value,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Value => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn favorite_cell(is_favorite: bool) -> Cell {
    if is_favorite {
        Cell::new("★").fg(Color::Yellow)
    } else {
        Cell::new("")
    }
}

/// Trend arrow, green for up and red for down.
pub fn trend_cell(trend: Trend) -> Cell {
    let cell = Cell::new(trend.arrow()).set_alignment(CellAlignment::Center);
    match trend {
        Trend::Up => cell.fg(Color::Green),
        Trend::Down => cell.fg(Color::Red),
        Trend::Flat => cell.fg(Color::DarkGrey),
    }
}

pub fn rate_cell(rate: f64) -> Cell {
    Cell::new(format!("{rate:.4}")).set_alignment(CellAlignment::Right)
}

/// Renders rates in the order given.
pub fn rates_table(rates: &[ExchangeRateInfo]) -> Table {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell(""),
        header_cell("Code"),
        header_cell("Currency"),
        header_cell("Rate"),
        header_cell("Trend"),
    ]);
    for info in rates {
        table.add_row(vec![
            favorite_cell(info.is_favorite),
            Cell::new(&info.currency_code).add_attribute(Attribute::Bold),
            Cell::new(&info.name),
            rate_cell(info.rate),
            trend_cell(info.trend),
        ]);
    }
    table
}

/// Creates a spinner for work of unknown length, e.g. a network refresh.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
