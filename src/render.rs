use chrono::{DateTime, Local};

use crate::models::{
    Product, SortColumn, ViewState, EMOJI_IN_STOCK, EMOJI_LINK, EMOJI_OUT_OF_STOCK, EMOJI_REMOVE,
};
use crate::parsers::format_price_display;

pub const EMPTY_PLACEHOLDER: &str = "No products tracked yet.";
const HEADERS: [&str; 5] = ["Image", "Stock Status", "Visit Page", "Price", "Remove"];

/// Label of the stock filter toggle: what pressing it would switch to.
pub fn filter_toggle_label(view: &ViewState) -> &'static str {
    if view.in_stock_only {
        "Show all"
    } else {
        "In stock"
    }
}

pub fn stock_status(product: &Product) -> String {
    if product.in_stock {
        format!("{} In Stock", EMOJI_IN_STOCK)
    } else {
        format!("{} Out of Stock", EMOJI_OUT_OF_STOCK)
    }
}

fn price_header(view: &ViewState) -> String {
    match view.sort_column {
        Some(SortColumn::Price) => format!("{} {}", HEADERS[3], view.sort_direction),
        None => HEADERS[3].to_string(),
    }
}

/// Render the product table as plain text. Rows are numbered from 1 so
/// they can be removed by position.
pub fn render_table(
    rows: &[&Product],
    view: &ViewState,
    last_refreshed: Option<DateTime<Local>>,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("[{}]\n", filter_toggle_label(view)));

    let header = [
        "#".to_string(),
        HEADERS[0].to_string(),
        HEADERS[1].to_string(),
        HEADERS[2].to_string(),
        price_header(view),
        HEADERS[4].to_string(),
    ];
    out.push_str(&header.join(" | "));
    out.push('\n');

    if rows.is_empty() {
        out.push_str(EMPTY_PLACEHOLDER);
        out.push('\n');
    }

    for (index, product) in rows.iter().enumerate() {
        let cells = [
            (index + 1).to_string(),
            product.image.clone().unwrap_or_else(|| "-".to_string()),
            stock_status(product),
            format!("{} {}", EMOJI_LINK, product.url),
            format_price_display(product.price_yen.as_ref()),
            format!("{} rm {}", EMOJI_REMOVE, index + 1),
        ];
        out.push_str(&cells.join(" | "));
        out.push('\n');
    }

    if let Some(at) = last_refreshed {
        out.push_str(&format!("Last refreshed {}\n", at.format("%Y-%m-%d %H:%M:%S")));
    }

    out
}
