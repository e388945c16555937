use once_cell::sync::Lazy;
use regex::Regex;
use std::num::IntErrorKind;

use crate::models::{PriceYen, YEN};

// Leading integer, the way the crawler's price strings are read elsewhere
static LEADING_INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?\d+)")
        .expect("Invalid leading integer regex")
});

/// Parse a comma-grouped yen amount such as `"1,980"`.
///
/// Thousands separators are stripped first, then the leading integer is
/// read; trailing text (`"1,980円"`) is ignored. Returns `None` when no
/// digits lead the string. Digit runs too long for an `i64` saturate.
pub fn parse_price_yen(price_text: &str) -> Option<i64> {
    let cleaned = price_text.replace(',', "");
    let digits = LEADING_INTEGER_REGEX.captures(&cleaned)?.get(1)?.as_str();

    match digits.parse::<i64>() {
        Ok(amount) => Some(amount),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

/// Format a price cell, e.g. `¥ 1,980`.
pub fn format_price_display(price: Option<&PriceYen>) -> String {
    match price {
        Some(price) if !price.0.trim().is_empty() => format!("{} {}", YEN, price.0.trim()),
        _ => format!("{} -", YEN),
    }
}
