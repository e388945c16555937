use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::fmt;

use super::{Product, EMOJI_ASCENDING, EMOJI_DESCENDING};

/// Columns the table can be sorted by. Stock status is not sortable; it
/// always partitions the table instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum SortColumn {
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "{}", EMOJI_ASCENDING),
            SortDirection::Descending => write!(f, "{}", EMOJI_DESCENDING),
        }
    }
}

/// Sort and filter settings of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub sort_column: Option<SortColumn>,
    pub sort_direction: SortDirection,
    pub in_stock_only: bool,
}

impl ViewState {
    /// Clicking the active column flips the direction, any other column
    /// becomes active in ascending order.
    pub fn set_sort(&mut self, column: SortColumn) {
        if self.sort_column == Some(column) {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_column = Some(column);
            self.sort_direction = SortDirection::Ascending;
        }
    }

    /// Derive the rows to display.
    ///
    /// In-stock rows always come first. A price sort orders rows inside each
    /// stock partition; missing or unparseable prices count as 0. The sort is
    /// stable, so ties keep the order the store returned them in.
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut rows: Vec<&Product> = products
            .iter()
            .filter(|p| !self.in_stock_only || p.in_stock)
            .collect();

        rows.sort_by_key(|p| Reverse(p.in_stock));

        if let Some(SortColumn::Price) = self.sort_column {
            let direction = self.sort_direction;
            rows.sort_by(|a, b| {
                b.in_stock
                    .cmp(&a.in_stock)
                    .then_with(|| direction.apply(a.price_amount().cmp(&b.price_amount())))
            });
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceYen, ProductUrl};
    use pretty_assertions::assert_eq;

    fn product(url: &str, in_stock: bool, price: Option<&str>) -> Product {
        Product {
            url: ProductUrl(url.to_string()),
            image: None,
            in_stock,
            price_yen: price.map(|p| PriceYen(p.to_string())),
        }
    }

    fn urls(rows: &[&Product]) -> Vec<String> {
        rows.iter().map(|p| p.url.0.clone()).collect()
    }

    #[test]
    fn in_stock_rows_come_first_without_sort() {
        let products = vec![
            product("a", false, Some("100")),
            product("b", true, Some("300")),
            product("c", false, Some("50")),
            product("d", true, Some("10")),
        ];
        let view = ViewState::default();
        assert_eq!(urls(&view.apply(&products)), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn price_ascending_treats_missing_price_as_zero() {
        let products = vec![
            product("two-thousand", true, Some("2,000")),
            product("one-fifty", true, Some("150")),
            product("none", true, None),
        ];
        let mut view = ViewState::default();
        view.set_sort(SortColumn::Price);
        assert_eq!(
            urls(&view.apply(&products)),
            vec!["none", "one-fifty", "two-thousand"]
        );
    }

    #[test]
    fn price_descending_keeps_stock_partition() {
        let products = vec![
            product("cheap-out", false, Some("100")),
            product("pricey-out", false, Some("9,800")),
            product("cheap-in", true, Some("500")),
            product("pricey-in", true, Some("1,980")),
        ];
        let mut view = ViewState::default();
        view.set_sort(SortColumn::Price);
        view.set_sort(SortColumn::Price);
        assert_eq!(view.sort_direction, SortDirection::Descending);
        assert_eq!(
            urls(&view.apply(&products)),
            vec!["pricey-in", "cheap-in", "pricey-out", "cheap-out"]
        );
    }

    #[test]
    fn equal_prices_keep_store_order() {
        let products = vec![
            product("first", true, Some("1,000")),
            product("garbage", true, Some("call us")),
            product("second", true, Some("1000")),
            product("blank", true, None),
        ];
        let mut view = ViewState::default();
        view.set_sort(SortColumn::Price);
        assert_eq!(
            urls(&view.apply(&products)),
            vec!["garbage", "blank", "first", "second"]
        );

        view.set_sort(SortColumn::Price);
        assert_eq!(
            urls(&view.apply(&products)),
            vec!["first", "second", "garbage", "blank"]
        );
    }

    #[test]
    fn oversized_price_sorts_as_most_expensive() {
        let products = vec![
            product("huge", true, Some("99,999,999,999,999,999,999")),
            product("normal", true, Some("9,800")),
            product("none", true, None),
        ];
        let mut view = ViewState::default();
        view.set_sort(SortColumn::Price);
        assert_eq!(urls(&view.apply(&products)), vec!["none", "normal", "huge"]);
    }

    #[test]
    fn in_stock_only_filters_rows() {
        let products = vec![
            product("a", false, None),
            product("b", true, None),
            product("c", false, None),
        ];
        let view = ViewState {
            in_stock_only: true,
            ..ViewState::default()
        };
        assert_eq!(urls(&view.apply(&products)), vec!["b"]);
    }

    #[test]
    fn toggling_same_column_twice_restores_direction() {
        let mut view = ViewState::default();
        view.set_sort(SortColumn::Price);
        let initial = view.sort_direction;
        view.set_sort(SortColumn::Price);
        view.set_sort(SortColumn::Price);
        assert_eq!(view.sort_direction, initial);
    }

    #[test]
    fn selecting_column_resets_to_ascending() {
        let mut view = ViewState {
            sort_column: None,
            sort_direction: SortDirection::Descending,
            in_stock_only: false,
        };
        view.set_sort(SortColumn::Price);
        assert_eq!(view.sort_column, Some(SortColumn::Price));
        assert_eq!(view.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn apply_is_repeatable() {
        let products = vec![
            product("a", false, Some("3")),
            product("b", true, Some("1")),
            product("c", true, Some("1")),
        ];
        let mut view = ViewState::default();
        view.set_sort(SortColumn::Price);
        assert_eq!(urls(&view.apply(&products)), urls(&view.apply(&products)));
    }

    #[test]
    fn empty_input_yields_empty_view() {
        assert!(ViewState::default().apply(&[]).is_empty());
    }
}
