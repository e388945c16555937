use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parsers::parse_price_yen;

// NewType pattern for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductUrl(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceYen(pub String);

impl ProductUrl {
    /// Trim user input; blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PriceYen {
    /// Numeric value used for ordering. Unparseable text orders as 0.
    pub fn amount(&self) -> i64 {
        parse_price_yen(&self.0).unwrap_or(0)
    }
}

impl fmt::Display for ProductUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PriceYen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row of the `tracker` table.
///
/// `image`, `in_stock` and `price_yen` are written by the crawler; the
/// tracker itself only ever creates and deletes rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub url: ProductUrl,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub price_yen: Option<PriceYen>,
}

impl Product {
    /// Price used for ordering: missing or unparseable prices count as 0.
    pub fn price_amount(&self) -> i64 {
        self.price_yen.as_ref().map(PriceYen::amount).unwrap_or(0)
    }
}

/// Payload for inserting a freshly submitted URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub url: ProductUrl,
    pub in_stock: bool,
}

impl NewProduct {
    pub fn new(url: ProductUrl) -> Self {
        Self {
            url,
            in_stock: false,
        }
    }
}

impl From<NewProduct> for Product {
    fn from(new: NewProduct) -> Self {
        Self {
            url: new.url,
            image: None,
            in_stock: new.in_stock,
            price_yen: None,
        }
    }
}
