use serde::{Deserialize, Serialize};

use super::de_decimal;
use crate::utils::{format_price, parse_price};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal as sent by the server, e.g. "4.99"
    #[serde(deserialize_with = "de_decimal")]
    pub price: String,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl Product {
    pub fn price_value(&self) -> Option<f64> {
        parse_price(&self.price)
    }

    pub fn display_price(&self) -> String {
        match &self.unit {
            Some(unit) if !unit.is_empty() => format!("{} / {}", format_price(&self.price), unit),
            _ => format_price(&self.price),
        }
    }

    pub fn in_stock(&self) -> bool {
        self.stock.map(|s| s > 0).unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Recipe {
    pub id: i64,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub prep_time: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
    /// Products used as ingredients
    #[serde(default)]
    pub products: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RecipeCategory {
    pub id: i64,
    pub name: String,
}
