use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::de_decimal;

/// Server-held cart. Replaced wholesale after every round-trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Cart {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
}

impl Cart {
    pub fn item_for(&self, product: i64) -> Option<&CartItem> {
        self.cart_items.iter().find(|item| item.product == product)
    }

    /// Quantity of a product, 0 when it is not in the cart
    pub fn quantity_of(&self, product: i64) -> u32 {
        self.item_for(product).map(|item| item.quantity).unwrap_or(0)
    }

    pub fn total_quantity(&self) -> u32 {
        self.cart_items.iter().map(|item| item.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cart_items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CartItem {
    pub id: i64,
    pub product: i64,
    pub quantity: u32,
}

/// Body for creating or updating a cart item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartItemRequest {
    pub product: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "total_price", deserialize_with = "de_optional_decimal")]
    pub total: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "order_items")]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct OrderItem {
    pub product: i64,
    pub quantity: u32,
    #[serde(default, deserialize_with = "de_optional_decimal")]
    pub price: Option<String>,
}

fn de_optional_decimal<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "de_decimal")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(s)| s))
}
