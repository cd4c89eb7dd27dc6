//! Data models for marketplace entities.
//!
//! This module contains all the data structures exchanged with the
//! backend:
//!
//! - Account types: `TokenPair`, `UserProfile`, login/register bodies
//! - Catalog types: `Product`, `Category`, `Recipe`, `RecipeCategory`
//! - Order types: `Cart`, `CartItem`, `Order`
//! - Wardrobe types: `ClosetItem`, `PlannedEvent`, `Recommendation`

pub mod account;
pub mod catalog;
pub mod order;
pub mod wardrobe;

use serde::Deserialize;

pub use account::{
    GoogleLoginRequest, LoginRequest, ProfileUpdate, RefreshRequest, RegisterRequest, TokenPair,
    UserProfile,
};
pub use catalog::{Category, Product, Recipe, RecipeCategory};
pub use order::{Cart, CartItem, CartItemRequest, Order, OrderItem};
pub use wardrobe::{
    ClosetItem, NewClosetItem, NewEvent, NewRecommendation, PlannedEvent, Recommendation,
    WardrobeProfile,
};

/// List endpoints answer either with a bare array or a paginated page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Plain(Vec<T>),
    Page { results: Vec<T> },
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Plain(items) => items,
            ListResponse::Page { results } => results,
        }
    }
}

/// Accepts a decimal sent either as a JSON string or a number.
pub(crate) fn de_decimal<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Decimal::deserialize(deserializer)? {
        Decimal::Text(s) => s,
        Decimal::Number(n) => n.to_string(),
    })
}
