//! Core library for the marketplace client.
//!
//! Provides the session and token lifecycle, the authenticated request
//! wrapper with single-flight token refresh, typed access to every backend
//! endpoint, cart reconciliation and client-side catalog filtering.

pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod models;
pub mod storefront;
pub mod utils;
pub mod validation;

pub use api::{ApiClient, ApiError};
pub use auth::Session;
pub use cart::CartService;
pub use config::Config;
pub use storefront::Storefront;
