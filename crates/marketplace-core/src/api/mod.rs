//! REST API client module for the marketplace backend.
//!
//! This module provides:
//! - `Transport`: the HTTP seam, with the reqwest-backed `HttpTransport`
//! - `AuthenticatedClient`: attaches credentials and refreshes on 401
//! - `ApiClient`: one typed method per backend endpoint
//!
//! Accounts, orders and catalog endpoints authenticate with
//! `Bearer <access_token>`; closet, events and recommendation endpoints
//! with `Token <token>`. Both schemes are configurable.

pub mod authenticated;
pub mod client;
pub mod error;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use authenticated::{exchange_refresh_token, AuthenticatedClient};
pub use client::ApiClient;
pub use error::{server_message, ApiError};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, RequestDescriptor, Transport};
