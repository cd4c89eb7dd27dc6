//! Cart reconciliation against the server-held cart.
//!
//! The server is the only source of truth. Quantity changes are mapped to
//! create, update or delete calls on the cart-item collection, and the
//! whole cart is fetched again after every change.

pub mod service;

pub use service::{plan_change, CartChange, CartService};
