use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError, HttpTransport, Transport};
use crate::models::Cart;

/// The single call needed to bring a product to a target quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    Create { product: i64, quantity: u32 },
    Update { item_id: i64, product: i64, quantity: u32 },
    Delete { item_id: i64 },
    /// Quantity 0 for a product that is not in the cart
    Nothing,
}

/// Decide which call brings `product` to `quantity` in `cart`
pub fn plan_change(cart: &Cart, product: i64, quantity: u32) -> CartChange {
    match (cart.item_for(product), quantity) {
        (Some(item), 0) => CartChange::Delete { item_id: item.id },
        (Some(item), quantity) => CartChange::Update {
            item_id: item.id,
            product,
            quantity,
        },
        (None, 0) => CartChange::Nothing,
        (None, quantity) => CartChange::Create { product, quantity },
    }
}

/// Holds the last cart the server returned and applies quantity changes.
///
/// Mutations take `&mut self`, so changes made through one service never
/// interleave. Between independent clients the server's last write wins.
pub struct CartService<T = HttpTransport> {
    api: ApiClient<T>,
    cart: Cart,
}

impl<T: Transport + Clone> CartService<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self {
            api,
            cart: Cart::default(),
        }
    }

    /// Start from a cart that was fetched elsewhere
    pub fn with_cart(api: ApiClient<T>, cart: Cart) -> Self {
        Self { api, cart }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Displayed quantity, always derived from the held cart
    pub fn quantity_of(&self, product: i64) -> u32 {
        self.cart.quantity_of(product)
    }

    /// Replace the held cart with the server's
    pub async fn reload(&mut self) -> Result<&Cart, ApiError> {
        self.cart = self.api.cart().await?;
        debug!(items = self.cart.cart_items.len(), "Cart reloaded");
        Ok(&self.cart)
    }

    /// Set the quantity of a product, then re-fetch the cart.
    ///
    /// On failure the held cart is re-synced from the server, or left as
    /// it was when that also fails, and the original error is returned.
    pub async fn set_quantity(&mut self, product: i64, quantity: u32) -> Result<&Cart, ApiError> {
        let change = plan_change(&self.cart, product, quantity);
        debug!(product, quantity, ?change, "Applying cart change");

        if let Err(e) = self.apply(change).await {
            warn!(product, quantity, error = %e, "Cart change failed, re-syncing");
            if let Err(sync_error) = self.reload().await {
                warn!(error = %sync_error, "Cart re-sync failed, keeping previous cart");
            }
            return Err(e);
        }

        self.reload().await
    }

    pub async fn increment(&mut self, product: i64) -> Result<&Cart, ApiError> {
        let next = self.quantity_of(product).saturating_add(1);
        self.set_quantity(product, next).await
    }

    /// Decrement, deleting the item when it reaches zero
    pub async fn decrement(&mut self, product: i64) -> Result<&Cart, ApiError> {
        let next = self.quantity_of(product).saturating_sub(1);
        self.set_quantity(product, next).await
    }

    async fn apply(&self, change: CartChange) -> Result<(), ApiError> {
        match change {
            CartChange::Create { product, quantity } => {
                self.api.create_cart_item(product, quantity).await
            }
            CartChange::Update {
                item_id,
                product,
                quantity,
            } => self.api.update_cart_item(item_id, product, quantity).await,
            CartChange::Delete { item_id } => self.api.delete_cart_item(item_id).await,
            CartChange::Nothing => Ok(()),
        }
    }
}
