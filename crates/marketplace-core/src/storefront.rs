//! Initial data load for the storefront screen.

use tracing::info;

use crate::api::{ApiClient, ApiError, Transport};
use crate::models::{Cart, Category, Product, Recipe, UserProfile};

/// Everything the storefront needs before it can render
#[derive(Debug, Clone)]
pub struct Storefront {
    pub profile: UserProfile,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub cart: Cart,
    pub recipes: Vec<Recipe>,
}

impl Storefront {
    pub fn category_name(&self, category: Option<i64>) -> Option<&str> {
        let id = category?;
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    pub fn product(&self, product: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product)
    }
}

impl<T: Transport + Clone> ApiClient<T> {
    /// Fetch profile, products, categories, cart and recipes in parallel.
    /// Any failure fails the whole load.
    pub async fn load_storefront(&self) -> Result<Storefront, ApiError> {
        let (profile, products, categories, cart, recipes) = tokio::try_join!(
            self.me(),
            self.products(),
            self.categories(),
            self.cart(),
            self.recipes(),
        )?;

        info!(
            products = products.len(),
            categories = categories.len(),
            cart_items = cart.cart_items.len(),
            recipes = recipes.len(),
            "Storefront loaded"
        );

        Ok(Storefront {
            profile,
            products,
            categories,
            cart,
            recipes,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::api::testing::{respond, FakeTransport};
    use crate::auth::{CredentialScheme, MemoryTokenStore, Session, TokenKey, TokenStore};

    fn api(transport: &FakeTransport) -> ApiClient<FakeTransport> {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(TokenKey::Access, "acc").unwrap();
        ApiClient::new(
            transport.clone(),
            Session::new(store),
            CredentialScheme::Bearer,
            CredentialScheme::Token,
        )
    }

    fn backend(fail_recipes: bool) -> FakeTransport {
        FakeTransport::new(move |req| match req.descriptor.path.as_str() {
            "/api/accounts/me/" => respond(200, json!({"id": 1, "username": "chef"})),
            "/api/products/" => respond(200, json!([{"id": 7, "name": "Basil", "price": "2.00", "category": 1}])),
            "/api/categories/" => respond(200, json!([{"id": 1, "name": "Herbs"}])),
            "/api/orders/carts/" => respond(200, json!([{"id": 3, "cart_items": [{"id": 10, "product": 7, "quantity": 2}]}])),
            "/api/recipes/" if fail_recipes => respond(500, json!({"detail": "down"})),
            "/api/recipes/" => respond(200, json!([{"id": 4, "name": "Pesto"}])),
            _ => respond(404, json!({"detail": "Not found."})),
        })
    }

    #[tokio::test]
    async fn test_load_storefront_fetches_everything() {
        let transport = backend(false);
        let storefront = api(&transport).load_storefront().await.unwrap();

        assert_eq!(storefront.profile.username, "chef");
        assert_eq!(storefront.cart.quantity_of(7), 2);
        assert_eq!(storefront.recipes.len(), 1);
        assert_eq!(storefront.category_name(storefront.products[0].category), Some("Herbs"));
        assert_eq!(storefront.product(7).map(|p| p.name.as_str()), Some("Basil"));
        assert_eq!(transport.requests().len(), 5);
        assert!(transport.requests().iter().all(|r| r.descriptor.method == Method::GET));
    }

    #[tokio::test]
    async fn test_load_storefront_fails_when_any_read_fails() {
        let transport = backend(true);
        let result = api(&transport).load_storefront().await;
        assert!(matches!(result, Err(ApiError::ServerError(_))));
    }
}
