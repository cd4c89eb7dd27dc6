//! API client for communicating with the marketplace REST backend.
//!
//! This module provides the `ApiClient` struct with one method per backend
//! endpoint. Accounts, orders and catalog calls go through the primary
//! realm; closet, events and recommendations go through the wardrobe realm.

use futures::future::try_join_all;
use tracing::{debug, info};

use super::authenticated::AuthenticatedClient;
use super::transport::{send_public, HttpTransport, RequestDescriptor, Transport};
use super::ApiError;
use crate::auth::{open_token_store, CredentialScheme, Realm, Session};
use crate::config::Config;
use crate::models::account::AuthResponse;
use crate::models::{
    Cart, CartItem, CartItemRequest, Category, ClosetItem, GoogleLoginRequest, ListResponse,
    LoginRequest, NewClosetItem, NewEvent, NewRecommendation, Order, PlannedEvent, Product,
    ProfileUpdate, Recipe, RecipeCategory, Recommendation, RegisterRequest, TokenPair,
    UserProfile, WardrobeProfile,
};
use crate::validation::SignupForm;

// ============================================================================
// Endpoints
// ============================================================================

const LOGIN_PATH: &str = "/api/accounts/login/";
const REGISTER_PATH: &str = "/api/accounts/register/";
const GOOGLE_LOGIN_PATH: &str = "/api/accounts/google-login/";
const ME_PATH: &str = "/api/accounts/me/";

const PRODUCTS_PATH: &str = "/api/products/";
const CATEGORIES_PATH: &str = "/api/categories/";
const RECIPES_PATH: &str = "/api/recipes/";
const RECIPE_CATEGORIES_PATH: &str = "/api/recipe-categories/";

pub(crate) const CARTS_PATH: &str = "/api/orders/carts/";
pub(crate) const CART_ITEMS_PATH: &str = "/api/orders/cart-items/";
const ORDERS_PATH: &str = "/api/orders/orders/";

const EVENTS_PATH: &str = "/api/auth/events/";
const CLOSET_PATH: &str = "/api/auth/closet/";
const RECOMMENDATIONS_PATH: &str = "/api/auth/recommendations/";
const WARDROBE_PROFILE_PATH: &str = "/api/auth/profile/";

fn detail_path(collection: &str, id: i64) -> String {
    format!("{}{}/", collection, id)
}

/// API client for the marketplace backend.
/// Clone is cheap - the transport and session are shared.
#[derive(Clone)]
pub struct ApiClient<T = HttpTransport> {
    transport: T,
    session: Session,
    primary: AuthenticatedClient<T>,
    wardrobe: AuthenticatedClient<T>,
}

impl ApiClient<HttpTransport> {
    /// Build a client from the configuration, opening the configured token store
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let store = open_token_store(config)?;
        let transport = HttpTransport::new(config.base_url(), config.request_timeout())?;
        Ok(Self::new(
            transport,
            Session::new(store),
            config.primary_scheme,
            config.wardrobe_scheme,
        ))
    }
}

impl<T: Transport + Clone> ApiClient<T> {
    pub fn new(
        transport: T,
        session: Session,
        primary_scheme: CredentialScheme,
        wardrobe_scheme: CredentialScheme,
    ) -> Self {
        let primary = AuthenticatedClient::new(
            transport.clone(),
            session.clone(),
            Realm::accounts(primary_scheme),
        );
        let wardrobe = AuthenticatedClient::new(
            transport.clone(),
            session.clone(),
            Realm::wardrobe(wardrobe_scheme),
        );
        Self {
            transport,
            session,
            primary,
            wardrobe,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ===== Account Methods =====

    /// Log in with username and password and store the returned tokens
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let descriptor = RequestDescriptor::post(LOGIN_PATH, &LoginRequest { username, password })?;
        let tokens = self.authenticate(descriptor).await?;
        info!(username, "Logged in");
        Ok(tokens)
    }

    /// Create an account. An invalid form fails with `ApiError::Validation`
    /// without contacting the server.
    pub async fn register(&self, form: &SignupForm) -> Result<TokenPair, ApiError> {
        form.validate()?;
        let descriptor = RequestDescriptor::post(
            REGISTER_PATH,
            &RegisterRequest {
                username: form.username.trim(),
                email: form.email.trim(),
                password: &form.password,
                password2: &form.password_confirmation,
            },
        )?;
        let tokens = self.authenticate(descriptor).await?;
        info!(username = %form.username.trim(), "Account registered");
        Ok(tokens)
    }

    /// Exchange a Google ID token for marketplace tokens
    pub async fn google_login(&self, id_token: &str) -> Result<TokenPair, ApiError> {
        let descriptor =
            RequestDescriptor::post(GOOGLE_LOGIN_PATH, &GoogleLoginRequest { token: id_token })?;
        let tokens = self.authenticate(descriptor).await?;
        info!("Logged in with Google");
        Ok(tokens)
    }

    async fn authenticate(&self, descriptor: RequestDescriptor) -> Result<TokenPair, ApiError> {
        let response = send_public(&self.transport, descriptor).await?;
        let tokens = response.json::<AuthResponse>()?.into_tokens();
        self.session.establish(&tokens)?;
        Ok(tokens)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.clear()?;
        Ok(())
    }

    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.primary.request_json(RequestDescriptor::get(ME_PATH)).await
    }

    pub async fn update_me(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.primary
            .request_json(RequestDescriptor::patch(ME_PATH, update)?)
            .await
    }

    // ===== Catalog Methods =====

    async fn list<R: serde::de::DeserializeOwned>(
        client: &AuthenticatedClient<T>,
        path: &str,
    ) -> Result<Vec<R>, ApiError> {
        let items = client
            .request_json::<ListResponse<R>>(RequestDescriptor::get(path))
            .await?
            .into_vec();
        debug!(path, count = items.len(), "List fetched");
        Ok(items)
    }

    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        Self::list(&self.primary, PRODUCTS_PATH).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        Self::list(&self.primary, CATEGORIES_PATH).await
    }

    pub async fn recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        Self::list(&self.primary, RECIPES_PATH).await
    }

    pub async fn recipe_categories(&self) -> Result<Vec<RecipeCategory>, ApiError> {
        Self::list(&self.primary, RECIPE_CATEGORIES_PATH).await
    }

    // ===== Cart and Order Methods =====

    pub async fn carts(&self) -> Result<Vec<Cart>, ApiError> {
        Self::list(&self.primary, CARTS_PATH).await
    }

    /// The current user's cart; empty when the server has none yet
    pub async fn cart(&self) -> Result<Cart, ApiError> {
        Ok(self.carts().await?.into_iter().next().unwrap_or_default())
    }

    pub async fn cart_item(&self, item_id: i64) -> Result<CartItem, ApiError> {
        self.primary
            .request_json(RequestDescriptor::get(detail_path(CART_ITEMS_PATH, item_id)))
            .await
    }

    pub async fn create_cart_item(&self, product: i64, quantity: u32) -> Result<(), ApiError> {
        let body = CartItemRequest { product, quantity };
        self.primary
            .request(RequestDescriptor::post(CART_ITEMS_PATH, &body)?)
            .await?;
        Ok(())
    }

    pub async fn update_cart_item(
        &self,
        item_id: i64,
        product: i64,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let body = CartItemRequest { product, quantity };
        self.primary
            .request(RequestDescriptor::put(detail_path(CART_ITEMS_PATH, item_id), &body)?)
            .await?;
        Ok(())
    }

    pub async fn delete_cart_item(&self, item_id: i64) -> Result<(), ApiError> {
        self.primary
            .request(RequestDescriptor::delete(detail_path(CART_ITEMS_PATH, item_id)))
            .await?;
        Ok(())
    }

    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        Self::list(&self.primary, ORDERS_PATH).await
    }

    // ===== Wardrobe Methods =====

    pub async fn events(&self) -> Result<Vec<PlannedEvent>, ApiError> {
        Self::list(&self.wardrobe, EVENTS_PATH).await
    }

    pub async fn event(&self, event_id: i64) -> Result<PlannedEvent, ApiError> {
        self.wardrobe
            .request_json(RequestDescriptor::get(detail_path(EVENTS_PATH, event_id)))
            .await
    }

    pub async fn create_event(&self, event: &NewEvent) -> Result<PlannedEvent, ApiError> {
        self.wardrobe
            .request_json(RequestDescriptor::post(EVENTS_PATH, event)?)
            .await
    }

    pub async fn delete_event(&self, event_id: i64) -> Result<(), ApiError> {
        self.wardrobe
            .request(RequestDescriptor::delete(detail_path(EVENTS_PATH, event_id)))
            .await?;
        Ok(())
    }

    pub async fn closet(&self) -> Result<Vec<ClosetItem>, ApiError> {
        Self::list(&self.wardrobe, CLOSET_PATH).await
    }

    pub async fn add_closet_item(&self, item: &NewClosetItem) -> Result<ClosetItem, ApiError> {
        self.wardrobe
            .request_json(RequestDescriptor::post(CLOSET_PATH, item)?)
            .await
    }

    pub async fn delete_closet_item(&self, item_id: i64) -> Result<(), ApiError> {
        self.wardrobe
            .request(RequestDescriptor::delete(detail_path(CLOSET_PATH, item_id)))
            .await?;
        Ok(())
    }

    /// Delete several closet items in parallel
    pub async fn delete_closet_items(&self, item_ids: &[i64]) -> Result<(), ApiError> {
        try_join_all(item_ids.iter().map(|id| self.delete_closet_item(*id))).await?;
        Ok(())
    }

    pub async fn recommendations(&self) -> Result<Vec<Recommendation>, ApiError> {
        Self::list(&self.wardrobe, RECOMMENDATIONS_PATH).await
    }

    pub async fn recommendation(&self, recommendation_id: i64) -> Result<Recommendation, ApiError> {
        self.wardrobe
            .request_json(RequestDescriptor::get(detail_path(
                RECOMMENDATIONS_PATH,
                recommendation_id,
            )))
            .await
    }

    pub async fn create_recommendation(
        &self,
        recommendation: &NewRecommendation,
    ) -> Result<Recommendation, ApiError> {
        self.wardrobe
            .request_json(RequestDescriptor::post(RECOMMENDATIONS_PATH, recommendation)?)
            .await
    }

    pub async fn delete_recommendation(&self, recommendation_id: i64) -> Result<(), ApiError> {
        self.wardrobe
            .request(RequestDescriptor::delete(detail_path(
                RECOMMENDATIONS_PATH,
                recommendation_id,
            )))
            .await?;
        Ok(())
    }

    pub async fn wardrobe_profile(&self) -> Result<WardrobeProfile, ApiError> {
        self.wardrobe
            .request_json(RequestDescriptor::get(WARDROBE_PROFILE_PATH))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::api::testing::{no_content, respond, FakeTransport};
    use crate::auth::{MemoryTokenStore, TokenKey, TokenStore};

    fn api(transport: &FakeTransport) -> (Arc<MemoryTokenStore>, ApiClient<FakeTransport>) {
        let store = Arc::new(MemoryTokenStore::new());
        let api = ApiClient::new(
            transport.clone(),
            Session::new(store.clone()),
            CredentialScheme::Bearer,
            CredentialScheme::Token,
        );
        (store, api)
    }

    #[tokio::test]
    async fn test_login_stores_tokens() {
        let transport =
            FakeTransport::new(|_| respond(200, json!({"access": "acc", "refresh": "ref"})));
        let (store, api) = api(&transport);

        api.login("chef", "secret").await.unwrap();

        let login = &transport.calls(Method::POST, LOGIN_PATH)[0];
        assert_eq!(login.authorization, None);
        assert_eq!(login.descriptor.body, Some(json!({"username": "chef", "password": "secret"})));
        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("acc"));
        assert_eq!(store.get(TokenKey::Refresh).unwrap().as_deref(), Some("ref"));
        assert_eq!(store.get(TokenKey::Legacy).unwrap().as_deref(), Some("acc"));
    }

    #[tokio::test]
    async fn test_failed_login_keeps_session_empty() {
        let transport = FakeTransport::new(|_| {
            respond(400, json!({"non_field_errors": ["Unable to log in with provided credentials."]}))
        });
        let (store, api) = api(&transport);

        let err = api.login("chef", "wrong").await.unwrap_err();
        assert_eq!(err.user_message(), "Unable to log in with provided credentials.");
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);
    }

    #[tokio::test]
    async fn test_register_sends_form_and_accepts_nested_tokens() {
        let transport = FakeTransport::new(|_| {
            respond(201, json!({"user": {"id": 1}, "tokens": {"access": "a", "refresh": "r"}}))
        });
        let (store, api) = api(&transport);
        let form = SignupForm {
            username: " chef ".to_string(),
            email: "chef@example.com".to_string(),
            password: "longpassword".to_string(),
            password_confirmation: "longpassword".to_string(),
        };

        api.register(&form).await.unwrap();

        let body = transport.calls(Method::POST, REGISTER_PATH)[0].descriptor.body.clone();
        assert_eq!(
            body,
            Some(json!({
                "username": "chef",
                "email": "chef@example.com",
                "password": "longpassword",
                "password2": "longpassword"
            }))
        );
        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_form_locally() {
        let transport = FakeTransport::new(|_| respond(201, json!({"access": "a"})));
        let (store, api) = api(&transport);
        let form = SignupForm {
            username: "chef".to_string(),
            email: "not-an-email".to_string(),
            password: "12345678".to_string(),
            password_confirmation: "12345678".to_string(),
        };

        let err = api.register(&form).await.unwrap_err();

        match &err {
            ApiError::Validation(errors) => {
                assert_eq!(errors.for_field("email"), Some("Enter a valid email address."));
                assert_eq!(
                    errors.for_field("password"),
                    Some("Password cannot be entirely numeric.")
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            err.user_message(),
            "email: Enter a valid email address.\npassword: Password cannot be entirely numeric."
        );
        assert!(!err.requires_login());
        assert!(transport.requests().is_empty());
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);
    }

    #[tokio::test]
    async fn test_google_login() {
        let transport = FakeTransport::new(|_| respond(200, json!({"access_token": "g"})));
        let (store, api) = api(&transport);

        api.google_login("id-token").await.unwrap();

        let call = &transport.calls(Method::POST, GOOGLE_LOGIN_PATH)[0];
        assert_eq!(call.descriptor.body, Some(json!({"token": "id-token"})));
        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("g"));
        assert_eq!(store.get(TokenKey::Refresh).unwrap(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_tokens() {
        let transport = FakeTransport::new(|_| respond(200, json!({"access": "a", "refresh": "r"})));
        let (store, api) = api(&transport);
        api.login("chef", "secret").await.unwrap();

        api.logout().unwrap();
        assert!(!api.session().is_authenticated().unwrap());
        assert_eq!(store.get(TokenKey::Legacy).unwrap(), None);
    }

    #[tokio::test]
    async fn test_realms_use_their_schemes() {
        let transport = FakeTransport::new(|_| respond(200, json!([])));
        let (store, api) = api(&transport);
        store.set(TokenKey::Access, "acc").unwrap();
        store.set(TokenKey::Legacy, "leg").unwrap();

        api.products().await.unwrap();
        api.closet().await.unwrap();

        let products = &transport.calls(Method::GET, PRODUCTS_PATH)[0];
        assert_eq!(products.authorization.as_deref(), Some("Bearer acc"));
        let closet = &transport.calls(Method::GET, CLOSET_PATH)[0];
        assert_eq!(closet.authorization.as_deref(), Some("Token leg"));
    }

    #[tokio::test]
    async fn test_lists_accept_paginated_responses() {
        let transport = FakeTransport::new(|_| {
            respond(200, json!({"count": 1, "results": [{"id": 1, "name": "Herbs"}]}))
        });
        let (store, api) = api(&transport);
        store.set(TokenKey::Access, "acc").unwrap();

        let categories = api.categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Herbs");
    }

    #[tokio::test]
    async fn test_cart_is_empty_when_server_has_none() {
        let transport = FakeTransport::new(|_| respond(200, json!([])));
        let (store, api) = api(&transport);
        store.set(TokenKey::Access, "acc").unwrap();

        let cart = api.cart().await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_update_me_patches_profile() {
        let transport = FakeTransport::new(|_| {
            respond(200, json!({"id": 1, "username": "chef", "first_name": "Ada"}))
        });
        let (store, api) = api(&transport);
        store.set(TokenKey::Access, "acc").unwrap();

        let update = ProfileUpdate {
            first_name: Some("Ada".to_string()),
            ..Default::default()
        };
        let profile = api.update_me(&update).await.unwrap();

        assert_eq!(profile.display_name(), "Ada");
        let call = &transport.calls(Method::PATCH, ME_PATH)[0];
        assert_eq!(call.descriptor.body, Some(json!({"first_name": "Ada"})));
    }

    #[tokio::test]
    async fn test_delete_closet_items_deletes_each() {
        let transport = FakeTransport::new(|_| no_content());
        let (store, api) = api(&transport);
        store.set(TokenKey::Legacy, "leg").unwrap();

        api.delete_closet_items(&[3, 4]).await.unwrap();

        assert_eq!(transport.calls(Method::DELETE, "/api/auth/closet/3/").len(), 1);
        assert_eq!(transport.calls(Method::DELETE, "/api/auth/closet/4/").len(), 1);
    }

    #[tokio::test]
    async fn test_create_event_and_recommendation() {
        let transport = FakeTransport::new(|req| match req.descriptor.path.as_str() {
            EVENTS_PATH => respond(201, json!({"id": 9, "title": "Gala", "date": "2024-12-01"})),
            _ => respond(201, json!({"id": 2, "event": 9, "items": [1, 5]})),
        });
        let (store, api) = api(&transport);
        store.set(TokenKey::Legacy, "leg").unwrap();

        let event = api
            .create_event(&NewEvent {
                title: "Gala".to_string(),
                date: "2024-12-01".to_string(),
                location: None,
                description: None,
                dress_code: Some("black tie".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(event.id, 9);

        let recommendation = api
            .create_recommendation(&NewRecommendation {
                event: Some(event.id),
                items: vec![1, 5],
                note: None,
            })
            .await
            .unwrap();
        assert_eq!(recommendation.items, vec![1, 5]);

        let posted = &transport.calls(Method::POST, RECOMMENDATIONS_PATH)[0];
        assert_eq!(posted.descriptor.body, Some(json!({"event": 9, "items": [1, 5]})));
    }

    #[tokio::test]
    async fn test_detail_endpoints_use_realm_paths_and_schemes() {
        let transport = FakeTransport::new(|req| match req.descriptor.path.as_str() {
            "/api/orders/cart-items/10/" => respond(200, json!({"id": 10, "product": 7, "quantity": 2})),
            "/api/auth/events/9/" => respond(200, json!({"id": 9, "name": "Gala"})),
            "/api/auth/recommendations/2/" => respond(200, json!({"id": 2, "items": [1]})),
            WARDROBE_PROFILE_PATH => {
                respond(200, json!({"id": 1, "username": "chef", "style_preferences": "minimal"}))
            }
            _ => respond(404, json!({"detail": "Not found."})),
        });
        let (store, api) = api(&transport);
        store.set(TokenKey::Access, "acc").unwrap();
        store.set(TokenKey::Legacy, "leg").unwrap();

        let item = api.cart_item(10).await.unwrap();
        assert_eq!((item.product, item.quantity), (7, 2));
        assert_eq!(api.event(9).await.unwrap().title, "Gala");
        assert_eq!(api.recommendation(2).await.unwrap().items, vec![1]);
        let profile = api.wardrobe_profile().await.unwrap();
        assert_eq!(profile.style_preferences.as_deref(), Some("minimal"));

        let requests = transport.requests();
        let schemes: Vec<(&str, Option<&str>)> = requests
            .iter()
            .map(|r| (r.descriptor.path.as_str(), r.authorization.as_deref()))
            .collect();
        assert_eq!(
            schemes,
            vec![
                ("/api/orders/cart-items/10/", Some("Bearer acc")),
                ("/api/auth/events/9/", Some("Token leg")),
                ("/api/auth/recommendations/2/", Some("Token leg")),
                (WARDROBE_PROFILE_PATH, Some("Token leg")),
            ]
        );
        assert!(requests.iter().all(|r| r.descriptor.method == Method::GET));
    }
}
