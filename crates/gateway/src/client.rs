//! Gateway REST client implementation.
//!
//! One `reqwest`-backed client covers the whole surface: catalog, inventory,
//! users, auth, and orders. Catalog pages are cached with `moka`
//! (5-minute TTL) and invalidated by any write that can change them.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use moka::future::Cache;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use spokeshop_core::{OrderId, Page, ProductId, UserId};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, extract_error_message};
use crate::types::{
    AdminOrder, LoginRequest, LoginResponse, NewOrder, Order, Product, ProductInput, Registration,
    StockUpdate, User,
};

/// Catalog cache time-to-live.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);

/// Catalog cache capacity (pages, not products).
const CATALOG_CACHE_CAPACITY: u64 = 1000;

/// Client for the backend gateway.
///
/// Cheaply cloneable; all clones share the HTTP connection pool, the bearer
/// token, and the catalog cache.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<GatewayClientInner>,
}

struct GatewayClientInner {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    catalog_cache: Cache<String, Page<Product>>,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Create a new gateway client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let catalog_cache = Cache::builder()
            .max_capacity(CATALOG_CACHE_CAPACITY)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(GatewayClientInner {
                http,
                base_url: config.base_url.clone(),
                token: RwLock::new(None),
                catalog_cache,
            }),
        })
    }

    // =========================================================================
    // Token Management
    // =========================================================================

    /// Install the bearer token attached to subsequent requests.
    pub fn set_token(&self, token: impl Into<String>) {
        let mut guard = self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(SecretString::from(token.into()));
    }

    /// Drop the stored bearer token.
    pub fn clear_token(&self) {
        let mut guard = self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    /// Whether a bearer token is currently installed.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn current_token(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.expose_secret().to_owned())
    }

    // =========================================================================
    // Request Plumbing
    // =========================================================================

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        // The base URL is validated at config load, so it always has a path
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Execute a request and return the raw response body.
    ///
    /// 401/403 responses discard the stored token and map to
    /// [`GatewayError::Unauthorized`]; other non-success statuses carry a
    /// best-effort message from the body.
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<String, GatewayError> {
        let mut request = self.inner.http.request(method, url);

        if let Some(token) = self.current_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            // The session is gone; keeping the token would only repeat the
            // failure on every subsequent call.
            self.clear_token();
            return Err(GatewayError::Unauthorized);
        }

        // Read the body as text first for better error diagnostics
        let text = response.text().await?;

        if !status.is_success() {
            let message = extract_error_message(&text);
            debug!(status = %status, message = %message, "gateway call failed");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(text)
    }

    /// Execute a request and parse the JSON response body.
    async fn request_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, GatewayError> {
        let text = self.execute(method, url, body).await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "failed to parse gateway response"
            );
            GatewayError::Parse(e)
        })
    }

    /// Execute a request whose response body is irrelevant.
    async fn request_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<(), GatewayError> {
        self.execute(method, url, body).await.map(|_| ())
    }

    /// Drop all cached catalog pages.
    ///
    /// Called after every write that can change listings or stock counts.
    pub async fn invalidate_catalog(&self) {
        self.inner.catalog_cache.invalidate_all();
        self.inner.catalog_cache.run_pending_tasks().await;
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Get one page of the unfiltered product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products_page(&self, page: u32, size: u32) -> Result<Page<Product>, GatewayError> {
        let cache_key = format!("products:all:{page}:{size}");
        if let Some(cached) = self.inner.catalog_cache.get(&cache_key).await {
            debug!("cache hit for product page");
            return Ok(cached);
        }

        let mut url = self.endpoint(&["api", "products"]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());

        let result: Page<Product> = self
            .request_json::<_, ()>(Method::GET, url, None)
            .await?;

        self.inner
            .catalog_cache
            .insert(cache_key, result.clone())
            .await;
        Ok(result)
    }

    /// Get one page of the listing filtered to a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn products_by_category(
        &self,
        category: &str,
        page: u32,
        size: u32,
    ) -> Result<Page<Product>, GatewayError> {
        let cache_key = format!("products:{category}:{page}:{size}");
        if let Some(cached) = self.inner.catalog_cache.get(&cache_key).await {
            debug!("cache hit for category page");
            return Ok(cached);
        }

        let mut url = self.endpoint(&["api", "products", "category", category]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());

        let result: Page<Product> = self
            .request_json::<_, ()>(Method::GET, url, None)
            .await?;

        self.inner
            .catalog_cache
            .insert(cache_key, result.clone())
            .await;
        Ok(result)
    }

    // =========================================================================
    // Products (admin)
    // =========================================================================

    /// List every product, unpaginated.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn all_products(&self) -> Result<Vec<Product>, GatewayError> {
        let url = self.endpoint(&["api", "admin", "products", "all"]);
        self.request_json::<_, ()>(Method::GET, url, None).await
    }

    /// Create a product and return it with its server-assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, GatewayError> {
        let url = self.endpoint(&["api", "products"]);
        let product = self.request_json(Method::POST, url, Some(input)).await?;
        self.invalidate_catalog().await;
        Ok(product)
    }

    /// Update a product's base fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: &ProductId,
        input: &ProductInput,
    ) -> Result<(), GatewayError> {
        let url = self.endpoint(&["api", "admin", "products", product_id.as_str()]);
        self.request_unit(Method::PUT, url, Some(input)).await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn delete_product(&self, product_id: &ProductId) -> Result<(), GatewayError> {
        let url = self.endpoint(&["api", "admin", "products", product_id.as_str()]);
        self.request_unit::<()>(Method::DELETE, url, None).await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Ids of every product currently on the shelf.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn on_shelf_product_ids(&self) -> Result<Vec<ProductId>, GatewayError> {
        let url = self.endpoint(&["api", "inventorys", "on-shelf-product-ids"]);
        let ids: crate::types::OnShelfIds =
            self.request_json::<_, ()>(Method::GET, url, None).await?;
        Ok(ids.data)
    }

    /// Batch-resolve stock counts for a set of product ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn stocks(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, u32>, GatewayError> {
        let url = self.endpoint(&["api", "inventorys", "stocks"]);
        self.request_json(Method::POST, url, Some(ids)).await
    }

    /// Set the absolute stock count for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %update.product_id, quantity = update.quantity))]
    pub async fn set_stock(&self, update: &StockUpdate) -> Result<(), GatewayError> {
        let url = self.endpoint(&["api", "inventorys", "admin", "stock"]);
        self.request_unit(Method::PUT, url, Some(update)).await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// Flip a product's on-shelf flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id, on_shelf))]
    pub async fn set_on_shelf(
        &self,
        product_id: &ProductId,
        on_shelf: bool,
    ) -> Result<(), GatewayError> {
        let mut url = self.endpoint(&["api", "inventorys", product_id.as_str(), "on-shelf"]);
        url.query_pairs_mut()
            .append_pair("onShelf", if on_shelf { "true" } else { "false" });
        self.request_unit::<()>(Method::PUT, url, None).await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// Delete a product's inventory record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn delete_inventory(&self, product_id: &ProductId) -> Result<(), GatewayError> {
        let url = self.endpoint(&["api", "inventorys", product_id.as_str()]);
        self.request_unit::<()>(Method::DELETE, url, None).await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    // =========================================================================
    // Users & Auth
    // =========================================================================

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (e.g. duplicate username).
    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> Result<(), GatewayError> {
        let url = self.endpoint(&["api", "users"]);
        self.request_unit(Method::POST, url, Some(registration))
            .await
    }

    /// Exchange credentials for a bearer token and user record.
    ///
    /// Does not install the token; session management decides that.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, GatewayError> {
        let url = self.endpoint(&["api", "auth", "login"]);
        let body = LoginRequest {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        self.request_json(Method::POST, url, Some(&body)).await
    }

    /// List every user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn all_users(&self) -> Result<Vec<User>, GatewayError> {
        let url = self.endpoint(&["api", "admin", "users", "all"]);
        self.request_json::<_, ()>(Method::GET, url, None).await
    }

    /// Delete a user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn delete_user(&self, user_id: &UserId) -> Result<(), GatewayError> {
        let url = self.endpoint(&["api", "admin", "users", user_id.as_str()]);
        self.request_unit::<()>(Method::DELETE, url, None).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order; the backend decrements stock atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (e.g. insufficient stock).
    #[instrument(skip(self), fields(product_id = %order.product_id, quantity = order.quantity))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, GatewayError> {
        let url = self.endpoint(&["api", "orders"]);
        let created = self.request_json(Method::POST, url, Some(order)).await?;
        self.invalidate_catalog().await;
        Ok(created)
    }

    /// List every order placed by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_orders(&self, user_id: &UserId) -> Result<Vec<Order>, GatewayError> {
        let url = self.endpoint(&["api", "orders", "user", user_id.as_str()]);
        self.request_json::<_, ()>(Method::GET, url, None).await
    }

    /// Cancel an order by id; the backend restores stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: &OrderId) -> Result<(), GatewayError> {
        let url = self.endpoint(&["api", "orders", order_id.as_str()]);
        self.request_unit::<()>(Method::DELETE, url, None).await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// List every order in the system.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn all_orders(&self) -> Result<Vec<AdminOrder>, GatewayError> {
        let url = self.endpoint(&["api", "admin", "orders", "all"]);
        self.request_json::<_, ()>(Method::GET, url, None).await
    }

    /// Delete any order through the admin surface; the backend restores
    /// the stock it held.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_admin_order(&self, order_id: &OrderId) -> Result<(), GatewayError> {
        let url = self.endpoint(&["api", "admin", "orders", order_id.as_str()]);
        self.request_unit::<()>(Method::DELETE, url, None).await?;
        self.invalidate_catalog().await;
        Ok(())
    }
}
