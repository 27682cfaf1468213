//! Integration test harness for Spokeshop.
//!
//! [`MockGateway`] is an in-process rendition of the backend gateway: an
//! axum server on an ephemeral port implementing the whole REST surface
//! over in-memory state. On top of the behavior it records every request
//! (method, path, query, body) so tests can assert which calls a flow
//! made, and supports one-shot failure injection for exercising the
//! compensation paths.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p spokeshop-integration-tests
//! ```

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use spokeshop_core::Role;
use spokeshop_gateway::types::User;
use spokeshop_gateway::{GatewayClient, GatewayConfig};
use spokeshop_storefront::SessionStore;

/// One request as seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<String>,
}

struct FailRule {
    method: String,
    path_prefix: String,
    status: u16,
}

#[derive(Default)]
struct ShopState {
    products: Vec<Value>,
    stocks: HashMap<String, u32>,
    on_shelf: HashSet<String>,
    users: Vec<Value>,
    orders: Vec<Value>,
    valid_tokens: HashSet<String>,
    next_id: u64,
}

struct MockState {
    shop: Mutex<ShopState>,
    requests: Mutex<Vec<RecordedRequest>>,
    fail_rules: Mutex<Vec<FailRule>>,
}

/// In-process mock of the backend gateway.
pub struct MockGateway {
    state: Arc<MockState>,
    addr: SocketAddr,
}

impl MockGateway {
    /// Start the mock on an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(MockState {
            shop: Mutex::new(ShopState::default()),
            requests: Mutex::new(Vec::new()),
            fail_rules: Mutex::new(Vec::new()),
        });
        let app = router(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock gateway");
        let addr = listener.local_addr().expect("mock gateway address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock gateway");
        });
        Self { state, addr }
    }

    /// Base URL of the running mock.
    pub fn url(&self) -> Url {
        format!("http://{}/", self.addr).parse().expect("mock url")
    }

    /// A gateway client pointed at this mock.
    pub fn client(&self) -> GatewayClient {
        GatewayClient::new(&GatewayConfig::for_base_url(self.url())).expect("gateway client")
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Add a product with inventory state.
    pub fn seed_product(
        &self,
        id: &str,
        brand: &str,
        model: &str,
        category: &str,
        price: i64,
        stock: u32,
        on_shelf: bool,
    ) {
        let mut shop = self.shop();
        shop.products.push(json!({
            "id": id,
            "brand": brand,
            "model": model,
            "category": category,
            "price": price,
        }));
        shop.stocks.insert(id.to_owned(), stock);
        if on_shelf {
            shop.on_shelf.insert(id.to_owned());
        }
    }

    /// Add a user account that can log in.
    pub fn seed_user(&self, id: &str, username: &str, password: &str, role: Role) {
        let mut shop = self.shop();
        shop.users.push(json!({
            "id": id,
            "username": username,
            "password": password,
            "role": role.to_string(),
            "phone": "13800000000",
            "age": 30,
        }));
    }

    /// Accept `token` as a valid session token.
    pub fn allow_token(&self, token: &str) {
        self.shop().valid_tokens.insert(token.to_owned());
    }

    /// Reject every token from now on; calls carrying one get a 401.
    pub fn revoke_tokens(&self) {
        self.shop().valid_tokens.clear();
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many recorded requests match a method and path prefix.
    pub fn request_count(&self, method: &str, path_prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(path_prefix))
            .count()
    }

    /// Forget recorded requests, usually after the seeding phase.
    pub fn clear_requests(&self) {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Fail the next request matching the method and path prefix with
    /// `status`, then behave normally again.
    pub fn fail_once(&self, method: &str, path_prefix: &str, status: u16) {
        self.state
            .fail_rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FailRule {
                method: method.to_owned(),
                path_prefix: path_prefix.to_owned(),
                status,
            });
    }

    pub fn stock_of(&self, id: &str) -> Option<u32> {
        self.shop().stocks.get(id).copied()
    }

    pub fn product_exists(&self, id: &str) -> bool {
        self.product(id).is_some()
    }

    /// The stored product record, if any.
    pub fn product(&self, id: &str) -> Option<Value> {
        self.shop().products.iter().find(|p| p["id"] == id).cloned()
    }

    pub fn product_count(&self) -> usize {
        self.shop().products.len()
    }

    pub fn is_on_shelf(&self, id: &str) -> bool {
        self.shop().on_shelf.contains(id)
    }

    pub fn order_count(&self) -> usize {
        self.shop().orders.len()
    }

    pub fn user_count(&self) -> usize {
        self.shop().users.len()
    }

    fn shop(&self) -> std::sync::MutexGuard<'_, ShopState> {
        self.state
            .shop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A session store at a fresh temp path.
pub fn temp_session() -> SessionStore {
    let path = std::env::temp_dir().join(format!("spokeshop-it-{}.json", uuid::Uuid::new_v4()));
    SessionStore::open(path).expect("session store")
}

/// A session store pre-seeded with a logged-in user.
pub fn session_with_user(token: &str, id: &str, username: &str, role: Role) -> SessionStore {
    let user = User {
        id: id.into(),
        user_id: None,
        username: username.to_owned(),
        phone: None,
        age: None,
        role,
        created_at: None,
    };
    let mut store = temp_session();
    store.set_session(token, &user).expect("seed session");
    store
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/category/{category}", get(list_by_category))
        .route("/api/admin/products/all", get(all_products))
        .route(
            "/api/admin/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route("/api/inventorys/on-shelf-product-ids", get(on_shelf_ids))
        .route("/api/inventorys/stocks", post(stock_batch))
        .route("/api/inventorys/admin/stock", put(set_stock))
        .route("/api/inventorys/{id}/on-shelf", put(set_on_shelf))
        .route("/api/inventorys/{id}", delete(delete_inventory))
        .route("/api/users", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/admin/users/all", get(all_users))
        .route("/api/admin/users/{id}", delete(delete_user))
        .route("/api/orders", post(create_order))
        .route("/api/orders/user/{user_id}", get(user_orders))
        .route("/api/orders/{id}", delete(delete_order))
        .route("/api/admin/orders/all", get(all_orders))
        .route("/api/admin/orders/{id}", delete(delete_order))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            intercept,
        ))
        .with_state(state)
}

/// Record the request and apply any pending failure injection.
async fn intercept(State(state): State<Arc<MockState>>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let query = req.uri().query().map(ToOwned::to_owned);

    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let body_text = if bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&bytes).into_owned())
    };

    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query,
            body: body_text,
        });

    let injected = {
        let mut rules = state
            .fail_rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        rules
            .iter()
            .position(|r| r.method == method && path.starts_with(&r.path_prefix))
            .map(|pos| rules.remove(pos).status)
    };
    if let Some(status) = injected {
        let status =
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({"message": "injected failure"}))).into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn authorized(state: &MockState, headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| {
            state
                .shop
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .valid_tokens
                .contains(token)
        })
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "invalid or expired token"})),
    )
        .into_response()
}

fn lock_shop(state: &MockState) -> std::sync::MutexGuard<'_, ShopState> {
    state.shop.lock().unwrap_or_else(PoisonError::into_inner)
}

fn next_id(shop: &mut ShopState, prefix: &str) -> String {
    shop.next_id += 1;
    format!("{prefix}{}", shop.next_id)
}

fn without_password(user: &Value) -> Value {
    let mut user = user.clone();
    if let Some(map) = user.as_object_mut() {
        map.remove("password");
    }
    user
}

// =============================================================================
// Catalog Handlers
// =============================================================================

#[derive(Deserialize)]
struct PageParams {
    #[serde(default)]
    page: usize,
    #[serde(default = "default_size")]
    size: usize,
}

const fn default_size() -> usize {
    6
}

/// On-shelf products with their stock annotation attached.
fn listing(shop: &ShopState, category: Option<&str>) -> Vec<Value> {
    shop.products
        .iter()
        .filter(|p| {
            p["id"]
                .as_str()
                .is_some_and(|id| shop.on_shelf.contains(id))
        })
        .filter(|p| category.is_none_or(|c| p["category"] == c))
        .map(|p| {
            let mut p = p.clone();
            let stock = p["id"]
                .as_str()
                .and_then(|id| shop.stocks.get(id))
                .copied()
                .unwrap_or(0);
            p["stock"] = json!(stock);
            p
        })
        .collect()
}

fn page_of(items: Vec<Value>, params: &PageParams) -> Value {
    let total = items.len();
    let content: Vec<Value> = items
        .into_iter()
        .skip(params.page * params.size)
        .take(params.size)
        .collect();
    json!({
        "content": content,
        "totalElements": total,
        "number": params.page,
        "size": params.size,
    })
}

async fn list_products(
    State(state): State<Arc<MockState>>,
    Query(params): Query<PageParams>,
) -> Response {
    let shop = lock_shop(&state);
    Json(page_of(listing(&shop, None), &params)).into_response()
}

async fn list_by_category(
    State(state): State<Arc<MockState>>,
    Path(category): Path<String>,
    Query(params): Query<PageParams>,
) -> Response {
    let shop = lock_shop(&state);
    Json(page_of(listing(&shop, Some(&category)), &params)).into_response()
}

// =============================================================================
// Product Handlers
// =============================================================================

async fn create_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let mut shop = lock_shop(&state);
    let id = next_id(&mut shop, "p");
    body["id"] = json!(id);
    shop.products.push(body.clone());
    // The backend creates the inventory record alongside: empty, on shelf
    shop.stocks.insert(id.clone(), 0);
    shop.on_shelf.insert(id);
    Json(body).into_response()
}

async fn all_products(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let shop = lock_shop(&state);
    Json(json!(shop.products)).into_response()
}

async fn update_product(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let mut shop = lock_shop(&state);
    let Some(product) = shop.products.iter_mut().find(|p| p["id"] == id.as_str()) else {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "product not found"})))
            .into_response();
    };
    for field in ["brand", "model", "category", "price", "gearSystem", "frameSize", "color", "imageUrl"] {
        if let Some(value) = body.get(field) {
            product[field] = value.clone();
        }
    }
    StatusCode::OK.into_response()
}

async fn delete_product(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let mut shop = lock_shop(&state);
    shop.products.retain(|p| p["id"] != id.as_str());
    StatusCode::OK.into_response()
}

// =============================================================================
// Inventory Handlers
// =============================================================================

async fn on_shelf_ids(State(state): State<Arc<MockState>>) -> Response {
    let shop = lock_shop(&state);
    let ids: Vec<&str> = shop
        .products
        .iter()
        .filter_map(|p| p["id"].as_str())
        .filter(|id| shop.on_shelf.contains(*id))
        .collect();
    Json(json!({"data": ids})).into_response()
}

async fn stock_batch(
    State(state): State<Arc<MockState>>,
    Json(ids): Json<Vec<String>>,
) -> Response {
    let shop = lock_shop(&state);
    let map: HashMap<&String, u32> = ids
        .iter()
        .filter_map(|id| shop.stocks.get(id).map(|stock| (id, *stock)))
        .collect();
    Json(json!(map)).into_response()
}

async fn set_stock(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let (Some(id), Some(quantity)) = (
        body["productId"].as_str(),
        body["quantity"].as_u64(),
    ) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "bad stock update"})))
            .into_response();
    };
    #[allow(clippy::cast_possible_truncation)]
    lock_shop(&state).stocks.insert(id.to_owned(), quantity as u32);
    StatusCode::OK.into_response()
}

#[derive(Deserialize)]
struct ShelfParams {
    #[serde(rename = "onShelf")]
    on_shelf: bool,
}

async fn set_on_shelf(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Query(params): Query<ShelfParams>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let mut shop = lock_shop(&state);
    if params.on_shelf {
        shop.on_shelf.insert(id);
    } else {
        shop.on_shelf.remove(&id);
    }
    StatusCode::OK.into_response()
}

async fn delete_inventory(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let mut shop = lock_shop(&state);
    shop.stocks.remove(&id);
    shop.on_shelf.remove(&id);
    StatusCode::OK.into_response()
}

// =============================================================================
// User & Auth Handlers
// =============================================================================

async fn register(State(state): State<Arc<MockState>>, Json(mut body): Json<Value>) -> Response {
    let mut shop = lock_shop(&state);
    if shop
        .users
        .iter()
        .any(|u| u["username"] == body["username"])
    {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "username already exists"})),
        )
            .into_response();
    }
    let id = next_id(&mut shop, "u");
    body["id"] = json!(id);
    shop.users.push(body.clone());
    Json(without_password(&body)).into_response()
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let mut shop = lock_shop(&state);
    let found = shop
        .users
        .iter()
        .find(|u| u["username"] == body["username"] && u["password"] == body["password"])
        .cloned();
    let Some(user) = found else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "invalid credentials"})),
        )
            .into_response();
    };
    let token = format!("token-{}", user["username"].as_str().unwrap_or("unknown"));
    shop.valid_tokens.insert(token.clone());
    Json(json!({"token": token, "user": without_password(&user)})).into_response()
}

async fn all_users(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let shop = lock_shop(&state);
    let users: Vec<Value> = shop.users.iter().map(without_password).collect();
    Json(json!(users)).into_response()
}

async fn delete_user(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    lock_shop(&state).users.retain(|u| u["id"] != id.as_str());
    StatusCode::OK.into_response()
}

// =============================================================================
// Order Handlers
// =============================================================================

async fn create_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let mut shop = lock_shop(&state);
    let Some(product_id) = body["productId"].as_str().map(ToOwned::to_owned) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "missing productId"})))
            .into_response();
    };
    let quantity = body["quantity"].as_u64().unwrap_or(1);
    let available = shop.stocks.get(&product_id).copied().unwrap_or(0);
    if u64::from(available) < quantity {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "stock not enough"})),
        )
            .into_response();
    }
    #[allow(clippy::cast_possible_truncation)]
    shop.stocks
        .insert(product_id.clone(), available - quantity as u32);

    let id = next_id(&mut shop, "o");
    // Lowercase status, as the order service actually writes it
    let order = json!({
        "id": id,
        "productId": product_id,
        "buyerId": body["buyerId"],
        "quantity": quantity,
        "status": "active",
        "createdAt": "2024-10-01T10:30:00",
    });
    shop.orders.push(order.clone());
    Json(order).into_response()
}

async fn user_orders(
    State(state): State<Arc<MockState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let shop = lock_shop(&state);
    let orders: Vec<&Value> = shop
        .orders
        .iter()
        .filter(|o| o["buyerId"] == user_id.as_str())
        .collect();
    Json(json!(orders)).into_response()
}

async fn delete_order(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let mut shop = lock_shop(&state);
    let Some(pos) = shop.orders.iter().position(|o| o["id"] == id.as_str()) else {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "order not found"})))
            .into_response();
    };
    let order = shop.orders.remove(pos);
    // Cancelling restores the stock the order held
    if let (Some(product_id), Some(quantity)) =
        (order["productId"].as_str(), order["quantity"].as_u64())
    {
        #[allow(clippy::cast_possible_truncation)]
        if let Some(stock) = shop.stocks.get_mut(product_id) {
            *stock += quantity as u32;
        }
    }
    StatusCode::OK.into_response()
}

async fn all_orders(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let shop = lock_shop(&state);
    let rows: Vec<Value> = shop
        .orders
        .iter()
        .map(|order| {
            let product = shop
                .products
                .iter()
                .find(|p| p["id"] == order["productId"]);
            let buyer = shop.users.iter().find(|u| u["id"] == order["buyerId"]);
            json!({
                "id": order["id"],
                "productId": order["productId"],
                "productBrand": product.map(|p| p["brand"].clone()),
                "productModel": product.map(|p| p["model"].clone()),
                "productCategory": product.map(|p| p["category"].clone()),
                "price": product.map(|p| p["price"].clone()),
                "productImage": product.and_then(|p| p.get("imageUrl").cloned()),
                "buyerId": order["buyerId"],
                "buyerName": buyer.map(|u| u["username"].clone()),
                "quantity": order["quantity"],
                "status": order["status"],
                "createdAt": order["createdAt"],
            })
        })
        .collect();
    Json(json!(rows)).into_response()
}
