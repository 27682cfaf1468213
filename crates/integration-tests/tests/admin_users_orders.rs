//! Integration tests for admin user management and the order log.

use rust_decimal::Decimal;

use spokeshop_core::{Role, UserId};
use spokeshop_gateway::types::User;
use spokeshop_integration_tests::{MockGateway, session_with_user};
use spokeshop_admin::{AdminConsole, AdminError};
use spokeshop_storefront::{AuthService, PurchaseOutcome, SessionStore, Storefront};

fn admin_console(mock: &MockGateway) -> AdminConsole {
    mock.allow_token("admin-token");
    let store = session_with_user("admin-token", "a1", "boss", Role::Admin);
    let auth = AuthService::new(mock.client(), store);
    AdminConsole::open(auth).expect("admin console")
}

/// Seed a shopper, log them in, and buy one unit of `product_id`.
async fn place_order(mock: &MockGateway, product_id: &str) {
    mock.allow_token("alice-token");
    let store = session_with_user("alice-token", "u1", "alice", Role::User);
    let mut app = Storefront::from_parts(mock.client(), store);
    app.load_more().await.expect("catalog");
    let product = app
        .products()
        .iter()
        .find(|p| p.id.as_str() == product_id)
        .expect("seeded product")
        .clone();
    let outcome = app.buy_now(&product).await.expect("buy");
    assert!(matches!(outcome, PurchaseOutcome::Placed(_)));
}

// =============================================================================
// User Management Tests
// =============================================================================

#[tokio::test]
async fn test_users_listing() {
    let mock = MockGateway::start().await;
    mock.seed_user("u1", "alice", "pw", Role::User);
    mock.seed_user("u2", "bob", "pw", Role::User);
    let mut console = admin_console(&mock);

    let users = console.users().await.expect("users");
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_delete_user() {
    let mock = MockGateway::start().await;
    mock.seed_user("u1", "alice", "pw", Role::User);
    mock.seed_user("u2", "bob", "pw", Role::User);
    let mut console = admin_console(&mock);

    console.delete_user(&UserId::from("u2")).await.expect("delete");
    assert_eq!(mock.user_count(), 1);
}

#[tokio::test]
async fn test_expired_admin_session_is_distinguishable() {
    let mock = MockGateway::start().await;
    let mut console = admin_console(&mock);

    mock.revoke_tokens();
    let err = console.users().await.expect_err("revoked token");
    assert!(err.is_session_expired());
}

#[tokio::test]
async fn test_admin_401_clears_persisted_session() {
    let mock = MockGateway::start().await;
    mock.allow_token("admin-token");

    let path = std::env::temp_dir()
        .join(format!("spokeshop-admin-session-{}.json", uuid::Uuid::new_v4()));
    let admin = User {
        id: UserId::from("a1"),
        user_id: None,
        username: "boss".to_string(),
        phone: None,
        age: None,
        role: Role::Admin,
        created_at: None,
    };
    let mut store = SessionStore::open(&path).expect("store");
    store.set_session("admin-token", &admin).expect("seed session");
    let auth = AuthService::new(mock.client(), store);
    let mut console = AdminConsole::open(auth).expect("admin console");

    mock.revoke_tokens();
    let err = console.users().await.expect_err("revoked token");
    assert!(err.is_session_expired());

    let reopened = SessionStore::open(&path).expect("reopen");
    assert!(
        reopened.token().is_none(),
        "the rejected token must be gone from the session file"
    );
    assert!(reopened.current_user().is_none());

    std::fs::remove_file(&path).ok();
}

// =============================================================================
// Order Log Tests
// =============================================================================

#[tokio::test]
async fn test_order_log_denormalizes_product_and_buyer() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 5, true);
    mock.seed_user("u1", "alice", "pw", Role::User);
    place_order(&mock, "p1").await;

    let mut console = admin_console(&mock);
    let orders = console.orders().await.expect("orders");
    assert_eq!(orders.len(), 1);

    let row = &orders[0];
    assert_eq!(row.product_brand.as_deref(), Some("Giant"));
    assert_eq!(row.product_model.as_deref(), Some("TCR"));
    assert_eq!(row.buyer_name.as_deref(), Some("alice"));
    assert!(row.status.is_active(), "lowercase wire status normalizes");
    assert_eq!(row.status.to_string(), "ACTIVE");
    assert_eq!(row.total(), Some(Decimal::from(15000)), "per-row total");
}

#[tokio::test]
async fn test_order_log_empty_without_orders() {
    let mock = MockGateway::start().await;
    let mut console = admin_console(&mock);
    let orders = console.orders().await.expect("orders");
    assert!(orders.is_empty());
}

#[tokio::test]
async fn test_admin_order_delete_restores_stock() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 5, true);
    mock.seed_user("u1", "alice", "pw", Role::User);
    place_order(&mock, "p1").await;
    assert_eq!(mock.stock_of("p1"), Some(4));

    let mut console = admin_console(&mock);
    let orders = console.orders().await.expect("orders");
    let id = orders.first().expect("one order").id.clone();
    console.delete_order(&id).await.expect("delete");

    assert_eq!(mock.order_count(), 0);
    assert_eq!(mock.stock_of("p1"), Some(5), "the held stock comes back");
    assert_eq!(mock.request_count("DELETE", "/api/admin/orders/"), 1);
}
