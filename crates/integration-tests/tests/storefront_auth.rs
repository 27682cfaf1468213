//! Integration tests for registration, login, and session expiry.

use serde_json::Value;

use spokeshop_core::Role;
use spokeshop_integration_tests::{MockGateway, session_with_user, temp_session};
use spokeshop_storefront::{RegistrationForm, Storefront, StorefrontError};

fn storefront_for(mock: &MockGateway) -> Storefront {
    Storefront::from_parts(mock.client(), temp_session())
}

fn alice_form() -> RegistrationForm {
    RegistrationForm {
        username: "alice".to_string(),
        password: "hunter22".to_string(),
        confirm_password: "hunter22".to_string(),
        phone: "13800000000".to_string(),
        age: 30,
    }
}

// =============================================================================
// Registration Tests
// =============================================================================

#[tokio::test]
async fn test_register_creates_account_with_generated_id() {
    let mock = MockGateway::start().await;
    let mut app = storefront_for(&mock);

    app.register(&alice_form()).await.expect("register");
    assert_eq!(mock.user_count(), 1);

    let requests = mock.requests();
    let body = requests
        .iter()
        .find(|r| r.method == "POST" && r.path == "/api/users")
        .and_then(|r| r.body.as_deref())
        .expect("registration body");
    let body: Value = serde_json::from_str(body).expect("json body");
    assert!(
        body["userId"]
            .as_str()
            .is_some_and(|id| id.starts_with("user-")),
        "secondary id is generated client-side: {body}"
    );
    assert_eq!(body["role"], "USER", "storefront signups are shoppers");
}

#[tokio::test]
async fn test_duplicate_username_surfaces_gateway_error() {
    let mock = MockGateway::start().await;
    let mut app = storefront_for(&mock);

    app.register(&alice_form()).await.expect("first register");
    let err = app.register(&alice_form()).await.expect_err("duplicate");
    match err {
        StorefrontError::Gateway(e) => {
            assert!(e.to_string().contains("username already exists"));
        }
        other => panic!("expected gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_register_then_login_flow() {
    let mock = MockGateway::start().await;
    let mut app = storefront_for(&mock);

    app.register(&alice_form()).await.expect("register");
    let user = app.login("alice", "hunter22").await.expect("login");
    assert_eq!(user.username, "alice");
    assert!(app.is_logged_in());
}

// =============================================================================
// Login & Session Tests
// =============================================================================

#[tokio::test]
async fn test_login_persists_session_and_authorizes_requests() {
    let mock = MockGateway::start().await;
    mock.seed_user("u1", "alice", "hunter22", Role::User);
    let mut app = storefront_for(&mock);

    app.login("alice", "hunter22").await.expect("login");
    assert!(app.current_user().is_some());

    // The order listing requires the bearer token the login stored
    let orders = app.my_orders().await.expect("authorized call");
    assert!(orders.is_empty());
    assert_eq!(mock.request_count("GET", "/api/orders/user/u1"), 1);
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let mock = MockGateway::start().await;
    mock.seed_user("u1", "alice", "hunter22", Role::User);
    let mut app = storefront_for(&mock);

    let err = app.login("alice", "wrong").await.expect_err("bad password");
    assert!(
        matches!(err, StorefrontError::InvalidCredentials),
        "a login 401 is bad credentials, not session expiry: {err:?}"
    );
    assert!(!app.is_logged_in());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let mock = MockGateway::start().await;
    mock.seed_user("u1", "alice", "hunter22", Role::User);
    let mut app = storefront_for(&mock);

    app.login("alice", "hunter22").await.expect("login");
    app.logout().expect("logout");

    assert!(app.current_user().is_none());
    let err = app.my_orders().await.expect_err("no session");
    assert!(matches!(err, StorefrontError::NotLoggedIn));
}

#[tokio::test]
async fn test_rejected_token_clears_session_everywhere() {
    let mock = MockGateway::start().await;
    let store = session_with_user("stale-token", "u1", "alice", Role::User);
    let mut app = Storefront::from_parts(mock.client(), store);
    assert!(app.is_logged_in(), "session restored from the store");

    // The mock never accepted this token, so the first call 401s
    let err = app.my_orders().await.expect_err("expired");
    assert!(matches!(err, StorefrontError::SessionExpired));
    assert!(
        app.current_user().is_none(),
        "expiry clears the stored session"
    );
    let err = app.my_orders().await.expect_err("now logged out");
    assert!(matches!(err, StorefrontError::NotLoggedIn));
}

#[tokio::test]
async fn test_persisted_session_is_restored_on_startup() {
    let mock = MockGateway::start().await;
    mock.allow_token("valid-token");

    // Simulates a restart: the session exists only on disk
    let store = session_with_user("valid-token", "u1", "alice", Role::User);
    let mut app = Storefront::from_parts(mock.client(), store);

    assert!(app.is_logged_in());
    app.my_orders().await.expect("token re-installed on the client");
}
