//! Integration tests for buying and order management.

use spokeshop_core::Role;
use spokeshop_integration_tests::{MockGateway, session_with_user};
use spokeshop_storefront::{
    CancelOutcome, PurchaseOutcome, Storefront, StorefrontError,
};

/// A storefront logged in as shopper `u1`/alice against the mock.
fn logged_in(mock: &MockGateway) -> Storefront {
    mock.allow_token("alice-token");
    let store = session_with_user("alice-token", "u1", "alice", Role::User);
    Storefront::from_parts(mock.client(), store)
}

// =============================================================================
// Buy-Now Tests
// =============================================================================

#[tokio::test]
async fn test_buy_now_places_quantity_one_order() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 3, true);
    let mut app = logged_in(&mock);
    app.load_more().await.expect("catalog");

    let product = app.products()[0].clone();
    let outcome = app.buy_now(&product).await.expect("buy");
    let PurchaseOutcome::Placed(order) = outcome else {
        panic!("expected a placed order, got {outcome:?}");
    };

    assert_eq!(order.quantity, 1, "buy-now always orders one unit");
    assert_eq!(order.buyer_id.as_str(), "u1");
    assert!(
        order.status.is_active(),
        "lowercase wire status parses as active: {:?}",
        order.status
    );
    assert_eq!(order.status.to_string(), "ACTIVE", "display is normalized");
    assert_eq!(mock.stock_of("p1"), Some(2), "the backend decremented stock");
}

#[tokio::test]
async fn test_buy_now_decrements_displayed_stock() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 3, true);
    let mut app = logged_in(&mock);
    app.load_more().await.expect("catalog");

    let product = app.products()[0].clone();
    app.buy_now(&product).await.expect("buy");
    assert_eq!(
        app.products()[0].stock,
        Some(2),
        "the listing reflects the purchase without a reload"
    );
}

#[tokio::test]
async fn test_buy_sold_out_makes_no_request() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 0, true);
    let mut app = logged_in(&mock);
    app.load_more().await.expect("catalog");

    let product = app.products()[0].clone();
    let outcome = app.buy_now(&product).await.expect("local refusal");
    assert!(matches!(outcome, PurchaseOutcome::OutOfStock));
    assert_eq!(mock.request_count("POST", "/api/orders"), 0);
}

#[tokio::test]
async fn test_backend_conflict_surfaces_and_releases_guard() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 3, true);
    let mut app = logged_in(&mock);
    app.load_more().await.expect("catalog");
    let product = app.products()[0].clone();

    mock.fail_once("POST", "/api/orders", 409);
    let err = app.buy_now(&product).await.expect_err("injected conflict");
    assert!(matches!(err, StorefrontError::Gateway(_)));
    assert_eq!(mock.order_count(), 0);

    // The per-product guard was released, so a retry goes through
    let outcome = app.buy_now(&product).await.expect("retry");
    assert!(matches!(outcome, PurchaseOutcome::Placed(_)));
}

#[tokio::test]
async fn test_backend_refuses_order_for_last_unit_lost_race() {
    let mock = MockGateway::start().await;
    // The listing still shows one unit, but another shopper took it
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 1, true);
    let mut app = logged_in(&mock);
    app.load_more().await.expect("catalog");
    let product = app.products()[0].clone();

    app.buy_now(&product).await.expect("first unit");
    // The cached listing would show stale stock; the product snapshot we
    // hold still says one unit, and the backend must win this argument
    let stale = product.clone();
    let err = app.buy_now(&stale).await.expect_err("stock gone");
    match err {
        StorefrontError::Gateway(e) => {
            assert!(e.to_string().contains("stock not enough"));
        }
        other => panic!("expected a gateway conflict, got {other:?}"),
    }
}

// =============================================================================
// Order Listing & Cancel Tests
// =============================================================================

#[tokio::test]
async fn test_my_orders_lists_only_own_orders() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 5, true);
    let mut app = logged_in(&mock);
    app.load_more().await.expect("catalog");
    let product = app.products()[0].clone();
    app.buy_now(&product).await.expect("buy");

    let orders = app.my_orders().await.expect("orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].product_id.as_str(), "p1");
}

#[tokio::test]
async fn test_cancel_restores_stock() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 3, true);
    let mut app = logged_in(&mock);
    app.load_more().await.expect("catalog");
    let product = app.products()[0].clone();

    let outcome = app.buy_now(&product).await.expect("buy");
    let PurchaseOutcome::Placed(order) = outcome else {
        panic!("expected a placed order");
    };
    assert_eq!(mock.stock_of("p1"), Some(2));

    let cancelled = app.cancel_order(&order).await.expect("cancel");
    assert_eq!(cancelled, CancelOutcome::Cancelled);
    assert_eq!(mock.order_count(), 0);
    assert_eq!(mock.stock_of("p1"), Some(3), "cancelling returns the unit");
    assert_eq!(
        app.products()[0].stock,
        Some(3),
        "the listing reflects the cancel without a reload"
    );
}

#[tokio::test]
async fn test_cancel_failure_releases_guard() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 3, true);
    let mut app = logged_in(&mock);
    app.load_more().await.expect("catalog");
    let product = app.products()[0].clone();
    let PurchaseOutcome::Placed(order) = app.buy_now(&product).await.expect("buy") else {
        panic!("expected a placed order");
    };

    mock.fail_once("DELETE", "/api/orders/", 500);
    app.cancel_order(&order).await.expect_err("injected failure");

    let outcome = app.cancel_order(&order).await.expect("retry");
    assert_eq!(outcome, CancelOutcome::Cancelled);
}

// =============================================================================
// Cart View Tests
// =============================================================================

#[tokio::test]
async fn test_cart_badge_tracks_buys_and_removals() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 5, true);
    mock.seed_product("p2", "Trek", "Marlin", "mountain", 8000, 5, true);
    let mut app = logged_in(&mock);
    app.load_more().await.expect("catalog");
    let first = app.products()[0].clone();
    let second = app.products()[1].clone();

    app.buy_now(&first).await.expect("buy p1");
    app.buy_now(&first).await.expect("buy p1 again");
    app.buy_now(&second).await.expect("buy p2");
    assert_eq!(app.cart_badge(), 3);
    assert_eq!(app.cart_count(&first.id), 2);

    let outcome = app.remove_from_cart(&first.id).await.expect("remove");
    assert_eq!(outcome, CancelOutcome::Cancelled);
    assert_eq!(app.cart_badge(), 2);
    assert_eq!(app.cart_count(&first.id), 1);
    assert_eq!(mock.order_count(), 2, "one backing order was cancelled");
}

#[tokio::test]
async fn test_remove_from_cart_without_active_order() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 5, true);
    let mut app = logged_in(&mock);
    app.load_more().await.expect("catalog");
    let product = app.products()[0].clone();

    let outcome = app.remove_from_cart(&product.id).await.expect("lookup");
    assert_eq!(outcome, CancelOutcome::NoMatchingOrder);
    assert_eq!(mock.request_count("DELETE", "/api/orders/"), 0);
}

#[tokio::test]
async fn test_remove_from_cart_drops_stale_count() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 5, true);
    let mut app = logged_in(&mock);
    app.load_more().await.expect("catalog");
    let product = app.products()[0].clone();
    let PurchaseOutcome::Placed(order) = app.buy_now(&product).await.expect("buy") else {
        panic!("expected a placed order");
    };
    assert_eq!(app.cart_badge(), 1);

    // Another session cancels the backing order behind this view's back
    let mut other = logged_in(&mock);
    other.cancel_order(&order).await.expect("cancel elsewhere");

    let outcome = app.remove_from_cart(&product.id).await.expect("lookup");
    assert_eq!(outcome, CancelOutcome::NoMatchingOrder);
    assert_eq!(app.cart_badge(), 0, "the stale entry falls back in line");
}

#[tokio::test]
async fn test_logout_resets_cart_display() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 5, true);
    let mut app = logged_in(&mock);
    app.load_more().await.expect("catalog");
    let product = app.products()[0].clone();
    app.buy_now(&product).await.expect("buy");
    assert_eq!(app.cart_badge(), 1);

    app.logout().expect("logout");
    assert_eq!(app.cart_badge(), 0, "the badge is display state, not orders");
    assert_eq!(mock.order_count(), 1, "logout does not cancel backend orders");
}
