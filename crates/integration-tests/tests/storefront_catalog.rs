//! Integration tests for catalog browsing.
//!
//! These tests run the storefront against the in-process mock gateway and
//! verify page size, exhaustion, category filtering, and that no requests
//! are made once the listing is known to be exhausted.

use spokeshop_integration_tests::{MockGateway, temp_session};
use spokeshop_storefront::{LoadOutcome, PAGE_SIZE, Storefront};

fn storefront_for(mock: &MockGateway) -> Storefront {
    Storefront::from_parts(mock.client(), temp_session())
}

fn seed_bikes(mock: &MockGateway, count: usize, category: &str) {
    for i in 0..count {
        mock.seed_product(
            &format!("{category}-{i}"),
            "Giant",
            &format!("Model {i}"),
            category,
            9999,
            5,
            true,
        );
    }
}

// =============================================================================
// Pagination Tests
// =============================================================================

#[tokio::test]
async fn test_pages_arrive_six_at_a_time() {
    let mock = MockGateway::start().await;
    seed_bikes(&mock, 8, "road");
    let mut app = storefront_for(&mock);

    let outcome = app.load_more().await.expect("first page");
    assert_eq!(outcome, LoadOutcome::Loaded(PAGE_SIZE as usize));
    assert_eq!(app.products().len(), 6);
    assert!(app.has_more(), "a full page leaves the listing open");

    let outcome = app.load_more().await.expect("second page");
    assert_eq!(outcome, LoadOutcome::Loaded(2));
    assert_eq!(app.products().len(), 8);
    assert!(!app.has_more(), "a short page exhausts the listing");
}

#[tokio::test]
async fn test_exhausted_listing_makes_no_further_requests() {
    let mock = MockGateway::start().await;
    seed_bikes(&mock, 2, "road");
    let mut app = storefront_for(&mock);

    app.load_more().await.expect("only page");
    assert_eq!(app.load_more().await.expect("no-op"), LoadOutcome::Exhausted);
    assert_eq!(app.load_more().await.expect("no-op"), LoadOutcome::Exhausted);

    assert_eq!(
        mock.request_count("GET", "/api/products"),
        1,
        "exhausted listing must not hit the gateway again"
    );
}

#[tokio::test]
async fn test_page_query_parameters_advance() {
    let mock = MockGateway::start().await;
    seed_bikes(&mock, 7, "road");
    let mut app = storefront_for(&mock);

    app.load_more().await.expect("page 0");
    app.load_more().await.expect("page 1");

    let queries: Vec<Option<String>> = mock
        .requests()
        .iter()
        .filter(|r| r.method == "GET" && r.path == "/api/products")
        .map(|r| r.query.clone())
        .collect();
    assert_eq!(queries.len(), 2);
    assert!(
        queries[0].as_deref().is_some_and(|q| q.contains("page=0") && q.contains("size=6")),
        "first request asks for page 0: {queries:?}"
    );
    assert!(
        queries[1].as_deref().is_some_and(|q| q.contains("page=1")),
        "second request asks for page 1: {queries:?}"
    );
}

#[tokio::test]
async fn test_empty_catalog_loads_cleanly() {
    let mock = MockGateway::start().await;
    let mut app = storefront_for(&mock);

    let outcome = app.load_more().await.expect("empty page");
    assert_eq!(outcome, LoadOutcome::Loaded(0));
    assert!(app.products().is_empty());
    assert!(!app.has_more());
}

// =============================================================================
// Category Filter Tests
// =============================================================================

#[tokio::test]
async fn test_category_filter_uses_category_endpoint() {
    let mock = MockGateway::start().await;
    seed_bikes(&mock, 3, "road");
    seed_bikes(&mock, 2, "mountain");
    let mut app = storefront_for(&mock);

    app.set_category(Some("mountain".to_string()));
    let outcome = app.load_more().await.expect("category page");
    assert_eq!(outcome, LoadOutcome::Loaded(2));
    assert!(app.products().iter().all(|p| p.category == "mountain"));

    assert_eq!(mock.request_count("GET", "/api/products/category/mountain"), 1);
    let unfiltered = mock
        .requests()
        .iter()
        .filter(|r| r.method == "GET" && r.path == "/api/products")
        .count();
    assert_eq!(
        unfiltered, 0,
        "the unfiltered endpoint must not be used while a filter is active"
    );
}

#[tokio::test]
async fn test_switching_category_restarts_listing() {
    let mock = MockGateway::start().await;
    seed_bikes(&mock, 7, "road");
    seed_bikes(&mock, 1, "mountain");
    let mut app = storefront_for(&mock);

    app.load_more().await.expect("road page 0");
    assert_eq!(app.products().len(), 6);

    app.set_category(Some("mountain".to_string()));
    assert!(app.products().is_empty(), "filter switch clears the view");
    assert!(app.has_more());

    app.load_more().await.expect("mountain page 0");
    assert_eq!(app.products().len(), 1);
}

// =============================================================================
// Shelf Visibility Tests
// =============================================================================

#[tokio::test]
async fn test_off_shelf_products_are_not_listed() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 5, true);
    mock.seed_product("p2", "Trek", "Marlin", "mountain", 6999, 5, false);
    let mut app = storefront_for(&mock);

    app.load_more().await.expect("page");
    let ids: Vec<&str> = app.products().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1"]);
}

#[tokio::test]
async fn test_listing_carries_stock_annotation() {
    let mock = MockGateway::start().await;
    mock.seed_product("p1", "Giant", "TCR", "road", 15000, 7, true);
    let mut app = storefront_for(&mock);

    app.load_more().await.expect("page");
    assert_eq!(app.products()[0].stock, Some(7));
}
