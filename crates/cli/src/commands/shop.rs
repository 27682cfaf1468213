//! Shopper commands: browse, buy, orders, cancel.

use spokeshop_core::{OrderId, ProductId};
use spokeshop_gateway::types::Product;
use spokeshop_storefront::{
    CancelOutcome, LoadOutcome, PurchaseOutcome, Storefront, stock_level,
};

fn print_product(product: &Product) {
    let stock = match stock_level(product) {
        Some(level) => level.label().to_owned(),
        None => "stock unknown".to_owned(),
    };
    println!(
        "{}  {}  [{}]  {}  ({stock})",
        product.id,
        product.display_name(),
        product.category,
        product.price,
    );
}

/// List the catalog page by page.
pub async fn browse(
    category: Option<String>,
    pages: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = super::storefront()?;
    app.set_category(category);

    let mut shown = 0;
    for _ in 0..pages {
        match app.load_more().await? {
            LoadOutcome::Loaded(_) => {
                for product in app.products().iter().skip(shown) {
                    print_product(product);
                }
                shown = app.products().len();
            }
            LoadOutcome::Exhausted => break,
            LoadOutcome::AlreadyLoading | LoadOutcome::Superseded => {}
        }
        if !app.has_more() {
            break;
        }
    }

    if app.products().is_empty() {
        println!("no products found");
    } else if app.has_more() {
        println!("... more available, pass --pages to fetch further");
    }
    Ok(())
}

/// Buy one unit of a product by id.
///
/// The product must be visible in the catalog; the listing is walked
/// until the id shows up or the listing runs out.
pub async fn buy(product_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = super::storefront()?;
    let wanted = ProductId::from(product_id);

    let product = loop {
        if let Some(found) = app.products().iter().find(|p| p.id == wanted) {
            break found.clone();
        }
        match app.load_more().await? {
            LoadOutcome::Loaded(_) => {}
            _ => return Err(format!("product {product_id} not found in the catalog").into()),
        }
    };

    match app.buy_now(&product).await? {
        PurchaseOutcome::Placed(order) => {
            tracing::info!("Order placed: {} x{} ({})", order.id, order.quantity, order.status);
        }
        PurchaseOutcome::OutOfStock => println!("{} is sold out", product.display_name()),
        PurchaseOutcome::AlreadyPending => println!("an order for this product is already in flight"),
    }
    Ok(())
}

/// List the logged-in user's orders.
pub async fn orders() -> Result<(), Box<dyn std::error::Error>> {
    let mut app: Storefront = super::storefront()?;
    let orders = app.my_orders().await?;
    if orders.is_empty() {
        println!("no orders");
        return Ok(());
    }
    for order in orders {
        println!(
            "{}  product {}  x{}  {}",
            order.id, order.product_id, order.quantity, order.status
        );
    }
    Ok(())
}

/// Cancel one of the logged-in user's orders by id.
pub async fn cancel(order_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = super::storefront()?;
    let wanted = OrderId::from(order_id);
    let Some(order) = app.my_orders().await?.into_iter().find(|o| o.id == wanted) else {
        return Err(format!("order {order_id} not found").into());
    };
    match app.cancel_order(&order).await? {
        CancelOutcome::Cancelled => tracing::info!("Order {order_id} cancelled"),
        CancelOutcome::AlreadyPending => println!("a cancel for this order is already in flight"),
        CancelOutcome::NoMatchingOrder => println!("order {order_id} is not active"),
    }
    Ok(())
}
