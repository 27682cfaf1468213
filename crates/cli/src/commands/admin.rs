//! Admin commands: products, inventory, users, orders.
//!
//! Every command opens the console from the shared session file; a
//! non-admin session is refused before any request is made.

use rust_decimal::Decimal;

use spokeshop_admin::{AdminConsole, ProductForm};
use spokeshop_core::{OrderId, ProductId, UserId};
use spokeshop_storefront::AuthService;

fn console() -> Result<AdminConsole, Box<dyn std::error::Error>> {
    let (gateway, store) = super::gateway_with_session()?;
    let auth = AuthService::new(gateway, store);
    if !auth.is_logged_in() {
        return Err("not logged in; run: spoke auth login".into());
    }
    Ok(AdminConsole::open(auth)?)
}

/// List every product with stock and shelf state.
pub async fn products() -> Result<(), Box<dyn std::error::Error>> {
    let mut console = console()?;
    let rows = console.product_rows().await?;
    if rows.is_empty() {
        println!("no products");
        return Ok(());
    }
    for row in rows {
        println!(
            "{}  {}  [{}]  {}  stock {} ({})  {}",
            row.product.id,
            row.product.display_name(),
            row.product.category,
            row.product.price,
            row.stock,
            row.stock_level().label(),
            if row.on_shelf { "on shelf" } else { "off shelf" },
        );
    }
    Ok(())
}

/// Create a product with initial inventory.
pub async fn add_product(
    brand: &str,
    model: &str,
    category: &str,
    price: &str,
    stock: u32,
    on_shelf: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let price: Decimal = price
        .parse()
        .map_err(|_| format!("invalid price: {price}"))?;

    let form = ProductForm {
        id: None,
        brand: brand.to_owned(),
        model: model.to_owned(),
        category: category.to_owned(),
        price,
        gear_system: None,
        frame_size: None,
        color: None,
        image_url: None,
        stock,
        on_shelf,
    };

    let mut console = console()?;
    let id = console.save_product(&form, None).await?;
    tracing::info!("Product created: {id}");
    Ok(())
}

/// Set a product's stock count.
pub async fn set_stock(product_id: &str, quantity: u32) -> Result<(), Box<dyn std::error::Error>> {
    let mut console = console()?;
    console
        .set_stock(&ProductId::from(product_id), quantity)
        .await?;
    tracing::info!("Stock for {product_id} set to {quantity}");
    Ok(())
}

/// Put a product on or off the shelf.
pub async fn shelf(product_id: &str, on_shelf: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut console = console()?;
    console
        .set_on_shelf(&ProductId::from(product_id), on_shelf)
        .await?;
    tracing::info!(
        "Product {product_id} is now {}",
        if on_shelf { "on the shelf" } else { "off the shelf" }
    );
    Ok(())
}

/// Delete a product and its inventory record.
pub async fn delete_product(product_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut console = console()?;
    console.delete_product(&ProductId::from(product_id)).await?;
    tracing::info!("Product {product_id} deleted");
    Ok(())
}

/// List every user account.
pub async fn users() -> Result<(), Box<dyn std::error::Error>> {
    let mut console = console()?;
    let users = console.users().await?;
    for user in users {
        println!(
            "{}  {}  {}  {}",
            user.id,
            user.username,
            user.role,
            user.phone.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

/// Delete a user account.
pub async fn delete_user(user_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut console = console()?;
    console.delete_user(&UserId::from(user_id)).await?;
    tracing::info!("User {user_id} deleted");
    Ok(())
}

/// Show the full order log.
pub async fn orders() -> Result<(), Box<dyn std::error::Error>> {
    let mut console = console()?;
    let orders = console.orders().await?;
    if orders.is_empty() {
        println!("no orders");
        return Ok(());
    }
    for order in orders {
        let product = match (&order.product_brand, &order.product_model) {
            (Some(brand), Some(model)) => format!("{brand} - {model}"),
            _ => order.product_id.to_string(),
        };
        let total = order
            .total()
            .map_or_else(|| "-".to_owned(), |t| t.to_string());
        println!(
            "{}  {}  x{}  total {}  {}  buyer {}",
            order.id,
            product,
            order.quantity,
            total,
            order.status,
            order.buyer_name.as_deref().unwrap_or(order.buyer_id.as_str()),
        );
    }
    Ok(())
}

/// Delete any order from the log.
pub async fn delete_order(order_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut console = console()?;
    console.delete_order(&OrderId::from(order_id)).await?;
    tracing::info!("Order {order_id} deleted");
    Ok(())
}
