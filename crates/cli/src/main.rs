//! Spokeshop CLI - storefront and admin console from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog, six products at a time
//! spoke shop browse --category mountain
//!
//! # Create an account and log in
//! spoke auth register -u alice -p hunter22 --phone 13800000000 --age 30
//! spoke auth login -u alice -p hunter22
//!
//! # Buy a bike and inspect your orders
//! spoke shop buy <product-id>
//! spoke shop orders
//!
//! # Admin: manage the catalog (requires an ADMIN account)
//! spoke admin products
//! spoke admin add-product -b Giant -m "TCR Advanced 3" -c road --price 15000 --stock 5
//! ```
//!
//! # Commands
//!
//! - `auth` - Register, log in, log out, show the current session
//! - `shop` - Browse the catalog, buy, list and cancel your orders
//! - `admin` - Manage products, inventory, users, and the order log

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "spoke")]
#[command(author, version, about = "Spokeshop command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the login session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Browse and buy as a shopper
    Shop {
        #[command(subcommand)]
        action: ShopAction,
    },
    /// Manage the shop (requires an ADMIN account)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Register a new shopper account
    Register {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Phone number
        #[arg(long)]
        phone: String,

        /// Age
        #[arg(long)]
        age: u32,
    },
    /// Log in and persist the session
    Login {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
}

#[derive(Subcommand)]
enum ShopAction {
    /// List the catalog page by page
    Browse {
        /// Only show one category
        #[arg(short, long)]
        category: Option<String>,

        /// How many pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Buy one unit of a product
    Buy {
        /// Product id
        product_id: String,
    },
    /// List your orders
    Orders,
    /// Cancel one of your orders
    Cancel {
        /// Order id
        order_id: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List every product with stock and shelf state
    Products,
    /// Create a product with initial inventory
    AddProduct {
        /// Brand name
        #[arg(short, long)]
        brand: String,

        /// Model name
        #[arg(short, long)]
        model: String,

        /// Category
        #[arg(short, long)]
        category: String,

        /// Price
        #[arg(long)]
        price: String,

        /// Initial stock count
        #[arg(long, default_value_t = 0)]
        stock: u32,

        /// Create the product off the shelf
        #[arg(long)]
        off_shelf: bool,
    },
    /// Set a product's stock count
    SetStock {
        /// Product id
        product_id: String,

        /// New stock count
        quantity: u32,
    },
    /// Put a product on or off the shelf
    Shelf {
        /// Product id
        product_id: String,

        /// Off the shelf instead of on
        #[arg(long)]
        off: bool,
    },
    /// Delete a product and its inventory record
    DeleteProduct {
        /// Product id
        product_id: String,
    },
    /// List every user account
    Users,
    /// Delete a user account
    DeleteUser {
        /// User id
        user_id: String,
    },
    /// Show the full order log
    Orders,
    /// Delete any order from the log
    DeleteOrder {
        /// Order id
        order_id: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::Register {
                username,
                password,
                phone,
                age,
            } => commands::auth::register(&username, &password, &phone, age).await?,
            AuthAction::Login { username, password } => {
                commands::auth::login(&username, &password).await?;
            }
            AuthAction::Logout => commands::auth::logout()?,
            AuthAction::Whoami => commands::auth::whoami()?,
        },
        Commands::Shop { action } => match action {
            ShopAction::Browse { category, pages } => {
                commands::shop::browse(category, pages).await?;
            }
            ShopAction::Buy { product_id } => commands::shop::buy(&product_id).await?,
            ShopAction::Orders => commands::shop::orders().await?,
            ShopAction::Cancel { order_id } => commands::shop::cancel(&order_id).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Products => commands::admin::products().await?,
            AdminAction::AddProduct {
                brand,
                model,
                category,
                price,
                stock,
                off_shelf,
            } => {
                commands::admin::add_product(&brand, &model, &category, &price, stock, !off_shelf)
                    .await?;
            }
            AdminAction::SetStock {
                product_id,
                quantity,
            } => commands::admin::set_stock(&product_id, quantity).await?,
            AdminAction::Shelf { product_id, off } => {
                commands::admin::shelf(&product_id, !off).await?;
            }
            AdminAction::DeleteProduct { product_id } => {
                commands::admin::delete_product(&product_id).await?;
            }
            AdminAction::Users => commands::admin::users().await?,
            AdminAction::DeleteUser { user_id } => {
                commands::admin::delete_user(&user_id).await?;
            }
            AdminAction::Orders => commands::admin::orders().await?,
            AdminAction::DeleteOrder { order_id } => {
                commands::admin::delete_order(&order_id).await?;
            }
        },
    }
    Ok(())
}
