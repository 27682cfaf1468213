//! The storefront facade.
//!
//! Ties the gateway client, session, pager, and purchase guards together
//! behind one type. Session expiry is handled here: any gateway call that
//! comes back 401/403 clears the local session before the error surfaces,
//! so every feature reacts to a dead session the same way.

use std::path::PathBuf;

use tracing::{info, instrument};

use spokeshop_core::{OrderId, ProductId};
use spokeshop_gateway::types::{NewOrder, Order, Product, User};
use spokeshop_gateway::{GatewayClient, GatewayConfig};

use crate::auth::{AuthService, RegistrationForm};
use crate::cart::{CartView, PendingGuard};
use crate::catalog::{CatalogPager, LoadOutcome, stock_level};
use crate::error::StorefrontError;
use crate::session::SessionStore;

/// What happened to a buy-now click.
#[derive(Debug)]
pub enum PurchaseOutcome {
    /// The order was placed.
    Placed(Order),
    /// An order for this product is already in flight; click ignored.
    AlreadyPending,
    /// The product shows no stock; no request was made.
    OutOfStock,
}

/// What happened to a cancel click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    /// A cancel for this order is already in flight; click ignored.
    AlreadyPending,
    /// No active order for the product exists to remove.
    NoMatchingOrder,
}

/// The shopper-facing application.
#[derive(Debug)]
pub struct Storefront {
    gateway: GatewayClient,
    auth: AuthService,
    pager: CatalogPager,
    cart: CartView,
    purchases: PendingGuard<ProductId>,
    cancellations: PendingGuard<OrderId>,
}

impl Storefront {
    /// Build a storefront from configuration and a session file location.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the session
    /// file exists but cannot be read.
    pub fn new(
        config: &GatewayConfig,
        session_path: impl Into<PathBuf>,
    ) -> Result<Self, StorefrontError> {
        let gateway = GatewayClient::new(config)?;
        let store = SessionStore::open(session_path)?;
        Ok(Self::from_parts(gateway, store))
    }

    /// Assemble a storefront from already-built parts.
    #[must_use]
    pub fn from_parts(gateway: GatewayClient, store: SessionStore) -> Self {
        let auth = AuthService::new(gateway.clone(), store);
        let pager = CatalogPager::new(gateway.clone());
        Self {
            gateway,
            auth,
            pager,
            cart: CartView::new(),
            purchases: PendingGuard::new(),
            cancellations: PendingGuard::new(),
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.auth.current_user()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }

    /// Register a new shopper account.
    ///
    /// # Errors
    ///
    /// Returns a validation or gateway error.
    pub async fn register(&mut self, form: &RegistrationForm) -> Result<(), StorefrontError> {
        self.auth.register(form).await
    }

    /// Log in and persist the session.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::InvalidCredentials`] on rejected
    /// credentials, or other gateway/store errors.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<User, StorefrontError> {
        self.auth.login(username, password).await
    }

    /// Log out, clear the stored session, and reset the cart display.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written.
    pub fn logout(&mut self) -> Result<(), StorefrontError> {
        self.auth.logout()?;
        self.cart.clear();
        Ok(())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    #[must_use]
    pub fn products(&self) -> &[Product] {
        self.pager.products()
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.pager.has_more()
    }

    /// Switch the category filter and restart the listing.
    pub fn set_category(&mut self, category: Option<String>) {
        self.pager.set_category(category);
    }

    /// Fetch and append the next catalog page.
    ///
    /// # Errors
    ///
    /// Returns a gateway error; the pager stays loadable afterwards.
    pub async fn load_more(&mut self) -> Result<LoadOutcome, StorefrontError> {
        self.pager.load_next().await
    }

    // =========================================================================
    // Purchases & Orders
    // =========================================================================

    /// Place an immediate quantity-one order for a product.
    ///
    /// Out-of-stock products and products with an order already in flight
    /// are refused locally without a gateway call.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotLoggedIn`] without a session, or the
    /// gateway error from order creation (e.g. the backend refusing an
    /// order that lost the race for the last unit).
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn buy_now(&mut self, product: &Product) -> Result<PurchaseOutcome, StorefrontError> {
        let user = self.auth.current_user().ok_or(StorefrontError::NotLoggedIn)?;

        if stock_level(product).is_some_and(|level| !level.is_purchasable()) {
            return Ok(PurchaseOutcome::OutOfStock);
        }
        if !self.purchases.begin(product.id.clone()) {
            return Ok(PurchaseOutcome::AlreadyPending);
        }

        let new_order = NewOrder {
            product_id: product.id.clone(),
            buyer_id: user.id,
            quantity: 1,
        };
        let result = self.gateway.create_order(&new_order).await;
        self.purchases.finish(&product.id);

        match result {
            Ok(order) => {
                info!(order_id = %order.id, "order placed");
                self.pager.note_purchase(&product.id);
                self.cart.add(product.id.clone());
                Ok(PurchaseOutcome::Placed(order))
            }
            Err(e) => Err(self.auth.map_gateway_error(e)),
        }
    }

    /// Total units across open purchases, shown on the cart badge.
    #[must_use]
    pub fn cart_badge(&self) -> u32 {
        self.cart.badge_total()
    }

    /// Displayed cart quantity for one product.
    #[must_use]
    pub fn cart_count(&self, product_id: &ProductId) -> u32 {
        self.cart.count(product_id)
    }

    /// List the logged-in user's orders.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotLoggedIn`] without a session, or a
    /// gateway error.
    pub async fn my_orders(&mut self) -> Result<Vec<Order>, StorefrontError> {
        let user = self.auth.current_user().ok_or(StorefrontError::NotLoggedIn)?;
        self.gateway
            .user_orders(&user.id)
            .await
            .map_err(|e| self.auth.map_gateway_error(e))
    }

    /// Cancel one of the logged-in user's orders.
    ///
    /// On success the displayed stock for the product goes back up by one
    /// and the cart badge count comes down by one.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotLoggedIn`] without a session, or a
    /// gateway error.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn cancel_order(&mut self, order: &Order) -> Result<CancelOutcome, StorefrontError> {
        if self.auth.current_user().is_none() {
            return Err(StorefrontError::NotLoggedIn);
        }
        if !self.cancellations.begin(order.id.clone()) {
            return Ok(CancelOutcome::AlreadyPending);
        }

        let result = self.gateway.delete_order(&order.id).await;
        self.cancellations.finish(&order.id);

        match result {
            Ok(()) => {
                info!("order cancelled");
                self.pager.note_restock(&order.product_id);
                self.cart.remove(&order.product_id);
                Ok(CancelOutcome::Cancelled)
            }
            Err(e) => Err(self.auth.map_gateway_error(e)),
        }
    }

    /// Remove one unit of a product from the cart view.
    ///
    /// The cart holds no orders of its own, so this looks up the shopper's
    /// order list, picks one active order for the product, and cancels it.
    /// When no active order backs the entry the stale count is dropped so
    /// the display matches the backend again.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotLoggedIn`] without a session, or a
    /// gateway error from the lookup or the cancel.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(
        &mut self,
        product_id: &ProductId,
    ) -> Result<CancelOutcome, StorefrontError> {
        let orders = self.my_orders().await?;
        let Some(order) = orders
            .iter()
            .find(|order| &order.product_id == product_id && order.status.is_active())
        else {
            self.cart.forget(product_id);
            return Ok(CancelOutcome::NoMatchingOrder);
        };
        let order = order.clone();
        self.cancel_order(&order).await
    }
}
