//! The admin console.
//!
//! A thin orchestration layer over the gateway client. Reads join the
//! product and inventory services; the product save is a saga because one
//! logical save is up to three gateway writes and a partial save must not
//! leave the catalog inconsistent. The console owns the auth service, so a
//! token the gateway rejects clears the persisted session no matter which
//! panel triggered the call.

use std::collections::HashMap;

use tracing::{error, info, instrument, warn};

use spokeshop_core::{OrderId, ProductId, UserId};
use spokeshop_gateway::GatewayClient;
use spokeshop_gateway::types::{
    AdminOrder, Product, ProductInput, StockUpdate, User,
};
use spokeshop_storefront::AuthService;

use crate::error::{AdminError, SaveStep};
use crate::products::{ProductForm, ProductRow, merge_inventory};

/// Admin console bound to a logged-in admin user.
#[derive(Debug)]
pub struct AdminConsole {
    gateway: GatewayClient,
    auth: AuthService,
    admin: User,
}

impl AdminConsole {
    /// Open the console for the session the auth service holds.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Forbidden`] when nobody is logged in or the
    /// logged-in user does not carry the admin role.
    pub fn open(auth: AuthService) -> Result<Self, AdminError> {
        let Some(user) = auth.current_user() else {
            return Err(AdminError::Forbidden);
        };
        if !user.role.is_admin() {
            return Err(AdminError::Forbidden);
        }
        Ok(Self {
            gateway: auth.gateway().clone(),
            auth,
            admin: user,
        })
    }

    /// The admin this console is bound to.
    #[must_use]
    pub const fn admin(&self) -> &User {
        &self.admin
    }

    /// Clear the persisted session when the gateway rejected the token.
    fn note_expiry<T>(&mut self, result: Result<T, AdminError>) -> Result<T, AdminError> {
        if let Err(err) = &result
            && err.is_session_expired()
        {
            self.auth.expire_session();
        }
        result
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Build the product table: every product joined with its inventory
    /// state.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the reads fails.
    #[instrument(skip(self))]
    pub async fn product_rows(&mut self) -> Result<Vec<ProductRow>, AdminError> {
        let result = self.load_product_rows().await;
        self.note_expiry(result)
    }

    async fn load_product_rows(&self) -> Result<Vec<ProductRow>, AdminError> {
        // Products and shelf state come from different services and can
        // load in parallel
        let (products, on_shelf) = tokio::join!(
            self.gateway.all_products(),
            self.gateway.on_shelf_product_ids(),
        );
        let (products, on_shelf) = (products?, on_shelf?);

        let ids: Vec<ProductId> = products.iter().map(|p| p.id.clone()).collect();
        let stocks = if ids.is_empty() {
            HashMap::new()
        } else {
            self.gateway.stocks(&ids).await?
        };
        Ok(merge_inventory(products, &on_shelf, &stocks))
    }

    /// Save a product form, creating or updating as the form's id says.
    ///
    /// One logical save is up to three writes: product fields, stock
    /// count, shelf flag. Inventory writes are skipped when `existing`
    /// shows the value is unchanged. If a later write fails the earlier
    /// ones are compensated: a fresh creation is deleted again, an update
    /// has its previous field values restored.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::SaveFailed`] when a later step failed, with
    /// `compensated` reporting whether the rollback went through.
    #[instrument(skip(self, form, existing), fields(product_id = ?form.id))]
    pub async fn save_product(
        &mut self,
        form: &ProductForm,
        existing: Option<&ProductRow>,
    ) -> Result<ProductId, AdminError> {
        let result = self.save_product_inner(form, existing).await;
        self.note_expiry(result)
    }

    async fn save_product_inner(
        &self,
        form: &ProductForm,
        existing: Option<&ProductRow>,
    ) -> Result<ProductId, AdminError> {
        let input = form.validate()?;
        match &form.id {
            None => self.create_with_inventory(form, &input).await,
            Some(id) => self.update_with_inventory(id, form, &input, existing).await,
        }
    }

    async fn create_with_inventory(
        &self,
        form: &ProductForm,
        input: &ProductInput,
    ) -> Result<ProductId, AdminError> {
        // A failure here leaves nothing behind, so it is a plain error
        let created = self.gateway.create_product(input).await?;
        let id = created.id.clone();

        // New inventory records default to zero stock and on-shelf, so
        // only deviations from the defaults need a write
        if form.stock > 0 {
            let update = StockUpdate {
                product_id: id.clone(),
                quantity: form.stock,
            };
            if let Err(e) = self.gateway.set_stock(&update).await {
                let compensated = self.rollback_create(&id).await;
                return Err(AdminError::SaveFailed {
                    step: SaveStep::Stock,
                    compensated,
                    source: e,
                });
            }
        }

        if !form.on_shelf {
            if let Err(e) = self.gateway.set_on_shelf(&id, false).await {
                let compensated = self.rollback_create(&id).await;
                return Err(AdminError::SaveFailed {
                    step: SaveStep::Shelf,
                    compensated,
                    source: e,
                });
            }
        }

        info!(product_id = %id, "product created");
        Ok(id)
    }

    async fn update_with_inventory(
        &self,
        id: &ProductId,
        form: &ProductForm,
        input: &ProductInput,
        existing: Option<&ProductRow>,
    ) -> Result<ProductId, AdminError> {
        // A failure here changes nothing, so it is a plain error
        self.gateway.update_product(id, input).await?;

        let stock_changed = existing.is_none_or(|row| row.stock != form.stock);
        if stock_changed {
            let update = StockUpdate {
                product_id: id.clone(),
                quantity: form.stock,
            };
            if let Err(e) = self.gateway.set_stock(&update).await {
                let compensated = self.restore_product(id, existing).await;
                return Err(AdminError::SaveFailed {
                    step: SaveStep::Stock,
                    compensated,
                    source: e,
                });
            }
        }

        let shelf_changed = existing.is_none_or(|row| row.on_shelf != form.on_shelf);
        if shelf_changed
            && let Err(e) = self.gateway.set_on_shelf(id, form.on_shelf).await
        {
            let mut compensated = self.restore_product(id, existing).await;
            if stock_changed {
                compensated &= self.restore_stock(id, existing).await;
            }
            return Err(AdminError::SaveFailed {
                step: SaveStep::Shelf,
                compensated,
                source: e,
            });
        }

        info!(product_id = %id, "product updated");
        Ok(id.clone())
    }

    /// Undo a creation: drop the inventory record (which may not exist
    /// yet) and the product itself.
    async fn rollback_create(&self, id: &ProductId) -> bool {
        if let Err(e) = self.gateway.delete_inventory(id).await {
            warn!(product_id = %id, error = %e, "inventory cleanup during rollback failed");
        }
        match self.gateway.delete_product(id).await {
            Ok(()) => {
                info!(product_id = %id, "creation rolled back");
                true
            }
            Err(e) => {
                error!(product_id = %id, error = %e, "rollback failed, orphan product left behind");
                false
            }
        }
    }

    /// Restore a product's previous field values after a failed
    /// inventory write.
    async fn restore_product(&self, id: &ProductId, existing: Option<&ProductRow>) -> bool {
        let Some(row) = existing else {
            // No snapshot to restore from
            return false;
        };
        let previous = ProductInput::from(&row.product);
        match self.gateway.update_product(id, &previous).await {
            Ok(()) => true,
            Err(e) => {
                error!(product_id = %id, error = %e, "failed to restore previous product fields");
                false
            }
        }
    }

    /// Restore a product's previous stock count.
    async fn restore_stock(&self, id: &ProductId, existing: Option<&ProductRow>) -> bool {
        let Some(row) = existing else {
            return false;
        };
        let update = StockUpdate {
            product_id: id.clone(),
            quantity: row.stock,
        };
        match self.gateway.set_stock(&update).await {
            Ok(()) => true,
            Err(e) => {
                error!(product_id = %id, error = %e, "failed to restore previous stock count");
                false
            }
        }
    }

    /// Delete a product and its inventory record.
    ///
    /// The inventory cleanup is best-effort; the inventory service keeps
    /// no references back to the product, so a leftover record is inert.
    ///
    /// # Errors
    ///
    /// Returns an error if the product deletion fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&mut self, id: &ProductId) -> Result<(), AdminError> {
        let result = self.delete_product_inner(id).await;
        self.note_expiry(result)
    }

    async fn delete_product_inner(&self, id: &ProductId) -> Result<(), AdminError> {
        self.gateway.delete_product(id).await?;
        if let Err(e) = self.gateway.delete_inventory(id).await {
            warn!(product_id = %id, error = %e, "inventory cleanup failed");
        }
        info!("product deleted");
        Ok(())
    }

    /// Flip a product's shelf flag without touching anything else.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway call fails.
    pub async fn set_on_shelf(&mut self, id: &ProductId, on_shelf: bool) -> Result<(), AdminError> {
        let result = self
            .gateway
            .set_on_shelf(id, on_shelf)
            .await
            .map_err(AdminError::from);
        self.note_expiry(result)
    }

    /// Set a product's stock count without touching anything else.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway call fails.
    pub async fn set_stock(&mut self, id: &ProductId, quantity: u32) -> Result<(), AdminError> {
        let update = StockUpdate {
            product_id: id.clone(),
            quantity,
        };
        let result = self
            .gateway
            .set_stock(&update)
            .await
            .map_err(AdminError::from);
        self.note_expiry(result)
    }

    /// Every product, unjoined.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway call fails.
    pub async fn all_products(&mut self) -> Result<Vec<Product>, AdminError> {
        let result = self.gateway.all_products().await.map_err(AdminError::from);
        self.note_expiry(result)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Every user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway call fails.
    pub async fn users(&mut self) -> Result<Vec<User>, AdminError> {
        let result = self.gateway.all_users().await.map_err(AdminError::from);
        self.note_expiry(result)
    }

    /// Delete a user account.
    ///
    /// # Errors
    ///
    /// Refuses to delete the account this console is logged in as;
    /// otherwise returns any gateway error.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&mut self, id: &UserId) -> Result<(), AdminError> {
        if id == &self.admin.id {
            return Err(AdminError::Validation(
                "cannot delete the logged-in admin account".to_string(),
            ));
        }
        let result = self.gateway.delete_user(id).await.map_err(AdminError::from);
        self.note_expiry(result)?;
        info!("user deleted");
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// The full order log with product and buyer details.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway call fails.
    pub async fn orders(&mut self) -> Result<Vec<AdminOrder>, AdminError> {
        let result = self.gateway.all_orders().await.map_err(AdminError::from);
        self.note_expiry(result)
    }

    /// Delete any order; the backend restores the stock it held.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway call fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&mut self, id: &OrderId) -> Result<(), AdminError> {
        let result = self
            .gateway
            .delete_admin_order(id)
            .await
            .map_err(AdminError::from);
        self.note_expiry(result)?;
        info!("order deleted");
        Ok(())
    }
}
