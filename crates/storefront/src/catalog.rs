//! Paginated catalog browsing.
//!
//! The storefront lists six products per page and appends pages as the
//! shopper asks for more. The pager is explicit about the two races the
//! UI can produce: a second "load more" while one is in flight, and a
//! category switch while a page is still arriving. Requests carry a
//! generation number; a response from a previous generation is discarded.

use tracing::{debug, instrument};

use spokeshop_core::{Page, ProductId, StockLevel};
use spokeshop_gateway::GatewayClient;
use spokeshop_gateway::types::Product;

use crate::error::StorefrontError;

/// Products per catalog page.
pub const PAGE_SIZE: u32 = 6;

/// What happened to a load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived and was appended; carries the number of products.
    Loaded(usize),
    /// A load was already in flight; nothing was requested.
    AlreadyLoading,
    /// The listing is exhausted; nothing was requested.
    Exhausted,
    /// The response belonged to a superseded view and was discarded.
    Superseded,
}

/// An in-flight page request issued by [`CatalogPager::begin_load`].
#[derive(Debug, Clone)]
pub struct PageRequest {
    generation: u64,
    page: u32,
    category: Option<String>,
}

impl PageRequest {
    /// Zero-based page index this request asks for.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Category filter in effect when the request was issued.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Append-only view of the product listing, one category at a time.
#[derive(Debug)]
pub struct CatalogPager {
    gateway: GatewayClient,
    category: Option<String>,
    products: Vec<Product>,
    next_page: u32,
    loading: bool,
    exhausted: bool,
    generation: u64,
}

impl CatalogPager {
    #[must_use]
    pub fn new(gateway: GatewayClient) -> Self {
        Self {
            gateway,
            category: None,
            products: Vec::new(),
            next_page: 0,
            loading: false,
            exhausted: false,
            generation: 0,
        }
    }

    /// Products accumulated so far, in listing order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Current category filter, `None` for the full listing.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Whether another page may exist.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        !self.exhausted
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Switch the category filter and restart from the first page.
    ///
    /// Every filter change resets the view, and the generation bump makes
    /// any page still in flight land as [`LoadOutcome::Superseded`].
    pub fn set_category(&mut self, category: Option<String>) {
        debug!(category = ?category, "catalog view reset");
        self.generation += 1;
        self.category = category;
        self.products.clear();
        self.next_page = 0;
        self.loading = false;
        self.exhausted = false;
    }

    /// Start a page load, or `None` when one is in flight or the listing
    /// is exhausted.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if self.loading || self.exhausted {
            return None;
        }
        self.loading = true;
        Some(PageRequest {
            generation: self.generation,
            page: self.next_page,
            category: self.category.clone(),
        })
    }

    /// Apply a fetched page to the view.
    ///
    /// A page from a superseded generation is discarded without touching
    /// the current view. A short or empty page marks the listing exhausted.
    pub fn apply(&mut self, request: &PageRequest, page: Page<Product>) -> LoadOutcome {
        if request.generation != self.generation {
            debug!(page = request.page, "discarding superseded page");
            return LoadOutcome::Superseded;
        }
        self.loading = false;
        let count = page.content.len();
        if count < PAGE_SIZE as usize {
            self.exhausted = true;
        }
        self.next_page += 1;
        self.products.extend(page.content);
        LoadOutcome::Loaded(count)
    }

    /// Release the loading flag after a failed fetch.
    ///
    /// No-op if the view has moved on to a newer generation.
    pub fn abort(&mut self, request: &PageRequest) {
        if request.generation == self.generation {
            self.loading = false;
        }
    }

    /// Fetch and append the next page.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway call fails; the pager stays
    /// loadable afterwards.
    #[instrument(skip(self), fields(category = ?self.category, page = self.next_page))]
    pub async fn load_next(&mut self) -> Result<LoadOutcome, StorefrontError> {
        let Some(request) = self.begin_load() else {
            return Ok(if self.loading {
                LoadOutcome::AlreadyLoading
            } else {
                LoadOutcome::Exhausted
            });
        };

        let fetched = match request.category() {
            Some(category) => {
                self.gateway
                    .products_by_category(category, request.page, PAGE_SIZE)
                    .await
            }
            None => self.gateway.products_page(request.page, PAGE_SIZE).await,
        };

        match fetched {
            Ok(page) => Ok(self.apply(&request, page)),
            Err(e) => {
                self.abort(&request);
                Err(e.into())
            }
        }
    }

    /// Decrement the displayed stock after a successful purchase.
    ///
    /// Purely cosmetic; the authoritative count lives in the inventory
    /// service and the next page load replaces it.
    pub fn note_purchase(&mut self, product_id: &ProductId) {
        for product in &mut self.products {
            if &product.id == product_id
                && let Some(stock) = product.stock
            {
                product.stock = Some(stock.saturating_sub(1));
            }
        }
    }

    /// Increment the displayed stock after a successful cancel.
    pub fn note_restock(&mut self, product_id: &ProductId) {
        for product in &mut self.products {
            if &product.id == product_id
                && let Some(stock) = product.stock
            {
                product.stock = Some(stock.saturating_add(1));
            }
        }
    }
}

/// Stock level for display, `None` when the listing carried no stock count.
#[must_use]
pub fn stock_level(product: &Product) -> Option<StockLevel> {
    product.stock.map(StockLevel::from_units)
}
