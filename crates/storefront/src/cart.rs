//! Buy-now purchase plumbing.
//!
//! The storefront has no persistent cart; buying is a single immediate
//! order for quantity one, and [`CartView`] only mirrors those orders for
//! display (the badge count and per-product quantities). What needs
//! protecting is the button itself: a double click must not place two
//! orders, and a second cancel click must not delete twice.
//! [`PendingGuard`] tracks which keys have an operation in flight and
//! refuses re-entry until it completes.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use spokeshop_core::ProductId;

/// Tracks keys with an operation in flight.
#[derive(Debug)]
pub struct PendingGuard<K> {
    in_flight: HashSet<K>,
}

impl<K: Eq + Hash + Clone> PendingGuard<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_flight: HashSet::new(),
        }
    }

    /// Claim a key. Returns `false` if an operation is already pending,
    /// in which case the caller must do nothing.
    pub fn begin(&mut self, key: K) -> bool {
        self.in_flight.insert(key)
    }

    /// Release a key once its operation finished, successfully or not.
    pub fn finish(&mut self, key: &K) {
        self.in_flight.remove(key);
    }

    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        self.in_flight.contains(key)
    }
}

impl<K: Eq + Hash + Clone> Default for PendingGuard<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Display-only mirror of the shopper's open purchases.
///
/// Each successful buy bumps the count for that product and each
/// successful cancel drops it, removing the entry when it reaches zero.
/// The backend's order list stays the source of truth; this only feeds
/// the cart badge and per-product quantity labels without a refetch.
#[derive(Debug, Default)]
pub struct CartView {
    counts: HashMap<ProductId, u32>,
}

impl CartView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more purchased unit of a product.
    pub fn add(&mut self, product_id: ProductId) {
        *self.counts.entry(product_id).or_insert(0) += 1;
    }

    /// Record one cancelled unit, dropping the entry at zero.
    pub fn remove(&mut self, product_id: &ProductId) {
        if let Some(count) = self.counts.get_mut(product_id) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(product_id);
            }
        }
    }

    /// Drop a product's entry entirely, whatever it counted.
    ///
    /// Used when the backend shows no order behind the entry and the
    /// display has to fall back in line.
    pub fn forget(&mut self, product_id: &ProductId) {
        self.counts.remove(product_id);
    }

    /// Displayed quantity for one product.
    #[must_use]
    pub fn count(&self, product_id: &ProductId) -> u32 {
        self.counts.get(product_id).copied().unwrap_or(0)
    }

    /// Total across all products, shown on the cart badge.
    #[must_use]
    pub fn badge_total(&self) -> u32 {
        self.counts.values().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Forget everything, used on logout.
    pub fn clear(&mut self) {
        self.counts.clear();
    }
}
