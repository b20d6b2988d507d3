//! Gateway
//!
//! Trait contracts for the external collaborators the storefront core is
//! driven by: the product catalog, the order gateway, the persistent store,
//! and the notification channel. Implementations (HTTP clients, browser
//! storage, sockets) live outside this crate; the core only ever sees typed
//! domain values through these seams.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    catalog::ProductFilter,
    checkout::OrderDraft,
    fulfillment::ItemStatus,
    notifications::FeedEvent,
    orders::{Order, OrderId, OrderItemId},
    products::{Product, VendorId},
};

/// Errors surfaced by the order gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend refused the request.
    #[error("order gateway refused the request: {0}")]
    Refused(String),

    /// The backend could not be reached.
    #[error("order gateway unreachable")]
    Unreachable,
}

/// Errors surfaced by the persistent store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write did not persist.
    #[error("store write failed: {0}")]
    Write(String),
}

/// Read-side product source.
///
/// Failure degrades to "no data": implementations return an empty list when
/// the backend is unreachable, and the core renders that as an empty
/// storefront rather than an error.
pub trait ProductCatalog {
    /// Products passing a filter.
    fn list_products(&self, filter: &ProductFilter) -> Vec<Product<'static>>;

    /// One vendor's products.
    fn products_by_vendor(&self, vendor: &VendorId) -> Vec<Product<'static>>;
}

/// Order placement and vendor order-board source.
///
/// The core computes every target status itself (via the fulfillment
/// transitions) and only tells the gateway what to store; the gateway is
/// never asked to derive a status.
pub trait OrderGateway {
    /// Place a draft, returning the backend-assigned order id.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] when the backend refuses the draft or is
    /// unreachable.
    fn place_order(&mut self, draft: &OrderDraft<'_>) -> Result<OrderId, GatewayError>;

    /// The orders containing a vendor's items. Empty on failure.
    fn vendor_orders(&self, vendor: &VendorId) -> Vec<Order<'static>>;

    /// Record an item's new status, as computed by the core.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] when the backend refuses the update or is
    /// unreachable.
    fn update_item_status(
        &mut self,
        order: &OrderId,
        item: &OrderItemId,
        status: ItemStatus,
    ) -> Result<(), GatewayError>;
}

/// Scoped key-value storage surviving reloads (cart) and until logout
/// (session user).
pub trait PersistentStore {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the write does not persist.
    fn put(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// Delete a value. A no-op for absent keys.
    fn remove(&mut self, key: &str);
}

/// Push delivery of notification events.
///
/// The transport (socket, poll, replay) is the implementation's concern;
/// the core applies drained events through the
/// [`Feed`](crate::notifications::Feed) reducers.
pub trait NotificationChannel {
    /// Take the events received since the last drain.
    fn drain(&mut self) -> Vec<FeedEvent>;
}

/// In-memory [`PersistentStore`] for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value);

        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn memory_store_round_trips_and_removes() -> TestResult {
        let mut store = MemoryStore::new();

        store.put("cart", "{}".to_owned())?;

        assert_eq!(store.get("cart").as_deref(), Some("{}"));
        assert_eq!(store.len(), 1);

        store.remove("cart");
        store.remove("cart");

        assert!(store.get("cart").is_none());
        assert!(store.is_empty());

        Ok(())
    }
}
