//! Shared cart store.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use vitrine_core::{CartLineItem, NewLineItem, Price, ProductId, Size};

use super::storage::{
    CartStorage, FileCartStorage, MemoryCartStorage, decode_items, encode_items,
};
use super::{CartAction, CartState};

/// The shopper's cart.
///
/// Cheaply cloneable; clones share the same cart. Each change is applied and
/// written to storage under one lock, then published to subscribers.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    state: Mutex<CartState>,
    storage: Box<dyn CartStorage>,
    changes: watch::Sender<CartState>,
}

impl CartStore {
    /// Load the cart from `storage`.
    ///
    /// Unreadable or corrupt data yields an empty cart.
    #[must_use]
    pub fn load(storage: impl CartStorage + 'static) -> Self {
        let state = match storage.read() {
            Ok(Some(bytes)) => match decode_items(&bytes) {
                Ok(items) => CartState::from_items(items),
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable cart");
                    CartState::default()
                }
            },
            Ok(None) => CartState::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart storage");
                CartState::default()
            }
        };

        debug!(lines = state.items().len(), "Cart loaded");

        let (changes, _) = watch::channel(state.clone());
        Self {
            inner: Arc::new(CartStoreInner {
                state: Mutex::new(state),
                storage: Box::new(storage),
                changes,
            }),
        }
    }

    /// Load the cart kept in a file.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::load(FileCartStorage::new(path))
    }

    /// An empty cart that is never written to disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::load(MemoryCartStorage::new())
    }

    /// Apply `action`, persisting and publishing the result if it changed
    /// anything. Returns whether the cart changed.
    #[instrument(skip(self))]
    pub fn dispatch(&self, action: CartAction) -> bool {
        let mut state = self.lock();
        if !state.apply(action) {
            return false;
        }

        self.persist(&state);
        self.inner.changes.send_replace(state.clone());
        true
    }

    /// Add one unit of `item`.
    pub fn add_to_cart(&self, item: NewLineItem) {
        self.dispatch(CartAction::Add(item));
    }

    /// Remove the `(id, size)` line if present.
    pub fn remove_from_cart(&self, id: &ProductId, size: Size) {
        self.dispatch(CartAction::Remove {
            id: id.clone(),
            size,
        });
    }

    /// Set the quantity of the `(id, size)` line. Values below 1 are ignored.
    pub fn update_quantity(&self, id: &ProductId, size: Size, quantity: i64) {
        self.dispatch(CartAction::UpdateQuantity {
            id: id.clone(),
            size,
            quantity,
        });
    }

    /// Take the units of a placed order out of the cart.
    pub fn remove_ordered(&self, items: &[CartLineItem]) {
        self.dispatch(CartAction::RemoveOrdered(items.to_vec()));
    }

    /// Empty the cart.
    pub fn clear_cart(&self) {
        self.dispatch(CartAction::Clear);
    }

    /// Sum of `price * quantity`.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lock().total()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lock().item_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Current lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.lock().items().to_vec()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.lock().clone()
    }

    /// Receiver that observes every committed state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.changes.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, CartState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Best-effort write; the in-memory state stays authoritative.
    fn persist(&self, state: &CartState) {
        let result = encode_items(state.items()).and_then(|bytes| self.inner.storage.write(&bytes));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::CartStorageError;

    fn tee(size: Size) -> NewLineItem {
        NewLineItem {
            id: ProductId::new("A1"),
            name: "Camiseta Básica".to_string(),
            price: Price::from_cents(5000),
            image_url: "https://cdn.example.com/a1.jpg".to_string(),
            size,
        }
    }

    struct FailingStorage;

    impl CartStorage for FailingStorage {
        fn read(&self) -> Result<Option<Vec<u8>>, CartStorageError> {
            Ok(None)
        }

        fn write(&self, _bytes: &[u8]) -> Result<(), CartStorageError> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    #[test]
    fn test_persist_then_reload() {
        let storage = Arc::new(MemoryCartStorage::new());
        let store = CartStore::load(Arc::clone(&storage));
        store.add_to_cart(tee(Size::M));
        store.add_to_cart(tee(Size::M));
        store.add_to_cart(tee(Size::GG));

        let reloaded = CartStore::load(Arc::clone(&storage));
        assert_eq!(reloaded.items(), store.items());
        assert_eq!(reloaded.total(), Price::from_cents(15_000));
    }

    #[test]
    fn test_noop_does_not_write() {
        let storage = Arc::new(MemoryCartStorage::new());
        let store = CartStore::load(Arc::clone(&storage));
        store.update_quantity(&ProductId::new("A1"), Size::M, 4);
        store.remove_from_cart(&ProductId::new("A1"), Size::M);
        assert!(storage.contents().is_none());
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let store = CartStore::load(MemoryCartStorage::with_bytes("{\"version\":1,"));
        assert!(store.is_empty());
        assert_eq!(store.total(), Price::ZERO);
    }

    #[test]
    fn test_write_failure_keeps_in_memory_state() {
        let store = CartStore::load(FailingStorage);
        store.add_to_cart(tee(Size::P));
        assert_eq!(store.item_count(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let store = CartStore::in_memory();
        let other = store.clone();
        other.add_to_cart(tee(Size::M));
        assert_eq!(store.item_count(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = CartStore::in_memory();
        let mut rx = store.subscribe();

        store.add_to_cart(tee(Size::M));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().item_count(), 1);

        store.update_quantity(&ProductId::new("A1"), Size::M, 0);
        assert!(!rx.has_changed().unwrap());

        store.clear_cart();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_empty());
    }
}
