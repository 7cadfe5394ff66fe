//! Shopping cart.
//!
//! [`CartState`] is a plain value changed only through [`CartAction`]s.
//! [`CartStore`] owns the state behind a lock, persists it through a
//! [`CartStorage`] and publishes every change to subscribers.

mod storage;
mod store;

use vitrine_core::{CartLineItem, NewLineItem, Price, ProductId, Size};

pub use storage::{
    CART_FORMAT_VERSION, CartStorage, CartStorageError, FileCartStorage, MemoryCartStorage,
    decode_items, encode_items,
};
pub use store::CartStore;

/// A change to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit of a product in a size.
    Add(NewLineItem),
    /// Remove the `(id, size)` line.
    Remove { id: ProductId, size: Size },
    /// Set the quantity of the `(id, size)` line. Values below 1 are ignored.
    UpdateQuantity {
        id: ProductId,
        size: Size,
        quantity: i64,
    },
    /// Take ordered units out of the cart. Lines left with no units are
    /// removed; units added after the order was drafted stay.
    RemoveOrdered(Vec<CartLineItem>),
    /// Empty the cart.
    Clear,
}

/// The cart contents. At most one line per `(id, size)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    items: Vec<CartLineItem>,
}

impl CartState {
    /// Build a state from stored lines, merging duplicates and dropping
    /// lines with no units.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartLineItem>) -> Self {
        let mut state = Self::default();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match state.line_mut(&item.id, item.size) {
                Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
                None => state.items.push(item),
            }
        }
        state
    }

    /// Apply `action`, returning whether the state changed.
    pub fn apply(&mut self, action: CartAction) -> bool {
        match action {
            CartAction::Add(item) => {
                match self.line_mut(&item.id, item.size) {
                    Some(line) => line.quantity = line.quantity.saturating_add(1),
                    None => self.items.push(item.with_quantity(1)),
                }
                true
            }
            CartAction::Remove { id, size } => {
                let before = self.items.len();
                self.items.retain(|line| !line.is(&id, size));
                self.items.len() != before
            }
            CartAction::UpdateQuantity { id, size, quantity } => {
                if quantity < 1 {
                    return false;
                }
                let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                match self.line_mut(&id, size) {
                    Some(line) if line.quantity != quantity => {
                        line.quantity = quantity;
                        true
                    }
                    _ => false,
                }
            }
            CartAction::RemoveOrdered(ordered) => {
                let mut changed = false;
                for item in ordered {
                    if let Some(line) = self.line_mut(&item.id, item.size) {
                        line.quantity = line.quantity.saturating_sub(item.quantity);
                        changed = true;
                    }
                }
                self.items.retain(|line| line.quantity > 0);
                changed
            }
            CartAction::Clear => {
                let changed = !self.items.is_empty();
                self.items.clear();
                changed
            }
        }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// Sum of `price * quantity` over every line.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The `(id, size)` line, if present.
    #[must_use]
    pub fn line(&self, id: &ProductId, size: Size) -> Option<&CartLineItem> {
        self.items.iter().find(|line| line.is(id, size))
    }

    fn line_mut(&mut self, id: &ProductId, size: Size) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|line| line.is(id, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shirt(id: &str, size: Size, cents: i64) -> NewLineItem {
        NewLineItem {
            id: ProductId::new(id),
            name: format!("Camiseta {id}"),
            price: Price::from_cents(cents),
            image_url: format!("https://cdn.example.com/{id}.jpg"),
            size,
        }
    }

    #[test]
    fn test_repeated_add_increments_single_line() {
        let mut cart = CartState::default();
        for _ in 0..5 {
            assert!(cart.apply(CartAction::Add(shirt("A1", Size::M, 5000))));
        }
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_same_product_different_sizes_are_separate_lines() {
        let mut cart = CartState::default();
        cart.apply(CartAction::Add(shirt("A1", Size::M, 5000)));
        cart.apply(CartAction::Add(shirt("A1", Size::G, 5000)));
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_add_twice_then_remove() {
        let mut cart = CartState::default();
        cart.apply(CartAction::Add(shirt("A1", Size::M, 5000)));
        cart.apply(CartAction::Add(shirt("A1", Size::M, 5000)));
        assert_eq!(cart.total(), Price::from_cents(10_000));
        assert_eq!(cart.total().to_string(), "R$ 100,00");

        assert!(cart.apply(CartAction::Remove {
            id: ProductId::new("A1"),
            size: Size::M,
        }));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_remove_absent_line_is_noop() {
        let mut cart = CartState::default();
        cart.apply(CartAction::Add(shirt("A1", Size::M, 5000)));
        let before = cart.clone();

        assert!(!cart.apply(CartAction::Remove {
            id: ProductId::new("A1"),
            size: Size::P,
        }));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_ordered_keeps_later_additions() {
        let mut cart = CartState::default();
        cart.apply(CartAction::Add(shirt("A1", Size::M, 5000)));
        cart.apply(CartAction::Add(shirt("B2", Size::P, 3000)));
        let ordered = cart.items().to_vec();

        // Added while the order was in flight.
        cart.apply(CartAction::Add(shirt("A1", Size::M, 5000)));
        cart.apply(CartAction::Add(shirt("C3", Size::G, 7000)));

        assert!(cart.apply(CartAction::RemoveOrdered(ordered)));
        let left: Vec<_> = cart.items().iter().map(|line| (line.id.to_string(), line.quantity)).collect();
        assert_eq!(left, [("A1".to_string(), 1), ("C3".to_string(), 1)]);
    }

    #[test]
    fn test_remove_ordered_ignores_lines_already_gone() {
        let mut cart = CartState::default();
        cart.apply(CartAction::Add(shirt("A1", Size::M, 5000)));
        let ordered = cart.items().to_vec();
        cart.apply(CartAction::Clear);

        assert!(!cart.apply(CartAction::RemoveOrdered(ordered)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_below_one_is_noop() {
        let mut cart = CartState::default();
        cart.apply(CartAction::Add(shirt("A1", Size::M, 5000)));
        let before = cart.clone();

        for quantity in [0, -1, i64::MIN] {
            assert!(!cart.apply(CartAction::UpdateQuantity {
                id: ProductId::new("A1"),
                size: Size::M,
                quantity,
            }));
            assert_eq!(cart, before);
        }
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = CartState::default();
        cart.apply(CartAction::Add(shirt("A1", Size::M, 1990)));
        assert!(cart.apply(CartAction::UpdateQuantity {
            id: ProductId::new("A1"),
            size: Size::M,
            quantity: 3,
        }));
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total(), Price::from_cents(5970));

        // Absent line.
        assert!(!cart.apply(CartAction::UpdateQuantity {
            id: ProductId::new("B2"),
            size: Size::M,
            quantity: 3,
        }));
    }

    #[test]
    fn test_total_matches_sum_of_lines() {
        let mut cart = CartState::default();
        assert_eq!(cart.total(), Price::ZERO);

        cart.apply(CartAction::Add(shirt("A1", Size::M, 12_990)));
        cart.apply(CartAction::Add(shirt("B2", Size::U, 7990)));
        cart.apply(CartAction::Add(shirt("A1", Size::M, 12_990)));
        cart.apply(CartAction::Remove {
            id: ProductId::new("B2"),
            size: Size::U,
        });
        cart.apply(CartAction::Add(shirt("C3", Size::GG, 19_900)));

        let expected: Price = cart.items().iter().map(CartLineItem::line_total).sum();
        assert_eq!(cart.total(), expected);
        assert_eq!(cart.total(), Price::from_cents(45_880));
    }

    #[test]
    fn test_clear() {
        let mut cart = CartState::default();
        assert!(!cart.apply(CartAction::Clear));
        cart.apply(CartAction::Add(shirt("A1", Size::M, 5000)));
        assert!(cart.apply(CartAction::Clear));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_from_items_merges_and_drops_empty_lines() {
        let a = shirt("A1", Size::M, 5000);
        let state = CartState::from_items([
            a.clone().with_quantity(2),
            shirt("B2", Size::P, 3000).with_quantity(0),
            a.with_quantity(3),
        ]);
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].quantity, 5);
    }
}
