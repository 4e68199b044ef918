//! The cart state machine.
//!
//! A cart holds line items from exactly one stand at a time. The first item
//! added to an empty cart binds the cart to that product's stand; adding a
//! product from a different stand is a conflict that the caller must resolve
//! explicitly (see [`AddOutcome::StandConflict`]). Stock-bounded products
//! reject any operation that would push the in-cart quantity past the bound,
//! leaving the cart untouched.
//!
//! # Two-phase cross-stand adds
//!
//! Instead of a blocking confirmation dialog inside the mutation, a
//! cross-stand add returns a serializable [`PendingAdd`]. The cart stays
//! untouched until the caller either passes the pending add to
//! [`Cart::confirm_pending`] (replacing the whole cart and rebinding the
//! stand) or simply drops it to decline. This keeps the decision point a
//! first-class state that survives a request/response round trip.
//!
//! # Totals
//!
//! `total_items` and `total_price` are recomputed on every call rather than
//! cached, so there is no running total to keep in sync with the lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Product, ProductId, StandId};

/// One product plus a positive quantity.
///
/// A line with quantity 0 is never stored; driving a quantity to 0 removes
/// the line instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product (possibly a customized variant).
    pub product: Product,
    /// Quantity, always >= 1.
    pub quantity: u32,
}

impl CartLine {
    /// Line subtotal (unit price times quantity).
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// The stand a non-empty cart is currently restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandBinding {
    /// Stand ID.
    pub id: StandId,
    /// Stand display name, kept for conflict prompts.
    pub name: String,
}

/// A cross-stand add waiting for the customer's decision.
///
/// Serializable so it can be parked in the session between the conflict
/// prompt and the confirm/decline request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAdd {
    /// The product that triggered the conflict.
    pub product: Product,
    /// Requested quantity.
    pub quantity: u32,
}

/// Result of [`Cart::add_item`].
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// The line was appended or merged into an existing line.
    Added,
    /// The stock bound would be exceeded; the cart is unchanged.
    StockLimited {
        /// The declared stock bound for the product.
        available: u32,
    },
    /// The product belongs to a different stand than the cart's binding.
    /// The cart is unchanged; resolve via [`Cart::confirm_pending`] or by
    /// dropping the pending add.
    StandConflict {
        /// The add to replay if the customer confirms the switch.
        pending: PendingAdd,
        /// The stand the cart is currently bound to.
        current: StandBinding,
    },
}

/// Result of [`Cart::update_quantity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Quantity set to the requested value.
    Updated,
    /// Quantity was 0, the line was removed.
    Removed,
    /// The stock bound would be exceeded; the cart is unchanged.
    StockLimited {
        /// The declared stock bound for the product.
        available: u32,
    },
    /// No line with that product ID exists; the cart is unchanged.
    NotFound,
}

/// Cart contents plus the panel-visibility flag and the active-stand binding.
///
/// All mutation goes through the methods here; the storefront persists
/// [`Cart::lines`] to the session after every line mutation and rebuilds the
/// cart with [`Cart::from_lines`] on the next request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    is_open: bool,
    stand: Option<StandBinding>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from persisted lines.
    ///
    /// Zero-quantity lines are dropped defensively; the stand binding is
    /// restored from the first line's product.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut lines = lines;
        lines.retain(|line| line.quantity >= 1);

        let stand = lines.first().map(|line| StandBinding {
            id: line.product.stand_id.clone(),
            name: line.product.stand_name.clone(),
        });

        Self {
            lines,
            is_open: false,
            stand,
        }
    }

    /// Add a product to the cart.
    ///
    /// A quantity of 0 is treated as 1. Merges into an existing line for the
    /// same product ID, saturating at `u32::MAX`; binds the stand when the
    /// cart was empty. Stock-bound rejections and cross-stand conflicts
    /// leave the cart untouched.
    pub fn add_item(&mut self, product: Product, quantity: u32) -> AddOutcome {
        let quantity = quantity.max(1);

        if !self.lines.is_empty()
            && let Some(current) = &self.stand
            && current.id != product.stand_id
        {
            return AddOutcome::StandConflict {
                pending: PendingAdd { product, quantity },
                current: current.clone(),
            };
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.id == product.id)
        {
            let new_quantity = line.quantity.saturating_add(quantity);
            if let Some(stock) = line.product.stock
                && new_quantity > stock
            {
                return AddOutcome::StockLimited { available: stock };
            }
            line.quantity = new_quantity;
            return AddOutcome::Added;
        }

        if let Some(stock) = product.stock
            && quantity > stock
        {
            return AddOutcome::StockLimited { available: stock };
        }

        // Bind the stand only once the add is known to succeed, so a
        // rejected add on an empty cart leaves it unbound.
        if self.lines.is_empty() {
            self.stand = Some(StandBinding {
                id: product.stand_id.clone(),
                name: product.stand_name.clone(),
            });
        }

        self.lines.push(CartLine { product, quantity });
        AddOutcome::Added
    }

    /// Confirm a stand switch: atomically replace the entire cart with the
    /// pending line and rebind to its stand. Opens the cart panel.
    pub fn confirm_pending(&mut self, pending: PendingAdd) {
        self.stand = Some(StandBinding {
            id: pending.product.stand_id.clone(),
            name: pending.product.stand_name.clone(),
        });
        self.lines = vec![CartLine {
            product: pending.product,
            quantity: pending.quantity.max(1),
        }];
        self.is_open = true;
    }

    /// Set a line's quantity to an absolute value.
    ///
    /// A quantity of 0 removes the line, exactly like [`Cart::remove_item`].
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) -> UpdateOutcome {
        if quantity == 0 {
            let existed = self.lines.iter().any(|line| &line.product.id == product_id);
            self.remove_item(product_id);
            return if existed {
                UpdateOutcome::Removed
            } else {
                UpdateOutcome::NotFound
            };
        }

        let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| &line.product.id == product_id)
        else {
            return UpdateOutcome::NotFound;
        };

        if let Some(stock) = line.product.stock
            && quantity > stock
        {
            return UpdateOutcome::StockLimited { available: stock };
        }

        line.quantity = quantity;
        UpdateOutcome::Updated
    }

    /// Drop the line for a product. No-op when absent, never errors.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.lines.retain(|line| &line.product.id != product_id);
        if self.lines.is_empty() {
            self.stand = None;
        }
    }

    /// Empty the cart and clear the stand binding.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.stand = None;
    }

    /// Toggle the cart panel visibility. Lines are unaffected.
    pub fn toggle_open(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Close the cart panel. Lines are unaffected.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Restore the visibility flag after rehydration.
    pub fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    /// Whether the cart panel is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// The line items, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The active-stand binding, `None` exactly when the cart is empty.
    #[must_use]
    pub const fn stand(&self) -> Option<&StandBinding> {
        self.stand.as_ref()
    }

    /// Sum of all line quantities. Recomputed on every call.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of all line subtotals. Recomputed on every call.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{ProductId, StandId};

    fn product(id: &str, stand: &str, price_cents: i64, stock: Option<u32>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Produto {id}"),
            price: Decimal::new(price_cents, 2),
            description: String::new(),
            stand_id: StandId::new(stand),
            stand_name: format!("Barraca {stand}"),
            image: None,
            stock,
        }
    }

    #[test]
    fn test_add_binds_stand_and_totals() {
        let mut cart = Cart::new();
        assert!(cart.stand().is_none());

        let outcome = cart.add_item(product("p1", "s1", 1000, None), 2);
        assert_eq!(outcome, AddOutcome::Added);

        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.total_price(), Decimal::new(2000, 2));
        assert_eq!(cart.stand().unwrap().id, StandId::new("s1"));
    }

    #[test]
    fn test_add_merges_existing_line() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "s1", 1000, None), 1);
        cart.add_item(product("p1", "s1", 1000, None), 3);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_items(), 4);
    }

    #[test]
    fn test_add_merge_saturates_instead_of_overflowing() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "s1", 1000, None), 2);

        // quantities come straight from the request form; an absurd value
        // must cap at u32::MAX, never wrap
        let outcome = cart.add_item(product("p1", "s1", 1000, None), u32::MAX);

        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_add_merge_near_max_rejected_by_stock_bound() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "s1", 1000, Some(10)), 2);

        let outcome = cart.add_item(product("p1", "s1", 1000, Some(10)), u32::MAX);

        assert_eq!(outcome, AddOutcome::StockLimited { available: 10 });
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_add_zero_quantity_treated_as_one() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "s1", 1000, None), 0);
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_stock_limited_add_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "s1", 1000, Some(3)), 2);

        let before = serde_json::to_string(cart.lines()).unwrap();
        let outcome = cart.add_item(product("p1", "s1", 1000, Some(3)), 2);

        assert_eq!(outcome, AddOutcome::StockLimited { available: 3 });
        assert_eq!(serde_json::to_string(cart.lines()).unwrap(), before);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_stock_limited_new_line_leaves_cart_unbound() {
        let mut cart = Cart::new();
        let outcome = cart.add_item(product("p1", "s1", 1000, Some(1)), 5);

        assert_eq!(outcome, AddOutcome::StockLimited { available: 1 });
        assert!(cart.is_empty());
        assert!(cart.stand().is_none());
    }

    #[test]
    fn test_cross_stand_add_is_conflict_not_merge() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "s1", 1000, None), 1);

        let outcome = cart.add_item(product("p2", "s2", 500, None), 1);
        let AddOutcome::StandConflict { pending, current } = outcome else {
            panic!("expected a stand conflict");
        };
        assert_eq!(current.id, StandId::new("s1"));

        // declined: the pending add is dropped, cart keeps only p1
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].product.id, ProductId::new("p1"));

        // confirmed: the cart holds only p2 and rebinds to s2
        cart.confirm_pending(pending);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].product.id, ProductId::new("p2"));
        assert_eq!(cart.stand().unwrap().id, StandId::new("s2"));
    }

    #[test]
    fn test_update_zero_equals_remove() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "s1", 1000, None), 2);
        cart.add_item(product("p2", "s1", 500, None), 1);

        let mut updated = cart.clone();
        let mut removed = cart.clone();

        assert_eq!(
            updated.update_quantity(&ProductId::new("p1"), 0),
            UpdateOutcome::Removed
        );
        removed.remove_item(&ProductId::new("p1"));

        assert_eq!(updated, removed);
    }

    #[test]
    fn test_update_is_absolute_not_delta() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "s1", 1000, None), 5);

        assert_eq!(
            cart.update_quantity(&ProductId::new("p1"), 2),
            UpdateOutcome::Updated
        );
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_update_rejects_over_stock() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "s1", 1000, Some(4)), 2);

        let outcome = cart.update_quantity(&ProductId::new("p1"), 9);
        assert_eq!(outcome, UpdateOutcome::StockLimited { available: 4 });
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_update_missing_line_is_not_found() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.update_quantity(&ProductId::new("ghost"), 3),
            UpdateOutcome::NotFound
        );
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "s1", 1000, None), 1);
        cart.remove_item(&ProductId::new("ghost"));
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_unbinds_exactly_when_empty() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "s1", 1000, None), 1);
        assert!(cart.stand().is_some());

        cart.remove_item(&ProductId::new("p1"));
        assert!(cart.stand().is_none());

        cart.add_item(product("p2", "s2", 500, None), 1);
        assert_eq!(cart.stand().unwrap().id, StandId::new("s2"));

        cart.clear();
        assert!(cart.stand().is_none());
    }

    #[test]
    fn test_visibility_flag_does_not_touch_lines() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "s1", 1000, None), 1);

        let before = cart.lines().to_vec();
        cart.toggle_open();
        assert!(cart.is_open());
        cart.close();
        assert!(!cart.is_open());
        assert_eq!(cart.lines(), before.as_slice());
    }

    #[test]
    fn test_persist_reload_round_trip() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "s1", 1050, Some(5)), 2);
        cart.add_item(product("p2", "s1", 300, None), 1);

        let serialized = serde_json::to_string(cart.lines()).unwrap();
        let lines: Vec<CartLine> = serde_json::from_str(&serialized).unwrap();
        let restored = Cart::from_lines(lines);

        assert_eq!(restored.lines(), cart.lines());
        assert_eq!(restored.total_items(), cart.total_items());
        assert_eq!(restored.total_price(), cart.total_price());
        assert_eq!(restored.stand(), cart.stand());
    }

    #[test]
    fn test_from_lines_drops_zero_quantity_lines() {
        let lines = vec![
            CartLine {
                product: product("p1", "s1", 1000, None),
                quantity: 0,
            },
            CartLine {
                product: product("p2", "s1", 500, None),
                quantity: 2,
            },
        ];
        let cart = Cart::from_lines(lines);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_checkout_scenario_end_to_end() {
        let mut cart = Cart::new();

        cart.add_item(product("p1", "s1", 1000, None), 2);
        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.total_price(), Decimal::new(2000, 2));

        let outcome = cart.add_item(product("p2", "s2", 700, None), 1);
        let AddOutcome::StandConflict { pending, .. } = outcome else {
            panic!("expected a stand conflict");
        };
        cart.confirm_pending(pending);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].product.id, ProductId::new("p2"));
        assert_eq!(cart.stand().unwrap().id, StandId::new("s2"));
        assert_eq!(cart.total_price(), Decimal::new(700, 2));
    }
}
