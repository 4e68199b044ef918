//! Session-stored cart state.
//!
//! The cart lives entirely in the visitor's session: the lines under one
//! key, the drawer-open flag under another, and a parked pending add while
//! a stand conflict waits for the visitor's decision. Corrupt session data
//! is discarded rather than surfaced, the visitor just sees an empty cart.

use tower_sessions::Session;

use ifacens_core::{Cart, CartLine, PendingAdd};

use crate::error::Result;

/// Session keys for cart data.
pub mod keys {
    /// Key for the cart lines.
    pub const CART_LINES: &str = "ifacens-cart";

    /// Key for the cart drawer open/closed flag.
    pub const CART_OPEN: &str = "ifacens-cart-open";

    /// Key for an add parked behind a stand-conflict prompt.
    pub const PENDING_ADD: &str = "ifacens-pending-add";
}

/// Load the cart from the session.
///
/// Unreadable or missing lines yield an empty cart; the stand binding is
/// rebuilt from the lines themselves.
///
/// # Errors
///
/// Returns an error if the session store itself fails.
pub async fn load_cart(session: &Session) -> Result<Cart> {
    let lines: Vec<CartLine> = match session.get(keys::CART_LINES).await {
        Ok(Some(lines)) => lines,
        Ok(None) => Vec::new(),
        Err(error) => {
            tracing::warn!(%error, "Discarding unreadable cart from session");
            session.remove::<Vec<CartLine>>(keys::CART_LINES).await.ok();
            Vec::new()
        }
    };

    let is_open = session
        .get::<bool>(keys::CART_OPEN)
        .await
        .unwrap_or_default()
        .unwrap_or(false);

    let mut cart = Cart::from_lines(lines);
    cart.set_open(is_open);
    Ok(cart)
}

/// Persist the cart back to the session.
///
/// An empty cart removes its key entirely instead of storing an empty list.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    if cart.is_empty() {
        session.remove::<Vec<CartLine>>(keys::CART_LINES).await?;
    } else {
        session.insert(keys::CART_LINES, cart.lines()).await?;
    }
    session.insert(keys::CART_OPEN, cart.is_open()).await?;
    Ok(())
}

/// Park an add behind the stand-conflict prompt.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn store_pending(session: &Session, pending: &PendingAdd) -> Result<()> {
    session.insert(keys::PENDING_ADD, pending).await?;
    Ok(())
}

/// Take the parked add out of the session, if any.
///
/// Removes the key either way, so a decline and a confirm both clear it.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn take_pending(session: &Session) -> Result<Option<PendingAdd>> {
    Ok(session.remove::<PendingAdd>(keys::PENDING_ADD).await?)
}
