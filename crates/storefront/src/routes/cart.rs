//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart lines live in the visitor's session; every mutation loads the
//! cart, applies one state-machine operation from `ifacens-core` and saves
//! the lines back. A cross-stand add is parked in the session and answered
//! by the confirm/decline endpoints.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ifacens_core::{AddOutcome, Cart, CartLine, ProductId, UpdateOutcome, currency::format_brl};

use crate::error::Result;
use crate::filters;
use crate::models::session::{load_cart, save_cart, store_pending, take_pending};
use crate::routes::products::{AddToCartForm, apply_customization};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_price: String,
    pub image: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub stand_name: Option<String>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            stand_name: None,
            total: format_brl(rust_decimal::Decimal::ZERO),
            item_count: 0,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            stand_name: cart.stand().map(|stand| stand.name.clone()),
            total: format_brl(cart.total_price()),
            item_count: cart.total_items(),
        }
    }
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id.as_str().to_string(),
            name: line.product.name.clone(),
            description: line.product.description.clone(),
            quantity: line.quantity,
            unit_price: format_brl(line.product.price),
            line_price: format_brl(line.subtotal()),
            image: line.product.image.clone(),
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Stand-conflict prompt fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/stand_conflict.html")]
pub struct StandConflictTemplate {
    pub product_name: String,
    pub new_stand: String,
    pub current_stand: String,
}

/// Stock-limit notice fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/stock_limit.html")]
pub struct StockLimitTemplate {
    pub product_name: String,
    pub available: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Response> {
    let cart = load_cart(&session).await?;
    Ok(CartShowTemplate {
        cart: CartView::from(&cart),
    }
    .into_response())
}

/// Add item to cart (HTMX).
///
/// Fetches the product fresh so the stock snapshot is as recent as
/// possible, folds the customization options into it, and runs the cart
/// add. A cross-stand conflict parks the add in the session and renders the
/// confirmation prompt instead of mutating anything.
#[instrument(skip(state, session, form))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id.clone());
    let product = state.supabase().get_product(&product_id).await?;
    let customized = apply_customization(&product, &form);
    let quantity = form.quantity.unwrap_or(1);

    let mut cart = load_cart(&session).await?;
    match cart.add_item(customized, quantity) {
        AddOutcome::Added => {
            save_cart(&session, &cart).await?;
            Ok((
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartCountTemplate {
                    count: cart.total_items(),
                },
            )
                .into_response())
        }
        AddOutcome::StockLimited { available } => Ok(StockLimitTemplate {
            product_name: product.name,
            available,
        }
        .into_response()),
        AddOutcome::StandConflict { pending, current } => {
            let new_stand = pending.product.stand_name.clone();
            let product_name = pending.product.name.clone();
            store_pending(&session, &pending).await?;
            Ok(StandConflictTemplate {
                product_name,
                new_stand,
                current_stand: current.name,
            }
            .into_response())
        }
    }
}

/// Confirm a parked cross-stand add, replacing the cart (HTMX).
#[instrument(skip(session))]
pub async fn confirm(session: Session) -> Result<Response> {
    let mut cart = load_cart(&session).await?;

    if let Some(pending) = take_pending(&session).await? {
        cart.confirm_pending(pending);
        save_cart(&session, &cart).await?;
    } else {
        tracing::warn!("Confirm with no pending add in session");
    }

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Discard a parked cross-stand add, keeping the cart (HTMX).
#[instrument(skip(session))]
pub async fn decline(session: Session) -> Result<Response> {
    take_pending(&session).await?;
    let cart = load_cart(&session).await?;
    Ok(CartItemsTemplate {
        cart: CartView::from(&cart),
    }
    .into_response())
}

/// Set a cart line's quantity (HTMX). Quantity 0 removes the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);
    let mut cart = load_cart(&session).await?;

    match cart.update_quantity(&product_id, form.quantity) {
        UpdateOutcome::Updated | UpdateOutcome::Removed => {
            save_cart(&session, &cart).await?;
            Ok((
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartItemsTemplate {
                    cart: CartView::from(&cart),
                },
            )
                .into_response())
        }
        UpdateOutcome::StockLimited { available } => {
            let product_name = cart
                .lines()
                .iter()
                .find(|line| line.product.id == product_id)
                .map(|line| line.product.name.clone())
                .unwrap_or_default();
            Ok(StockLimitTemplate {
                product_name,
                available,
            }
            .into_response())
        }
        UpdateOutcome::NotFound => Ok(CartItemsTemplate {
            cart: CartView::from(&cart),
        }
        .into_response()),
    }
}

/// Remove item from cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);
    let mut cart = load_cart(&session).await?;

    cart.remove_item(&product_id);
    save_cart(&session, &cart).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Toggle the cart drawer open or closed (HTMX).
#[instrument(skip(session))]
pub async fn toggle(session: Session) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    cart.toggle_open();
    save_cart(&session, &cart).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;
    Ok(CartCountTemplate {
        count: cart.total_items(),
    })
}
