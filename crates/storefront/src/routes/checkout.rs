//! Checkout route handlers.
//!
//! The checkout is a two-screen flow: a name form, then the payment screen
//! with the generated PIX copy-and-paste code and the WhatsApp receipt
//! link. The order is written to Supabase before the payment screen
//! renders, but a failed write only downgrades the screen with a notice,
//! the customer can still pay and send the receipt.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ifacens_core::{
    currency::{format_amount, format_brl},
    pix::{build_payment_code, generate_transaction_id},
    whatsapp::{OrderSummaryLine, order_link},
};

use crate::error::Result;
use crate::filters;
use crate::models::session::{load_cart, save_cart};
use crate::routes::cart::CartView;
use crate::state::AppState;
use crate::supabase::NewOrderLine;

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub customer_name: String,
}

/// Customer name form template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/name.html")]
pub struct CheckoutNameTemplate {
    pub cart: CartView,
    pub name_error: Option<String>,
}

/// Payment screen template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentTemplate {
    pub customer_name: String,
    pub transaction_id: String,
    pub payment_code: String,
    pub total: String,
    pub whatsapp_link: String,
    pub order_recorded: bool,
}

/// Checkout error template, rendered inline with a way back home.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/error.html")]
pub struct CheckoutErrorTemplate {
    pub message: String,
}

/// Display the customer name form. An empty cart redirects home.
#[instrument(skip(session))]
pub async fn name_form(session: Session) -> Result<Response> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(CheckoutNameTemplate {
        cart: CartView::from(&cart),
        name_error: None,
    }
    .into_response())
}

/// Generate the PIX code, record the order and render the payment screen.
#[instrument(skip(state, session, form))]
pub async fn pay(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let cart = load_cart(&session).await?;

    if cart.is_empty() {
        return Ok(CheckoutErrorTemplate {
            message: "Seu carrinho está vazio.".to_string(),
        }
        .into_response());
    }

    let total = cart.total_price();
    if total <= Decimal::ZERO {
        tracing::warn!(%total, "Checkout with non-positive total");
        return Ok(CheckoutErrorTemplate {
            message: "O total do pedido precisa ser maior que zero.".to_string(),
        }
        .into_response());
    }

    let customer_name = form.customer_name.trim().to_string();
    if customer_name.is_empty() {
        return Ok(CheckoutNameTemplate {
            cart: CartView::from(&cart),
            name_error: Some("Informe seu nome para continuar.".to_string()),
        }
        .into_response());
    }

    let transaction_id = generate_transaction_id();
    let pix = &state.config().pix;
    let payment_code = match build_payment_code(
        &pix.key,
        &pix.merchant_name,
        &pix.merchant_city,
        &format_amount(total),
        Some(&transaction_id),
    ) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Failed to assemble PIX payload: {e}");
            sentry::capture_error(&e);
            return Ok(CheckoutErrorTemplate {
                message: "Não foi possível gerar o código PIX. Tente novamente.".to_string(),
            }
            .into_response());
        }
    };

    // Record the order. A write failure is logged and reported but does not
    // block the payment screen.
    let order_recorded = match cart.stand() {
        Some(stand) => {
            let lines: Vec<NewOrderLine> = cart
                .lines()
                .iter()
                .map(|line| NewOrderLine {
                    product_id: line.product.id.clone(),
                    quantity: line.quantity,
                    unit_price: line.product.price,
                })
                .collect();

            match state
                .supabase()
                .create_order(&customer_name, &transaction_id, &stand.id, &lines, total)
                .await
            {
                Ok(order_id) => {
                    tracing::info!(%order_id, "Order recorded");
                    true
                }
                Err(e) => {
                    tracing::error!("Failed to record order: {e}");
                    sentry::capture_error(&e);
                    false
                }
            }
        }
        None => false,
    };

    let summary: Vec<OrderSummaryLine> = cart
        .lines()
        .iter()
        .map(|line| OrderSummaryLine {
            name: line.product.name.clone(),
            quantity: line.quantity,
            unit_price: line.product.price,
        })
        .collect();
    let whatsapp_link = order_link(
        &state.config().whatsapp_number,
        &customer_name,
        &summary,
        total,
        &transaction_id,
    );

    Ok(PaymentTemplate {
        customer_name,
        transaction_id,
        payment_code,
        total: format_brl(total),
        whatsapp_link,
        order_recorded,
    }
    .into_response())
}

/// Finish the flow: clear the cart and go home.
#[instrument(skip(session))]
pub async fn complete(session: Session) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/").into_response())
}
