//! Product detail route handler and customization pricing.
//!
//! The detail page renders a customization form whose options depend on the
//! product name: combos pick a drink, burgers pick a meat point and priced
//! extras. The selected options are folded into the unit price and into the
//! product description before the item reaches the cart, so the cart and
//! the order record see one self-contained customized product.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use ifacens_core::{Product, ProductId, currency::format_brl};

use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Priced extras offered on burgers: (form field, label, surcharge in cents).
pub const EXTRAS: &[(&str, &str, i64)] = &[
    ("extra_bacon", "Bacon extra", 300),
    ("extra_queijo", "Queijo extra", 200),
    ("extra_cebola", "Cebola caramelizada", 250),
    ("extra_molho", "Molho especial", 150),
];

/// Drink choices offered on combos. The first entry is the default.
pub const DRINKS: &[&str] = &["Coca-cola", "Pepsi", "Guaraná", "Água mineral"];

/// Meat point choices offered on burgers. "Ao ponto" is the default.
pub const MEAT_POINTS: &[&str] = &["Mal passado", "Ao ponto", "Bem passado"];

/// Whether the product takes a drink choice.
#[must_use]
pub fn is_combo(product: &Product) -> bool {
    product.name.to_lowercase().contains("combo")
}

/// Whether the product takes a meat point and extras.
#[must_use]
pub fn is_burger(product: &Product) -> bool {
    product.name.to_lowercase().contains("x-")
}

/// Add-to-cart form data, customization options included.
///
/// Checkbox extras arrive as individual fields so a plain HTML form posts
/// them without JavaScript.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
    pub drink: Option<String>,
    pub meat_point: Option<String>,
    pub size: Option<String>,
    pub extra_bacon: Option<String>,
    pub extra_queijo: Option<String>,
    pub extra_cebola: Option<String>,
    pub extra_molho: Option<String>,
}

impl AddToCartForm {
    fn extra_selected(&self, field: &str) -> bool {
        let value = match field {
            "extra_bacon" => &self.extra_bacon,
            "extra_queijo" => &self.extra_queijo,
            "extra_cebola" => &self.extra_cebola,
            "extra_molho" => &self.extra_molho,
            _ => &None,
        };
        value.is_some()
    }
}

/// Fold the selected options into the product.
///
/// Returns the product with its description annotated
/// (`"... (Bebida: Pepsi | Extras: Bacon extra)"`) and its unit price raised
/// by the selected surcharges. With no options selected the product passes
/// through unchanged, so plain items never grow an empty annotation.
#[must_use]
pub fn apply_customization(product: &Product, form: &AddToCartForm) -> Product {
    let mut parts: Vec<String> = Vec::new();
    let mut unit_price = product.price;

    if let Some(drink) = form.drink.as_deref().filter(|d| !d.is_empty()) {
        parts.push(format!("Bebida: {drink}"));
    }
    if let Some(point) = form.meat_point.as_deref().filter(|p| !p.is_empty()) {
        parts.push(format!("Ponto da carne: {point}"));
    }
    if let Some(size) = form.size.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("Tamanho: {size}"));
    }

    let mut selected_extras: Vec<&str> = Vec::new();
    for &(field, label, cents) in EXTRAS {
        if form.extra_selected(field) {
            selected_extras.push(label);
            unit_price += Decimal::new(cents, 2);
        }
    }
    if !selected_extras.is_empty() {
        parts.push(format!("Extras: {}", selected_extras.join(", ")));
    }

    if parts.is_empty() {
        product.clone()
    } else {
        product.customized(&parts.join(" | "), unit_price)
    }
}

/// An extra as rendered in the detail form.
pub struct ExtraView {
    pub field: &'static str,
    pub label: &'static str,
    pub surcharge: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub stand_name: String,
    pub price: String,
    pub image: Option<String>,
    pub stock: Option<u32>,
    pub sold_out: bool,
    pub is_combo: bool,
    pub is_burger: bool,
    pub drinks: &'static [&'static str],
    pub meat_points: &'static [&'static str],
    pub extras: Vec<ExtraView>,
}

/// Display the product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let product_id = ProductId::new(id);
    let product = state.supabase().get_product(&product_id).await?;

    let extras = EXTRAS
        .iter()
        .map(|&(field, label, cents)| ExtraView {
            field,
            label,
            surcharge: format_brl(Decimal::new(cents, 2)),
        })
        .collect();

    Ok(ProductShowTemplate {
        id: product.id.as_str().to_string(),
        name: product.name.clone(),
        description: product.description.clone(),
        stand_name: product.stand_name.clone(),
        price: format_brl(product.price),
        image: product.image.clone(),
        stock: product.stock,
        sold_out: product.stock == Some(0),
        is_combo: is_combo(&product),
        is_burger: is_burger(&product),
        drinks: DRINKS,
        meat_points: MEAT_POINTS,
        extras,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ifacens_core::StandId;

    fn burger() -> Product {
        Product {
            id: ProductId::new("prod-1"),
            name: "X-Tudo".to_string(),
            price: Decimal::new(1800, 2),
            description: "Completo".to_string(),
            stand_id: StandId::new("stand-1"),
            stand_name: "Lanches".to_string(),
            image: None,
            stock: Some(5),
        }
    }

    fn empty_form(product_id: &str) -> AddToCartForm {
        AddToCartForm {
            product_id: product_id.to_string(),
            quantity: None,
            drink: None,
            meat_point: None,
            size: None,
            extra_bacon: None,
            extra_queijo: None,
            extra_cebola: None,
            extra_molho: None,
        }
    }

    #[test]
    fn test_no_options_passes_product_through() {
        let product = burger();
        let customized = apply_customization(&product, &empty_form("prod-1"));
        assert_eq!(customized.description, "Completo");
        assert_eq!(customized.price, product.price);
    }

    #[test]
    fn test_extras_raise_unit_price_and_annotate() {
        let product = burger();
        let mut form = empty_form("prod-1");
        form.extra_bacon = Some("on".to_string());
        form.extra_molho = Some("on".to_string());
        form.meat_point = Some("Ao ponto".to_string());

        let customized = apply_customization(&product, &form);

        // 18.00 + 3.00 + 1.50
        assert_eq!(customized.price, Decimal::new(2250, 2));
        assert_eq!(
            customized.description,
            "Completo (Ponto da carne: Ao ponto | Extras: Bacon extra, Molho especial)"
        );
    }

    #[test]
    fn test_drink_annotates_without_surcharge() {
        let mut product = burger();
        product.name = "Combo X-Salada".to_string();
        let mut form = empty_form("prod-1");
        form.drink = Some("Guaraná".to_string());

        let customized = apply_customization(&product, &form);

        assert_eq!(customized.price, product.price);
        assert_eq!(customized.description, "Completo (Bebida: Guaraná)");
    }

    #[test]
    fn test_combo_and_burger_detection() {
        let mut product = burger();
        assert!(is_burger(&product));
        assert!(!is_combo(&product));

        product.name = "Combo Pastel".to_string();
        assert!(is_combo(&product));

        product.name = "Suco de Laranja".to_string();
        assert!(!is_combo(&product));
        assert!(!is_burger(&product));
    }
}
