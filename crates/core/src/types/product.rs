//! The `Product` value type.
//!
//! Products are immutable once fetched from the catalog. Customizing a
//! product (combo drink, extras, ...) derives a *new* value via
//! [`Product::customized`]; the original is never mutated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, StandId};

/// A product offered by a stand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price in BRL. Non-negative.
    pub price: Decimal,
    /// Free-text description.
    pub description: String,
    /// Owning stand.
    pub stand_id: StandId,
    /// Owning stand's display name (join-derived, kept for cart display).
    pub stand_name: String,
    /// Optional image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Remaining stock. `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl Product {
    /// Derive a customized variant of this product.
    ///
    /// The option summary is appended to the description and the unit price
    /// is replaced with the recomputed one (base price plus priced extras).
    /// The result is a distinct value; the catalog product is untouched.
    #[must_use]
    pub fn customized(&self, option_summary: &str, unit_price: Decimal) -> Self {
        let description = if option_summary.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({option_summary})", self.description)
        };

        Self {
            description,
            price: unit_price,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "X-Salada".to_string(),
            price: Decimal::new(1500, 2),
            description: "Hambúrguer com salada".to_string(),
            stand_id: StandId::new("s1"),
            stand_name: "Barraca do João".to_string(),
            image: None,
            stock: Some(10),
        }
    }

    #[test]
    fn test_customized_appends_summary_and_reprices() {
        let base = product();
        let custom = base.customized("Extras: Bacon extra", Decimal::new(1800, 2));

        assert_eq!(custom.description, "Hambúrguer com salada (Extras: Bacon extra)");
        assert_eq!(custom.price, Decimal::new(1800, 2));
        // the original value is untouched
        assert_eq!(base.price, Decimal::new(1500, 2));
        assert_eq!(base.description, "Hambúrguer com salada");
        // identity and stand binding carry over
        assert_eq!(custom.id, base.id);
        assert_eq!(custom.stand_id, base.stand_id);
    }

    #[test]
    fn test_customized_empty_summary_keeps_description() {
        let base = product();
        let custom = base.customized("", Decimal::new(1500, 2));
        assert_eq!(custom.description, base.description);
    }
}
