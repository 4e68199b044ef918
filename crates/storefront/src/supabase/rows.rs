//! Wire types for the PostgREST API and their domain conversions.
//!
//! Row structs mirror the Supabase table shapes; conversions into the
//! domain types from `ifacens-core` happen here so the rest of the crate
//! never sees raw JSON shapes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ifacens_core::{Product, ProductId, StandId};

/// A food-court stand as shown on the home page.
#[derive(Debug, Clone)]
pub struct Stand {
    /// Stand ID.
    pub id: StandId,
    /// Display name.
    pub name: String,
    /// Optional short description.
    pub description: Option<String>,
    /// Optional logo or banner image URL.
    pub image: Option<String>,
}

// =============================================================================
// Read Rows
// =============================================================================

/// Row shape of `GET /rest/v1/stands`.
#[derive(Debug, Deserialize)]
pub struct StandRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<StandRow> for Stand {
    fn from(row: StandRow) -> Self {
        Self {
            id: StandId::new(row.id),
            name: row.name,
            description: row.description,
            image: row.image_url,
        }
    }
}

/// Row shape of `GET /rest/v1/products?select=*,stands!inner(name)`.
///
/// Prices arrive as JSON numbers from the `numeric` column; the conversion
/// rounds to two decimal places so cart math never carries float residue.
#[derive(Debug, Deserialize)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub stand_id: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: Option<u32>,
    pub stands: StandJoinRow,
}

/// The embedded stand join (`stands!inner(name)`).
#[derive(Debug, Deserialize)]
pub struct StandJoinRow {
    pub name: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let price = Decimal::from_f64_retain(row.price)
            .unwrap_or_default()
            .round_dp(2);

        Self {
            id: ProductId::new(row.id),
            name: row.name,
            price,
            description: row.description.unwrap_or_default(),
            stand_id: StandId::new(row.stand_id),
            stand_name: row.stands.name,
            image: row.image_url,
            stock: row.stock,
        }
    }
}

// =============================================================================
// Write Rows
// =============================================================================

/// Insert body for `POST /rest/v1/orders`.
#[derive(Debug, Serialize)]
pub struct InsertOrder {
    pub customer_name: String,
    pub transaction_id: String,
    pub stand_id: String,
    pub total_amount: Decimal,
}

/// Insert body for `POST /rest/v1/order_items` (posted as an array).
#[derive(Debug, Serialize)]
pub struct InsertOrderItem {
    pub order_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// The representation returned by the order insert. Only the generated ID
/// is needed for the line inserts.
#[derive(Debug, Deserialize)]
pub struct CreatedOrderRow {
    pub id: String,
}
