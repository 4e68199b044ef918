//! Supabase PostgREST client.
//!
//! # Architecture
//!
//! - Supabase is the source of truth for stands, products and orders - no
//!   local database, direct REST calls only
//! - Catalog reads are cached in-memory via `moka` (60 second TTL)
//! - Order writes are never cached
//!
//! The client returns `Result` everywhere; it is the route handlers that
//! decide to degrade catalog failures to empty lists. Order creation is a
//! two-step write (header row, then line rows) and is deliberately not
//! transactional: a failure on the second step leaves the orphaned header
//! in Supabase and reports overall failure.

mod cache;
mod rows;

pub use rows::Stand;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use ifacens_core::{OrderId, Product, ProductId, StandId};

use crate::config::SupabaseConfig;
use cache::CacheValue;
use rows::{CreatedOrderRow, InsertOrder, InsertOrderItem, ProductRow, StandRow};

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Supabase returned a non-success status.
    #[error("Supabase API error: HTTP {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated for logging.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// One order line to persist, as captured from the cart at checkout.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    /// Product being ordered.
    pub product_id: ProductId,
    /// Quantity ordered.
    pub quantity: u32,
    /// Unit price at the time of checkout (customized price included).
    pub unit_price: Decimal,
}

/// Client for the Supabase PostgREST API.
///
/// Cheaply cloneable via `Arc`. Catalog responses are cached for 60 seconds.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    cache: Cache<String, CacheValue>,
}

impl SupabaseClient {
    /// Create a new Supabase client.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(Duration::from_secs(60))
            .build();

        Self {
            inner: Arc::new(SupabaseClientInner {
                client: reqwest::Client::new(),
                base_url: config.url.trim_end_matches('/').to_string(),
                anon_key: config.anon_key.expose_secret().to_string(),
                cache,
            }),
        }
    }

    /// Execute a GET against `/rest/v1/{path_and_query}` and decode the rows.
    async fn get_rows<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
    ) -> Result<Vec<T>, SupabaseError> {
        let url = format!("{}/rest/v1/{path_and_query}", self.inner.base_url);

        let response = self
            .inner
            .client
            .get(&url)
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", format!("Bearer {}", self.inner.anon_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Supabase returned non-success status"
            );
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Execute a POST against `/rest/v1/{path}` with a JSON body.
    async fn post_rows<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        want_representation: bool,
    ) -> Result<String, SupabaseError> {
        let url = format!("{}/rest/v1/{path}", self.inner.base_url);
        let prefer = if want_representation {
            "return=representation"
        } else {
            "return=minimal"
        };

        let response = self
            .inner
            .client
            .post(&url)
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", format!("Bearer {}", self.inner.anon_key))
            .header("Content-Type", "application/json")
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Supabase insert failed"
            );
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        Ok(text)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// List all stands.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_stands(&self) -> Result<Vec<Stand>, SupabaseError> {
        let cache_key = "stands".to_string();

        if let Some(CacheValue::Stands(stands)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for stands");
            return Ok(stands);
        }

        let rows: Vec<StandRow> = self.get_rows("stands?select=*&order=name").await?;
        let stands: Vec<Stand> = rows.into_iter().map(Stand::from).collect();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Stands(stands.clone()))
            .await;

        Ok(stands)
    }

    /// List the products of one stand, joined to the stand name.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(stand_id = %stand_id))]
    pub async fn list_products(&self, stand_id: &StandId) -> Result<Vec<Product>, SupabaseError> {
        let cache_key = format!("products:{stand_id}");

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let query = format!(
            "products?select=*,stands!inner(name)&stand_id=eq.{stand_id}&order=name"
        );
        let rows: Vec<ProductRow> = self.get_rows(&query).await?;
        let products: Vec<Product> = rows.into_iter().map(Product::from).collect();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Fetch a single product by ID.
    ///
    /// Not cached: the detail page wants the freshest stock snapshot
    /// available before an add-to-cart.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::NotFound`] when no row matches, or an error
    /// if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, SupabaseError> {
        let query = format!(
            "products?select=*,stands!inner(name)&id=eq.{product_id}&limit=1"
        );
        let rows: Vec<ProductRow> = self.get_rows(&query).await?;

        rows.into_iter()
            .next()
            .map(Product::from)
            .ok_or_else(|| SupabaseError::NotFound(format!("Product not found: {product_id}")))
    }

    // =========================================================================
    // Order Methods (never cached)
    // =========================================================================

    /// Create an order: one header row, then its line rows.
    ///
    /// The two inserts are not transactional from this side - if the line
    /// insert fails, the header row stays behind in Supabase and this method
    /// reports failure. Callers treat that failure as non-fatal to the
    /// payment flow.
    ///
    /// # Errors
    ///
    /// Returns an error when either insert fails or when the header response
    /// cannot be decoded.
    #[instrument(skip(self, lines), fields(stand_id = %stand_id, transaction_id = %transaction_id))]
    pub async fn create_order(
        &self,
        customer_name: &str,
        transaction_id: &str,
        stand_id: &StandId,
        lines: &[NewOrderLine],
        total_amount: Decimal,
    ) -> Result<OrderId, SupabaseError> {
        let header = InsertOrder {
            customer_name: customer_name.to_string(),
            transaction_id: transaction_id.to_string(),
            stand_id: stand_id.as_str().to_string(),
            total_amount,
        };

        let body = self.post_rows("orders", &header, true).await?;
        let created: Vec<CreatedOrderRow> = serde_json::from_str(&body)?;
        let order_id = created
            .into_iter()
            .next()
            .map(|row| OrderId::new(row.id))
            .ok_or_else(|| SupabaseError::NotFound("order insert returned no row".to_string()))?;

        let items: Vec<InsertOrderItem> = lines
            .iter()
            .map(|line| InsertOrderItem {
                order_id: order_id.as_str().to_string(),
                product_id: line.product_id.as_str().to_string(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        self.post_rows("order_items", &items, false).await?;

        Ok(order_id)
    }
}
