//! Cache value types for the catalog cache.

use ifacens_core::Product;

use super::rows::Stand;

/// Values stored in the shared catalog cache.
///
/// A single cache holds both stand lists and per-stand product lists, keyed
/// by string (`"stands"`, `"products:{stand_id}"`).
#[derive(Clone)]
pub enum CacheValue {
    /// The full stand list.
    Stands(Vec<Stand>),
    /// Products of one stand.
    Products(Vec<Product>),
}
