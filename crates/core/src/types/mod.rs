//! Shared domain types.
//!
//! - [`id`] - Newtype wrappers for type-safe entity IDs
//! - [`product`] - The immutable `Product` value fetched from the catalog

pub mod id;
pub mod product;

pub use id::{OrderId, ProductId, StandId};
pub use product::Product;
