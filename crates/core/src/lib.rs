//! iFacens Core - shared domain logic for the food court storefront.
//!
//! This crate holds everything that does not touch the network or the
//! session store:
//!
//! - [`types`] - Newtype IDs and the `Product` value type
//! - [`cart`] - The cart state machine (single-stand binding, stock bounds)
//! - [`pix`] - Static PIX "copia e cola" payload assembly
//! - [`currency`] - BRL display and payload amount formatting
//! - [`whatsapp`] - Order-summary deep-link builder
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no session access. Persistence of the cart is a concern of the
//! storefront binary; the cart itself only exposes [`Cart::lines`] and
//! [`Cart::from_lines`] as the serialization boundary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod currency;
pub mod pix;
pub mod types;
pub mod whatsapp;

pub use cart::{AddOutcome, Cart, CartLine, PendingAdd, StandBinding, UpdateOutcome};
pub use types::*;
