//! Domain models specific to the storefront binary.

pub mod session;
