//! Vitrine Core - Shared domain types.
//!
//! This crate provides the types used across all Vitrine components:
//! - `storefront` - Cart store, checkout wizard and upstream API client
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, sizes, postal codes,
//!   cart line items, checkout addresses and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
