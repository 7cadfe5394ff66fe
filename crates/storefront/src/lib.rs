//! Vitrine storefront library.
//!
//! The commerce core of the Vitrine apparel store: a persisted cart, a
//! three-step checkout, a client for the store's REST API and a reusable
//! paginated fetch service. Front ends (the `vitrine` CLI, tests) build an
//! [`AppState`] from configuration and drive everything through it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notify;
pub mod pagination;
mod persist;
pub mod postal;
pub mod session;
pub mod state;
pub mod telemetry;

pub use error::{AppError, Result};
pub use state::AppState;
