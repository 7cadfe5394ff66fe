//! Command implementations.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod cep;
pub mod checkout;
