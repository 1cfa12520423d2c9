//! Oplung Core - Shared types library.
//!
//! This crate provides the value types used by the storefront cart:
//! - [`ProductId`] - validated product identifier
//! - [`Price`] and [`CurrencyCode`] - decimal amounts with locale formatting
//! - [`CartItem`], [`CartItemInput`] and [`Cart`] - line items and the merge rules
//! - [`Order`] - opaque order record
//! - [`ShippingPolicy`] - free-shipping threshold and flat fee
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no storage, no DOM
//! access. This keeps it lightweight and allows it to be used anywhere,
//! including native tests and `wasm32` builds.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
