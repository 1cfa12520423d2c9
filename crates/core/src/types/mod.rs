//! Core types for the Oplung storefront.
//!
//! This module provides type-safe wrappers for cart domain concepts.

pub mod cart;
pub mod id;
mod lenient;
pub mod order;
pub mod price;
pub mod shipping;

pub use cart::{Cart, CartItem, CartItemInput, ItemError};
pub use id::{ProductId, ProductIdError};
pub use order::Order;
pub use price::{CurrencyCode, Price};
pub use shipping::ShippingPolicy;
