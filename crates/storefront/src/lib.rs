//! Oplung storefront cart store.
//!
//! The client-side cart for the Oplung storefront: a `localStorage`-backed
//! cart and order list, the header cart badge, and the add-to-cart buttons on
//! server-rendered product markup.
//!
//! # Architecture
//!
//! - [`store::CartStore`] owns the cart and orders records over a
//!   [`storage::KeyValueStorage`] backend
//! - [`dom`] abstracts the few DOM operations the UI needs, so [`ui`] and
//!   [`state::PageState`] run natively against an in-memory document
//! - on `wasm32`, `web` wires everything to `window.localStorage`, the page
//!   document, and exports the `window.Store` API

#![cfg_attr(not(any(test, target_arch = "wasm32")), forbid(unsafe_code))]

pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod format;
pub mod state;
pub mod storage;
pub mod store;
pub mod telemetry;
pub mod ui;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ConfigError, StoreConfig};
pub use error::{Result, StoreError};
pub use events::{CartListener, CartUpdated};
pub use format::{SHIP_FEE, SHIP_THRESHOLD, fmt_vnd, get_param};
pub use state::PageState;
pub use store::CartStore;
