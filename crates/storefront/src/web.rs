//! The page-facing `Store` object.
//!
//! `start` runs when the module is instantiated: it loads configuration from
//! `<script id="store-config" data-...>`, installs logging, publishes
//! `window.Store`, and runs [`PageState::init_common_ui`] once the document
//! is parsed.
//!
//! Values cross the boundary as JSON so page scripts see plain objects and
//! arrays, the same shapes that sit in `localStorage`.

// wasm-bindgen exports expand to FFI glue.
#![allow(unsafe_code)]

use std::rc::Rc;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::config::{AttributeSource, StoreConfig};
use crate::dom::{BrowserDocument, BrowserElement, ParentNode, TimeoutScheduler};
use crate::error::{Result, StoreError, or_report};
use crate::events::{CartListener, CartUpdated};
use crate::format::{fmt_vnd, get_param};
use crate::state::PageState;
use crate::storage::LocalStorage;
use crate::telemetry::init_tracing;
use oplung_core::Order;

/// Element whose `data-*` attributes override [`StoreConfig`] defaults.
const CONFIG_SELECTOR: &str = "script#store-config";

/// Listener name of the DOM event dispatcher.
const DOM_EVENT_LISTENER: &str = "dom-event";

type BrowserPage = PageState<LocalStorage, BrowserDocument>;

// =============================================================================
// Startup
// =============================================================================

/// Module entry point.
///
/// # Errors
///
/// Fails only when there is no window or document to attach to.
#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    let document = BrowserDocument::current()
        .ok_or_else(|| to_js_error(&StoreError::Environment("no document".to_string())))?;

    let loaded = document
        .query_selector(CONFIG_SELECTOR)
        .map_or_else(|| Ok(StoreConfig::default()), |el| {
            StoreConfig::from_source(&AttributeSource(el))
        });
    let config = match loaded {
        Ok(config) => {
            init_tracing(&config.log_filter);
            config
        }
        Err(e) => {
            let config = StoreConfig::default();
            init_tracing(&config.log_filter);
            StoreError::from(e).report();
            warn!("Using default store configuration");
            config
        }
    };

    let event_name = config.dom.updated_event.clone();
    let page = PageState::new(
        config,
        LocalStorage::open_or_disabled(),
        document.clone(),
        Rc::new(TimeoutScheduler),
    );
    page.store().subscribe(
        DOM_EVENT_LISTENER,
        Rc::new(DomEventDispatcher {
            target: document.0.clone().into(),
            name: event_name,
        }),
    );

    let window = web_sys::window()
        .ok_or_else(|| to_js_error(&StoreError::Environment("no window".to_string())))?;
    js_sys::Reflect::set(
        &window,
        &JsValue::from_str("Store"),
        &JsValue::from(PageApi { page: page.clone() }),
    )?;

    if document.0.ready_state() == "loading" {
        let init = Closure::once_into_js(move || page.init_common_ui());
        document
            .0
            .add_event_listener_with_callback("DOMContentLoaded", init.unchecked_ref())?;
        debug!("Waiting for DOMContentLoaded");
    } else {
        page.init_common_ui();
    }

    Ok(())
}

/// Dispatches a `CustomEvent` with `detail: { count }` on every cart change.
struct DomEventDispatcher {
    target: web_sys::EventTarget,
    name: String,
}

impl CartListener for DomEventDispatcher {
    fn cart_updated(&self, event: &CartUpdated) {
        let detail = js_sys::Object::new();
        if js_sys::Reflect::set(
            &detail,
            &JsValue::from_str("count"),
            &JsValue::from(js_count(event.count)),
        )
        .is_err()
        {
            return;
        }

        let init = web_sys::CustomEventInit::new();
        init.set_detail(&detail);
        let dispatched = web_sys::CustomEvent::new_with_event_init_dict(&self.name, &init)
            .and_then(|custom| self.target.dispatch_event(&custom));
        if let Err(e) = dispatched {
            warn!(event = %self.name, error = ?e, "Failed to dispatch cart event");
        }
    }
}

// =============================================================================
// Page API
// =============================================================================

/// `window.Store`.
#[wasm_bindgen(js_name = Store)]
pub struct PageApi {
    page: BrowserPage,
}

#[wasm_bindgen(js_class = Store)]
impl PageApi {
    /// The cart as an array of `{id, name, price, img, qty}`.
    #[wasm_bindgen(js_name = getCart)]
    pub fn get_cart(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.page.store().get_cart())
    }

    /// Replace the cart. A value that is not an array of items is logged
    /// and the cart left unchanged.
    #[wasm_bindgen(js_name = setCart)]
    pub fn set_cart(&self, items: &JsValue) {
        or_report(
            from_js(items).and_then(|items| self.page.store().set_cart_json(items)),
            || (),
        );
    }

    #[wasm_bindgen(js_name = clearCart)]
    pub fn clear_cart(&self) {
        self.page.store().clear_cart();
    }

    /// Add `{id, name, price, img, qty}`; returns the cart count, unchanged
    /// when the item is rejected.
    #[wasm_bindgen(js_name = addToCart)]
    pub fn add_to_cart(&self, item: &JsValue) -> u32 {
        let store = self.page.store();
        js_count(or_report(
            from_js(item).and_then(|item| store.add_to_cart_json(&item)),
            || store.cart_count(),
        ))
    }

    #[wasm_bindgen(js_name = cartCount)]
    pub fn cart_count(&self) -> u32 {
        js_count(self.page.store().cart_count())
    }

    /// Sum of price × qty.
    #[wasm_bindgen(js_name = cartSubtotal)]
    pub fn cart_subtotal(&self) -> f64 {
        js_amount(self.page.store().get_cart().subtotal())
    }

    /// Shipping fee for `subtotal` under the configured policy.
    #[wasm_bindgen(js_name = shippingFee)]
    pub fn shipping_fee(&self, subtotal: &JsValue) -> f64 {
        let subtotal = amount_from_js(subtotal).unwrap_or_default();
        js_amount(self.page.config().shipping.fee_for(subtotal))
    }

    #[wasm_bindgen(js_name = getOrders)]
    pub fn get_orders(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.page.store().get_orders())
    }

    #[wasm_bindgen(js_name = addOrder)]
    pub fn add_order(&self, order: &JsValue) {
        if let Some(order) = or_report(from_js(order).map(Some), || None) {
            self.page.store().add_order(Order::new(order));
        }
    }

    #[wasm_bindgen(js_name = fmtVND)]
    pub fn fmt_vnd(&self, amount: &JsValue) -> String {
        fmt_vnd(amount_from_js(amount))
    }

    /// Query parameter from `search`, or the current URL when omitted.
    #[wasm_bindgen(js_name = getParam)]
    pub fn get_param(&self, name: &str, search: Option<String>) -> Option<String> {
        let search = search.or_else(|| {
            web_sys::window().and_then(|window| window.location().search().ok())
        })?;
        get_param(name, &search)
    }

    #[wasm_bindgen(js_name = updateCartBadge)]
    pub fn update_cart_badge(&self) {
        self.page.update_cart_badge();
    }

    /// Bind triggers under `root` (an element), or the whole document.
    #[wasm_bindgen(js_name = bindAddToCartInDoc)]
    pub fn bind_add_to_cart_in_doc(&self, root: &JsValue) -> u32 {
        let bound = match root.dyn_ref::<web_sys::Element>() {
            Some(element) => self.page.bind_add_to_cart(&BrowserElement(element.clone())),
            None => self.page.bind_add_to_cart_in_doc(),
        };
        u32::try_from(bound).unwrap_or(u32::MAX)
    }

    #[wasm_bindgen(js_name = initCommonUI)]
    pub fn init_common_ui(&self) {
        self.page.init_common_ui();
    }

    #[wasm_bindgen(getter = SHIP_THRESHOLD)]
    pub fn ship_threshold(&self) -> f64 {
        js_amount(self.page.config().shipping.free_threshold)
    }

    #[wasm_bindgen(getter = SHIP_FEE)]
    pub fn ship_fee(&self) -> f64 {
        js_amount(self.page.config().shipping.fee)
    }
}

// =============================================================================
// Conversions
// =============================================================================

fn to_js<T: Serialize>(value: &T) -> std::result::Result<JsValue, JsValue> {
    let text = serde_json::to_string(value).map_err(|e| reported(&e.into()))?;
    js_sys::JSON::parse(&text)
}

fn from_js(value: &JsValue) -> Result<Value> {
    if value.is_undefined() {
        return Ok(Value::Null);
    }
    let text = js_sys::JSON::stringify(value)
        .map_err(|e| StoreError::Environment(format!("JSON.stringify threw: {e:?}")))?;
    Ok(serde_json::from_str(&String::from(text))?)
}

fn amount_from_js(value: &JsValue) -> Option<Decimal> {
    value
        .as_f64()
        .and_then(|n| Decimal::try_from(n).ok())
        .or_else(|| value.as_string().and_then(|s| s.trim().parse().ok()))
}

fn js_amount(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

/// Counts cross as `u32` so they arrive as plain numbers, not `BigInt`.
fn js_count(count: u64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn to_js_error(err: &StoreError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn reported(err: &StoreError) -> JsValue {
    err.report();
    to_js_error(err)
}
