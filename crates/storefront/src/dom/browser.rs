//! `web_sys` implementation of the DOM traits.

// wasm-bindgen closures and casts expand to FFI glue.
#![allow(unsafe_code)]

use std::cell::Cell;
use std::time::Duration;

use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use super::{DomElement, ElementKey, ParentNode, Scheduler};

thread_local! {
    /// Element object to its [`ElementKey`]. Keyed by object identity, so
    /// `cloneNode` and re-parsed markup get fresh keys, and removed elements
    /// can be collected.
    static KEYS: js_sys::WeakMap = js_sys::WeakMap::new();
    static NEXT_KEY: Cell<u32> = const { Cell::new(1) };
}

fn collect_elements(list: &web_sys::NodeList) -> Vec<BrowserElement> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .map(BrowserElement)
        .collect()
}

/// The page document.
#[derive(Debug, Clone)]
pub struct BrowserDocument(pub web_sys::Document);

impl BrowserDocument {
    /// The window's document, if running in a page.
    #[must_use]
    pub fn current() -> Option<Self> {
        web_sys::window()?.document().map(Self)
    }
}

impl ParentNode for BrowserDocument {
    type Element = BrowserElement;

    fn query_selector(&self, selector: &str) -> Option<BrowserElement> {
        self.0
            .query_selector(selector)
            .map_err(|e| debug!(selector, error = ?e, "querySelector threw"))
            .ok()
            .flatten()
            .map(BrowserElement)
    }

    fn query_selector_all(&self, selector: &str) -> Vec<BrowserElement> {
        self.0
            .query_selector_all(selector)
            .map(|list| collect_elements(&list))
            .unwrap_or_else(|e| {
                debug!(selector, error = ?e, "querySelectorAll threw");
                Vec::new()
            })
    }
}

/// A page element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserElement(pub web_sys::Element);

impl ParentNode for BrowserElement {
    type Element = Self;

    fn query_selector(&self, selector: &str) -> Option<Self> {
        self.0.query_selector(selector).ok().flatten().map(Self)
    }

    fn query_selector_all(&self, selector: &str) -> Vec<Self> {
        self.0
            .query_selector_all(selector)
            .map(|list| collect_elements(&list))
            .unwrap_or_default()
    }
}

impl DomElement for BrowserElement {
    // Keys are u32 counters, exact in an f64.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn key(&self) -> ElementKey {
        let object: &js_sys::Object = self.0.as_ref();
        KEYS.with(|keys| {
            if let Some(key) = keys.get(object).as_f64() {
                return ElementKey(key as u64);
            }

            let key = NEXT_KEY.with(|next| {
                let key = next.get();
                next.set(key.wrapping_add(1));
                key
            });
            keys.set(object, &JsValue::from(key));
            ElementKey(u64::from(key))
        })
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn closest(&self, selector: &str) -> Option<Self> {
        self.0.closest(selector).ok().flatten().map(Self)
    }

    fn text_content(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }

    fn set_text_content(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn on_click(&self, handler: Box<dyn FnMut()>) {
        let closure = Closure::<dyn FnMut()>::wrap(handler);
        if let Err(e) = self
            .0
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        {
            warn!(error = ?e, "Failed to attach click handler");
            return;
        }
        // Handlers live as long as the page.
        closure.forget();
    }
}

/// [`Scheduler`] backed by `window.setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = Closure::once_into_js(move || task());
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            millis,
        ) {
            warn!(error = ?e, "setTimeout failed");
        }
    }
}
