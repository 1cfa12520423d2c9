//! Browser smoke tests. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]
#![allow(clippy::unwrap_used)]

use std::rc::Rc;

use oplung_core::CartItemInput;
use oplung_storefront::StoreConfig;
use oplung_storefront::dom::{BrowserDocument, BrowserElement, DomElement, ParentNode, TimeoutScheduler};
use oplung_storefront::state::PageState;
use oplung_storefront::storage::{KeyValueStorage, LocalStorage};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

fn config(prefix: &str) -> StoreConfig {
    StoreConfig {
        cart_key: format!("{prefix}_cart"),
        orders_key: format!("{prefix}_orders"),
        ..StoreConfig::default()
    }
}

#[wasm_bindgen_test]
fn test_local_storage_persists_cart() {
    let storage = LocalStorage::open().unwrap();
    let document = BrowserDocument::current().unwrap();
    let page = PageState::new(
        config("smoke_persist"),
        storage.clone(),
        document,
        Rc::new(TimeoutScheduler),
    );
    page.store().clear_cart();

    page.store()
        .add_to_cart(CartItemInput::new("sku1".parse().unwrap()).qty(2));
    assert!(page.store().is_persistent());
    assert_eq!(page.store().cart_count(), 2);
    assert!(storage.get_item("smoke_persist_cart").unwrap().is_some());

    page.store().clear_cart();
}

#[wasm_bindgen_test]
fn test_card_button_updates_badge() {
    let document = BrowserDocument::current().unwrap();
    let body = document.0.body().unwrap();
    body.set_inner_html(
        r#"<span id="cart-count">0</span>
           <article class="product-card" data-id="sku9" data-price="1000">
             <img src="/a.jpg"><h3 class="product-card__title">Mũ</h3>
             <button data-add-to-cart>Thêm</button>
           </article>"#,
    );

    let page = PageState::new(
        config("smoke_badge"),
        LocalStorage::open_or_disabled(),
        document.clone(),
        Rc::new(TimeoutScheduler),
    );
    page.store().clear_cart();
    page.init_common_ui();

    let button = document.query_selector("[data-add-to-cart]").unwrap();
    button
        .0
        .dyn_ref::<web_sys::HtmlElement>()
        .unwrap()
        .click();

    assert_eq!(page.store().cart_count(), 1);
    let badge = document.query_selector("#cart-count").unwrap();
    assert_eq!(badge.text_content(), "1");
    assert_eq!(button.text_content(), "Đã thêm ✓");

    page.store().clear_cart();
}

#[wasm_bindgen_test]
fn test_cloned_button_gets_its_own_binding() {
    let document = BrowserDocument::current().unwrap();
    let body = document.0.body().unwrap();
    body.set_inner_html(
        r#"<span id="cart-count">0</span>
           <div class="grid">
             <button data-add-to-cart data-product='{"id":"c1","name":"Mũ"}'>Thêm</button>
           </div>"#,
    );

    let page = PageState::new(
        config("smoke_clone"),
        LocalStorage::open_or_disabled(),
        document.clone(),
        Rc::new(TimeoutScheduler),
    );
    page.store().clear_cart();
    page.init_common_ui();

    let original = document.query_selector("[data-add-to-cart]").unwrap();
    let copy = original
        .0
        .clone_node_with_deep(true)
        .unwrap()
        .dyn_into::<web_sys::Element>()
        .unwrap();
    document
        .query_selector(".grid")
        .unwrap()
        .0
        .append_child(&copy)
        .unwrap();
    let copy = BrowserElement(copy);

    assert_ne!(original.key(), copy.key());
    assert_eq!(original.key(), original.key());
    assert!(!page.binder().is_bound(&copy));
    assert_eq!(page.bind_add_to_cart_in_doc(), 1);

    copy.0.dyn_ref::<web_sys::HtmlElement>().unwrap().click();
    assert_eq!(page.store().cart_count(), 1);

    page.store().clear_cart();
}
