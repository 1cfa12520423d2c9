//! Integration tests for the Oplung cart store.
//!
//! Tests drive [`PageState`] end to end against the in-memory document and
//! storage, the same way the browser build wires it to `window.document` and
//! `localStorage`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p oplung-integration-tests
//! ```

use std::rc::Rc;

use oplung_storefront::StoreConfig;
use oplung_storefront::dom::{ManualScheduler, MemoryDocument, MemoryElement, ParentNode, Scheduler};
use oplung_storefront::state::PageState;
use oplung_storefront::storage::MemoryStorage;

/// Header and empty product grid every test page starts from.
pub const PAGE: &str = r#"
<header class="site-header">
  <a class="logo" href="/">Oplung</a>
  <a href="/cart.html">Giỏ hàng <span id="cart-count">0</span></a>
</header>
<main>
  <section class="product-grid"></section>
</main>
<footer>© <span id="year"></span> Oplung Store</footer>
"#;

/// A rendered page: header with year and badge, and a product grid.
pub struct TestPage {
    pub doc: MemoryDocument,
    pub storage: MemoryStorage,
    pub scheduler: Rc<ManualScheduler>,
    pub state: PageState<MemoryStorage, MemoryDocument>,
    pub year: MemoryElement,
    pub badge: MemoryElement,
    pub grid: MemoryElement,
}

impl TestPage {
    /// A page over fresh, working storage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(MemoryStorage::new())
    }

    /// A page over `storage`, which may already hold records.
    #[must_use]
    pub fn with_storage(storage: MemoryStorage) -> Self {
        Self::with_config(storage, StoreConfig::default())
    }

    /// # Panics
    ///
    /// Panics if [`PAGE`] lost one of its landmarks.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_config(storage: MemoryStorage, config: StoreConfig) -> Self {
        let doc = MemoryDocument::fragment(PAGE);
        let year = doc.query_selector("#year").expect("year slot");
        let badge = doc.query_selector("#cart-count").expect("cart badge");
        let grid = doc.query_selector(".product-grid").expect("product grid");

        let scheduler = Rc::new(ManualScheduler::new());
        let state = PageState::new(
            config,
            storage.clone(),
            doc.clone(),
            Rc::clone(&scheduler) as Rc<dyn Scheduler>,
        );

        Self {
            doc,
            storage,
            scheduler,
            state,
            year,
            badge,
            grid,
        }
    }

    /// Append `markup` to the grid; returns the last trigger in the grid.
    ///
    /// # Panics
    ///
    /// Panics if the grid holds no `[data-add-to-cart]` afterwards.
    #[allow(clippy::expect_used)]
    pub fn add_markup(&self, markup: &str) -> MemoryElement {
        self.grid.append_html(markup);
        self.grid
            .query_selector_all("[data-add-to-cart]")
            .pop()
            .expect("markup has a trigger")
    }

    /// Append a product card with a trigger inside; returns the trigger.
    pub fn add_card(&self, id: &str, title: &str, price: &str, img: &str) -> MemoryElement {
        self.add_markup(&format!(
            r#"<article class="product-card" data-id="{id}" data-price="{price}">
                 <img src="{img}" alt="">
                 <h3 class="product-card__title">{title}</h3>
                 <button class="btn" data-add-to-cart>Thêm vào giỏ</button>
               </article>"#
        ))
    }

    /// Append a standalone trigger carrying a JSON payload; returns it.
    pub fn add_payload_button(&self, payload: &str) -> MemoryElement {
        self.add_markup(&format!(
            "<button data-add-to-cart data-product='{payload}'>Mua</button>"
        ))
    }
}

impl Default for TestPage {
    fn default() -> Self {
        Self::new()
    }
}
