//! Page state shared across handlers.

use std::rc::Rc;

use tracing::info;

use crate::config::StoreConfig;
use crate::dom::{ParentNode, Scheduler};
use crate::storage::KeyValueStorage;
use crate::store::CartStore;
use crate::ui::{self, AddToCartBinder, BadgeListener};

/// Listener name the badge refresh is registered under.
pub const BADGE_LISTENER: &str = "badge";

/// Page state shared across all handlers.
///
/// This struct is cheaply cloneable via `Rc` and provides access to the
/// store, the document, and the add-to-cart binder. The cart badge is
/// subscribed to store changes at construction.
pub struct PageState<S, P> {
    inner: Rc<PageStateInner<S, P>>,
}

struct PageStateInner<S, P> {
    config: StoreConfig,
    document: P,
    store: Rc<CartStore<S>>,
    binder: AddToCartBinder<S>,
}

impl<S, P> Clone for PageState<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, P> PageState<S, P>
where
    S: KeyValueStorage + 'static,
    P: ParentNode + Clone + 'static,
{
    /// Create the page state.
    ///
    /// # Arguments
    ///
    /// * `config` - Store configuration
    /// * `storage` - Backend for the cart and orders records
    /// * `document` - The page document
    /// * `scheduler` - Timer for the add-to-cart feedback restore
    pub fn new(config: StoreConfig, storage: S, document: P, scheduler: Rc<dyn Scheduler>) -> Self {
        let store = Rc::new(CartStore::new(
            storage,
            config.cart_key.clone(),
            config.orders_key.clone(),
        ));
        store.subscribe(
            BADGE_LISTENER,
            Rc::new(BadgeListener::new(document.clone(), config.dom.badge.clone())),
        );

        let binder = AddToCartBinder::new(
            Rc::clone(&store),
            scheduler,
            config.dom.clone(),
            config.feedback.clone(),
        );

        Self {
            inner: Rc::new(PageStateInner {
                config,
                document,
                store,
                binder,
            }),
        }
    }

    /// Get a reference to the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn store(&self) -> &Rc<CartStore<S>> {
        &self.inner.store
    }

    /// Get a reference to the page document.
    #[must_use]
    pub fn document(&self) -> &P {
        &self.inner.document
    }

    /// Get a reference to the add-to-cart binder.
    #[must_use]
    pub fn binder(&self) -> &AddToCartBinder<S> {
        &self.inner.binder
    }

    /// Show the current year. No-op without a year element.
    pub fn update_year(&self) -> bool {
        ui::update_year(
            &self.inner.document,
            &self.inner.config.dom.year,
            ui::current_year(),
        )
    }

    /// Show the current cart count. No-op without a badge.
    pub fn update_cart_badge(&self) -> bool {
        ui::update_cart_badge(
            &self.inner.document,
            &self.inner.config.dom.badge,
            self.inner.store.cart_count(),
        )
    }

    /// Bind add-to-cart triggers under `root`. Returns how many were new.
    pub fn bind_add_to_cart<R: ParentNode>(&self, root: &R) -> usize {
        self.inner.binder.bind(root)
    }

    /// Bind add-to-cart triggers anywhere in the document.
    pub fn bind_add_to_cart_in_doc(&self) -> usize {
        self.inner.binder.bind(&self.inner.document)
    }

    /// Page startup: year, badge, and add-to-cart buttons.
    pub fn init_common_ui(&self) {
        let year = self.update_year();
        let badge = self.update_cart_badge();
        let bound = self.bind_add_to_cart_in_doc();
        info!(
            year,
            badge,
            bound,
            persistent = self.inner.store.is_persistent(),
            "Cart UI initialised"
        );
    }
}

impl<S: KeyValueStorage, P> std::fmt::Debug for PageState<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageState")
            .field("config", &self.inner.config)
            .field("store", &self.inner.store)
            .field("binder", &self.inner.binder)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dom::{DomElement, ManualScheduler, MemoryDocument};
    use crate::storage::MemoryStorage;
    use oplung_core::CartItemInput;

    const HEADER: &str = r#"<header><span id="cart-count">0</span><span id="year"></span></header>"#;

    fn page(doc: &MemoryDocument, storage: MemoryStorage) -> PageState<MemoryStorage, MemoryDocument> {
        PageState::new(
            StoreConfig::default(),
            storage,
            doc.clone(),
            Rc::new(ManualScheduler::new()),
        )
    }

    #[test]
    fn test_init_common_ui() {
        let doc = MemoryDocument::fragment(&format!(
            r#"{HEADER}<button data-add-to-cart data-product='{{"id":"a","name":"A","price":1000}}'>Mua</button>"#
        ));
        let year = doc.query_selector("#year").unwrap();
        let badge = doc.query_selector("#cart-count").unwrap();
        let button = doc.query_selector("[data-add-to-cart]").unwrap();

        let state = page(&doc, MemoryStorage::new());
        state.init_common_ui();

        assert_eq!(year.text_content(), ui::current_year().to_string());
        assert_eq!(badge.text_content(), "0");
        assert!(state.binder().is_bound(&button));

        button.click();
        assert_eq!(badge.text_content(), "1");
    }

    #[test]
    fn test_badge_follows_every_mutation() {
        let doc = MemoryDocument::fragment(HEADER);
        let badge = doc.query_selector("#cart-count").unwrap();
        let state = page(&doc, MemoryStorage::new());

        state
            .store()
            .add_to_cart(CartItemInput::new("a".parse().unwrap()).qty(4));
        assert_eq!(badge.text_content(), "4");

        state.store().clear_cart();
        assert_eq!(badge.text_content(), "0");
    }

    #[test]
    fn test_badge_reads_existing_cart() {
        let storage = MemoryStorage::new();
        storage
            .set_item("cart", r#"[{"id":"a","name":"A","price":1,"img":"","qty":2}]"#)
            .unwrap();

        let doc = MemoryDocument::fragment(HEADER);
        let badge = doc.query_selector("#cart-count").unwrap();

        let state = page(&doc, storage);
        assert!(state.update_cart_badge());
        assert_eq!(badge.text_content(), "2");
    }

    #[test]
    fn test_clones_share_state() {
        let doc = MemoryDocument::new();
        let state = page(&doc, MemoryStorage::new());
        let other = state.clone();

        state
            .store()
            .add_to_cart(CartItemInput::new("a".parse().unwrap()));
        assert_eq!(other.store().cart_count(), 1);
    }

    #[test]
    fn test_debug_lists_store_and_binder() {
        let doc = MemoryDocument::new();
        let state = page(&doc, MemoryStorage::new());

        let debug = format!("{state:?}");
        assert!(debug.starts_with("PageState"));
        assert!(debug.contains("CartStore"));
        assert!(debug.contains("AddToCartBinder"));
    }
}
