//! Add-to-cart button binding.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, instrument};

use super::extract::extract_product;
use crate::config::{DomContract, Feedback};
use crate::dom::{DomElement, ElementKey, ParentNode, Scheduler};
use crate::storage::KeyValueStorage;
use crate::store::CartStore;

/// Attaches click handlers to add-to-cart triggers, once per element.
///
/// Binding is idempotent: the binder tracks the keys of every element it has
/// bound, so re-running [`Self::bind`] after new markup is inserted only
/// picks up the new triggers.
pub struct AddToCartBinder<S> {
    store: Rc<CartStore<S>>,
    scheduler: Rc<dyn Scheduler>,
    dom: DomContract,
    feedback: Feedback,
    bound: RefCell<HashSet<ElementKey>>,
}

impl<S: KeyValueStorage + 'static> AddToCartBinder<S> {
    #[must_use]
    pub fn new(
        store: Rc<CartStore<S>>,
        scheduler: Rc<dyn Scheduler>,
        dom: DomContract,
        feedback: Feedback,
    ) -> Self {
        Self {
            store,
            scheduler,
            dom,
            feedback,
            bound: RefCell::new(HashSet::new()),
        }
    }

    /// Bind every unbound trigger under `root`. Returns how many were new.
    #[instrument(skip_all)]
    pub fn bind<P: ParentNode>(&self, root: &P) -> usize {
        let mut newly_bound = 0;

        for trigger in root.query_selector_all(&self.dom.trigger) {
            if !self.bound.borrow_mut().insert(trigger.key()) {
                continue;
            }

            let store = Rc::clone(&self.store);
            let scheduler = Rc::clone(&self.scheduler);
            let dom = self.dom.clone();
            let feedback = self.feedback.clone();
            let target = trigger.clone();
            trigger.on_click(Box::new(move || {
                handle_click(&store, &target, &dom, &feedback, scheduler.as_ref());
            }));
            newly_bound += 1;
        }

        debug!(newly_bound, total = self.bound_count(), "Bound add-to-cart triggers");
        newly_bound
    }

    /// Whether `element` has a handler from this binder.
    pub fn is_bound(&self, element: &impl DomElement) -> bool {
        self.bound.borrow().contains(&element.key())
    }

    /// Number of elements bound so far.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.bound.borrow().len()
    }
}

impl<S> std::fmt::Debug for AddToCartBinder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddToCartBinder")
            .field("trigger", &self.dom.trigger)
            .field("bound", &self.bound.borrow().len())
            .finish_non_exhaustive()
    }
}

/// Extract, add, and flash the feedback label. No-op if extraction fails.
fn handle_click<S: KeyValueStorage, E: DomElement>(
    store: &CartStore<S>,
    trigger: &E,
    dom: &DomContract,
    feedback: &Feedback,
    scheduler: &dyn Scheduler,
) {
    let Some(item) = extract_product(trigger, dom) else {
        debug!("Trigger has no product, ignoring click");
        return;
    };

    store.add_to_cart(item);
    show_feedback(trigger, feedback, scheduler);
}

/// Swap the trigger label, restoring it after the feedback duration.
///
/// A click while the label is already swapped leaves the pending restore in
/// place so the original label is not lost.
fn show_feedback<E: DomElement>(trigger: &E, feedback: &Feedback, scheduler: &dyn Scheduler) {
    let original = trigger.text_content();
    if original == feedback.label {
        return;
    }

    trigger.set_text_content(&feedback.label);
    let target = trigger.clone();
    scheduler.schedule(
        feedback.duration,
        Box::new(move || target.set_text_content(&original)),
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::dom::{ManualScheduler, MemoryDocument, MemoryElement};
    use crate::storage::MemoryStorage;

    struct Fixture {
        doc: MemoryDocument,
        store: Rc<CartStore<MemoryStorage>>,
        scheduler: Rc<ManualScheduler>,
        binder: AddToCartBinder<MemoryStorage>,
    }

    fn fixture() -> Fixture {
        let doc = MemoryDocument::new();
        let store = Rc::new(CartStore::new(MemoryStorage::new(), "cart", "orders"));
        let scheduler = Rc::new(ManualScheduler::new());
        let binder = AddToCartBinder::new(
            Rc::clone(&store),
            Rc::clone(&scheduler) as Rc<dyn Scheduler>,
            DomContract::default(),
            Feedback::default(),
        );
        Fixture {
            doc,
            store,
            scheduler,
            binder,
        }
    }

    fn add_button(doc: &MemoryDocument, payload: &str) -> MemoryElement {
        doc.body().append_html(&format!(
            "<button data-add-to-cart data-product='{payload}'>Thêm vào giỏ</button>"
        ));
        doc.query_selector_all("[data-add-to-cart]").pop().unwrap()
    }

    #[test]
    fn test_bind_is_idempotent() {
        let f = fixture();
        let button = add_button(&f.doc, r#"{"id":"a","name":"A"}"#);

        assert_eq!(f.binder.bind(&f.doc), 1);
        assert_eq!(f.binder.bind(&f.doc), 0);
        assert_eq!(button.click_handler_count(), 1);
        assert!(f.binder.is_bound(&button));

        button.click();
        assert_eq!(f.store.cart_count(), 1);
    }

    #[test]
    fn test_rebind_picks_up_new_triggers() {
        let f = fixture();
        add_button(&f.doc, r#"{"id":"a","name":"A"}"#);
        f.binder.bind(&f.doc);

        let later = add_button(&f.doc, r#"{"id":"b","name":"B"}"#);
        assert!(!f.binder.is_bound(&later));
        assert_eq!(f.binder.bind(&f.doc), 1);
        assert_eq!(f.binder.bound_count(), 2);
    }

    #[test]
    fn test_bind_within_root_only() {
        let f = fixture();
        f.doc
            .body()
            .append_html("<section><div><button data-add-to-cart>Mua</button></div></section>");
        let section = f.doc.query_selector("section").unwrap();
        let inside = f.doc.query_selector("section [data-add-to-cart]").unwrap();
        let outside = add_button(&f.doc, r#"{"id":"a","name":"A"}"#);

        assert_eq!(f.binder.bind(&section), 1);
        assert!(f.binder.is_bound(&inside));
        assert!(!f.binder.is_bound(&outside));
    }

    #[test]
    fn test_identical_markup_binds_separately() {
        let f = fixture();
        let first = add_button(&f.doc, r#"{"id":"a","name":"A"}"#);
        f.binder.bind(&f.doc);

        let copy = add_button(&f.doc, r#"{"id":"a","name":"A"}"#);
        assert!(!f.binder.is_bound(&copy));
        assert_eq!(f.binder.bind(&f.doc), 1);

        first.click();
        copy.click();
        assert_eq!(f.store.cart_count(), 2);
    }

    #[test]
    fn test_click_shows_and_restores_feedback() {
        let f = fixture();
        let button = add_button(&f.doc, r#"{"id":"a","name":"A"}"#);
        f.binder.bind(&f.doc);

        button.click();
        assert_eq!(button.text_content(), "Đã thêm ✓");
        assert_eq!(f.scheduler.delays(), vec![Duration::from_millis(900)]);

        f.scheduler.run_all();
        assert_eq!(button.text_content(), "Thêm vào giỏ");
    }

    #[test]
    fn test_double_click_keeps_original_label() {
        let f = fixture();
        let button = add_button(&f.doc, r#"{"id":"a","name":"A"}"#);
        f.binder.bind(&f.doc);

        button.click();
        button.click();
        assert_eq!(f.store.cart_count(), 2);
        assert_eq!(f.scheduler.pending(), 1);

        f.scheduler.run_all();
        assert_eq!(button.text_content(), "Thêm vào giỏ");
    }

    #[test]
    fn test_click_without_product_does_nothing() {
        let f = fixture();
        f.doc.body().append_html("<button data-add-to-cart>Thêm</button>");
        let button = f.doc.query_selector("button").unwrap();
        f.binder.bind(&f.doc);

        button.click();
        assert_eq!(f.store.cart_count(), 0);
        assert!(f.store.storage().backend().get_item("cart").unwrap().is_none());
        assert_eq!(button.text_content(), "Thêm");
        assert_eq!(f.scheduler.pending(), 0);
    }
}
