//! In-memory document for tests and non-browser hosts.
//!
//! Pages are parsed from HTML with `scraper` and queried with its CSS
//! selector engine, so selectors match the way they do in a browser. On top
//! of the parsed tree this adds text replacement, appending markup, and
//! click handlers.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::node::Text;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use super::{DomElement, ElementKey, ParentNode, Scheduler};

type ClickHandler = Box<dyn FnMut()>;

struct Page {
    html: Html,
    keys: HashMap<NodeId, u64>,
    handlers: HashMap<NodeId, Vec<ClickHandler>>,
}

impl Page {
    fn new(html: Html) -> Self {
        Self {
            html,
            keys: HashMap::new(),
            handlers: HashMap::new(),
        }
    }

    fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    fn root(&self) -> NodeId {
        self.html.root_element().id()
    }

    /// Matching descendants of `scope` in document order, excluding `scope`.
    fn query_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = parse(selector) else {
            return Vec::new();
        };
        let Some(scope_el) = self.element(scope) else {
            return Vec::new();
        };
        scope_el
            .select(&selector)
            .map(|found| found.id())
            .filter(|found| *found != scope)
            .collect()
    }
}

fn parse(selector: &str) -> Option<Selector> {
    Selector::parse(selector)
        .map_err(|e| debug!(selector, error = ?e, "Invalid selector"))
        .ok()
}

/// Copy the children of `source` under `parent`, recursively.
fn graft(tree: &mut Tree<Node>, parent: NodeId, source: NodeRef<'_, Node>) {
    for child in source.children() {
        let Some(mut target) = tree.get_mut(parent) else {
            return;
        };
        let copied = target.append(child.value().clone()).id();
        graft(tree, copied, child);
    }
}

/// A parsed document.
#[derive(Clone)]
pub struct MemoryDocument {
    page: Rc<RefCell<Page>>,
}

impl MemoryDocument {
    /// An empty document: `<html><head></head><body></body></html>`.
    #[must_use]
    pub fn new() -> Self {
        Self::parse("")
    }

    /// Parse a full HTML document.
    #[must_use]
    pub fn parse(markup: &str) -> Self {
        Self::from_html(Html::parse_document(markup))
    }

    /// Parse a body fragment. The fragment's nodes sit directly under the
    /// root element, which then stands in for `<body>`.
    #[must_use]
    pub fn fragment(markup: &str) -> Self {
        Self::from_html(Html::parse_fragment(markup))
    }

    fn from_html(html: Html) -> Self {
        Self {
            page: Rc::new(RefCell::new(Page::new(html))),
        }
    }

    /// The `<body>` element, or the root element of a fragment.
    #[must_use]
    pub fn body(&self) -> MemoryElement {
        self.query_selector("body").unwrap_or_else(|| {
            let root = self.page.borrow().root();
            self.element(root)
        })
    }

    fn element(&self, id: NodeId) -> MemoryElement {
        MemoryElement {
            page: Rc::clone(&self.page),
            id,
        }
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let page = self.page.borrow();
        f.debug_struct("MemoryDocument")
            .field("root", &page.html.root_element().value().name())
            .field("bound", &page.handlers.len())
            .finish()
    }
}

impl ParentNode for MemoryDocument {
    type Element = MemoryElement;

    fn query_selector(&self, selector: &str) -> Option<MemoryElement> {
        self.query_selector_all(selector).into_iter().next()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<MemoryElement> {
        let ids = {
            let page = self.page.borrow();
            let root = page.root();
            let mut ids = page.query_all(root, selector);
            if parse(selector).is_some_and(|s| page.element(root).is_some_and(|el| s.matches(&el))) {
                ids.insert(0, root);
            }
            ids
        };
        ids.into_iter().map(|id| self.element(id)).collect()
    }
}

/// Handle to an element of a [`MemoryDocument`].
#[derive(Clone)]
pub struct MemoryElement {
    page: Rc<RefCell<Page>>,
    id: NodeId,
}

impl MemoryElement {
    fn sibling(&self, id: NodeId) -> Self {
        Self {
            page: Rc::clone(&self.page),
            id,
        }
    }

    #[must_use]
    pub fn tag_name(&self) -> String {
        self.page
            .borrow()
            .element(self.id)
            .map(|el| el.value().name().to_string())
            .unwrap_or_default()
    }

    /// Parse `markup` as a fragment and append its nodes to this element.
    pub fn append_html(&self, markup: &str) {
        let fragment = Html::parse_fragment(markup);
        let source = fragment.root_element();
        graft(&mut self.page.borrow_mut().html.tree, self.id, *source);
    }

    /// Number of click handlers attached.
    #[must_use]
    pub fn click_handler_count(&self) -> usize {
        self.page
            .borrow()
            .handlers
            .get(&self.id)
            .map_or(0, Vec::len)
    }

    /// Fire a click: run this element's handlers in attachment order.
    ///
    /// Handlers may freely read and mutate the document.
    pub fn click(&self) {
        let mut handlers = self
            .page
            .borrow_mut()
            .handlers
            .remove(&self.id)
            .unwrap_or_default();
        for handler in &mut handlers {
            handler();
        }
        let mut page = self.page.borrow_mut();
        let slot = page.handlers.entry(self.id).or_default();
        handlers.append(slot);
        *slot = handlers;
    }
}

impl std::fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let page = self.page.borrow();
        let mut out = f.debug_struct("MemoryElement");
        if let Some(el) = page.element(self.id) {
            out.field("tag", &el.value().name());
            out.field("attributes", &el.value().attrs().collect::<Vec<_>>());
        }
        out.finish_non_exhaustive()
    }
}

impl PartialEq for MemoryElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.page, &other.page) && self.id == other.id
    }
}

impl Eq for MemoryElement {}

impl ParentNode for MemoryElement {
    type Element = Self;

    fn query_selector(&self, selector: &str) -> Option<Self> {
        self.query_selector_all(selector).into_iter().next()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<Self> {
        let ids = self.page.borrow().query_all(self.id, selector);
        ids.into_iter().map(|id| self.sibling(id)).collect()
    }
}

impl DomElement for MemoryElement {
    fn key(&self) -> ElementKey {
        let mut page = self.page.borrow_mut();
        let next = page.keys.len() as u64 + 1;
        ElementKey(*page.keys.entry(self.id).or_insert(next))
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.page
            .borrow()
            .element(self.id)
            .and_then(|el| el.value().attr(&name.to_ascii_lowercase()).map(str::to_string))
    }

    fn closest(&self, selector: &str) -> Option<Self> {
        let selector = parse(selector)?;
        let found = {
            let page = self.page.borrow();
            let el = page.element(self.id)?;
            std::iter::once(el)
                .chain(el.ancestors().filter_map(ElementRef::wrap))
                .find(|candidate| selector.matches(candidate))
                .map(|candidate| candidate.id())
        };
        found.map(|id| self.sibling(id))
    }

    fn text_content(&self) -> String {
        self.page
            .borrow()
            .element(self.id)
            .map(|el| el.text().collect())
            .unwrap_or_default()
    }

    fn set_text_content(&self, text: &str) {
        let mut page = self.page.borrow_mut();
        let Some(mut node) = page.html.tree.get_mut(self.id) else {
            return;
        };
        while let Some(mut child) = node.first_child() {
            child.detach();
        }
        if !text.is_empty() {
            node.append(Node::Text(Text { text: text.into() }));
        }
    }

    fn on_click(&self, handler: Box<dyn FnMut()>) {
        self.page
            .borrow_mut()
            .handlers
            .entry(self.id)
            .or_default()
            .push(handler);
    }
}

/// A [`Scheduler`] that holds tasks until the test runs them.
#[derive(Default)]
pub struct ManualScheduler {
    tasks: RefCell<Vec<(Duration, Box<dyn FnOnce()>)>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Delays of the waiting tasks, in scheduling order.
    #[must_use]
    pub fn delays(&self) -> Vec<Duration> {
        self.tasks.borrow().iter().map(|(d, _)| *d).collect()
    }

    /// Run every waiting task, shortest delay first. Tasks scheduled while
    /// running wait for the next call.
    pub fn run_all(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        tasks.sort_by_key(|(delay, _)| *delay);
        for (_, task) in tasks {
            task();
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        self.tasks.borrow_mut().push((delay, task));
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
