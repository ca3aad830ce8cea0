//! In-memory browser.
//!
//! Pages are built by route handlers that populate a `MemoryDom` with
//! elements. Elements answer to the locators they were registered under, and
//! carry click/enter/change handlers that mutate the DOM (usually by
//! navigating). Screenshots are rendered through a `Framebuffer`.
//!
//! ```rust
//! use storefront_e2e::driver::{Browser, MemoryBrowser, MemoryElement};
//! use storefront_e2e::Locator;
//!
//! let browser = MemoryBrowser::builder()
//!     .route("https://example.test/", |dom| {
//!         dom.add(MemoryElement::new(Locator::id("greeting")).text("hello"));
//!     })
//!     .build();
//! browser.navigate("https://example.test/").unwrap();
//! let found = browser.find_elements(&Locator::id("greeting")).unwrap();
//! assert_eq!(browser.text(found[0]).unwrap(), "hello");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::framebuffer::Framebuffer;
use super::scripts::{self, keys};
use super::{
    Browser, BrowserFactory, DriverError, DriverResult, ElementHandle, LaunchOptions,
    Screenshottable, SessionDriver,
};
use crate::locator::Locator;

/// Handler run against the DOM (route builders, element events, scheduled changes)
pub type DomHandler = Arc<dyn Fn(&mut MemoryDom) + Send + Sync>;

/// URL of the empty page a fresh browser starts on
pub const BLANK_PAGE: &str = "about:blank";

const SCREEN_WIDTH: u32 = 800;
const SCREEN_HEIGHT: u32 = 600;
const LINE_HEIGHT: u32 = 12;

/// An option of a native select control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub text: String,
    pub value: String,
}

/// An element of the in-memory page
#[derive(Clone)]
pub struct MemoryElement {
    locators: Vec<Locator>,
    text: String,
    value: String,
    attributes: HashMap<String, String>,
    styles: HashMap<String, String>,
    displayed: bool,
    enabled: bool,
    selected: bool,
    checkable: bool,
    obscured: bool,
    ignores_clear: bool,
    file_input: bool,
    options: Vec<SelectOption>,
    on_click: Option<DomHandler>,
    on_enter: Option<DomHandler>,
    on_change: Option<DomHandler>,
}

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryElement")
            .field("locators", &self.locators)
            .field("text", &self.text)
            .field("value", &self.value)
            .field("displayed", &self.displayed)
            .field("enabled", &self.enabled)
            .field("selected", &self.selected)
            .field("obscured", &self.obscured)
            .finish_non_exhaustive()
    }
}

impl MemoryElement {
    /// A visible, enabled element answering to `locator`
    pub fn new(locator: Locator) -> Self {
        Self {
            locators: vec![locator],
            text: String::new(),
            value: String::new(),
            attributes: HashMap::new(),
            styles: HashMap::new(),
            displayed: true,
            enabled: true,
            selected: false,
            checkable: false,
            obscured: false,
            ignores_clear: false,
            file_input: false,
            options: Vec::new(),
            on_click: None,
            on_enter: None,
            on_change: None,
        }
    }

    /// Also answer to `locator`
    pub fn also(mut self, locator: Locator) -> Self {
        self.locators.push(locator);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(property.into(), value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// A checkbox; clicking toggles its selected state
    pub fn checkbox(mut self, checked: bool) -> Self {
        self.checkable = true;
        self.selected = checked;
        self
    }

    /// Covered by another element; native clicks are intercepted
    pub fn obscured(mut self) -> Self {
        self.obscured = true;
        self
    }

    /// Ignores the native clear command, like some custom input widgets
    pub fn ignores_clear(mut self) -> Self {
        self.ignores_clear = true;
        self
    }

    /// A file input; accepts typed paths even when hidden
    pub fn file_input(mut self) -> Self {
        self.file_input = true;
        self
    }

    pub fn option(mut self, text: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(SelectOption {
            text: text.into(),
            value: value.into(),
        });
        self
    }

    pub fn on_click(mut self, handler: impl Fn(&mut MemoryDom) + Send + Sync + 'static) -> Self {
        self.on_click = Some(Arc::new(handler));
        self
    }

    pub fn on_enter(mut self, handler: impl Fn(&mut MemoryDom) + Send + Sync + 'static) -> Self {
        self.on_enter = Some(Arc::new(handler));
        self
    }

    pub fn on_change(mut self, handler: impl Fn(&mut MemoryDom) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(handler));
        self
    }

    pub fn matches(&self, locator: &Locator) -> bool {
        self.locators.contains(locator)
    }

    pub fn get_text(&self) -> &str {
        &self.text
    }

    pub fn get_value(&self) -> &str {
        &self.value
    }

    pub fn is_displayed(&self) -> bool {
        self.displayed
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn set_displayed(&mut self, displayed: bool) {
        self.displayed = displayed;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_obscured(&mut self, obscured: bool) {
        self.obscured = obscured;
    }

    fn label(&self) -> String {
        self.locators
            .first()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "<anonymous>".to_string())
    }

    fn ensure_interactable(&self) -> DriverResult<()> {
        if !self.displayed {
            return Err(DriverError::NotInteractable(format!(
                "{} is not visible",
                self.label()
            )));
        }
        if !self.enabled {
            return Err(DriverError::NotInteractable(format!(
                "{} is disabled",
                self.label()
            )));
        }
        Ok(())
    }
}

struct Node {
    id: u64,
    parent: Option<u64>,
    element: MemoryElement,
}

/// Document state of the in-memory browser
pub struct MemoryDom {
    url: String,
    nodes: Vec<Node>,
    next_id: u64,
    routes: Arc<HashMap<String, DomHandler>>,
    load_polls: u32,
    loading_polls: u32,
    failing_ready_checks: u32,
    scheduled: Vec<(Instant, DomHandler)>,
    events: Vec<String>,
}

impl MemoryDom {
    fn new(routes: Arc<HashMap<String, DomHandler>>, load_polls: u32, failing_ready_checks: u32) -> Self {
        Self {
            url: BLANK_PAGE.to_string(),
            nodes: Vec::new(),
            next_id: 1,
            routes,
            load_polls,
            loading_polls: 0,
            failing_ready_checks,
            scheduled: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replace the document with the page routed at `url`.
    ///
    /// Handles to elements of the previous page become stale.
    pub fn navigate(&mut self, url: &str) {
        self.url = url.to_string();
        self.nodes.clear();
        self.loading_polls = self.load_polls;
        self.events.push(format!("navigate {}", url));
        if let Some(route) = self.routes.get(url).cloned() {
            route(self);
        }
    }

    pub fn add(&mut self, element: MemoryElement) -> ElementHandle {
        self.insert(None, element)
    }

    pub fn add_child(&mut self, parent: ElementHandle, element: MemoryElement) -> ElementHandle {
        self.insert(Some(parent.raw()), element)
    }

    fn insert(&mut self, parent: Option<u64>, element: MemoryElement) -> ElementHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.push(Node {
            id,
            parent,
            element,
        });
        ElementHandle::new(id)
    }

    /// First element matching `locator`
    pub fn element(&self, locator: &Locator) -> Option<&MemoryElement> {
        self.nodes
            .iter()
            .find(|n| n.element.matches(locator))
            .map(|n| &n.element)
    }

    pub fn element_mut(&mut self, locator: &Locator) -> Option<&mut MemoryElement> {
        self.nodes
            .iter_mut()
            .find(|n| n.element.matches(locator))
            .map(|n| &mut n.element)
    }

    /// Current value of the first element matching `locator`, or empty
    pub fn value_of(&self, locator: &Locator) -> String {
        self.element(locator)
            .map(|e| e.value.clone())
            .unwrap_or_default()
    }

    /// Remove every element matching `locator` together with its descendants
    pub fn remove(&mut self, locator: &Locator) {
        let mut doomed: Vec<u64> = self
            .nodes
            .iter()
            .filter(|n| n.element.matches(locator))
            .map(|n| n.id)
            .collect();
        let mut i = 0;
        while i < doomed.len() {
            let parent = doomed[i];
            for node in &self.nodes {
                if node.parent == Some(parent) && !doomed.contains(&node.id) {
                    doomed.push(node.id);
                }
            }
            i += 1;
        }
        self.nodes.retain(|n| !doomed.contains(&n.id));
    }

    /// Run `handler` on the first browser call made after `delay`
    pub fn schedule(&mut self, delay: Duration, handler: impl Fn(&mut MemoryDom) + Send + Sync + 'static) {
        self.scheduled.push((Instant::now() + delay, Arc::new(handler)));
    }

    /// Append an entry to the interaction log
    pub fn record(&mut self, event: impl Into<String>) {
        self.events.push(event.into());
    }

    fn apply_due(&mut self) {
        let now = Instant::now();
        let (due, pending): (Vec<_>, Vec<_>) =
            self.scheduled.drain(..).partition(|(at, _)| *at <= now);
        self.scheduled = pending;
        for (_, handler) in due {
            handler(self);
        }
    }

    fn node(&self, handle: ElementHandle) -> DriverResult<&Node> {
        self.nodes
            .iter()
            .find(|n| n.id == handle.raw())
            .ok_or(DriverError::StaleElement)
    }

    fn node_mut(&mut self, handle: ElementHandle) -> DriverResult<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == handle.raw())
            .ok_or(DriverError::StaleElement)
    }

    fn is_descendant(&self, node: &Node, ancestor: u64) -> bool {
        let mut parent = node.parent;
        while let Some(id) = parent {
            if id == ancestor {
                return true;
            }
            parent = self.nodes.iter().find(|n| n.id == id).and_then(|n| n.parent);
        }
        false
    }

    fn select_option(&mut self, handle: ElementHandle, index: Option<usize>, wanted: &str) -> DriverResult<()> {
        let node = self.node_mut(handle)?;
        node.element.ensure_interactable()?;
        if node.element.options.is_empty() {
            return Err(DriverError::Unsupported(format!(
                "{} is not a select element",
                node.element.label()
            )));
        }
        let index = index.ok_or_else(|| DriverError::NoSuchElement(format!("option {}", wanted)))?;
        let option = node
            .element
            .options
            .get(index)
            .cloned()
            .ok_or_else(|| DriverError::NoSuchElement(format!("option {}", wanted)))?;
        node.element.value = option.value.clone();
        let label = node.element.label();
        let handler = node.element.on_change.clone();
        self.record(format!("select {} {}", label, option.value));
        if let Some(handler) = handler {
            handler(self);
        }
        Ok(())
    }

    fn render(&self) -> DriverResult<Vec<u8>> {
        let bg = [250, 250, 250];
        let bar = [40, 40, 40];
        let mut fb = Framebuffer::with_color(SCREEN_WIDTH, SCREEN_HEIGHT, bg);
        fb.draw_rect(0, 0, SCREEN_WIDTH, 16, bar);
        fb.draw_text(4, 4, &self.url, [255, 255, 255], bar);

        let mut y = 24;
        for node in self.nodes.iter().filter(|n| n.element.displayed) {
            let line = if !node.element.text.is_empty() {
                &node.element.text
            } else if !node.element.value.is_empty() {
                &node.element.value
            } else {
                continue;
            };
            if y + LINE_HEIGHT > SCREEN_HEIGHT {
                break;
            }
            fb.draw_text(8, y, line, [20, 20, 20], bg);
            y += LINE_HEIGHT;
        }
        fb.to_png()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Faults {
    screenshot: bool,
    maximize: bool,
    quit: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct WindowState {
    maximized: bool,
    size: Option<(u32, u32)>,
}

struct BrowserState {
    dom: MemoryDom,
    window: WindowState,
    faults: Faults,
    launch: Option<LaunchOptions>,
    closed: bool,
}

/// Builder for `MemoryBrowser`
#[derive(Default)]
pub struct MemoryBrowserBuilder {
    routes: HashMap<String, DomHandler>,
    start_url: Option<String>,
    load_polls: u32,
    failing_ready_checks: u32,
    faults: Faults,
}

impl MemoryBrowserBuilder {
    /// Page built when navigating to `url`
    pub fn route(mut self, url: impl Into<String>, handler: impl Fn(&mut MemoryDom) + Send + Sync + 'static) -> Self {
        self.routes.insert(url.into(), Arc::new(handler));
        self
    }

    /// Navigate here when the browser is built
    pub fn start_at(mut self, url: impl Into<String>) -> Self {
        self.start_url = Some(url.into());
        self
    }

    /// Number of readiness checks answered with "loading" after each navigation
    pub fn load_polls(mut self, polls: u32) -> Self {
        self.load_polls = polls;
        self
    }

    /// Number of readiness checks that fail with a script error
    pub fn failing_ready_checks(mut self, checks: u32) -> Self {
        self.failing_ready_checks = checks;
        self
    }

    pub fn fail_screenshots(mut self) -> Self {
        self.faults.screenshot = true;
        self
    }

    pub fn fail_maximize(mut self) -> Self {
        self.faults.maximize = true;
        self
    }

    pub fn fail_quit(mut self) -> Self {
        self.faults.quit = true;
        self
    }

    pub fn build(self) -> MemoryBrowser {
        let mut dom = MemoryDom::new(Arc::new(self.routes), self.load_polls, self.failing_ready_checks);
        if let Some(url) = &self.start_url {
            dom.navigate(url);
        }
        MemoryBrowser {
            state: Arc::new(Mutex::new(BrowserState {
                dom,
                window: WindowState::default(),
                faults: self.faults,
                launch: None,
                closed: false,
            })),
        }
    }
}

/// Browser backed by an in-memory page model.
///
/// Clones share the same state, so a test can keep a clone to inspect a
/// browser that has been boxed into a session.
#[derive(Clone)]
pub struct MemoryBrowser {
    state: Arc<Mutex<BrowserState>>,
}

impl fmt::Debug for MemoryBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.raw_state();
        f.debug_struct("MemoryBrowser")
            .field("url", &st.dom.url)
            .field("elements", &st.dom.nodes.len())
            .field("closed", &st.closed)
            .finish()
    }
}

impl Default for MemoryBrowser {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MemoryBrowser {
    pub fn builder() -> MemoryBrowserBuilder {
        MemoryBrowserBuilder::default()
    }

    /// A browser showing a single page built by `page`
    pub fn with_page(page: impl Fn(&mut MemoryDom) + Send + Sync + 'static) -> Self {
        Self::builder().route(BLANK_PAGE, page).start_at(BLANK_PAGE).build()
    }

    /// Mutate the document directly
    pub fn with_dom<T>(&self, f: impl FnOnce(&mut MemoryDom) -> T) -> T {
        let mut st = self.raw_state();
        f(&mut st.dom)
    }

    /// Interaction log (navigations, clicks, typing, selections, scripts)
    pub fn events(&self) -> Vec<String> {
        self.raw_state().dom.events.clone()
    }

    /// Number of logged events equal to `event`
    pub fn count(&self, event: &str) -> usize {
        self.raw_state().dom.events.iter().filter(|e| *e == event).count()
    }

    pub fn is_closed(&self) -> bool {
        self.raw_state().closed
    }

    pub fn is_maximized(&self) -> bool {
        self.raw_state().window.maximized
    }

    pub fn window_size(&self) -> Option<(u32, u32)> {
        self.raw_state().window.size
    }

    pub fn launch_options(&self) -> Option<LaunchOptions> {
        self.raw_state().launch
    }

    fn raw_state(&self) -> MutexGuard<'_, BrowserState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn state(&self) -> DriverResult<MutexGuard<'_, BrowserState>> {
        let mut st = self.raw_state();
        if st.closed {
            return Err(DriverError::SessionClosed);
        }
        st.dom.apply_due();
        Ok(st)
    }

    fn element_state<T>(&self, element: ElementHandle, f: impl FnOnce(&MemoryElement) -> T) -> DriverResult<T> {
        let st = self.state()?;
        let node = st.dom.node(element)?;
        Ok(f(&node.element))
    }

    fn pointer(&self, element: ElementHandle, kind: &str) -> DriverResult<()> {
        let mut st = self.state()?;
        let node = st.dom.node(element)?;
        if !node.element.displayed {
            return Err(DriverError::NotInteractable(format!(
                "{} is not visible",
                node.element.label()
            )));
        }
        let label = node.element.label();
        st.dom.record(format!("{} {}", kind, label));
        Ok(())
    }

    fn activate(&self, element: ElementHandle, kind: &str, native: bool) -> DriverResult<()> {
        let mut st = self.state()?;
        let dom = &mut st.dom;
        let node = dom.node_mut(element)?;
        if native {
            if !node.element.displayed {
                return Err(DriverError::NotInteractable(format!(
                    "{} is not visible",
                    node.element.label()
                )));
            }
            if node.element.obscured {
                return Err(DriverError::NotInteractable(format!(
                    "element click intercepted on {}",
                    node.element.label()
                )));
            }
        }
        let label = node.element.label();
        if !node.element.enabled {
            dom.record(format!("{} {} (disabled)", kind, label));
            return Ok(());
        }
        if node.element.checkable {
            node.element.selected = !node.element.selected;
        }
        let handler = node.element.on_click.clone();
        dom.record(format!("{} {}", kind, label));
        if let Some(handler) = handler {
            handler(dom);
        }
        Ok(())
    }
}

impl Browser for MemoryBrowser {
    fn navigate(&self, url: &str) -> DriverResult<()> {
        self.state()?.dom.navigate(url);
        Ok(())
    }

    fn current_url(&self) -> DriverResult<String> {
        Ok(self.state()?.dom.url.clone())
    }

    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementHandle>> {
        let st = self.state()?;
        Ok(st
            .dom
            .nodes
            .iter()
            .filter(|n| n.element.matches(locator))
            .map(|n| ElementHandle::new(n.id))
            .collect())
    }

    fn find_elements_in(&self, parent: ElementHandle, locator: &Locator) -> DriverResult<Vec<ElementHandle>> {
        let st = self.state()?;
        let parent = st.dom.node(parent)?.id;
        Ok(st
            .dom
            .nodes
            .iter()
            .filter(|n| n.element.matches(locator) && st.dom.is_descendant(n, parent))
            .map(|n| ElementHandle::new(n.id))
            .collect())
    }

    fn is_displayed(&self, element: ElementHandle) -> DriverResult<bool> {
        self.element_state(element, |e| e.displayed)
    }

    fn is_enabled(&self, element: ElementHandle) -> DriverResult<bool> {
        self.element_state(element, |e| e.enabled)
    }

    fn is_selected(&self, element: ElementHandle) -> DriverResult<bool> {
        self.element_state(element, |e| e.selected)
    }

    fn click(&self, element: ElementHandle) -> DriverResult<()> {
        self.activate(element, "click", true)
    }

    fn clear(&self, element: ElementHandle) -> DriverResult<()> {
        let mut st = self.state()?;
        let node = st.dom.node_mut(element)?;
        node.element.ensure_interactable()?;
        if !node.element.ignores_clear {
            node.element.value.clear();
        }
        let label = node.element.label();
        st.dom.record(format!("clear {}", label));
        Ok(())
    }

    fn send_keys(&self, element: ElementHandle, text: &str) -> DriverResult<()> {
        let mut st = self.state()?;
        let node = st.dom.node_mut(element)?;
        if node.element.file_input {
            if !node.element.enabled {
                return Err(DriverError::NotInteractable(format!(
                    "{} is disabled",
                    node.element.label()
                )));
            }
        } else {
            node.element.ensure_interactable()?;
        }

        let mut control = false;
        let mut all_selected = false;
        let mut enter = false;
        for ch in text.chars() {
            match ch {
                keys::CONTROL => control = true,
                keys::NULL => control = false,
                keys::ENTER => enter = true,
                keys::DELETE => {
                    if all_selected {
                        node.element.value.clear();
                        all_selected = false;
                    }
                }
                'a' | 'A' if control => all_selected = true,
                ch => {
                    if all_selected {
                        node.element.value.clear();
                        all_selected = false;
                    }
                    node.element.value.push(ch);
                }
            }
        }

        let label = node.element.label();
        let handler = if enter { node.element.on_enter.clone() } else { None };
        st.dom.record(format!("type {}", label));
        if let Some(handler) = handler {
            handler(&mut st.dom);
        }
        Ok(())
    }

    fn text(&self, element: ElementHandle) -> DriverResult<String> {
        self.element_state(element, |e| {
            if e.displayed {
                e.text.clone()
            } else {
                String::new()
            }
        })
    }

    fn attribute(&self, element: ElementHandle, name: &str) -> DriverResult<Option<String>> {
        self.element_state(element, |e| match name {
            "value" => Some(e.value.clone()),
            other => e.attributes.get(other).cloned(),
        })
    }

    fn css_value(&self, element: ElementHandle, property: &str) -> DriverResult<String> {
        self.element_state(element, |e| e.styles.get(property).cloned().unwrap_or_default())
    }

    fn select_by_visible_text(&self, element: ElementHandle, text: &str) -> DriverResult<()> {
        let mut st = self.state()?;
        let index = st.dom.node(element)?.element.options.iter().position(|o| o.text == text);
        st.dom.select_option(element, index, &format!("with text '{}'", text))
    }

    fn select_by_value(&self, element: ElementHandle, value: &str) -> DriverResult<()> {
        let mut st = self.state()?;
        let index = st.dom.node(element)?.element.options.iter().position(|o| o.value == value);
        st.dom.select_option(element, index, &format!("with value '{}'", value))
    }

    fn select_by_index(&self, element: ElementHandle, index: usize) -> DriverResult<()> {
        let mut st = self.state()?;
        st.dom.select_option(element, Some(index), &format!("at index {}", index))
    }

    fn double_click(&self, element: ElementHandle) -> DriverResult<()> {
        self.pointer(element, "dblclick")
    }

    fn context_click(&self, element: ElementHandle) -> DriverResult<()> {
        self.pointer(element, "contextclick")
    }

    fn hover(&self, element: ElementHandle) -> DriverResult<()> {
        self.pointer(element, "hover")
    }

    fn drag_and_drop(&self, source: ElementHandle, target: ElementHandle) -> DriverResult<()> {
        let mut st = self.state()?;
        let mut labels = Vec::with_capacity(2);
        for handle in [source, target] {
            let node = st.dom.node(handle)?;
            if !node.element.displayed {
                return Err(DriverError::NotInteractable(format!(
                    "{} is not visible",
                    node.element.label()
                )));
            }
            labels.push(node.element.label());
        }
        st.dom.record(format!("drag {} -> {}", labels[0], labels[1]));
        Ok(())
    }

    fn execute_script(&self, script: &str, element: Option<ElementHandle>) -> DriverResult<serde_json::Value> {
        let argument = || element.ok_or_else(|| DriverError::Script("missing arguments[0]".to_string()));
        match script {
            scripts::READY_STATE => {
                let mut st = self.state()?;
                let dom = &mut st.dom;
                if dom.failing_ready_checks > 0 {
                    dom.failing_ready_checks -= 1;
                    return Err(DriverError::Script("document is not available".to_string()));
                }
                if dom.loading_polls > 0 {
                    dom.loading_polls -= 1;
                    return Ok(serde_json::Value::String("loading".to_string()));
                }
                Ok(serde_json::Value::String(scripts::READY_STATE_COMPLETE.to_string()))
            }
            scripts::CLICK => {
                self.activate(argument()?, "jsclick", false)?;
                Ok(serde_json::Value::Null)
            }
            scripts::SCROLL_INTO_VIEW => {
                self.pointer(argument()?, "scroll")?;
                Ok(serde_json::Value::Null)
            }
            scripts::IS_UNOBSCURED => {
                let obscured = self.element_state(argument()?, |e| e.obscured)?;
                Ok(serde_json::Value::Bool(!obscured))
            }
            other => Err(DriverError::Unsupported(format!(
                "script not understood by the in-memory browser: {}",
                other
            ))),
        }
    }

    fn maximize_window(&self) -> DriverResult<()> {
        let mut st = self.state()?;
        if st.faults.maximize {
            return Err(DriverError::Unsupported("window cannot be maximized".to_string()));
        }
        st.window.maximized = true;
        Ok(())
    }

    fn set_window_size(&self, width: u32, height: u32) -> DriverResult<()> {
        self.state()?.window.size = Some((width, height));
        Ok(())
    }

    fn quit(&self) -> DriverResult<()> {
        let mut st = self.state()?;
        st.closed = true;
        if st.faults.quit {
            return Err(DriverError::Command("browser did not exit cleanly".to_string()));
        }
        Ok(())
    }
}

impl Screenshottable for MemoryBrowser {
    fn screenshot(&self) -> DriverResult<Vec<u8>> {
        let st = self.state()?;
        if st.faults.screenshot {
            return Err(DriverError::Command("screenshot failed".to_string()));
        }
        st.dom.render()
    }
}

/// Launches a fresh `MemoryBrowser` per session and keeps a clone of each
pub struct MemoryFactory {
    build: Box<dyn Fn() -> MemoryBrowser + Send + Sync>,
    launched: Mutex<Vec<MemoryBrowser>>,
}

impl MemoryFactory {
    pub fn new(build: impl Fn() -> MemoryBrowser + Send + Sync + 'static) -> Self {
        Self {
            build: Box::new(build),
            launched: Mutex::new(Vec::new()),
        }
    }

    /// Every browser launched so far, oldest first
    pub fn launched(&self) -> Vec<MemoryBrowser> {
        self.launched
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<MemoryBrowser> {
        self.launched().pop()
    }
}

impl BrowserFactory for MemoryFactory {
    fn launch(&self, options: &LaunchOptions) -> DriverResult<Box<dyn SessionDriver>> {
        let browser = (self.build)();
        browser.raw_state().launch = Some(*options);
        self.launched
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(browser.clone());
        Ok(Box::new(browser))
    }
}
