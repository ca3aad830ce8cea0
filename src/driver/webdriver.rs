//! W3C WebDriver browser backed by fantoccini.
//!
//! fantoccini is async; sessions in this crate are synchronous and owned by a
//! single worker thread. Each `WebDriverBrowser` therefore carries its own
//! current-thread tokio runtime and blocks on every command. Calling into a
//! `WebDriverBrowser` from inside another tokio runtime is not supported.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use fantoccini::actions::{
    InputSource, MOUSE_BUTTON_LEFT, MOUSE_BUTTON_RIGHT, MouseActions, PointerAction,
};
use fantoccini::elements::{Element, ElementRef};
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use super::{
    Browser, BrowserFactory, BrowserKind, DriverError, DriverResult, ElementHandle,
    LaunchOptions, Screenshottable, SessionDriver,
};
use crate::locator::Locator;

/// Default WebDriver endpoint (geckodriver's default port)
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Launches browsers through a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    url: String,
}

impl WebDriverFactory {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// W3C capabilities for the requested engine and mode
    pub fn capabilities(options: &LaunchOptions) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!(options.browser.as_str()));
        match options.browser {
            BrowserKind::Firefox => {
                let args: Vec<String> = if options.headless {
                    vec!["-headless".to_string()]
                } else {
                    Vec::new()
                };
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            BrowserKind::Chrome => {
                let mut args = Vec::new();
                if options.headless {
                    let (width, height) = options.browser.headless_viewport();
                    args.push("--headless=new".to_string());
                    args.push(format!("--window-size={},{}", width, height));
                }
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }
        caps
    }
}

impl Default for WebDriverFactory {
    fn default() -> Self {
        Self::new(DEFAULT_WEBDRIVER_URL)
    }
}

impl BrowserFactory for WebDriverFactory {
    fn launch(&self, options: &LaunchOptions) -> DriverResult<Box<dyn SessionDriver>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DriverError::SessionNotCreated(format!("failed to start runtime: {}", e)))?;

        debug!(url = %self.url, browser = %options.browser, headless = options.headless, "Connecting to WebDriver");
        let caps = Self::capabilities(options);
        let client = runtime
            .block_on(ClientBuilder::native().capabilities(caps).connect(&self.url))
            .map_err(|e| DriverError::SessionNotCreated(e.to_string()))?;
        info!(browser = %options.browser, "WebDriver session created");

        Ok(Box::new(WebDriverBrowser {
            runtime,
            client,
            elements: Mutex::new(ElementTable::default()),
            next_id: AtomicU64::new(1),
        }))
    }
}

/// A live WebDriver session
pub struct WebDriverBrowser {
    runtime: Runtime,
    client: Client,
    elements: Mutex<ElementTable>,
    next_id: AtomicU64,
}

/// Live element references of the current page.
///
/// Every poll of a wait looks its target up again; a reference the driver
/// already returned keeps its handle, so the table only grows with distinct
/// elements.
#[derive(Default)]
struct ElementTable {
    by_handle: HashMap<u64, Element>,
    by_ref: HashMap<ElementRef, u64>,
}

impl ElementTable {
    fn len(&self) -> usize {
        self.by_handle.len()
    }

    fn clear(&mut self) {
        self.by_handle.clear();
        self.by_ref.clear();
    }
}

impl std::fmt::Debug for WebDriverBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDriverBrowser")
            .field("elements", &self.elements().len())
            .finish_non_exhaustive()
    }
}

impl WebDriverBrowser {
    fn elements(&self) -> std::sync::MutexGuard<'_, ElementTable> {
        self.elements.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn register(&self, found: Vec<Element>) -> Vec<ElementHandle> {
        let mut elements = self.elements();
        found
            .into_iter()
            .map(|element| {
                let reference = element.element_id();
                let known = elements.by_ref.get(&reference).copied();
                let id = match known {
                    Some(id) => id,
                    None => {
                        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                        elements.by_ref.insert(reference, id);
                        elements.by_handle.insert(id, element);
                        id
                    }
                };
                ElementHandle::new(id)
            })
            .collect()
    }

    fn element(&self, handle: ElementHandle) -> DriverResult<Element> {
        self.elements()
            .by_handle
            .get(&handle.raw())
            .cloned()
            .ok_or(DriverError::StaleElement)
    }

    fn run<T>(&self, fut: impl std::future::Future<Output = Result<T, CmdError>>) -> DriverResult<T> {
        self.runtime.block_on(fut).map_err(map_cmd_error)
    }

    fn pointer(&self, element: ElementHandle, clicks: &[u64]) -> DriverResult<()> {
        let element = self.element(element)?;
        let mut actions = MouseActions::new("mouse".to_string()).then(PointerAction::MoveToElement {
            element,
            duration: None,
            x: Default::default(),
            y: Default::default(),
        });
        for &button in clicks {
            actions = actions
                .then(PointerAction::Down { button })
                .then(PointerAction::Up { button });
        }
        self.run(self.client.perform_actions(actions))
    }
}

fn web_locator(locator: &Locator) -> DriverResult<(String, LocatorKind)> {
    match locator {
        Locator::LinkText(text) => Ok((text.clone(), LocatorKind::LinkText)),
        Locator::XPath(xpath) => Ok((xpath.clone(), LocatorKind::XPath)),
        other => other
            .as_css()
            .map(|css| (css, LocatorKind::Css))
            .ok_or_else(|| DriverError::Unsupported(format!("locator {} must be resolved first", other))),
    }
}

#[derive(Clone, Copy)]
enum LocatorKind {
    Css,
    LinkText,
    XPath,
}

fn as_fantoccini(selector: &str, kind: LocatorKind) -> fantoccini::Locator<'_> {
    match kind {
        LocatorKind::Css => fantoccini::Locator::Css(selector),
        LocatorKind::LinkText => fantoccini::Locator::LinkText(selector),
        LocatorKind::XPath => fantoccini::Locator::XPath(selector),
    }
}

fn map_cmd_error(err: CmdError) -> DriverError {
    if err.is_no_such_element() {
        return DriverError::NoSuchElement(err.to_string());
    }
    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("stale element") {
        DriverError::StaleElement
    } else if lower.contains("not interactable") || lower.contains("intercepted") {
        DriverError::NotInteractable(message)
    } else if lower.contains("javascript error") || lower.contains("script timeout") {
        DriverError::Script(message)
    } else if lower.contains("invalid session id") {
        DriverError::SessionClosed
    } else {
        DriverError::Command(message)
    }
}

impl Browser for WebDriverBrowser {
    fn navigate(&self, url: &str) -> DriverResult<()> {
        self.run(self.client.goto(url))?;
        // Element references never survive a navigation
        self.elements().clear();
        Ok(())
    }

    fn current_url(&self) -> DriverResult<String> {
        Ok(self.run(self.client.current_url())?.to_string())
    }

    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementHandle>> {
        let (selector, kind) = web_locator(locator)?;
        let found = self.run(self.client.find_all(as_fantoccini(&selector, kind)))?;
        Ok(self.register(found))
    }

    fn find_elements_in(&self, parent: ElementHandle, locator: &Locator) -> DriverResult<Vec<ElementHandle>> {
        let parent = self.element(parent)?;
        let (selector, kind) = web_locator(locator)?;
        let found = self.run(parent.find_all(as_fantoccini(&selector, kind)))?;
        Ok(self.register(found))
    }

    fn is_displayed(&self, element: ElementHandle) -> DriverResult<bool> {
        let element = self.element(element)?;
        self.run(element.is_displayed())
    }

    fn is_enabled(&self, element: ElementHandle) -> DriverResult<bool> {
        let element = self.element(element)?;
        self.run(element.is_enabled())
    }

    fn is_selected(&self, element: ElementHandle) -> DriverResult<bool> {
        let element = self.element(element)?;
        self.run(element.is_selected())
    }

    fn click(&self, element: ElementHandle) -> DriverResult<()> {
        let element = self.element(element)?;
        self.run(element.click())
    }

    fn clear(&self, element: ElementHandle) -> DriverResult<()> {
        let element = self.element(element)?;
        self.run(element.clear())
    }

    fn send_keys(&self, element: ElementHandle, text: &str) -> DriverResult<()> {
        let element = self.element(element)?;
        self.run(element.send_keys(text))
    }

    fn text(&self, element: ElementHandle) -> DriverResult<String> {
        let element = self.element(element)?;
        self.run(element.text())
    }

    fn attribute(&self, element: ElementHandle, name: &str) -> DriverResult<Option<String>> {
        let element = self.element(element)?;
        self.run(element.attr(name))
    }

    fn css_value(&self, element: ElementHandle, property: &str) -> DriverResult<String> {
        let element = self.element(element)?;
        self.run(element.css_value(property))
    }

    fn select_by_visible_text(&self, element: ElementHandle, text: &str) -> DriverResult<()> {
        let element = self.element(element)?;
        self.run(element.select_by_label(text))
    }

    fn select_by_value(&self, element: ElementHandle, value: &str) -> DriverResult<()> {
        let element = self.element(element)?;
        self.run(element.select_by_value(value))
    }

    fn select_by_index(&self, element: ElementHandle, index: usize) -> DriverResult<()> {
        let element = self.element(element)?;
        self.run(element.select_by_index(index))
    }

    fn double_click(&self, element: ElementHandle) -> DriverResult<()> {
        self.pointer(element, &[MOUSE_BUTTON_LEFT, MOUSE_BUTTON_LEFT])
    }

    fn context_click(&self, element: ElementHandle) -> DriverResult<()> {
        self.pointer(element, &[MOUSE_BUTTON_RIGHT])
    }

    fn hover(&self, element: ElementHandle) -> DriverResult<()> {
        self.pointer(element, &[])
    }

    fn drag_and_drop(&self, source: ElementHandle, target: ElementHandle) -> DriverResult<()> {
        let source = self.element(source)?;
        let target = self.element(target)?;
        let actions = MouseActions::new("mouse".to_string())
            .then(PointerAction::MoveToElement {
                element: source,
                duration: None,
                x: Default::default(),
                y: Default::default(),
            })
            .then(PointerAction::Down {
                button: MOUSE_BUTTON_LEFT,
            })
            .then(PointerAction::MoveToElement {
                element: target,
                duration: None,
                x: Default::default(),
                y: Default::default(),
            })
            .then(PointerAction::Up {
                button: MOUSE_BUTTON_LEFT,
            });
        self.run(self.client.perform_actions(actions))
    }

    fn execute_script(&self, script: &str, element: Option<ElementHandle>) -> DriverResult<Value> {
        let mut args = Vec::new();
        if let Some(handle) = element {
            let element = self.element(handle)?;
            let arg = serde_json::to_value(&element)
                .map_err(|e| DriverError::Script(format!("cannot pass element to script: {}", e)))?;
            args.push(arg);
        }
        self.run(self.client.execute(script, args))
    }

    fn maximize_window(&self) -> DriverResult<()> {
        self.run(self.client.maximize_window())
    }

    fn set_window_size(&self, width: u32, height: u32) -> DriverResult<()> {
        self.run(self.client.set_window_size(width, height))
    }

    fn quit(&self) -> DriverResult<()> {
        self.elements().clear();
        self.run(self.client.clone().close())
    }
}

impl Screenshottable for WebDriverBrowser {
    fn screenshot(&self) -> DriverResult<Vec<u8>> {
        self.run(self.client.screenshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_firefox_capabilities() {
        let caps = WebDriverFactory::capabilities(&LaunchOptions::new(BrowserKind::Firefox, true));
        assert_eq!(caps["browserName"], "firefox");
        assert_eq!(caps["moz:firefoxOptions"]["args"], json!(["-headless"]));
    }

    #[test]
    fn test_headless_chrome_capabilities() {
        let caps = WebDriverFactory::capabilities(&LaunchOptions::new(BrowserKind::Chrome, true));
        assert_eq!(
            caps["goog:chromeOptions"]["args"],
            json!(["--headless=new", "--window-size=1920,1080"])
        );
    }

    #[test]
    fn test_headed_capabilities_have_no_args() {
        let caps = WebDriverFactory::capabilities(&LaunchOptions::new(BrowserKind::Chrome, false));
        assert_eq!(caps["goog:chromeOptions"]["args"], json!([]));
    }

    #[test]
    fn test_within_locator_is_rejected() {
        let locator = Locator::css("form").within(Locator::id("x"));
        assert!(matches!(web_locator(&locator), Err(DriverError::Unsupported(_))));
    }
}
