//! Browser automation capability traits.
//!
//! The rest of the crate talks to a browser only through these traits:
//! - `Browser` for navigation, element lookup, interaction and scripting
//! - `Screenshottable` for capturing the visible surface
//! - `BrowserFactory` for launching a fresh browser per session
//!
//! Two implementations ship with the crate: `WebDriverBrowser` (W3C WebDriver
//! via fantoccini) and `MemoryBrowser` (an in-memory page model).

pub mod framebuffer;
pub mod memory;
pub mod scripts;
pub mod webdriver;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::locator::Locator;

pub use framebuffer::Framebuffer;
pub use memory::{MemoryBrowser, MemoryBrowserBuilder, MemoryDom, MemoryElement, MemoryFactory};
pub use webdriver::{WebDriverBrowser, WebDriverFactory};

/// Result type for driver calls
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors reported by the automation boundary
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("no such element: {0}")]
    NoSuchElement(String),

    #[error("stale element reference")]
    StaleElement,

    #[error("element not interactable: {0}")]
    NotInteractable(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("session not created: {0}")]
    SessionNotCreated(String),

    #[error("browser session has been closed")]
    SessionClosed,

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("webdriver command failed: {0}")]
    Command(String),
}

/// Opaque reference to an element found in the current document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Raw browser capabilities.
///
/// Methods take `&self`; implementations synchronise internally so page
/// objects can share one session by reference.
pub trait Browser: Send + Sync {
    fn navigate(&self, url: &str) -> DriverResult<()>;

    fn current_url(&self) -> DriverResult<String>;

    /// Find all elements matching a non-relative locator
    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementHandle>>;

    /// Find all descendants of `parent` matching a non-relative locator
    fn find_elements_in(
        &self,
        parent: ElementHandle,
        locator: &Locator,
    ) -> DriverResult<Vec<ElementHandle>>;

    fn is_displayed(&self, element: ElementHandle) -> DriverResult<bool>;

    fn is_enabled(&self, element: ElementHandle) -> DriverResult<bool>;

    fn is_selected(&self, element: ElementHandle) -> DriverResult<bool>;

    fn click(&self, element: ElementHandle) -> DriverResult<()>;

    fn clear(&self, element: ElementHandle) -> DriverResult<()>;

    /// Type text; W3C key codepoints (see `scripts::keys`) are honoured
    fn send_keys(&self, element: ElementHandle, text: &str) -> DriverResult<()>;

    fn text(&self, element: ElementHandle) -> DriverResult<String>;

    fn attribute(&self, element: ElementHandle, name: &str) -> DriverResult<Option<String>>;

    fn css_value(&self, element: ElementHandle, property: &str) -> DriverResult<String>;

    fn select_by_visible_text(&self, element: ElementHandle, text: &str) -> DriverResult<()>;

    fn select_by_value(&self, element: ElementHandle, value: &str) -> DriverResult<()>;

    fn select_by_index(&self, element: ElementHandle, index: usize) -> DriverResult<()>;

    fn double_click(&self, element: ElementHandle) -> DriverResult<()>;

    fn context_click(&self, element: ElementHandle) -> DriverResult<()>;

    fn hover(&self, element: ElementHandle) -> DriverResult<()>;

    /// Press on `source`, move to `target`, release
    fn drag_and_drop(&self, source: ElementHandle, target: ElementHandle) -> DriverResult<()>;

    /// Run a script; `element` is passed as `arguments[0]` when present
    fn execute_script(
        &self,
        script: &str,
        element: Option<ElementHandle>,
    ) -> DriverResult<serde_json::Value>;

    fn maximize_window(&self) -> DriverResult<()>;

    fn set_window_size(&self, width: u32, height: u32) -> DriverResult<()>;

    /// End the browser session and release its resources
    fn quit(&self) -> DriverResult<()>;
}

/// Capability to capture the visible surface as PNG bytes
pub trait Screenshottable {
    fn screenshot(&self) -> DriverResult<Vec<u8>>;
}

/// A browser usable as a session: it must also be able to take screenshots.
pub trait SessionDriver: Browser + Screenshottable {
    fn as_browser(&self) -> &dyn Browser;

    fn as_surface(&self) -> &dyn Screenshottable;
}

impl<T: Browser + Screenshottable> SessionDriver for T {
    fn as_browser(&self) -> &dyn Browser {
        self
    }

    fn as_surface(&self) -> &dyn Screenshottable {
        self
    }
}

/// Launches browsers for new sessions
pub trait BrowserFactory: Send + Sync {
    fn launch(&self, options: &LaunchOptions) -> DriverResult<Box<dyn SessionDriver>>;
}

/// Resolve a locator, including relative (`Locator::Within`) ones
pub fn locate(browser: &dyn Browser, locator: &Locator) -> DriverResult<Vec<ElementHandle>> {
    match locator {
        Locator::Within { parent, child } => {
            let mut found = Vec::new();
            for handle in locate(browser, parent)? {
                found.extend(locate_in(browser, handle, child)?);
            }
            Ok(found)
        }
        simple => browser.find_elements(simple),
    }
}

/// Resolve a locator relative to `parent`
pub fn locate_in(
    browser: &dyn Browser,
    parent: ElementHandle,
    locator: &Locator,
) -> DriverResult<Vec<ElementHandle>> {
    match locator {
        Locator::Within {
            parent: inner,
            child,
        } => {
            let mut found = Vec::new();
            for handle in locate_in(browser, parent, inner)? {
                found.extend(locate_in(browser, handle, child)?);
            }
            Ok(found)
        }
        simple => browser.find_elements_in(parent, simple),
    }
}

/// Browser engine selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Primary engine
    #[default]
    Firefox,
    /// Secondary engine
    Chrome,
}

impl BrowserKind {
    /// Fixed viewport applied to headless sessions
    pub fn headless_viewport(self) -> (u32, u32) {
        match self {
            BrowserKind::Firefox => (1920, 1080),
            BrowserKind::Chrome => (1920, 1080),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BrowserKind::Firefox => "firefox",
            BrowserKind::Chrome => "chrome",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "firefox" | "primary" => Ok(BrowserKind::Firefox),
            "chrome" | "chromium" | "secondary" => Ok(BrowserKind::Chrome),
            other => Err(format!("unsupported browser '{}'", other)),
        }
    }
}

/// Options for launching a browser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchOptions {
    pub browser: BrowserKind,
    pub headless: bool,
}

impl LaunchOptions {
    pub fn new(browser: BrowserKind, headless: bool) -> Self {
        Self { browser, headless }
    }
}
