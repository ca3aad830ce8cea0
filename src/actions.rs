//! Element actions with a wait-then-act contract.
//!
//! Every action resolves its target through the Wait Engine, performs the
//! interaction, and on any failure captures a screenshot before returning
//! `E2eError::ActionFailed` wrapping the action name, locator and cause.
//! `is_displayed` and `is_enabled` are queries: they answer `false` instead
//! of failing.

use std::path::Path;

use tracing::warn;

use crate::driver::{self, Browser, ElementHandle, scripts, scripts::keys};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::session::Session;
use crate::wait::{ElementClickable, ElementVisible};

/// What the target must satisfy before the action runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Readiness {
    Visible,
    Clickable,
}

impl Session {
    fn resolve(&self, locator: &Locator, readiness: Readiness) -> E2eResult<ElementHandle> {
        match readiness {
            Readiness::Visible => self.wait_until(&ElementVisible(locator.clone())),
            Readiness::Clickable => self.wait_until(&ElementClickable(locator.clone())),
        }
    }

    fn act<T>(
        &self,
        action: &str,
        locator: &Locator,
        readiness: Readiness,
        op: impl FnOnce(&dyn Browser, ElementHandle) -> E2eResult<T>,
    ) -> E2eResult<T> {
        self.resolve(locator, readiness)
            .and_then(|handle| op(self.browser(), handle))
            .map_err(|cause| self.action_failed(action, locator, cause))
    }

    fn action_failed(&self, action: &str, locator: &Locator, cause: E2eError) -> E2eError {
        warn!(session = %self.id(), action, %locator, error = %cause, "Element action failed");
        let label = format!("{}_{}", action, locator);
        if let Err(e) = self.capture_failure(&label, Some(&cause.to_string())) {
            warn!(action, error = %e, "Could not capture failure screenshot");
        }
        E2eError::action_failed(action, locator, cause)
    }

    pub fn click(&self, locator: &Locator) -> E2eResult<()> {
        self.act("click", locator, Readiness::Clickable, |b, el| Ok(b.click(el)?))
    }

    pub fn double_click(&self, locator: &Locator) -> E2eResult<()> {
        self.act("double_click", locator, Readiness::Clickable, |b, el| {
            Ok(b.double_click(el)?)
        })
    }

    pub fn right_click(&self, locator: &Locator) -> E2eResult<()> {
        self.act("right_click", locator, Readiness::Clickable, |b, el| {
            Ok(b.context_click(el)?)
        })
    }

    /// DOM click dispatched by script; reaches elements covered by overlays
    pub fn click_via_script(&self, locator: &Locator) -> E2eResult<()> {
        self.act("click_via_script", locator, Readiness::Visible, |b, el| {
            b.execute_script(scripts::CLICK, Some(el))?;
            Ok(())
        })
    }

    /// Replace the element's content with `text`.
    ///
    /// Content is cleared twice, natively and with select-all + delete, since
    /// some widgets ignore one of the two. Failures of either are ignored.
    pub fn type_text(&self, locator: &Locator, text: &str) -> E2eResult<()> {
        self.act("type_text", locator, Readiness::Visible, |b, el| {
            clear_both_ways(b, el);
            Ok(b.send_keys(el, text)?)
        })
    }

    /// Type `text` then press Enter
    pub fn type_and_submit(&self, locator: &Locator, text: &str) -> E2eResult<()> {
        self.act("type_and_submit", locator, Readiness::Visible, |b, el| {
            clear_both_ways(b, el);
            b.send_keys(el, text)?;
            Ok(b.send_keys(el, &keys::ENTER.to_string())?)
        })
    }

    /// Press Enter on the element
    pub fn submit(&self, locator: &Locator) -> E2eResult<()> {
        self.act("submit", locator, Readiness::Visible, |b, el| {
            Ok(b.send_keys(el, &keys::ENTER.to_string())?)
        })
    }

    pub fn clear(&self, locator: &Locator) -> E2eResult<()> {
        self.act("clear", locator, Readiness::Visible, |b, el| Ok(b.clear(el)?))
    }

    pub fn read_text(&self, locator: &Locator) -> E2eResult<String> {
        self.act("read_text", locator, Readiness::Visible, |b, el| Ok(b.text(el)?))
    }

    pub fn read_attribute(&self, locator: &Locator, name: &str) -> E2eResult<Option<String>> {
        self.act("read_attribute", locator, Readiness::Visible, |b, el| {
            Ok(b.attribute(el, name)?)
        })
    }

    pub fn read_computed_style(&self, locator: &Locator, property: &str) -> E2eResult<String> {
        self.act("read_computed_style", locator, Readiness::Visible, |b, el| {
            Ok(b.css_value(el, property)?)
        })
    }

    /// Whether the element becomes visible within the wait budget. Never fails.
    pub fn is_displayed(&self, locator: &Locator) -> bool {
        self.wait_for_visible(locator).is_ok()
    }

    /// Whether the element is visible and enabled. Never fails.
    pub fn is_enabled(&self, locator: &Locator) -> bool {
        self.wait_for_visible(locator)
            .and_then(|el| Ok(self.browser().is_enabled(el)?))
            .unwrap_or(false)
    }

    /// Selection state; the element must exist
    pub fn is_selected(&self, locator: &Locator) -> E2eResult<bool> {
        self.act("is_selected", locator, Readiness::Visible, |b, el| {
            Ok(b.is_selected(el)?)
        })
    }

    pub fn select_by_visible_text(&self, locator: &Locator, text: &str) -> E2eResult<()> {
        self.act("select_by_visible_text", locator, Readiness::Visible, |b, el| {
            Ok(b.select_by_visible_text(el, text)?)
        })
    }

    pub fn select_by_value(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.act("select_by_value", locator, Readiness::Visible, |b, el| {
            Ok(b.select_by_value(el, value)?)
        })
    }

    pub fn select_by_index(&self, locator: &Locator, index: usize) -> E2eResult<()> {
        self.act("select_by_index", locator, Readiness::Visible, |b, el| {
            Ok(b.select_by_index(el, index)?)
        })
    }

    /// Click the checkbox only if its state differs from `checked`
    pub fn set_checkbox_state(&self, locator: &Locator, checked: bool) -> E2eResult<()> {
        self.act("set_checkbox_state", locator, Readiness::Clickable, |b, el| {
            if b.is_selected(el)? != checked {
                b.click(el)?;
            }
            Ok(())
        })
    }

    pub fn scroll_into_view(&self, locator: &Locator) -> E2eResult<()> {
        self.act("scroll_into_view", locator, Readiness::Visible, |b, el| {
            b.execute_script(scripts::SCROLL_INTO_VIEW, Some(el))?;
            Ok(())
        })
    }

    pub fn hover(&self, locator: &Locator) -> E2eResult<()> {
        self.act("hover", locator, Readiness::Visible, |b, el| Ok(b.hover(el)?))
    }

    pub fn drag_and_drop(&self, source: &Locator, target: &Locator) -> E2eResult<()> {
        self.act("drag_and_drop", source, Readiness::Visible, |b, from| {
            let to = self.wait_for_visible(target)?;
            Ok(b.drag_and_drop(from, to)?)
        })
    }

    /// Send a local file path to a file input, bypassing the chooser dialog
    pub fn upload_file(&self, locator: &Locator, path: &Path) -> E2eResult<()> {
        self.act("upload_file", locator, Readiness::Visible, |b, el| {
            let absolute = std::path::absolute(path)?;
            Ok(b.send_keys(el, &absolute.to_string_lossy())?)
        })
    }

    // Raw access for page objects. No waiting and no failure capture.

    pub fn find_all(&self, locator: &Locator) -> E2eResult<Vec<ElementHandle>> {
        Ok(driver::locate(self.browser(), locator)?)
    }

    pub fn find_within(&self, parent: ElementHandle, locator: &Locator) -> E2eResult<Vec<ElementHandle>> {
        Ok(driver::locate_in(self.browser(), parent, locator)?)
    }

    pub fn text_of(&self, element: ElementHandle) -> E2eResult<String> {
        Ok(self.browser().text(element)?)
    }

    pub fn click_handle(&self, element: ElementHandle) -> E2eResult<()> {
        Ok(self.browser().click(element)?)
    }

    pub fn navigate(&self, url: &str) -> E2eResult<()> {
        Ok(self.browser().navigate(url)?)
    }

    pub fn current_url(&self) -> E2eResult<String> {
        Ok(self.browser().current_url()?)
    }
}

fn clear_both_ways(browser: &dyn Browser, element: ElementHandle) {
    let _ = browser.clear(element);
    let _ = browser.send_keys(element, &keys::select_all_delete());
}
