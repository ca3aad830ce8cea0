//! Explicit waits.
//!
//! Pages render asynchronously; every interaction first polls a
//! `WaitCondition` until it holds or the wait budget runs out.
//!
//! # Timing
//!
//! The condition is evaluated immediately, then once per poll interval. The
//! last sleep is shortened so the final evaluation happens at the deadline,
//! which bounds a wait to `timeout` plus one evaluation. Evaluation errors
//! (stale handles, script errors during navigation) count as "not yet"; the
//! most recent one is reported if the wait times out.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::WaitSettings;
use crate::driver::{self, Browser, DriverError, DriverResult, ElementHandle, scripts};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::session::Session;

/// Default timeout for explicit waits (10 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(crate::config::DEFAULT_WAIT_TIMEOUT_SECONDS);

/// Default poll interval (200ms)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(crate::config::DEFAULT_WAIT_POLL_MILLIS);

/// Timeout and poll interval for a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Maximum time to wait for the condition
    pub timeout: Duration,

    /// How often to check whether the condition holds
    pub poll_interval: Duration,
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Custom timeout with the default poll interval
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }

    pub fn from_settings(settings: &WaitSettings) -> Self {
        Self::new(settings.timeout(), settings.poll_interval())
    }

    /// Process-wide configured values
    pub fn configured() -> Self {
        Self::from_settings(&crate::config::get().wait)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// A predicate over the current page, polled until it yields a value
pub trait WaitCondition {
    type Output;

    /// Human-readable description used in timeout errors
    fn description(&self) -> String;

    /// `Ok(Some(_))` when satisfied, `Ok(None)` when not yet
    fn check(&self, browser: &dyn Browser) -> DriverResult<Option<Self::Output>>;
}

/// Poll `condition` until it holds or `config.timeout` elapses
pub fn wait_until<C: WaitCondition + ?Sized>(
    browser: &dyn Browser,
    condition: &C,
    config: WaitConfig,
) -> E2eResult<C::Output> {
    let start = Instant::now();
    let mut last_error: Option<DriverError> = None;

    loop {
        match condition.check(browser) {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            // Session is gone; polling further cannot help
            Err(DriverError::SessionClosed) => return Err(DriverError::SessionClosed.into()),
            Err(e) => last_error = Some(e),
        }

        let elapsed = start.elapsed();
        if elapsed >= config.timeout {
            let mut description = condition.description();
            if let Some(e) = last_error {
                description = format!("{} (last error: {})", description, e);
            }
            debug!(condition = %description, ?elapsed, "Wait timed out");
            return Err(E2eError::WaitTimeout {
                condition: description,
                elapsed,
            });
        }

        std::thread::sleep(config.poll_interval.min(config.timeout - elapsed));
    }
}

/// `document.readyState` equals `"complete"`
#[derive(Debug, Clone, Copy, Default)]
pub struct PageReady;

impl WaitCondition for PageReady {
    type Output = ();

    fn description(&self) -> String {
        "page to finish loading".to_string()
    }

    fn check(&self, browser: &dyn Browser) -> DriverResult<Option<()>> {
        let state = browser.execute_script(scripts::READY_STATE, None)?;
        Ok((state.as_str() == Some(scripts::READY_STATE_COMPLETE)).then_some(()))
    }
}

/// First displayed element at the locator
#[derive(Debug, Clone)]
pub struct ElementVisible(pub Locator);

impl WaitCondition for ElementVisible {
    type Output = ElementHandle;

    fn description(&self) -> String {
        format!("element to be visible: {}", self.0)
    }

    fn check(&self, browser: &dyn Browser) -> DriverResult<Option<ElementHandle>> {
        for handle in driver::locate(browser, &self.0)? {
            if browser.is_displayed(handle)? {
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }
}

/// First element at the locator, displayed or not
#[derive(Debug, Clone)]
pub struct ElementPresent(pub Locator);

impl WaitCondition for ElementPresent {
    type Output = ElementHandle;

    fn description(&self) -> String {
        format!("element to be present: {}", self.0)
    }

    fn check(&self, browser: &dyn Browser) -> DriverResult<Option<ElementHandle>> {
        Ok(driver::locate(browser, &self.0)?.into_iter().next())
    }
}

/// First element at the locator that is visible, enabled and not covered
#[derive(Debug, Clone)]
pub struct ElementClickable(pub Locator);

impl WaitCondition for ElementClickable {
    type Output = ElementHandle;

    fn description(&self) -> String {
        format!("element to be clickable: {}", self.0)
    }

    fn check(&self, browser: &dyn Browser) -> DriverResult<Option<ElementHandle>> {
        for handle in driver::locate(browser, &self.0)? {
            if !browser.is_displayed(handle)? || !browser.is_enabled(handle)? {
                continue;
            }
            let unobscured = browser.execute_script(scripts::IS_UNOBSCURED, Some(handle))?;
            if unobscured.as_bool().unwrap_or(true) {
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }
}

/// No displayed element at the locator (absent counts as invisible)
#[derive(Debug, Clone)]
pub struct ElementInvisible(pub Locator);

impl WaitCondition for ElementInvisible {
    type Output = ();

    fn description(&self) -> String {
        format!("element to be invisible: {}", self.0)
    }

    fn check(&self, browser: &dyn Browser) -> DriverResult<Option<()>> {
        for handle in driver::locate(browser, &self.0)? {
            match browser.is_displayed(handle) {
                Ok(true) => return Ok(None),
                Ok(false) | Err(DriverError::StaleElement) | Err(DriverError::NoSuchElement(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(Some(()))
    }
}

/// A condition built from a closure
pub struct FnCondition<F> {
    description: String,
    check: F,
}

/// Wrap a closure as a wait condition
pub fn from_fn<T, F>(description: impl Into<String>, check: F) -> FnCondition<F>
where
    F: Fn(&dyn Browser) -> DriverResult<Option<T>>,
{
    FnCondition {
        description: description.into(),
        check,
    }
}

impl<T, F> WaitCondition for FnCondition<F>
where
    F: Fn(&dyn Browser) -> DriverResult<Option<T>>,
{
    type Output = T;

    fn description(&self) -> String {
        self.description.clone()
    }

    fn check(&self, browser: &dyn Browser) -> DriverResult<Option<T>> {
        (self.check)(browser)
    }
}

/// Session-scoped waits using the session's wait settings
impl Session {
    pub fn wait_until<C: WaitCondition + ?Sized>(&self, condition: &C) -> E2eResult<C::Output> {
        wait_until(self.browser(), condition, self.wait_config())
    }

    pub fn wait_until_with<C: WaitCondition + ?Sized>(
        &self,
        condition: &C,
        config: WaitConfig,
    ) -> E2eResult<C::Output> {
        wait_until(self.browser(), condition, config)
    }

    pub fn wait_for_page_load(&self) -> E2eResult<()> {
        self.wait_until(&PageReady)
    }

    pub fn wait_for_visible(&self, locator: &Locator) -> E2eResult<ElementHandle> {
        self.wait_until(&ElementVisible(locator.clone()))
    }

    pub fn wait_for_clickable(&self, locator: &Locator) -> E2eResult<ElementHandle> {
        self.wait_until(&ElementClickable(locator.clone()))
    }

    pub fn wait_for_presence(&self, locator: &Locator) -> E2eResult<ElementHandle> {
        self.wait_until(&ElementPresent(locator.clone()))
    }

    pub fn wait_for_invisibility(&self, locator: &Locator) -> E2eResult<()> {
        self.wait_until(&ElementInvisible(locator.clone()))
    }
}
