//! Browser session lifecycle.
//!
//! A `SessionRegistry` is owned by one worker (one scenario at a time) and
//! holds at most one active `Session`. Page objects receive the session by
//! reference instead of looking it up from global state.
//!
//! - `init_session` launches a browser, applies the headless viewport and
//!   tries to maximize the window
//! - `session` returns the active session or `E2eError::SessionMissing`
//! - `end_session` quits the browser; it never fails and may be called twice

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use tracing::{debug, info, warn};

use crate::capture::{CaptureResult, FailureArtifact, FailureCapture};
use crate::driver::{Browser, BrowserFactory, DriverResult, LaunchOptions, SessionDriver};
use crate::error::{E2eError, E2eResult};
use crate::wait::WaitConfig;

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a session slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Active,
    Terminated,
}

/// One active browser automation handle
pub struct Session {
    /// Unique session ID
    id: String,
    /// Thread that created the session; no other thread may use it
    owner: ThreadId,
    driver: Box<dyn SessionDriver>,
    options: LaunchOptions,
    wait: WaitConfig,
    capture: FailureCapture,
    state: SessionState,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("options", &self.options)
            .field("wait", &self.wait)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Launch a browser and prepare its window
    pub fn start(
        factory: &dyn BrowserFactory,
        options: &LaunchOptions,
        wait: WaitConfig,
        capture: FailureCapture,
    ) -> E2eResult<Self> {
        let driver = factory.launch(options)?;
        let id = format!(
            "{}-{}",
            options.browser,
            SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed)
        );

        if options.headless {
            let (width, height) = options.browser.headless_viewport();
            if let Err(e) = driver.set_window_size(width, height) {
                let _ = driver.quit();
                return Err(e.into());
            }
        }

        let session = Self {
            id,
            owner: thread::current().id(),
            driver,
            options: *options,
            wait,
            capture,
            state: SessionState::Active,
        };

        if let Err(e) = session.maximize() {
            warn!(session = %session.id, error = %e, "Could not maximize browser window");
        }

        info!(session = %session.id, headless = options.headless, "Browser session started");
        Ok(session)
    }

    /// Best-effort window maximize
    pub fn maximize(&self) -> DriverResult<()> {
        self.driver.maximize_window()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    pub fn options(&self) -> &LaunchOptions {
        &self.options
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Wait settings used by every wait and action on this session
    pub fn wait_config(&self) -> WaitConfig {
        self.wait
    }

    pub fn set_wait_config(&mut self, wait: WaitConfig) {
        self.wait = wait;
    }

    pub fn capture(&self) -> &FailureCapture {
        &self.capture
    }

    pub fn driver(&self) -> &dyn SessionDriver {
        self.driver.as_ref()
    }

    pub fn browser(&self) -> &dyn Browser {
        self.driver.as_browser()
    }

    /// Run the capture pipeline against this session's browser
    pub fn capture_failure(&self, label: &str, note: Option<&str>) -> CaptureResult<FailureArtifact> {
        self.capture
            .capture_failure(self.driver.as_surface(), label, note)
    }

    /// Quit the browser. The session is terminated even if quitting fails.
    pub fn terminate(&mut self) -> DriverResult<()> {
        if self.state != SessionState::Active {
            return Ok(());
        }
        self.state = SessionState::Terminated;
        self.driver.quit()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.state == SessionState::Active {
            if let Err(e) = self.terminate() {
                debug!(session = %self.id, error = %e, "Browser quit on drop failed");
            }
        }
    }
}

/// Owns the current worker's session
pub struct SessionRegistry {
    factory: Arc<dyn BrowserFactory>,
    wait: WaitConfig,
    report_root: PathBuf,
    current: Option<Session>,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("wait", &self.wait)
            .field("report_root", &self.report_root)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl SessionRegistry {
    pub fn new(factory: Arc<dyn BrowserFactory>, wait: WaitConfig, report_root: impl Into<PathBuf>) -> Self {
        Self {
            factory,
            wait,
            report_root: report_root.into(),
            current: None,
        }
    }

    /// Registry using the process configuration for waits and the report root
    pub fn from_config(factory: Arc<dyn BrowserFactory>) -> Self {
        let config = crate::config::get();
        Self::new(
            factory,
            WaitConfig::from_settings(&config.wait),
            config.run.report_dir.clone(),
        )
    }

    pub fn report_root(&self) -> &std::path::Path {
        &self.report_root
    }

    pub fn wait_config(&self) -> WaitConfig {
        self.wait
    }

    /// Start a session with a capture pipeline that has no report sinks
    pub fn init_default_session(&mut self, options: &LaunchOptions) -> E2eResult<&Session> {
        let capture = FailureCapture::new(self.report_root.clone());
        self.init_session(options, capture)
    }

    /// Start a session bound to the calling thread.
    ///
    /// A session left over from a previous scenario is ended first.
    pub fn init_session(&mut self, options: &LaunchOptions, capture: FailureCapture) -> E2eResult<&Session> {
        if self.current.as_ref().is_some_and(Session::is_active) {
            warn!("Previous session was not ended; ending it now");
            self.end_session();
        }
        let session = Session::start(self.factory.as_ref(), options, self.wait, capture)?;
        Ok(self.current.insert(session))
    }

    /// The active session of the calling thread
    pub fn session(&self) -> E2eResult<&Session> {
        match &self.current {
            Some(session) if session.is_active() && session.owner == thread::current().id() => Ok(session),
            Some(session) if session.state == SessionState::Terminated => {
                Err(E2eError::SessionTerminated(session.id.clone()))
            }
            _ => Err(E2eError::SessionMissing),
        }
    }

    pub fn session_mut(&mut self) -> E2eResult<&mut Session> {
        match &mut self.current {
            Some(session) if session.is_active() && session.owner == thread::current().id() => Ok(session),
            _ => Err(E2eError::SessionMissing),
        }
    }

    /// Quit the browser and clear the binding. Never fails; safe to repeat.
    pub fn end_session(&mut self) {
        let Some(mut session) = self.current.take() else {
            return;
        };
        match session.terminate() {
            Ok(()) => info!(session = %session.id, "Browser session ended"),
            Err(e) => warn!(session = %session.id, error = %e, "Browser did not quit cleanly"),
        }
    }

    pub fn state(&self) -> SessionState {
        match &self.current {
            Some(session) => session.state,
            None => SessionState::Uninitialized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{BrowserKind, MemoryBrowser, MemoryFactory};
    use std::time::Duration;

    fn registry(factory: Arc<MemoryFactory>) -> SessionRegistry {
        let wait = WaitConfig::new(Duration::from_millis(100), Duration::from_millis(10));
        SessionRegistry::new(factory, wait, std::env::temp_dir())
    }

    #[test]
    fn test_session_missing_before_init() {
        let reg = registry(Arc::new(MemoryFactory::new(MemoryBrowser::default)));
        assert!(matches!(reg.session(), Err(E2eError::SessionMissing)));
        assert_eq!(reg.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_headless_applies_viewport_and_maximizes() {
        let factory = Arc::new(MemoryFactory::new(MemoryBrowser::default));
        let mut reg = registry(factory.clone());
        reg.init_default_session(&LaunchOptions::new(BrowserKind::Chrome, true))
            .unwrap();

        let browser = factory.last().unwrap();
        assert_eq!(browser.window_size(), Some((1920, 1080)));
        assert!(browser.is_maximized());
        assert_eq!(
            browser.launch_options(),
            Some(LaunchOptions::new(BrowserKind::Chrome, true))
        );
    }

    #[test]
    fn test_maximize_failure_is_swallowed() {
        let factory = Arc::new(MemoryFactory::new(|| {
            MemoryBrowser::builder().fail_maximize().build()
        }));
        let mut reg = registry(factory);
        assert!(reg.init_default_session(&LaunchOptions::default()).is_ok());
        assert_eq!(reg.state(), SessionState::Active);
    }

    #[test]
    fn test_end_session_is_idempotent_and_swallows_quit_errors() {
        let factory = Arc::new(MemoryFactory::new(|| {
            MemoryBrowser::builder().fail_quit().build()
        }));
        let mut reg = registry(factory.clone());
        reg.init_default_session(&LaunchOptions::default()).unwrap();

        reg.end_session();
        reg.end_session();

        assert!(factory.last().unwrap().is_closed());
        assert!(matches!(reg.session(), Err(E2eError::SessionMissing)));
        assert_eq!(reg.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_reinit_ends_previous_session() {
        let factory = Arc::new(MemoryFactory::new(MemoryBrowser::default));
        let mut reg = registry(factory.clone());
        reg.init_default_session(&LaunchOptions::default()).unwrap();
        reg.init_default_session(&LaunchOptions::default()).unwrap();

        let launched = factory.launched();
        assert_eq!(launched.len(), 2);
        assert!(launched[0].is_closed());
        assert!(!launched[1].is_closed());
    }

    #[test]
    fn test_session_is_not_visible_from_other_threads() {
        let factory = Arc::new(MemoryFactory::new(MemoryBrowser::default));
        let mut reg = registry(factory);
        reg.init_default_session(&LaunchOptions::default()).unwrap();

        let reg = std::thread::scope(|s| {
            s.spawn(move || {
                assert!(matches!(reg.session(), Err(E2eError::SessionMissing)));
                reg
            })
            .join()
            .unwrap()
        });
        assert!(reg.session().is_ok());
    }
}
