//! Configuration management with environment variable support.
//!
//! Process-scope settings for the suite, read once on first access:
//! - Browser selection and headless mode
//! - Wait Engine timeout and poll interval
//! - Report root, WebDriver endpoint and application URL
//! - Worker thread count and tag expression for the BDD run
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `STOREFRONT_E2E_BROWSER` | Browser engine (`firefox` or `chrome`) | `firefox` |
//! | `STOREFRONT_E2E_HEADLESS` | Run without a visible window | `false` |
//! | `STOREFRONT_E2E_WAIT_TIMEOUT_SECONDS` | Explicit wait budget (seconds) | `10` |
//! | `STOREFRONT_E2E_WAIT_POLL_MILLIS` | Explicit wait poll interval (ms) | `200` |
//! | `STOREFRONT_E2E_REPORT_DIR` | Report root directory | `extent-reports` |
//! | `STOREFRONT_E2E_WEBDRIVER_URL` | WebDriver endpoint; unset uses the in-memory storefront | unset |
//! | `STOREFRONT_E2E_BASE_URL` | Application under test | `https://www.saucedemo.com/` |
//! | `STOREFRONT_E2E_THREADS` | Parallel worker threads | `1` |
//! | `STOREFRONT_E2E_TAGS` | Scenario tag expression | `@smoke or @regression` |
//!
//! # Example
//!
//! ```bash
//! export STOREFRONT_E2E_BROWSER=chrome
//! export STOREFRONT_E2E_HEADLESS=true
//! export STOREFRONT_E2E_WEBDRIVER_URL=http://localhost:9515
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use crate::driver::{BrowserKind, LaunchOptions};

// ============================================================================
// Default Values
// ============================================================================

pub const DEFAULT_BROWSER: BrowserKind = BrowserKind::Firefox;

pub const DEFAULT_HEADLESS: bool = false;

/// Default explicit wait budget (seconds)
pub const DEFAULT_WAIT_TIMEOUT_SECONDS: u64 = 10;

/// Default explicit wait poll interval (milliseconds)
pub const DEFAULT_WAIT_POLL_MILLIS: u64 = 200;

/// Default report root
pub const DEFAULT_REPORT_DIR: &str = "extent-reports";

/// Default application under test
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";

/// Default number of worker threads
pub const DEFAULT_THREADS: usize = 1;

/// Default scenario tag expression
pub const DEFAULT_TAGS: &str = "@smoke or @regression";

// ============================================================================
// Environment Variable Names
// ============================================================================

pub const ENV_BROWSER: &str = "STOREFRONT_E2E_BROWSER";
pub const ENV_HEADLESS: &str = "STOREFRONT_E2E_HEADLESS";
pub const ENV_WAIT_TIMEOUT_SECONDS: &str = "STOREFRONT_E2E_WAIT_TIMEOUT_SECONDS";
pub const ENV_WAIT_POLL_MILLIS: &str = "STOREFRONT_E2E_WAIT_POLL_MILLIS";
pub const ENV_REPORT_DIR: &str = "STOREFRONT_E2E_REPORT_DIR";
pub const ENV_WEBDRIVER_URL: &str = "STOREFRONT_E2E_WEBDRIVER_URL";
pub const ENV_BASE_URL: &str = "STOREFRONT_E2E_BASE_URL";
pub const ENV_THREADS: &str = "STOREFRONT_E2E_THREADS";
pub const ENV_TAGS: &str = "STOREFRONT_E2E_TAGS";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized configuration for the suite
#[derive(Debug, Clone)]
pub struct Config {
    /// Browser launch settings
    pub browser: BrowserSettings,
    /// Wait Engine settings
    pub wait: WaitSettings,
    /// Report and run settings
    pub run: RunSettings,
}

/// Browser launch settings
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub kind: BrowserKind,
    pub headless: bool,
    /// WebDriver endpoint; `None` selects the in-memory storefront
    pub webdriver_url: Option<String>,
}

/// Wait Engine settings
#[derive(Debug, Clone)]
pub struct WaitSettings {
    pub timeout_seconds: u64,
    pub poll_millis: u64,
}

/// Report and run settings
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub report_dir: PathBuf,
    pub base_url: String,
    pub threads: usize,
    pub tags: String,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            browser: BrowserSettings::from_env(),
            wait: WaitSettings::from_env(),
            run: RunSettings::from_env(),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            browser: BrowserSettings::defaults(),
            wait: WaitSettings::defaults(),
            run: RunSettings::defaults(),
        }
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions::new(self.browser.kind, self.browser.headless)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl BrowserSettings {
    pub fn from_env() -> Self {
        Self {
            kind: parsed(ENV_BROWSER).unwrap_or(DEFAULT_BROWSER),
            headless: env::var(ENV_HEADLESS)
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(DEFAULT_HEADLESS),
            webdriver_url: env::var(ENV_WEBDRIVER_URL)
                .ok()
                .filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn defaults() -> Self {
        Self {
            kind: DEFAULT_BROWSER,
            headless: DEFAULT_HEADLESS,
            webdriver_url: None,
        }
    }
}

impl WaitSettings {
    pub fn from_env() -> Self {
        Self {
            timeout_seconds: parsed(ENV_WAIT_TIMEOUT_SECONDS).unwrap_or(DEFAULT_WAIT_TIMEOUT_SECONDS),
            poll_millis: parsed(ENV_WAIT_POLL_MILLIS)
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_WAIT_POLL_MILLIS),
        }
    }

    pub fn defaults() -> Self {
        Self {
            timeout_seconds: DEFAULT_WAIT_TIMEOUT_SECONDS,
            poll_millis: DEFAULT_WAIT_POLL_MILLIS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_millis)
    }
}

impl RunSettings {
    pub fn from_env() -> Self {
        Self {
            report_dir: env::var(ENV_REPORT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_REPORT_DIR)),
            base_url: env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            threads: parsed(ENV_THREADS)
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_THREADS),
            tags: env::var(ENV_TAGS).unwrap_or_else(|_| DEFAULT_TAGS.to_string()),
        }
    }

    pub fn defaults() -> Self {
        Self {
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            base_url: DEFAULT_BASE_URL.to_string(),
            threads: DEFAULT_THREADS,
            tags: DEFAULT_TAGS.to_string(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Parse a boolean flag: true/false, yes/no, on/off, 1/0
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Get the report root (convenience function)
pub fn report_dir() -> PathBuf {
    get().run.report_dir.clone()
}

/// Get the application URL (convenience function)
pub fn base_url() -> String {
    get().run.base_url.clone()
}
