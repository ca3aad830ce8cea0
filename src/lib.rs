//! Storefront E2E - browser end-to-end suite core for the saucedemo storefront.
//!
//! This crate provides:
//! - Per-worker browser sessions over a WebDriver or in-memory driver
//! - Explicit waits that poll page readiness and element state
//! - Element actions that wait first and capture a screenshot on failure
//! - Failure evidence delivered to a scenario journal and an HTML report
//! - Scenario lifecycle hooks and parallel feature partitioning
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use storefront_e2e::driver::{LaunchOptions, WebDriverFactory};
//! use storefront_e2e::pages::{InventoryPage, LoginPage};
//! use storefront_e2e::SessionRegistry;
//!
//! let factory = Arc::new(WebDriverFactory::new("http://localhost:4444"));
//! let mut registry = SessionRegistry::from_config(factory);
//! let session = registry.init_default_session(&LaunchOptions::default()).unwrap();
//!
//! let login = LoginPage::new(session);
//! login.open("https://www.saucedemo.com/").unwrap();
//! login.login("standard_user", "secret_sauce").unwrap();
//! assert!(InventoryPage::new(session).is_displayed());
//!
//! registry.end_session();
//! ```

pub mod actions;
pub mod capture;
pub mod config;
pub mod driver;
pub mod error;
pub mod hooks;
pub mod locator;
pub mod pages;
pub mod report;
pub mod runner;
pub mod session;
pub mod wait;

// Re-export core types
pub use error::{E2eError, E2eResult};
pub use locator::Locator;
pub use session::{Session, SessionRegistry, SessionState};
pub use wait::{WaitCondition, WaitConfig, wait_until};

// Re-export capture and reporting
pub use capture::{CaptureError, FailureArtifact, FailureCapture};
pub use report::{HtmlReport, ReportSink, ScenarioRecord, ScenarioStatus};

// Re-export scenario execution
pub use hooks::{ScenarioHooks, ScenarioOutcome};
pub use runner::{RunResult, WorkerPlan, WorkerResult, discover_features, partition_features};
