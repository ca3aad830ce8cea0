//! Shared fixtures for integration tests and the BDD suite.

#![allow(dead_code)]

pub mod outcome;
pub mod storefront;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use storefront_e2e::driver::MemoryFactory;
use storefront_e2e::{SessionRegistry, WaitConfig};

/// Short waits so failing scenarios finish quickly
pub fn quick_wait() -> WaitConfig {
    WaitConfig::new(Duration::from_secs(2), Duration::from_millis(10))
}

/// Registry over in-memory storefront browsers writing to `report_root`
pub fn storefront_registry(report_root: &Path) -> (SessionRegistry, Arc<MemoryFactory>) {
    let factory = Arc::new(MemoryFactory::new(storefront::browser));
    let registry = SessionRegistry::new(factory.clone(), quick_wait(), report_root);
    (registry, factory)
}
