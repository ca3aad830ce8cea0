//! World struct for Cucumber BDD tests
//!
//! Scenario state is just a handle to the worker that runs it: the worker
//! owns the lifecycle hooks, and through them the scenario's browser session.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use cucumber::World;
use storefront_e2e::{E2eResult, ScenarioHooks, Session};

/// Per-thread execution context shared by every scenario the thread runs
pub struct Worker {
    pub index: usize,
    pub hooks: RefCell<ScenarioHooks>,
    /// Storefront entry point for this run
    pub base_url: String,
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("index", &self.index)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, World)]
#[world(init = Self::new)]
pub struct StorefrontWorld {
    /// Set by the before-scenario hook
    pub worker: Option<Rc<Worker>>,
}

impl StorefrontWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn worker(&self) -> &Worker {
        self.worker
            .as_deref()
            .expect("scenario is running without its before hook")
    }

    pub fn base_url(&self) -> String {
        self.worker().base_url.clone()
    }

    /// Run `step` against the scenario's session; any error fails the step
    pub fn with_session<T>(&self, step: impl FnOnce(&Session) -> E2eResult<T>) -> T {
        let hooks = self.worker().hooks.borrow();
        let session = hooks.session().unwrap_or_else(|e| panic!("{e}"));
        step(session).unwrap_or_else(|e| panic!("{e}"))
    }
}
