//! BDD Test Runner for the storefront suite
//!
//! Runs the Gherkin features under `features/` through the same lifecycle
//! hooks a production run uses. Feature files are spread over
//! `STOREFRONT_E2E_THREADS` worker threads; each worker owns its browser
//! session and all workers share one HTML report.
//!
//! # Usage
//!
//! ```bash
//! cargo test --test bdd
//! STOREFRONT_E2E_TAGS=@known-failure cargo test --test bdd
//! STOREFRONT_E2E_WEBDRIVER_URL=http://localhost:4444 cargo test --test bdd
//! ```
//!
//! Without a WebDriver URL the suite runs against the in-memory storefront.

// Allow panic/expect in test code - these are appropriate for test setup
#![allow(clippy::expect_used, clippy::panic, clippy::unwrap_used)]

#[path = "../common/mod.rs"]
mod common;
mod steps;
mod world;

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use cucumber::gherkin::tagexpr::TagOperation;
use cucumber::tag::Ext as _;
use cucumber::writer::Stats as _;
use cucumber::{World, gherkin};
use futures::FutureExt;
use storefront_e2e::config::{self, Config};
use storefront_e2e::driver::{BrowserFactory, MemoryFactory, WebDriverFactory};
use storefront_e2e::{
    HtmlReport, RunResult, ScenarioHooks, SessionRegistry, WorkerPlan, WorkerResult,
    discover_features, partition_features,
};
use tracing::{error, info};

use world::{StorefrontWorld, Worker};

fn main() {
    // Initialize tracing subscriber (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .init();

    let config = config::get();
    let features_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("features");
    let features = discover_features(&features_dir).expect("Could not read features directory");
    if features.is_empty() {
        panic!("No feature files in {}", features_dir.display());
    }

    let filter: TagOperation = config
        .run
        .tags
        .parse()
        .unwrap_or_else(|e| panic!("Invalid tag expression {:?}: {e}", config.run.tags));
    let report = Arc::new(HtmlReport::new(&config.run.report_dir).with_title("Storefront E2E"));
    let plans = partition_features(&features, config.run.threads);
    info!(workers = plans.len(), tags = %config.run.tags, "Running BDD suite");

    let workers: Vec<WorkerResult> = std::thread::scope(|s| {
        let handles: Vec<_> = plans
            .iter()
            .map(|plan| {
                let report = report.clone();
                let filter = filter.clone();
                s.spawn(move || run_worker(plan, config, report, filter))
            })
            .collect();
        handles
            .into_iter()
            .zip(&plans)
            .map(|(handle, plan)| {
                handle.join().unwrap_or_else(|_| WorkerResult {
                    worker: plan.worker,
                    features: plan.features.clone(),
                    failed: true,
                })
            })
            .collect()
    });

    match report.write() {
        Ok(index) => info!(path = %index.display(), "Wrote HTML report"),
        Err(e) => error!(error = %e, "Could not write HTML report"),
    }

    let result = RunResult::from_workers(workers);
    if !result.success {
        std::process::exit(1);
    }
}

fn browser_factory(config: &Config) -> (Arc<dyn BrowserFactory>, String) {
    match &config.browser.webdriver_url {
        Some(url) => (
            Arc::new(WebDriverFactory::new(url.clone())),
            config.run.base_url.clone(),
        ),
        None => (
            Arc::new(MemoryFactory::new(common::storefront::browser)),
            common::storefront::BASE_URL.to_string(),
        ),
    }
}

fn run_worker(plan: &WorkerPlan, config: &Config, report: Arc<HtmlReport>, filter: TagOperation) -> WorkerResult {
    let (factory, base_url) = browser_factory(config);
    let hooks = ScenarioHooks::new(SessionRegistry::from_config(factory), config.launch_options())
        .with_report(report);
    let worker = Rc::new(Worker {
        index: plan.worker,
        hooks: RefCell::new(hooks),
        base_url,
    });
    let filter = Rc::new(filter);

    let mut failed = false;
    for feature in &plan.features {
        failed |= futures::executor::block_on(run_feature(feature, worker.clone(), filter.clone()));
    }
    WorkerResult {
        worker: plan.worker,
        features: plan.features.clone(),
        failed,
    }
}

fn scenario_tags(feature: &gherkin::Feature, rule: Option<&gherkin::Rule>, scenario: &gherkin::Scenario) -> Vec<String> {
    feature
        .tags
        .iter()
        .chain(rule.into_iter().flat_map(|r| r.tags.iter()))
        .chain(scenario.tags.iter())
        .cloned()
        .collect()
}

/// Run one feature file; true when anything failed
async fn run_feature(path: &Path, worker: Rc<Worker>, filter: Rc<TagOperation>) -> bool {
    let before = worker.clone();
    let after = worker;

    let writer = StorefrontWorld::cucumber()
        .with_default_cli()
        // One session per worker, so scenarios of a worker never interleave
        .max_concurrent_scenarios(1)
        .before(move |feature, rule, scenario, world| {
            let worker = before.clone();
            async move {
                world.worker = Some(worker.clone());
                let tags = scenario_tags(feature, rule, scenario);
                let started = worker
                    .hooks
                    .borrow_mut()
                    .before_scenario(&scenario.name, Some(feature.name.as_str()), &tags)
                    .map(|session| session.id().to_string());
                if let Err(e) = started {
                    panic!("Could not start browser session: {e}");
                }
            }
            .boxed_local()
        })
        .after(move |_feature, _rule, scenario, finished, _world| {
            let worker = after.clone();
            async move {
                let outcome = common::outcome::scenario_outcome(scenario, finished);
                worker.hooks.borrow_mut().after_scenario(&outcome);
            }
            .boxed_local()
        })
        .filter_run(path, move |feature, rule, scenario| {
            filter.eval(scenario_tags(feature, rule, scenario).iter())
        })
        .await;

    writer.execution_has_failed()
}
