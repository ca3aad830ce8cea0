//! Scenario lifecycle hooks.
//!
//! `before_scenario` opens the scenario's report entries and starts a
//! session whose capture pipeline feeds both of them. `after_scenario`
//! captures a screenshot if the scenario failed, then always ends the
//! session, and finally closes the report entries.

use std::sync::Arc;

use tracing::{info, warn};

use crate::capture::FailureCapture;
use crate::driver::LaunchOptions;
use crate::error::E2eResult;
use crate::report::{HtmlReport, HtmlScenario, ScenarioRecord, ScenarioStatus};
use crate::session::{Session, SessionRegistry};

/// How a scenario ended, as reported by the scenario runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioOutcome {
    Passed,
    Failed(String),
    Skipped,
}

impl ScenarioOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ScenarioOutcome::Failed(_))
    }
}

struct ActiveScenario {
    record: Arc<ScenarioRecord>,
    html: Option<Arc<HtmlScenario>>,
}

/// Per-worker hooks; owns the worker's session registry
pub struct ScenarioHooks {
    registry: SessionRegistry,
    options: LaunchOptions,
    report: Option<Arc<HtmlReport>>,
    active: Option<ActiveScenario>,
}

impl std::fmt::Debug for ScenarioHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioHooks")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("scenario", &self.active.as_ref().map(|a| a.record.name().to_string()))
            .finish_non_exhaustive()
    }
}

impl ScenarioHooks {
    pub fn new(registry: SessionRegistry, options: LaunchOptions) -> Self {
        Self {
            registry,
            options,
            report: None,
            active: None,
        }
    }

    /// Also link evidence into a shared HTML report
    pub fn with_report(mut self, report: Arc<HtmlReport>) -> Self {
        self.report = Some(report);
        self
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn session(&self) -> E2eResult<&Session> {
        self.registry.session()
    }

    /// Record of the scenario in progress (or the last finished one)
    pub fn record(&self) -> Option<Arc<ScenarioRecord>> {
        self.active.as_ref().map(|a| a.record.clone())
    }

    pub fn before_scenario(&mut self, name: &str, feature: Option<&str>, tags: &[String]) -> E2eResult<&Session> {
        let mut record = ScenarioRecord::new(name).with_tags(tags.iter().cloned());
        if let Some(feature) = feature {
            record = record.with_feature(feature);
        }
        let record = Arc::new(record);
        let html = self
            .report
            .as_ref()
            .map(|report| report.start_scenario(name, feature.map(str::to_string)));

        let mut capture = FailureCapture::new(self.registry.report_root()).with_sink(record.clone());
        if let Some(html) = &html {
            capture = capture.with_sink(html.clone());
        }
        self.active = Some(ActiveScenario { record, html });

        info!(scenario = name, "Starting scenario");
        let options = self.options;
        self.registry.init_session(&options, capture)
    }

    /// Close the scenario. Never fails; the session is always ended.
    pub fn after_scenario(&mut self, outcome: &ScenarioOutcome) -> Option<Arc<ScenarioRecord>> {
        let Some(active) = &self.active else {
            self.registry.end_session();
            return None;
        };
        let record = active.record.clone();

        if let ScenarioOutcome::Failed(reason) = outcome {
            record.mark_failed(reason.clone());
            match self.registry.session() {
                Ok(session) => {
                    if let Err(e) = session.capture_failure(record.name(), Some(reason)) {
                        warn!(scenario = record.name(), error = %e, "Could not capture scenario failure");
                    }
                }
                Err(e) => warn!(scenario = record.name(), error = %e, "No session to capture failure from"),
            }
        }

        self.registry.end_session();

        let status = match outcome {
            ScenarioOutcome::Passed => ScenarioStatus::Passed,
            ScenarioOutcome::Failed(_) => ScenarioStatus::Failed,
            ScenarioOutcome::Skipped => ScenarioStatus::Skipped,
        };
        record.finish(status);
        if let Some(html) = &active.html {
            html.finish(record.status());
        }
        if let Err(e) = record.write_journal(self.registry.report_root()) {
            warn!(scenario = record.name(), error = %e, "Could not write scenario journal");
        }

        info!(scenario = record.name(), status = ?record.status(), "Finished scenario");
        Some(record)
    }
}
