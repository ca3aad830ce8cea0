//! External HTML report.
//!
//! One report is shared by every worker thread of a run. Each scenario gets
//! its own `HtmlScenario` entry, which is the report sink handed to that
//! scenario's capture pipeline. Screenshots are linked by their path relative
//! to the report root, so `index.html` must live in the report root.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use super::scenario::ScenarioStatus;
use super::sink::{ReportError, ReportSink};
use crate::capture::FailureArtifact;

pub const INDEX_FILE: &str = "index.html";
pub const SUMMARY_FILE: &str = "report.json";

/// Thread-safe HTML report for a whole run
#[derive(Debug)]
pub struct HtmlReport {
    root: PathBuf,
    title: String,
    host: String,
    started: DateTime<Local>,
    entries: Mutex<Vec<Arc<HtmlScenario>>>,
}

/// One scenario section of the report
#[derive(Debug)]
pub struct HtmlScenario {
    name: String,
    feature: Option<String>,
    state: Mutex<EntryState>,
}

#[derive(Debug, Clone, Serialize)]
struct EntryState {
    status: ScenarioStatus,
    logs: Vec<String>,
    screenshots: Vec<String>,
    finished: bool,
}

#[derive(Debug, Serialize)]
struct Totals {
    passed: usize,
    failed: usize,
    skipped: usize,
}

#[derive(Debug, Serialize)]
struct ScenarioSummary {
    name: String,
    feature: Option<String>,
    status: ScenarioStatus,
    logs: Vec<String>,
    screenshots: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    title: String,
    host: String,
    started: DateTime<Local>,
    written: DateTime<Local>,
    totals: Totals,
    scenarios: Vec<ScenarioSummary>,
}

impl HtmlReport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            root: root.into(),
            title: "Storefront E2E Report".to_string(),
            host,
            started: Local::now(),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Arc<HtmlScenario>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open a section for a scenario; the returned entry is its report sink
    pub fn start_scenario(&self, name: impl Into<String>, feature: Option<String>) -> Arc<HtmlScenario> {
        let entry = Arc::new(HtmlScenario {
            name: name.into(),
            feature,
            state: Mutex::new(EntryState {
                status: ScenarioStatus::Running,
                logs: Vec::new(),
                screenshots: Vec::new(),
                finished: false,
            }),
        });
        self.entries().push(entry.clone());
        entry
    }

    pub fn scenarios(&self) -> Vec<Arc<HtmlScenario>> {
        self.entries().clone()
    }

    fn summary(&self) -> RunSummary {
        let scenarios: Vec<ScenarioSummary> = self
            .scenarios()
            .iter()
            .map(|entry| {
                let state = entry.state();
                ScenarioSummary {
                    name: entry.name.clone(),
                    feature: entry.feature.clone(),
                    status: state.status,
                    logs: state.logs.clone(),
                    screenshots: state.screenshots.clone(),
                }
            })
            .collect();
        let count = |status: ScenarioStatus| scenarios.iter().filter(|s| s.status == status).count();
        RunSummary {
            title: self.title.clone(),
            host: self.host.clone(),
            started: self.started,
            written: Local::now(),
            totals: Totals {
                passed: count(ScenarioStatus::Passed),
                failed: count(ScenarioStatus::Failed),
                skipped: count(ScenarioStatus::Skipped),
            },
            scenarios,
        }
    }

    /// Write `index.html` and `report.json` into the report root
    pub fn write(&self) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.root)?;
        let summary = self.summary();

        fs::write(self.root.join(SUMMARY_FILE), serde_json::to_string_pretty(&summary)?)?;

        let index = self.root.join(INDEX_FILE);
        fs::write(&index, render(&summary)?)?;
        info!(
            path = %index.display(),
            passed = summary.totals.passed,
            failed = summary.totals.failed,
            "Wrote HTML report"
        );
        Ok(index)
    }
}

impl HtmlScenario {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> MutexGuard<'_, EntryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn finish(&self, status: ScenarioStatus) {
        let mut state = self.state();
        state.status = status;
        state.finished = true;
    }

    pub fn status(&self) -> ScenarioStatus {
        self.state().status
    }

    /// Relative screenshot paths linked from this section
    pub fn screenshots(&self) -> Vec<String> {
        self.state().screenshots.clone()
    }

    pub fn logs(&self) -> Vec<String> {
        self.state().logs.clone()
    }
}

impl ReportSink for HtmlScenario {
    fn name(&self) -> &str {
        "html"
    }

    fn add_log(&self, text: &str) -> Result<(), ReportError> {
        let mut state = self.state();
        if state.finished {
            return Err(ReportError::Closed(self.name.clone()));
        }
        state.logs.push(text.to_string());
        Ok(())
    }

    fn add_screenshot(&self, artifact: &FailureArtifact) -> Result<(), ReportError> {
        if !artifact.persisted {
            return Err(ReportError::Rejected(format!(
                "{} was not written to disk",
                artifact.file_name
            )));
        }
        let mut state = self.state();
        if state.finished {
            return Err(ReportError::Closed(self.name.clone()));
        }
        state.screenshots.push(artifact.relative_path.clone());
        Ok(())
    }
}

/// Page layout; rendered with HTML autoescaping
const INDEX_TEMPLATE: &str = include_str!("index.html.tera");

fn render(summary: &RunSummary) -> Result<String, ReportError> {
    let context = tera::Context::from_serialize(summary)?;
    Ok(tera::Tera::one_off(INDEX_TEMPLATE, &context, true)?)
}
