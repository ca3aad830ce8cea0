//! Per-scenario record with inline attachments.
//!
//! This is the scenario runner's own evidence store: attachments carry the
//! screenshot bytes, so it works without any external report. Records are
//! persisted as a JSON journal under `<report-root>/scenarios/`.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sink::{ReportError, ReportSink};
use crate::capture::{FailureArtifact, sanitize_label};

/// Directory under the report root that holds scenario journals
pub const SCENARIOS_DIR: &str = "scenarios";

/// Journal names tried per record before giving up
const MAX_JOURNAL_ATTEMPTS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Running,
    Passed,
    Failed,
    Skipped,
}

/// Binary evidence attached in-line to a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub label: String,
    pub mime: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// Serializable view of a scenario record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioJournal {
    pub name: String,
    pub feature: Option<String>,
    pub tags: Vec<String>,
    pub status: ScenarioStatus,
    pub failure: Option<String>,
    pub started: DateTime<Local>,
    pub finished: Option<DateTime<Local>>,
    pub logs: Vec<String>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug)]
pub struct ScenarioRecord {
    name: String,
    feature: Option<String>,
    tags: Vec<String>,
    started: DateTime<Local>,
    state: Mutex<RecordState>,
}

#[derive(Debug)]
struct RecordState {
    status: ScenarioStatus,
    failure: Option<String>,
    finished: Option<DateTime<Local>>,
    logs: Vec<String>,
    attachments: Vec<Attachment>,
}

impl ScenarioRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            feature: None,
            tags: Vec::new(),
            started: Local::now(),
            state: Mutex::new(RecordState {
                status: ScenarioStatus::Running,
                failure: None,
                finished: None,
                logs: Vec::new(),
                attachments: Vec::new(),
            }),
        }
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn feature(&self) -> Option<&str> {
        self.feature.as_deref()
    }

    fn state(&self) -> MutexGuard<'_, RecordState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Attach binary evidence in-line
    pub fn attach(&self, label: impl Into<String>, mime: impl Into<String>, data: Vec<u8>) {
        self.state().attachments.push(Attachment {
            label: label.into(),
            mime: mime.into(),
            data,
        });
    }

    pub fn log(&self, text: impl Into<String>) {
        self.state().logs.push(text.into());
    }

    pub fn mark_failed(&self, reason: impl Into<String>) {
        let mut state = self.state();
        state.status = ScenarioStatus::Failed;
        state.failure = Some(reason.into());
    }

    /// Close the record. A failed record stays failed.
    pub fn finish(&self, status: ScenarioStatus) {
        let mut state = self.state();
        if state.status != ScenarioStatus::Failed {
            state.status = status;
        }
        state.finished = Some(Local::now());
    }

    pub fn is_failed(&self) -> bool {
        self.state().status == ScenarioStatus::Failed
    }

    pub fn status(&self) -> ScenarioStatus {
        self.state().status
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        self.state().attachments.clone()
    }

    pub fn logs(&self) -> Vec<String> {
        self.state().logs.clone()
    }

    pub fn journal(&self) -> ScenarioJournal {
        let state = self.state();
        ScenarioJournal {
            name: self.name.clone(),
            feature: self.feature.clone(),
            tags: self.tags.clone(),
            status: state.status,
            failure: state.failure.clone(),
            started: self.started,
            finished: state.finished,
            logs: state.logs.clone(),
            attachments: state.attachments.clone(),
        }
    }

    /// File stem of the journal, qualified by feature when known
    pub fn journal_label(&self) -> String {
        match &self.feature {
            Some(feature) => sanitize_label(&format!("{}__{}", feature, self.name)),
            None => sanitize_label(&self.name),
        }
    }

    /// Write `<root>/scenarios/<label>.json`.
    ///
    /// Outline examples share a name, so an existing journal is never
    /// replaced: later records get `<label>_2.json`, `<label>_3.json` and so on.
    pub fn write_journal(&self, root: &Path) -> Result<PathBuf, ReportError> {
        let dir = root.join(SCENARIOS_DIR);
        fs::create_dir_all(&dir)?;
        let label = self.journal_label();
        let body = serde_json::to_string_pretty(&self.journal())?;

        let mut path = dir.join(format!("{}.json", label));
        for attempt in 2..MAX_JOURNAL_ATTEMPTS + 2 {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(body.as_bytes())?;
                    debug!(path = %path.display(), "Wrote scenario journal");
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    path = dir.join(format!("{}_{}.json", label, attempt));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ReportError::Rejected(format!("no free journal name for '{}'", label)))
    }
}

impl ReportSink for ScenarioRecord {
    fn name(&self) -> &str {
        "scenario"
    }

    fn add_log(&self, text: &str) -> Result<(), ReportError> {
        self.log(text);
        Ok(())
    }

    fn add_screenshot(&self, artifact: &FailureArtifact) -> Result<(), ReportError> {
        self.attach(artifact.file_name.clone(), artifact.mime_type(), artifact.bytes.clone());
        Ok(())
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_failed_status_is_sticky() {
        let record = ScenarioRecord::new("checkout");
        record.mark_failed("assertion failed");
        record.finish(ScenarioStatus::Passed);
        assert!(record.is_failed());
    }

    #[test]
    fn test_journal_embeds_attachment_as_base64() {
        let tmp = TempDir::new().unwrap();
        let record = ScenarioRecord::new("Wrong URL").with_feature("URL checks");
        record.attach("shot.png", "image/png", vec![0xde, 0xad]);
        record.finish(ScenarioStatus::Passed);

        let path = record.write_journal(tmp.path()).unwrap();
        assert!(path.ends_with("scenarios/URL_checks__Wrong_URL.json"));

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["attachments"][0]["data"], "3q0=");
        assert_eq!(raw["status"], "passed");

        let journal: ScenarioJournal = serde_json::from_value(raw).unwrap();
        assert_eq!(journal.attachments[0].data, vec![0xde, 0xad]);
    }

    #[test]
    fn test_same_named_journals_are_all_kept() {
        let tmp = TempDir::new().unwrap();

        let failed = ScenarioRecord::new("Rejected login").with_feature("Login");
        failed.attach("shot.png", "image/png", vec![1, 2, 3]);
        failed.mark_failed("wrong error banner");
        failed.finish(ScenarioStatus::Failed);
        let first = failed.write_journal(tmp.path()).unwrap();

        let passed = ScenarioRecord::new("Rejected login").with_feature("Login");
        passed.finish(ScenarioStatus::Passed);
        let second = passed.write_journal(tmp.path()).unwrap();

        assert_ne!(first, second);
        assert!(second.ends_with("scenarios/Login__Rejected_login_2.json"));

        let kept: ScenarioJournal = serde_json::from_str(&fs::read_to_string(&first).unwrap()).unwrap();
        assert_eq!(kept.status, ScenarioStatus::Failed);
        assert_eq!(kept.failure.as_deref(), Some("wrong error banner"));
        assert_eq!(kept.attachments.len(), 1);
        assert_eq!(fs::read_dir(tmp.path().join(SCENARIOS_DIR)).unwrap().count(), 2);
    }
}
