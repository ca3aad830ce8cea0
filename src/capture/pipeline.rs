//! Screenshot-on-failure pipeline.
//!
//! Capture the session surface, persist it under
//! `<report-root>/screenshots/`, then hand the artifact to every report sink.
//! Nothing here is allowed to fail a test: callers log and discard the result.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use super::types::{CaptureError, CaptureResult, FailureArtifact, SCREENSHOTS_DIR};
use super::utils::{format_timestamp, generate_filename, sanitize_label};
use crate::driver::Screenshottable;
use crate::report::ReportSink;

/// Attempts at finding a free file name before giving up
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Process-wide disambiguator for same-millisecond name collisions
static SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Captures failure evidence and routes it to report sinks
#[derive(Clone)]
pub struct FailureCapture {
    report_root: PathBuf,
    sinks: Vec<Arc<dyn ReportSink>>,
}

impl std::fmt::Debug for FailureCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureCapture")
            .field("report_root", &self.report_root)
            .field("sinks", &self.sinks.iter().map(|s| s.name().to_string()).collect::<Vec<_>>())
            .finish()
    }
}

impl FailureCapture {
    pub fn new(report_root: impl Into<PathBuf>) -> Self {
        Self {
            report_root: report_root.into(),
            sinks: Vec::new(),
        }
    }

    /// Add a sink that receives every artifact
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn report_root(&self) -> &Path {
        &self.report_root
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.report_root.join(SCREENSHOTS_DIR)
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Capture, persist and emit a failure screenshot.
    ///
    /// `note` (usually the error message) is logged to every sink before the
    /// screenshot is taken, so it survives a failed capture. Persist and sink
    /// errors are logged; only a failed screenshot is returned as an error.
    pub fn capture_failure(
        &self,
        surface: &dyn Screenshottable,
        label: &str,
        note: Option<&str>,
    ) -> CaptureResult<FailureArtifact> {
        if let Some(note) = note {
            for sink in &self.sinks {
                if let Err(e) = sink.add_log(note) {
                    warn!(sink = sink.name(), error = %e, "Failed to log failure note");
                }
            }
        }

        let bytes = surface.screenshot().map_err(CaptureError::Screenshot)?;
        let timestamp = Local::now();
        let dir = self.screenshots_dir();

        let (file_name, path, persisted) = match persist(&dir, label, &timestamp, &bytes) {
            Ok(path) => {
                let name = file_name_of(&path);
                (name, path, true)
            }
            Err(e) => {
                warn!(label, error = %e, "Failed to persist failure screenshot");
                let name = generate_filename(label, &format_timestamp(&timestamp));
                let path = dir.join(&name);
                (name, path, false)
            }
        };

        let artifact = FailureArtifact {
            label: label.to_string(),
            relative_path: format!("./{}/{}", SCREENSHOTS_DIR, file_name),
            file_name,
            path,
            timestamp,
            bytes,
            persisted,
        };

        for sink in &self.sinks {
            match sink.add_screenshot(&artifact) {
                Ok(()) => debug!(sink = sink.name(), file = %artifact.file_name, "Attached failure screenshot"),
                Err(e) => warn!(sink = sink.name(), error = %e, "Failed to attach failure screenshot"),
            }
        }

        info!(label, path = %artifact.path.display(), persisted, "Captured failure screenshot");
        Ok(artifact)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Write `bytes` under `dir` without ever replacing an existing file
fn persist(dir: &Path, label: &str, timestamp: &DateTime<Local>, bytes: &[u8]) -> CaptureResult<PathBuf> {
    // create_dir_all tolerates concurrent creation by other workers
    fs::create_dir_all(dir)?;

    let stem = format!("{}_{}", sanitize_label(label), format_timestamp(timestamp));
    let mut candidate = dir.join(format!("{}.png", stem));
    for _ in 0..MAX_NAME_ATTEMPTS {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut file) => {
                file.write_all(bytes)?;
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
                candidate = dir.join(format!("{}_{}.png", stem, seq));
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(CaptureError::NameExhausted(stem))
}
