// Core types for failure capture

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::driver::DriverError;

/// Directory under the report root that holds failure screenshots
pub const SCREENSHOTS_DIR: &str = "screenshots";

pub const SCREENSHOT_MIME: &str = "image/png";

/// A captured failure screenshot
#[derive(Debug, Clone, Serialize)]
pub struct FailureArtifact {
    /// Label as given by the caller (action or scenario name)
    pub label: String,

    /// Generated file name, `<sanitized-label>_<timestamp>.png`
    pub file_name: String,

    /// Destination on disk
    pub path: PathBuf,

    /// Path used by reports, relative to the report root
    pub relative_path: String,

    pub timestamp: DateTime<Local>,

    /// PNG bytes
    #[serde(skip)]
    pub bytes: Vec<u8>,

    /// Whether the file was written; inline sinks still receive the bytes when not
    pub persisted: bool,
}

impl FailureArtifact {
    pub fn mime_type(&self) -> &'static str {
        SCREENSHOT_MIME
    }
}

/// Result type for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Failures inside the capture pipeline. These are logged, never propagated to tests.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("screenshot failed: {0}")]
    Screenshot(#[source] DriverError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no free file name for {0}")]
    NameExhausted(String),
}
