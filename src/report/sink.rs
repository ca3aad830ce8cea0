use thiserror::Error;

use crate::capture::FailureArtifact;

/// A destination for human-readable test evidence
pub trait ReportSink: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    fn add_log(&self, text: &str) -> Result<(), ReportError>;

    fn add_screenshot(&self, artifact: &FailureArtifact) -> Result<(), ReportError>;
}

/// Errors raised by report sinks and report writers
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("report entry for '{0}' is already finished")]
    Closed(String),

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}
