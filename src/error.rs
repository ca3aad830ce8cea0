//! Error types shared across the suite.

use std::time::Duration;

use thiserror::Error;

use crate::driver::DriverError;
use crate::locator::Locator;

/// Result type for suite operations
pub type E2eResult<T> = Result<T, E2eError>;

/// Errors surfaced to steps and page objects
#[derive(Error, Debug)]
pub enum E2eError {
    /// A wait condition never held within its budget
    #[error("timed out after {elapsed:?} waiting for {condition}")]
    WaitTimeout { condition: String, elapsed: Duration },

    /// An element action failed after (or while) resolving its target
    #[error("action '{action}' failed on {locator}: {source}")]
    ActionFailed {
        action: String,
        locator: Locator,
        #[source]
        source: Box<E2eError>,
    },

    /// No session is bound to the caller
    #[error("no active browser session")]
    SessionMissing,

    /// The session has already been terminated
    #[error("browser session {0} is terminated")]
    SessionTerminated(String),

    /// Error reported by the automation driver
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Invalid configuration or argument
    #[error("configuration error: {0}")]
    Config(String),

    /// The page does not hold what a page object expected
    #[error("unexpected page state: {0}")]
    Page(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl E2eError {
    pub(crate) fn action_failed(action: &str, locator: &Locator, cause: E2eError) -> Self {
        E2eError::ActionFailed {
            action: action.to_string(),
            locator: locator.clone(),
            source: Box::new(cause),
        }
    }

    /// Whether this error (or the cause it wraps) is a wait timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            E2eError::WaitTimeout { .. } => true,
            E2eError::ActionFailed { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_failed_reports_action_and_locator() {
        let err = E2eError::action_failed(
            "click",
            &Locator::id("login-button"),
            E2eError::WaitTimeout {
                condition: "element to be clickable: id=login-button".to_string(),
                elapsed: Duration::from_millis(10),
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("'click'"));
        assert!(msg.contains("id=login-button"));
        assert!(err.is_timeout());
    }

    #[test]
    fn driver_errors_are_not_timeouts() {
        let err = E2eError::from(DriverError::StaleElement);
        assert!(!err.is_timeout());
    }
}
