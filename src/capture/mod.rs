pub mod pipeline;
pub mod types;
pub mod utils;

pub use pipeline::FailureCapture;
pub use types::{CaptureError, CaptureResult, FailureArtifact, SCREENSHOT_MIME, SCREENSHOTS_DIR};
pub use utils::{format_timestamp, generate_filename, generate_timestamp, sanitize_label};
