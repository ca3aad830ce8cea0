//! Report sinks: the inline scenario record and the external HTML report.

pub mod html;
pub mod maintenance;
pub mod scenario;
pub mod sink;

pub use html::{HtmlReport, HtmlScenario, INDEX_FILE, SUMMARY_FILE};
pub use maintenance::{cleanup_old_artifacts, list_artifacts};
pub use scenario::{Attachment, SCENARIOS_DIR, ScenarioJournal, ScenarioRecord, ScenarioStatus};
pub use sink::{ReportError, ReportSink};
