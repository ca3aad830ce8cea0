use chrono::{DateTime, Local};

/// Timestamp layout appended to artifact names (millisecond precision)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

/// Replace every character outside `[A-Za-z0-9-_.]` with `_`
pub fn sanitize_label(label: &str) -> String {
    if label.is_empty() {
        return "unnamed".to_string();
    }
    label
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect()
}

pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Generate a timestamp string in YYYYMMDD_HHMMSS_mmm format
pub fn generate_timestamp() -> String {
    format_timestamp(&Local::now())
}

/// Filename for a failure screenshot: `<sanitized-label>_<timestamp>.png`
pub fn generate_filename(label: &str, timestamp: &str) -> String {
    format!("{}_{}.png", sanitize_label(label), timestamp)
}
