//! Report-root housekeeping: list and prune failure screenshots.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::capture::SCREENSHOTS_DIR;

/// List all PNG artifacts under `<root>/screenshots`, sorted by name
pub fn list_artifacts(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let dir = root.join(SCREENSHOTS_DIR);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut artifacts = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.extension().map(|e| e == "png").unwrap_or(false) {
            artifacts.push(path);
        }
    }
    artifacts.sort();
    Ok(artifacts)
}

/// Delete artifacts older than `max_age`; returns how many were removed
pub fn cleanup_old_artifacts(root: &Path, max_age: Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut cleaned = 0;

    for path in list_artifacts(root)? {
        let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) else {
            continue;
        };
        if let Ok(age) = now.duration_since(modified) {
            if age > max_age && fs::remove_file(&path).is_ok() {
                debug!(path = %path.display(), "Removed old artifact");
                cleaned += 1;
            }
        }
    }

    Ok(cleaned)
}
