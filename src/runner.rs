//! Types for parallel suite runs.
//!
//! Feature files are the unit of distribution: each worker thread gets its
//! own subset and runs it with its own session registry.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// File extension of Gherkin feature files
pub const FEATURE_EXTENSION: &str = "feature";

/// Feature files assigned to one worker thread
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPlan {
    /// Worker index (0-based)
    pub worker: usize,

    /// Feature files this worker runs, in order
    pub features: Vec<PathBuf>,
}

/// Outcome of one worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerResult {
    pub worker: usize,

    pub features: Vec<PathBuf>,

    /// Whether any scenario (or hook) in this worker failed
    pub failed: bool,
}

/// Result of a complete suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Whether every worker completed without failures
    pub success: bool,

    pub workers: Vec<WorkerResult>,
}

impl RunResult {
    pub fn from_workers(mut workers: Vec<WorkerResult>) -> Self {
        workers.sort_by_key(|w| w.worker);
        Self {
            success: workers.iter().all(|w| !w.failed),
            workers,
        }
    }
}

/// All `.feature` files directly under `dir`, sorted by path
pub fn discover_features(dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let mut features: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == FEATURE_EXTENSION)
        })
        .collect();
    features.sort();
    Ok(features)
}

/// Distribute feature files round-robin over `threads` workers.
///
/// Never returns more plans than features, and never an empty plan.
/// `threads == 0` is treated as one worker.
pub fn partition_features(features: &[PathBuf], threads: usize) -> Vec<WorkerPlan> {
    let workers = threads.max(1).min(features.len());
    let mut plans: Vec<WorkerPlan> = (0..workers)
        .map(|worker| WorkerPlan {
            worker,
            features: Vec::new(),
        })
        .collect();
    for (i, feature) in features.iter().enumerate() {
        plans[i % workers].features.push(feature.clone());
    }
    plans
}
