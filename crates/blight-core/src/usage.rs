//! Per-identifier usage counter used as a ranking boost.
//!
//! Counts live in memory and are the source of truth for scoring. Every
//! [`UsageTracker::record`] schedules a background write of the whole map;
//! the write may never land if the process exits first.

use crate::error::Result;
use crate::persist::{read_json_or_default, write_json_atomic};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};

type UsageCounts = HashMap<String, u32, ahash::RandomState>;

#[derive(Debug)]
struct UsageState {
    counts: RwLock<UsageCounts>,
    path: Option<PathBuf>,
    // serializes writers so the newest snapshot always lands last
    save_lock: Mutex<()>,
}

#[derive(Debug, Clone)]
pub struct UsageTracker {
    state: Arc<UsageState>,
}

impl UsageTracker {
    /// Loads counts from `path`. A missing or unparsable file gives an empty
    /// tracker that will overwrite the file on the next record.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let counts: UsageCounts = read_json_or_default(&path);
        debug!(path = %path.display(), entries = counts.len(), "Usage tracker loaded");

        Self {
            state: Arc::new(UsageState {
                counts: RwLock::new(counts),
                path: Some(path),
                save_lock: Mutex::new(()),
            }),
        }
    }

    /// A tracker that never touches the disk.
    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(UsageState {
                counts: RwLock::new(UsageCounts::default()),
                path: None,
                save_lock: Mutex::new(()),
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.state.path.as_deref()
    }

    /// Increments the count for `id` and returns the new value. The change
    /// is visible to [`Self::score`] immediately; persistence happens on a
    /// background thread.
    pub fn record(&self, id: &str) -> u32 {
        let count = {
            let mut counts = self.state.counts.write();
            let count = counts.entry(id.to_string()).or_insert(0);
            *count = count.saturating_add(1);
            *count
        };

        debug!(?id, count, "Recorded usage");
        self.persist_in_background();
        count
    }

    pub fn score(&self, id: &str) -> u32 {
        self.state.counts.read().get(id).copied().unwrap_or(0)
    }

    /// Scores for many identifiers under a single read lock.
    pub fn scores<I, S>(&self, ids: I) -> Vec<u32>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let counts = self.state.counts.read();
        ids.into_iter()
            .map(|id| counts.get(id.as_ref()).copied().unwrap_or(0))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.counts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the current counts synchronously.
    pub fn flush(&self) -> Result<()> {
        Self::save(&self.state)
    }

    fn persist_in_background(&self) {
        if self.state.path.is_none() {
            return;
        }

        let state = Arc::clone(&self.state);
        std::thread::spawn(move || {
            if let Err(e) = Self::save(&state) {
                error!(error = %e, "Failed to persist usage counts");
            }
        });
    }

    fn save(state: &UsageState) -> Result<()> {
        let Some(path) = state.path.as_deref() else {
            return Ok(());
        };

        let _guard = state.save_lock.lock();
        let snapshot = state.counts.read().clone();
        write_json_atomic(path, &snapshot)
    }
}
