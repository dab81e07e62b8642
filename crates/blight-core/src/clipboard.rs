//! Clipboard history: a bounded, most-recent-first list of captured text,
//! persisted as JSON next to the other launcher state.

use crate::error::Result;
use crate::persist::{read_json_or_default, write_json_atomic};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error};

pub const MAX_CLIPBOARD_ENTRIES: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    pub content: String,
    /// Unix seconds.
    pub timestamp: i64,
}

/// Reads the system clipboard. Implemented by the host.
pub trait ClipboardSource: Send + 'static {
    fn read_text(&mut self) -> Option<String>;
}

#[derive(Debug)]
struct ClipboardState {
    entries: RwLock<Vec<ClipboardEntry>>,
    path: Option<PathBuf>,
    save_lock: Mutex<()>,
}

#[derive(Debug, Clone)]
pub struct ClipboardHistory {
    state: Arc<ClipboardState>,
}

impl ClipboardHistory {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut entries: Vec<ClipboardEntry> = read_json_or_default(&path);
        entries.truncate(MAX_CLIPBOARD_ENTRIES);

        Self::with_state(entries, Some(path))
    }

    pub fn in_memory() -> Self {
        Self::with_state(Vec::new(), None)
    }

    fn with_state(entries: Vec<ClipboardEntry>, path: Option<PathBuf>) -> Self {
        Self {
            state: Arc::new(ClipboardState {
                entries: RwLock::new(entries),
                path,
                save_lock: Mutex::new(()),
            }),
        }
    }

    /// Pushes `content` to the front. Empty text and a repeat of the most
    /// recent entry are ignored. Returns whether an entry was added.
    pub fn add(&self, content: impl Into<String>) -> bool {
        let content = content.into();
        if content.is_empty() {
            return false;
        }

        {
            let mut entries = self.state.entries.write();
            if entries.first().is_some_and(|e| e.content == content) {
                return false;
            }

            entries.insert(
                0,
                ClipboardEntry {
                    content,
                    timestamp: chrono::Utc::now().timestamp(),
                },
            );
            entries.truncate(MAX_CLIPBOARD_ENTRIES);
        }

        self.persist_in_background();
        true
    }

    /// Most recent first.
    pub fn entries(&self) -> Vec<ClipboardEntry> {
        self.state.entries.read().clone()
    }

    pub fn get(&self, index: usize) -> Option<ClipboardEntry> {
        self.state.entries.read().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flush(&self) -> Result<()> {
        Self::save(&self.state)
    }

    /// Polls `source` every `interval` on a dedicated thread and records new
    /// text. The loop ends when the returned poller is stopped or dropped.
    pub fn spawn_poller<S: ClipboardSource>(&self, mut source: S, interval: Duration) -> ClipboardPoller {
        let stop = Arc::new(AtomicBool::new(false));
        let history = self.clone();
        let stop_flag = Arc::clone(&stop);

        let handle = std::thread::spawn(move || {
            let mut last_content = String::new();
            while !stop_flag.load(Ordering::Relaxed) {
                if let Some(text) = source.read_text()
                    && !text.is_empty()
                    && text != last_content
                {
                    last_content.clone_from(&text);
                    history.add(text);
                }
                std::thread::park_timeout(interval);
            }
            debug!("Clipboard poller stopped");
        });

        ClipboardPoller {
            stop,
            handle: Some(handle),
        }
    }

    fn persist_in_background(&self) {
        if self.state.path.is_none() {
            return;
        }

        let state = Arc::clone(&self.state);
        std::thread::spawn(move || {
            if let Err(e) = Self::save(&state) {
                error!(error = %e, "Failed to persist clipboard history");
            }
        });
    }

    fn save(state: &ClipboardState) -> Result<()> {
        let Some(path) = state.path.as_deref() else {
            return Ok(());
        };

        let _guard = state.save_lock.lock();
        let snapshot = state.entries.read().clone();
        write_json_atomic(path, &snapshot)
    }
}

pub struct ClipboardPoller {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ClipboardPoller {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                error!("Clipboard poller thread panicked");
            }
        }
    }
}

impl Drop for ClipboardPoller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
