use parking_lot::{Condvar, Mutex, RwLock};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};
use tracing::{Level, debug, info, warn};

/// Hard cap on [`FileIndex::search_files`] results.
pub const MAX_FILE_RESULTS: usize = 15;

/// Minimum wall-clock gap between two progress updates of a running scan.
pub const PROGRESS_THROTTLE: Duration = Duration::from_millis(200);

/// Weight of a nested directory in the shallow pre-scan estimate.
pub const ESTIMATED_FILES_PER_DIR: usize = 500;

const SKIPPED_DIR_NAMES: &[&str] = &[
    "node_modules",
    "__pycache__",
    "vendor",
    "$RECYCLE.BIN",
    "System Volume Information",
    "AppData",
    "cache",
    "Cache",
    "dist",
    "build",
    "target",
    "venv",
    ".venv",
    "env",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub dir: PathBuf,
    /// Lowercase, including the leading dot. Empty when there is none.
    pub ext: String,
    pub size: u64,
}

impl FileEntry {
    fn from_walk_entry(entry: &ignore::DirEntry) -> Option<Self> {
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "Skipping unreadable entry");
                return None;
            }
        };

        let path = entry.path().to_path_buf();
        let name = entry.file_name().to_string_lossy().into_owned();
        let ext = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        Some(Self {
            name,
            dir,
            ext,
            size: metadata.len(),
            path,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    Idle,
    Indexing,
    Ready,
}

impl IndexState {
    pub fn as_str(self) -> &'static str {
        match self {
            IndexState::Idle => "idle",
            IndexState::Indexing => "indexing",
            IndexState::Ready => "ready",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStatus {
    pub state: IndexState,
    pub message: String,
    pub count: usize,
    /// Rough estimate while indexing, the real count once ready.
    pub total: usize,
}

impl IndexStatus {
    fn idle(message: &str) -> Self {
        Self {
            state: IndexState::Idle,
            message: message.to_string(),
            count: 0,
            total: 0,
        }
    }

    fn indexing(message: String, count: usize, total: usize) -> Self {
        Self {
            state: IndexState::Indexing,
            message,
            count,
            total,
        }
    }
}

/// Which directories get scanned and which directory names are pruned on top
/// of the built-in deny-list.
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    pub roots: Vec<PathBuf>,
    pub extra_skip_dirs: Vec<String>,
}

impl IndexOptions {
    pub fn with_default_roots() -> Self {
        Self {
            roots: default_roots(),
            extra_skip_dirs: Vec::new(),
        }
    }
}

/// Well-known user content directories plus `~/Projects` and `~/code` when
/// they exist. The home directory itself is never a root.
pub fn default_roots() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        warn!("No home directory, file index has no roots");
        return Vec::new();
    };

    let well_known = [
        (dirs::desktop_dir(), "Desktop"),
        (dirs::document_dir(), "Documents"),
        (dirs::download_dir(), "Downloads"),
        (dirs::picture_dir(), "Pictures"),
        (dirs::video_dir(), "Videos"),
        (dirs::audio_dir(), "Music"),
    ];

    let mut roots: Vec<PathBuf> = well_known
        .into_iter()
        .map(|(dir, fallback)| dir.unwrap_or_else(|| home.join(fallback)))
        .collect();

    for optional in ["Projects", "code"] {
        let dir = home.join(optional);
        if dir.is_dir() {
            roots.push(dir);
        }
    }

    let mut unique = Vec::with_capacity(roots.len());
    for root in roots {
        if root != home && !unique.contains(&root) {
            unique.push(root);
        }
    }
    unique
}

#[derive(Debug, Default)]
struct Snapshot {
    files: Vec<FileEntry>,
    names_lower: Vec<String>,
    paths_lower: Vec<String>,
}

impl Snapshot {
    fn build(files: Vec<FileEntry>) -> Self {
        let (names_lower, paths_lower) = files
            .par_iter()
            .map(|f| {
                (
                    f.name.to_lowercase(),
                    f.path.to_string_lossy().to_lowercase(),
                )
            })
            .unzip();

        Self {
            files,
            names_lower,
            paths_lower,
        }
    }
}

type StatusCallback = Box<dyn Fn(&IndexStatus) + Send + Sync>;

struct IndexShared {
    options: IndexOptions,
    snapshot: RwLock<Arc<Snapshot>>,
    status: Mutex<IndexStatus>,
    status_changed: Condvar,
    /// Bumped by every scan request and by clears. Only the latest
    /// generation may publish status or install a snapshot.
    generation: AtomicU64,
    /// Held from the generation check until every observer has the event,
    /// so observers see events in generation order.
    publish_lock: Mutex<()>,
    subscribers: Mutex<Vec<Sender<IndexStatus>>>,
    callbacks: RwLock<Vec<StatusCallback>>,
}

/// In-memory index of the user's files, rebuilt by a background scan.
///
/// Readers always see the last fully built snapshot. A running scan never
/// blocks [`Self::search_files`] or [`Self::status`].
#[derive(Clone)]
pub struct FileIndex {
    shared: Arc<IndexShared>,
}

impl std::fmt::Debug for FileIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileIndex")
            .field("roots", &self.shared.options.roots)
            .field("status", &*self.shared.status.lock())
            .field("generation", &self.shared.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl FileIndex {
    pub fn new(options: IndexOptions) -> Self {
        Self {
            shared: Arc::new(IndexShared {
                options,
                snapshot: RwLock::new(Arc::new(Snapshot::default())),
                status: Mutex::new(IndexStatus::idle("Not indexed")),
                status_changed: Condvar::new(),
                generation: AtomicU64::new(0),
                publish_lock: Mutex::new(()),
                subscribers: Mutex::new(Vec::new()),
                callbacks: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self::new(IndexOptions {
            roots,
            extra_skip_dirs: Vec::new(),
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.shared.options.roots
    }

    /// Kicks off the initial scan on a background thread.
    pub fn start(&self) -> u64 {
        self.reindex()
    }

    /// Starts a fresh scan and returns its generation. Any scan still running
    /// keeps walking but its result is dropped on completion.
    pub fn reindex(&self) -> u64 {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(generation, "Starting file index scan");

        let shared = Arc::clone(&self.shared);
        std::thread::spawn(move || shared.build_index(generation));
        generation
    }

    /// Drops the snapshot and returns to idle. Scans started before the
    /// clear are discarded when they finish.
    pub fn clear_index(&self) {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.install(generation, Snapshot::default());
        self.shared
            .publish(generation, IndexStatus::idle("Index cleared"));
        info!(generation, "File index cleared");
    }

    pub fn status(&self) -> IndexStatus {
        self.shared.status.lock().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.shared.status.lock().state == IndexState::Ready
    }

    /// Registers a status observer. Events are queued on an unbounded channel
    /// so a slow or abandoned receiver never stalls the scan.
    pub fn subscribe(&self) -> Receiver<IndexStatus> {
        let (tx, rx) = mpsc::channel();
        self.shared.subscribers.lock().push(tx);
        rx
    }

    /// Registers a callback invoked synchronously from the scanning thread.
    /// It must return quickly and must not call back into `reindex`,
    /// `start` or `clear_index`.
    pub fn on_status<F>(&self, callback: F)
    where
        F: Fn(&IndexStatus) + Send + Sync + 'static,
    {
        self.shared.callbacks.write().push(Box::new(callback));
    }

    /// Blocks until the index is ready or `timeout` elapses. Returns whether
    /// the index is ready.
    pub fn wait_until_ready(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut status = self.shared.status.lock();

        while status.state != IndexState::Ready {
            if self
                .shared
                .status_changed
                .wait_until(&mut status, deadline)
                .timed_out()
            {
                return status.state == IndexState::Ready;
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.shared.snapshot.read().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every entry in the current snapshot.
    pub fn files(&self) -> Vec<FileEntry> {
        self.current_snapshot().files.clone()
    }

    /// Case-insensitive substring match against name or full path, in
    /// snapshot order, stopping at [`MAX_FILE_RESULTS`].
    ///
    /// No minimum query length is enforced here.
    pub fn search_files(&self, query: &str) -> Vec<FileEntry> {
        if query.is_empty() {
            return Vec::new();
        }

        let snapshot = self.current_snapshot();
        let query_lower = query.to_lowercase();

        snapshot
            .files
            .iter()
            .zip(snapshot.names_lower.iter().zip(&snapshot.paths_lower))
            .filter(|(_, (name, path))| name.contains(&query_lower) || path.contains(&query_lower))
            .map(|(file, _)| file.clone())
            .take(MAX_FILE_RESULTS)
            .collect()
    }

    fn current_snapshot(&self) -> Arc<Snapshot> {
        self.shared.snapshot.read().clone()
    }
}

impl IndexShared {
    #[inline]
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Swaps in a snapshot if `generation` is still the latest. The check
    /// happens under the write lock so a concurrent clear always wins.
    fn install(&self, generation: u64, snapshot: Snapshot) -> bool {
        let mut current = self.snapshot.write();
        if !self.is_current(generation) {
            return false;
        }
        *current = Arc::new(snapshot);
        true
    }

    fn publish(&self, generation: u64, status: IndexStatus) -> bool {
        let _ordered = self.publish_lock.lock();
        {
            let mut current = self.status.lock();
            if !self.is_current(generation) {
                return false;
            }
            *current = status.clone();
        }
        self.status_changed.notify_all();

        for callback in self.callbacks.read().iter() {
            callback(&status);
        }
        self.subscribers
            .lock()
            .retain(|tx| tx.send(status.clone()).is_ok());

        true
    }

    #[tracing::instrument(skip(self), name = "file_index_scan", level = Level::DEBUG)]
    fn build_index(&self, generation: u64) {
        self.publish(
            generation,
            IndexStatus::indexing("Scanning files...".to_string(), 0, 0),
        );

        let started = Instant::now();
        let total = estimate_total(&self.options.roots).max(1);
        let mut files = Vec::new();
        let mut last_update = Instant::now();

        for root in &self.options.roots {
            if !self.is_current(generation) {
                debug!(generation, "Scan superseded, stopping early");
                return;
            }

            let root_name = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| root.display().to_string());

            for entry in walk_root(root, &self.options.extra_skip_dirs) {
                let Some(file) = FileEntry::from_walk_entry(&entry) else {
                    continue;
                };
                files.push(file);

                if last_update.elapsed() >= PROGRESS_THROTTLE {
                    last_update = Instant::now();
                    self.publish(
                        generation,
                        IndexStatus::indexing(
                            format!("Scanning {root_name}..."),
                            files.len(),
                            total,
                        ),
                    );
                }
            }
        }

        let count = files.len();
        if !self.install(generation, Snapshot::build(files)) {
            debug!(generation, count, "Discarding superseded scan result");
            return;
        }

        let elapsed = Duration::from_millis(started.elapsed().as_millis() as u64);
        info!(generation, count, ?elapsed, "File index ready");
        self.publish(
            generation,
            IndexStatus {
                state: IndexState::Ready,
                message: format!("{count} files indexed in {elapsed:?}"),
                count,
                total: count,
            },
        );
    }
}

/// Recursively yields the regular files under `root`. Pruned directories are
/// never descended into and per-entry errors are skipped.
fn walk_root(root: &Path, extra_skip_dirs: &[String]) -> impl Iterator<Item = ignore::DirEntry> {
    let extra_skip_dirs = extra_skip_dirs.to_vec();

    ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            // the root itself is never pruned
            !(is_dir
                && entry.depth() > 0
                && should_skip_dir(&entry.file_name().to_string_lossy(), &extra_skip_dirs))
        })
        .build()
        .filter_map(|result| match result {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "Skipping walk error");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
}

fn should_skip_dir(name: &str, extra_skip_dirs: &[String]) -> bool {
    name.starts_with('.')
        || SKIPPED_DIR_NAMES.contains(&name)
        || extra_skip_dirs.iter().any(|skip| skip == name)
}

/// Shallow listing of each root, counting nested directories as a fixed
/// placeholder. Only feeds the progress percentage.
fn estimate_total(roots: &[PathBuf]) -> usize {
    roots
        .iter()
        .filter_map(|root| std::fs::read_dir(root).ok())
        .flat_map(|entries| entries.filter_map(Result::ok))
        .map(|entry| match entry.file_type() {
            Ok(ft) if ft.is_dir() => ESTIMATED_FILES_PER_DIR,
            _ => 1,
        })
        .sum()
}
