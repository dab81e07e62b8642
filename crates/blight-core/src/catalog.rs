//! Application catalog consumed by the launcher.
//!
//! Start-menu style discovery is platform specific and lives in the host;
//! this module defines the catalog contract, an in-memory implementation and
//! a plain `PATH` executable scan.

use ahash::AHashSet;
use parking_lot::RwLock;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppEntry {
    /// Display name, also the identifier used for usage tracking.
    pub name: String,
    pub path: PathBuf,
    /// What actually gets executed. Differs from `path` for shortcuts.
    pub launch_target: PathBuf,
    pub is_shortcut: bool,
}

impl AppEntry {
    pub fn executable(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: name.into(),
            launch_target: path.clone(),
            path,
            is_shortcut: false,
        }
    }

    pub fn shortcut(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        launch_target: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            launch_target: launch_target.into(),
            is_shortcut: true,
        }
    }
}

pub trait Catalog: Send + Sync {
    /// Current application list. The order is the ranking tie-break order.
    fn apps(&self) -> Arc<[AppEntry]>;

    /// Re-runs discovery. Catalogs without a discovery step ignore this.
    fn refresh(&self) {}

    fn names(&self) -> Vec<String> {
        self.apps().iter().map(|app| app.name.clone()).collect()
    }

    fn find(&self, name: &str) -> Option<AppEntry> {
        self.apps().iter().find(|app| app.name == name).cloned()
    }
}

/// A fixed list that the host can swap out wholesale.
#[derive(Debug)]
pub struct StaticCatalog {
    apps: RwLock<Arc<[AppEntry]>>,
}

impl StaticCatalog {
    pub fn new(apps: Vec<AppEntry>) -> Self {
        Self {
            apps: RwLock::new(apps.into()),
        }
    }

    pub fn replace(&self, apps: Vec<AppEntry>) {
        *self.apps.write() = apps.into();
    }
}

impl Catalog for StaticCatalog {
    fn apps(&self) -> Arc<[AppEntry]> {
        Arc::clone(&*self.apps.read())
    }
}

/// Executables found directly inside the `PATH` directories.
#[derive(Debug)]
pub struct PathCatalog {
    dirs: Vec<PathBuf>,
    apps: RwLock<Arc<[AppEntry]>>,
}

impl PathCatalog {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        let apps = scan_path_apps(&dirs);
        Self {
            dirs,
            apps: RwLock::new(apps.into()),
        }
    }

    pub fn from_env() -> Self {
        let dirs = std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self::new(dirs)
    }
}

impl Catalog for PathCatalog {
    fn apps(&self) -> Arc<[AppEntry]> {
        Arc::clone(&*self.apps.read())
    }

    fn refresh(&self) {
        let apps = scan_path_apps(&self.dirs);
        debug!(count = apps.len(), "PATH catalog refreshed");
        *self.apps.write() = apps.into();
    }
}

const IGNORED_PATH_SEGMENTS: &[&str] = &[
    "system32",
    "syswow64",
    "winsxs",
    "servicing",
    "windows defender",
    "windows nt",
    "windows mail",
    "windows sidebar",
    "windows media player",
    "maintenance",
    "accessibility",
];

const IGNORED_NAME_PARTS: &[&str] = &[
    "uninstall",
    "readme",
    "help",
    "license",
    "changelog",
    "release notes",
    "setup",
    "install",
    "update",
];

fn is_ignored_path(path: &Path) -> bool {
    let lower = path.to_string_lossy().to_lowercase();
    if IGNORED_PATH_SEGMENTS.iter().any(|seg| lower.contains(seg)) {
        return true;
    }

    path.components().any(|part| {
        let part = part.as_os_str().to_string_lossy();
        part.len() > 1 && part.starts_with('.')
    })
}

fn is_ignored_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    IGNORED_NAME_PARTS.iter().any(|part| lower.contains(part))
}

#[cfg(unix)]
fn executable_name(path: &Path, metadata: &std::fs::Metadata) -> Option<String> {
    use std::os::unix::fs::PermissionsExt;
    (metadata.permissions().mode() & 0o111 != 0)
        .then(|| path.file_name())
        .flatten()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(not(unix))]
fn executable_name(path: &Path, _metadata: &std::fs::Metadata) -> Option<String> {
    let is_exe = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"));
    is_exe
        .then(|| path.file_stem())
        .flatten()
        .map(|stem| stem.to_string_lossy().into_owned())
}

/// Lists executables directly inside `dirs` (no recursion), skipping noisy
/// names like installers, and keeps the first of any case-insensitive
/// duplicate.
pub fn scan_path_apps(dirs: &[PathBuf]) -> Vec<AppEntry> {
    let mut seen = AHashSet::new();
    let mut apps = Vec::new();

    for dir in dirs {
        if is_ignored_path(dir) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };

        let mut entries: Vec<_> = entries.filter_map(Result::ok).collect();
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let Ok(metadata) = std::fs::metadata(&path) else {
                continue;
            };
            if metadata.is_dir() {
                continue;
            }
            let Some(name) = executable_name(&path, &metadata) else {
                continue;
            };
            if is_ignored_name(&name) || !seen.insert(name.to_lowercase()) {
                continue;
            }

            apps.push(AppEntry::executable(name, path));
        }
    }

    apps
}
