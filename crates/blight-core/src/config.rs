//! User settings and the on-disk layout of launcher state.

use crate::error::{Error, Result};
use crate::persist::{read_json, write_json_atomic};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_HOTKEY: &str = "Alt+Space";

pub const MAX_APP_RESULTS: usize = 10;
pub const MAX_SUGGESTIONS: usize = 6;
pub const MAX_FILES_SHOWN: usize = 5;
pub const MAX_CLIPBOARD_SHOWN: usize = 8;
pub const CLIPBOARD_PREVIEW_CHARS: usize = 80;
pub const MIN_FILE_QUERY_LEN: usize = 3;
pub const CLIPBOARD_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub use crate::clipboard::MAX_CLIPBOARD_ENTRIES;
pub use crate::file_index::{ESTIMATED_FILES_PER_DIR, MAX_FILE_RESULTS, PROGRESS_THROTTLE};

const DATA_DIR_NAME: &str = ".blight";
const CONFIG_FILE: &str = "config.json";
const USAGE_FILE: &str = "usage.json";
const CLIPBOARD_FILE: &str = "clipboard.json";
const LOG_FILE: &str = "blight.log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LauncherConfig {
    pub first_run: bool,
    pub hotkey: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Replaces the well-known content folders as file index roots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_roots: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_skip_dirs: Vec<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            first_run: true,
            hotkey: DEFAULT_HOTKEY.to_string(),
            log_level: None,
            index_roots: None,
            extra_skip_dirs: Vec::new(),
        }
    }
}

impl LauncherConfig {
    /// Reads `config.json` from `data_dir`. Missing or unreadable settings
    /// fall back to defaults, which keeps `first_run` set.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        match read_json::<Self>(&path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        write_json_atomic(&data_dir.join(CONFIG_FILE), self)
    }

    /// Marks onboarding done. An empty `hotkey` keeps the current one.
    pub fn complete_onboarding(&mut self, hotkey: &str) {
        self.first_run = false;
        let hotkey = hotkey.trim();
        if !hotkey.is_empty() {
            self.hotkey = hotkey.to_string();
        }
    }
}

/// `~/.blight`
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(DATA_DIR_NAME))
        .ok_or_else(|| Error::InvalidPath(PathBuf::from("~")))
}

pub fn usage_path(data_dir: &Path) -> PathBuf {
    data_dir.join(USAGE_FILE)
}

pub fn clipboard_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CLIPBOARD_FILE)
}

pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("logs").join(LOG_FILE)
}
