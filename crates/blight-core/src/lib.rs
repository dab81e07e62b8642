//! blight-core - search, ranking and result aggregation for the blight quick launcher
//!
//! The [`Launcher`] routes a query across the calculator, clipboard history,
//! system commands, the application catalog and the background file index,
//! and dispatches the chosen result back to its provider.

pub mod calculator;
pub mod catalog;
pub mod clipboard;
pub mod config;
mod error;
pub mod file_index;
pub mod fuzzy;
pub mod icons;
pub mod launcher;
pub mod log;
pub mod path_utils;
mod persist;
pub mod shell;
pub mod system_commands;
pub mod types;
pub mod usage;

pub use catalog::{AppEntry, Catalog, PathCatalog, StaticCatalog};
pub use clipboard::{ClipboardEntry, ClipboardHistory, ClipboardSource};
pub use config::LauncherConfig;
pub use error::{Error, Result};
pub use file_index::{FileEntry, FileIndex, IndexOptions, IndexState, IndexStatus};
pub use icons::{IconCache, IconProvider, NoIcons};
pub use launcher::{Launcher, Services};
pub use shell::{Shell, SystemShell};
pub use types::{Category, ContextAction, ResultId, SearchResult};
pub use usage::UsageTracker;
