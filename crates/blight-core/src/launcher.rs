//! Query routing and result dispatch: the surface the host UI talks to.
//!
//! A non-empty query fans out over the providers in a fixed order
//! (calculator, clipboard, system commands, applications, files) and the
//! slices are concatenated as they come. Execution decodes the result id
//! back to its owning provider.

use crate::calculator;
use crate::catalog::{AppEntry, Catalog};
use crate::clipboard::{ClipboardHistory, ClipboardPoller, ClipboardSource};
use crate::config::{
    self, CLIPBOARD_POLL_INTERVAL, CLIPBOARD_PREVIEW_CHARS, LauncherConfig, MAX_APP_RESULTS,
    MAX_CLIPBOARD_SHOWN, MAX_FILES_SHOWN, MAX_SUGGESTIONS, MIN_FILE_QUERY_LEN,
};
use crate::error::Result;
use crate::file_index::{FileEntry, FileIndex, IndexOptions, IndexStatus};
use crate::fuzzy;
use crate::icons::{IconCache, IconProvider};
use crate::path_utils::prettify_path;
use crate::shell::Shell;
use crate::system_commands::{self, SystemCommand};
use crate::types::{
    APP_CONTEXT_ACTIONS, CALC_RESULT_ID, Category, ContextAction, NO_RESULTS_ID, ResultId,
    SearchResult,
};
use crate::usage::UsageTracker;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const OUTCOME_OK: &str = "ok";
pub const OUTCOME_COPIED: &str = "copied";
pub const OUTCOME_ERROR: &str = "error";
pub const OUTCOME_NOT_FOUND: &str = "not found";
pub const OUTCOME_UNKNOWN_ACTION: &str = "unknown action";

const CLIPBOARD_TRIGGERS: &[&str] = &["cb", "clip", "clipboard"];
const CLIPBOARD_PREFIXES: &[&str] = &["cb ", "clip "];
const CLIPBOARD_SUBTITLE: &str = "Clipboard — press Enter to copy";
const APPLICATION_SUBTITLE: &str = "Application";
const NO_RESULTS_TITLE: &str = "No results found";

/// Everything the launcher needs, constructed by the host.
pub struct Services {
    pub catalog: Arc<dyn Catalog>,
    pub usage: UsageTracker,
    pub files: FileIndex,
    pub clipboard: ClipboardHistory,
    pub shell: Arc<dyn Shell>,
    pub icons: Arc<dyn IconProvider>,
}

impl Services {
    /// Loads persisted usage and clipboard state from `data_dir` and sets
    /// up the file index from `config`. Nothing is scanned yet.
    pub fn from_data_dir(
        data_dir: &Path,
        config: &LauncherConfig,
        catalog: Arc<dyn Catalog>,
        shell: Arc<dyn Shell>,
        icons: Arc<dyn IconProvider>,
    ) -> Self {
        let roots = config
            .index_roots
            .clone()
            .unwrap_or_else(crate::file_index::default_roots);

        Self {
            catalog,
            usage: UsageTracker::load(config::usage_path(data_dir)),
            files: FileIndex::new(IndexOptions {
                roots,
                extra_skip_dirs: config.extra_skip_dirs.clone(),
            }),
            clipboard: ClipboardHistory::load(config::clipboard_path(data_dir)),
            shell,
            icons,
        }
    }
}

pub struct Launcher {
    catalog: Arc<dyn Catalog>,
    usage: UsageTracker,
    files: FileIndex,
    clipboard: ClipboardHistory,
    shell: Arc<dyn Shell>,
    icons: IconCache,
    last_calc_value: Mutex<Option<String>>,
}

impl std::fmt::Debug for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher")
            .field("files", &self.files)
            .field("usage_entries", &self.usage.len())
            .field("clipboard_entries", &self.clipboard.len())
            .finish_non_exhaustive()
    }
}

impl Launcher {
    pub fn new(services: Services) -> Self {
        Self {
            catalog: services.catalog,
            usage: services.usage,
            files: services.files,
            clipboard: services.clipboard,
            shell: services.shell,
            icons: IconCache::new(services.icons),
            last_calc_value: Mutex::new(None),
        }
    }

    /// Starts the initial background file scan.
    pub fn start(&self) {
        self.files.start();
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    pub fn files(&self) -> &FileIndex {
        &self.files
    }

    pub fn clipboard(&self) -> &ClipboardHistory {
        &self.clipboard
    }

    /// Captures clipboard text from `source` into the history until the
    /// returned poller is dropped.
    pub fn spawn_clipboard_poller<S: ClipboardSource>(&self, source: S) -> ClipboardPoller {
        self.clipboard.spawn_poller(source, CLIPBOARD_POLL_INTERVAL)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        if query.is_empty() {
            return self.default_results();
        }

        let mut results = Vec::new();
        results.extend(self.search_calculator(query));
        results.extend(self.search_clipboard(query));
        results.extend(self.search_system_commands(query));
        results.extend(self.search_apps(query));
        results.extend(self.search_files(query));

        if results.is_empty() {
            return vec![SearchResult {
                id: NO_RESULTS_ID.to_string(),
                title: NO_RESULTS_TITLE.to_string(),
                subtitle: query.to_string(),
                icon: String::new(),
                category: Category::General,
                path: None,
            }];
        }

        debug!(count = results.len(), "Search finished");
        results
    }

    /// Runs the action behind a result id and returns an outcome string:
    /// `ok`, `copied`, `error`, `not found`, or the failure message.
    pub fn execute(&self, id: &str) -> String {
        info!(?id, "Executing result");

        match ResultId::parse(id) {
            ResultId::Calculator => {
                let value = self.last_calc_value.lock().clone();
                match value {
                    Some(value) => outcome(self.shell.copy_text(&value), OUTCOME_COPIED),
                    None => OUTCOME_ERROR.to_string(),
                }
            }
            ResultId::Clipboard(offset) => {
                match offset.and_then(|offset| self.clipboard.get(offset)) {
                    Some(entry) => match self.shell.copy_text(&entry.content) {
                        Ok(()) => OUTCOME_COPIED.to_string(),
                        Err(e) => {
                            warn!(error = %e, "Failed to copy clipboard entry");
                            OUTCOME_ERROR.to_string()
                        }
                    },
                    None => OUTCOME_ERROR.to_string(),
                }
            }
            ResultId::System(command) => {
                if system_commands::find(command).is_none() {
                    debug!(?command, "Ignoring unknown system command");
                    return OUTCOME_OK.to_string();
                }
                outcome(self.shell.run_system_command(command), OUTCOME_OK)
            }
            ResultId::FileOpen(path) => outcome(self.shell.open_path(Path::new(path)), OUTCOME_OK),
            ResultId::FileReveal(path) => {
                outcome(self.shell.reveal_path(Path::new(path)), OUTCOME_OK)
            }
            ResultId::App(name) => match self.catalog.find(name) {
                Some(app) => {
                    self.usage.record(name);
                    outcome(self.shell.launch(&app), OUTCOME_OK)
                }
                None => OUTCOME_NOT_FOUND.to_string(),
            },
        }
    }

    /// The context menu for a result. Only applications in the catalog have
    /// one.
    pub fn get_context_actions(&self, id: &str) -> Vec<ContextAction> {
        match ResultId::parse(id) {
            ResultId::App(name) if self.catalog.find(name).is_some() => {
                APP_CONTEXT_ACTIONS.to_vec()
            }
            _ => Vec::new(),
        }
    }

    pub fn execute_context_action(&self, id: &str, action_id: &str) -> String {
        info!(?id, ?action_id, "Executing context action");

        let Some(app) = self.catalog.find(id) else {
            return OUTCOME_NOT_FOUND.to_string();
        };

        match action_id {
            "open" => {
                self.usage.record(id);
                outcome(self.shell.launch(&app), OUTCOME_OK)
            }
            "admin" => {
                self.usage.record(id);
                outcome(self.shell.launch_elevated(&app), OUTCOME_OK)
            }
            "explorer" => outcome(self.shell.reveal_path(&app.path), OUTCOME_OK),
            "copy-path" => outcome(
                self.shell.copy_text(&app.path.to_string_lossy()),
                OUTCOME_OK,
            ),
            _ => OUTCOME_UNKNOWN_ACTION.to_string(),
        }
    }

    pub fn get_index_status(&self) -> IndexStatus {
        self.files.status()
    }

    pub fn reindex_files(&self) {
        self.files.reindex();
    }

    pub fn clear_index(&self) {
        self.files.clear_index();
    }

    pub fn refresh_apps(&self) {
        self.catalog.refresh();
        self.icons.clear();
    }

    pub fn get_icon(&self, path: &str) -> String {
        self.icons.get(path)
    }

    fn search_calculator(&self, query: &str) -> Option<SearchResult> {
        if !calculator::is_calc_query(query) {
            return None;
        }

        let calc = match calculator::evaluate(query) {
            Ok(calc) => calc,
            Err(e) => {
                debug!(error = %e, "Not a valid expression");
                return None;
            }
        };

        *self.last_calc_value.lock() = Some(calc.formatted.clone());
        Some(SearchResult {
            id: CALC_RESULT_ID.to_string(),
            subtitle: format!("{} — press Enter to copy", calc.expression),
            title: calc.formatted,
            icon: String::new(),
            category: Category::Calculator,
            path: None,
        })
    }

    fn search_clipboard(&self, query: &str) -> Vec<SearchResult> {
        if !is_clipboard_query(query) {
            return Vec::new();
        }

        self.clipboard
            .entries()
            .into_iter()
            .take(MAX_CLIPBOARD_SHOWN)
            .enumerate()
            .map(|(offset, entry)| SearchResult {
                id: ResultId::Clipboard(Some(offset)).to_string(),
                title: preview(&entry.content),
                subtitle: CLIPBOARD_SUBTITLE.to_string(),
                icon: String::new(),
                category: Category::Clipboard,
                path: None,
            })
            .collect()
    }

    fn search_system_commands(&self, query: &str) -> Vec<SearchResult> {
        system_commands::search(query)
            .map(system_command_result)
            .collect()
    }

    fn search_apps(&self, query: &str) -> Vec<SearchResult> {
        let apps = self.catalog.apps();
        let names: Vec<&str> = apps.iter().map(|app| app.name.as_str()).collect();
        let usage = self.usage.scores(&names);

        fuzzy::rank(query, &names, &usage)
            .into_iter()
            .take(MAX_APP_RESULTS)
            .map(|m| self.app_result(&apps[m.index], Category::Applications))
            .collect()
    }

    fn search_files(&self, query: &str) -> Vec<SearchResult> {
        if query.chars().count() < MIN_FILE_QUERY_LEN || !self.files.is_ready() {
            return Vec::new();
        }

        self.files
            .search_files(query)
            .into_iter()
            .take(MAX_FILES_SHOWN)
            .map(file_result)
            .collect()
    }

    /// Empty query: the catalog ranked by usage alone.
    fn default_results(&self) -> Vec<SearchResult> {
        let apps = self.catalog.apps();
        let names: Vec<&str> = apps.iter().map(|app| app.name.as_str()).collect();
        let usage = self.usage.scores(&names);

        fuzzy::rank("", &names, &usage)
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|m| {
                let category = if usage[m.index] > 0 {
                    Category::Recent
                } else {
                    Category::Suggested
                };
                self.app_result(&apps[m.index], category)
            })
            .collect()
    }

    fn app_result(&self, app: &AppEntry, category: Category) -> SearchResult {
        let path = app.path.to_string_lossy().into_owned();
        let subtitle = if app.is_shortcut {
            APPLICATION_SUBTITLE.to_string()
        } else {
            prettify_path(&app.path)
        };

        SearchResult {
            id: app.name.clone(),
            title: app.name.clone(),
            subtitle,
            icon: self.icons.get(&path),
            category,
            path: Some(path),
        }
    }
}

fn outcome(result: Result<()>, success: &str) -> String {
    match result {
        Ok(()) => success.to_string(),
        Err(e) => {
            warn!(error = %e, "Action failed");
            e.to_string()
        }
    }
}

fn is_clipboard_query(query: &str) -> bool {
    let query = query.to_lowercase();
    CLIPBOARD_TRIGGERS.contains(&query.as_str())
        || CLIPBOARD_PREFIXES.iter().any(|prefix| query.starts_with(prefix))
}

fn preview(content: &str) -> String {
    match content.char_indices().nth(CLIPBOARD_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &content[..cut]),
        None => content.to_string(),
    }
}

fn system_command_result(command: &SystemCommand) -> SearchResult {
    SearchResult {
        id: ResultId::System(command.id).to_string(),
        title: command.name.to_string(),
        subtitle: command.subtitle.to_string(),
        icon: command.icon.to_string(),
        category: Category::System,
        path: None,
    }
}

fn file_result(file: FileEntry) -> SearchResult {
    let path = file.path.to_string_lossy().into_owned();
    SearchResult {
        id: ResultId::FileOpen(&path).to_string(),
        title: file.name,
        subtitle: prettify_path(&file.dir),
        icon: String::new(),
        category: Category::Files,
        path: Some(path),
    }
}
