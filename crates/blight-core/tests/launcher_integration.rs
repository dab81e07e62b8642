use blight_core::{
    AppEntry, Category, ClipboardHistory, Error, FileIndex, IndexState, Launcher,
    LauncherConfig, NoIcons, Services, Shell, StaticCatalog, UsageTracker,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct RecordingShell {
    calls: Mutex<Vec<String>>,
    fail_system_commands: bool,
}

impl RecordingShell {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn push(&self, call: String) {
        self.calls.lock().push(call);
    }
}

impl Shell for RecordingShell {
    fn open_path(&self, path: &Path) -> blight_core::Result<()> {
        self.push(format!("open {}", path.display()));
        Ok(())
    }

    fn reveal_path(&self, path: &Path) -> blight_core::Result<()> {
        self.push(format!("reveal {}", path.display()));
        Ok(())
    }

    fn launch(&self, app: &AppEntry) -> blight_core::Result<()> {
        self.push(format!("launch {}", app.name));
        Ok(())
    }

    fn launch_elevated(&self, app: &AppEntry) -> blight_core::Result<()> {
        self.push(format!("elevate {}", app.name));
        Ok(())
    }

    fn copy_text(&self, text: &str) -> blight_core::Result<()> {
        self.push(format!("copy {text}"));
        Ok(())
    }

    fn run_system_command(&self, id: &str) -> blight_core::Result<()> {
        self.push(format!("system {id}"));
        if self.fail_system_commands {
            return Err(Error::CommandFailed {
                program: "systemctl".to_string(),
                reason: "access denied".to_string(),
            });
        }
        Ok(())
    }
}

fn sample_apps() -> Vec<AppEntry> {
    vec![
        AppEntry::executable("Notepad", "/apps/notepad"),
        AppEntry::shortcut("Firefox", "/menu/Firefox.lnk", "/apps/firefox"),
        AppEntry::executable("Visual Studio Code", "/apps/code"),
        AppEntry::executable("Terminal", "/apps/terminal"),
    ]
}

struct Fixture {
    launcher: Launcher,
    shell: Arc<RecordingShell>,
}

fn fixture_with(shell: RecordingShell, files: FileIndex) -> Fixture {
    let shell = Arc::new(shell);
    let launcher = Launcher::new(Services {
        catalog: Arc::new(StaticCatalog::new(sample_apps())),
        usage: UsageTracker::in_memory(),
        files,
        clipboard: ClipboardHistory::in_memory(),
        shell: shell.clone(),
        icons: Arc::new(NoIcons),
    });

    Fixture { launcher, shell }
}

fn fixture() -> Fixture {
    fixture_with(RecordingShell::default(), FileIndex::with_roots(Vec::new()))
}

fn sample_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("docs/archive")).unwrap();
    std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
    std::fs::write(root.join("docs/quarterly-report.pdf"), b"%PDF").unwrap();
    std::fs::write(root.join("docs/archive/report-draft.txt"), b"draft").unwrap();
    std::fs::write(root.join("node_modules/pkg/report.js"), b"skip me").unwrap();
    std::fs::write(root.join("notes.md"), b"# notes").unwrap();
    dir
}

#[test]
fn arithmetic_query_yields_single_calculator_result() {
    let f = fixture();
    let results = f.launcher.search("=2+2*3");

    let calc: Vec<_> = results
        .iter()
        .filter(|r| r.category == Category::Calculator)
        .collect();
    assert_eq!(calc.len(), 1);
    assert_eq!(results[0].id, "calc-result");
    assert_eq!(results[0].title, "8");
    assert_eq!(results[0].subtitle, "2+2*3 — press Enter to copy");

    assert_eq!(f.launcher.execute("calc-result"), "copied");
    assert_eq!(f.shell.calls(), vec!["copy 8"]);
}

#[test]
fn invalid_expression_is_silently_dropped() {
    let f = fixture();
    let results = f.launcher.search("=2+");

    assert!(results.iter().all(|r| r.category != Category::Calculator));
    assert_eq!(f.launcher.execute("calc-result"), "error");
}

#[test]
fn overflowing_expression_is_dropped_without_aborting_search() {
    let f = fixture();
    let results = f.launcher.search("=-2^63 % -1");

    assert!(results.iter().all(|r| r.category != Category::Calculator));
    assert_eq!(results[0].id, "no-results");
}

#[test]
fn whitespace_query_goes_through_the_providers() {
    let f = fixture();
    let results = f.launcher.search(" ");

    let system: Vec<&str> = results
        .iter()
        .filter(|r| r.category == Category::System)
        .map(|r| r.title.as_str())
        .collect();
    assert_eq!(
        system,
        vec!["Lock Screen", "Shut Down", "Empty Recycle Bin", "Log Out"]
    );
    assert!(
        results
            .iter()
            .all(|r| r.category != Category::Suggested && r.category != Category::Recent)
    );
}

#[test]
fn application_is_found_by_name() {
    let f = fixture();
    let results = f.launcher.search("notepad");

    let app = results
        .iter()
        .find(|r| r.category == Category::Applications && r.title == "Notepad")
        .expect("Notepad should be listed");
    assert_eq!(app.id, "Notepad");
    assert_eq!(app.path.as_deref(), Some("/apps/notepad"));
}

#[test]
fn shortcut_subtitle_is_generic() {
    let f = fixture();
    let results = f.launcher.search("firefox");
    let firefox = results.iter().find(|r| r.id == "Firefox").unwrap();
    assert_eq!(firefox.subtitle, "Application");
}

#[test]
fn unknown_identifier_is_not_found() {
    let f = fixture();
    assert_eq!(f.launcher.execute("does-not-exist"), "not found");
    assert!(f.shell.calls().is_empty());
}

#[test]
fn launching_records_usage_immediately() {
    let f = fixture();
    assert_eq!(f.launcher.execute("Notepad"), "ok");
    assert_eq!(f.launcher.usage().score("Notepad"), 1);
    assert_eq!(f.shell.calls(), vec!["launch Notepad"]);
}

#[test]
fn clipboard_query_lists_recent_entries_only() {
    let f = fixture();
    for i in 0..12 {
        f.launcher.clipboard().add(format!("snippet {i}"));
    }

    let results = f.launcher.search("cb");
    assert_eq!(results.len(), 8);
    assert!(results.iter().all(|r| r.category == Category::Clipboard));
    assert_eq!(results[0].title, "snippet 11");
    assert_eq!(results[7].title, "snippet 4");
    assert_eq!(results[0].id, "clip-0");

    assert_eq!(f.launcher.execute("clip-1"), "copied");
    assert_eq!(f.shell.calls(), vec!["copy snippet 10"]);
    assert_eq!(f.launcher.execute("clip-99"), "error");
    assert_eq!(f.launcher.execute("clip-abc"), "error");
}

#[test]
fn long_clipboard_entries_are_previewed() {
    let f = fixture();
    f.launcher.clipboard().add("a".repeat(200));

    let results = f.launcher.search("clip ");
    assert_eq!(results[0].title, format!("{}…", "a".repeat(80)));
}

#[test]
fn system_commands_run_through_the_shell() {
    let f = fixture();
    let results = f.launcher.search("sleep");

    let sleep = results.iter().find(|r| r.category == Category::System).unwrap();
    assert_eq!(sleep.id, "sys-sleep");
    assert_eq!(f.launcher.execute("sys-sleep"), "ok");
    assert_eq!(f.launcher.execute("sys-hibernate"), "ok");
    assert_eq!(f.shell.calls(), vec!["system sleep"]);
}

#[test]
fn system_command_errors_are_reported_verbatim() {
    let f = fixture_with(
        RecordingShell {
            fail_system_commands: true,
            ..Default::default()
        },
        FileIndex::with_roots(Vec::new()),
    );

    assert_eq!(
        f.launcher.execute("sys-shutdown"),
        "Failed to run systemctl: access denied"
    );
}

#[test]
fn nothing_matching_yields_sentinel() {
    let f = fixture();
    let results = f.launcher.search("zzqqxx");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "no-results");
    assert_eq!(results[0].title, "No results found");
    assert_eq!(results[0].subtitle, "zzqqxx");
    assert_eq!(results[0].category, Category::General);
}

#[test]
fn empty_query_suggests_by_usage() {
    let f = fixture();
    f.launcher.execute("Terminal");
    f.launcher.execute("Terminal");
    f.launcher.execute("Firefox");

    let results = f.launcher.search("");
    let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Terminal", "Firefox", "Notepad", "Visual Studio Code"]);
    assert_eq!(results[0].category, Category::Recent);
    assert_eq!(results[1].category, Category::Recent);
    assert_eq!(results[2].category, Category::Suggested);
}

#[test]
fn context_actions_are_scoped_to_applications() {
    let f = fixture();

    let actions = f.launcher.get_context_actions("Notepad");
    let ids: Vec<&str> = actions.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["open", "admin", "explorer", "copy-path"]);
    assert!(f.launcher.get_context_actions("sys-sleep").is_empty());
    assert!(f.launcher.get_context_actions("calc-result").is_empty());
    assert!(f.launcher.get_context_actions("no-results").is_empty());
    assert!(f.launcher.get_context_actions("Uninstalled App").is_empty());

    assert_eq!(f.launcher.execute_context_action("Notepad", "admin"), "ok");
    assert_eq!(f.launcher.usage().score("Notepad"), 1);
    assert_eq!(f.launcher.execute_context_action("Notepad", "copy-path"), "ok");
    assert_eq!(f.launcher.execute_context_action("Notepad", "explorer"), "ok");
    assert_eq!(f.launcher.usage().score("Notepad"), 1);
    assert_eq!(
        f.launcher.execute_context_action("Notepad", "uninstall"),
        "unknown action"
    );
    assert_eq!(f.launcher.execute_context_action("Nope", "open"), "not found");

    assert_eq!(
        f.shell.calls(),
        vec![
            "elevate Notepad",
            "copy /apps/notepad",
            "reveal /apps/notepad",
        ]
    );
}

#[test]
fn files_appear_once_the_index_is_ready() {
    let tree = sample_tree();
    let f = fixture_with(
        RecordingShell::default(),
        FileIndex::with_roots(vec![tree.path().to_path_buf()]),
    );

    assert!(
        f.launcher
            .search("report")
            .iter()
            .all(|r| r.category != Category::Files),
        "no file results before the first scan"
    );

    f.launcher.start();
    assert!(f.launcher.files().wait_until_ready(Duration::from_secs(10)));
    assert_eq!(f.launcher.get_index_status().state, IndexState::Ready);

    let files: Vec<_> = f
        .launcher
        .search("report")
        .into_iter()
        .filter(|r| r.category == Category::Files)
        .collect();
    let mut names: Vec<&str> = files.iter().map(|r| r.title.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["quarterly-report.pdf", "report-draft.txt"]);

    let expected: PathBuf = tree.path().join("docs").join("quarterly-report.pdf");
    let pdf = files.iter().find(|r| r.title == "quarterly-report.pdf").unwrap();
    assert_eq!(pdf.id, format!("file-open:{}", expected.display()));
    assert_eq!(f.launcher.execute(&pdf.id), "ok");
    assert_eq!(f.shell.calls(), vec![format!("open {}", expected.display())]);

    // two characters is below the file search threshold
    assert!(
        f.launcher
            .search("re")
            .iter()
            .all(|r| r.category != Category::Files)
    );
}

#[test]
fn clearing_the_index_hides_files() {
    let tree = sample_tree();
    let f = fixture_with(
        RecordingShell::default(),
        FileIndex::with_roots(vec![tree.path().to_path_buf()]),
    );
    f.launcher.start();
    assert!(f.launcher.files().wait_until_ready(Duration::from_secs(10)));

    f.launcher.clear_index();

    let status = f.launcher.get_index_status();
    assert_eq!(status.state, IndexState::Idle);
    assert_eq!(status.message, "Index cleared");
    assert!(f.launcher.files().search_files("report").is_empty());
    assert_eq!(f.launcher.search("report")[0].id, "no-results");

    f.launcher.reindex_files();
    assert!(f.launcher.files().wait_until_ready(Duration::from_secs(10)));
    assert_eq!(f.launcher.files().search_files("report").len(), 2);
}

#[test]
fn file_reveal_ids_are_dispatched() {
    let f = fixture();
    assert_eq!(f.launcher.execute("file-reveal:/data/a.txt"), "ok");
    assert_eq!(f.shell.calls(), vec!["reveal /data/a.txt"]);
}

#[test]
fn state_persists_across_launcher_instances() {
    let data_dir = tempfile::tempdir().unwrap();
    let config = LauncherConfig {
        index_roots: Some(Vec::new()),
        ..LauncherConfig::default()
    };

    let build = || {
        Launcher::new(Services::from_data_dir(
            data_dir.path(),
            &config,
            Arc::new(StaticCatalog::new(sample_apps())),
            Arc::new(RecordingShell::default()),
            Arc::new(NoIcons),
        ))
    };

    let first = build();
    first.execute("Firefox");
    first.clipboard().add("remember me");
    first.usage().flush().unwrap();
    first.clipboard().flush().unwrap();

    let second = build();
    assert_eq!(second.usage().score("Firefox"), 1);
    assert_eq!(second.search("cb")[0].title, "remember me");
    assert_eq!(second.search("")[0].title, "Firefox");
}
