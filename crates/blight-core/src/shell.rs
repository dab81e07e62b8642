//! Side effects the launcher asks the host operating system to perform.

use crate::catalog::AppEntry;
use crate::error::{Error, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

pub trait Shell: Send + Sync {
    /// Opens a file with its default handler.
    fn open_path(&self, path: &Path) -> Result<()>;
    /// Shows the file selected in the platform file manager.
    fn reveal_path(&self, path: &Path) -> Result<()>;
    fn launch(&self, app: &AppEntry) -> Result<()>;
    fn launch_elevated(&self, app: &AppEntry) -> Result<()>;
    fn copy_text(&self, text: &str) -> Result<()>;
    fn run_system_command(&self, id: &str) -> Result<()>;
}

/// [`Shell`] backed by the platform's own command line tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

fn command_failed(program: &str, reason: impl ToString) -> Error {
    Error::CommandFailed {
        program: program.to_string(),
        reason: reason.to_string(),
    }
}

/// Starts `program` without waiting for it.
fn spawn_detached<S: AsRef<std::ffi::OsStr>>(program: &str, args: &[S]) -> Result<()> {
    debug!(program, "Spawning detached process");
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(drop)
        .map_err(|e| command_failed(program, e))
}

/// Runs `program` to completion and fails on a non-zero exit.
fn run_to_completion(program: &str, args: &[&str]) -> Result<()> {
    debug!(program, ?args, "Running command");
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| command_failed(program, e))?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let reason = match stderr.trim() {
        "" => format!("exited with {}", output.status),
        message => message.to_string(),
    };
    Err(command_failed(program, reason))
}

fn pipe_to(program: &str, args: &[&str], input: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| command_failed(program, e))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .map_err(|e| command_failed(program, e))?;
    }

    let status = child.wait().map_err(|e| command_failed(program, e))?;
    if status.success() {
        Ok(())
    } else {
        Err(command_failed(program, format!("exited with {status}")))
    }
}

#[cfg(windows)]
impl Shell for SystemShell {
    fn open_path(&self, path: &Path) -> Result<()> {
        spawn_detached("explorer", &[path])
    }

    fn reveal_path(&self, path: &Path) -> Result<()> {
        spawn_detached("explorer", &[format!("/select,{}", path.display())])
    }

    fn launch(&self, app: &AppEntry) -> Result<()> {
        self.open_path(&app.launch_target)
    }

    fn launch_elevated(&self, app: &AppEntry) -> Result<()> {
        let script = format!(
            "Start-Process -FilePath '{}' -Verb RunAs",
            app.launch_target.display().to_string().replace('\'', "''")
        );
        spawn_detached("powershell", &["-NoProfile", "-Command", &script])
    }

    fn copy_text(&self, text: &str) -> Result<()> {
        pipe_to("clip", &[], text)
    }

    fn run_system_command(&self, id: &str) -> Result<()> {
        match id {
            "lock-screen" => run_to_completion("rundll32.exe", &["user32.dll,LockWorkStation"]),
            "sleep" => run_to_completion("rundll32.exe", &["powrprof.dll,SetSuspendState", "0,1,0"]),
            "shutdown" => run_to_completion("shutdown", &["/s", "/t", "0"]),
            "restart" => run_to_completion("shutdown", &["/r", "/t", "0"]),
            "recycle-bin" => run_to_completion(
                "powershell",
                &["-NoProfile", "-Command", "Clear-RecycleBin -Force -ErrorAction SilentlyContinue"],
            ),
            "logout" => run_to_completion("shutdown", &["/l"]),
            _ => Ok(()),
        }
    }
}

#[cfg(target_os = "macos")]
impl Shell for SystemShell {
    fn open_path(&self, path: &Path) -> Result<()> {
        spawn_detached("open", &[path])
    }

    fn reveal_path(&self, path: &Path) -> Result<()> {
        spawn_detached("open", &[Path::new("-R"), path])
    }

    fn launch(&self, app: &AppEntry) -> Result<()> {
        spawn_detached("open", &[&app.launch_target])
    }

    fn launch_elevated(&self, _app: &AppEntry) -> Result<()> {
        Err(Error::Unsupported("Running as administrator"))
    }

    fn copy_text(&self, text: &str) -> Result<()> {
        pipe_to("pbcopy", &[], text)
    }

    fn run_system_command(&self, id: &str) -> Result<()> {
        let osascript = |script: &str| run_to_completion("osascript", &["-e", script]);
        match id {
            "lock-screen" => run_to_completion("pmset", &["displaysleepnow"]),
            "sleep" => run_to_completion("pmset", &["sleepnow"]),
            "shutdown" => osascript("tell application \"System Events\" to shut down"),
            "restart" => osascript("tell application \"System Events\" to restart"),
            "recycle-bin" => osascript("tell application \"Finder\" to empty trash"),
            "logout" => osascript("tell application \"System Events\" to log out"),
            _ => Ok(()),
        }
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
impl Shell for SystemShell {
    fn open_path(&self, path: &Path) -> Result<()> {
        spawn_detached("xdg-open", &[path])
    }

    fn reveal_path(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;
        spawn_detached("xdg-open", &[parent])
    }

    fn launch(&self, app: &AppEntry) -> Result<()> {
        let program = app.launch_target.to_string_lossy();
        spawn_detached::<&str>(&program, &[])
    }

    fn launch_elevated(&self, app: &AppEntry) -> Result<()> {
        spawn_detached("pkexec", &[&app.launch_target])
    }

    fn copy_text(&self, text: &str) -> Result<()> {
        if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            pipe_to("wl-copy", &[], text)
        } else {
            pipe_to("xclip", &["-selection", "clipboard"], text)
        }
    }

    fn run_system_command(&self, id: &str) -> Result<()> {
        match id {
            "lock-screen" => run_to_completion("loginctl", &["lock-session"]),
            "sleep" => run_to_completion("systemctl", &["suspend"]),
            "shutdown" => run_to_completion("systemctl", &["poweroff"]),
            "restart" => run_to_completion("systemctl", &["reboot"]),
            "recycle-bin" => run_to_completion("gio", &["trash", "--empty"]),
            "logout" => run_to_completion("loginctl", &["terminate-user", &whoami()]),
            _ => Ok(()),
        }
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn whoami() -> String {
    std::env::var("USER").unwrap_or_default()
}
