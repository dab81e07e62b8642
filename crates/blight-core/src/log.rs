use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// Dropping the guard stops the background writer, so it lives for the process.
static LOG_GUARD: OnceCell<Mutex<WorkerGuard>> = OnceCell::new();

const DEFAULT_LOG_LEVEL: &str = "info";

/// Sends all `tracing` output to `log_file_path` through a non-blocking
/// writer. `log_level` accepts anything `EnvFilter` does (`debug`,
/// `blight_core=trace`, ...) and falls back to `info` when it can't be parsed.
///
/// Returns the path of the log file. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(log_file_path: &str, log_level: Option<&str>) -> Result<String> {
    let path = Path::new(log_file_path);
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(dir).map_err(|source| Error::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let level = log_level.unwrap_or(DEFAULT_LOG_LEVEL);
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::TracingInit(e.to_string()))?;

    // only the first successful init reaches this point
    let _ = LOG_GUARD.set(Mutex::new(guard));

    tracing::info!(log_level = level, "Logging initialized");
    Ok(path.display().to_string())
}

/// Chains a hook that records panics through `tracing` before the default
/// hook prints them.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        let thread = std::thread::current();

        tracing::error!(
            thread = thread.name().unwrap_or("<unnamed>"),
            %location,
            "Panic: {payload}"
        );
        default_hook(info);
    }));
}
