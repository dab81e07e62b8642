//! # blight CLI
//!
//! Drives the launcher engine from a terminal. Every command prints JSON so
//! the output can be piped into other tools.
//!
//! - `blight search <query>` - ranked results for a query
//! - `blight exec <id>` - run a result by id
//! - `blight actions <id>` / `blight action <id> <action>` - context menu
//! - `blight index` - scan the file index and stream progress
//! - `blight status` - data directory, config and index state

use blight_core::{
    IndexState, Launcher, LauncherConfig, NoIcons, PathCatalog, Services, SystemShell, config,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "blight")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Quick launcher search engine")]
struct Cli {
    /// Where usage, clipboard history, config and logs live (default ~/.blight)
    #[arg(long, global = true, env = "BLIGHT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `blight_core=trace`
    #[arg(long, global = true, env = "BLIGHT_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print ranked results for a query
    Search {
        query: String,

        /// Scan the file index first so file results are included
        #[arg(long)]
        files: bool,

        /// Give up waiting for the scan after this many seconds
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },

    /// Execute a result by id
    Exec { id: String },

    /// List context actions for a result id
    Actions { id: String },

    /// Run a context action for a result id
    Action { id: String, action: String },

    /// Scan the file index and print every status update
    Index {
        #[arg(long, default_value_t = 600)]
        timeout: u64,
    },

    /// Show the data directory, config and index status
    Status,

    /// Finish first-run setup and store the hotkey
    Setup {
        #[arg(long, default_value = config::DEFAULT_HOTKEY)]
        hotkey: String,
    },
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> blight_core::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(blight_core::Error::Serialize)?;
    println!("{json}");
    Ok(())
}

fn flush_state(launcher: &Launcher) {
    if let Err(e) = launcher.usage().flush() {
        tracing::error!(error = %e, "Failed to save usage");
    }
    if let Err(e) = launcher.clipboard().flush() {
        tracing::error!(error = %e, "Failed to save clipboard history");
    }
}

fn wait_for_scan(launcher: &Launcher, timeout: Duration) -> bool {
    launcher.start();
    let ready = launcher.files().wait_until_ready(timeout);
    if !ready {
        tracing::warn!(?timeout, "File index not ready in time");
    }
    ready
}

fn main() -> blight_core::Result<()> {
    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => config::default_data_dir()?,
    };
    let mut launcher_config = LauncherConfig::load(&data_dir);

    let log_level = cli
        .log_level
        .clone()
        .or_else(|| launcher_config.log_level.clone());
    let log_path = config::log_path(&data_dir);
    if let Err(e) = blight_core::log::init_tracing(&log_path.to_string_lossy(), log_level.as_deref())
    {
        eprintln!("Failed to initialize logging: {e}");
    }
    blight_core::log::install_panic_hook();

    let launcher = Launcher::new(Services::from_data_dir(
        &data_dir,
        &launcher_config,
        Arc::new(PathCatalog::from_env()),
        Arc::new(SystemShell),
        Arc::new(NoIcons),
    ));

    match cli.command {
        Commands::Search {
            query,
            files,
            timeout,
        } => {
            if files {
                wait_for_scan(&launcher, Duration::from_secs(timeout));
            }
            print_json(&launcher.search(&query))?;
        }
        Commands::Exec { id } => {
            let outcome = launcher.execute(&id);
            flush_state(&launcher);
            print_json(&outcome)?;
        }
        Commands::Actions { id } => {
            print_json(&launcher.get_context_actions(&id))?;
        }
        Commands::Action { id, action } => {
            let outcome = launcher.execute_context_action(&id, &action);
            flush_state(&launcher);
            print_json(&outcome)?;
        }
        Commands::Index { timeout } => {
            let events = launcher.files().subscribe();
            let started = Instant::now();
            let deadline = Duration::from_secs(timeout);
            launcher.start();

            while let Some(remaining) = deadline.checked_sub(started.elapsed()) {
                let Ok(status) = events.recv_timeout(remaining) else {
                    break;
                };
                println!(
                    "{}",
                    serde_json::to_string(&status).map_err(blight_core::Error::Serialize)?
                );
                if status.state == IndexState::Ready {
                    break;
                }
            }
        }
        Commands::Status => {
            let status = launcher.get_index_status();
            print_json(&serde_json::json!({
                "dataDir": data_dir,
                "config": launcher_config,
                "index": status,
                "indexRoots": launcher.files().roots(),
                "usageEntries": launcher.usage().len(),
                "clipboardEntries": launcher.clipboard().len(),
            }))?;
        }
        Commands::Setup { hotkey } => {
            launcher_config.complete_onboarding(&hotkey);
            launcher_config.save(&data_dir)?;
            print_json(&launcher_config)?;
        }
    }

    Ok(())
}
