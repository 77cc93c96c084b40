//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "bookshelf";
const APPLICATION: &str = "bookshelf";

/// Number of archived log files kept next to `latest.log`.
const MAX_OLD_LOGS: usize = 10;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Directory holding the session database.
///
/// - Linux: `$XDG_DATA_HOME/bookshelf` or `~/.local/share/bookshelf`
/// - macOS: `~/Library/Application Support/org.bookshelf.bookshelf`
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Directory holding log files.
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Default path of the session database.
pub fn session_db() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("session.db"))
}

/// Path of the log file for the current run.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("latest.log"))
}

/// Archives the previous `latest.log` under a timestamped name and prunes
/// the oldest archives.
pub fn rotate_logs() {
    let Some(cache) = cache_dir() else { return };
    let latest = cache.join("latest.log");

    if latest.exists() {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let _ = fs::rename(&latest, cache.join(format!("{}.log", stamp)));
    }

    prune_logs(&cache, MAX_OLD_LOGS);
}

fn prune_logs(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else { return };

    let mut archived: Vec<_> = entries
        .filter_map(Result::ok)
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != "latest.log"
        })
        .collect();

    if archived.len() <= keep {
        return;
    }

    // oldest first
    archived.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());
    for entry in &archived[..archived.len() - keep] {
        let _ = fs::remove_file(entry.path());
    }
}
