//! XDG-compliant log directory management
//!
//! Logs are stored in `$XDG_STATE_HOME/waitplay/logs/` (typically
//! `~/.local/state/waitplay/logs/`). Each instance writes a PID-based log file
//! so concurrent runs never share one.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Cached log directory path
static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Get the base log directory, creating it if necessary.
///
/// Falls back to `~/.local/state/waitplay/logs/` if XDG_STATE_HOME is not set,
/// and to the system temp directory as a last resort.
pub fn log_dir() -> &'static PathBuf {
    LOG_DIR.get_or_init(|| {
        let dir =
            get_xdg_log_dir().unwrap_or_else(|| std::env::temp_dir().join("waitplay-logs"));

        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!("Failed to create log directory {:?}: {}", dir, e);
            return std::env::temp_dir().join("waitplay-logs");
        }

        dir
    })
}

fn get_xdg_log_dir() -> Option<PathBuf> {
    xdg_log_dir_from(
        std::env::var("XDG_STATE_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

/// Resolve the log directory from the relevant environment values.
fn xdg_log_dir_from(state_home: Option<String>, home: Option<String>) -> Option<PathBuf> {
    if let Some(state_home) = state_home {
        let path = PathBuf::from(state_home);
        // Relative values are invalid per the XDG spec and ignored
        if path.is_absolute() {
            return Some(path.join("waitplay").join("logs"));
        }
    }

    home.filter(|h| !h.is_empty()).map(|home| {
        PathBuf::from(home)
            .join(".local")
            .join("state")
            .join("waitplay")
            .join("logs")
    })
}

/// Path for this process's main log file: `{log_dir}/waitplay-{PID}.log`
pub fn main_log_path() -> PathBuf {
    log_dir().join(format!("waitplay-{}.log", std::process::id()))
}
