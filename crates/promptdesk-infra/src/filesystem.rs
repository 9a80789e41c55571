//! Data directory layout for promptdesk.

use std::path::PathBuf;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `PROMPTDESK_DATA_DIR` environment variable
/// 2. `~/.promptdesk`
/// 3. `./.promptdesk`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PROMPTDESK_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".promptdesk");
    }

    // Last resort: current directory
    PathBuf::from(".promptdesk")
}
