use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Base switchman config directory (universal ~/.config/switchman/ on all platforms)
pub fn switchman() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("switchman"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("switchman"))
    }
}

/// Agent catalog file path
pub fn catalog_json() -> Result<PathBuf> {
    Ok(switchman()?.join("agents.json"))
}

/// Directory holding the sync/connect scripts invoked by routed triggers
pub fn scripts() -> Result<PathBuf> {
    Ok(switchman()?.join("scripts"))
}

/// Projects root handed to the github-sync script.
///
/// Resolution order: PROJECTS_DIR env var (tilde-expanded), then ~/projects.
pub fn projects_dir() -> Result<PathBuf> {
    if let Ok(dir) = env::var("PROJECTS_DIR") {
        if !dir.trim().is_empty() {
            let expanded = shellexpand::tilde(&dir);
            return Ok(PathBuf::from(expanded.as_ref()));
        }
    }

    let home = env::var("HOME")
        .map_err(|_| Error::internal_unexpected("HOME environment variable not set".to_string()))?;
    Ok(PathBuf::from(home).join("projects"))
}
