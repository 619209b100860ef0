use std::path::PathBuf;

use crate::{Error, Result};

/// Environment variable overriding the config root.
pub const CONFIG_ROOT_ENV: &str = "AGSYNC_PATH";

/// Resolve the config root directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. AGSYNC_PATH environment variable (with tilde expansion)
/// 3. System config directory (recommended default)
/// 4. ~/.agsync (fallback for systems without a standard config directory)
pub fn resolve_config_root(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ROOT_ENV)
        && !env_path.is_empty()
    {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("agsync"));
    }

    if let Some(home) = home_dir() {
        return Ok(home.join(".agsync"));
    }

    Err(Error::Config(
        "Could not determine config root: no HOME directory or system config directory found"
            .to_string(),
    ))
}

/// Root used by releases that kept everything in a dot-directory under HOME.
pub fn legacy_root() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".agsync"))
}

/// Home directory, honouring `HOME` first so tests can sandbox it.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~"
        && let Some(home) = home_dir()
    {
        return home;
    }
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}
