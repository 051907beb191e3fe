//! Platform-specific settings location.
//!
//! - Linux: `~/.config/diapason/settings.toml`
//! - macOS: `~/Library/Application Support/diapason/settings.toml`
//! - Windows: `%APPDATA%\diapason\settings.toml`

use std::path::{Path, PathBuf};

use crate::ConfigError;

const APP_NAME: &str = "diapason";
const SETTINGS_FILE: &str = "settings.toml";

/// User configuration directory. Falls back to `./diapason` when the
/// platform directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default settings file.
pub fn default_settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Creates the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ConfigError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_path_shape() {
        let path = default_settings_path();
        assert!(path.ends_with("diapason/settings.toml"));
    }

    #[test]
    fn ensure_parent_creates_nested() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("a").join("b").join("settings.toml");
        ensure_parent_dir(&file).unwrap();
        assert!(file.parent().unwrap().is_dir());
        // bare file name has no parent to create
        ensure_parent_dir(Path::new("settings.toml")).unwrap();
    }
}
