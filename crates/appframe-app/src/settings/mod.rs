//! Settings model and providers
//!
//! - [`Setting`] - one value with kind-specific rules and per-scope overrides
//! - [`SettingsGroup`] - settings shown at one `:`-separated path
//! - [`SettingsProvider`] - loads and saves the values of its groups
//! - [`MemorySettingsProvider`] / [`TomlSettingsProvider`] - concrete providers

mod group;
mod provider;
mod setting;
mod toml_provider;

use std::path::Path;

use appframe_core::prelude::*;

pub use group::{SettingsGroup, DEFAULT_PRIORITY};
pub use provider::{MemorySettingsProvider, SettingsProfile, SettingsProvider};
pub use setting::{ChoiceValue, FileSettingMode, Setting, SettingKind};
pub use toml_provider::{TomlSettingsProvider, SETTINGS_FILENAME};

/// Write `content` to `path` through a temp file and a rename, creating the
/// parent directory if needed.
pub(crate) fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::config(format!("{:?} has no parent directory", path)))?;

    if !dir.as_os_str().is_empty() && !dir.exists() {
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::config(format!("Failed to create {:?}: {}", dir, e)))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| Error::config(format!("{:?} has no file name", path)))?;
    let temp_path = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));

    std::fs::write(&temp_path, content)
        .map_err(|e| Error::config(format!("Failed to write temp file: {}", e)))?;

    std::fs::rename(&temp_path, path)
        .map_err(|e| Error::config(format!("Failed to rename temp file: {}", e)))?;

    Ok(())
}
