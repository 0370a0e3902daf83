//! File-backed settings provider
//!
//! Values are stored by setting id in a TOML file:
//!
//! ```toml
//! [values]
//! "8c7a2f5e-3b1d-4a8e-9c6f-0d2e4b6a8c1f" = true
//!
//! [scoped."a550229d-05e1-4a93-96a6-98ae1c69b847"]
//! "8c7a2f5e-3b1d-4a8e-9c6f-0d2e4b6a8c1f" = false
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use appframe_core::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::group::SettingsGroup;
use super::provider::{SettingsProvider, StoredValue};
use super::setting::{visit_leaves, visit_leaves_mut};
use super::write_file_atomic;

/// Default file name inside an application's config directory.
pub const SETTINGS_FILENAME: &str = "settings.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    values: BTreeMap<String, toml::Value>,
    #[serde(default)]
    scoped: BTreeMap<String, BTreeMap<String, toml::Value>>,
}

#[derive(Debug)]
pub struct TomlSettingsProvider {
    id: Uuid,
    path: PathBuf,
    groups: Vec<SettingsGroup>,
}

impl TomlSettingsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
            groups: Vec::new(),
        }
    }

    /// Provider for `<config_dir>/settings.toml`.
    pub fn in_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join(SETTINGS_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored values. A missing file holds no values.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be read, or a recoverable
    /// [`Error::Settings`] if it is not a valid settings file.
    fn read_file(&self) -> Result<HashMap<Uuid, StoredValue>> {
        if !self.path.exists() {
            debug!("No settings file at {:?}, using defaults", self.path);
            return Ok(HashMap::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings file {:?}", self.path))?;
        let file: SettingsFile = toml::from_str(&content).map_err(|e| {
            Error::settings(format!("{:?} is not a settings file: {}", self.path, e))
        })?;

        let mut stored: HashMap<Uuid, StoredValue> = HashMap::new();
        for (key, value) in file.values {
            if let Some((id, value)) = convert_entry(&key, value) {
                stored.entry(id).or_default().value = Some(value);
            }
        }
        for (scope_key, entries) in file.scoped {
            let Ok(scope) = Uuid::parse_str(&scope_key) else {
                warn!("Ignoring settings scope with invalid id '{}'", scope_key);
                continue;
            };
            for (key, value) in entries {
                if let Some((id, value)) = convert_entry(&key, value) {
                    stored.entry(id).or_default().scoped.insert(scope, value);
                }
            }
        }
        Ok(stored)
    }
}

fn convert_entry(key: &str, value: toml::Value) -> Option<(Uuid, Value)> {
    let Ok(id) = Uuid::parse_str(key) else {
        warn!("Ignoring setting with invalid id '{}'", key);
        return None;
    };
    match serde_json::to_value(value) {
        Ok(json) => Some((id, json)),
        Err(e) => {
            warn!("Ignoring setting {}: {}", id, e);
            None
        }
    }
}

/// `None` for values TOML cannot hold, such as null.
fn to_toml(value: &Value) -> Option<toml::Value> {
    if value.is_null() {
        return None;
    }
    toml::Value::try_from(value).ok()
}

impl SettingsProvider for TomlSettingsProvider {
    fn id(&self) -> Uuid {
        self.id
    }

    fn groups(&self) -> &[SettingsGroup] {
        &self.groups
    }

    fn groups_mut(&mut self) -> &mut Vec<SettingsGroup> {
        &mut self.groups
    }

    fn load_settings(&mut self) -> Result<()> {
        let stored = match self.read_file() {
            Ok(stored) => stored,
            Err(e) if e.is_recoverable() => {
                warn!("{}, using defaults", e);
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        let mut applied = 0;
        for group in &mut self.groups {
            visit_leaves_mut(group.settings_mut(), &mut |setting| {
                if let Some(values) = stored.get(&setting.id) {
                    values.apply(setting);
                    applied += 1;
                }
            });
        }
        debug!("Applied {} stored settings from {:?}", applied, self.path);
        Ok(())
    }

    fn save_settings(&mut self) -> Result<()> {
        let mut file = SettingsFile::default();
        for group in &self.groups {
            visit_leaves(group.settings(), &mut |setting| {
                if setting.id.is_nil() {
                    return;
                }
                let key = setting.id.to_string();
                if let Some(value) = to_toml(setting.value(None)) {
                    file.values.insert(key.clone(), value);
                }
                for (scope, value) in setting.scoped_values() {
                    if let Some(value) = to_toml(value) {
                        file.scoped
                            .entry(scope.to_string())
                            .or_default()
                            .insert(key.clone(), value);
                    }
                }
            });
        }

        let content = toml::to_string_pretty(&file)?;
        write_file_atomic(&self.path, &content)?;
        info!("Saved settings to {:?}", self.path);
        Ok(())
    }
}
