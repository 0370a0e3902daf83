//! Plugin system
//!
//! A [`Plugin`] advertises a set of [`Feature`]s and gets a one-time
//! initialization callback. Plugins are held by a [`PluginRegistry`]; the
//! application initializes every supported plugin on `start` and shuts them
//! down on `stop`.
//!
//! Plugin configuration lives in a [`PluginPropertyBag`] loaded from
//! `<data-path>/plugins/{<plugin-uuid>}/config.toml`.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use appframe_core::prelude::*;
use appframe_core::PropertyBag;
use uuid::Uuid;

use crate::settings::write_file_atomic;

/// File name of a plugin's configuration inside its plugin directory.
pub const PLUGIN_CONFIG_FILENAME: &str = "config.toml";

/// A capability a plugin provides. Two features are equal when their ids are.
#[derive(Debug, Clone)]
pub struct Feature {
    pub id: Uuid,
    pub title: String,
}

impl Feature {
    pub fn new(id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Feature {}

impl Hash for Feature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.title, self.id.braced())
    }
}

/// Extension point loaded into an application.
///
/// Only `id` and `title` are required. `initialize` is called at most once
/// per registration, and only for plugins whose `is_supported` returns
/// `true`.
pub trait Plugin: fmt::Debug {
    fn id(&self) -> Uuid;

    fn title(&self) -> &str;

    fn provided_features(&self) -> Vec<Feature> {
        Vec::new()
    }

    /// Whether this plugin can run in the current environment.
    fn is_supported(&self) -> bool {
        true
    }

    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called during application shutdown for initialized plugins.
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Registered,
    Initialized,
    Failed,
}

/// Owned description of a registered plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginInfo {
    pub id: Uuid,
    pub title: String,
    pub features: Vec<Feature>,
    pub state: PluginState,
}

#[derive(Debug)]
struct PluginEntry {
    plugin: Box<dyn Plugin>,
    state: PluginState,
}

/// Registered plugins, in registration order, unique by id.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    entries: Vec<PluginEntry>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin. Returns `false` (and drops it) if a plugin with the
    /// same id is already registered.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> bool {
        let id = plugin.id();
        if self.contains(id) {
            warn!(
                "Plugin '{}' {} already registered, ignoring",
                plugin.title(),
                id.braced()
            );
            return false;
        }
        debug!("Registered plugin '{}' {}", plugin.title(), id.braced());
        self.entries.push(PluginEntry {
            plugin,
            state: PluginState::Registered,
        });
        true
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.iter().any(|e| e.plugin.id() == id)
    }

    pub fn get(&self, id: Uuid) -> Option<&dyn Plugin> {
        self.entries
            .iter()
            .find(|e| e.plugin.id() == id)
            .map(|e| e.plugin.as_ref())
    }

    pub fn state(&self, id: Uuid) -> Option<PluginState> {
        self.entries
            .iter()
            .find(|e| e.plugin.id() == id)
            .map(|e| e.state)
    }

    /// Every registered plugin, supported or not.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.entries.iter().map(|e| e.plugin.as_ref())
    }

    /// Plugins whose `is_supported` returns `true`.
    pub fn supported(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.iter().filter(|p| p.is_supported())
    }

    /// Snapshot of the supported plugins.
    pub fn supported_info(&self) -> Vec<PluginInfo> {
        self.entries
            .iter()
            .filter(|e| e.plugin.is_supported())
            .map(|e| PluginInfo {
                id: e.plugin.id(),
                title: e.plugin.title().to_string(),
                features: e.plugin.provided_features(),
                state: e.state,
            })
            .collect()
    }

    /// Supported plugins providing the feature with id `feature_id`.
    pub fn providing(&self, feature_id: Uuid) -> Vec<&dyn Plugin> {
        self.supported()
            .filter(|p| p.provided_features().iter().any(|f| f.id == feature_id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Initialize every supported plugin that has not been initialized yet.
    ///
    /// A plugin that fails is logged, marked [`PluginState::Failed`] and not
    /// retried. Returns the number of plugins initialized by this call.
    pub fn initialize_all(&mut self) -> usize {
        let mut count = 0;
        for entry in &mut self.entries {
            if entry.state != PluginState::Registered || !entry.plugin.is_supported() {
                continue;
            }
            match entry.plugin.initialize() {
                Ok(()) => {
                    entry.state = PluginState::Initialized;
                    count += 1;
                }
                Err(e) => {
                    let err = Error::plugin_init(entry.plugin.title(), e.to_string());
                    warn!("{}", err);
                    entry.state = PluginState::Failed;
                }
            }
        }
        if count > 0 {
            info!("Initialized {} plugin(s)", count);
        }
        count
    }

    /// Shut down initialized plugins in reverse registration order.
    ///
    /// Shut-down plugins return to [`PluginState::Registered`] so a restart
    /// initializes them again.
    pub fn shutdown_all(&mut self) {
        for entry in self.entries.iter_mut().rev() {
            if entry.state != PluginState::Initialized {
                continue;
            }
            if let Err(e) = entry.plugin.shutdown() {
                warn!("Plugin '{}' shutdown error: {}", entry.plugin.title(), e);
            }
            entry.state = PluginState::Registered;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugin configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Property bag holding one plugin's persisted configuration.
///
/// The file is a flat TOML table keyed by property UUID:
///
/// ```toml
/// "{8c7a2f5e-3b1d-4a8e-9c6f-0d2e4b6a8c1f}" = true
/// ```
#[derive(Debug)]
pub struct PluginPropertyBag {
    plugin_id: Uuid,
    bag: PropertyBag,
    loaded_from: Vec<PathBuf>,
}

impl PluginPropertyBag {
    pub fn new(plugin_id: Uuid) -> Self {
        Self {
            plugin_id,
            bag: PropertyBag::new(),
            loaded_from: Vec::new(),
        }
    }

    /// Directory holding the plugin's files under `data_path`.
    pub fn plugin_dir(data_path: &Path, plugin_id: Uuid) -> PathBuf {
        data_path
            .join("plugins")
            .join(plugin_id.braced().to_string())
    }

    pub fn config_path(data_path: &Path, plugin_id: Uuid) -> PathBuf {
        Self::plugin_dir(data_path, plugin_id).join(PLUGIN_CONFIG_FILENAME)
    }

    /// Build the bag from every `config.toml` found under `data_paths`.
    ///
    /// Later paths override earlier ones. Unreadable files and keys that are
    /// not UUIDs are skipped with a warning.
    pub fn load(plugin_id: Uuid, data_paths: &[PathBuf]) -> Self {
        let mut this = Self::new(plugin_id);
        for data_path in data_paths {
            let path = Self::config_path(data_path, plugin_id);
            if !path.exists() {
                continue;
            }
            match this.load_file(&path) {
                Ok(count) => {
                    debug!("Loaded {} plugin properties from {:?}", count, path);
                    this.loaded_from.push(path);
                }
                Err(e) => warn!("Failed to load plugin config {:?}: {}", path, e),
            }
        }
        this.bag.initialize();
        this
    }

    fn load_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        let table: toml::Table = toml::from_str(&content)?;
        let mut count = 0;
        for (key, value) in table {
            let Ok(id) = Uuid::parse_str(&key) else {
                warn!("Ignoring non-UUID plugin property key '{}' in {:?}", key, path);
                continue;
            };
            let json = serde_json::to_value(value)?;
            self.bag.set_value(id, json)?;
            count += 1;
        }
        Ok(count)
    }

    /// Write every stored value to `<data_path>/plugins/{id}/config.toml`.
    ///
    /// Values TOML cannot represent (such as `null`) are skipped.
    pub fn save(&self, data_path: &Path) -> Result<PathBuf> {
        let mut table = BTreeMap::new();
        for (id, value) in self.bag.all() {
            match toml::Value::try_from(&value) {
                Ok(v) => {
                    table.insert(id.braced().to_string(), v);
                }
                Err(e) => debug!("Skipping plugin property {}: {}", id, e),
            }
        }
        let content = toml::to_string_pretty(&table)?;
        let path = Self::config_path(data_path, self.plugin_id);
        write_file_atomic(&path, &content)?;
        info!("Saved plugin config to {:?}", path);
        Ok(path)
    }

    pub fn plugin_id(&self) -> Uuid {
        self.plugin_id
    }

    pub fn bag(&self) -> &PropertyBag {
        &self.bag
    }

    pub fn bag_mut(&mut self) -> &mut PropertyBag {
        &mut self.bag
    }

    /// Config files that contributed values.
    pub fn loaded_from(&self) -> &[PathBuf] {
        &self.loaded_from
    }
}
