//! Settings provider trait and the in-memory provider

use std::collections::HashMap;
use std::fmt;

use appframe_core::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use super::group::SettingsGroup;
use super::setting::{visit_leaves, visit_leaves_mut, Setting};

/// Well-known scopes for scoped setting values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsProfile {
    pub id: Uuid,
    pub title: String,
}

impl SettingsProfile {
    pub const ALL_USERS_ID: Uuid = Uuid::from_u128(0x6c1e84c6_7cb8_4798_b000_349dba816114);
    pub const THIS_USER_ID: Uuid = Uuid::from_u128(0xa550229d_05e1_4a93_96a6_98ae1c69b847);

    pub fn all_users() -> Self {
        Self {
            id: Self::ALL_USERS_ID,
            title: "All users".to_string(),
        }
    }

    pub fn this_user() -> Self {
        Self {
            id: Self::THIS_USER_ID,
            title: "This user".to_string(),
        }
    }
}

/// Source of settings groups that can load and persist their values.
///
/// Implementors supply storage for the groups and the load/save behavior;
/// lookups are provided.
pub trait SettingsProvider: fmt::Debug {
    fn id(&self) -> Uuid;

    fn groups(&self) -> &[SettingsGroup];

    fn groups_mut(&mut self) -> &mut Vec<SettingsGroup>;

    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn load_settings(&mut self) -> Result<()> {
        Ok(())
    }

    fn save_settings(&mut self) -> Result<()> {
        Ok(())
    }

    fn add_group(&mut self, group: SettingsGroup) {
        self.groups_mut().push(group);
    }

    fn find_setting(&self, name: &str) -> Option<&Setting> {
        self.groups().iter().find_map(|g| g.find_setting(name))
    }

    fn find_setting_mut(&mut self, name: &str) -> Option<&mut Setting> {
        self.groups_mut()
            .iter_mut()
            .find_map(|g| g.find_setting_mut(name))
    }

    fn find_setting_by_id(&self, id: Uuid) -> Option<&Setting> {
        self.groups().iter().find_map(|g| g.find_setting_by_id(id))
    }

    /// Total settings across all groups, nested ones included.
    fn count(&self) -> usize {
        self.groups().iter().map(SettingsGroup::count).sum()
    }

    /// Groups in display order.
    fn sorted_groups(&self) -> Vec<&SettingsGroup> {
        let mut groups: Vec<&SettingsGroup> = self.groups().iter().collect();
        groups.sort_by(|a, b| a.compare(b));
        groups
    }
}

/// Stored values of one setting: the unscoped value plus each scoped value.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StoredValue {
    pub value: Option<Value>,
    pub scoped: HashMap<Uuid, Value>,
}

impl StoredValue {
    pub(crate) fn capture(setting: &Setting) -> Self {
        Self {
            value: Some(setting.value(None).clone()),
            scoped: setting.scoped_values().clone(),
        }
    }

    /// Write the stored values back into `setting`, logging rejected ones.
    pub(crate) fn apply(&self, setting: &mut Setting) {
        if let Some(value) = &self.value {
            if let Err(e) = setting.set_value(value.clone(), None) {
                warn!("Keeping current value: {}", e);
            }
        }
        for (scope, value) in &self.scoped {
            if let Err(e) = setting.set_value(value.clone(), Some(*scope)) {
                warn!("Keeping current value for scope {}: {}", scope, e);
            }
        }
    }
}

/// Keeps saved values in memory. Loading restores the last saved values.
#[derive(Debug, Default)]
pub struct MemorySettingsProvider {
    id: Uuid,
    groups: Vec<SettingsGroup>,
    values: HashMap<Uuid, StoredValue>,
}

impl MemorySettingsProvider {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn stored_count(&self) -> usize {
        self.values.len()
    }
}

impl SettingsProvider for MemorySettingsProvider {
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
        let values = &self.values;
        for group in &mut self.groups {
            visit_leaves_mut(group.settings_mut(), &mut |setting| {
                if let Some(stored) = values.get(&setting.id) {
                    stored.apply(setting);
                }
            });
        }
        Ok(())
    }

    fn save_settings(&mut self) -> Result<()> {
        let mut saved = 0;
        for group in &self.groups {
            visit_leaves(group.settings(), &mut |setting| {
                if setting.id.is_nil() {
                    trace!("Not saving setting '{}' without an id", setting.name);
                    return;
                }
                self.values.insert(setting.id, StoredValue::capture(setting));
                saved += 1;
            });
        }
        debug!("Saved {} settings in memory", saved);
        Ok(())
    }
}
