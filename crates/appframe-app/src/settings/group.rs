//! Settings groups: a path in the settings tree plus the settings shown there

use std::cmp::Ordering;
use std::fmt;

use uuid::Uuid;

use super::setting::{find_by_id_in, find_in, find_in_mut, Setting};

/// Priority of a group that has not been given one.
pub const DEFAULT_PRIORITY: i32 = -1;

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsGroup {
    pub id: Uuid,
    path: Vec<String>,
    settings: Vec<Setting>,
    /// Higher priorities sort first
    pub priority: i32,
}

impl SettingsGroup {
    /// Create a group at a `:`-separated path such as `"Editor:Tabs"`.
    pub fn new(path: &str, settings: impl IntoIterator<Item = Setting>) -> Self {
        let segments = if path.is_empty() {
            Vec::new()
        } else {
            path.split(':').map(str::to_string).collect()
        };
        Self::from_segments(segments, settings)
    }

    pub fn from_segments(
        path: Vec<String>,
        settings: impl IntoIterator<Item = Setting>,
    ) -> Self {
        Self {
            id: Uuid::nil(),
            path,
            settings: settings.into_iter().collect(),
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Last path segment.
    pub fn title(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Vec<Setting> {
        &mut self.settings
    }

    pub fn add(&mut self, setting: Setting) {
        self.settings.push(setting);
    }

    /// Depth-first search by name, descending into group settings.
    pub fn find_setting(&self, name: &str) -> Option<&Setting> {
        find_in(&self.settings, name)
    }

    pub fn find_setting_mut(&mut self, name: &str) -> Option<&mut Setting> {
        find_in_mut(&mut self.settings, name)
    }

    pub fn find_setting_by_id(&self, id: Uuid) -> Option<&Setting> {
        find_by_id_in(&self.settings, id)
    }

    /// Settings in this group, including the contents of nested groups.
    pub fn count(&self) -> usize {
        self.settings.len() + self.settings.iter().map(Setting::count).sum::<usize>()
    }

    /// Display ordering: higher priority first, then by path.
    pub fn compare(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl fmt::Display for SettingsGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_split() {
        let group = SettingsGroup::new("Editor:Tabs", Vec::new());
        assert_eq!(group.path(), &["Editor".to_string(), "Tabs".to_string()]);
        assert_eq!(group.title(), Some("Tabs"));
        assert_eq!(group.to_string(), "Editor:Tabs");

        let root = SettingsGroup::new("", Vec::new());
        assert!(root.path().is_empty());
        assert_eq!(root.title(), None);
    }

    #[test]
    fn test_ordering_priority_then_path() {
        let mut groups = vec![
            SettingsGroup::new("General:Fonts", Vec::new()),
            SettingsGroup::new("Editor", Vec::new()),
            SettingsGroup::new("Plugins", Vec::new()).with_priority(10),
            SettingsGroup::new("General", Vec::new()),
        ];
        groups.sort_by(SettingsGroup::compare);

        let order: Vec<String> = groups.iter().map(|g| g.to_string()).collect();
        assert_eq!(order, vec!["Plugins", "Editor", "General", "General:Fonts"]);
    }

    #[test]
    fn test_find_and_count_nested() {
        let mut group = SettingsGroup::new(
            "Editor",
            vec![
                Setting::boolean("WordWrap", "Word wrap", false),
                Setting::group(
                    "Tabs",
                    "Tabs",
                    vec![Setting::boolean("UseSpaces", "Use spaces", true)],
                ),
            ],
        );
        assert_eq!(group.count(), 3);

        group
            .find_setting_mut("UseSpaces")
            .unwrap()
            .set_value(false, None)
            .unwrap();
        assert!(!group.find_setting("UseSpaces").unwrap().get_as(true, None));
    }
}
