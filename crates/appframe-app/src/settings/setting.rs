//! A single configurable setting and its value rules

use std::collections::HashMap;

use appframe_core::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FileSettingMode {
    #[default]
    Open,
    Save,
    SelectFolder,
    CreateFolder,
}

/// One entry of a choice setting's list.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceValue {
    pub name: String,
    pub title: String,
    pub value: Value,
}

impl ChoiceValue {
    pub fn new(name: impl Into<String>, title: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            value: value.into(),
        }
    }

    /// A choice whose name and title are the value's display text.
    pub fn from_value(value: impl Into<Value>) -> Self {
        let value = value.into();
        let text = display_text(&value);
        Self {
            name: text.clone(),
            title: text,
            value,
        }
    }

    fn matches(&self, candidate: &Value) -> bool {
        self.value == *candidate || candidate.as_str() == Some(self.name.as_str())
    }
}

/// What kind of value a setting holds, with the kind's constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingKind {
    Boolean,
    Text {
        max_length: Option<usize>,
    },
    File {
        mode: FileSettingMode,
        require_existing: bool,
        filter: Option<String>,
    },
    /// Numeric value clamped to `[min, max]`
    Range {
        min: Option<f64>,
        max: Option<f64>,
    },
    Choice {
        values: Vec<ChoiceValue>,
        require_from_list: bool,
        multiple: bool,
    },
    /// Button that executes a command
    Command {
        command_id: String,
    },
    /// Dotted version string with at most `component_count` parts
    Version {
        component_count: usize,
    },
    /// Nested settings
    Group {
        options: Vec<Setting>,
    },
    /// Rendered by a UI-specific control
    Custom {
        control_type: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    /// Settings with a nil id are not persisted by providers
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub description: String,
    pub enabled: bool,
    pub visible: bool,
    pub required: bool,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    default_value: Value,
    value: Value,
    scoped_values: HashMap<Uuid, Value>,
    kind: SettingKind,
}

impl Setting {
    fn with_kind(
        name: impl Into<String>,
        title: impl Into<String>,
        default_value: Value,
        kind: SettingKind,
    ) -> Self {
        Self {
            id: Uuid::nil(),
            name: name.into(),
            title: title.into(),
            description: String::new(),
            enabled: true,
            visible: true,
            required: false,
            prefix: None,
            suffix: None,
            value: default_value.clone(),
            default_value,
            scoped_values: HashMap::new(),
            kind,
        }
    }

    pub fn boolean(name: impl Into<String>, title: impl Into<String>, default: bool) -> Self {
        Self::with_kind(name, title, Value::Bool(default), SettingKind::Boolean)
    }

    pub fn text(name: impl Into<String>, title: impl Into<String>, default: &str) -> Self {
        Self::with_kind(
            name,
            title,
            Value::from(default),
            SettingKind::Text { max_length: None },
        )
    }

    pub fn file(name: impl Into<String>, title: impl Into<String>, mode: FileSettingMode) -> Self {
        Self::with_kind(
            name,
            title,
            Value::from(""),
            SettingKind::File {
                mode,
                require_existing: matches!(mode, FileSettingMode::Open),
                filter: None,
            },
        )
    }

    pub fn range(
        name: impl Into<String>,
        title: impl Into<String>,
        default: f64,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        Self::with_kind(
            name,
            title,
            Value::from(default),
            SettingKind::Range { min, max },
        )
    }

    pub fn choice(
        name: impl Into<String>,
        title: impl Into<String>,
        default: impl Into<Value>,
        values: impl IntoIterator<Item = ChoiceValue>,
    ) -> Self {
        Self::with_kind(
            name,
            title,
            default.into(),
            SettingKind::Choice {
                values: values.into_iter().collect(),
                require_from_list: true,
                multiple: false,
            },
        )
    }

    pub fn command(
        name: impl Into<String>,
        title: impl Into<String>,
        command_id: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            title,
            Value::Null,
            SettingKind::Command {
                command_id: command_id.into(),
            },
        )
    }

    pub fn version(
        name: impl Into<String>,
        title: impl Into<String>,
        default: Option<&str>,
        component_count: usize,
    ) -> Self {
        Self::with_kind(
            name,
            title,
            default.map_or(Value::Null, Value::from),
            SettingKind::Version { component_count },
        )
    }

    pub fn group(
        name: impl Into<String>,
        title: impl Into<String>,
        options: impl IntoIterator<Item = Setting>,
    ) -> Self {
        Self::with_kind(
            name,
            title,
            Value::Null,
            SettingKind::Group {
                options: options.into_iter().collect(),
            },
        )
    }

    pub fn custom(
        name: impl Into<String>,
        title: impl Into<String>,
        control_type: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            title,
            Value::Null,
            SettingKind::Custom {
                control_type: control_type.into(),
            },
        )
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Limit a text or file setting's length.
    pub fn with_max_length(mut self, max: usize) -> Self {
        if let SettingKind::Text { max_length } = &mut self.kind {
            *max_length = Some(max);
        }
        self
    }

    /// Allow several choices, stored as an array.
    pub fn with_multiple(mut self, allow: bool) -> Self {
        if let SettingKind::Choice { multiple, .. } = &mut self.kind {
            *multiple = allow;
        }
        self
    }

    /// Accept choice values that are not in the list.
    pub fn with_free_choice(mut self) -> Self {
        if let SettingKind::Choice {
            require_from_list, ..
        } = &mut self.kind
        {
            *require_from_list = false;
        }
        self
    }

    pub fn kind(&self) -> &SettingKind {
        &self.kind
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, SettingKind::Group { .. })
    }

    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    /// Value for `scope`, falling back to the unscoped value.
    pub fn value(&self, scope: Option<Uuid>) -> &Value {
        scope
            .and_then(|id| self.scoped_values.get(&id))
            .unwrap_or(&self.value)
    }

    /// Typed read. A string that does not convert directly is parsed as
    /// JSON before giving up and returning `default`.
    pub fn get_as<T: DeserializeOwned>(&self, default: T, scope: Option<Uuid>) -> T {
        let value = self.value(scope);
        if let Ok(v) = serde_json::from_value(value.clone()) {
            return v;
        }
        value
            .as_str()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or(default)
    }

    pub fn scoped_values(&self) -> &HashMap<Uuid, Value> {
        &self.scoped_values
    }

    /// Store a value, normalized for this setting's kind.
    ///
    /// Booleans accept anything and store `true` only for a case-insensitive
    /// "true". Ranges clamp. Text, choice and version settings reject values
    /// that break their constraints.
    pub fn set_value(&mut self, value: impl Into<Value>, scope: Option<Uuid>) -> Result<()> {
        let value = self.normalize(value.into())?;
        match scope {
            Some(id) => {
                self.scoped_values.insert(id, value);
            }
            None => self.value = value,
        }
        Ok(())
    }

    /// Restore the default and drop every scoped value.
    pub fn reset(&mut self) {
        self.value = self.default_value.clone();
        self.scoped_values.clear();
    }

    /// Nested settings of a group setting.
    pub fn options(&self) -> &[Setting] {
        match &self.kind {
            SettingKind::Group { options } => options,
            _ => &[],
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut Vec<Setting>> {
        match &mut self.kind {
            SettingKind::Group { options } => Some(options),
            _ => None,
        }
    }

    /// Number of nested settings, counting nested groups' contents too.
    pub fn count(&self) -> usize {
        let options = self.options();
        options.len() + options.iter().map(Setting::count).sum::<usize>()
    }

    /// Depth-first search of a group's options by name.
    pub fn find_setting(&self, name: &str) -> Option<&Setting> {
        find_in(self.options(), name)
    }

    pub fn find_setting_by_id(&self, id: Uuid) -> Option<&Setting> {
        find_by_id_in(self.options(), id)
    }

    fn normalize(&self, value: Value) -> Result<Value> {
        match &self.kind {
            SettingKind::Boolean => Ok(Value::Bool(
                display_text(&value).eq_ignore_ascii_case("true"),
            )),
            SettingKind::Text { max_length } => {
                let text = display_text(&value);
                if let Some(max) = max_length {
                    if text.chars().count() > *max {
                        return Err(Error::setting_value(
                            &self.name,
                            format!("longer than {} characters", max),
                        ));
                    }
                }
                Ok(Value::String(text))
            }
            SettingKind::File { .. } => Ok(Value::String(display_text(&value))),
            SettingKind::Range { min, max } => {
                let number = match &value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                }
                .ok_or_else(|| Error::setting_value(&self.name, "not a number"))?;
                let mut clamped = number;
                if let Some(min) = min {
                    clamped = clamped.max(*min);
                }
                if let Some(max) = max {
                    clamped = clamped.min(*max);
                }
                Ok(Value::from(clamped))
            }
            SettingKind::Choice {
                values,
                require_from_list,
                multiple,
            } => {
                let resolve = |candidate: Value| -> Result<Value> {
                    if let Some(choice) = values.iter().find(|c| c.matches(&candidate)) {
                        return Ok(choice.value.clone());
                    }
                    if *require_from_list {
                        return Err(Error::setting_value(
                            &self.name,
                            format!("'{}' is not one of the choices", display_text(&candidate)),
                        ));
                    }
                    Ok(candidate)
                };
                match value {
                    Value::Array(items) if *multiple => items
                        .into_iter()
                        .map(resolve)
                        .collect::<Result<Vec<_>>>()
                        .map(Value::Array),
                    Value::Null => Ok(Value::Null),
                    other if *multiple => Ok(Value::Array(vec![resolve(other)?])),
                    other => resolve(other),
                }
            }
            SettingKind::Version { component_count } => {
                if value.is_null() {
                    return Ok(Value::Null);
                }
                let text = display_text(&value);
                let parts: Vec<&str> = text.trim().split('.').collect();
                let valid = !parts.is_empty()
                    && parts.len() <= *component_count
                    && parts.iter().all(|p| p.parse::<u32>().is_ok());
                if !valid {
                    return Err(Error::setting_value(
                        &self.name,
                        format!(
                            "'{}' is not a version with at most {} components",
                            text, component_count
                        ),
                    ));
                }
                Ok(Value::String(text.trim().to_string()))
            }
            SettingKind::Command { .. } | SettingKind::Group { .. } | SettingKind::Custom { .. } => {
                Ok(value)
            }
        }
    }
}

/// Text of a value without JSON quoting.
fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn find_in<'a>(settings: &'a [Setting], name: &str) -> Option<&'a Setting> {
    for setting in settings {
        if setting.is_group() {
            if let Some(found) = setting.find_setting(name) {
                return Some(found);
            }
        } else if setting.name == name {
            return Some(setting);
        }
    }
    None
}

pub(crate) fn find_in_mut<'a>(settings: &'a mut [Setting], name: &str) -> Option<&'a mut Setting> {
    for setting in settings.iter_mut() {
        if setting.is_group() {
            if let Some(options) = setting.options_mut() {
                if let Some(found) = find_in_mut(options, name) {
                    return Some(found);
                }
            }
        } else if setting.name == name {
            return Some(setting);
        }
    }
    None
}

pub(crate) fn find_by_id_in(settings: &[Setting], id: Uuid) -> Option<&Setting> {
    for setting in settings {
        if setting.is_group() {
            if let Some(found) = setting.find_setting_by_id(id) {
                return Some(found);
            }
        } else if setting.id == id {
            return Some(setting);
        }
    }
    None
}

/// Call `f` for every non-group setting, depth first.
pub(crate) fn visit_leaves<'a>(settings: &'a [Setting], f: &mut dyn FnMut(&'a Setting)) {
    for setting in settings {
        match &setting.kind {
            SettingKind::Group { options } => visit_leaves(options, f),
            _ => f(setting),
        }
    }
}

pub(crate) fn visit_leaves_mut(settings: &mut [Setting], f: &mut dyn FnMut(&mut Setting)) {
    for setting in settings.iter_mut() {
        match setting.options_mut() {
            Some(options) => visit_leaves_mut(options, f),
            None => f(setting),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_normalizes() {
        let mut s = Setting::boolean("WordWrap", "_Word wrap", false);
        s.set_value("TRUE", None).unwrap();
        assert_eq!(s.value(None), &Value::Bool(true));
        s.set_value("yes", None).unwrap();
        assert_eq!(s.value(None), &Value::Bool(false));
        s.set_value(true, None).unwrap();
        assert!(s.get_as(false, None));
        s.set_value(Value::Null, None).unwrap();
        assert!(!s.get_as(true, None));
    }

    #[test]
    fn test_scoped_value_falls_back() {
        let user = Uuid::new_v4();
        let mut s = Setting::text("Theme", "_Theme", "light");
        s.set_value("dark", Some(user)).unwrap();

        assert_eq!(s.get_as(String::new(), Some(user)), "dark");
        assert_eq!(s.get_as(String::new(), None), "light");
        assert_eq!(s.get_as(String::new(), Some(Uuid::new_v4())), "light");

        s.reset();
        assert!(s.scoped_values().is_empty());
    }

    #[test]
    fn test_text_max_length() {
        let mut s = Setting::text("Initials", "Initials", "").with_max_length(3);
        assert!(s.set_value("ABC", None).is_ok());
        let err = s.set_value("ABCD", None).unwrap_err();
        assert!(matches!(err, Error::SettingValue { .. }));
        assert_eq!(s.value(None), &Value::from("ABC"));
    }

    #[test]
    fn test_range_clamps_and_parses() {
        let mut s = Setting::range("TabWidth", "Tab width", 4.0, Some(1.0), Some(16.0));
        s.set_value(40, None).unwrap();
        assert_eq!(s.get_as(0.0, None), 16.0);
        s.set_value("0.5", None).unwrap();
        assert_eq!(s.get_as(0.0, None), 1.0);
        assert!(s.set_value("wide", None).is_err());
    }

    #[test]
    fn test_choice_by_name_or_value() {
        let mut s = Setting::choice(
            "LineEndings",
            "Line endings",
            "lf",
            vec![
                ChoiceValue::new("Unix", "Unix (LF)", "lf"),
                ChoiceValue::new("Windows", "Windows (CRLF)", "crlf"),
            ],
        );
        s.set_value("Windows", None).unwrap();
        assert_eq!(s.value(None), &Value::from("crlf"));
        s.set_value("lf", None).unwrap();
        assert_eq!(s.value(None), &Value::from("lf"));
        assert!(s.set_value("cr", None).is_err());

        let mut free = s.clone().with_free_choice();
        free.set_value("cr", None).unwrap();
        assert_eq!(free.value(None), &Value::from("cr"));
    }

    #[test]
    fn test_multiple_choice_stores_array() {
        let mut s = Setting::choice(
            "Languages",
            "Languages",
            Value::Null,
            vec![ChoiceValue::from_value("en"), ChoiceValue::from_value("de")],
        )
        .with_multiple(true);
        s.set_value(serde_json::json!(["en", "de"]), None).unwrap();
        assert_eq!(s.get_as(Vec::<String>::new(), None), vec!["en", "de"]);
        s.set_value("de", None).unwrap();
        assert_eq!(s.value(None), &serde_json::json!(["de"]));
    }

    #[test]
    fn test_version_components() {
        let mut s = Setting::version("MinVersion", "Minimum version", Some("1.0"), 3);
        s.set_value("2.4.1", None).unwrap();
        assert_eq!(s.value(None), &Value::from("2.4.1"));
        assert!(s.set_value("1.2.3.4", None).is_err());
        assert!(s.set_value("1.x", None).is_err());
    }

    #[test]
    fn test_string_value_parsed_for_typed_read() {
        let mut s = Setting::custom("Recent", "Recent files", "RecentList");
        s.set_value("[1, 2, 3]", None).unwrap();
        assert_eq!(s.get_as(Vec::<u32>::new(), None), vec![1, 2, 3]);
        assert_eq!(s.get_as(7u32, None), 7);
    }

    #[test]
    fn test_group_find_and_count() {
        let group = Setting::group(
            "Editor",
            "Editor",
            vec![
                Setting::boolean("WordWrap", "Word wrap", false),
                Setting::group(
                    "Tabs",
                    "Tabs",
                    vec![
                        Setting::range("TabWidth", "Tab width", 4.0, None, None),
                        Setting::boolean("UseSpaces", "Use spaces", true),
                    ],
                ),
            ],
        );

        assert_eq!(group.count(), 4);
        assert!(group.find_setting("UseSpaces").is_some());
        assert!(group.find_setting("Tabs").is_none());
        assert!(group.find_setting("Missing").is_none());

        let mut names = Vec::new();
        visit_leaves(group.options(), &mut |s| names.push(s.name.clone()));
        assert_eq!(names, vec!["WordWrap", "TabWidth", "UseSpaces"]);
    }

    #[test]
    fn test_find_by_id_nested() {
        let id = Uuid::new_v4();
        let group = Setting::group(
            "Outer",
            "Outer",
            vec![Setting::group(
                "Inner",
                "Inner",
                vec![Setting::boolean("Deep", "Deep", false).with_id(id)],
            )],
        );
        assert_eq!(group.find_setting_by_id(id).map(|s| s.name.as_str()), Some("Deep"));
    }
}
