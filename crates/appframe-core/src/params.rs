//! Named parameters passed along with a command execution

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Ordered list of `name = value` pairs handed to command handlers.
///
/// Insertion order is preserved; inserting an existing name replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParameters {
    entries: Vec<(String, Value)>,
}

impl NamedParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Insert any serializable value.
    pub fn insert_serialized<T: Serialize>(
        &mut self,
        name: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let value = serde_json::to_value(value)?;
        self.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Typed lookup; `None` when missing or not convertible to `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for NamedParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = NamedParameters::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let params = NamedParameters::new()
            .with("path", "/tmp/a.txt")
            .with("line", 4)
            .with("path", "/tmp/b.txt");

        assert_eq!(params.len(), 2);
        let names: Vec<&str> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["path", "line"]);
        assert_eq!(params.get_as::<String>("path").unwrap(), "/tmp/b.txt");
    }

    #[test]
    fn test_get_as_wrong_type_is_none() {
        let params = NamedParameters::new().with("line", "four");
        assert_eq!(params.get_as::<u32>("line"), None);
        assert!(params.contains("line"));
        assert!(!params.contains("column"));
    }

    #[test]
    fn test_from_iterator() {
        let params: NamedParameters = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(params.get_as::<i64>("b"), Some(2));
    }
}
