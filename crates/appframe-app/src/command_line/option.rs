//! Declared command-line options and sub-commands

use std::fmt;

/// How many values an option takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandLineOptionValueType {
    /// A flag; present or not
    #[default]
    None,
    /// One value; a later occurrence replaces it
    Single,
    /// Every occurrence adds a value
    Multiple,
}

/// An option the parser recognizes, plus what the last parse found for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLineOption {
    pub name: String,
    pub abbreviation: Option<char>,
    pub description: String,
    pub value_type: CommandLineOptionValueType,
    pub optional: bool,
    declared: bool,
    present: bool,
    values: Vec<String>,
}

impl CommandLineOption {
    pub fn new(name: impl Into<String>, value_type: CommandLineOptionValueType) -> Self {
        Self {
            name: name.into(),
            abbreviation: None,
            description: String::new(),
            value_type,
            optional: true,
            declared: true,
            present: false,
            values: Vec::new(),
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, CommandLineOptionValueType::None)
    }

    pub fn single(name: impl Into<String>) -> Self {
        Self::new(name, CommandLineOptionValueType::Single)
    }

    pub fn multiple(name: impl Into<String>) -> Self {
        Self::new(name, CommandLineOptionValueType::Multiple)
    }

    /// Record of an option the parser met but nobody declared.
    pub(crate) fn unknown(name: impl Into<String>, abbreviation: Option<char>) -> Self {
        let mut option = Self::flag(name);
        option.abbreviation = abbreviation;
        option.declared = false;
        option.present = true;
        option
    }

    pub fn with_abbreviation(mut self, abbreviation: char) -> Self {
        self.abbreviation = Some(abbreviation);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.optional = false;
        self
    }

    pub fn takes_value(&self) -> bool {
        self.value_type != CommandLineOptionValueType::None
    }

    /// `false` for options recorded from unrecognized input.
    pub fn is_declared(&self) -> bool {
        self.declared
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    /// The last value given.
    pub fn value(&self) -> Option<&str> {
        self.values.last().map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub(crate) fn mark_present(&mut self) {
        self.present = true;
    }

    pub(crate) fn push_value(&mut self, value: String) {
        self.present = true;
        if self.value_type == CommandLineOptionValueType::Single {
            self.values.clear();
        }
        self.values.push(value);
    }

    pub(crate) fn reset(&mut self) {
        self.present = false;
        self.values.clear();
    }
}

/// Options in declaration order; names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLineOptionCollection {
    options: Vec<CommandLineOption>,
}

impl CommandLineOptionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option, replacing any with the same name.
    pub fn add(&mut self, option: CommandLineOption) {
        match self.options.iter_mut().find(|o| o.name == option.name) {
            Some(existing) => *existing = option,
            None => self.options.push(option),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandLineOption> {
        self.options.iter().find(|o| o.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CommandLineOption> {
        self.options.iter_mut().find(|o| o.name == name)
    }

    pub fn by_abbreviation(&self, abbreviation: char) -> Option<&CommandLineOption> {
        self.options
            .iter()
            .find(|o| o.abbreviation == Some(abbreviation))
    }

    pub fn by_abbreviation_mut(&mut self, abbreviation: char) -> Option<&mut CommandLineOption> {
        self.options
            .iter_mut()
            .find(|o| o.abbreviation == Some(abbreviation))
    }

    pub fn remove(&mut self, name: &str) -> Option<CommandLineOption> {
        let index = self.options.iter().position(|o| o.name == name)?;
        Some(self.options.remove(index))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommandLineOption> {
        self.options.iter()
    }

    /// Drop parse results: undeclared options go, declared ones are cleared.
    pub(crate) fn reset(&mut self) {
        self.options.retain(CommandLineOption::is_declared);
        for option in &mut self.options {
            option.reset();
        }
    }
}

impl<'a> IntoIterator for &'a CommandLineOptionCollection {
    type Item = &'a CommandLineOption;
    type IntoIter = std::slice::Iter<'a, CommandLineOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}

/// A sub-command with its own option set, as in `git commit -m ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLineCommand {
    pub name: String,
    pub description: String,
    pub options: CommandLineOptionCollection,
}

impl CommandLineCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            options: CommandLineOptionCollection::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_option(mut self, option: CommandLineOption) -> Self {
        self.options.add(option);
        self
    }
}

impl fmt::Display for CommandLineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
