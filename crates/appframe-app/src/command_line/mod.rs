//! Command-line model and parser
//!
//! A [`CommandLine`] holds the raw arguments, the declared options and
//! sub-commands, and after [`CommandLine::parse`] the option values, the
//! selected sub-command and the trailing file names.

mod option;
mod parser;
mod usage;

use std::ffi::OsString;
use std::fmt;

pub use option::{
    CommandLineCommand, CommandLineOption, CommandLineOptionCollection,
    CommandLineOptionValueType,
};

/// Name of the default option selecting the activation type.
pub const ACTIVATION_TYPE_OPTION: &str = "activation-type";

/// Name of the default help flag.
pub const HELP_OPTION: &str = "help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    arguments: Vec<String>,
    file_names: Vec<String>,
    options: CommandLineOptionCollection,
    commands: Vec<CommandLineCommand>,
    /// Index into `commands` of the sub-command the last parse selected
    command: Option<usize>,
    pub short_option_prefix: String,
    pub long_option_prefix: String,
    pub help_text_prefix: Option<String>,
    pub help_text_suffix: Option<String>,
}

impl CommandLine {
    /// Command line over `arguments` (program name excluded) with the
    /// default `--activation-type` / `-A` and `--help` options.
    pub fn new<I, S>(arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = CommandLineOptionCollection::new();
        options.add(
            CommandLineOption::single(ACTIVATION_TYPE_OPTION)
                .with_abbreviation('A')
                .with_description("The type of activation for this app"),
        );
        options.add(CommandLineOption::flag(HELP_OPTION).with_description("Displays help"));

        Self {
            arguments: arguments.into_iter().map(Into::into).collect(),
            file_names: Vec::new(),
            options,
            commands: Vec::new(),
            command: None,
            short_option_prefix: "-".to_string(),
            long_option_prefix: "--".to_string(),
            help_text_prefix: None,
            help_text_suffix: None,
        }
    }

    /// Command line over the current process arguments.
    pub fn from_env() -> Self {
        Self::from_os_args(std::env::args_os().skip(1))
    }

    /// Command line over OS arguments. Invalid UTF-8 is replaced with
    /// U+FFFD instead of failing.
    pub fn from_os_args<I>(arguments: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::new(
            arguments
                .into_iter()
                .map(|arg| arg.to_string_lossy().into_owned()),
        )
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn set_arguments<I, S>(&mut self, arguments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
    }

    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }

    /// Global options, including any unknown ones the last parse recorded.
    pub fn options(&self) -> &CommandLineOptionCollection {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut CommandLineOptionCollection {
        &mut self.options
    }

    pub fn commands(&self) -> &[CommandLineCommand] {
        &self.commands
    }

    /// Register a sub-command, replacing one with the same name.
    pub fn add_command(&mut self, command: CommandLineCommand) {
        match self.commands.iter_mut().find(|c| c.name == command.name) {
            Some(existing) => *existing = command,
            None => self.commands.push(command),
        }
    }

    /// Sub-command selected by the last parse.
    pub fn command(&self) -> Option<&CommandLineCommand> {
        self.command.and_then(|i| self.commands.get(i))
    }

    /// Look an option up in the selected sub-command first, then globally.
    pub fn option(&self, name: &str) -> Option<&CommandLineOption> {
        self.command()
            .and_then(|c| c.options.get(name))
            .or_else(|| self.options.get(name))
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.option(name).is_some_and(CommandLineOption::is_present)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.option(name).and_then(CommandLineOption::value)
    }

    pub fn help_requested(&self) -> bool {
        self.options
            .get(HELP_OPTION)
            .is_some_and(CommandLineOption::is_present)
    }

    /// Options the last parse met that nobody declared.
    pub fn unknown_options(&self) -> Vec<&CommandLineOption> {
        self.options
            .iter()
            .chain(self.command().into_iter().flat_map(|c| c.options.iter()))
            .filter(|o| !o.is_declared())
            .collect()
    }

    /// Names of required options in the active sets that were not given.
    pub fn missing_required(&self) -> Vec<&str> {
        self.options
            .iter()
            .chain(self.command().into_iter().flat_map(|c| c.options.iter()))
            .filter(|o| !o.optional && !o.is_present())
            .map(|o| o.name.as_str())
            .collect()
    }

    /// Parse `arguments`, replacing the results of any earlier parse.
    ///
    /// Never fails: unknown options are recorded as present flags.
    pub fn parse(&mut self) {
        parser::parse(self);
    }

    /// Generated help text for `program`.
    pub fn usage(&self, program: &str) -> String {
        usage::usage(self, program)
    }
}

impl Default for CommandLine {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.arguments.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let cl = CommandLine::default();
        let activation = cl.options().get(ACTIVATION_TYPE_OPTION).unwrap();
        assert_eq!(activation.abbreviation, Some('A'));
        assert_eq!(activation.value_type, CommandLineOptionValueType::Single);
        assert!(cl.options().get(HELP_OPTION).is_some());
        assert!(!cl.help_requested());
    }

    #[test]
    fn test_display_joins_arguments() {
        let cl = CommandLine::new(["--help", "a.txt"]);
        assert_eq!(cl.to_string(), "--help a.txt");
    }

    #[test]
    fn test_add_command_replaces_by_name() {
        let mut cl = CommandLine::default();
        cl.add_command(CommandLineCommand::new("build"));
        cl.add_command(CommandLineCommand::new("build").with_description("Build it"));
        assert_eq!(cl.commands().len(), 1);
        assert_eq!(cl.commands()[0].description, "Build it");
    }

    #[test]
    fn test_missing_required() {
        let mut cl = CommandLine::new(Vec::<String>::new());
        cl.options_mut()
            .add(CommandLineOption::single("project").required());
        cl.parse();
        assert_eq!(cl.missing_required(), vec!["project"]);
    }

    #[test]
    fn test_from_env_reads_process_arguments() {
        let cl = CommandLine::from_env();
        assert_eq!(cl.arguments().len(), std::env::args_os().count() - 1);
    }

    #[test]
    #[cfg(unix)]
    fn test_non_utf8_argument_becomes_lossy_file_name() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"note\xff.txt".to_vec());
        let mut cl =
            CommandLine::from_os_args([OsString::from("-A"), OsString::from("Launch"), raw]);
        cl.parse();
        assert_eq!(cl.file_names(), vec!["note\u{FFFD}.txt".to_string()]);
        assert_eq!(cl.value(ACTIVATION_TYPE_OPTION), Some("Launch"));
    }
}
