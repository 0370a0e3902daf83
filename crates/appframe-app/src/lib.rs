//! # appframe-app - Application Runtime
//!
//! The application object and everything it owns: contexts, lifecycle,
//! command-line parsing, settings and plugins. Built on the domain types in
//! `appframe-core`.
//!
//! ## Public API
//!
//! ### Application (`application`)
//! - [`Application`] - Root object: command dispatch, contexts, lifecycle
//! - [`DispatchOutcome`] - Which step handled an `execute_command` call
//!
//! ### Customization (`hooks`, `observer`)
//! - [`ApplicationHooks`] - Overridable behavior, one implementation per app
//! - [`ApplicationObserver`] - Reacts to [`ApplicationEvent`]s
//!
//! ### Contexts (`context`)
//! - [`Context`] - Activatable scope with its own commands and handlers
//! - [`ContextCollection`] - Active contexts in activation order
//!
//! ### Lifecycle (`lifecycle`)
//! - [`LifecycleState`], [`StopOutcome`], [`ActivationPhase`]
//! - [`ActivationEventArgs`], [`CancelEventArgs`]
//! - [`ApplicationActivationType`], [`InstallationStatus`]
//!
//! ### Command Line (`command_line`)
//! - [`CommandLine`] - Argument parser with sub-commands and usage text
//!
//! ### Settings (`settings`)
//! - [`Setting`], [`SettingsGroup`], [`SettingsProvider`]
//! - [`TomlSettingsProvider`] - Provider persisted to a TOML file
//!
//! ### Plugins (`plugin`)
//! - [`Plugin`], [`PluginRegistry`], [`PluginPropertyBag`]

pub mod application;
pub mod command_line;
pub mod context;
pub mod hooks;
pub mod lifecycle;
pub mod observer;
pub mod plugin;
pub mod settings;

pub use application::{Application, DispatchOutcome, HELP_EXIT_CODE};
pub use command_line::{
    CommandLine, CommandLineCommand, CommandLineOption, CommandLineOptionCollection,
    CommandLineOptionValueType, ACTIVATION_TYPE_OPTION, HELP_OPTION,
};
pub use context::{Context, ContextCollection};
pub use hooks::{ApplicationHooks, DefaultHooks};
pub use lifecycle::{
    ActivationEventArgs, ActivationPhase, ApplicationActivationType, CancelEventArgs,
    InstallationStatus, LifecycleState, StopOutcome, UnknownActivationType,
};
pub use observer::{ApplicationEvent, ApplicationObserver};
pub use plugin::{
    Feature, Plugin, PluginInfo, PluginPropertyBag, PluginRegistry, PluginState,
    PLUGIN_CONFIG_FILENAME,
};
pub use settings::{
    ChoiceValue, FileSettingMode, MemorySettingsProvider, Setting, SettingKind, SettingsGroup,
    SettingsProfile, SettingsProvider, TomlSettingsProvider, DEFAULT_PRIORITY, SETTINGS_FILENAME,
};
