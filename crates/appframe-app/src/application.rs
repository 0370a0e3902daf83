//! The application root: command dispatch, contexts and lifecycle
//!
//! Everything here is single-threaded. `Application` methods take `&self`
//! and keep their state in `Cell`/`RefCell`, so hooks, observers and command
//! handlers can call back into the application (execute another command,
//! add a context, call `stop` from `on_stopping`). No `RefCell` borrow is
//! held while user code runs.

use std::cell::{Cell, Ref, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use appframe_core::prelude::*;
use appframe_core::{
    same_handler, Command, CommandCollection, CommandEventArgs, CommandHandler, CommandSource,
    NamedParameters, PendingDispatch,
};
use chrono::{DateTime, Local};
use serde_json::Value;
use uuid::Uuid;

use crate::command_line::{CommandLine, ACTIVATION_TYPE_OPTION};
use crate::context::{Context, ContextCollection};
use crate::hooks::{ApplicationHooks, DefaultHooks};
use crate::lifecycle::{
    ActivationEventArgs, ActivationPhase, ApplicationActivationType, CancelEventArgs,
    InstallationStatus, LifecycleState, StopOutcome,
};
use crate::observer::{ApplicationEvent, ApplicationObserver};
use crate::plugin::{Plugin, PluginInfo, PluginPropertyBag, PluginRegistry};
use crate::settings::{Setting, SettingsProvider};

/// Exit code returned by `start` after printing usage for `--help`.
pub const HELP_EXIT_CODE: i32 = 2;

/// Which dispatch step handled an `execute_command` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handlers attached at application level before the `Command` existed,
    /// plus the command's own handlers once it is registered
    Detached,
    /// Handlers of the active context with this id
    Context(Uuid),
    /// The global `Command`'s own handlers
    Command,
    /// Nothing matched
    Unhandled,
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, DispatchOutcome::Unhandled)
    }
}

pub struct Application {
    id: Uuid,
    short_name: Option<String>,
    unique_name: Option<String>,
    title: Option<String>,
    hooks: Box<dyn ApplicationHooks>,

    state: Cell<LifecycleState>,
    initialized: Cell<bool>,
    stopping: Cell<bool>,
    first_run: Cell<bool>,
    exit_code: Cell<i32>,
    started_at: Cell<Option<DateTime<Local>>>,
    additional_plugins_loaded: Cell<bool>,

    commands: RefCell<CommandCollection>,
    detached_handlers: RefCell<HashMap<String, Vec<CommandHandler>>>,
    contexts: RefCell<ContextCollection>,
    removing_contexts: RefCell<HashSet<Uuid>>,
    observers: RefCell<Vec<Rc<dyn ApplicationObserver>>>,
    command_line: RefCell<CommandLine>,
    plugins: RefCell<PluginRegistry>,
    settings_providers: RefCell<Vec<Box<dyn SettingsProvider>>>,
}

impl Application {
    /// An application with no short name, default hooks and the process
    /// arguments as its command line.
    pub fn new() -> Self {
        Self {
            id: Uuid::nil(),
            short_name: None,
            unique_name: None,
            title: None,
            hooks: Box::new(DefaultHooks),
            state: Cell::new(LifecycleState::Uninitialized),
            initialized: Cell::new(false),
            stopping: Cell::new(false),
            first_run: Cell::new(true),
            exit_code: Cell::new(0),
            started_at: Cell::new(None),
            additional_plugins_loaded: Cell::new(false),
            commands: RefCell::new(CommandCollection::new()),
            detached_handlers: RefCell::new(HashMap::new()),
            contexts: RefCell::new(ContextCollection::new()),
            removing_contexts: RefCell::new(HashSet::new()),
            observers: RefCell::new(Vec::new()),
            command_line: RefCell::new(CommandLine::from_env()),
            plugins: RefCell::new(PluginRegistry::new()),
            settings_providers: RefCell::new(Vec::new()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Builders
    // ─────────────────────────────────────────────────────────────────────

    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    pub fn with_unique_name(mut self, unique_name: impl Into<String>) -> Self {
        self.unique_name = Some(unique_name.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_hooks(mut self, hooks: impl ApplicationHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Replace the process arguments with `arguments`.
    pub fn with_arguments<I, S>(self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command_line.borrow_mut().set_arguments(arguments);
        self
    }

    pub fn with_command_line(self, command_line: CommandLine) -> Self {
        *self.command_line.borrow_mut() = command_line;
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Metadata
    // ─────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    /// Name used for data directories and logs; defaults to the short name.
    pub fn unique_name(&self) -> &str {
        self.unique_name
            .as_deref()
            .or(self.short_name.as_deref())
            .unwrap_or_default()
    }

    /// Display title; defaults to the short name.
    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.short_name.as_deref())
            .unwrap_or_default()
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.get()
    }

    /// Exit code from the last `start` or `stop`.
    pub fn exit_code(&self) -> i32 {
        self.exit_code.get()
    }

    /// When the last successful activation finished.
    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at.get()
    }

    pub fn installation_status(&self) -> InstallationStatus {
        self.hooks.installation_status(self)
    }

    /// Log `message` at info level, tagged with the unique name.
    pub fn log(&self, message: impl fmt::Display) {
        info!(app = %self.unique_name(), "{}", message);
    }

    /// Per-application data directories, most specific first:
    /// `<data-local-dir>/<unique-name>` then `<config-dir>/<unique-name>`.
    ///
    /// Empty when the application has no name.
    pub fn data_paths(&self) -> Vec<PathBuf> {
        let name = self.unique_name();
        if name.is_empty() {
            return Vec::new();
        }
        let mut paths: Vec<PathBuf> = Vec::new();
        for base in [dirs::data_local_dir(), dirs::config_dir()].into_iter().flatten() {
            let path = base.join(name);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    /// Configuration directory, `<config-dir>/<unique-name>`.
    pub fn config_dir(&self) -> Option<PathBuf> {
        let name = self.unique_name();
        if name.is_empty() {
            return None;
        }
        dirs::config_dir().map(|base| base.join(name))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────

    pub fn commands(&self) -> Ref<'_, CommandCollection> {
        self.commands.borrow()
    }

    pub fn has_command(&self, command_id: &str) -> bool {
        self.commands.borrow().contains(command_id)
    }

    /// Register a global command, replacing one with the same id.
    ///
    /// Early handlers for this id stay at application level and keep
    /// running first on every dispatch.
    pub fn add_command(&self, command: Command) -> Option<Command> {
        if self.detached_handlers.borrow().contains_key(&command.id) {
            debug!("Command '{}' registered after early handlers", command.id);
        }
        self.commands.borrow_mut().add(command)
    }

    pub fn remove_command(&self, command_id: &str) -> Option<Command> {
        self.commands.borrow_mut().remove(command_id)
    }

    /// Run `f` on the global command `command_id`.
    ///
    /// `f` must not call back into the application's command methods.
    pub fn with_command_mut<R>(&self, command_id: &str, f: impl FnOnce(&mut Command) -> R) -> Option<R> {
        self.commands.borrow_mut().get_mut(command_id).map(f)
    }

    /// Attach `handler` to command `command_id`.
    ///
    /// Returns `true` if the command exists and the handler went straight
    /// onto it. Otherwise the handler is kept at application level (once
    /// per handler) and `false` is returned. Such early handlers run on
    /// every `execute_command` for the id, including after the command is
    /// added.
    pub fn attach_command_event_handler(&self, command_id: &str, handler: CommandHandler) -> bool {
        let early = self
            .detached_handlers
            .borrow()
            .get(command_id)
            .is_some_and(|list| list.iter().any(|h| same_handler(h, &handler)));
        if let Some(command) = self.commands.borrow_mut().get_mut(command_id) {
            if !early && !command.has_executed_handler(&handler) {
                command.add_executed_handler(handler);
            }
            return true;
        }

        debug!("Attaching handler for unknown command '{}'", command_id);
        let mut table = self.detached_handlers.borrow_mut();
        let list = table.entry(command_id.to_string()).or_default();
        if !list.iter().any(|h| same_handler(h, &handler)) {
            list.push(handler);
        }
        false
    }

    /// Detach `handler` from the command or the application-level table.
    pub fn detach_command_event_handler(&self, command_id: &str, handler: &CommandHandler) -> bool {
        if let Some(command) = self.commands.borrow_mut().get_mut(command_id) {
            if command.remove_executed_handler(handler) {
                return true;
            }
        }

        let mut table = self.detached_handlers.borrow_mut();
        let Some(list) = table.get_mut(command_id) else {
            return false;
        };
        let before = list.len();
        list.retain(|h| !same_handler(h, handler));
        let removed = list.len() != before;
        if list.is_empty() {
            table.remove(command_id);
        }
        removed
    }

    /// Dispatch `command_id`.
    ///
    /// The first matching step wins:
    /// 1. handlers attached at application level before the command existed,
    ///    followed by the command's own handlers if it has since been added,
    /// 2. the most recently added context with handlers for the id,
    /// 3. the global command's own handlers.
    ///
    /// An unknown id does nothing and returns [`DispatchOutcome::Unhandled`].
    pub fn execute_command(&self, command_id: &str, parameters: NamedParameters) -> DispatchOutcome {
        let (pending, outcome) = self.resolve_dispatch(command_id, parameters);
        if pending.is_empty() {
            trace!("No handler for command '{}'", command_id);
            return outcome;
        }
        trace!(
            "Dispatching '{}' to {} handler(s) via {:?}",
            command_id,
            pending.iter().map(PendingDispatch::handler_count).sum::<usize>(),
            outcome
        );
        for dispatch in pending {
            dispatch.invoke();
        }
        outcome
    }

    /// `execute_command` without parameters.
    pub fn execute(&self, command_id: &str) -> DispatchOutcome {
        self.execute_command(command_id, NamedParameters::new())
    }

    fn resolve_dispatch(
        &self,
        command_id: &str,
        parameters: NamedParameters,
    ) -> (Vec<PendingDispatch>, DispatchOutcome) {
        let early = self.detached_handlers.borrow().get(command_id).cloned();
        if let Some(handlers) = early.filter(|h| !h.is_empty()) {
            let command = self.commands.borrow().get(command_id).cloned();
            let own = command
                .as_ref()
                .map(|c| c.prepare_execute(parameters.clone()))
                .filter(|p| p.handler_count() > 0);
            let args =
                CommandEventArgs::new(command_id, command, parameters, CommandSource::Application);
            let mut pending = vec![PendingDispatch::new(handlers, args)];
            pending.extend(own);
            return (pending, DispatchOutcome::Detached);
        }

        let from_context = self
            .contexts
            .borrow()
            .iter()
            .rev()
            .find_map(|ctx| {
                ctx.prepare_execute(command_id, parameters.clone())
                    .map(|p| (p, ctx.id()))
            });
        if let Some((pending, context_id)) = from_context {
            return (vec![pending], DispatchOutcome::Context(context_id));
        }

        match self.commands.borrow().get(command_id) {
            Some(command) => (
                vec![command.prepare_execute(parameters)],
                DispatchOutcome::Command,
            ),
            None => (Vec::new(), DispatchOutcome::Unhandled),
        }
    }

    /// Look a command up in the global commands, then the `find_command`
    /// hook, then each active context in activation order.
    pub fn find_command(&self, command_id: &str) -> Option<Command> {
        let global = self.commands.borrow().get(command_id).cloned();
        if global.is_some() {
            return global;
        }
        if let Some(command) = self.hooks.find_command(self, command_id) {
            return Some(command);
        }
        self.contexts
            .borrow()
            .iter()
            .find_map(|ctx| ctx.commands().get(command_id).cloned())
    }

    /// Set a command's enabled flag, searching the global commands then the
    /// active contexts. Returns `false` if no such command exists.
    ///
    /// The `on_command_enabled_changed` hook and observers are notified
    /// only when the flag actually changes.
    pub fn set_command_enabled(&self, command_id: &str, enabled: bool) -> bool {
        let global = self
            .commands
            .borrow_mut()
            .get_mut(command_id)
            .map(|command| toggle(command, enabled));
        let changed = global.or_else(|| {
            let mut contexts = self.contexts.borrow_mut();
            contexts.ids().into_iter().find_map(|id| {
                contexts
                    .get_mut(id)
                    .and_then(|ctx| ctx.commands_mut().get_mut(command_id))
                    .map(|command| toggle(command, enabled))
            })
        });

        match changed {
            None => {
                debug!("set_command_enabled: unknown command '{}'", command_id);
                false
            }
            Some(None) => true,
            Some(Some(snapshot)) => {
                self.hooks.on_command_enabled_changed(self, &snapshot);
                self.emit(&ApplicationEvent::CommandEnabledChanged {
                    command_id: command_id.to_string(),
                    enabled,
                });
                true
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Contexts
    // ─────────────────────────────────────────────────────────────────────

    /// Active contexts, oldest first.
    pub fn contexts(&self) -> Ref<'_, ContextCollection> {
        self.contexts.borrow()
    }

    pub fn has_context(&self, context_id: Uuid) -> bool {
        self.contexts.borrow().contains(context_id)
    }

    /// Activate `context` as the most recent one.
    pub fn add_context(&self, context: Context) -> bool {
        let index = self.contexts.borrow().len();
        self.insert_context(index, context)
    }

    /// Activate `context` at `index` (clamped). Returns `false` and leaves
    /// the collection alone if a context with the same id is active.
    pub fn insert_context(&self, index: usize, context: Context) -> bool {
        let context_id = context.id();
        let name = context.name().to_string();
        {
            let mut contexts = self.contexts.borrow_mut();
            if contexts.contains(context_id) {
                warn!("Context '{}' is already active", context);
                return false;
            }
            contexts.insert(index, context);
        }
        debug!("Context '{}' {} added", name, context_id);
        self.emit(&ApplicationEvent::ContextAdded { context_id, name });
        true
    }

    /// Deactivate a context. Observers are told before it leaves the
    /// collection.
    pub fn remove_context(&self, context_id: Uuid) -> Option<Context> {
        let name = self
            .contexts
            .borrow()
            .get(context_id)
            .map(|c| c.name().to_string())?;
        if !self.removing_contexts.borrow_mut().insert(context_id) {
            debug!("Context {} is already being removed", context_id);
            return None;
        }

        self.emit(&ApplicationEvent::ContextRemoved { context_id, name });

        let removed = self.contexts.borrow_mut().remove(context_id);
        self.removing_contexts.borrow_mut().remove(&context_id);
        if removed.is_some() {
            debug!("Context {} removed", context_id);
        }
        removed
    }

    /// Deactivate every context, most recent first.
    pub fn clear_contexts(&self) {
        loop {
            let last = self.contexts.borrow().last().map(Context::id);
            match last {
                Some(id) => {
                    if self.remove_context(id).is_none() {
                        break;
                    }
                }
                None => break,
            }
        }
    }

    /// Run `f` on an active context.
    ///
    /// `f` must not call back into the application's context methods.
    pub fn with_context_mut<R>(&self, context_id: Uuid, f: impl FnOnce(&mut Context) -> R) -> Option<R> {
        self.contexts.borrow_mut().get_mut(context_id).map(f)
    }

    /// Look a context up through the `find_context` hook, then the active
    /// contexts.
    pub fn find_context(&self, context_id: Uuid) -> Option<Context> {
        if let Some(context) = self.hooks.find_context(self, context_id) {
            return Some(context);
        }
        self.contexts.borrow().get(context_id).cloned()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Observers
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_observer(&self, observer: Rc<dyn ApplicationObserver>) {
        debug!("Registered observer '{}'", observer.name());
        self.observers.borrow_mut().push(observer);
    }

    pub fn remove_observer(&self, observer: &Rc<dyn ApplicationObserver>) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|o| !std::ptr::addr_eq(Rc::as_ptr(o), Rc::as_ptr(observer)));
        observers.len() != before
    }

    fn observers_snapshot(&self) -> Vec<Rc<dyn ApplicationObserver>> {
        self.observers.borrow().clone()
    }

    fn emit(&self, event: &ApplicationEvent) {
        for observer in self.observers_snapshot() {
            if let Err(e) = observer.on_event(self, event) {
                warn!(
                    "Observer '{}' failed handling {}: {}",
                    observer.name(),
                    event.event_type(),
                    e
                );
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Command line
    // ─────────────────────────────────────────────────────────────────────

    pub fn command_line(&self) -> Ref<'_, CommandLine> {
        self.command_line.borrow()
    }

    /// Declare options and sub-commands before `start`.
    pub fn command_line_mut(&mut self) -> &mut CommandLine {
        self.command_line.get_mut()
    }

    /// Generated help text.
    pub fn usage(&self) -> String {
        let program = self.short_name().unwrap_or("app");
        self.command_line.borrow().usage(program)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Plugins
    // ─────────────────────────────────────────────────────────────────────

    pub fn register_plugin(&self, plugin: Box<dyn Plugin>) -> bool {
        self.plugins.borrow_mut().register(plugin)
    }

    /// Supported plugins: registered ones plus those from the
    /// `additional_plugins` hook.
    pub fn plugins(&self) -> Vec<PluginInfo> {
        self.load_additional_plugins();
        self.plugins.borrow().supported_info()
    }

    /// Every registered plugin, supported or not.
    pub fn plugin_registry(&self) -> Ref<'_, PluginRegistry> {
        self.load_additional_plugins();
        self.plugins.borrow()
    }

    /// Configuration bag for `plugin_id`, read from the data paths.
    pub fn plugin_property_bag(&self, plugin_id: Uuid) -> PluginPropertyBag {
        PluginPropertyBag::load(plugin_id, &self.data_paths())
    }

    fn load_additional_plugins(&self) {
        if self.additional_plugins_loaded.replace(true) {
            return;
        }
        let extra = self.hooks.additional_plugins(self);
        let mut registry = self.plugins.borrow_mut();
        for plugin in extra {
            registry.register(plugin);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_settings_provider(&self, provider: Box<dyn SettingsProvider>) {
        self.settings_providers.borrow_mut().push(provider);
    }

    pub fn settings_providers(&self) -> Ref<'_, Vec<Box<dyn SettingsProvider>>> {
        self.settings_providers.borrow()
    }

    /// First setting named `name` across providers.
    pub fn find_setting(&self, name: &str) -> Option<Setting> {
        self.settings_providers
            .borrow()
            .iter()
            .find_map(|p| p.find_setting(name).cloned())
    }

    /// Set the value of the first setting named `name`.
    ///
    /// Returns `Ok(false)` if no provider has it.
    pub fn set_setting_value(
        &self,
        name: &str,
        value: impl Into<Value>,
        scope: Option<Uuid>,
    ) -> Result<bool> {
        let mut providers = self.settings_providers.borrow_mut();
        for provider in providers.iter_mut() {
            if let Some(setting) = provider.find_setting_mut(name) {
                setting.set_value(value, scope)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Load every provider. A failing provider is logged and skipped.
    pub fn load_settings(&self) {
        for provider in self.settings_providers.borrow_mut().iter_mut() {
            if let Err(e) = provider.load_settings() {
                warn!("Failed to load settings from provider {}: {}", provider.id(), e);
            }
        }
    }

    /// Save every provider. A failing provider is logged and skipped.
    pub fn save_settings(&self) {
        for provider in self.settings_providers.borrow_mut().iter_mut() {
            if let Err(e) = provider.save_settings() {
                warn!("Failed to save settings from provider {}: {}", provider.id(), e);
            }
        }
    }

    fn initialize_settings(&self) {
        for provider in self.settings_providers.borrow_mut().iter_mut() {
            if let Err(e) = provider.initialize() {
                warn!("Failed to initialize settings provider {}: {}", provider.id(), e);
            }
        }
        self.load_settings();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Initialize once. Later calls return `Ok(())` without doing anything.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if no short name is set, or whatever the
    /// `initialize` hook returns. Either leaves the application
    /// uninitialized.
    pub fn initialize(&self) -> Result<()> {
        if self.initialized.get() {
            return Ok(());
        }

        let Some(short_name) = self.short_name().filter(|n| !n.is_empty()) else {
            return Err(Error::invalid_argument(
                "short_name must be set before initialize",
            ));
        };
        info!("Initializing '{}'", short_name);

        self.hooks.initialize(self)?;
        self.initialize_settings();

        self.initialized.set(true);
        self.state.set(LifecycleState::Initialized);
        self.emit(&ApplicationEvent::Initialized);
        Ok(())
    }

    /// Initialize if needed, parse the command line and run the activation
    /// phases. Returns the exit code.
    ///
    /// With `--help` on the command line the usage text is printed and
    /// [`HELP_EXIT_CODE`] is returned without activating.
    pub fn start(&self) -> Result<i32> {
        if self.state.get() == LifecycleState::Running {
            warn!("start called while already running");
            return Ok(self.exit_code.get());
        }

        self.initialize()?;
        self.load_additional_plugins();
        self.plugins.borrow_mut().initialize_all();

        let mut args = {
            let mut command_line = self.command_line.borrow_mut();
            command_line.parse();

            if command_line.help_requested() {
                drop(command_line);
                println!("{}", self.usage());
                self.exit_code.set(HELP_EXIT_CODE);
                return Ok(HELP_EXIT_CODE);
            }

            for option in command_line.unknown_options() {
                debug!("Ignoring unknown command-line option '{}'", option.name);
            }
            let missing = command_line.missing_required();
            if !missing.is_empty() {
                warn!("Missing required option(s): {}", missing.join(", "));
            }

            let activation_type = match command_line.value(ACTIVATION_TYPE_OPTION) {
                Some(value) => value.parse::<ApplicationActivationType>().unwrap_or_else(|e| {
                    warn!("{}, using Launch", e);
                    ApplicationActivationType::Launch
                }),
                None => ApplicationActivationType::default(),
            };

            let mut args = ActivationEventArgs::new(self.first_run.replace(false), activation_type);
            args.command = command_line.command().map(|c| c.name.clone());
            args.file_names = command_line.file_names().to_vec();
            args
        };

        self.state.set(LifecycleState::Running);
        for phase in ActivationPhase::ALL {
            self.hooks.on_activation(self, phase, &mut args);
            for observer in self.observers_snapshot() {
                observer.on_activation(self, phase, &mut args);
            }
            if args.cancel {
                info!("Activation cancelled during {}", phase.label());
                self.state.set(LifecycleState::Initialized);
                self.exit_code.set(args.exit_code);
                return Ok(args.exit_code);
            }
        }

        self.exit_code.set(args.exit_code);
        self.started_at.set(Some(Local::now()));
        info!(
            "'{}' started ({}, first run: {})",
            self.unique_name(),
            args.activation_type,
            args.first_run
        );
        self.emit(&ApplicationEvent::Started {
            first_run: args.first_run,
            exit_code: args.exit_code,
        });
        Ok(args.exit_code)
    }

    /// Shut down with `exit_code`.
    ///
    /// Sequence: `BeforeShutdown` observers (cancellable), the `on_stopping`
    /// hook (cancellable), settings save, plugin shutdown, the `stop` hook,
    /// `Shutdown` event, the `on_stopped` hook, `Stopped` event. A call made
    /// while a stop is in progress returns [`StopOutcome::AlreadyStopping`]
    /// and does nothing. Never exits the process.
    pub fn stop(&self, exit_code: i32) -> StopOutcome {
        if self.stopping.replace(true) {
            debug!("stop requested while already stopping");
            return StopOutcome::AlreadyStopping;
        }
        let previous = self.state.replace(LifecycleState::Stopping);

        let mut before = CancelEventArgs::new();
        for observer in self.observers_snapshot() {
            observer.on_before_shutdown(self, &mut before);
        }
        if before.cancel {
            info!("Shutdown cancelled by an observer");
            return self.cancel_stop(previous);
        }

        let mut stopping = CancelEventArgs::new();
        self.hooks.on_stopping(self, &mut stopping);
        if stopping.cancel {
            info!("Shutdown cancelled by on_stopping");
            return self.cancel_stop(previous);
        }

        self.save_settings();
        self.plugins.borrow_mut().shutdown_all();
        self.hooks.stop(self, exit_code);
        self.exit_code.set(exit_code);
        self.emit(&ApplicationEvent::Shutdown { exit_code });

        self.hooks.on_stopped(self);
        self.state.set(LifecycleState::Stopped);
        self.emit(&ApplicationEvent::Stopped { exit_code });
        self.stopping.set(false);
        info!("'{}' stopped with exit code {}", self.unique_name(), exit_code);
        StopOutcome::Stopped
    }

    fn cancel_stop(&self, previous: LifecycleState) -> StopOutcome {
        self.state.set(previous);
        self.stopping.set(false);
        StopOutcome::Cancelled
    }

    /// `stop` with the current exit code, then `start`, but only if the stop
    /// completed. Returns `Ok(None)` when the stop did not happen.
    pub fn restart(&self) -> Result<Option<i32>> {
        match self.stop(self.exit_code.get()) {
            StopOutcome::Stopped => self.start().map(Some),
            outcome => {
                info!("Restart abandoned: {:?}", outcome);
                Ok(None)
            }
        }
    }
}

/// Apply `enabled`; a snapshot of the command if the flag changed.
fn toggle(command: &mut Command, enabled: bool) -> Option<Command> {
    if command.enabled == enabled {
        return None;
    }
    command.enabled = enabled;
    Some(command.clone())
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("id", &self.id)
            .field("short_name", &self.short_name)
            .field("unique_name", &self.unique_name)
            .field("state", &self.state.get())
            .field("stopping", &self.stopping.get())
            .field("exit_code", &self.exit_code.get())
            .field("commands", &self.commands.borrow().len())
            .field("contexts", &self.contexts.borrow().len())
            .field("observers", &self.observers.borrow().len())
            .finish_non_exhaustive()
    }
}
