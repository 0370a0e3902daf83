//! Commands: named units of work with UI state and an `Executed` event
//!
//! A [`Command`] is identified by a string id that is unique within a
//! [`CommandCollection`]. UI layers toggle its `enabled` / `visible` /
//! `checked` flags; executing it invokes every subscribed handler in
//! subscription order.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::command_item::{CommandItem, CommandItemCollection};
use crate::params::NamedParameters;

/// Shared, identity-comparable command handler.
///
/// Handlers are reference counted so the same handler can be attached in
/// several places and detected as a duplicate.
pub type CommandHandler = Rc<dyn Fn(&CommandEventArgs)>;

/// Wrap a closure as a [`CommandHandler`].
pub fn command_handler<F>(f: F) -> CommandHandler
where
    F: Fn(&CommandEventArgs) + 'static,
{
    Rc::new(f)
}

/// Whether two handlers are the same allocation.
pub fn same_handler(a: &CommandHandler, b: &CommandHandler) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Which dispatch path invoked a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    /// Handler attached at application level without a `Command` instance
    Application,
    /// Handler attached to a context
    Context(Uuid),
    /// The command's own `Executed` event
    Command,
    /// An `ActionCommandItem` was executed
    Item,
}

/// Arguments passed to every command handler.
#[derive(Debug, Clone)]
pub struct CommandEventArgs {
    /// Id the caller asked to execute
    pub command_id: String,
    /// Snapshot of the matching `Command`, if one is registered
    pub command: Option<Command>,
    pub parameters: NamedParameters,
    pub source: CommandSource,
}

impl CommandEventArgs {
    pub fn new(
        command_id: impl Into<String>,
        command: Option<Command>,
        parameters: NamedParameters,
        source: CommandSource,
    ) -> Self {
        Self {
            command_id: command_id.into(),
            command,
            parameters,
            source,
        }
    }
}

/// Handlers plus the arguments to call them with, resolved ahead of time.
///
/// Resolution borrows whatever owns the handlers; invocation happens after
/// that borrow ends, so handlers are free to mutate their owner.
pub struct PendingDispatch {
    handlers: Vec<CommandHandler>,
    args: CommandEventArgs,
}

impl PendingDispatch {
    pub fn new(handlers: Vec<CommandHandler>, args: CommandEventArgs) -> Self {
        Self { handlers, args }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn source(&self) -> CommandSource {
        self.args.source
    }

    /// Invoke every handler in order.
    pub fn invoke(self) {
        for handler in &self.handlers {
            handler(&self.args);
        }
    }
}

impl fmt::Debug for PendingDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingDispatch")
            .field("handlers", &self.handlers.len())
            .field("args", &self.args)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stock Types
// ─────────────────────────────────────────────────────────────────────────────

/// A predefined, platform-themed command preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StockType {
    #[default]
    None,
    About,
    Add,
    Apply,
    Cancel,
    Close,
    Copy,
    Cut,
    Delete,
    Find,
    FindAndReplace,
    Help,
    New,
    Open,
    Paste,
    Preferences,
    Print,
    Properties,
    Quit,
    Redo,
    Refresh,
    Remove,
    Save,
    SaveAs,
    SelectAll,
    Stop,
    Undo,
}

impl StockType {
    /// Title (with mnemonic prefix) used when a command leaves its own blank.
    pub fn default_title(&self) -> &'static str {
        match self {
            StockType::None => "",
            StockType::About => "_About",
            StockType::Add => "_Add",
            StockType::Apply => "_Apply",
            StockType::Cancel => "_Cancel",
            StockType::Close => "_Close",
            StockType::Copy => "_Copy",
            StockType::Cut => "Cu_t",
            StockType::Delete => "_Delete",
            StockType::Find => "_Find",
            StockType::FindAndReplace => "Find and _Replace",
            StockType::Help => "_Help",
            StockType::New => "_New",
            StockType::Open => "_Open",
            StockType::Paste => "_Paste",
            StockType::Preferences => "P_references",
            StockType::Print => "_Print",
            StockType::Properties => "P_roperties",
            StockType::Quit => "_Quit",
            StockType::Redo => "_Redo",
            StockType::Refresh => "Re_fresh",
            StockType::Remove => "_Remove",
            StockType::Save => "_Save",
            StockType::SaveAs => "Save _As",
            StockType::SelectAll => "Select _All",
            StockType::Stop => "_Stop",
            StockType::Undo => "_Undo",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, StockType::None)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command
// ─────────────────────────────────────────────────────────────────────────────

/// A named executable action with UI state flags.
#[derive(Clone)]
pub struct Command {
    /// Unique key within a collection; referenced by command items
    pub id: String,
    /// Title including mnemonic prefix, if any
    pub title: String,
    pub checked: bool,
    pub enabled: bool,
    pub visible: bool,
    pub stock_type: StockType,
    pub default_command_id: Option<String>,
    pub image_file_name: Option<String>,
    /// Child items shown when the command opens a submenu
    pub items: CommandItemCollection,
    extra_data: HashMap<String, Value>,
    executed: Vec<CommandHandler>,
}

impl Command {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            checked: false,
            enabled: true,
            visible: true,
            stock_type: StockType::None,
            default_command_id: None,
            image_file_name: None,
            items: CommandItemCollection::new(),
            extra_data: HashMap::new(),
            executed: Vec::new(),
        }
    }

    /// A command themed after a stock preset, titled from the preset.
    pub fn stock(id: impl Into<String>, stock_type: StockType) -> Self {
        let mut cmd = Self::new(id, stock_type.default_title());
        cmd.stock_type = stock_type;
        cmd
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = CommandItem>) -> Self {
        for item in items {
            self.items.push(item);
        }
        self
    }

    pub fn with_stock_type(mut self, stock_type: StockType) -> Self {
        self.stock_type = stock_type;
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
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

    pub fn with_image(mut self, file_name: impl Into<String>) -> Self {
        self.image_file_name = Some(file_name.into());
        self
    }

    /// Builder-style handler subscription.
    pub fn on_executed(mut self, handler: CommandHandler) -> Self {
        self.executed.push(handler);
        self
    }

    /// Title to display, falling back to the stock preset's title.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            self.stock_type.default_title()
        } else {
            &self.title
        }
    }

    // ─────────────────────────────────────────────────────────
    // Executed event
    // ─────────────────────────────────────────────────────────

    pub fn add_executed_handler(&mut self, handler: CommandHandler) {
        self.executed.push(handler);
    }

    /// Remove the first subscription of `handler`; `false` if it was not subscribed.
    pub fn remove_executed_handler(&mut self, handler: &CommandHandler) -> bool {
        match self.executed.iter().position(|h| same_handler(h, handler)) {
            Some(pos) => {
                self.executed.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn has_executed_handler(&self, handler: &CommandHandler) -> bool {
        self.executed.iter().any(|h| same_handler(h, handler))
    }

    pub fn executed_handler_count(&self) -> usize {
        self.executed.len()
    }

    /// Resolve this command's `Executed` subscribers for later invocation.
    pub fn prepare_execute(&self, parameters: NamedParameters) -> PendingDispatch {
        PendingDispatch::new(
            self.executed.clone(),
            CommandEventArgs::new(
                self.id.clone(),
                Some(self.clone()),
                parameters,
                CommandSource::Command,
            ),
        )
    }

    /// Fire the `Executed` event.
    pub fn execute(&self) {
        self.execute_with(NamedParameters::new());
    }

    pub fn execute_with(&self, parameters: NamedParameters) {
        self.prepare_execute(parameters).invoke();
    }

    // ─────────────────────────────────────────────────────────
    // Extra data
    // ─────────────────────────────────────────────────────────

    /// Typed extra data; `None` when missing or stored with another type.
    pub fn get_extra_data<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.extra_data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_extra_data_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_extra_data(key).unwrap_or(default)
    }

    pub fn extra_data_value(&self, key: &str) -> Option<&Value> {
        self.extra_data.get(key)
    }

    pub fn set_extra_data<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> crate::Result<()> {
        let value = serde_json::to_value(value)?;
        self.extra_data.insert(key.into(), value);
        Ok(())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("checked", &self.checked)
            .field("enabled", &self.enabled)
            .field("visible", &self.visible)
            .field("stock_type", &self.stock_type)
            .field("items", &self.items.len())
            .field("executed", &self.executed.len())
            .finish()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.id, self.title)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command Collection
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered set of commands keyed by id.
#[derive(Debug, Clone, Default)]
pub struct CommandCollection {
    commands: Vec<Command>,
    by_id: HashMap<String, usize>,
}

impl CommandCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command. A command with the same id is replaced in place and
    /// returned.
    pub fn add(&mut self, command: Command) -> Option<Command> {
        match self.by_id.get(&command.id) {
            Some(&idx) => Some(std::mem::replace(&mut self.commands[idx], command)),
            None => {
                self.by_id.insert(command.id.clone(), self.commands.len());
                self.commands.push(command);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Command> {
        self.by_id.get(id).map(|&idx| &self.commands[idx])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Command> {
        match self.by_id.get(id) {
            Some(&idx) => Some(&mut self.commands[idx]),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Command> {
        let idx = self.by_id.remove(id)?;
        let removed = self.commands.remove(idx);
        for slot in self.by_id.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.by_id.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.id.as_str())
    }
}

impl FromIterator<Command> for CommandCollection {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        let mut collection = CommandCollection::new();
        for cmd in iter {
            collection.add(cmd);
        }
        collection
    }
}

impl<'a> IntoIterator for &'a CommandCollection {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
