//! Declarative menu/toolbar layout nodes
//!
//! Command items never execute anything by themselves (except
//! [`ActionCommandItem`]); they describe where commands show up. Items carry
//! optional `insert_after_id` / `insert_before_id` hints used when one item
//! list is merged into another, e.g. a context contributing entries to the
//! application's main menu.

use std::fmt;

use crate::command::{
    command_handler, CommandEventArgs, CommandHandler, CommandSource, PendingDispatch,
};
use crate::params::NamedParameters;

/// An item with its own inline action rather than a reference to a command.
#[derive(Clone)]
pub struct ActionCommandItem {
    pub id: String,
    pub title: String,
    executed: Vec<CommandHandler>,
}

impl ActionCommandItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            executed: Vec::new(),
        }
    }

    /// Create an item that runs `f` when executed.
    pub fn with_action<F>(id: impl Into<String>, title: impl Into<String>, f: F) -> Self
    where
        F: Fn(&CommandEventArgs) + 'static,
    {
        let mut item = Self::new(id, title);
        item.executed.push(command_handler(f));
        item
    }

    pub fn add_executed_handler(&mut self, handler: CommandHandler) {
        self.executed.push(handler);
    }

    pub fn execute(&self) {
        PendingDispatch::new(
            self.executed.clone(),
            CommandEventArgs::new(
                self.id.clone(),
                None,
                NamedParameters::new(),
                CommandSource::Item,
            ),
        )
        .invoke();
    }
}

impl fmt::Debug for ActionCommandItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCommandItem")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("executed", &self.executed.len())
            .finish()
    }
}

/// The variant payload of a [`CommandItem`].
#[derive(Debug, Clone)]
pub enum CommandItemKind {
    /// Inline action
    Action(ActionCommandItem),
    /// Reference to a `Command` by id
    CommandReference { command_id: String },
    /// Named slot other items can be merged around
    Placeholder { placeholder_id: String },
    Separator,
    /// Nested items
    Group(CommandItemCollection),
}

/// A layout node with optional ordering hints.
#[derive(Debug, Clone)]
pub struct CommandItem {
    pub insert_after_id: Option<String>,
    pub insert_before_id: Option<String>,
    pub kind: CommandItemKind,
}

impl CommandItem {
    fn from_kind(kind: CommandItemKind) -> Self {
        Self {
            insert_after_id: None,
            insert_before_id: None,
            kind,
        }
    }

    pub fn action(item: ActionCommandItem) -> Self {
        Self::from_kind(CommandItemKind::Action(item))
    }

    pub fn command(command_id: impl Into<String>) -> Self {
        Self::from_kind(CommandItemKind::CommandReference {
            command_id: command_id.into(),
        })
    }

    pub fn placeholder(placeholder_id: impl Into<String>) -> Self {
        Self::from_kind(CommandItemKind::Placeholder {
            placeholder_id: placeholder_id.into(),
        })
    }

    pub fn separator() -> Self {
        Self::from_kind(CommandItemKind::Separator)
    }

    pub fn group(items: impl IntoIterator<Item = CommandItem>) -> Self {
        Self::from_kind(CommandItemKind::Group(items.into_iter().collect()))
    }

    pub fn insert_after(mut self, id: impl Into<String>) -> Self {
        self.insert_after_id = Some(id.into());
        self
    }

    pub fn insert_before(mut self, id: impl Into<String>) -> Self {
        self.insert_before_id = Some(id.into());
        self
    }

    /// Id other items can anchor to: the referenced command id, the action id
    /// or the placeholder id.
    pub fn anchor_id(&self) -> Option<&str> {
        match &self.kind {
            CommandItemKind::Action(a) => Some(&a.id),
            CommandItemKind::CommandReference { command_id } => Some(command_id),
            CommandItemKind::Placeholder { placeholder_id } => Some(placeholder_id),
            CommandItemKind::Separator | CommandItemKind::Group(_) => None,
        }
    }

    pub fn command_id(&self) -> Option<&str> {
        match &self.kind {
            CommandItemKind::CommandReference { command_id } => Some(command_id),
            _ => None,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self.kind, CommandItemKind::Separator)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Collection
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered list of command items.
#[derive(Debug, Clone, Default)]
pub struct CommandItemCollection {
    items: Vec<CommandItem>,
}

impl CommandItemCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: CommandItem) {
        self.items.push(item);
    }

    pub fn insert(&mut self, index: usize, item: CommandItem) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    pub fn remove(&mut self, index: usize) -> Option<CommandItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&CommandItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommandItem> {
        self.items.iter()
    }

    pub fn retain<F: FnMut(&CommandItem) -> bool>(&mut self, f: F) {
        self.items.retain(f);
    }

    /// Index of the first item referencing `command_id` (top level only).
    pub fn index_of_command_id(&self, command_id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.command_id() == Some(command_id))
    }

    /// Index of the first top-level item whose anchor id is `id`.
    pub fn index_of_anchor(&self, id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.anchor_id() == Some(id))
    }

    /// Merge `items` into this collection honoring their ordering hints.
    ///
    /// `insert_after_id` wins over `insert_before_id`; an item whose anchor
    /// is missing is appended. Items merged in the same call can anchor to
    /// each other.
    pub fn merge(&mut self, items: impl IntoIterator<Item = CommandItem>) {
        for item in items {
            let after = item
                .insert_after_id
                .as_deref()
                .and_then(|id| self.index_of_anchor(id))
                .map(|idx| idx + 1);
            let before = item
                .insert_before_id
                .as_deref()
                .and_then(|id| self.index_of_anchor(id));

            match after.or(before) {
                Some(idx) => self.items.insert(idx, item),
                None => self.items.push(item),
            }
        }
    }

    /// Every command id referenced anywhere in the tree, depth first.
    pub fn referenced_command_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        collect_command_ids(&self.items, &mut ids);
        ids
    }
}

fn collect_command_ids<'a>(items: &'a [CommandItem], out: &mut Vec<&'a str>) {
    for item in items {
        match &item.kind {
            CommandItemKind::CommandReference { command_id } => out.push(command_id),
            CommandItemKind::Group(group) => collect_command_ids(&group.items, out),
            _ => {}
        }
    }
}

impl FromIterator<CommandItem> for CommandItemCollection {
    fn from_iter<I: IntoIterator<Item = CommandItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CommandItemCollection {
    type Item = &'a CommandItem;
    type IntoIter = std::slice::Iter<'a, CommandItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn anchors(items: &CommandItemCollection) -> Vec<String> {
        items
            .iter()
            .map(|i| i.anchor_id().unwrap_or("-").to_string())
            .collect()
    }

    fn file_menu() -> CommandItemCollection {
        vec![
            CommandItem::command("FileNew"),
            CommandItem::command("FileOpen"),
            CommandItem::separator(),
            CommandItem::placeholder("FileRecent"),
            CommandItem::command("FileExit"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_index_of_command_id() {
        let menu = file_menu();
        assert_eq!(menu.index_of_command_id("FileOpen"), Some(1));
        assert_eq!(menu.index_of_command_id("FileRecent"), None);
        assert_eq!(menu.index_of_anchor("FileRecent"), Some(3));
    }

    #[test]
    fn test_merge_insert_after() {
        let mut menu = file_menu();
        menu.merge(vec![CommandItem::command("FileSave").insert_after("FileOpen")]);
        assert_eq!(
            anchors(&menu),
            vec!["FileNew", "FileOpen", "FileSave", "-", "FileRecent", "FileExit"]
        );
    }

    #[test]
    fn test_merge_insert_before_placeholder() {
        let mut menu = file_menu();
        menu.merge(vec![CommandItem::command("FilePrint").insert_before("FileRecent")]);
        assert_eq!(menu.index_of_command_id("FilePrint"), Some(3));
    }

    #[test]
    fn test_merge_missing_anchor_appends() {
        let mut menu = file_menu();
        menu.merge(vec![CommandItem::command("HelpAbout").insert_after("Nope")]);
        assert_eq!(menu.index_of_command_id("HelpAbout"), Some(menu.len() - 1));
    }

    #[test]
    fn test_merge_chains_within_same_call() {
        let mut menu = file_menu();
        menu.merge(vec![
            CommandItem::command("FileSave").insert_after("FileOpen"),
            CommandItem::command("FileSaveAs").insert_after("FileSave"),
        ]);
        assert_eq!(menu.index_of_command_id("FileSave"), Some(2));
        assert_eq!(menu.index_of_command_id("FileSaveAs"), Some(3));
    }

    #[test]
    fn test_referenced_command_ids_recurses_groups() {
        let menu: CommandItemCollection = vec![
            CommandItem::command("EditUndo"),
            CommandItem::group(vec![
                CommandItem::command("EditCut"),
                CommandItem::separator(),
                CommandItem::command("EditCopy"),
            ]),
            CommandItem::action(ActionCommandItem::new("inline", "Inline")),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            menu.referenced_command_ids(),
            vec!["EditUndo", "EditCut", "EditCopy"]
        );
    }

    #[test]
    fn test_action_item_execute() {
        let count = Rc::new(Cell::new(0));
        let item = {
            let count = count.clone();
            ActionCommandItem::with_action("recent-1", "1 notes.txt", move |e| {
                assert_eq!(e.source, CommandSource::Item);
                assert_eq!(e.command_id, "recent-1");
                count.set(count.get() + 1);
            })
        };

        item.execute();
        item.execute();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut menu = file_menu();
        assert!(menu.remove(42).is_none());
        assert!(menu.remove(2).unwrap().is_separator());
        assert_eq!(menu.len(), 4);
    }
}
