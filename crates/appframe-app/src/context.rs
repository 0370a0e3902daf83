//! Contexts: scoped command collections and handler tables
//!
//! A [`Context`] is activated by adding it to an [`crate::Application`].
//! While active, its handlers take part in command dispatch ahead of the
//! application's global commands. Contexts are kept most-recent-last.

use std::collections::HashMap;
use std::fmt;

use appframe_core::{
    same_handler, CommandCollection, CommandEventArgs, CommandHandler, CommandItemCollection,
    CommandSource, NamedParameters, PendingDispatch,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct Context {
    id: Uuid,
    name: String,
    commands: CommandCollection,
    /// Menu items this context contributes while active
    items: CommandItemCollection,
    handlers: HashMap<String, Vec<CommandHandler>>,
}

impl Context {
    /// Create a context with a fresh random id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            commands: CommandCollection::new(),
            items: CommandItemCollection::new(),
            handlers: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commands(&self) -> &CommandCollection {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandCollection {
        &mut self.commands
    }

    pub fn items(&self) -> &CommandItemCollection {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut CommandItemCollection {
        &mut self.items
    }

    /// Register `handler` for `command_id` in this context.
    ///
    /// Returns `false` if this exact handler was already attached.
    pub fn attach_command_event_handler(
        &mut self,
        command_id: impl Into<String>,
        handler: CommandHandler,
    ) -> bool {
        let list = self.handlers.entry(command_id.into()).or_default();
        if list.iter().any(|h| same_handler(h, &handler)) {
            return false;
        }
        list.push(handler);
        true
    }

    /// Remove `handler` from `command_id`. Returns `true` if it was attached.
    pub fn detach_command_event_handler(
        &mut self,
        command_id: &str,
        handler: &CommandHandler,
    ) -> bool {
        let Some(list) = self.handlers.get_mut(command_id) else {
            return false;
        };
        let before = list.len();
        list.retain(|h| !same_handler(h, handler));
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(command_id);
        }
        removed
    }

    pub fn has_handlers(&self, command_id: &str) -> bool {
        self.handlers
            .get(command_id)
            .is_some_and(|list| !list.is_empty())
    }

    pub fn handler_count(&self, command_id: &str) -> usize {
        self.handlers.get(command_id).map_or(0, Vec::len)
    }

    /// Resolve the handlers this context would run for `command_id`.
    ///
    /// `None` when the context has no handlers for it. The handlers are
    /// cloned out so the caller can drop any borrow of the context before
    /// invoking them.
    pub fn prepare_execute(
        &self,
        command_id: &str,
        parameters: NamedParameters,
    ) -> Option<PendingDispatch> {
        let handlers = self.handlers.get(command_id)?;
        if handlers.is_empty() {
            return None;
        }
        let command = self.commands.get(command_id).cloned();
        Some(PendingDispatch::new(
            handlers.clone(),
            CommandEventArgs::new(
                command_id,
                command,
                parameters,
                CommandSource::Context(self.id),
            ),
        ))
    }

    /// Run this context's handlers for `command_id`.
    ///
    /// Returns `true` if any handler ran.
    pub fn execute_command(&self, command_id: &str, parameters: NamedParameters) -> bool {
        match self.prepare_execute(command_id, parameters) {
            Some(pending) => {
                pending.invoke();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handler_ids: Vec<&String> = self.handlers.keys().collect();
        handler_ids.sort();
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("commands", &self.commands.len())
            .field("items", &self.items.len())
            .field("handlers", &handler_ids)
            .finish()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Collection
// ─────────────────────────────────────────────────────────────────────────────

/// Active contexts in activation order (most recent last).
///
/// Mutation goes through [`crate::Application`] so that observers see every
/// insertion and removal.
#[derive(Debug, Clone, Default)]
pub struct ContextCollection {
    contexts: Vec<Context>,
}

impl ContextCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Uuid) -> Option<&Context> {
        self.contexts.iter().find(|c| c.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: Uuid) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.contexts.iter().position(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Contexts oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Context> {
        self.contexts.iter()
    }

    /// The most recently activated context.
    pub fn last(&self) -> Option<&Context> {
        self.contexts.last()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.contexts.iter().map(|c| c.id).collect()
    }

    pub(crate) fn insert(&mut self, index: usize, context: Context) {
        let index = index.min(self.contexts.len());
        self.contexts.insert(index, context);
    }

    pub(crate) fn remove(&mut self, id: Uuid) -> Option<Context> {
        let index = self.position(id)?;
        Some(self.contexts.remove(index))
    }
}

impl<'a> IntoIterator for &'a ContextCollection {
    type Item = &'a Context;
    type IntoIter = std::slice::Iter<'a, Context>;

    fn into_iter(self) -> Self::IntoIter {
        self.contexts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appframe_core::{command_handler, Command};
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<usize>>, CommandHandler) {
        let count = Rc::new(Cell::new(0));
        let handler = {
            let count = count.clone();
            command_handler(move |_| count.set(count.get() + 1))
        };
        (count, handler)
    }

    #[test]
    fn test_attach_deduplicates_same_handler() {
        let mut ctx = Context::new("editor");
        let (count, handler) = counter();

        assert!(ctx.attach_command_event_handler("EditCopy", handler.clone()));
        assert!(!ctx.attach_command_event_handler("EditCopy", handler.clone()));
        assert_eq!(ctx.handler_count("EditCopy"), 1);

        assert!(ctx.execute_command("EditCopy", NamedParameters::new()));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_execute_without_handlers_returns_false() {
        let mut ctx = Context::new("editor");
        ctx.commands_mut().add(Command::new("EditCopy", "_Copy"));
        assert!(!ctx.execute_command("EditCopy", NamedParameters::new()));
        assert!(!ctx.has_handlers("EditCopy"));
    }

    #[test]
    fn test_detach_handler() {
        let mut ctx = Context::new("editor");
        let (count, handler) = counter();
        ctx.attach_command_event_handler("EditPaste", handler.clone());

        assert!(ctx.detach_command_event_handler("EditPaste", &handler));
        assert!(!ctx.detach_command_event_handler("EditPaste", &handler));
        assert!(!ctx.execute_command("EditPaste", NamedParameters::new()));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_dispatch_carries_context_source_and_command() {
        let mut ctx = Context::new("editor");
        ctx.commands_mut().add(Command::new("EditCut", "Cu_t"));
        let ctx_id = ctx.id();
        let seen = Rc::new(Cell::new(false));
        {
            let seen = seen.clone();
            ctx.attach_command_event_handler(
                "EditCut",
                command_handler(move |e| {
                    assert_eq!(e.source, CommandSource::Context(ctx_id));
                    assert_eq!(e.command.as_ref().map(|c| c.title.as_str()), Some("Cu_t"));
                    assert_eq!(e.parameters.get_as::<u32>("count"), Some(3));
                    seen.set(true);
                }),
            );
        }

        ctx.execute_command("EditCut", NamedParameters::new().with("count", 3));
        assert!(seen.get());
    }

    #[test]
    fn test_collection_order_and_lookup() {
        let mut contexts = ContextCollection::new();
        let a = Context::new("a");
        let b = Context::new("b");
        let (a_id, b_id) = (a.id(), b.id());
        contexts.insert(0, a);
        contexts.insert(99, b);

        assert_eq!(contexts.ids(), vec![a_id, b_id]);
        assert_eq!(contexts.last().map(|c| c.name()), Some("b"));
        assert_eq!(contexts.position(b_id), Some(1));

        assert_eq!(contexts.remove(a_id).map(|c| c.id()), Some(a_id));
        assert!(contexts.remove(a_id).is_none());
        assert_eq!(contexts.len(), 1);
    }

    #[test]
    fn test_display() {
        let id = Uuid::nil();
        let ctx = Context::with_id(id, "Text Editor");
        assert_eq!(
            ctx.to_string(),
            "Text Editor (00000000-0000-0000-0000-000000000000)"
        );
    }
}
