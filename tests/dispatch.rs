//! Integration tests for command dispatch through the public facade

use std::cell::RefCell;
use std::rc::Rc;

use appframe::core::CommandItem;
use appframe::prelude::*;

// ─────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────

fn test_app() -> Application {
    Application::new()
        .with_short_name("dispatch-test")
        .with_arguments(Vec::<String>::new())
}

/// Handler that appends `tag` and the dispatch source to `log`.
fn tagged(log: &Rc<RefCell<Vec<String>>>, tag: &str) -> CommandHandler {
    let log = log.clone();
    let tag = tag.to_string();
    command_handler(move |e| log.borrow_mut().push(format!("{}:{:?}", tag, e.source)))
}

// ─────────────────────────────────────────────────────────
// Dispatch Order
// ─────────────────────────────────────────────────────────

#[test]
fn test_full_dispatch_order() {
    let app = test_app();
    let log = Rc::new(RefCell::new(Vec::new()));
    let early = tagged(&log, "early");

    // 1. Early handler only
    app.attach_command_event_handler("FileClose", early.clone());
    assert_eq!(app.execute("FileClose"), DispatchOutcome::Detached);

    // 2. Command registered: early handler still first, then the command's own
    app.add_command(Command::new("FileClose", "_Close").on_executed(tagged(&log, "own")));
    assert_eq!(app.execute("FileClose"), DispatchOutcome::Detached);

    // 3. Early handler keeps priority while a context is active
    let mut ctx = Context::new("document");
    ctx.attach_command_event_handler("FileClose", tagged(&log, "ctx"));
    let ctx_id = ctx.id();
    app.add_context(ctx);
    assert_eq!(app.execute("FileClose"), DispatchOutcome::Detached);

    // 4. Without the early handler the context takes over
    assert!(app.detach_command_event_handler("FileClose", &early));
    assert_eq!(app.execute("FileClose"), DispatchOutcome::Context(ctx_id));

    // 5. Back to the command once the context is gone
    app.remove_context(ctx_id);
    assert_eq!(app.execute("FileClose"), DispatchOutcome::Command);

    assert_eq!(
        *log.borrow(),
        vec![
            "early:Application".to_string(),
            "early:Application".to_string(),
            "own:Command".to_string(),
            "early:Application".to_string(),
            "own:Command".to_string(),
            format!("ctx:Context({})", ctx_id),
            "own:Command".to_string(),
        ]
    );
}

#[test]
fn test_context_handlers_see_context_command_snapshot() {
    let app = test_app();
    let seen = Rc::new(RefCell::new(None));
    let mut ctx = Context::new("editor");
    ctx.commands_mut()
        .add(Command::new("EditFind", "_Find in editor"));
    {
        let seen = seen.clone();
        ctx.attach_command_event_handler(
            "EditFind",
            command_handler(move |e| {
                *seen.borrow_mut() = e.command.as_ref().map(|c| c.title.clone());
            }),
        );
    }
    app.add_context(ctx);

    app.execute("EditFind");
    assert_eq!(seen.borrow().as_deref(), Some("_Find in editor"));
}

#[test]
fn test_unknown_command_changes_nothing() {
    let app = test_app();
    app.add_command(Command::new("Known", "Known"));
    assert!(!app.execute("Unknown").is_handled());
    assert_eq!(app.commands().len(), 1);
    assert!(app.contexts().is_empty());
}

// ─────────────────────────────────────────────────────────
// Contexts
// ─────────────────────────────────────────────────────────

#[test]
fn test_context_items_travel_with_context() {
    let app = test_app();
    let mut ctx = Context::new("document");
    ctx.items_mut().push(CommandItem::command("FileSave"));
    ctx.items_mut().push(CommandItem::separator());
    let id = ctx.id();
    app.add_context(ctx);

    let items = app
        .with_context_mut(id, |c| c.items().referenced_command_ids().len())
        .unwrap_or_default();
    assert_eq!(items, 1);
}

#[test]
fn test_handler_removing_its_own_context() {
    let app = Rc::new(test_app());
    let mut ctx = Context::new("transient");
    let id = ctx.id();
    {
        let weak = Rc::downgrade(&app);
        ctx.attach_command_event_handler(
            "FileClose",
            command_handler(move |_| {
                if let Some(app) = weak.upgrade() {
                    app.remove_context(id);
                }
            }),
        );
    }
    app.add_context(ctx);

    assert_eq!(app.execute("FileClose"), DispatchOutcome::Context(id));
    assert!(!app.has_context(id));
    assert_eq!(app.execute("FileClose"), DispatchOutcome::Unhandled);
}
