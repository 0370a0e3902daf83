//! Integration tests for start/stop, observers and plugins

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use appframe::app::{
    ApplicationActivationType, Feature, LifecycleState, Plugin, PluginState, HELP_EXIT_CODE,
};
use appframe::prelude::*;
use uuid::Uuid;

// ─────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct EventLog {
    labels: RefCell<Vec<String>>,
}

impl ApplicationObserver for EventLog {
    fn name(&self) -> &str {
        "event-log"
    }

    fn on_event(&self, _app: &Application, event: &ApplicationEvent) -> Result<()> {
        self.labels.borrow_mut().push(event.event_type().to_string());
        Ok(())
    }

    fn on_activation(&self, _app: &Application, phase: ActivationPhase, _e: &mut ActivationEventArgs) {
        self.labels.borrow_mut().push(phase.label().to_string());
    }

    fn on_before_shutdown(&self, _app: &Application, _e: &mut CancelEventArgs) {
        self.labels.borrow_mut().push("before_shutdown".to_string());
    }
}

#[derive(Debug)]
struct TestPlugin {
    id: Uuid,
    supported: bool,
    fail: bool,
    initialized: Arc<AtomicUsize>,
    shut_down: Arc<AtomicUsize>,
}

impl TestPlugin {
    fn new(supported: bool, fail: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            supported,
            fail,
            initialized: Arc::new(AtomicUsize::new(0)),
            shut_down: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Plugin for TestPlugin {
    fn id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        "Test plugin"
    }

    fn provided_features(&self) -> Vec<Feature> {
        vec![Feature::new(Uuid::nil(), "Nothing")]
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn initialize(&mut self) -> Result<()> {
        self.initialized.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::plugin("no backend"));
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.shut_down.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hooks contributing one bundled plugin.
#[derive(Debug)]
struct BundledHooks;

impl ApplicationHooks for BundledHooks {
    fn additional_plugins(&self, _app: &Application) -> Vec<Box<dyn Plugin>> {
        vec![Box::new(TestPlugin::new(true, false))]
    }
}

fn app_with(args: &[&str]) -> Application {
    Application::new()
        .with_short_name("lifecycle-test")
        .with_arguments(args.iter().copied())
}

// ─────────────────────────────────────────────────────────
// Lifecycle
// ─────────────────────────────────────────────────────────

#[test]
fn test_event_sequence_for_start_and_stop() {
    let app = app_with(&[]);
    let log = Rc::new(EventLog::default());
    app.add_observer(log.clone());

    app.start().unwrap();
    assert_eq!(app.stop(0), StopOutcome::Stopped);

    assert_eq!(
        *log.labels.borrow(),
        vec![
            "initialized",
            "before_activated",
            "activated",
            "after_activated",
            "started",
            "before_shutdown",
            "shutdown",
            "stopped",
        ]
    );
}

#[test]
fn test_help_flag_prints_usage_and_skips_activation() {
    let app = app_with(&["--help"]);
    let log = Rc::new(EventLog::default());
    app.add_observer(log.clone());

    assert_eq!(app.start().unwrap(), HELP_EXIT_CODE);
    assert_eq!(*log.labels.borrow(), vec!["initialized"]);
    assert!(app.usage().contains("--activation-type"));
}

#[test]
fn test_activation_type_parsed_case_insensitively() {
    let seen = Rc::new(Cell::new(None));

    #[derive(Debug)]
    struct Capture(Rc<Cell<Option<ApplicationActivationType>>>);

    impl ApplicationHooks for Capture {
        fn on_activation(&self, _app: &Application, phase: ActivationPhase, e: &mut ActivationEventArgs) {
            if phase == ActivationPhase::Before {
                self.0.set(Some(e.activation_type));
            }
        }
    }

    let app = app_with(&["-A", "PROTOCOL"]).with_hooks(Capture(seen.clone()));
    app.start().unwrap();
    assert_eq!(seen.get(), Some(ApplicationActivationType::Protocol));
}

#[test]
fn test_start_without_short_name_fails() {
    let app = Application::new().with_arguments(Vec::<String>::new());
    let err = app.start().unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert_eq!(app.state(), LifecycleState::Uninitialized);
}

// ─────────────────────────────────────────────────────────
// Plugins
// ─────────────────────────────────────────────────────────

#[test]
fn test_plugins_initialized_once_and_shut_down_on_stop() {
    let app = app_with(&[]);
    let good = TestPlugin::new(true, false);
    let failing = TestPlugin::new(true, true);
    let unsupported = TestPlugin::new(false, false);

    let (good_id, failing_id) = (good.id, failing.id);
    let good_init = good.initialized.clone();
    let good_down = good.shut_down.clone();
    let failing_init = failing.initialized.clone();

    assert!(app.register_plugin(Box::new(good)));
    assert!(app.register_plugin(Box::new(failing)));
    assert!(app.register_plugin(Box::new(unsupported)));

    app.start().unwrap();
    app.stop(0);
    app.start().unwrap();

    assert_eq!(good_init.load(Ordering::SeqCst), 2);
    assert_eq!(good_down.load(Ordering::SeqCst), 1);
    assert_eq!(failing_init.load(Ordering::SeqCst), 1);
    assert_eq!(
        app.plugin_registry().state(failing_id),
        Some(PluginState::Failed)
    );
    assert_eq!(
        app.plugin_registry().state(good_id),
        Some(PluginState::Initialized)
    );

    // the unsupported plugin is registered but not listed
    assert_eq!(app.plugins().len(), 2);
    assert_eq!(app.plugin_registry().len(), 3);
}

#[test]
fn test_additional_plugins_loaded_once() {
    let app = app_with(&[]).with_hooks(BundledHooks);

    assert_eq!(app.plugins().len(), 1);
    assert_eq!(app.plugins().len(), 1);
    app.start().unwrap();
    assert_eq!(app.plugin_registry().len(), 1);
}
