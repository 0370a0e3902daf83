//! Application events and the observer trait that receives them
//!
//! Observers are the extension point for code that reacts to the
//! application without owning it: a UI layer merging a context's menu items
//! when it becomes active, a recent-files tracker saving on shutdown, and so
//! on. Delivery is synchronous and in registration order.

use std::fmt;

use appframe_core::prelude::*;
use uuid::Uuid;

use crate::application::Application;
use crate::lifecycle::{ActivationEventArgs, ActivationPhase, CancelEventArgs};

/// Notifications raised by an [`Application`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationEvent {
    // ─────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────
    /// `initialize` completed for the first time
    Initialized,

    /// All activation phases ran without being cancelled
    Started { first_run: bool, exit_code: i32 },

    /// Shutdown was not cancelled and the shutdown hook ran
    Shutdown { exit_code: i32 },

    /// Shutdown finished
    Stopped { exit_code: i32 },

    // ─────────────────────────────────────────────────────────
    // Contexts
    // ─────────────────────────────────────────────────────────
    /// A context became active
    ContextAdded { context_id: Uuid, name: String },

    /// A context is about to be deactivated; it is still present when this
    /// event is delivered
    ContextRemoved { context_id: Uuid, name: String },

    // ─────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────
    /// A command's enabled flag changed
    CommandEnabledChanged { command_id: String, enabled: bool },
}

impl ApplicationEvent {
    /// Short label for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Started { .. } => "started",
            Self::Shutdown { .. } => "shutdown",
            Self::Stopped { .. } => "stopped",
            Self::ContextAdded { .. } => "context_added",
            Self::ContextRemoved { .. } => "context_removed",
            Self::CommandEnabledChanged { .. } => "command_enabled_changed",
        }
    }
}

/// Receives [`ApplicationEvent`]s and the cancellable lifecycle
/// notifications. Every method except `name` has a no-op default.
///
/// The application is passed back in, so an observer may call any
/// `Application` method, including ones that raise further events.
pub trait ApplicationObserver: fmt::Debug {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Called for every [`ApplicationEvent`].
    ///
    /// Errors are logged and do not interrupt delivery to other observers.
    fn on_event(&self, _app: &Application, _event: &ApplicationEvent) -> Result<()> {
        Ok(())
    }

    /// Called at the start of `stop`. Setting `cancel` keeps the
    /// application running.
    fn on_before_shutdown(&self, _app: &Application, _e: &mut CancelEventArgs) {}

    /// Called for each activation phase during `start`.
    fn on_activation(
        &self,
        _app: &Application,
        _phase: ActivationPhase,
        _e: &mut ActivationEventArgs,
    ) {
    }
}
