//! Overridable application behavior
//!
//! An [`crate::Application`] owns exactly one [`ApplicationHooks`]
//! implementation. Hooks customize what the application itself does (its
//! startup, shutdown, extra commands and contexts); observers only react to
//! it. Every method has a default, so an implementation overrides just the
//! hooks it needs.

use std::fmt;

use appframe_core::prelude::*;
use appframe_core::Command;
use uuid::Uuid;

use crate::application::Application;
use crate::context::Context;
use crate::lifecycle::{
    ActivationEventArgs, ActivationPhase, CancelEventArgs, InstallationStatus,
};
use crate::plugin::Plugin;

pub trait ApplicationHooks: fmt::Debug {
    /// Runs once, the first time `initialize` succeeds.
    ///
    /// An error leaves the application uninitialized.
    fn initialize(&self, _app: &Application) -> Result<()> {
        Ok(())
    }

    /// Runs for each activation phase of `start`, before observers.
    fn on_activation(
        &self,
        _app: &Application,
        _phase: ActivationPhase,
        _e: &mut ActivationEventArgs,
    ) {
    }

    /// Last chance to cancel a `stop`, after `BeforeShutdown` observers.
    fn on_stopping(&self, _app: &Application, _e: &mut CancelEventArgs) {}

    /// Application-specific shutdown work. Not cancellable.
    fn stop(&self, _app: &Application, _exit_code: i32) {}

    fn on_stopped(&self, _app: &Application) {}

    /// Supply a command that is not in the global collection.
    ///
    /// Consulted by `find_command` after the global commands and before the
    /// active contexts.
    fn find_command(&self, _app: &Application, _command_id: &str) -> Option<Command> {
        None
    }

    /// Supply a context that is not in the active collection.
    ///
    /// Consulted by `find_context` before the active contexts.
    fn find_context(&self, _app: &Application, _context_id: Uuid) -> Option<Context> {
        None
    }

    /// Called after a command's enabled flag changed.
    fn on_command_enabled_changed(&self, _app: &Application, _command: &Command) {}

    /// Plugins bundled with the application, registered before the first
    /// `start`.
    fn additional_plugins(&self, _app: &Application) -> Vec<Box<dyn Plugin>> {
        Vec::new()
    }

    fn installation_status(&self, _app: &Application) -> InstallationStatus {
        InstallationStatus::Unknown
    }
}

/// Hooks with every default in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl ApplicationHooks for DefaultHooks {}
