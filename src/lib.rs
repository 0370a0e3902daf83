//! appframe Library
//!
//! An application framework: named commands dispatched through a stack of
//! contexts, an application lifecycle with cancellable activation and
//! shutdown, command-line parsing, settings and plugins.

pub use appframe_app as app;
pub use appframe_core as core;

// Re-export main entry points
pub use appframe_app::{
    Application, ApplicationHooks, ApplicationObserver, Context, DispatchOutcome,
};
pub use appframe_core::{Command, CommandHandler, Error, NamedParameters, Result};

/// Common imports for applications built on appframe
pub mod prelude {
    pub use appframe_app::{
        ActivationEventArgs, ActivationPhase, Application, ApplicationEvent, ApplicationHooks,
        ApplicationObserver, CancelEventArgs, Context, DispatchOutcome, StopOutcome,
    };
    pub use appframe_core::prelude::*;
    pub use appframe_core::{command_handler, Command, CommandHandler, NamedParameters};
}
