//! # appframe-core - Core Domain Types
//!
//! Foundation crate for appframe. Provides commands, command items, named
//! parameters, the property bag, error handling and logging.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, serde_json, thiserror, toml, tracing, uuid).
//!
//! ## Public API
//!
//! ### Commands (`command`)
//! - [`Command`] - Named executable action with enabled/visible/checked flags
//! - [`CommandCollection`] - Ordered set of commands keyed by id
//! - [`CommandHandler`] - Shared handler invoked when a command executes
//! - [`CommandEventArgs`] - Arguments passed to handlers
//! - [`PendingDispatch`] - Handlers resolved ahead of invocation
//! - [`StockType`] - Platform-themed command presets
//!
//! ### Command Items (`command_item`)
//! - [`CommandItem`] - Declarative menu/toolbar node with ordering hints
//! - [`CommandItemCollection`] - Ordered item list with hint-aware `merge`
//!
//! ### Property Bag (`property_bag`)
//! - [`PropertyBag`] - UUID-keyed values with change notification
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use appframe_core::prelude::*;
//! ```

pub mod command;
pub mod command_item;
pub mod error;
pub mod logging;
pub mod params;
pub mod property_bag;

/// Prelude for common imports used throughout all appframe crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use command::{
    command_handler, same_handler, Command, CommandCollection, CommandEventArgs, CommandHandler,
    CommandSource, PendingDispatch, StockType,
};
pub use command_item::{ActionCommandItem, CommandItem, CommandItemCollection, CommandItemKind};
pub use error::{Error, Result, ResultExt};
pub use params::NamedParameters;
pub use property_bag::{
    PropertyBag, PropertyBagObserver, PropertyChangedEventArgs, PropertyChangingEventArgs,
    PropertyRequestedEventArgs,
};
