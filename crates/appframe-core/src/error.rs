//! Application error types with rich context

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Framework error types organized by layer/domain
///
/// Unknown command ids, unknown setting names and unknown context ids are
/// not errors: lookups return `None` and dispatch is a silent no-op.
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ─────────────────────────────────────────────────────────────
    // Settings Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Settings error: {message}")]
    Settings { message: String },

    #[error("Setting value rejected for '{name}': {reason}")]
    SettingValue { name: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Plugin Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Plugin error: {message}")]
    Plugin { message: String },

    #[error("Failed to initialize plugin '{title}': {reason}")]
    PluginInit { title: String, reason: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings {
            message: message.into(),
        }
    }

    pub fn setting_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SettingValue {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn plugin(message: impl Into<String>) -> Self {
        Self::Plugin {
            message: message.into(),
        }
    }

    /// Create a [`Error::PluginInit`] error for a plugin that failed to start.
    pub fn plugin_init(title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PluginInit {
            title: title.into(),
            reason: reason.into(),
        }
    }

    /// Errors a caller can log and replace with defaults, such as a
    /// malformed settings file.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Settings { .. }
                | Error::SettingValue { .. }
                | Error::Plugin { .. }
                | Error::PluginInit { .. }
                | Error::TomlParse(_)
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::invalid_argument("must specify a short name for the application");
        assert_eq!(
            err.to_string(),
            "Invalid argument: must specify a short name for the application"
        );

        let err = Error::plugin_init("Spell Checker", "dictionary missing");
        assert!(err.to_string().contains("Spell Checker"));
        assert!(err.to_string().contains("dictionary missing"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_toml() {
        let parse_err = toml::from_str::<toml::Table>("not = = valid").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::TomlParse(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::settings("test").is_recoverable());
        assert!(Error::setting_value("Theme", "not a choice").is_recoverable());
        assert!(Error::plugin("test").is_recoverable());
        assert!(!Error::invalid_argument("test").is_recoverable());
        assert!(!Error::config("bad").is_recoverable());
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::from(io).is_recoverable());
    }

    #[test]
    fn test_result_ext_preserves_error() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = res.context("writing settings").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
