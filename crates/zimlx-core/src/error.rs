//! Error types for ZimLX core.

use std::path::PathBuf;

use crate::dispatch::LogicalThread;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for ZimLX core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Dispatch-related error.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Package lookup error.
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    /// Icon reload error.
    #[error("Icon reload error: {0}")]
    IconReload(#[from] IconReloadError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while moving work between logical threads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The looper stopped before the submitted work produced a result.
    #[error("Interrupted while waiting for the {thread} thread")]
    Interrupted { thread: LogicalThread },

    /// The submitted work panicked while running on the target thread.
    #[error("Work on the {thread} thread failed: {message}")]
    Invocation {
        thread: LogicalThread,
        message: String,
    },

    /// The looper has quit and no longer accepts work.
    #[error("Looper '{name}' is no longer accepting work")]
    Closed { name: String },

    /// The operating system refused to create the looper thread.
    #[error("Failed to spawn looper thread '{name}': {message}")]
    Spawn { name: String, message: String },
}

impl DispatchError {
    /// Create an invocation error from a panic payload.
    pub fn from_panic(thread: LogicalThread, payload: &(dyn std::any::Any + Send)) -> Self {
        Self::Invocation {
            thread,
            message: panic_message(payload),
        }
    }
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

/// Package manager lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackageError {
    /// No package with this name is installed for the queried user.
    #[error("Package '{0}' not found")]
    NameNotFound(String),

    /// The caller is not allowed to query the package.
    #[error("Access to package '{0}' denied")]
    Denied(String),
}

/// Errors raised by the icon reload fan-out.
#[derive(Debug, thiserror::Error)]
pub enum IconReloadError {
    /// The launcher model refused the package reload for a user.
    #[error("Failed to reload packages for user {user}: {message}")]
    Model { user: u32, message: String },

    /// An individual icon could not be reloaded.
    #[error("Failed to reload icon for '{package}' (user {user}): {message}")]
    Icon {
        package: String,
        user: u32,
        message: String,
    },

    /// A package referenced by the reload could not be resolved.
    #[error(transparent)]
    Package(#[from] PackageError),

    /// Scheduling the fan-out or its follow-up failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl IconReloadError {
    /// Create an icon error.
    pub fn icon(package: impl Into<String>, user: u32, message: impl Into<String>) -> Self {
        Self::Icon {
            package: package.into(),
            user,
            message: message.into(),
        }
    }

    /// Create a model error.
    pub fn model(user: u32, message: impl Into<String>) -> Self {
        Self::Model {
            user,
            message: message.into(),
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parse error.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
