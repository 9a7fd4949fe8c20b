//! Error types for the dirpanel crate.

use thiserror::Error;

use crate::placement::Placement;

/// Result type alias using dirpanel's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dirpanel operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing the configuration file failed.
    #[error("configuration I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted configuration could not be encoded or decoded.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// No mapping with the given id exists.
    #[error("mapping not found: {0}")]
    MappingNotFound(String),

    /// The command id is not registered by any plugin.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A plugin for this placement is already registered.
    #[error("placement {0} already has a plugin")]
    PlacementTaken(Placement),

    /// Plugin not found with the given ID.
    #[error("plugin not found: {0}")]
    PluginNotFound(u64),
}

/// Failures reported by a [`MarkupRenderer`](crate::MarkupRenderer).
///
/// These never escape a panel refresh; they are logged and replaced by a
/// placeholder in the content region.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The markup could not be parsed.
    #[error("malformed markup: {0}")]
    Malformed(String),

    /// A resource referenced by the markup (an embedded note, say) is unavailable.
    #[error("resource unavailable: {0}")]
    Resource(String),

    /// Any other renderer failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
