//! Error types for the runtime
//!
//! Every recoverable failure inside the engine (missing image, bad colour
//! string, drawing backend hiccup) is logged where it happens and never
//! reaches the frame loop. The types here exist for the places where an error
//! does cross a boundary: loading configuration, resolving assets, rejecting a
//! deferred value, and handing a script failure back to the host.

use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by a handler supplied by the compiled program.
///
/// Script errors are not recovered by the engine: they halt scheduling and are
/// returned to the host for reporting.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ScriptError {
    pub message: String,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        ScriptError {
            message: message.into(),
        }
    }
}

impl From<String> for ScriptError {
    fn from(message: String) -> Self {
        ScriptError { message }
    }
}

impl From<&str> for ScriptError {
    fn from(message: &str) -> Self {
        ScriptError::new(message)
    }
}

/// Errors while resolving, loading or playing an asset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssetError {
    /// Path escapes the project asset root (`..` or absolute)
    #[error("asset path not allowed: {0}")]
    InvalidPath(String),

    #[error("asset not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Backend could not decode or upload the asset
    #[error("could not load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("no figure with id {0}")]
    MissingFigure(u64),

    #[error("audio playback failed for {}: {reason}", path.display())]
    Playback { path: PathBuf, reason: String },
}

/// A colour string that none of the supported notations accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid colour: {0:?}")]
pub struct ColorError(pub String);

/// A failure reported by a drawing backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("render error: {0}")]
pub struct RenderError(pub String);

impl From<String> for RenderError {
    fn from(message: String) -> Self {
        RenderError(message)
    }
}

/// Errors while reading the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level error surfaced by [`Engine`](crate::Engine) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// A per-frame, key or collision handler failed; scheduling has halted.
    #[error("script error: {0}")]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    /// The operation needs a drawing surface and none is attached.
    #[error("no drawing surface attached")]
    SurfaceMissing,
}
