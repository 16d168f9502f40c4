//! Typed errors for the templating core
//!
//! Orchestration code wraps these in `anyhow` with step context; the engine
//! itself reports exactly what went wrong and where.

use std::path::PathBuf;
use std::time::Duration;

/// Result alias for the templating core
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A rule pattern could not be compiled
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A file selector could not be compiled into a glob
    #[error("invalid file selector `{selector}`: {source}")]
    InvalidSelector {
        selector: String,
        #[source]
        source: glob::PatternError,
    },

    /// Reading, writing or moving a file failed
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dependency manifest is not a valid JSON document
    #[error("malformed manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The manifest parsed, but its root is not an object
    #[error("manifest {} must contain a JSON object at its root", path.display())]
    ManifestShape { path: PathBuf },

    /// A derived field references a source that has not been resolved
    #[error("field `{field}` derives from `{source_field}`, which has no value yet")]
    UnresolvedSource { field: String, source_field: String },

    /// A replacement or path references a field the answer set does not hold
    #[error("unknown field `${{{0}}}` in replacement")]
    UnknownField(String),

    /// A recipe failed validation
    #[error("invalid recipe: {0}")]
    Recipe(String),

    /// The recipe YAML could not be parsed
    #[error("failed to parse recipe: {0}")]
    RecipeParse(#[from] serde_yaml::Error),

    /// The repository location is neither a URL nor an existing directory
    #[error("repository `{location}` is neither a URL nor a directory: {reason}")]
    InvalidSource { location: String, reason: String },

    /// An external command ran but exited unsuccessfully
    #[error("`{command}` exited with {status}\n{output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    /// A step exceeded its time budget
    #[error("timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    /// The user asked to leave (exit sentinel or cancelled prompt)
    #[error("cancelled by user")]
    Cancelled,
}

impl Error {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
