// ============================================================================
// error.rs — Error taxonomy for discovery and rendering
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IconError {
    /// No listed candidate and no fallback image in the workspace root.
    /// Fatal for the whole run.
    #[error("no source image found in {}; accepted names: {}", .root.display(), .accepted.join(", "))]
    SourceNotFound { root: PathBuf, accepted: Vec<String> },

    /// The source exists but could not be opened or decoded.
    #[error("cannot decode {}: {source}", .path.display())]
    DecodeFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The destination could not be created or written.
    #[error("cannot write {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The newest-file fallback pattern does not parse. Fatal like
    /// `SourceNotFound`, since discovery cannot run.
    #[error("invalid fallback pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// PNG encoder rejected the buffer. Counted like a write failure.
    #[error("cannot encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type IconResult<T> = Result<T, IconError>;
