//! Front-end error types.

use std::{fmt, path::PathBuf};

use thiserror::Error;
use wamedia_crypto::{ErrorKind, MediaError};

/// Errors from fetching, decoding, or decrypting a blob.
///
/// [`CliError::Media`] carries the core's cryptographic failures unchanged;
/// every other variant is a boundary failure and never masks one.
#[derive(Debug, Error)]
pub enum CliError {
    /// Decryption pipeline rejected the input.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// A text field is not valid base64.
    #[error("failed to decode {field}: {reason}")]
    Decode {
        /// Which input field
        field: &'static str,
        /// Decoder message
        reason: String,
    },

    /// Blob retrieval failed (network, status, or size limit).
    #[error("failed to fetch {url}: {reason}")]
    Fetch {
        /// Requested URL
        url: String,
        /// What went wrong
        reason: String,
    },

    /// Local file could not be read or written.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Batch manifest is unreadable or an entry is inconsistent.
    #[error("invalid manifest: {0}")]
    Manifest(String),

    /// Some batch items failed; each one is described in the report.
    #[error("{failed} of {total} batch items failed")]
    BatchFailed {
        /// Items that did not decrypt or could not be written
        failed: usize,
        /// Items in the manifest
        total: usize,
    },

    /// Invalid runtime configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unexpected failure (worker task panicked, serialization bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Flat classification of [`CliError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Cryptographic or input failure from the core
    Media(ErrorKind),
    /// See [`CliError::Decode`]
    Decode,
    /// See [`CliError::Fetch`]
    Fetch,
    /// See [`CliError::Io`]
    Io,
    /// See [`CliError::Manifest`]
    Manifest,
    /// See [`CliError::BatchFailed`]
    BatchFailed,
    /// See [`CliError::Config`]
    Config,
    /// See [`CliError::Internal`]
    Internal,
}

impl ErrorClass {
    /// Stable `snake_case` tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Media(kind) => kind.as_str(),
            Self::Decode => "decode_error",
            Self::Fetch => "fetch_error",
            Self::Io => "io_error",
            Self::Manifest => "manifest_error",
            Self::BatchFailed => "batch_failed",
            Self::Config => "config_error",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CliError {
    /// Classification of this error.
    pub fn kind(&self) -> ErrorClass {
        match self {
            Self::Media(err) => ErrorClass::Media(err.kind()),
            Self::Decode { .. } => ErrorClass::Decode,
            Self::Fetch { .. } => ErrorClass::Fetch,
            Self::Io { .. } => ErrorClass::Io,
            Self::Manifest(_) => ErrorClass::Manifest,
            Self::BatchFailed { .. } => ErrorClass::BatchFailed,
            Self::Config(_) => ErrorClass::Config,
            Self::Internal(_) => ErrorClass::Internal,
        }
    }

    /// I/O failure on `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
