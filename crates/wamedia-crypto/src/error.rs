//! Error types for media decryption

use thiserror::Error;

/// Result alias used throughout the decryption pipeline.
pub type Result<T> = std::result::Result<T, MediaError>;

/// Errors from media decryption operations.
///
/// Every variant is terminal for the call: nothing here is transient, so the
/// pipeline never retries. Messages never carry plaintext or the position of
/// a differing byte.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// Media key is not exactly 32 bytes
    #[error("invalid media key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Required key length
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Media type tag is not one of the known categories
    #[error("unsupported media type: {value:?}")]
    UnsupportedMediaType {
        /// The rejected input
        value: String,
    },

    /// Blob is too short to carry the MAC suffix
    #[error("malformed blob: {len} bytes, need at least {required}")]
    MalformedBlob {
        /// Blob length
        len: usize,
        /// Minimum length (the MAC suffix length)
        required: usize,
    },

    /// Recomputed MAC does not match the blob's suffix (wrong key or corrupt blob)
    #[error("mac verification failed")]
    MacVerificationFailed,

    /// Expected file digest does not decode to a SHA-256 digest
    #[error("invalid digest length: expected 32, got {actual}")]
    InvalidDigestLength {
        /// Decoded digest length
        actual: usize,
    },

    /// SHA-256 of the blob does not match the expected digest
    #[error("file digest mismatch")]
    DigestMismatch,

    /// Ciphertext is empty or not a multiple of the AES block size
    #[error("invalid ciphertext length: {len} is not a positive multiple of 16")]
    InvalidCiphertextLength {
        /// Ciphertext length
        len: usize,
    },

    /// PKCS#7 padding on the final block is invalid
    #[error("invalid padding")]
    PaddingError,
}

/// Flat classification of [`MediaError`] for status-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`MediaError::InvalidKeyLength`]
    InvalidKeyLength,
    /// See [`MediaError::UnsupportedMediaType`]
    UnsupportedMediaType,
    /// See [`MediaError::MalformedBlob`]
    MalformedBlob,
    /// See [`MediaError::MacVerificationFailed`]
    MacVerificationFailed,
    /// See [`MediaError::InvalidDigestLength`]
    InvalidDigestLength,
    /// See [`MediaError::DigestMismatch`]
    DigestMismatch,
    /// See [`MediaError::InvalidCiphertextLength`]
    InvalidCiphertextLength,
    /// See [`MediaError::PaddingError`]
    PaddingError,
}

impl ErrorKind {
    /// Stable `snake_case` tag, suitable for structured responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidKeyLength => "invalid_key_length",
            Self::UnsupportedMediaType => "unsupported_media_type",
            Self::MalformedBlob => "malformed_blob",
            Self::MacVerificationFailed => "mac_verification_failed",
            Self::InvalidDigestLength => "invalid_digest_length",
            Self::DigestMismatch => "digest_mismatch",
            Self::InvalidCiphertextLength => "invalid_ciphertext_length",
            Self::PaddingError => "padding_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MediaError {
    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidKeyLength { .. } => ErrorKind::InvalidKeyLength,
            Self::UnsupportedMediaType { .. } => ErrorKind::UnsupportedMediaType,
            Self::MalformedBlob { .. } => ErrorKind::MalformedBlob,
            Self::MacVerificationFailed => ErrorKind::MacVerificationFailed,
            Self::InvalidDigestLength { .. } => ErrorKind::InvalidDigestLength,
            Self::DigestMismatch => ErrorKind::DigestMismatch,
            Self::InvalidCiphertextLength { .. } => ErrorKind::InvalidCiphertextLength,
            Self::PaddingError => ErrorKind::PaddingError,
        }
    }

    /// Returns true if the blob must not be trusted (as opposed to bad input).
    ///
    /// Input errors (key length, media type, digest encoding) mean the
    /// request was wrong. Authentication failures mean the key and blob do
    /// not belong together or the blob was tampered with.
    pub fn is_authentication_failure(&self) -> bool {
        match self {
            Self::MacVerificationFailed | Self::DigestMismatch | Self::PaddingError => true,

            Self::InvalidKeyLength { .. }
            | Self::UnsupportedMediaType { .. }
            | Self::MalformedBlob { .. }
            | Self::InvalidDigestLength { .. }
            | Self::InvalidCiphertextLength { .. } => false,
        }
    }
}
