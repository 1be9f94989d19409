//! Base64 decoding for text inputs.
//!
//! Media keys, digests and inline blobs arrive as base64 in either the
//! standard or the URL-safe alphabet, with or without padding.

use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use wamedia_crypto::MediaKey;

use crate::error::CliError;

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a base64 or base64url field.
///
/// `field` names the input in error messages.
pub fn decode_base64(field: &'static str, text: &str) -> Result<Vec<u8>, CliError> {
    let normalized: String = text
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    LENIENT
        .decode(normalized.as_bytes())
        .map_err(|e| CliError::Decode { field, reason: e.to_string() })
}

/// Decode a media key. A well-formed encoding of the wrong length is a
/// [`wamedia_crypto::MediaError::InvalidKeyLength`], not a decode error.
pub fn decode_media_key(text: &str) -> Result<MediaKey, CliError> {
    let mut bytes = decode_base64("mediaKey", text)?;
    let key = MediaKey::from_slice(&bytes);
    bytes.fill(0);
    key.map_err(CliError::from)
}

/// Decode an expected `fileEncSHA256` digest. Its length is checked by the
/// pipeline.
pub fn decode_digest(text: &str) -> Result<Vec<u8>, CliError> {
    decode_base64("fileEncSHA256", text)
}

/// Standard padded base64.
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
