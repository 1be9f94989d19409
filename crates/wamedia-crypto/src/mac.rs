//! Blob authentication using HMAC-SHA256
//!
//! An encrypted blob is `ciphertext || mac`, where `mac` is the leading
//! [`MacSuffix::size`] bytes of `HMAC-SHA256(mac_key, iv || ciphertext)`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{MediaError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Full HMAC-SHA256 output length
pub const FULL_MAC_SIZE: usize = 32;

/// Truncated tag length seen in some clients
pub const TRUNCATED_MAC_SIZE: usize = 10;

/// Length of the MAC trailer appended to the ciphertext.
///
/// This is a protocol constant: pick one per deployment and use it for every
/// call. [`MacSuffix::Full`] is the default. [`MacSuffix::Truncated`] matches
/// a 10-byte variant that has not been confirmed against real traffic and
/// must be verified before it is turned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MacSuffix {
    /// Full 32-byte HMAC-SHA256 digest
    #[default]
    Full,
    /// First 10 bytes of the digest (unconfirmed)
    Truncated,
}

impl MacSuffix {
    /// Trailer length in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Full => FULL_MAC_SIZE,
            Self::Truncated => TRUNCATED_MAC_SIZE,
        }
    }
}

/// A blob split into its ciphertext and MAC trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobLayout<'a> {
    /// Everything before the trailer
    pub ciphertext: &'a [u8],
    /// The trailing tag
    pub mac: &'a [u8],
}

/// Split a blob at `len - suffix.size()`.
///
/// # Errors
///
/// - `MalformedBlob`: blob is shorter than the suffix
pub fn split_blob(blob: &[u8], suffix: MacSuffix) -> Result<BlobLayout<'_>> {
    let required = suffix.size();
    let Some(ciphertext_len) = blob.len().checked_sub(required) else {
        return Err(MediaError::MalformedBlob { len: blob.len(), required });
    };

    let (ciphertext, mac) = blob.split_at(ciphertext_len);
    Ok(BlobLayout { ciphertext, mac })
}

fn keyed_mac(mac_key: &[u8; 32], iv: &[u8; 16], ciphertext: &[u8]) -> HmacSha256 {
    let Ok(mut mac) = HmacSha256::new_from_slice(mac_key) else {
        unreachable!("HMAC-SHA256 accepts any key size");
    };
    mac.update(iv);
    mac.update(ciphertext);
    mac
}

/// Compute `HMAC-SHA256(mac_key, iv || ciphertext)`.
pub fn compute_tag(mac_key: &[u8; 32], iv: &[u8; 16], ciphertext: &[u8]) -> [u8; FULL_MAC_SIZE] {
    let result = keyed_mac(mac_key, iv, ciphertext).finalize().into_bytes();

    let mut tag = [0u8; FULL_MAC_SIZE];
    tag.copy_from_slice(&result);
    tag
}

/// Verify a blob's trailer and return the authenticated ciphertext.
///
/// The tag comparison is constant time and reports nothing beyond
/// match/mismatch.
///
/// # Errors
///
/// - `MalformedBlob`: blob is shorter than the suffix
/// - `MacVerificationFailed`: wrong key or tampered blob
pub fn verify_mac<'a>(
    blob: &'a [u8],
    iv: &[u8; 16],
    mac_key: &[u8; 32],
    suffix: MacSuffix,
) -> Result<&'a [u8]> {
    let layout = split_blob(blob, suffix)?;
    let mac = keyed_mac(mac_key, iv, layout.ciphertext);

    let verified = match suffix {
        MacSuffix::Full => mac.verify_slice(layout.mac),
        MacSuffix::Truncated => mac.verify_truncated_left(layout.mac),
    };

    verified.map_err(|_| MediaError::MacVerificationFailed)?;
    Ok(layout.ciphertext)
}
