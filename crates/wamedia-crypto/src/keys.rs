//! Media key expansion using HKDF
//!
//! A 32-byte media key is expanded with HKDF-SHA256 into 112 bytes:
//!
//! ```text
//! [0, 16)    IV
//! [16, 48)   AES-256 cipher key
//! [48, 80)   HMAC-SHA256 key
//! [80, 112)  reference key (sidecar validation, unused here)
//! ```

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{
    error::{MediaError, Result},
    media_type::MediaType,
};

/// Media key length in bytes
pub const MEDIA_KEY_SIZE: usize = 32;

/// Total HKDF output length
pub const EXPANDED_KEY_SIZE: usize = 112;

/// Fixed all-zero HKDF salt
const HKDF_SALT: [u8; 32] = [0u8; 32];

const IV_RANGE: std::ops::Range<usize> = 0..16;
const CIPHER_KEY_RANGE: std::ops::Range<usize> = 16..48;
const MAC_KEY_RANGE: std::ops::Range<usize> = 48..80;

/// A 32-byte media key shared alongside an encrypted blob.
#[derive(Clone)]
pub struct MediaKey([u8; MEDIA_KEY_SIZE]);

impl MediaKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; MEDIA_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Copy a key out of a slice, rejecting anything but 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; MEDIA_KEY_SIZE] = bytes.try_into().map_err(|_| {
            MediaError::InvalidKeyLength { expected: MEDIA_KEY_SIZE, actual: bytes.len() }
        })?;
        Ok(Self(key))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; MEDIA_KEY_SIZE] {
        &self.0
    }
}

impl TryFrom<&[u8]> for MediaKey {
    type Error = MediaError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_slice(bytes)
    }
}

impl fmt::Debug for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MediaKey(..)")
    }
}

impl Drop for MediaKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Per-call subkeys derived from a media key.
///
/// Lives for exactly one decryption and is zeroized on drop.
pub struct DerivedKeys {
    iv: [u8; 16],
    cipher_key: [u8; 32],
    mac_key: [u8; 32],
}

impl DerivedKeys {
    /// CBC initialization vector, also the MAC prefix.
    pub fn iv(&self) -> &[u8; 16] {
        &self.iv
    }

    /// AES-256 key.
    pub fn cipher_key(&self) -> &[u8; 32] {
        &self.cipher_key
    }

    /// HMAC-SHA256 key.
    pub fn mac_key(&self) -> &[u8; 32] {
        &self.mac_key
    }
}

impl fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKeys").finish_non_exhaustive()
    }
}

impl Drop for DerivedKeys {
    fn drop(&mut self) {
        self.iv.zeroize();
        self.cipher_key.zeroize();
        self.mac_key.zeroize();
    }
}

/// Expand a media key into the full 112-byte HKDF output.
///
/// Callers normally want [`derive_keys`]; this exists so the raw expansion
/// can be checked against recorded vectors. The caller owns zeroizing the
/// returned buffer.
pub fn expand_media_key(media_key: &MediaKey, media_type: MediaType) -> [u8; EXPANDED_KEY_SIZE] {
    let hkdf = Hkdf::<Sha256>::new(Some(&HKDF_SALT), media_key.as_bytes());

    let mut okm = [0u8; EXPANDED_KEY_SIZE];
    let Ok(()) = hkdf.expand(media_type.info(), &mut okm) else {
        unreachable!("112 bytes is a valid HKDF-SHA256 output length");
    };

    okm
}

/// Derive the IV, cipher key and MAC key for one blob.
///
/// Deterministic: the same `(media_key, media_type)` always yields the same
/// keys. The trailing reference key is dropped and the expansion buffer is
/// zeroized before returning.
pub fn derive_keys(media_key: &MediaKey, media_type: MediaType) -> DerivedKeys {
    let mut okm = expand_media_key(media_key, media_type);

    let mut keys = DerivedKeys { iv: [0u8; 16], cipher_key: [0u8; 32], mac_key: [0u8; 32] };
    keys.iv.copy_from_slice(&okm[IV_RANGE]);
    keys.cipher_key.copy_from_slice(&okm[CIPHER_KEY_RANGE]);
    keys.mac_key.copy_from_slice(&okm[MAC_KEY_RANGE]);

    okm.zeroize();
    keys
}

/// Derive keys from raw bytes, failing before any HKDF work if the length is
/// not 32.
pub fn derive_keys_from_slice(media_key: &[u8], media_type: MediaType) -> Result<DerivedKeys> {
    let media_key = MediaKey::from_slice(media_key)?;
    Ok(derive_keys(&media_key, media_type))
}
