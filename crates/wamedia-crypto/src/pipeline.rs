//! Decryption pipeline orchestration
//!
//! Each stage sits behind a trait so the pipeline can be assembled once at
//! startup with explicit components. The standard stack is
//! [`HkdfKeyDeriver`], [`HmacVerifier`], [`Sha256Verifier`] and
//! [`Aes256CbcDecryptor`].
//!
//! Stage order is fixed and short-circuits on the first failure:
//!
//! ```text
//! expected digest? ── DigestVerifier ──┐
//!                                      ▼
//! media key ─────────── KeyDeriver → DerivedKeys
//!                                      │ iv, mac_key
//!                                      ▼
//! blob ──────────────── MacVerifier → authenticated ciphertext
//!                                      │ iv, cipher_key
//!                                      ▼
//!                       BlockDecryptor → plaintext
//! ```

use crate::{
    cipher::decrypt_cbc,
    error::Result,
    integrity::check_digest,
    keys::{DerivedKeys, MediaKey, derive_keys},
    mac::{MacSuffix, verify_mac},
    media_type::MediaType,
};

/// Expands a media key into per-blob subkeys.
pub trait KeyDeriver: Send + Sync {
    /// Derive the subkeys for `media_type`. Must be deterministic.
    fn derive(&self, media_key: &MediaKey, media_type: MediaType) -> DerivedKeys;
}

/// Authenticates a blob and strips its MAC trailer.
pub trait MacVerifier: Send + Sync {
    /// Returns the ciphertext portion only if the trailer verifies.
    fn verify<'a>(&self, blob: &'a [u8], keys: &DerivedKeys) -> Result<&'a [u8]>;
}

/// Checks a caller-supplied digest of the whole blob.
pub trait DigestVerifier: Send + Sync {
    /// Compare `blob` against `expected`.
    fn check(&self, blob: &[u8], expected: &[u8]) -> Result<()>;
}

/// Decrypts authenticated ciphertext.
pub trait BlockDecryptor: Send + Sync {
    /// Decrypt and unpad. Only ever called with MAC-verified ciphertext.
    fn decrypt(&self, ciphertext: &[u8], keys: &DerivedKeys) -> Result<Vec<u8>>;
}

/// HKDF-SHA256 key expansion.
#[derive(Debug, Clone, Copy, Default)]
pub struct HkdfKeyDeriver;

impl KeyDeriver for HkdfKeyDeriver {
    fn derive(&self, media_key: &MediaKey, media_type: MediaType) -> DerivedKeys {
        derive_keys(media_key, media_type)
    }
}

/// HMAC-SHA256 trailer verification with a fixed suffix length.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacVerifier {
    suffix: MacSuffix,
}

impl HmacVerifier {
    /// Verifier for the given trailer length.
    pub fn new(suffix: MacSuffix) -> Self {
        Self { suffix }
    }

    /// Configured trailer length.
    pub fn suffix(&self) -> MacSuffix {
        self.suffix
    }
}

impl MacVerifier for HmacVerifier {
    fn verify<'a>(&self, blob: &'a [u8], keys: &DerivedKeys) -> Result<&'a [u8]> {
        verify_mac(blob, keys.iv(), keys.mac_key(), self.suffix)
    }
}

/// SHA-256 file digest check.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Verifier;

impl DigestVerifier for Sha256Verifier {
    fn check(&self, blob: &[u8], expected: &[u8]) -> Result<()> {
        check_digest(blob, expected)
    }
}

/// AES-256-CBC with PKCS#7.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes256CbcDecryptor;

impl BlockDecryptor for Aes256CbcDecryptor {
    fn decrypt(&self, ciphertext: &[u8], keys: &DerivedKeys) -> Result<Vec<u8>> {
        decrypt_cbc(ciphertext, keys.cipher_key(), keys.iv())
    }
}

/// Inputs for a single decryption call.
#[derive(Clone, Copy)]
pub struct DecryptRequest<'a> {
    /// Encrypted blob as received (`ciphertext || mac`)
    pub blob: &'a [u8],
    /// Raw media key bytes (must be 32)
    pub media_key: &'a [u8],
    /// Media category selecting the HKDF info string
    pub media_type: MediaType,
    /// Optional SHA-256 of the whole blob
    pub expected_digest: Option<&'a [u8]>,
}

impl<'a> DecryptRequest<'a> {
    /// Request without a digest check.
    pub fn new(blob: &'a [u8], media_key: &'a [u8], media_type: MediaType) -> Self {
        Self { blob, media_key, media_type, expected_digest: None }
    }

    /// Also check the blob against `digest` before decrypting.
    pub fn with_expected_digest(mut self, digest: &'a [u8]) -> Self {
        self.expected_digest = Some(digest);
        self
    }
}

impl std::fmt::Debug for DecryptRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptRequest")
            .field("blob_len", &self.blob.len())
            .field("media_type", &self.media_type)
            .field("expected_digest", &self.expected_digest.is_some())
            .finish_non_exhaustive()
    }
}

/// The assembled decryption pipeline.
///
/// Stateless: `decrypt` takes `&self`, and every intermediate buffer is owned
/// by the call, so one instance can serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct MediaDecryptor<
    K = HkdfKeyDeriver,
    M = HmacVerifier,
    D = Sha256Verifier,
    C = Aes256CbcDecryptor,
> {
    key_deriver: K,
    mac_verifier: M,
    digest_verifier: D,
    decryptor: C,
}

impl MediaDecryptor {
    /// Standard components with the default (full) MAC trailer.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Standard components with an explicit MAC trailer length.
    pub fn with_mac_suffix(suffix: MacSuffix) -> Self {
        Self::new(HkdfKeyDeriver, HmacVerifier::new(suffix), Sha256Verifier, Aes256CbcDecryptor)
    }
}

impl<K, M, D, C> MediaDecryptor<K, M, D, C>
where
    K: KeyDeriver,
    M: MacVerifier,
    D: DigestVerifier,
    C: BlockDecryptor,
{
    /// Assemble a pipeline from explicit components.
    pub fn new(key_deriver: K, mac_verifier: M, digest_verifier: D, decryptor: C) -> Self {
        Self { key_deriver, mac_verifier, digest_verifier, decryptor }
    }

    /// Run the full pipeline on one blob.
    ///
    /// # Errors
    ///
    /// The first failing stage's error. No later stage runs after a failure,
    /// and no partial plaintext is ever returned.
    pub fn decrypt(&self, request: &DecryptRequest<'_>) -> Result<Vec<u8>> {
        if let Some(expected) = request.expected_digest {
            self.digest_verifier.check(request.blob, expected)?;
        }

        let media_key = MediaKey::from_slice(request.media_key)?;
        let keys = self.key_deriver.derive(&media_key, request.media_type);
        drop(media_key);

        let ciphertext = self.mac_verifier.verify(request.blob, &keys)?;

        self.decryptor.decrypt(ciphertext, &keys)
    }
}

/// Decrypt one blob with the standard pipeline.
///
/// Equivalent to `MediaDecryptor::standard().decrypt(..)`.
pub fn decrypt_media(
    blob: &[u8],
    media_key: &[u8],
    media_type: MediaType,
    expected_digest: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let request = DecryptRequest { blob, media_key, media_type, expected_digest };
    MediaDecryptor::standard().decrypt(&request)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::MediaError;

    #[derive(Default)]
    struct CountingDecryptor {
        calls: AtomicUsize,
    }

    impl BlockDecryptor for CountingDecryptor {
        fn decrypt(&self, ciphertext: &[u8], keys: &DerivedKeys) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Aes256CbcDecryptor.decrypt(ciphertext, keys)
        }
    }

    #[derive(Default)]
    struct CountingDeriver {
        calls: AtomicUsize,
    }

    impl KeyDeriver for CountingDeriver {
        fn derive(&self, media_key: &MediaKey, media_type: MediaType) -> DerivedKeys {
            self.calls.fetch_add(1, Ordering::SeqCst);
            HkdfKeyDeriver.derive(media_key, media_type)
        }
    }

    #[test]
    fn short_key_never_reaches_derivation() {
        let pipeline = MediaDecryptor::new(
            CountingDeriver::default(),
            HmacVerifier::default(),
            Sha256Verifier,
            CountingDecryptor::default(),
        );

        let request = DecryptRequest::new(&[0u8; 64], &[0u8; 31], MediaType::Image);
        let result = pipeline.decrypt(&request);

        assert_eq!(result, Err(MediaError::InvalidKeyLength { expected: 32, actual: 31 }));
        assert_eq!(pipeline.key_deriver.calls.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.decryptor.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn digest_mismatch_stops_before_derivation() {
        let pipeline = MediaDecryptor::new(
            CountingDeriver::default(),
            HmacVerifier::default(),
            Sha256Verifier,
            CountingDecryptor::default(),
        );

        let digest = [0u8; 32];
        let request = DecryptRequest::new(&[0u8; 64], &[0u8; 32], MediaType::Image)
            .with_expected_digest(&digest);

        assert_eq!(pipeline.decrypt(&request), Err(MediaError::DigestMismatch));
        assert_eq!(pipeline.key_deriver.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_blob_is_malformed() {
        let result = decrypt_media(&[], &[0u8; 32], MediaType::Image, None);
        assert_eq!(result, Err(MediaError::MalformedBlob { len: 0, required: 32 }));
    }

    #[test]
    fn with_mac_suffix_configures_verifier() {
        let pipeline = MediaDecryptor::with_mac_suffix(MacSuffix::Truncated);
        assert_eq!(pipeline.mac_verifier.suffix(), MacSuffix::Truncated);

        let request = DecryptRequest::new(&[0u8; 9], &[0u8; 32], MediaType::Audio);
        let result = pipeline.decrypt(&request);
        assert_eq!(result, Err(MediaError::MalformedBlob { len: 9, required: 10 }));
    }

    #[test]
    fn pipeline_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MediaDecryptor>();
    }
}
