//! Property-based and scenario tests for the decryption pipeline
//!
//! These tests verify the fundamental invariants:
//!
//! 1. **Round-trip**: decrypt(encrypt(p)) == p for all plaintexts and types
//! 2. **Determinism**: key derivation is referentially transparent
//! 3. **Tamper sensitivity**: any flipped bit is rejected, never decrypted
//! 4. **Ordering**: MAC verification gates decryption; a passing digest
//!    check does not bypass it

mod common;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use common::{encrypt_media, sequential_key};
use proptest::prelude::*;
use wamedia_crypto::{
    Aes256CbcDecryptor, BlockDecryptor, DecryptRequest, DerivedKeys, HkdfKeyDeriver, HmacVerifier,
    MacSuffix, MediaDecryptor, MediaError, MediaKey, MediaType, Result, Sha256Verifier,
    derive_keys, file_sha256,
};

// Decryptor that records how often it is reached
#[derive(Clone, Default)]
struct CountingDecryptor {
    calls: Arc<AtomicUsize>,
}

impl CountingDecryptor {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BlockDecryptor for CountingDecryptor {
    fn decrypt(&self, ciphertext: &[u8], keys: &DerivedKeys) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Aes256CbcDecryptor.decrypt(ciphertext, keys)
    }
}

fn counting_pipeline() -> (
    MediaDecryptor<HkdfKeyDeriver, HmacVerifier, Sha256Verifier, CountingDecryptor>,
    CountingDecryptor,
) {
    let counter = CountingDecryptor::default();
    let pipeline = MediaDecryptor::new(
        HkdfKeyDeriver,
        HmacVerifier::default(),
        Sha256Verifier,
        counter.clone(),
    );
    (pipeline, counter)
}

fn media_type() -> impl Strategy<Value = MediaType> {
    prop::sample::select(MediaType::ALL.to_vec())
}

fn key_bytes() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

#[test]
fn corrupted_mac_is_rejected_without_decrypting() {
    let key = sequential_key();
    let mut blob = encrypt_media(b"voice note", &key, MediaType::Audio, MacSuffix::Full);
    let last = blob.len() - 1;
    blob[last] ^= 0xFF;

    let (pipeline, counter) = counting_pipeline();
    let result = pipeline.decrypt(&DecryptRequest::new(&blob, &key, MediaType::Audio));

    assert_eq!(result, Err(MediaError::MacVerificationFailed));
    assert_eq!(counter.calls(), 0, "decryption must not be attempted");
}

#[test]
fn matching_digest_does_not_bypass_mac() {
    let key = sequential_key();
    let mut blob = encrypt_media(b"document body", &key, MediaType::Document, MacSuffix::Full);
    blob[0] ^= 0x01;

    // Digest of the tampered blob, so the integrity check passes
    let digest = file_sha256(&blob);

    let (pipeline, counter) = counting_pipeline();
    let request =
        DecryptRequest::new(&blob, &key, MediaType::Document).with_expected_digest(&digest);

    assert_eq!(pipeline.decrypt(&request), Err(MediaError::MacVerificationFailed));
    assert_eq!(counter.calls(), 0);
}

#[test]
fn valid_blob_reaches_decryptor_once() {
    let key = sequential_key();
    let blob = encrypt_media(b"photo", &key, MediaType::Image, MacSuffix::Full);

    let (pipeline, counter) = counting_pipeline();
    let plaintext = pipeline.decrypt(&DecryptRequest::new(&blob, &key, MediaType::Image)).unwrap();

    assert_eq!(plaintext, b"photo");
    assert_eq!(counter.calls(), 1);
}

#[test]
fn empty_blob_is_malformed() {
    let key = sequential_key();
    let (pipeline, counter) = counting_pipeline();

    let result = pipeline.decrypt(&DecryptRequest::new(&[], &key, MediaType::Video));

    assert_eq!(result, Err(MediaError::MalformedBlob { len: 0, required: 32 }));
    assert_eq!(counter.calls(), 0);
}

#[test]
fn mac_only_blob_has_invalid_ciphertext_length() {
    // A valid tag over an empty ciphertext still cannot be decrypted
    let key = sequential_key();
    let keys = derive_keys(&MediaKey::new(key), MediaType::Image);
    let blob = wamedia_crypto::compute_tag(keys.mac_key(), keys.iv(), &[]);

    let result = wamedia_crypto::decrypt_media(&blob, &key, MediaType::Image, None);
    assert_eq!(result, Err(MediaError::InvalidCiphertextLength { len: 0 }));
}

#[test]
fn key_length_is_checked() {
    let blob = encrypt_media(b"x", &sequential_key(), MediaType::Image, MacSuffix::Full);

    for len in [31usize, 33] {
        let key = vec![7u8; len];
        let result = wamedia_crypto::decrypt_media(&blob, &key, MediaType::Image, None);
        assert_eq!(result, Err(MediaError::InvalidKeyLength { expected: 32, actual: len }));
    }
}

#[test]
fn pipeline_runs_concurrently() {
    let pipeline = Arc::new(MediaDecryptor::standard());

    let handles: Vec<_> = (0u8..8)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            std::thread::spawn(move || {
                let key = [i; 32];
                let plaintext = vec![i; 100 + usize::from(i)];
                let blob = encrypt_media(&plaintext, &key, MediaType::Video, MacSuffix::Full);
                let request = DecryptRequest::new(&blob, &key, MediaType::Video);
                pipeline.decrypt(&request).map(|decrypted| decrypted == plaintext)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(true));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_roundtrip(
        plaintext in prop::collection::vec(any::<u8>(), 0..1000),
        key in key_bytes(),
        media_type in media_type(),
    ) {
        let blob = encrypt_media(&plaintext, &key, media_type, MacSuffix::Full);
        let decrypted = wamedia_crypto::decrypt_media(&blob, &key, media_type, None).unwrap();

        prop_assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn prop_roundtrip_truncated_suffix(
        plaintext in prop::collection::vec(any::<u8>(), 0..256),
        key in key_bytes(),
        media_type in media_type(),
    ) {
        let blob = encrypt_media(&plaintext, &key, media_type, MacSuffix::Truncated);
        let request = DecryptRequest::new(&blob, &key, media_type);
        let decrypted = MediaDecryptor::with_mac_suffix(MacSuffix::Truncated)
            .decrypt(&request)
            .unwrap();

        prop_assert_eq!(decrypted, plaintext);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_derivation_deterministic(key in key_bytes(), media_type in media_type()) {
        let key = MediaKey::new(key);
        let first = derive_keys(&key, media_type);
        let second = derive_keys(&key, media_type);

        prop_assert_eq!(first.iv(), second.iv());
        prop_assert_eq!(first.cipher_key(), second.cipher_key());
        prop_assert_eq!(first.mac_key(), second.mac_key());
    }

    #[test]
    fn prop_bit_flip_in_blob_fails_mac(
        plaintext in prop::collection::vec(any::<u8>(), 0..200),
        key in key_bytes(),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut blob = encrypt_media(&plaintext, &key, MediaType::Image, MacSuffix::Full);
        let index = position.index(blob.len());
        blob[index] ^= 1 << bit;

        let (pipeline, counter) = counting_pipeline();
        let result = pipeline.decrypt(&DecryptRequest::new(&blob, &key, MediaType::Image));

        prop_assert_eq!(result, Err(MediaError::MacVerificationFailed));
        prop_assert_eq!(counter.calls(), 0);
    }

    #[test]
    fn prop_bit_flip_in_key_never_succeeds(
        plaintext in prop::collection::vec(any::<u8>(), 1..200),
        key in key_bytes(),
        position in 0usize..32,
        bit in 0u8..8,
    ) {
        let blob = encrypt_media(&plaintext, &key, MediaType::Audio, MacSuffix::Full);
        let mut wrong_key = key;
        wrong_key[position] ^= 1 << bit;

        let result = wamedia_crypto::decrypt_media(&blob, &wrong_key, MediaType::Audio, None);

        prop_assert!(matches!(
            result,
            Err(MediaError::MacVerificationFailed | MediaError::PaddingError)
        ));
    }
}
