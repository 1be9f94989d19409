//! Fuzz target for the media decryption pipeline
//!
//! Feeds adversarial blobs, keys and digests through `MediaDecryptor`.
//!
//! # Strategy
//!
//! - Keys of every length around 32 bytes
//! - Arbitrary blobs, including ones shorter than the MAC trailer
//! - Forged blobs carrying a valid tag over arbitrary ciphertext, so the
//!   cipher and padding checks see attacker-chosen input
//! - Correct, wrong and wrong-length expected digests
//!
//! # Invariants
//!
//! - The pipeline never panics
//! - Decryption is deterministic
//! - A key of the wrong length is always rejected as such
//! - A wrong digest is rejected before any key work
//! - A validly tagged blob never fails the MAC check
//! - Plaintext is strictly shorter than the ciphertext it came from

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wamedia_crypto::{
    DecryptRequest, MacSuffix, MediaDecryptor, MediaError, MediaType, compute_tag,
    derive_keys_from_slice, file_sha256,
};

#[derive(Debug, Clone, Arbitrary)]
struct DecryptScenario {
    key: KeyInput,
    media_type: u8,
    truncated_suffix: bool,
    blob: BlobInput,
    digest: DigestInput,
}

#[derive(Debug, Clone, Arbitrary)]
enum KeyInput {
    Empty,
    Short([u8; 31]),
    Exact([u8; 32]),
    Long([u8; 33]),
    Arbitrary(Vec<u8>),
}

impl KeyInput {
    fn as_bytes(&self) -> &[u8] {
        match self {
            KeyInput::Empty => &[],
            KeyInput::Short(b) => b,
            KeyInput::Exact(b) => b,
            KeyInput::Long(b) => b,
            KeyInput::Arbitrary(b) => b,
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum BlobInput {
    /// Raw bytes, almost never authentic
    Raw(Vec<u8>),
    /// Ciphertext with a tag computed under the scenario key
    Forged(Vec<u8>),
}

#[derive(Debug, Clone, Arbitrary)]
enum DigestInput {
    None,
    Correct,
    Arbitrary(Vec<u8>),
}

fn forge(ciphertext: &[u8], key: &[u8], media_type: MediaType, suffix: MacSuffix) -> Vec<u8> {
    let Ok(keys) = derive_keys_from_slice(key, media_type) else {
        return ciphertext.to_vec();
    };
    let tag = compute_tag(keys.mac_key(), keys.iv(), ciphertext);

    let mut blob = ciphertext.to_vec();
    blob.extend_from_slice(&tag[..suffix.size()]);
    blob
}

fuzz_target!(|scenario: DecryptScenario| {
    let key = scenario.key.as_bytes();
    let media_type = MediaType::ALL[usize::from(scenario.media_type) % MediaType::ALL.len()];
    let suffix = if scenario.truncated_suffix { MacSuffix::Truncated } else { MacSuffix::Full };

    let (blob, forged) = match &scenario.blob {
        BlobInput::Raw(bytes) => (bytes.clone(), false),
        BlobInput::Forged(ciphertext) => (forge(ciphertext, key, media_type, suffix), true),
    };

    let correct_digest = file_sha256(&blob);
    let digest: Option<&[u8]> = match &scenario.digest {
        DigestInput::None => None,
        DigestInput::Correct => Some(&correct_digest),
        DigestInput::Arbitrary(bytes) => Some(bytes),
    };

    let decryptor = MediaDecryptor::with_mac_suffix(suffix);
    let mut request = DecryptRequest::new(&blob, key, media_type);
    if let Some(digest) = digest {
        request = request.with_expected_digest(digest);
    }

    let result = decryptor.decrypt(&request);

    // Same input, same outcome
    assert_eq!(result, decryptor.decrypt(&request));

    let digest_ok = digest.is_none_or(|d| d == correct_digest.as_slice());
    if !digest_ok {
        assert!(
            matches!(
                result,
                Err(MediaError::DigestMismatch | MediaError::InvalidDigestLength { .. })
            ),
            "wrong digest must be rejected first, got {result:?}"
        );
        return;
    }

    if key.len() != 32 {
        assert!(
            matches!(result, Err(MediaError::InvalidKeyLength { expected: 32, actual }) if actual == key.len()),
            "wrong key length must be rejected, got {result:?}"
        );
        return;
    }

    if forged && blob.len() >= suffix.size() {
        assert_ne!(
            result,
            Err(MediaError::MacVerificationFailed),
            "validly tagged blob failed the MAC check"
        );
    }

    if let Ok(plaintext) = &result {
        assert!(plaintext.len() < blob.len() - suffix.size());
    }
});
