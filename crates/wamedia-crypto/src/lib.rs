//! WhatsApp Media Decryption
//!
//! Decrypts media blobs (images, audio, video, documents, stickers)
//! encrypted under the WhatsApp end-to-end media scheme. Pure functions with
//! no I/O and no shared state: fetching blobs and decoding text inputs are
//! the caller's concern.
//!
//! # Pipeline
//!
//! ```text
//! Media Key (32 bytes) + Media Type
//!        │
//!        ▼
//! HKDF-SHA256 (salt = 0^32, info = "WhatsApp <Type> Keys", L = 112)
//!        │
//!        ├── IV          [0, 16)
//!        ├── Cipher Key  [16, 48)
//!        └── MAC Key     [48, 80)
//!        │
//!        ▼
//! HMAC-SHA256(MAC Key, IV || ciphertext) == trailer ?
//!        │
//!        ▼
//! AES-256-CBC + PKCS#7 → Plaintext
//! ```
//!
//! An optional SHA-256 digest of the whole blob (`fileEncSHA256`) can be
//! checked first.
//!
//! # Security
//!
//! Authenticity:
//! - The MAC trailer is verified in constant time before any decryption
//! - Ciphertext that fails verification is never passed to the cipher
//! - A matching file digest never substitutes for MAC verification
//!
//! Key hygiene:
//! - Derived subkeys live for one call and are zeroized on drop
//! - The unused reference key (bytes [80, 112)) is discarded immediately
//!
//! Failure reporting:
//! - Every failure is a typed [`MediaError`] with a [`ErrorKind`]
//! - No failure path returns partial or empty plaintext

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cipher;
pub mod error;
pub mod integrity;
pub mod keys;
pub mod mac;
pub mod media_type;
pub mod pipeline;

pub use cipher::{BLOCK_SIZE, decrypt_cbc};
pub use error::{ErrorKind, MediaError, Result};
pub use integrity::{DIGEST_SIZE, check_digest, file_sha256};
pub use keys::{
    DerivedKeys, EXPANDED_KEY_SIZE, MEDIA_KEY_SIZE, MediaKey, derive_keys, derive_keys_from_slice,
    expand_media_key,
};
pub use mac::{BlobLayout, MacSuffix, compute_tag, split_blob, verify_mac};
pub use media_type::MediaType;
pub use pipeline::{
    Aes256CbcDecryptor, BlockDecryptor, DecryptRequest, DigestVerifier, HkdfKeyDeriver,
    HmacVerifier, KeyDeriver, MacVerifier, MediaDecryptor, Sha256Verifier, decrypt_media,
};
