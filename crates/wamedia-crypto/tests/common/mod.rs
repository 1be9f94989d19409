//! Companion encryptor for tests.
//!
//! Builds blobs the way a sending client does so decryption can be checked
//! end to end. Not part of the library API.

#![allow(dead_code)]

use aes::Aes256;
use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use wamedia_crypto::{MacSuffix, MediaKey, MediaType, compute_tag, derive_keys};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// Encrypt `plaintext` and append the MAC trailer.
pub fn encrypt_media(
    plaintext: &[u8],
    media_key: &[u8; 32],
    media_type: MediaType,
    suffix: MacSuffix,
) -> Vec<u8> {
    let keys = derive_keys(&MediaKey::new(*media_key), media_type);

    let mut blob = Aes256CbcEnc::new(keys.cipher_key().into(), keys.iv().into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let tag = compute_tag(keys.mac_key(), keys.iv(), &blob);
    blob.extend_from_slice(&tag[..suffix.size()]);
    blob
}

/// Media key with bytes `0, 1, .., 31`.
pub fn sequential_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    for (i, byte) in key.iter_mut().enumerate() {
        *byte = i as u8;
    }
    key
}
