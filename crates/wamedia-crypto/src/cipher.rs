//! AES-256-CBC decryption with PKCS#7 unpadding

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, KeyIvInit, block_padding::Pkcs7};
use zeroize::Zeroize;

use crate::error::{MediaError, Result};

type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Decrypt authenticated ciphertext.
///
/// Only call this on ciphertext returned by [`crate::verify_mac`].
///
/// # Errors
///
/// - `InvalidCiphertextLength`: empty or not a multiple of 16
/// - `PaddingError`: final block padding is invalid
pub fn decrypt_cbc(ciphertext: &[u8], cipher_key: &[u8; 32], iv: &[u8; 16]) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(MediaError::InvalidCiphertextLength { len: ciphertext.len() });
    }

    let mut buf = ciphertext.to_vec();
    let decryptor = Aes256CbcDec::new(cipher_key.into(), iv.into());

    let plaintext_len = match decryptor.decrypt_padded_mut::<Pkcs7>(&mut buf) {
        Ok(plaintext) => plaintext.len(),
        Err(_) => {
            buf.zeroize();
            return Err(MediaError::PaddingError);
        },
    };

    buf.truncate(plaintext_len);
    Ok(buf)
}
