//! Optional file digest check (`fileEncSHA256`)

use sha2::{Digest, Sha256};

use crate::error::{MediaError, Result};

/// SHA-256 digest length
pub const DIGEST_SIZE: usize = 32;

/// SHA-256 over the entire encrypted blob, MAC trailer included.
pub fn file_sha256(blob: &[u8]) -> [u8; DIGEST_SIZE] {
    let result = Sha256::digest(blob);

    let mut digest = [0u8; DIGEST_SIZE];
    digest.copy_from_slice(&result);
    digest
}

/// Compare the blob's SHA-256 against a caller-supplied digest.
///
/// This is defense in depth only; MAC verification still decides whether
/// the blob is decrypted.
///
/// # Errors
///
/// - `InvalidDigestLength`: `expected` is not 32 bytes (never skipped)
/// - `DigestMismatch`: digests differ
pub fn check_digest(blob: &[u8], expected: &[u8]) -> Result<()> {
    let expected: [u8; DIGEST_SIZE] = expected
        .try_into()
        .map_err(|_| MediaError::InvalidDigestLength { actual: expected.len() })?;

    if file_sha256(blob) == expected { Ok(()) } else { Err(MediaError::DigestMismatch) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_of_empty_blob() {
        assert_eq!(
            hex::encode(file_sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn matching_digest_passes() {
        let blob = b"encrypted bytes";
        let digest = file_sha256(blob);
        assert_eq!(check_digest(blob, &digest), Ok(()));
    }

    #[test]
    fn different_blob_fails() {
        let digest = file_sha256(b"encrypted bytes");
        assert_eq!(check_digest(b"encrypted bytez", &digest), Err(MediaError::DigestMismatch));
    }

    #[test]
    fn truncated_digest_is_rejected() {
        let blob = b"encrypted bytes";
        let digest = file_sha256(blob);

        let result = check_digest(blob, &digest[..16]);
        assert_eq!(result, Err(MediaError::InvalidDigestLength { actual: 16 }));

        let result = check_digest(blob, &[]);
        assert_eq!(result, Err(MediaError::InvalidDigestLength { actual: 0 }));
    }
}
