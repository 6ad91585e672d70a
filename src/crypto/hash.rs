//! # Hashing
//!
//! The signer signs a *digest* of the canonical transaction bytes, not the
//! bytes themselves. The digest function is SHA-256, pinned by
//! [`crate::config::TRANSACTION_DIGEST_ALGORITHM`]. Using any other digest
//! produces a signature that is cryptographically fine and protocol-wise
//! garbage — every downstream verifier re-derives SHA-256 over the same
//! canonical bytes.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input and return a fixed-size array.
///
/// Returns `[u8; 32]` rather than `Vec<u8>` because every caller in this
/// crate wants the fixed-size type: the digest is signed directly and the
/// array propagates naturally through the signing path.
///
/// # Example
///
/// ```
/// use lumen_signer::crypto::sha256_array;
///
/// let digest = sha256_array(b"lumen");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}
