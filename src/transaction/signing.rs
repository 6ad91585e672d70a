//! Transaction signing: canonical bytes → SHA-256 → Ed25519.
//!
//! Signing is a separate step from building because the keypair may not be
//! available at construction time (hardware wallet, remote signer, tests
//! without key material). The signature covers the SHA-256 digest of
//! [`CanonicalEncode::to_canonical_bytes`] — not the raw bytes — so every
//! verifier must agree on both the byte layout *and* the digest. Both are
//! pinned in [`crate::config`].

use thiserror::Error;

use super::builder::Transaction;
use super::serialize::{CanonicalEncode, SchemaError};
use crate::crypto::{sha256_array, LumenKeypair, LumenSignature};

/// Errors from [`sign_transaction`].
///
/// Only serialization can fail here: key material is validated when the
/// keypair is constructed, and Ed25519 signing over a validated key is
/// infallible. If the transaction fits the schema, you get a signature.
#[derive(Debug, Error)]
pub enum SignError {
    /// The transaction could not be canonically serialized. Nothing was
    /// signed — malformed bytes never reach the keypair.
    #[error("cannot serialize transaction for signing: {0}")]
    Schema(#[from] SchemaError),
}

/// Signs a transaction, returning the signature and the digest it covers.
///
/// The procedure, fixed by schema v1:
///
/// 1. Serialize the transaction into canonical bytes.
/// 2. SHA-256 those bytes into a 32-byte digest (the "transaction hash"
///    the network reports back at submission).
/// 3. Ed25519-sign the digest.
///
/// Deterministic end to end: identical transactions and keypairs always
/// yield identical signature bytes (RFC 8032).
///
/// The caller is responsible for ensuring `keypair` matches
/// `tx.public_key`; the ledger checks it regardless.
pub fn sign_transaction(
    tx: &Transaction,
    keypair: &LumenKeypair,
) -> Result<(LumenSignature, [u8; 32]), SignError> {
    let canonical = tx.to_canonical_bytes()?;
    let digest = sha256_array(&canonical);
    let signature = keypair.sign(&digest);
    Ok((signature, digest))
}
