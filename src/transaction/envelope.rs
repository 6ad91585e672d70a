//! The signed-transaction envelope and its transport encoding.
//!
//! A [`SignedTransaction`] is the bundle actually submitted to the network:
//! the unsigned transaction followed by its signature as a tagged-union
//! field, serialized under the same canonical rules as the transaction
//! itself. The envelope bytes are then base64-encoded (standard alphabet,
//! padded) for the JSON-RPC `broadcast_tx_commit` call — decoding the
//! transport string reconstructs the exact envelope bytes, always.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::builder::Transaction;
use super::serialize::{
    CanonicalDecode, CanonicalEncode, CanonicalReader, CanonicalWriter, SchemaError,
};
use crate::crypto::LumenSignature;

/// Failures turning a transport string back into an envelope.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The payload is not valid standard-alphabet base64.
    #[error("invalid base64 transport payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes do not parse as a signed-transaction envelope.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A transaction plus the signature proving its sender authorized it.
///
/// Built once per signing attempt, encoded immediately, not reused.
/// `encode()` is deterministic for the same (transaction, signature) pair —
/// resubmitting an envelope produces byte-identical wire data, which is what
/// lets the ledger deduplicate retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: LumenSignature,
}

impl SignedTransaction {
    pub fn new(transaction: Transaction, signature: LumenSignature) -> Self {
        Self {
            transaction,
            signature,
        }
    }

    /// Serializes the envelope to its canonical wire bytes.
    ///
    /// Fails with [`SchemaError`] if either half does not fit the schema
    /// (notably a signature body that is not 64 bytes) — nothing partial is
    /// ever returned.
    pub fn encode(&self) -> Result<Vec<u8>, SchemaError> {
        self.to_canonical_bytes()
    }

    /// Exact inverse of [`encode`](Self::encode): rejects truncated input,
    /// trailing bytes, and unknown discriminants.
    pub fn decode(bytes: &[u8]) -> Result<Self, SchemaError> {
        Self::from_canonical_bytes(bytes)
    }

    /// Encodes the envelope and applies the transport encoding: standard
    /// base64, padded. The returned string is the single parameter of a
    /// `broadcast_tx_commit` call.
    pub fn to_transport_string(&self) -> Result<String, SchemaError> {
        Ok(BASE64.encode(self.encode()?))
    }

    /// Decodes a transport string back into the envelope.
    pub fn from_transport_string(payload: &str) -> Result<Self, TransportError> {
        let bytes = BASE64.decode(payload)?;
        Ok(Self::decode(&bytes)?)
    }
}

impl CanonicalEncode for SignedTransaction {
    fn encode(&self, w: &mut CanonicalWriter) -> Result<(), SchemaError> {
        self.transaction.encode(w)?;
        self.signature.encode(w)
    }
}

impl CanonicalDecode for SignedTransaction {
    fn decode(r: &mut CanonicalReader<'_>) -> Result<Self, SchemaError> {
        Ok(Self {
            transaction: Transaction::decode(r)?,
            signature: LumenSignature::decode(r)?,
        })
    }
}
