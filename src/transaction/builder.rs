//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] enforces a disciplined construction flow: set
//! the required fields, call `.build()`, and get back an unsigned
//! [`Transaction`] or a validation error. The builder does not sign and does
//! not serialize — that happens in [`super::signing`] and
//! [`super::serialize`]. This separation keeps construction testable without
//! key material or a network.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::Action;
use crate::config::BLOCK_HASH_LENGTH;
use crate::crypto::LumenPublicKey;

/// Validation errors from [`TransactionBuilder::build`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A transaction with no actions does nothing; the ledger rejects it,
    /// so we reject it first.
    #[error("transaction has no actions")]
    EmptyActionList,

    /// Nonce 0 is reserved — valid per-key nonces start at 1, and a zero
    /// here almost always means someone skipped the access-key query.
    #[error("invalid nonce: must be > 0")]
    ZeroNonce,

    /// The access key reported nonce u64::MAX; incrementing would wrap.
    /// This key has signed its last transaction.
    #[error("nonce overflow: access key nonce is already at u64::MAX")]
    NonceOverflow,
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// An unsigned Lumen transaction.
///
/// Built once per submission attempt, consumed by canonical serialization,
/// then discarded. Field order below matches the wire layout exactly (schema
/// v1); see [`super::serialize`] for the byte-level rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Account that authorizes and pays for the transaction.
    pub sender_id: String,
    /// Public key of the access key signing this transaction. Embedded so
    /// the ledger can locate the right access key without guessing.
    pub public_key: LumenPublicKey,
    /// Account the actions apply to.
    pub receiver_id: String,
    /// Replay-protection counter: exactly the access key's last consumed
    /// nonce plus one.
    pub nonce: u64,
    /// Ordered list of effects. Order is semantically significant.
    pub actions: Vec<Action>,
    /// A recently observed block hash, bounding the transaction's validity
    /// window. Too old and the ledger drops the transaction as expired.
    pub block_hash: [u8; BLOCK_HASH_LENGTH],
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`Transaction`]s.
///
/// Pure assembly: no I/O, no mutation of external state, and the two
/// invariants the pipeline depends on — a non-empty action list and a
/// positive nonce — are checked at `build()` time.
///
/// # Usage
///
/// ```
/// use lumen_signer::crypto::LumenKeypair;
/// use lumen_signer::transaction::{Action, TransactionBuilder};
///
/// let kp = LumenKeypair::generate();
/// let tx = TransactionBuilder::new("a.testnet", kp.public_key(), "b.testnet")
///     .nonce(5)
///     .action(Action::transfer(1_000_000))
///     .block_hash([0u8; 32])
///     .build()
///     .unwrap();
/// assert_eq!(tx.nonce, 5);
/// ```
pub struct TransactionBuilder {
    sender_id: String,
    public_key: LumenPublicKey,
    receiver_id: String,
    nonce: u64,
    actions: Vec<Action>,
    block_hash: [u8; BLOCK_HASH_LENGTH],
}

impl TransactionBuilder {
    /// Starts a builder from the three identities every transaction needs.
    pub fn new(
        sender_id: impl Into<String>,
        public_key: LumenPublicKey,
        receiver_id: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            public_key,
            receiver_id: receiver_id.into(),
            nonce: 0,
            actions: Vec::new(),
            block_hash: [0u8; BLOCK_HASH_LENGTH],
        }
    }

    /// Sets the nonce. Must be the access key's current nonce plus one.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Appends a single action, preserving insertion order.
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Replaces the whole action list.
    pub fn actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    /// Sets the recent-block anchor.
    pub fn block_hash(mut self, block_hash: [u8; BLOCK_HASH_LENGTH]) -> Self {
        self.block_hash = block_hash;
        self
    }

    /// Validates and produces the unsigned transaction.
    ///
    /// # Errors
    ///
    /// [`BuildError::EmptyActionList`] if no actions were added,
    /// [`BuildError::ZeroNonce`] if the nonce was never set (or set to 0).
    pub fn build(self) -> Result<Transaction, BuildError> {
        if self.actions.is_empty() {
            return Err(BuildError::EmptyActionList);
        }
        if self.nonce == 0 {
            return Err(BuildError::ZeroNonce);
        }
        Ok(Transaction {
            sender_id: self.sender_id,
            public_key: self.public_key,
            receiver_id: self.receiver_id,
            nonce: self.nonce,
            actions: self.actions,
            block_hash: self.block_hash,
        })
    }
}
