//! # Transaction Module
//!
//! Construction, canonical serialization, signing, and envelope encoding for
//! Lumen transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs     — Action tagged union, token amount parsing/formatting
//! builder.rs   — TransactionBuilder and the unsigned Transaction record
//! serialize.rs — Canonical byte format (the invariant everything hangs on)
//! signing.rs   — serialize → SHA-256 → Ed25519
//! envelope.rs  — SignedTransaction wrapper and base64 transport encoding
//! ```
//!
//! ## One signing attempt
//!
//! 1. **Build** — assemble the record with [`TransactionBuilder`].
//! 2. **Serialize** — [`serialize::CanonicalEncode::to_canonical_bytes`].
//! 3. **Sign** — [`signing::sign_transaction`] over the SHA-256 digest.
//! 4. **Encode** — wrap into a [`SignedTransaction`], base64 it, submit.
//!
//! Strictly linear, fail-fast at every stage; [`crate::pipeline`] drives it.

pub mod builder;
pub mod envelope;
pub mod serialize;
pub mod signing;
pub mod types;

pub use builder::{BuildError, Transaction, TransactionBuilder};
pub use envelope::{SignedTransaction, TransportError};
pub use serialize::{CanonicalDecode, CanonicalEncode, SchemaError};
pub use signing::{sign_transaction, SignError};
pub use types::{format_amount, parse_amount, Action, AmountError, Balance};
