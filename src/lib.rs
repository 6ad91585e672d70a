//! # Lumen Signer — Client-Side Transaction Signing
//!
//! This crate is the part of a Lumen wallet that actually matters: it builds,
//! canonically serializes, hashes, and signs a ledger transaction, then wraps
//! it into a transport-ready base64 envelope — all without ever shipping your
//! private key to a remote wallet service. The key stays in your process.
//! That's the whole point.
//!
//! ## Architecture
//!
//! The pipeline is a straight line, and we like it that way:
//!
//! ```text
//! access key query → builder → canonical bytes → SHA-256 → Ed25519 → envelope → base64
//! ```
//!
//! - **crypto** — Ed25519 keypairs and SHA-256 digests. Boring, audited, correct.
//! - **transaction** — Construction, canonical serialization, signing, and the
//!   signed envelope. The byte-exact heart of the crate.
//! - **client** — The JSON-RPC access-key/broadcast collaborator. One query,
//!   one submit, nothing clever.
//! - **pipeline** — Glues the above into a single fail-fast signing attempt.
//! - **config** — Protocol constants and explicit caller-supplied configuration.
//!
//! ## Design Philosophy
//!
//! 1. The canonical byte encoding is owned by this crate, versioned, and
//!    pinned. No deriving it from a third-party SDK's internals.
//! 2. A missing access key is an error, never a fabricated nonce of zero.
//! 3. Every stage either completes or aborts the attempt. No partial envelope
//!    is ever observable.
//! 4. If it touches the signature, it has tests. Plural.

pub mod client;
pub mod config;
pub mod crypto;
pub mod pipeline;
pub mod transaction;

// Re-export the types people actually need so they don't have to memorize
// our module hierarchy.
pub use client::{AccessKeyProvider, AccessKeyState, JsonRpcClient, RpcError};
pub use config::SignerConfig;
pub use crypto::{KeyError, KeyType, LumenKeypair, LumenPublicKey, LumenSignature};
pub use pipeline::{sign_actions, sign_with_config, transfer, PipelineError, SignedPayload, Stage};
pub use transaction::{
    Action, Balance, BuildError, SchemaError, SignedTransaction, Transaction, TransactionBuilder,
};
