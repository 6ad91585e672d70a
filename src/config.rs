//! # Protocol Constants & Signer Configuration
//!
//! Every magic number in the crate lives here. If you're hardcoding a
//! constant somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! The wire-format constants define byte-exact agreement with the ledger's
//! protocol version. Changing any of them silently produces signatures the
//! network will reject, so they are pinned here rather than left as implicit
//! defaults scattered through the code.

use std::fmt;

// ---------------------------------------------------------------------------
// Canonical Schema
// ---------------------------------------------------------------------------

/// Version of the canonical transaction byte layout implemented by
/// [`crate::transaction::serialize`]. Not itself serialized — the network
/// derives the version from which RPC endpoint you submit to — but every
/// discriminant below is fixed by it.
pub const TRANSACTION_SCHEMA_VERSION: u16 = 1;

/// Tagged-union discriminant for `Action::Transfer`.
pub const ACTION_TRANSFER: u8 = 0;

/// Tagged-union discriminant for `Action::FunctionCall`.
pub const ACTION_FUNCTION_CALL: u8 = 1;

/// Tagged-union discriminant for Ed25519 keys and signatures.
pub const KEY_TYPE_ED25519: u8 = 0;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// The digest computed over the canonical transaction bytes before signing.
/// SHA-256, and only SHA-256 — a different digest here yields a perfectly
/// valid signature over the wrong bytes, which the ledger rejects without
/// telling you why. Pinned, not defaulted.
pub const TRANSACTION_DIGEST_ALGORITHM: &str = "SHA-256";

/// Length of the transaction digest in bytes.
pub const DIGEST_LENGTH: usize = 32;

/// Ed25519 secret key (seed) length in bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Ed25519 public key length in bytes.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes. If yours isn't, something
/// has gone terribly wrong.
pub const SIGNATURE_LENGTH: usize = 64;

/// Block hash length in bytes. The anchor bounding a transaction's
/// validity window is a full 32-byte block hash, base58-encoded on the wire.
pub const BLOCK_HASH_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Token Denomination
// ---------------------------------------------------------------------------

/// Decimal places of the native token. All deposits are `u128` integers in
/// the smallest unit; `1` whole token is `10^24` of them. No floating point
/// anywhere near money.
pub const TOKEN_DECIMALS: u32 = 24;

/// One whole token in the smallest unit.
pub const ONE_TOKEN: u128 = 10u128.pow(TOKEN_DECIMALS);

// ---------------------------------------------------------------------------
// Signer Configuration
// ---------------------------------------------------------------------------

/// Explicit configuration for one signing run.
///
/// Everything a signing attempt needs is passed in here at call time. There
/// are no compiled-in defaults — especially not for `secret_key`. A library
/// that ships with a placeholder secret is a library that ends up on a
/// post-mortem slide.
#[derive(Clone, PartialEq, Eq)]
pub struct SignerConfig {
    /// The sender's secret key as `<algorithm>:<base58-secret>`,
    /// e.g. `ed25519:3KyUuch8...`. See [`crate::crypto::LumenKeypair::from_secret_str`].
    pub secret_key: String,
    /// Account that pays for and authorizes the transaction.
    pub sender_id: String,
    /// Account receiving the transfer or hosting the called contract.
    pub receiver_id: String,
    /// JSON-RPC endpoint URL, e.g. `https://rpc.testnet.lumen.dev`.
    pub endpoint: String,
}

impl SignerConfig {
    /// Assembles a configuration from its four required pieces.
    pub fn new(
        secret_key: impl Into<String>,
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            endpoint: endpoint.into(),
        }
    }
}

impl fmt::Debug for SignerConfig {
    /// Never print secret key material in debug output. Not even "partially."
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerConfig")
            .field("secret_key", &"<redacted>")
            .field("sender_id", &self.sender_id)
            .field("receiver_id", &self.receiver_id)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
