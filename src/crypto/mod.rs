//! # Cryptographic Primitives
//!
//! Everything security-related in the signer flows through here: the Ed25519
//! keypair that authorizes transactions and the SHA-256 digest that stands in
//! for the transaction on the signing side.
//!
//! We deliberately chose boring, well-audited cryptography:
//!
//! - **Ed25519** for signatures — deterministic, fast, and nobody has broken it.
//! - **SHA-256** for transaction digests — because the ledger says so, and
//!   byte-exact agreement with the ledger is the entire job.
//!
//! Everything here is a thin, type-safe wrapper around audited
//! implementations. If you're tempted to optimize these functions, please
//! reconsider. Then reconsider again.

pub mod hash;
pub mod keys;

pub use hash::sha256_array;
pub use keys::{KeyError, KeyType, LumenKeypair, LumenPublicKey, LumenSignature};
