//! # Key Management
//!
//! Ed25519 keypairs, public keys, and signatures for Lumen accounts.
//!
//! ## Why Ed25519?
//!
//! - Deterministic signatures (no k-value footguns like ECDSA).
//! - 128-bit security level in 32+32 bytes. Compact and sufficient.
//! - Constant-time implementations exist and are well-audited.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (thanks, ed25519-dalek).
//! - Key generation uses OS-level RNG (`OsRng`). If your OS RNG is broken,
//!   you have bigger problems than this signer.
//! - Secret bytes are never logged and never appear in `Debug` output.
//!   If you add logging to this module, you will be asked to leave.
//!
//! ## Wire encoding
//!
//! On the wire, keys and signatures are tagged unions: a one-byte
//! [`KeyType`] discriminant followed by the raw key or signature bytes.
//! In text (config files, RPC parameters) they are
//! `<algorithm>:<base58-bytes>`, e.g. `ed25519:GmaDrpp...`.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::config::{KEY_TYPE_ED25519, SIGNATURE_LENGTH, VERIFYING_KEY_LENGTH};

/// Errors that can occur while parsing or validating key material.
///
/// These are intentionally vague about *why* something failed — leaking
/// details about key material through error messages is a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The `<algorithm>:` prefix is missing or names an unsupported scheme.
    #[error("unknown key type: expected 'ed25519:<base58-secret>'")]
    UnknownKeyType,

    /// The base58 body is malformed or decodes to the wrong length.
    #[error("invalid secret key encoding: not base58 or wrong length")]
    InvalidSecretKey,

    /// The public key bytes do not form a valid Ed25519 point.
    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,

    /// A 64-byte secret carried a public half that does not match the
    /// key derived from its seed.
    #[error("keypair validation failed: embedded public key does not match secret key")]
    KeypairMismatch,
}

// ---------------------------------------------------------------------------
// KeyType
// ---------------------------------------------------------------------------

/// Discriminant for the signature scheme of a key or signature.
///
/// The numeric value is the tagged-union byte written to the wire, fixed by
/// the canonical schema version. Only Ed25519 exists today; the enum is here
/// so adding a second curve is a schema bump, not an archaeology project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Ed25519 over Curve25519. The only sane default.
    Ed25519,
}

impl KeyType {
    /// The one-byte wire discriminant.
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Ed25519 => KEY_TYPE_ED25519,
        }
    }

    /// Parse a wire discriminant back into a key type.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            KEY_TYPE_ED25519 => Some(Self::Ed25519),
            _ => None,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ed25519 => write!(f, "ed25519"),
        }
    }
}

// ---------------------------------------------------------------------------
// LumenKeypair
// ---------------------------------------------------------------------------

/// An account's signing identity: the Ed25519 keypair held locally.
///
/// This is the one piece of long-lived state in the signer. Everything else
/// (transactions, signatures, envelopes) is transient and owned by a single
/// signing attempt; the keypair lives for the process duration.
///
/// ## Serialization
///
/// `LumenKeypair` intentionally does NOT implement `Serialize`/`Deserialize`.
/// Serializing private keys should be a deliberate, conscious act, not
/// something that happens because someone shoved a keypair into a JSON
/// response.
///
/// # Examples
///
/// ```
/// use lumen_signer::crypto::LumenKeypair;
///
/// let kp = LumenKeypair::generate();
/// let sig = kp.sign(b"send 1 LUMEN to b.testnet");
/// assert!(kp.public_key().verify(b"send 1 LUMEN to b.testnet", &sig));
/// ```
pub struct LumenKeypair {
    /// The Ed25519 signing key. 32 bytes of pure responsibility.
    signing_key: SigningKey,
}

/// The public half of an account key, safe to share with the world.
///
/// On the wire this is the tagged union `(key_type: u8, bytes: [32]u8)`.
/// In text it renders as `ed25519:<base58>` — the form the access-key RPC
/// query expects.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LumenPublicKey {
    key_type: KeyType,
    bytes: [u8; VERIFYING_KEY_LENGTH],
}

/// An Ed25519 signature over a transaction digest.
///
/// 64 bytes, deterministic for a given (key, message) pair per RFC 8032 —
/// no nonce management, no randomness needed at signing time.
///
/// Stored as `Vec<u8>` for serde compatibility, but always exactly 64 bytes
/// when produced by this crate. The canonical serializer re-checks the
/// length before writing the envelope, so a truncated signature can never
/// reach the wire.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LumenSignature {
    key_type: KeyType,
    bytes: Vec<u8>,
}

impl LumenKeypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Constructs a keypair deterministically from a 32-byte seed.
    ///
    /// In Ed25519 the 32-byte secret key *is* the seed. Feed this a weak
    /// seed and you get a weak key; use a proper CSPRNG or KDF.
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parses a keypair from its textual secret form:
    /// `<algorithm>:<base58-secret>`.
    ///
    /// Two body lengths are accepted for `ed25519`:
    ///
    /// - **32 bytes** — the raw seed.
    /// - **64 bytes** — seed followed by public key, the credential-file
    ///   export format. The embedded public half is checked against the key
    ///   derived from the seed; a mismatch is rejected rather than silently
    ///   trusting either half.
    ///
    /// # Errors
    ///
    /// [`KeyError::UnknownKeyType`] for a missing or unsupported prefix,
    /// [`KeyError::InvalidSecretKey`] for bad base58 or a body that is
    /// neither 32 nor 64 bytes (an empty secret lands here too), and
    /// [`KeyError::KeypairMismatch`] for an inconsistent 64-byte secret.
    pub fn from_secret_str(secret: &str) -> Result<Self, KeyError> {
        let (scheme, body) = secret.split_once(':').ok_or(KeyError::UnknownKeyType)?;
        if scheme != "ed25519" {
            return Err(KeyError::UnknownKeyType);
        }

        let decoded = bs58::decode(body)
            .into_vec()
            .map_err(|_| KeyError::InvalidSecretKey)?;

        match decoded.len() {
            SECRET_KEY_LENGTH => {
                let mut seed = [0u8; SECRET_KEY_LENGTH];
                seed.copy_from_slice(&decoded);
                Ok(Self::from_seed(&seed))
            }
            len if len == SECRET_KEY_LENGTH + VERIFYING_KEY_LENGTH => {
                let mut seed = [0u8; SECRET_KEY_LENGTH];
                seed.copy_from_slice(&decoded[..SECRET_KEY_LENGTH]);
                let keypair = Self::from_seed(&seed);
                if keypair.public_key_bytes() != decoded[SECRET_KEY_LENGTH..] {
                    return Err(KeyError::KeypairMismatch);
                }
                Ok(keypair)
            }
            _ => Err(KeyError::InvalidSecretKey),
        }
    }

    /// Exports the secret in the same textual form `from_secret_str` parses
    /// (seed-only body). Handle the result with the respect a secret deserves.
    pub fn to_secret_str(&self) -> String {
        format!(
            "ed25519:{}",
            bs58::encode(self.signing_key.to_bytes()).into_string()
        )
    }

    /// Returns the public key associated with this keypair.
    ///
    /// Pure derivation, no side effects. This is what goes into the
    /// transaction record and the access-key query.
    pub fn public_key(&self) -> LumenPublicKey {
        LumenPublicKey {
            key_type: KeyType::Ed25519,
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// The raw 32 public key bytes. Safe to share, log, tattoo on your arm.
    pub fn public_key_bytes(&self) -> [u8; VERIFYING_KEY_LENGTH] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message and return a [`LumenSignature`].
    ///
    /// Deterministic: the same (key, message) pair always produces the same
    /// signature bytes (RFC 8032). The pipeline relies on this for
    /// reproducible golden-vector tests.
    pub fn sign(&self, message: &[u8]) -> LumenSignature {
        let sig = self.signing_key.sign(message);
        LumenSignature {
            key_type: KeyType::Ed25519,
            bytes: sig.to_bytes().to_vec(),
        }
    }
}

impl Clone for LumenKeypair {
    /// Cloning a keypair is allowed but should make you uncomfortable.
    /// Every copy of a private key is another thing to protect.
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for LumenKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output. A partial leak
        // is still a leak, and grepping logs for base58 is trivial.
        write!(f, "LumenKeypair(pub={})", self.public_key())
    }
}

// ---------------------------------------------------------------------------
// LumenPublicKey
// ---------------------------------------------------------------------------

impl LumenPublicKey {
    /// Wraps raw Ed25519 public key bytes without curve validation.
    ///
    /// Use [`try_from_bytes`](Self::try_from_bytes) for untrusted input.
    pub fn from_bytes(bytes: [u8; VERIFYING_KEY_LENGTH]) -> Self {
        Self {
            key_type: KeyType::Ed25519,
            bytes,
        }
    }

    /// Validates that the bytes decompress to a curve point before wrapping
    /// them. Non-decompressible encodings are rejected; note this is point
    /// validation only — low-order points and non-canonical encodings are
    /// still accepted, as they are by every Ed25519 verifier.
    pub fn try_from_bytes(bytes: [u8; VERIFYING_KEY_LENGTH]) -> Result<Self, KeyError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self {
            key_type: KeyType::Ed25519,
            bytes,
        })
    }

    /// The key's scheme tag.
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; VERIFYING_KEY_LENGTH] {
        &self.bytes
    }

    /// Verify a signature over `message` against this key.
    ///
    /// Returns a plain boolean: the vast majority of callers want a yes/no
    /// answer, and signatures that are the wrong length or the wrong scheme
    /// are simply invalid — no panics, no special cases.
    pub fn verify(&self, message: &[u8], signature: &LumenSignature) -> bool {
        if signature.key_type != self.key_type {
            return false;
        }
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig_bytes: [u8; SIGNATURE_LENGTH] = match signature.bytes.as_slice().try_into() {
            Ok(b) => b,
            Err(_) => return false,
        };
        let dalek_sig = DalekSignature::from_bytes(&sig_bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }
}

impl Hash for LumenPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_type.hash(state);
        self.bytes.hash(state);
    }
}

impl fmt::Display for LumenPublicKey {
    /// `ed25519:<base58>` — the exact string the access-key RPC query wants.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.key_type,
            bs58::encode(self.bytes).into_string()
        )
    }
}

impl fmt::Debug for LumenPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LumenPublicKey({})", self)
    }
}

// ---------------------------------------------------------------------------
// LumenSignature
// ---------------------------------------------------------------------------

impl LumenSignature {
    /// Create a signature from its raw 64-byte representation.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self {
            key_type: KeyType::Ed25519,
            bytes: bytes.to_vec(),
        }
    }

    /// The signature's scheme tag.
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// The raw signature bytes (64 for anything this crate produced).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for LumenSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = hex::encode(&self.bytes);
        if h.len() >= 128 {
            write!(f, "LumenSignature({}:{}...{})", self.key_type, &h[..8], &h[120..])
        } else {
            write!(f, "LumenSignature({}:{})", self.key_type, h)
        }
    }
}
