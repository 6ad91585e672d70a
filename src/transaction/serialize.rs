//! Canonical transaction serialization — the load-bearing invariant of the
//! whole crate.
//!
//! The signer signs the SHA-256 digest of exactly these bytes, and every
//! downstream verifier re-derives exactly these bytes to check the
//! signature. One logical transaction value maps to one byte sequence,
//! byte-for-byte, forever. serde/JSON is deliberately not used here: field
//! ordering and number formatting are not guaranteed across serde formats,
//! and "usually the same bytes" is worth nothing to a signature.
//!
//! ## Encoding rules (schema v1)
//!
//! - Fixed-width integers are little-endian.
//! - Strings are u32-length-prefixed UTF-8.
//! - Variable-length lists are u32-count-prefixed, elements in order.
//! - Tagged unions (actions, key types) are a one-byte discriminant
//!   followed by the variant payload. Discriminant values live in
//!   [`crate::config`] and are fixed by the schema version.
//! - Block hashes and public key bodies are raw fixed 32-byte runs,
//!   no prefix.
//!
//! Anything that cannot be encoded losslessly under these rules fails with
//! [`SchemaError`] *before* a signature is ever computed over it.

use thiserror::Error;

use super::builder::Transaction;
use super::types::{Action, Balance};
use crate::config::{BLOCK_HASH_LENGTH, SIGNATURE_LENGTH, VERIFYING_KEY_LENGTH};
use crate::crypto::{KeyType, LumenPublicKey, LumenSignature};

/// A value that does not fit the canonical schema, or bytes that do not
/// parse under it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A string field longer than the u32 length prefix can express.
    #[error("string field of {len} bytes exceeds the u32 length prefix")]
    StringTooLong { len: usize },

    /// A list with more elements than the u32 count prefix can express.
    #[error("list of {len} elements exceeds the u32 count prefix")]
    ListTooLong { len: usize },

    /// A signature body that is not exactly 64 bytes. Caught at encode
    /// time so a malformed signature can never reach the wire.
    #[error("signature body must be {SIGNATURE_LENGTH} bytes, got {len}")]
    SignatureLength { len: usize },

    /// The input ended before the field being decoded was complete.
    #[error("unexpected end of input: wanted {wanted} more bytes, {remaining} remain")]
    UnexpectedEof { wanted: usize, remaining: usize },

    /// Bytes were left over after a complete top-level value was decoded.
    #[error("{count} trailing bytes after a complete value")]
    TrailingBytes { count: usize },

    /// A tagged-union discriminant outside the schema version's table.
    #[error("unknown {what} discriminant: {value}")]
    UnknownDiscriminant { what: &'static str, value: u8 },

    /// A length-prefixed string whose body is not valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Append-only byte sink implementing the schema's primitive encodings.
#[derive(Default)]
pub struct CanonicalWriter {
    buf: Vec<u8>,
}

impl CanonicalWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the writer and returns the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u128(&mut self, value: Balance) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Raw bytes with no prefix — for fixed-width fields like block hashes.
    pub fn write_fixed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// u32-length-prefixed byte run.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SchemaError> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| SchemaError::StringTooLong { len: bytes.len() })?;
        self.write_u32(len);
        self.write_fixed(bytes);
        Ok(())
    }

    /// u32-length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> Result<(), SchemaError> {
        self.write_bytes(value.as_bytes())
    }

    /// u32-count-prefixed list, elements encoded in order.
    pub fn write_list<T: CanonicalEncode>(&mut self, items: &[T]) -> Result<(), SchemaError> {
        let count = u32::try_from(items.len())
            .map_err(|_| SchemaError::ListTooLong { len: items.len() })?;
        self.write_u32(count);
        for item in items {
            item.encode(self)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Cursor over canonical bytes, the exact mirror of [`CanonicalWriter`].
pub struct CanonicalReader<'a> {
    input: &'a [u8],
}

impl<'a> CanonicalReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], SchemaError> {
        if self.input.len() < n {
            return Err(SchemaError::UnexpectedEof {
                wanted: n,
                remaining: self.input.len(),
            });
        }
        let (head, tail) = self.input.split_at(n);
        self.input = tail;
        Ok(head)
    }

    pub fn read_u8(&mut self) -> Result<u8, SchemaError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, SchemaError> {
        Ok(u32::from_le_bytes(self.read_fixed::<4>()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, SchemaError> {
        Ok(u64::from_le_bytes(self.read_fixed::<8>()?))
    }

    pub fn read_u128(&mut self) -> Result<Balance, SchemaError> {
        Ok(u128::from_le_bytes(self.read_fixed::<16>()?))
    }

    pub fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N], SchemaError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, SchemaError> {
        let len = self.read_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    pub fn read_string(&mut self) -> Result<String, SchemaError> {
        String::from_utf8(self.read_bytes()?).map_err(|_| SchemaError::InvalidUtf8)
    }

    pub fn read_list<T: CanonicalDecode>(&mut self) -> Result<Vec<T>, SchemaError> {
        let count = self.read_u32()? as usize;
        // No preallocation by claimed count: a hostile length prefix should
        // fail on EOF, not allocate gigabytes first.
        let mut items = Vec::new();
        for _ in 0..count {
            items.push(T::decode(self)?);
        }
        Ok(items)
    }

    /// Asserts the input was fully consumed.
    pub fn finish(self) -> Result<(), SchemaError> {
        if self.input.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::TrailingBytes {
                count: self.input.len(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Encode / Decode traits
// ---------------------------------------------------------------------------

/// Deterministic encoding into the canonical byte format.
pub trait CanonicalEncode {
    fn encode(&self, w: &mut CanonicalWriter) -> Result<(), SchemaError>;

    /// Convenience: encode into a fresh buffer.
    fn to_canonical_bytes(&self) -> Result<Vec<u8>, SchemaError> {
        let mut w = CanonicalWriter::new();
        self.encode(&mut w)?;
        Ok(w.into_bytes())
    }
}

/// Exact inverse of [`CanonicalEncode`].
pub trait CanonicalDecode: Sized {
    fn decode(r: &mut CanonicalReader<'_>) -> Result<Self, SchemaError>;

    /// Decodes a complete top-level value, rejecting trailing bytes.
    fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, SchemaError> {
        let mut r = CanonicalReader::new(bytes);
        let value = Self::decode(&mut r)?;
        r.finish()?;
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Schema impls
// ---------------------------------------------------------------------------

impl CanonicalEncode for LumenPublicKey {
    fn encode(&self, w: &mut CanonicalWriter) -> Result<(), SchemaError> {
        w.write_u8(self.key_type().to_u8());
        w.write_fixed(self.as_bytes());
        Ok(())
    }
}

impl CanonicalDecode for LumenPublicKey {
    fn decode(r: &mut CanonicalReader<'_>) -> Result<Self, SchemaError> {
        let tag = r.read_u8()?;
        KeyType::from_u8(tag).ok_or(SchemaError::UnknownDiscriminant {
            what: "key type",
            value: tag,
        })?;
        let bytes = r.read_fixed::<VERIFYING_KEY_LENGTH>()?;
        Ok(Self::from_bytes(bytes))
    }
}

impl CanonicalEncode for LumenSignature {
    fn encode(&self, w: &mut CanonicalWriter) -> Result<(), SchemaError> {
        let bytes = self.as_bytes();
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SchemaError::SignatureLength { len: bytes.len() });
        }
        w.write_u8(self.key_type().to_u8());
        w.write_fixed(bytes);
        Ok(())
    }
}

impl CanonicalDecode for LumenSignature {
    fn decode(r: &mut CanonicalReader<'_>) -> Result<Self, SchemaError> {
        let tag = r.read_u8()?;
        KeyType::from_u8(tag).ok_or(SchemaError::UnknownDiscriminant {
            what: "key type",
            value: tag,
        })?;
        let bytes = r.read_fixed::<SIGNATURE_LENGTH>()?;
        Ok(Self::from_bytes(bytes))
    }
}

impl CanonicalEncode for Action {
    fn encode(&self, w: &mut CanonicalWriter) -> Result<(), SchemaError> {
        w.write_u8(self.discriminant());
        match self {
            Action::Transfer { deposit } => {
                w.write_u128(*deposit);
            }
            Action::FunctionCall {
                method_name,
                args,
                gas,
                deposit,
            } => {
                w.write_string(method_name)?;
                w.write_bytes(args)?;
                w.write_u64(*gas);
                w.write_u128(*deposit);
            }
        }
        Ok(())
    }
}

impl CanonicalDecode for Action {
    fn decode(r: &mut CanonicalReader<'_>) -> Result<Self, SchemaError> {
        let tag = r.read_u8()?;
        match tag {
            t if t == crate::config::ACTION_TRANSFER => Ok(Action::Transfer {
                deposit: r.read_u128()?,
            }),
            t if t == crate::config::ACTION_FUNCTION_CALL => Ok(Action::FunctionCall {
                method_name: r.read_string()?,
                args: r.read_bytes()?,
                gas: r.read_u64()?,
                deposit: r.read_u128()?,
            }),
            value => Err(SchemaError::UnknownDiscriminant {
                what: "action",
                value,
            }),
        }
    }
}

impl CanonicalEncode for Transaction {
    /// Wire layout: `sender_id`, `public_key`, `receiver_id`, `nonce`,
    /// `actions`, `block_hash` — in that order, always.
    fn encode(&self, w: &mut CanonicalWriter) -> Result<(), SchemaError> {
        w.write_string(&self.sender_id)?;
        self.public_key.encode(w)?;
        w.write_string(&self.receiver_id)?;
        w.write_u64(self.nonce);
        w.write_list(&self.actions)?;
        w.write_fixed(&self.block_hash);
        Ok(())
    }
}

impl CanonicalDecode for Transaction {
    fn decode(r: &mut CanonicalReader<'_>) -> Result<Self, SchemaError> {
        Ok(Self {
            sender_id: r.read_string()?,
            public_key: LumenPublicKey::decode(r)?,
            receiver_id: r.read_string()?,
            nonce: r.read_u64()?,
            actions: r.read_list()?,
            block_hash: r.read_fixed::<BLOCK_HASH_LENGTH>()?,
        })
    }
}
