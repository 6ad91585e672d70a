//! Core value types for Lumen transactions: the action tagged union and
//! token amount handling.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{ACTION_FUNCTION_CALL, ACTION_TRANSFER, TOKEN_DECIMALS};

/// A token amount in the smallest indivisible unit (`10^-24` LUMEN).
///
/// Always an integer — no floating point anywhere near money. `u128` because
/// 24-decimal precision overflows `u64` at a fraction of one token.
pub type Balance = u128;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A single effect requested by a transaction.
///
/// On the wire this is a tagged union: a one-byte discriminant (fixed by the
/// schema version, see [`crate::config`]) followed by the variant's payload.
/// List order inside a transaction is preserved and semantically significant —
/// the ledger executes actions in the order they were serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Move `deposit` smallest-units from sender to receiver.
    Transfer {
        /// Amount in the smallest unit.
        deposit: Balance,
    },
    /// Invoke a method on the contract deployed at the receiver account.
    FunctionCall {
        /// Exported method name on the receiver's contract.
        method_name: String,
        /// Opaque argument bytes; by convention JSON, but the ledger does
        /// not care and neither do we.
        args: Vec<u8>,
        /// Gas budget for the call.
        gas: u64,
        /// Tokens attached to the call, in the smallest unit.
        deposit: Balance,
    },
}

impl Action {
    /// Shorthand for a plain transfer.
    pub fn transfer(deposit: Balance) -> Self {
        Self::Transfer { deposit }
    }

    /// Shorthand for a contract call.
    pub fn function_call(
        method_name: impl Into<String>,
        args: Vec<u8>,
        gas: u64,
        deposit: Balance,
    ) -> Self {
        Self::FunctionCall {
            method_name: method_name.into(),
            args,
            gas,
            deposit,
        }
    }

    /// The one-byte wire discriminant for this variant.
    pub const fn discriminant(&self) -> u8 {
        match self {
            Self::Transfer { .. } => ACTION_TRANSFER,
            Self::FunctionCall { .. } => ACTION_FUNCTION_CALL,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer { deposit } => write!(f, "Transfer({})", format_amount(*deposit)),
            Self::FunctionCall { method_name, .. } => write!(f, "FunctionCall({})", method_name),
        }
    }
}

// ---------------------------------------------------------------------------
// Amount parsing / formatting
// ---------------------------------------------------------------------------

/// Errors from parsing a human-entered token amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// Not a decimal number (empty, stray characters, multiple dots).
    #[error("malformed amount: {input:?}")]
    Malformed { input: String },

    /// More fractional digits than the token's 24-decimal precision.
    #[error("too many decimal places: {got} (max {TOKEN_DECIMALS})")]
    TooPrecise { got: usize },

    /// The amount does not fit in a `u128`.
    #[error("amount overflows u128")]
    Overflow,
}

/// Parses a whole-token decimal string into smallest units.
///
/// `"1"` becomes `10^24`, `"0.5"` becomes `5 * 10^23`. Thousands separators
/// (commas) are tolerated and stripped. At most [`TOKEN_DECIMALS`] fractional
/// digits are accepted; more is an error rather than silent truncation —
/// nobody gets to lose dust to a rounding decision we made for them.
///
/// # Examples
///
/// ```
/// use lumen_signer::transaction::parse_amount;
///
/// assert_eq!(parse_amount("1").unwrap(), 1_000_000_000_000_000_000_000_000);
/// assert_eq!(parse_amount("0.000001").unwrap(), 1_000_000_000_000_000_000);
/// ```
pub fn parse_amount(input: &str) -> Result<Balance, AmountError> {
    let cleaned = input.replace(',', "");
    let malformed = || AmountError::Malformed {
        input: input.to_string(),
    };

    let (whole, frac) = match cleaned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (cleaned.as_str(), ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(malformed());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }
    if frac.len() > TOKEN_DECIMALS as usize {
        return Err(AmountError::TooPrecise { got: frac.len() });
    }

    // whole * 10^24 + frac right-padded to 24 digits.
    let whole_part: Balance = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::Overflow)?
    };
    let frac_scaled: Balance = if frac.is_empty() {
        0
    } else {
        let parsed: Balance = frac.parse().map_err(|_| AmountError::Overflow)?;
        parsed * 10u128.pow(TOKEN_DECIMALS - frac.len() as u32)
    };

    whole_part
        .checked_mul(10u128.pow(TOKEN_DECIMALS))
        .and_then(|w| w.checked_add(frac_scaled))
        .ok_or(AmountError::Overflow)
}

/// Formats a smallest-unit balance as a whole-token decimal string,
/// trimming trailing fractional zeros. The inverse of [`parse_amount`].
pub fn format_amount(amount: Balance) -> String {
    let divisor = 10u128.pow(TOKEN_DECIMALS);
    let whole = amount / divisor;
    let frac = amount % divisor;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{:0>width$}", frac, width = TOKEN_DECIMALS as usize);
    format!("{}.{}", whole, frac_str.trim_end_matches('0'))
}
