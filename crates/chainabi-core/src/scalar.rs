//! Single-word value conversion.
//!
//! ABI words are always 256 bits wide. Declared widths (`uint8`, `int24`,
//! `fixed128x18`) describe the expected value range only; the decoder reads
//! the whole word and never truncates or rejects out-of-range high bits.

use alloy_primitives::{Address, I256, U256};

use crate::reader::Word;
use crate::types::{TypeKind, FUNCTION_SIZE};
use crate::value::{Decimal, DecodedValue};

/// Decode one word as the scalar `kind`.
///
/// Returns `None` if `kind` is not a single-word scalar; callers dispatch on
/// `TypeNode::is_scalar` first. Never fails for a scalar kind.
pub fn decode_scalar(kind: &TypeKind, word: &Word) -> Option<DecodedValue> {
    let value = match kind {
        TypeKind::Uint(_) => DecodedValue::Uint(unsigned(word)),
        TypeKind::Int(_) => DecodedValue::Int(signed(word)),
        TypeKind::Bool => DecodedValue::Bool(word.iter().any(|b| *b != 0)),
        TypeKind::Address => DecodedValue::Address(Address::from_slice(&word[12..])),
        TypeKind::FixedBytes(n) => DecodedValue::FixedBytes(word[..*n as usize].to_vec()),
        TypeKind::Function => DecodedValue::FixedBytes(word[..FUNCTION_SIZE].to_vec()),
        TypeKind::Fixed { scale, signed: true, .. } => {
            DecodedValue::Decimal(Decimal::from_signed(signed(word), *scale))
        }
        TypeKind::Fixed { scale, signed: false, .. } => {
            DecodedValue::Decimal(Decimal::from_unsigned(unsigned(word), *scale))
        }
        _ => return None,
    };
    Some(value)
}

/// Full word as a big-endian unsigned integer.
pub fn unsigned(word: &Word) -> U256 {
    U256::from_be_bytes(*word)
}

/// Full word as a two's-complement signed integer: if the top bit is set the
/// value is `raw - 2^256`.
pub fn signed(word: &Word) -> I256 {
    I256::from_raw(unsigned(word))
}
