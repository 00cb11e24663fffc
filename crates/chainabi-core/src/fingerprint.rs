//! Keccak-256 fingerprints of canonical signatures.
//!
//! The topic0 of a non-anonymous event is keccak256 of its signature, e.g.
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
//! A function selector is the first four bytes of the same hash.

use alloy_primitives::B256;
use tiny_keccak::{Hasher, Keccak};

/// keccak256 of an arbitrary byte string.
pub fn keccak256(data: &[u8]) -> B256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    B256::from(output)
}

/// keccak256 of a canonical signature such as `"Name(type1,type2)"`.
pub fn signature_hash(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

/// 4-byte function selector of a canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = signature_hash(signature);
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}
