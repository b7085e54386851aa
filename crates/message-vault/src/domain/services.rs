//! # Domain Services
//!
//! Pure hashing helpers: selectors, event topics and the operation digest.
//! Deterministic, no I/O.

use crate::domain::entities::UserOperation;
use crate::domain::value_objects::{Address, Hash, Selector, U256};
use sha3::{Digest, Keccak256};

// =============================================================================
// HASHING
// =============================================================================

/// Keccak-256 of `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Hash::new(out)
}

/// Selector of a canonical function signature, e.g. `"ping(uint256)"`.
#[must_use]
pub fn function_selector(signature: &str) -> Selector {
    let hash = keccak256(signature.as_bytes());
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&hash.as_bytes()[..4]);
    Selector(bytes)
}

/// Topic of a canonical event signature.
#[must_use]
pub fn event_topic(signature: &str) -> Hash {
    keccak256(signature.as_bytes())
}

/// Big-endian 32-byte word of `value`.
#[must_use]
pub fn u256_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

// =============================================================================
// OPERATION DIGEST
// =============================================================================

/// `abi.encode` of the operation with its dynamic fields hashed (v0.7 pack).
#[must_use]
pub fn pack_user_op(op: &UserOperation) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 * 32);
    out.extend_from_slice(&op.sender.to_word());
    out.extend_from_slice(&u256_word(op.nonce));
    out.extend_from_slice(keccak256(op.init_code.as_slice()).as_bytes());
    out.extend_from_slice(keccak256(op.call_data.as_slice()).as_bytes());
    out.extend_from_slice(op.account_gas_limits.as_bytes());
    out.extend_from_slice(&u256_word(op.pre_verification_gas));
    out.extend_from_slice(op.gas_fees.as_bytes());
    out.extend_from_slice(keccak256(op.paymaster_and_data.as_slice()).as_bytes());
    out
}

/// Digest an entry point asks the account owner to sign.
///
/// `keccak256(abi.encode(keccak256(pack(op)), entry_point, chain_id))`.
/// The signature field never contributes to the digest.
#[must_use]
pub fn user_op_hash(op: &UserOperation, entry_point: Address, chain_id: u64) -> Hash {
    let inner = keccak256(&pack_user_op(op));

    let mut encoded = [0u8; 96];
    encoded[..32].copy_from_slice(inner.as_bytes());
    encoded[32..64].copy_from_slice(&entry_point.to_word());
    encoded[64..].copy_from_slice(&u256_word(U256::from(chain_id)));
    keccak256(&encoded)
}

// =============================================================================
// TESTS
// =============================================================================
