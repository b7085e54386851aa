//! # secp256k1 Signer Recovery
//!
//! Recovers the address behind a signature over a prehashed message.
//!
//! A signature is screened before any curve arithmetic:
//!
//! | Check | Failure |
//! |-------|---------|
//! | `r`, `s` in `[1, n-1]` | [`SignatureError::InvalidFormat`] |
//! | `s <= n/2` (EIP-2) | [`SignatureError::MalleableSignature`] |
//! | `v` in `{27, 28}` | [`SignatureError::InvalidRecoveryId`] |
//!
//! Range checks are constant-time (`subtle`); recovery itself is `k256`.

use super::entities::{Address, EcdsaSignature, Hash};
use super::errors::SignatureError;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

/// Group order `n`, big-endian.
const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// `(n - 1) / 2 + 1`: the smallest high-S value.
const HIGH_S_FLOOR: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA1,
];

/// Recovers the signer of a 32-byte digest.
pub fn recover_address(digest: &Hash, signature: &EcdsaSignature) -> Result<Address, SignatureError> {
    let recovery_id = check_components(signature)?;

    let mut compact = Zeroizing::new([0u8; 64]);
    compact[..32].copy_from_slice(&signature.r);
    compact[32..].copy_from_slice(&signature.s);
    let parsed = Signature::from_slice(compact.as_slice()).map_err(|_| SignatureError::InvalidFormat)?;

    let key = VerifyingKey::recover_from_prehash(digest, &parsed, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;
    Ok(address_from_pubkey(&key))
}

/// Screens `r`, `s` and `v`, returning the normalised recovery id.
fn check_components(signature: &EcdsaSignature) -> Result<RecoveryId, SignatureError> {
    let in_range = is_nonzero(&signature.r) & below(&signature.r, &CURVE_ORDER)
        & is_nonzero(&signature.s)
        & below(&signature.s, &CURVE_ORDER);
    if !bool::from(in_range) {
        return Err(SignatureError::InvalidFormat);
    }
    if !is_low_s(&signature.s) {
        return Err(SignatureError::MalleableSignature);
    }

    let parity = match signature.v {
        27 => false,
        28 => true,
        v => return Err(SignatureError::InvalidRecoveryId(v)),
    };
    Ok(RecoveryId::new(parity, false))
}

/// True when `s` is in the lower half of the group order.
fn is_low_s(s: &[u8; 32]) -> bool {
    below(s, &HIGH_S_FLOOR).into()
}

/// Constant-time `a < b` over big-endian 256-bit integers.
fn below(a: &[u8; 32], b: &[u8; 32]) -> Choice {
    let mut lt = Choice::from(0u8);
    let mut decided = Choice::from(0u8);

    for (x, y) in a.iter().zip(b) {
        let differs = !x.ct_eq(y);
        lt |= !decided & differs & Choice::from(u8::from(x < y));
        decided |= differs;
    }
    lt
}

fn is_nonzero(scalar: &[u8; 32]) -> Choice {
    !scalar.ct_eq(&[0u8; 32])
}

// =============================================================================
// HASHING
// =============================================================================

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Keccak256::digest(data));
    hash
}

/// Address of a public key: the last 20 bytes of the Keccak-256 of its
/// uncompressed encoding, tag byte excluded.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let point = public_key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

// =============================================================================
// UNIT TESTS
// =============================================================================
