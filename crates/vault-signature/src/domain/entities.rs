//! # Domain Entities
//!
//! Core data structures for signer recovery.

use super::errors::SignatureError;
use serde::{Deserialize, Serialize};

/// Ethereum-style address derived from public key (last 20 bytes of keccak256(pubkey))
pub type Address = [u8; 20];

/// 32-byte digest.
pub type Hash = [u8; 32];

/// Length of a serialized `r || s || v` signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// ECDSA signature on the secp256k1 curve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
    /// Recovery id, 27 or 28
    pub v: u8,
}

impl EcdsaSignature {
    /// Parse a 65-byte `r || s || v` signature.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::InvalidLength(bytes.len()));
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);

        Ok(Self { r, s, v: bytes[64] })
    }

    /// Serialize as `r || s || v`.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }
}
