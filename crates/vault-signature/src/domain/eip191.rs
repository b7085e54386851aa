//! # EIP-191 Personal Sign
//!
//! Operation digests are never signed raw: wallets sign
//! `"\x19Ethereum Signed Message:\n32" || digest`, so recovery must re-wrap
//! the digest the same way.

use super::ecdsa::{keccak256, recover_address};
use super::entities::{Address, EcdsaSignature, Hash};
use super::errors::SignatureError;
use tracing::trace;

/// Prefix for a 32-byte personal-sign payload.
pub const PERSONAL_SIGN_PREFIX: &[u8; 28] = b"\x19Ethereum Signed Message:\n32";

/// Wrap a 32-byte digest in the personal-sign prefix and hash it.
pub fn to_eth_signed_message_hash(digest: &Hash) -> Hash {
    let mut payload = [0u8; 60];
    payload[..28].copy_from_slice(PERSONAL_SIGN_PREFIX);
    payload[28..].copy_from_slice(digest);
    keccak256(&payload)
}

/// Recover who personal-signed `digest`.
///
/// `signature` must be the 65-byte `r || s || v` encoding. Every malformed
/// input comes back as an error, never a panic.
pub fn recover_personal_signer(digest: &Hash, signature: &[u8]) -> Result<Address, SignatureError> {
    let parsed = EcdsaSignature::from_bytes(signature)?;
    let wrapped = to_eth_signed_message_hash(digest);

    let signer = recover_address(&wrapped, &parsed)?;
    trace!(signer = ?signer, "recovered personal-sign signer");
    Ok(signer)
}
