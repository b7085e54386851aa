//! # Signature Errors

use thiserror::Error;

/// Why a signer could not be recovered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Not a 65-byte `r || s || v` encoding.
    #[error("signature must be 65 bytes, got {0}")]
    InvalidLength(usize),

    /// `r` or `s` outside `[1, n-1]`.
    #[error("signature component out of range")]
    InvalidFormat,

    /// `s` in the upper half of the group order.
    #[error("high-S signature is malleable")]
    MalleableSignature,

    /// `v` is not 27 or 28.
    #[error("unsupported recovery id {0}")]
    InvalidRecoveryId(u8),

    /// No public key matches the signature and digest.
    #[error("public key recovery failed")]
    RecoveryFailed,
}
