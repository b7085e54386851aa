//! # Vault Signature Recovery
//!
//! Recovers the signing identity behind an account-abstraction operation.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure cryptographic logic, no I/O
//! - **Test Helpers** (`test_helpers`): Key generation and personal-sign
//!   signing, compiled for tests or with the `test-helpers` feature
//!
//! ## Recovery Rules
//!
//! - The 32-byte operation digest is wrapped in the EIP-191 personal-sign
//!   prefix before recovery
//! - Signatures are exactly 65 bytes: `r (32) || s (32) || v (1)`
//! - **Malleability Prevention (EIP-2)**: Signatures with high S values are rejected
//! - R and S must lie in `[1, n-1]`; v must be 27 or 28
//!
//! Every malformed input is reported as a [`SignatureError`] so callers can
//! turn it into a soft rejection instead of a fault.

pub mod domain;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export public API
pub use domain::ecdsa::{address_from_pubkey, keccak256, recover_address};
pub use domain::eip191::{recover_personal_signer, to_eth_signed_message_hash, PERSONAL_SIGN_PREFIX};
pub use domain::entities::{Address, EcdsaSignature, Hash, SIGNATURE_LENGTH};
pub use domain::errors::SignatureError;
