//! # Signer Adapter
//!
//! [`SignerRecovery`] over secp256k1 personal-sign recovery.

use crate::domain::value_objects::{Address, Hash};
use crate::ports::outbound::SignerRecovery;
use vault_signature::{recover_personal_signer, SignatureError};

/// Recovers EIP-191 personal-sign signers (65-byte `r || s || v`, low S).
#[derive(Debug, Default, Clone, Copy)]
pub struct EcdsaSignerRecovery;

impl EcdsaSignerRecovery {
    /// Create a new recovery adapter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SignerRecovery for EcdsaSignerRecovery {
    fn recover_signer(&self, digest: &Hash, signature: &[u8]) -> Result<Address, SignatureError> {
        recover_personal_signer(digest.as_bytes(), signature).map(Address::new)
    }
}
