//! # Access Control
//!
//! Caller gates, operation validation and actor resolution.
//!
//! Validation and the privileged call that follows it are two separate
//! calls; the [`PendingSigner`](crate::domain::entities::PendingSigner) slot
//! in [`VaultState`] is the only thing carried between them.
//!
//! ## Validation order
//!
//! 1. Caller must be the entry point (hard)
//! 2. `op.sender` must be this vault (hard)
//! 3. Outstanding delegation is cleared
//! 4. Call data must carry a selector (soft)
//! 5. Selector must be known (soft)
//! 6. Signature must recover (soft)
//! 7. `OwnerOnly` selectors need the owner's signature (soft)
//! 8. The recovered signer becomes the pending signer

use crate::domain::entities::{UserOperation, ValidationCode, VaultState};
use crate::domain::policy::{classify, Permission};
use crate::domain::value_objects::{Address, Hash, Selector};
use crate::errors::VaultError;
use vault_signature::SignatureError;

// =============================================================================
// CALLER GATES
// =============================================================================

/// Fails with `OnlyOwner` unless `caller` is the owner.
pub fn require_owner(state: &VaultState, caller: Address) -> Result<(), VaultError> {
    if caller == state.owner {
        Ok(())
    } else {
        Err(VaultError::OnlyOwner { caller })
    }
}

/// Fails with `NotEntryPoint` unless `caller` is the configured entry point.
pub fn require_entry_point(state: &VaultState, caller: Address) -> Result<(), VaultError> {
    if state.is_entry_point(caller) {
        Ok(())
    } else {
        Err(VaultError::NotEntryPoint { caller })
    }
}

/// Resolves who a privileged call acts for.
///
/// The entry point acts for the pending signer if one is outstanding, and
/// the delegation is consumed here before anything else happens. Every
/// other permitted call acts for the owner.
pub fn resolve_actor(state: &mut VaultState, caller: Address) -> Result<Address, VaultError> {
    if state.is_entry_point(caller) {
        if let Some(signer) = state.pending_signer.consume() {
            return Ok(signer);
        }
        return Ok(state.owner);
    }
    if caller == state.owner {
        return Ok(state.owner);
    }
    Err(VaultError::OnlyOwnerOrEntryPoint { caller })
}

// =============================================================================
// OPERATION VALIDATION
// =============================================================================

/// Why a validation came back rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Call data shorter than a selector.
    MissingSelector,
    /// Selector has no permission entry.
    UnknownSelector(Selector),
    /// Signature did not recover.
    BadSignature(SignatureError),
    /// Owner-only selector signed by someone else.
    NotOwner {
        /// Address the signature recovered to.
        signer: Address,
    },
}

/// Result of validating an operation that passed the hard checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Validation {
    /// Signer accepted; now the pending signer.
    Authorized {
        /// Recovered signer.
        signer: Address,
        /// Permission class of the targeted selector.
        permission: Permission,
    },
    /// Soft failure.
    Rejected(Rejection),
}

impl Validation {
    /// Code reported to the entry point.
    #[must_use]
    pub fn code(&self) -> ValidationCode {
        match self {
            Self::Authorized { .. } => ValidationCode::Authorized,
            Self::Rejected(_) => ValidationCode::Rejected,
        }
    }
}

/// Validates `op` on behalf of the vault at `vault`.
///
/// `recover` turns `(op_hash, signature)` into a signer; it is only invoked
/// once the selector is known to be acceptable.
pub fn validate_operation<F>(
    state: &mut VaultState,
    vault: Address,
    caller: Address,
    op: &UserOperation,
    op_hash: &Hash,
    recover: F,
) -> Result<Validation, VaultError>
where
    F: FnOnce(&Hash, &[u8]) -> Result<Address, SignatureError>,
{
    require_entry_point(state, caller)?;
    if op.sender != vault {
        return Err(VaultError::WrongSender { sender: op.sender });
    }

    state.pending_signer.clear();

    let Some(selector) = Selector::from_call_data(op.call_data.as_slice()) else {
        return Ok(Validation::Rejected(Rejection::MissingSelector));
    };

    let permission = classify(selector);
    if permission == Permission::Rejected {
        return Ok(Validation::Rejected(Rejection::UnknownSelector(selector)));
    }

    let signer = match recover(op_hash, op.signature.as_slice()) {
        Ok(signer) => signer,
        Err(err) => return Ok(Validation::Rejected(Rejection::BadSignature(err))),
    };

    if permission == Permission::OwnerOnly && signer != state.owner {
        return Ok(Validation::Rejected(Rejection::NotOwner { signer }));
    }

    state.pending_signer.grant(signer);
    Ok(Validation::Authorized { signer, permission })
}

// =============================================================================
// TESTS
// =============================================================================
