//! # Selector Policy
//!
//! Static table deciding which signers may authorize each vault function
//! when it is routed through the entry point.

use crate::domain::value_objects::Selector;
use serde::{Deserialize, Serialize};

/// `sendMessageToWallet(string)`.
pub const SEND_MESSAGE_SELECTOR: Selector = Selector([0x7f, 0x22, 0x58, 0x36]);

/// `execute(address,uint256,bytes)`.
pub const EXECUTE_SELECTOR: Selector = Selector([0xb6, 0x1d, 0x27, 0xf6]);

/// Who may sign an operation targeting a given selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Any successfully recovered signer.
    AnySigned,
    /// Only a signer equal to the owner.
    OwnerOnly,
    /// Never valid.
    Rejected,
}

/// Selectors the vault accepts through the entry point.
pub const SELECTOR_POLICY: [(Selector, Permission); 2] = [
    (SEND_MESSAGE_SELECTOR, Permission::AnySigned),
    (EXECUTE_SELECTOR, Permission::OwnerOnly),
];

/// Permission class for `selector`; unknown selectors are [`Permission::Rejected`].
#[must_use]
pub fn classify(selector: Selector) -> Permission {
    SELECTOR_POLICY
        .iter()
        .find(|(known, _)| *known == selector)
        .map_or(Permission::Rejected, |(_, permission)| *permission)
}
