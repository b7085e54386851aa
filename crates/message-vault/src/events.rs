//! # Event Schema
//!
//! Records the vault emits. They are buffered while a call runs and only
//! published once the enclosing transaction commits, so subscribers never
//! see effects of an aborted call.
//!
//! | Event | Solidity signature |
//! |-------|--------------------|
//! | `MessageStored` | `MessageStored(address,address,uint256,string)` |
//! | `OwnerChanged` | `OwnerChanged(address,address)` |
//! | `EntryPointSet` | `EntryPointSet(address)` |

use crate::domain::value_objects::{Address, Hash};
use serde::{Deserialize, Serialize};

// =============================================================================
// TOPICS
// =============================================================================

/// Topic hashes, `keccak256` of each event signature.
pub mod topics {
    use crate::domain::value_objects::Hash;

    /// `MessageStored(address,address,uint256,string)`.
    pub const MESSAGE_STORED: Hash = Hash([
        0x0a, 0xb6, 0x7b, 0xaa, 0x2f, 0x75, 0xba, 0xc6, 0x04, 0xa3, 0x0f, 0x27, 0x22, 0x06, 0xea,
        0xd8, 0x79, 0x39, 0x31, 0x63, 0x2c, 0xcd, 0x28, 0x30, 0x3e, 0xef, 0x1a, 0xc2, 0x98, 0x49,
        0x9c, 0x7f,
    ]);

    /// `OwnerChanged(address,address)`.
    pub const OWNER_CHANGED: Hash = Hash([
        0xb5, 0x32, 0x07, 0x3b, 0x38, 0xc8, 0x31, 0x45, 0xe3, 0xe5, 0x13, 0x53, 0x77, 0xa0, 0x8b,
        0xf9, 0xaa, 0xb5, 0x5b, 0xc0, 0xfd, 0x7c, 0x11, 0x79, 0xcd, 0x4f, 0xb9, 0x95, 0xd2, 0xa5,
        0x15, 0x9c,
    ]);

    /// `EntryPointSet(address)`.
    pub const ENTRY_POINT_SET: Hash = Hash([
        0x41, 0xe2, 0xb4, 0xfb, 0x9d, 0x85, 0x5f, 0x28, 0x46, 0x04, 0xe7, 0x59, 0x2c, 0x9e, 0xeb,
        0x72, 0x78, 0x9d, 0x1f, 0x68, 0xbc, 0xc5, 0x3c, 0x34, 0xf0, 0x36, 0xde, 0x5d, 0xbb, 0x59,
        0xdc, 0xd8,
    ]);
}

// =============================================================================
// VAULT EVENTS
// =============================================================================

/// A record emitted by the vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum VaultEvent {
    /// A message was stored.
    MessageStored {
        /// Vault that stored it.
        vault: Address,
        /// Identity credited with the message.
        actor: Address,
        /// Assigned id.
        id: u64,
        /// Message text.
        content: String,
    },
    /// Ownership moved.
    OwnerChanged {
        /// Previous owner.
        old_owner: Address,
        /// New owner.
        new_owner: Address,
    },
    /// Entry point configured.
    EntryPointSet {
        /// New entry point.
        entry_point: Address,
    },
}

impl VaultEvent {
    /// Topic hash of this event's signature.
    #[must_use]
    pub fn topic(&self) -> Hash {
        match self {
            Self::MessageStored { .. } => topics::MESSAGE_STORED,
            Self::OwnerChanged { .. } => topics::OWNER_CHANGED,
            Self::EntryPointSet { .. } => topics::ENTRY_POINT_SET,
        }
    }

    /// Event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessageStored { .. } => "MessageStored",
            Self::OwnerChanged { .. } => "OwnerChanged",
            Self::EntryPointSet { .. } => "EntryPointSet",
        }
    }
}
