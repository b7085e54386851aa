//! # Error Types
//!
//! Hard failures of the vault and of its collaborators.
//!
//! Soft validation failures are not errors: they come back as
//! [`ValidationCode::Rejected`](crate::domain::entities::ValidationCode).

use crate::domain::value_objects::{Address, Bytes, Selector, U256};
use thiserror::Error;

// =============================================================================
// VAULT ERRORS
// =============================================================================

/// Hard failures that abort a vault call and discard all of its effects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Owner would become the zero address.
    #[error("owner cannot be the zero address")]
    ZeroOwner,

    /// Caller is not the owner.
    #[error("caller {caller:?} is not the owner")]
    OnlyOwner { caller: Address },

    /// Caller is neither the owner nor the entry point.
    #[error("caller {caller:?} is neither the owner nor the entry point")]
    OnlyOwnerOrEntryPoint { caller: Address },

    /// Message content is empty.
    #[error("message content is empty")]
    EmptyContent,

    /// Entry point would become the zero address.
    #[error("entry point cannot be the zero address")]
    InvalidEntryPoint,

    /// Deposit operation before an entry point was configured.
    #[error("entry point not set")]
    EntryPointNotSet,

    /// Execute target is the zero address or the vault itself.
    #[error("invalid call target {0:?}")]
    InvalidTarget(Address),

    /// Validation called by something other than the entry point.
    #[error("caller {caller:?} is not the entry point")]
    NotEntryPoint { caller: Address },

    /// Operation routed to the wrong account.
    #[error("operation sender {sender:?} is not this vault")]
    WrongSender { sender: Address },

    /// Entry-point ledger failure.
    #[error("entry point ledger: {0}")]
    Ledger(#[from] LedgerError),

    /// External call failed.
    #[error("external call failed: {0}")]
    CallFailed(#[from] CallError),

    /// Call data could not be decoded.
    #[error("call data: {0}")]
    Abi(#[from] AbiError),

    /// A call with external effects was run before the end of a transaction.
    #[error("{function} has external effects and must be the last call of a transaction")]
    ExternalCallNotLast { function: &'static str },
}

impl VaultError {
    /// Failure kind as reported to callers and indexers.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ZeroOwner => "ZeroOwner",
            Self::OnlyOwner { .. } => "OnlyOwner",
            Self::OnlyOwnerOrEntryPoint { .. } => "OnlyOwnerOrEntryPoint",
            Self::EmptyContent => "EmptyContent",
            Self::InvalidEntryPoint => "InvalidEntryPoint",
            Self::EntryPointNotSet => "EntryPointNotSet",
            Self::InvalidTarget(_) => "InvalidTarget",
            Self::NotEntryPoint { .. } => "NotEntryPoint",
            Self::WrongSender { .. } => "WrongSender",
            Self::Ledger(_) => "Ledger",
            Self::CallFailed(_) => "CallFailed",
            Self::Abi(_) => "Abi",
            Self::ExternalCallNotLast { .. } => "ExternalCallNotLast",
        }
    }

    /// Returns true if the failure is an authorization violation.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::OnlyOwner { .. } | Self::OnlyOwnerOrEntryPoint { .. } | Self::NotEntryPoint { .. }
        )
    }
}

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors from the entry point's deposit ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The entry point does not expose this query.
    ///
    /// This is the only failure that lets a balance read fall back.
    #[error("operation not supported by this entry point")]
    Unsupported,

    /// No entry point is deployed at this address.
    #[error("no entry point at {0:?}")]
    NotDeployed(Address),

    /// Withdrawal exceeds the recorded deposit.
    #[error("insufficient deposit: requested {requested}, available {available}")]
    InsufficientDeposit { requested: U256, available: U256 },

    /// The entry point refused the request.
    #[error("entry point rejected request: {0}")]
    Rejected(String),
}

// =============================================================================
// CALL ERRORS
// =============================================================================

/// Errors from external calls made by `execute`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallError {
    /// Callee reverted with the given data.
    #[error("call to {target:?} reverted: {data:?}")]
    Reverted { target: Address, data: Bytes },
}

// =============================================================================
// ABI ERRORS
// =============================================================================

/// Errors decoding call data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Fewer than four bytes of call data.
    #[error("call data too short for a selector")]
    MissingSelector,

    /// Selector names no vault function.
    #[error("unknown selector {0:?}")]
    UnknownSelector(Selector),

    /// Arguments end before a required field.
    #[error("arguments truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    /// An offset or length word does not fit in memory.
    #[error("offset or length out of range")]
    OffsetOverflow,

    /// An address word has non-zero upper bytes.
    #[error("address word has dirty upper bytes")]
    DirtyAddress,

    /// String argument is not UTF-8.
    #[error("string argument is not valid UTF-8")]
    InvalidUtf8,
}

// =============================================================================
// OPERATION HANDLING ERRORS
// =============================================================================

/// Why the in-memory entry point dropped an operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandleOpError {
    /// Nonce does not match the next sequence number for its key.
    #[error("invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: U256, got: U256 },

    /// The account rejected the signature.
    #[error("account rejected the operation signature")]
    ValidationRejected,

    /// Validation or execution hard-failed.
    #[error(transparent)]
    Vault(#[from] VaultError),
}

// =============================================================================
// TESTS
// =============================================================================
