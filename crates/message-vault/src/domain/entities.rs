//! # Domain Entities
//!
//! The vault's persistent state record, the operation envelope it validates,
//! and the call surface every state transition goes through.

use crate::domain::value_objects::{Address, Bytes, Hash, U256};
use crate::errors::VaultError;
use serde::{Deserialize, Serialize};

// =============================================================================
// PENDING SIGNER (one-shot delegation token)
// =============================================================================

/// Signer recorded by a successful validation, waiting for the next
/// privileged call from the entry point.
///
/// At most one is outstanding. It can only be read by consuming it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSigner(Option<Address>);

impl PendingSigner {
    /// No delegation outstanding.
    pub const NONE: Self = Self(None);

    /// Overwrites any outstanding delegation with `signer`.
    pub fn grant(&mut self, signer: Address) {
        self.0 = Some(signer);
    }

    /// Drops any outstanding delegation.
    pub fn clear(&mut self) {
        self.0 = None;
    }

    /// Takes the delegation, leaving none behind.
    #[must_use]
    pub fn consume(&mut self) -> Option<Address> {
        self.0.take()
    }

    /// Read-only view for queries; authorization paths use [`Self::consume`].
    #[must_use]
    pub fn peek(&self) -> Option<Address> {
        self.0
    }
}

// =============================================================================
// VAULT STATE
// =============================================================================

/// Every piece of state the vault persists between calls.
///
/// ## Invariants
/// - `owner` is never the zero address
/// - `message_count` equals the number of successfully stored messages
/// - `entry_point`, once set, is only changed by the owner
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultState {
    /// Controlling identity.
    pub owner: Address,
    /// Trusted dispatcher (ERC-4337 entry point); `None` until configured.
    pub entry_point: Option<Address>,
    /// Delegation bridging a validation to the following privileged call.
    pub pending_signer: PendingSigner,
    /// Number of messages stored so far; also the id of the latest message.
    pub message_count: u64,
}

impl VaultState {
    /// Fresh state for a newly deployed vault.
    pub fn new(owner: Address) -> Result<Self, VaultError> {
        if owner.is_zero() {
            return Err(VaultError::ZeroOwner);
        }
        Ok(Self {
            owner,
            entry_point: None,
            pending_signer: PendingSigner::NONE,
            message_count: 0,
        })
    }

    /// Returns true if `caller` is the configured entry point.
    #[must_use]
    pub fn is_entry_point(&self, caller: Address) -> bool {
        self.entry_point == Some(caller)
    }
}

// =============================================================================
// USER OPERATION (packed, v0.7 layout)
// =============================================================================

/// Dispatcher-defined envelope describing an intended call.
///
/// The vault only looks at `sender`, the selector at the front of
/// `call_data`, and `signature`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOperation {
    /// Account the operation acts for.
    pub sender: Address,
    /// Entry-point nonce: `key (192 bits) << 64 | sequence`.
    pub nonce: U256,
    /// Factory call for first-time deployment.
    pub init_code: Bytes,
    /// Call the entry point makes on the account after validation.
    pub call_data: Bytes,
    /// Packed verification and call gas limits.
    pub account_gas_limits: Hash,
    /// Gas paid for bundler overhead.
    pub pre_verification_gas: U256,
    /// Packed max priority fee and max fee.
    pub gas_fees: Hash,
    /// Paymaster address and data.
    pub paymaster_and_data: Bytes,
    /// Owner or delegate signature over the operation hash.
    pub signature: Bytes,
}

impl UserOperation {
    /// Operation for `sender` carrying `call_data`, everything else zeroed.
    #[must_use]
    pub fn new(sender: Address, call_data: Bytes) -> Self {
        Self {
            sender,
            call_data,
            ..Self::default()
        }
    }

    /// Sets the nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the signature.
    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<Bytes>) -> Self {
        self.signature = signature.into();
        self
    }
}

// =============================================================================
// VALIDATION CODE
// =============================================================================

/// Status returned by operation validation. Rejections are data, not faults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ValidationCode {
    /// Signature accepted for this selector.
    Authorized = 0,
    /// `SIG_VALIDATION_FAILED`.
    Rejected = 1,
}

impl ValidationCode {
    /// Numeric code as reported to the dispatcher.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns true for [`ValidationCode::Authorized`].
    #[must_use]
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }
}

// =============================================================================
// DEPOSIT INFO
// =============================================================================

/// Entry-point deposit record (`getDepositInfo`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositInfo {
    /// Balance available to pay for operations.
    pub deposit: U256,
    /// Whether the account is staked.
    pub staked: bool,
    /// Staked amount.
    pub stake: U256,
    /// Unstake delay in seconds.
    pub unstake_delay_sec: u32,
    /// Timestamp when stake can be withdrawn.
    pub withdraw_time: u64,
}

// =============================================================================
// MESSAGE RECORD
// =============================================================================

/// A stored message, as reconstructed from emitted events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Monotonic id, starting at 1.
    pub id: u64,
    /// Identity credited with the message.
    pub actor: Address,
    /// Message text, never empty.
    pub content: String,
}

// =============================================================================
// CALL SURFACE
// =============================================================================

/// Every state-changing entry point of the vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VaultCall {
    /// `validateUserOp`: entry point only.
    ValidateUserOp {
        /// Operation being validated.
        op: UserOperation,
        /// Digest the signature covers.
        op_hash: Hash,
    },
    /// `sendMessageToWallet(string)`.
    SendMessage {
        /// Message text.
        content: String,
    },
    /// `execute(address,uint256,bytes)`.
    Execute {
        /// Call target.
        target: Address,
        /// Value forwarded with the call.
        value: U256,
        /// Call data.
        data: Bytes,
    },
    /// `setOwner(address)`.
    SetOwner {
        /// Replacement owner.
        new_owner: Address,
    },
    /// `setEntryPoint(address)`.
    SetEntryPoint {
        /// Trusted dispatcher address.
        entry_point: Address,
    },
    /// `addDeposit()` with attached value.
    AddDeposit {
        /// Value received with the call, forwarded in full.
        value: U256,
    },
    /// `withdrawDepositTo(address,uint256)`.
    WithdrawDepositTo {
        /// Recipient of the withdrawal.
        recipient: Address,
        /// Amount to withdraw.
        amount: U256,
    },
}

impl VaultCall {
    /// Function name, for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ValidateUserOp { .. } => "validateUserOp",
            Self::SendMessage { .. } => "sendMessageToWallet",
            Self::Execute { .. } => "execute",
            Self::SetOwner { .. } => "setOwner",
            Self::SetEntryPoint { .. } => "setEntryPoint",
            Self::AddDeposit { .. } => "addDeposit",
            Self::WithdrawDepositTo { .. } => "withdrawDepositTo",
        }
    }

    /// True when a successful call changes state outside the vault (the
    /// entry point's ledger or a call target), which a checkpoint cannot undo.
    #[must_use]
    pub fn reaches_collaborators(&self) -> bool {
        matches!(
            self,
            Self::Execute { .. } | Self::AddDeposit { .. } | Self::WithdrawDepositTo { .. }
        )
    }
}

/// What a successful [`VaultCall`] returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutput {
    /// Result of `validateUserOp`.
    Validation(ValidationCode),
    /// Id assigned to a stored message.
    MessageId(u64),
    /// Data returned by an executed call.
    ReturnData(Bytes),
    /// Call returned nothing.
    Unit,
}

impl CallOutput {
    /// Validation code, if this was a validation.
    #[must_use]
    pub fn validation_code(&self) -> Option<ValidationCode> {
        match self {
            Self::Validation(code) => Some(*code),
            _ => None,
        }
    }

    /// Message id, if this was a message submission.
    #[must_use]
    pub fn message_id(&self) -> Option<u64> {
        match self {
            Self::MessageId(id) => Some(*id),
            _ => None,
        }
    }

    /// Return data, if this was an execution.
    #[must_use]
    pub fn return_data(&self) -> Option<&Bytes> {
        match self {
            Self::ReturnData(data) => Some(data),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
