//! # Message Vault - Account-Abstraction Wallet Core
//!
//! A smart wallet that logs messages on behalf of signers, forwards arbitrary
//! calls for its owner, and manages its deposit at an ERC-4337 entry point.
//!
//! ## Purpose
//!
//! Anyone holding a key may leave a message in the vault by signing a user
//! operation; the entry point validates it here and then relays the call.
//! Only the owner may execute arbitrary calls, whether directly or through a
//! signed operation.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Owner is never zero | `domain/invariants.rs` - `check_owner_invariant()` |
//! | Configured entry point is never zero | `domain/invariants.rs` - `check_entry_point_invariant()` |
//! | Message ids are 1, 2, 3, ... with no gaps | `vault.rs` - `send_message()` |
//! | A failed call leaves no trace | `vault.rs` - `dispatch()` |
//! | A delegation is spent by the first privileged call | `domain/authorization.rs` - `resolve_actor()` |
//!
//! ### Authorization Matrix
//!
//! | Operation | Authorized Caller(s) |
//! |-----------|---------------------|
//! | `validateUserOp` | Entry point, for operations whose sender is this vault |
//! | `sendMessageToWallet` | Owner, entry point |
//! | `execute` | Owner, entry point (owner-signed operations only) |
//! | `setOwner`, `setEntryPoint`, `withdrawDepositTo` | Owner |
//! | `addDeposit` | Anyone |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `SignerRecovery` | Recover the signer of an operation digest |
//! | `EntryPointLedger` | Deposits, balances and nonces at the entry point |
//! | `CallGateway` | Reach the entry point and arbitrary call targets |
//!
//! ## Usage Example
//!
//! ```ignore
//! use message_vault::prelude::*;
//!
//! let service = VaultService::deploy(&config, signer, gateway).await?;
//! let id = service.send_message(owner, "hello world".into()).await?;
//! assert_eq!(id, 1);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;
pub mod vault;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        CallOutput, DepositInfo, MessageRecord, PendingSigner, UserOperation, ValidationCode,
        VaultCall, VaultState,
    };

    // Value objects
    pub use crate::domain::value_objects::{Address, Bytes, Hash, Selector, U256};

    // Domain services
    pub use crate::domain::abi::{decode_call, encode_execute, encode_send_message, encode_uint_call};
    pub use crate::domain::policy::{Permission, EXECUTE_SELECTOR, SEND_MESSAGE_SELECTOR};
    pub use crate::domain::services::{function_selector, keccak256, user_op_hash};

    // Invariants
    pub use crate::domain::invariants::check_all_invariants;

    // Ports
    pub use crate::ports::inbound::VaultApi;
    pub use crate::ports::outbound::{CallGateway, EntryPointLedger, SignerRecovery};

    // Events
    pub use crate::events::{topics, VaultEvent};

    // Errors
    pub use crate::errors::{AbiError, CallError, HandleOpError, LedgerError, VaultError};

    // Adapters
    pub use crate::adapters::{
        ContractHandler, EcdsaSignerRecovery, EchoContract, InMemoryCallGateway,
        FeedLagged, InMemoryEntryPoint, MessageFeed, OpReceipt, Ping, RevertingContract,
    };

    // Config and service
    pub use crate::config::{ConfigError, VaultConfig};
    pub use crate::service::{ServiceStats, VaultService, VaultTransaction};
    pub use crate::vault::MessageVault;
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
