//! # Driven Ports (SPI - Outbound)
//!
//! What the vault needs from the outside world:
//! - signer recovery for operation signatures
//! - the entry point's deposit ledger
//! - external calls made by `execute` and deposit forwarding
//!
//! The vault only consumes these surfaces; it never redefines them.

use crate::domain::entities::DepositInfo;
use crate::domain::value_objects::{Address, Bytes, Hash, U256};
use crate::errors::{CallError, LedgerError};
use async_trait::async_trait;
use std::sync::Arc;
use vault_signature::SignatureError;

// =============================================================================
// SIGNER RECOVERY
// =============================================================================

/// Recovers who signed an operation digest.
///
/// Malformed signatures are reported as errors, never panics, so the
/// validation path can turn them into a soft rejection.
pub trait SignerRecovery: Send + Sync {
    /// Signer of `signature` over `digest`.
    fn recover_signer(&self, digest: &Hash, signature: &[u8]) -> Result<Address, SignatureError>;
}

// =============================================================================
// ENTRY POINT LEDGER
// =============================================================================

/// Deposit and nonce surface of an ERC-4337 entry point.
#[async_trait]
pub trait EntryPointLedger: Send + Sync {
    /// Address of this entry point.
    fn address(&self) -> Address;

    /// `balanceOf(account)`.
    ///
    /// Entry points without this query answer [`LedgerError::Unsupported`].
    async fn balance_of(&self, account: Address) -> Result<U256, LedgerError>;

    /// `getDepositInfo(account)`.
    async fn get_deposit_info(&self, account: Address) -> Result<DepositInfo, LedgerError>;

    /// `depositTo(account)` carrying `value`.
    async fn deposit_to(&self, account: Address, value: U256) -> Result<(), LedgerError>;

    /// `withdrawTo(recipient, amount)` from `account`'s deposit.
    async fn withdraw_to(
        &self,
        account: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;

    /// `getNonce(account, key)`.
    async fn get_nonce(&self, account: Address, key: U256) -> Result<U256, LedgerError>;
}

// =============================================================================
// CALL GATEWAY
// =============================================================================

/// Reaches other contracts on the vault's behalf.
#[async_trait]
pub trait CallGateway: Send + Sync {
    /// Ledger surface of the entry point deployed at `address`.
    fn entry_point_at(&self, address: Address) -> Result<Arc<dyn EntryPointLedger>, LedgerError>;

    /// Calls `target` from `from` with `value` and `data`.
    async fn call(
        &self,
        from: Address,
        target: Address,
        value: U256,
        data: &[u8],
    ) -> Result<Bytes, CallError>;
}
