//! # Driving Ports (API - Inbound)
//!
//! The vault's public surface. Each mutating method is one atomic call;
//! callers composing several calls into one unit use
//! [`VaultService::begin`](crate::service::VaultService::begin) instead.

use crate::domain::entities::{CallOutput, UserOperation, ValidationCode, VaultCall, VaultState};
use crate::domain::value_objects::{Address, Bytes, Hash, U256};
use crate::errors::VaultError;
use async_trait::async_trait;

/// Public API of a deployed vault.
#[async_trait]
pub trait VaultApi: Send + Sync {
    /// Address the vault is deployed at.
    fn address(&self) -> Address;

    /// Runs `call` from `caller` as one atomic unit.
    async fn call(&self, caller: Address, call: VaultCall) -> Result<CallOutput, VaultError>;

    /// Snapshot of the persistent state.
    async fn state(&self) -> VaultState;

    /// Entry-point balance of the vault; zero when no entry point is set.
    async fn entry_point_balance(&self) -> Result<U256, VaultError>;

    /// Entry-point nonce of the vault under `key`.
    async fn entry_point_nonce(&self, key: U256) -> Result<U256, VaultError>;

    // -------------------------------------------------------------------------
    // Typed wrappers over `call`
    // -------------------------------------------------------------------------

    /// `validateUserOp`.
    async fn validate_user_op(
        &self,
        caller: Address,
        op: UserOperation,
        op_hash: Hash,
    ) -> Result<ValidationCode, VaultError> {
        let output = self.call(caller, VaultCall::ValidateUserOp { op, op_hash }).await?;
        Ok(output.validation_code().unwrap_or(ValidationCode::Rejected))
    }

    /// `sendMessageToWallet`; returns the assigned id.
    async fn send_message(&self, caller: Address, content: String) -> Result<u64, VaultError> {
        let output = self.call(caller, VaultCall::SendMessage { content }).await?;
        Ok(output.message_id().unwrap_or_default())
    }

    /// `execute`; returns the callee's return data.
    async fn execute(
        &self,
        caller: Address,
        target: Address,
        value: U256,
        data: Bytes,
    ) -> Result<Bytes, VaultError> {
        let output = self.call(caller, VaultCall::Execute { target, value, data }).await?;
        Ok(output.return_data().cloned().unwrap_or_default())
    }

    /// `setOwner`.
    async fn set_owner(&self, caller: Address, new_owner: Address) -> Result<(), VaultError> {
        self.call(caller, VaultCall::SetOwner { new_owner }).await.map(|_| ())
    }

    /// `setEntryPoint`.
    async fn set_entry_point(&self, caller: Address, entry_point: Address) -> Result<(), VaultError> {
        self.call(caller, VaultCall::SetEntryPoint { entry_point }).await.map(|_| ())
    }

    /// `addDeposit` with `value` attached.
    async fn add_deposit(&self, caller: Address, value: U256) -> Result<(), VaultError> {
        self.call(caller, VaultCall::AddDeposit { value }).await.map(|_| ())
    }

    /// `withdrawDepositTo`.
    async fn withdraw_deposit_to(
        &self,
        caller: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), VaultError> {
        self.call(caller, VaultCall::WithdrawDepositTo { recipient, amount })
            .await
            .map(|_| ())
    }
}
