//! # Message Vault
//!
//! The wallet state machine. Every mutating entry point goes through
//! [`MessageVault::dispatch`], which is atomic on its own: a hard failure
//! restores the state and drops the events the call buffered.
//!
//! Collaborators (entry point ledger, call targets) are always invoked as
//! the last step of an operation, after every local check and effect.

use crate::domain::authorization::{self, Validation};
use crate::domain::entities::{CallOutput, UserOperation, ValidationCode, VaultCall, VaultState};
use crate::domain::invariants;
use crate::domain::value_objects::{Address, Bytes, Hash, U256};
use crate::errors::{LedgerError, VaultError};
use crate::events::VaultEvent;
use crate::ports::outbound::{CallGateway, EntryPointLedger, SignerRecovery};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Restore point for [`MessageVault::revert_to`].
#[derive(Debug, Clone)]
pub struct Checkpoint {
    state: VaultState,
    events: usize,
}

// =============================================================================
// BALANCE QUERIES
// =============================================================================

/// Ways of reading the vault's entry-point deposit, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BalanceQuery {
    /// `balanceOf(account)`.
    BalanceOf,
    /// `getDepositInfo(account).deposit`.
    DepositInfo,
}

const BALANCE_QUERIES: [BalanceQuery; 2] = [BalanceQuery::BalanceOf, BalanceQuery::DepositInfo];

impl BalanceQuery {
    async fn run(self, ledger: &dyn EntryPointLedger, account: Address) -> Result<U256, LedgerError> {
        match self {
            Self::BalanceOf => ledger.balance_of(account).await,
            Self::DepositInfo => Ok(ledger.get_deposit_info(account).await?.deposit),
        }
    }
}

// =============================================================================
// MESSAGE VAULT
// =============================================================================

/// A deployed vault and the collaborators it talks to.
pub struct MessageVault {
    address: Address,
    state: VaultState,
    pending_events: Vec<VaultEvent>,
    signer: Arc<dyn SignerRecovery>,
    gateway: Arc<dyn CallGateway>,
}

impl std::fmt::Debug for MessageVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageVault")
            .field("address", &self.address)
            .field("state", &self.state)
            .field("pending_events", &self.pending_events.len())
            .finish_non_exhaustive()
    }
}

impl MessageVault {
    /// Deploys a vault at `address` owned by `owner`.
    pub fn deploy(
        address: Address,
        owner: Address,
        signer: Arc<dyn SignerRecovery>,
        gateway: Arc<dyn CallGateway>,
    ) -> Result<Self, VaultError> {
        let state = VaultState::new(owner)?;
        info!(vault = ?address, owner = ?owner, "vault deployed");
        Ok(Self {
            address,
            state,
            pending_events: Vec::new(),
            signer,
            gateway,
        })
    }

    /// Address the vault is deployed at.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current persistent state.
    #[must_use]
    pub fn state(&self) -> &VaultState {
        &self.state
    }

    /// Events emitted since the last [`Self::take_events`].
    #[must_use]
    pub fn pending_events(&self) -> &[VaultEvent] {
        &self.pending_events
    }

    /// Captures state and event buffer position.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state.clone(),
            events: self.pending_events.len(),
        }
    }

    /// Restores a checkpoint, dropping events buffered after it.
    pub fn revert_to(&mut self, checkpoint: Checkpoint) {
        self.state = checkpoint.state;
        self.pending_events.truncate(checkpoint.events);
    }

    /// Drains buffered events for publication.
    pub fn take_events(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Runs `call` from `caller`. On `Err` nothing the call did survives.
    pub async fn dispatch(&mut self, caller: Address, call: VaultCall) -> Result<CallOutput, VaultError> {
        let checkpoint = self.checkpoint();
        let result = self.apply(caller, call).await;

        match &result {
            Ok(_) => debug_assert!(invariants::check_all_invariants(&self.state)),
            Err(err) => {
                warn!(caller = ?caller, kind = err.kind(), error = %err, "call reverted");
                self.revert_to(checkpoint);
            }
        }
        result
    }

    async fn apply(&mut self, caller: Address, call: VaultCall) -> Result<CallOutput, VaultError> {
        match call {
            VaultCall::ValidateUserOp { op, op_hash } => self
                .validate_user_op(caller, &op, &op_hash)
                .map(CallOutput::Validation),
            VaultCall::SendMessage { content } => {
                self.send_message(caller, content).map(CallOutput::MessageId)
            }
            VaultCall::Execute { target, value, data } => self
                .execute(caller, target, value, data)
                .await
                .map(CallOutput::ReturnData),
            VaultCall::SetOwner { new_owner } => {
                self.set_owner(caller, new_owner).map(|()| CallOutput::Unit)
            }
            VaultCall::SetEntryPoint { entry_point } => self
                .set_entry_point(caller, entry_point)
                .map(|()| CallOutput::Unit),
            VaultCall::AddDeposit { value } => {
                self.add_deposit(value).await.map(|()| CallOutput::Unit)
            }
            VaultCall::WithdrawDepositTo { recipient, amount } => self
                .withdraw_deposit_to(caller, recipient, amount)
                .await
                .map(|()| CallOutput::Unit),
        }
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    fn validate_user_op(
        &mut self,
        caller: Address,
        op: &UserOperation,
        op_hash: &Hash,
    ) -> Result<ValidationCode, VaultError> {
        let signer = Arc::clone(&self.signer);
        let validation = authorization::validate_operation(
            &mut self.state,
            self.address,
            caller,
            op,
            op_hash,
            |digest, signature| signer.recover_signer(digest, signature),
        )?;

        match &validation {
            Validation::Authorized { signer, permission } => {
                debug!(signer = ?signer, permission = ?permission, "operation authorized");
            }
            Validation::Rejected(reason) => {
                debug!(reason = ?reason, "operation rejected");
            }
        }
        Ok(validation.code())
    }

    fn send_message(&mut self, caller: Address, content: String) -> Result<u64, VaultError> {
        let actor = authorization::resolve_actor(&mut self.state, caller)?;
        if content.is_empty() {
            return Err(VaultError::EmptyContent);
        }

        let id = self.state.message_count + 1;
        self.state.message_count = id;

        info!(id, actor = ?actor, "message stored");
        self.pending_events.push(VaultEvent::MessageStored {
            vault: self.address,
            actor,
            id,
            content,
        });
        Ok(id)
    }

    async fn execute(
        &mut self,
        caller: Address,
        target: Address,
        value: U256,
        data: Bytes,
    ) -> Result<Bytes, VaultError> {
        let actor = authorization::resolve_actor(&mut self.state, caller)?;
        if target.is_zero() || target == self.address {
            return Err(VaultError::InvalidTarget(target));
        }

        debug!(actor = ?actor, target = ?target, value = %value, "executing call");
        let output = self
            .gateway
            .call(self.address, target, value, data.as_slice())
            .await?;
        Ok(output)
    }

    fn set_owner(&mut self, caller: Address, new_owner: Address) -> Result<(), VaultError> {
        authorization::require_owner(&self.state, caller)?;
        if new_owner.is_zero() {
            return Err(VaultError::ZeroOwner);
        }

        let old_owner = std::mem::replace(&mut self.state.owner, new_owner);
        info!(old = ?old_owner, new = ?new_owner, "owner changed");
        self.pending_events.push(VaultEvent::OwnerChanged {
            old_owner,
            new_owner,
        });
        Ok(())
    }

    fn set_entry_point(&mut self, caller: Address, entry_point: Address) -> Result<(), VaultError> {
        authorization::require_owner(&self.state, caller)?;
        if entry_point.is_zero() {
            return Err(VaultError::InvalidEntryPoint);
        }

        self.state.entry_point = Some(entry_point);
        info!(entry_point = ?entry_point, "entry point set");
        self.pending_events
            .push(VaultEvent::EntryPointSet { entry_point });
        Ok(())
    }

    async fn add_deposit(&mut self, value: U256) -> Result<(), VaultError> {
        let ledger = self.ledger()?;
        ledger.deposit_to(self.address, value).await?;
        info!(value = %value, "deposit forwarded to entry point");
        Ok(())
    }

    async fn withdraw_deposit_to(
        &mut self,
        caller: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), VaultError> {
        authorization::require_owner(&self.state, caller)?;
        let ledger = self.ledger()?;
        ledger.withdraw_to(self.address, recipient, amount).await?;
        info!(recipient = ?recipient, amount = %amount, "deposit withdrawn");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    fn ledger(&self) -> Result<Arc<dyn EntryPointLedger>, VaultError> {
        let entry_point = self.state.entry_point.ok_or(VaultError::EntryPointNotSet)?;
        Ok(self.gateway.entry_point_at(entry_point)?)
    }

    /// Vault's deposit at the entry point; zero when none is set.
    ///
    /// Falls back from `balanceOf` to `getDepositInfo` only when the former
    /// is unsupported. Any other failure, including one from the fallback,
    /// is returned.
    pub async fn entry_point_balance(&self) -> Result<U256, VaultError> {
        if self.state.entry_point.is_none() {
            return Ok(U256::zero());
        }
        let ledger = self.ledger()?;

        for query in BALANCE_QUERIES {
            match query.run(ledger.as_ref(), self.address).await {
                Ok(balance) => return Ok(balance),
                Err(LedgerError::Unsupported) => {
                    debug!(query = ?query, "balance query unsupported, falling back");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(LedgerError::Unsupported.into())
    }

    /// Vault's nonce at the entry point under `key`.
    pub async fn entry_point_nonce(&self, key: U256) -> Result<U256, VaultError> {
        let ledger = self.ledger()?;
        Ok(ledger.get_nonce(self.address, key).await?)
    }
}

// =============================================================================
// TESTS
// =============================================================================
