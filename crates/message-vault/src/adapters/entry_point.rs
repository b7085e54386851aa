//! # In-Memory Entry Point
//!
//! A dispatcher that keeps deposits and nonces in memory and can run a
//! `UserOperation` end to end against a [`VaultService`].
//!
//! Two read surfaces are available: the full one, and one without
//! `balanceOf` that only answers `getDepositInfo`.

use crate::domain::abi;
use crate::domain::entities::{CallOutput, DepositInfo, UserOperation, ValidationCode, VaultCall};
use crate::domain::services::user_op_hash;
use crate::domain::value_objects::{Address, Hash, U256};
use crate::errors::{HandleOpError, LedgerError, VaultError};
use crate::events::VaultEvent;
use crate::ports::outbound::EntryPointLedger;
use crate::service::VaultService;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Outcome of a handled operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpReceipt {
    /// Digest the operation was validated against.
    pub op_hash: Hash,
    /// What the executed call returned.
    pub output: CallOutput,
    /// Events committed by the operation.
    pub events: Vec<VaultEvent>,
}

/// In-memory ERC-4337 entry point.
#[derive(Debug)]
pub struct InMemoryEntryPoint {
    address: Address,
    chain_id: u64,
    balance_of_supported: bool,
    /// Deposits per account.
    deposits: RwLock<HashMap<Address, U256>>,
    /// Next sequence number per (account, key).
    nonces: RwLock<HashMap<(Address, U256), u64>>,
    /// Value paid out per recipient.
    payouts: RwLock<HashMap<Address, U256>>,
    /// Held by `handle_op` from nonce check to nonce bump.
    handling: Mutex<()>,
}

impl InMemoryEntryPoint {
    /// Entry point with the full read surface.
    #[must_use]
    pub fn new(address: Address, chain_id: u64) -> Self {
        Self {
            address,
            chain_id,
            balance_of_supported: true,
            deposits: RwLock::new(HashMap::new()),
            nonces: RwLock::new(HashMap::new()),
            payouts: RwLock::new(HashMap::new()),
            handling: Mutex::new(()),
        }
    }

    /// Entry point that does not implement `balanceOf`.
    #[must_use]
    pub fn without_balance_of(address: Address, chain_id: u64) -> Self {
        Self {
            balance_of_supported: false,
            ..Self::new(address, chain_id)
        }
    }

    /// Chain id bound into operation hashes.
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Overrides the next sequence number of `account` under `key`.
    pub fn set_nonce(&self, account: Address, key: U256, sequence: u64) {
        self.nonces.write().insert((account, key), sequence);
    }

    /// Total value paid out to `recipient`.
    #[must_use]
    pub fn paid_out(&self, recipient: Address) -> U256 {
        self.payouts.read().get(&recipient).copied().unwrap_or_default()
    }

    /// Sum of all deposits held.
    #[must_use]
    pub fn total_held(&self) -> U256 {
        self.deposits
            .read()
            .values()
            .fold(U256::zero(), |acc, v| acc.saturating_add(*v))
    }

    /// Operation digest for `op` at this entry point.
    #[must_use]
    pub fn op_hash(&self, op: &UserOperation) -> Hash {
        user_op_hash(op, self.address, self.chain_id)
    }

    fn sequence(&self, account: Address, key: U256) -> u64 {
        self.nonces.read().get(&(account, key)).copied().unwrap_or(0)
    }

    fn encode_nonce(key: U256, sequence: u64) -> U256 {
        (key << 64) | U256::from(sequence)
    }

    /// Validates and executes `op` against `vault` as one unit.
    ///
    /// Operations are handled one at a time: the nonce check, the vault
    /// transaction and the nonce bump all happen under one lock, so
    /// concurrent submissions of an operation run it at most once. The nonce
    /// advances only if the operation commits; a rejected validation or a
    /// failing call leaves the vault untouched.
    #[instrument(skip(self, vault, op), fields(entry_point = ?self.address, sender = ?op.sender))]
    pub async fn handle_op(
        &self,
        vault: &VaultService,
        op: UserOperation,
    ) -> Result<OpReceipt, HandleOpError> {
        let key = op.nonce >> 64;
        let sequence = op.nonce.low_u64();
        let op_hash = self.op_hash(&op);
        let call = op.call_data.clone();
        let sender = op.sender;

        let _handling = self.handling.lock().await;
        let expected = self.sequence(sender, key);
        if sequence != expected {
            warn!(expected, got = sequence, "nonce mismatch");
            return Err(HandleOpError::InvalidNonce {
                expected: Self::encode_nonce(key, expected),
                got: op.nonce,
            });
        }

        let mut tx = vault.begin().await;
        let validation = tx
            .call(self.address, VaultCall::ValidateUserOp { op, op_hash })
            .await?;
        if validation.validation_code() != Some(ValidationCode::Authorized) {
            debug!(op_hash = %op_hash, "operation rejected by account");
            return Err(HandleOpError::ValidationRejected);
        }

        let call = abi::decode_call(call.as_slice()).map_err(VaultError::from)?;
        let (output, events) = tx.finish(self.address, call).await?;
        self.nonces.write().insert((sender, key), expected + 1);

        info!(op_hash = %op_hash, events = events.len(), "operation handled");
        Ok(OpReceipt {
            op_hash,
            output,
            events,
        })
    }
}

#[async_trait]
impl EntryPointLedger for InMemoryEntryPoint {
    fn address(&self) -> Address {
        self.address
    }

    async fn balance_of(&self, account: Address) -> Result<U256, LedgerError> {
        if !self.balance_of_supported {
            return Err(LedgerError::Unsupported);
        }
        Ok(self.deposits.read().get(&account).copied().unwrap_or_default())
    }

    async fn get_deposit_info(&self, account: Address) -> Result<DepositInfo, LedgerError> {
        let deposit = self.deposits.read().get(&account).copied().unwrap_or_default();
        Ok(DepositInfo {
            deposit,
            ..DepositInfo::default()
        })
    }

    async fn deposit_to(&self, account: Address, value: U256) -> Result<(), LedgerError> {
        let mut deposits = self.deposits.write();
        let entry = deposits.entry(account).or_default();
        *entry = entry
            .checked_add(value)
            .ok_or_else(|| LedgerError::Rejected("deposit overflow".to_string()))?;
        debug!(account = ?account, value = %value, total = %entry, "deposit recorded");
        Ok(())
    }

    async fn withdraw_to(
        &self,
        account: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let mut deposits = self.deposits.write();
        let available = deposits.get(&account).copied().unwrap_or_default();
        if amount > available {
            return Err(LedgerError::InsufficientDeposit {
                requested: amount,
                available,
            });
        }
        deposits.insert(account, available - amount);

        let mut payouts = self.payouts.write();
        let paid = payouts.entry(recipient).or_default();
        *paid = paid.saturating_add(amount);
        debug!(account = ?account, recipient = ?recipient, amount = %amount, "withdrawal paid");
        Ok(())
    }

    async fn get_nonce(&self, account: Address, key: U256) -> Result<U256, LedgerError> {
        Ok(Self::encode_nonce(key, self.sequence(account, key)))
    }
}
