//! # In-Memory Call Gateway
//!
//! Routes the vault's external calls to registered in-memory contracts.
//! Calls to unregistered addresses behave like transfers to a plain
//! account: they succeed with empty return data and credit the value.

use crate::domain::abi::{decode_uint_arg, encode_uint};
use crate::domain::services::function_selector;
use crate::domain::value_objects::{Address, Bytes, Selector, U256};
use crate::errors::{CallError, LedgerError};
use crate::ports::outbound::{CallGateway, EntryPointLedger};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

// =============================================================================
// CONTRACT HANDLER
// =============================================================================

/// Behaviour of an in-memory contract.
pub trait ContractHandler: Send + Sync {
    /// Handles a call to the contract at `this`.
    fn handle(&self, this: Address, from: Address, value: U256, data: &[u8]) -> Result<Bytes, CallError>;
}

// =============================================================================
// GATEWAY
// =============================================================================

/// Registry of entry points and contracts reachable from the vault.
#[derive(Default)]
pub struct InMemoryCallGateway {
    entry_points: RwLock<HashMap<Address, Arc<dyn EntryPointLedger>>>,
    contracts: RwLock<HashMap<Address, Arc<dyn ContractHandler>>>,
    /// Value received by plain accounts.
    transfers: RwLock<HashMap<Address, U256>>,
}

impl InMemoryCallGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `ledger` reachable at its own address.
    pub fn register_entry_point(&self, ledger: Arc<dyn EntryPointLedger>) {
        self.entry_points.write().insert(ledger.address(), ledger);
    }

    /// Deploys `handler` at `address`.
    pub fn register_contract(&self, address: Address, handler: Arc<dyn ContractHandler>) {
        self.contracts.write().insert(address, handler);
    }

    /// Value credited to the plain account at `address`.
    #[must_use]
    pub fn received(&self, address: Address) -> U256 {
        self.transfers.read().get(&address).copied().unwrap_or_default()
    }
}

#[async_trait]
impl CallGateway for InMemoryCallGateway {
    fn entry_point_at(&self, address: Address) -> Result<Arc<dyn EntryPointLedger>, LedgerError> {
        self.entry_points
            .read()
            .get(&address)
            .cloned()
            .ok_or(LedgerError::NotDeployed(address))
    }

    async fn call(
        &self,
        from: Address,
        target: Address,
        value: U256,
        data: &[u8],
    ) -> Result<Bytes, CallError> {
        let handler = self.contracts.read().get(&target).cloned();
        match handler {
            Some(handler) => handler.handle(target, from, value, data),
            None => {
                trace!(target = ?target, value = %value, "call to plain account");
                let mut transfers = self.transfers.write();
                let balance = transfers.entry(target).or_default();
                *balance = balance.saturating_add(value);
                Ok(Bytes::new())
            }
        }
    }
}

// =============================================================================
// ECHO CONTRACT
// =============================================================================

/// One recorded `ping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ping {
    /// Caller.
    pub from: Address,
    /// Value attached.
    pub value: U256,
    /// Argument.
    pub x: U256,
}

/// Contract exposing `ping(uint256 x) payable returns (uint256)`.
///
/// Records a [`Ping`] and returns `x`; any other selector reverts.
#[derive(Debug, Default)]
pub struct EchoContract {
    pings: RwLock<Vec<Ping>>,
}

impl EchoContract {
    /// Create an echo contract with no pings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `ping(uint256)` selector.
    #[must_use]
    pub fn ping_selector() -> Selector {
        function_selector("ping(uint256)")
    }

    /// Pings received so far.
    #[must_use]
    pub fn pings(&self) -> Vec<Ping> {
        self.pings.read().clone()
    }
}

impl ContractHandler for EchoContract {
    fn handle(&self, this: Address, from: Address, value: U256, data: &[u8]) -> Result<Bytes, CallError> {
        let reverted = || CallError::Reverted {
            target: this,
            data: Bytes::new(),
        };
        if Selector::from_call_data(data) != Some(Self::ping_selector()) {
            return Err(reverted());
        }
        let x = decode_uint_arg(data).map_err(|_| reverted())?;

        self.pings.write().push(Ping { from, value, x });
        Ok(encode_uint(x))
    }
}

// =============================================================================
// REVERTING CONTRACT
// =============================================================================

/// Contract that reverts every call with fixed data.
#[derive(Debug, Clone, Default)]
pub struct RevertingContract {
    reason: Bytes,
}

impl RevertingContract {
    /// Reverts with `reason`.
    #[must_use]
    pub fn new(reason: Bytes) -> Self {
        Self { reason }
    }
}

impl ContractHandler for RevertingContract {
    fn handle(&self, this: Address, _from: Address, _value: U256, _data: &[u8]) -> Result<Bytes, CallError> {
        Err(CallError::Reverted {
            target: this,
            data: self.reason.clone(),
        })
    }
}
