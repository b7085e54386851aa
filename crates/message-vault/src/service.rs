//! # Vault Service
//!
//! Serialises access to one vault and turns calls into atomic units.
//!
//! - [`VaultService::begin`] opens a [`VaultTransaction`] holding the
//!   instance lock. Dropping it without committing restores the state
//!   captured when it opened.
//! - Events reach subscribers and the committed log only on commit.
//! - Calls that reach the entry point or a call target cannot be undone by a
//!   checkpoint, so they only run through [`VaultTransaction::finish`],
//!   which commits as soon as they succeed.
//! - [`VaultApi::call`] is a single-call transaction.

use crate::config::VaultConfig;
use crate::domain::entities::{CallOutput, VaultCall, VaultState};
use crate::domain::value_objects::{Address, U256};
use crate::errors::VaultError;
use crate::events::VaultEvent;
use crate::ports::inbound::VaultApi;
use crate::ports::outbound::{CallGateway, SignerRecovery};
use crate::vault::{Checkpoint, MessageVault};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::{debug, info, instrument, trace};
use uuid::Uuid;

/// Statistics for the vault service.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    /// Calls dispatched, committed or not.
    pub calls_total: u64,
    /// Validations that returned `Authorized`.
    pub validations_authorized: u64,
    /// Validations that returned `Rejected`.
    pub validations_rejected: u64,
    /// Messages stored by committed transactions.
    pub messages_stored: u64,
    /// Calls that hard-failed.
    pub calls_reverted: u64,
    /// Transactions committed.
    pub transactions_committed: u64,
    /// Transactions rolled back.
    pub transactions_rolled_back: u64,
}

/// The vault service.
pub struct VaultService {
    address: Address,
    vault: Mutex<MessageVault>,
    publisher: broadcast::Sender<VaultEvent>,
    /// Every committed event, in commit order.
    log: RwLock<Vec<VaultEvent>>,
    stats: RwLock<ServiceStats>,
}

impl VaultService {
    /// Wraps a deployed vault.
    #[must_use]
    pub fn new(vault: MessageVault, event_capacity: usize) -> Self {
        let (publisher, _) = broadcast::channel(event_capacity.max(1));
        Self {
            address: vault.address(),
            vault: Mutex::new(vault),
            publisher,
            log: RwLock::new(Vec::new()),
            stats: RwLock::new(ServiceStats::default()),
        }
    }

    /// Deploys a vault from `config` and configures its entry point, if any.
    pub async fn deploy(
        config: &VaultConfig,
        signer: Arc<dyn SignerRecovery>,
        gateway: Arc<dyn CallGateway>,
    ) -> Result<Self, VaultError> {
        let vault = MessageVault::deploy(config.vault_address, config.owner, signer, gateway)?;
        let service = Self::new(vault, config.event_channel_capacity);

        if let Some(entry_point) = config.entry_point {
            service
                .call(config.owner, VaultCall::SetEntryPoint { entry_point })
                .await?;
        }
        info!(vault = ?config.vault_address, chain_id = config.chain_id, "vault service ready");
        Ok(service)
    }

    /// Opens an atomic unit over the vault, waiting for any other to finish.
    pub async fn begin(&self) -> VaultTransaction<'_> {
        let vault = self.vault.lock().await;
        let checkpoint = vault.checkpoint();
        let id = Uuid::new_v4();
        trace!(tx = %id, "transaction opened");
        VaultTransaction {
            id,
            service: self,
            vault,
            checkpoint: Some(checkpoint),
        }
    }

    /// Receiver of committed events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<VaultEvent> {
        self.publisher.subscribe()
    }

    /// Every committed event so far.
    #[must_use]
    pub fn events(&self) -> Vec<VaultEvent> {
        self.log.read().clone()
    }

    /// Get current service statistics.
    #[must_use]
    pub fn stats(&self) -> ServiceStats {
        self.stats.read().clone()
    }

    /// Current owner.
    pub async fn owner(&self) -> Address {
        self.vault.lock().await.state().owner
    }

    /// Configured entry point.
    pub async fn entry_point(&self) -> Option<Address> {
        self.vault.lock().await.state().entry_point
    }

    /// Outstanding delegation, without consuming it.
    pub async fn pending_signer(&self) -> Option<Address> {
        self.vault.lock().await.state().pending_signer.peek()
    }

    /// Messages stored so far.
    pub async fn message_count(&self) -> u64 {
        self.vault.lock().await.state().message_count
    }

    fn record(&self, result: &Result<CallOutput, VaultError>) {
        let mut stats = self.stats.write();
        stats.calls_total += 1;
        match result {
            Ok(CallOutput::Validation(code)) => {
                if code.is_authorized() {
                    stats.validations_authorized += 1;
                } else {
                    stats.validations_rejected += 1;
                }
                #[cfg(feature = "metrics")]
                vault_telemetry::metrics::record_validation(code.is_authorized());
            }
            Ok(_) => {}
            Err(_err) => {
                stats.calls_reverted += 1;
                #[cfg(feature = "metrics")]
                vault_telemetry::metrics::record_call_reverted(_err.kind());
            }
        }
    }

    fn publish(&self, events: &[VaultEvent]) {
        let stored = events
            .iter()
            .filter(|event| matches!(event, VaultEvent::MessageStored { .. }))
            .count() as u64;
        {
            let mut stats = self.stats.write();
            stats.transactions_committed += 1;
            stats.messages_stored += stored;
        }
        #[cfg(feature = "metrics")]
        vault_telemetry::metrics::record_messages_stored(stored);

        self.log.write().extend(events.iter().cloned());
        for event in events {
            if self.publisher.send(event.clone()).is_err() {
                trace!(event = event.name(), "no subscribers");
            }
        }
    }
}

#[async_trait]
impl VaultApi for VaultService {
    fn address(&self) -> Address {
        self.address
    }

    #[instrument(skip(self, call), fields(function = call.name()))]
    async fn call(&self, caller: Address, call: VaultCall) -> Result<CallOutput, VaultError> {
        let (output, _) = self.begin().await.finish(caller, call).await?;
        Ok(output)
    }

    async fn state(&self) -> VaultState {
        self.vault.lock().await.state().clone()
    }

    async fn entry_point_balance(&self) -> Result<U256, VaultError> {
        self.vault.lock().await.entry_point_balance().await
    }

    async fn entry_point_nonce(&self, key: U256) -> Result<U256, VaultError> {
        self.vault.lock().await.entry_point_nonce(key).await
    }
}

// =============================================================================
// TRANSACTION
// =============================================================================

/// Exclusive, all-or-nothing unit of work over the vault.
///
/// Holds the instance lock for its whole life. Every call inside it is
/// atomic on its own; the transaction as a whole is kept only by
/// [`Self::commit`] or [`Self::finish`].
///
/// Vault state and events roll back; effects on collaborators do not. A call
/// for which [`VaultCall::reaches_collaborators`] holds is therefore refused
/// by [`Self::call`] and must be the final call, passed to [`Self::finish`].
pub struct VaultTransaction<'a> {
    id: Uuid,
    service: &'a VaultService,
    vault: MutexGuard<'a, MessageVault>,
    checkpoint: Option<Checkpoint>,
}

impl VaultTransaction<'_> {
    /// Correlation id of this transaction.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// State as seen inside the transaction.
    #[must_use]
    pub fn state(&self) -> &VaultState {
        self.vault.state()
    }

    /// Runs one call inside the transaction.
    ///
    /// Fails with [`VaultError::ExternalCallNotLast`], without running it, for
    /// a call that reaches collaborators.
    pub async fn call(&mut self, caller: Address, call: VaultCall) -> Result<CallOutput, VaultError> {
        if call.reaches_collaborators() {
            return Err(VaultError::ExternalCallNotLast {
                function: call.name(),
            });
        }
        self.run(caller, call).await
    }

    /// Runs `call` as the last call and commits.
    ///
    /// On failure the whole transaction rolls back, including earlier calls.
    pub async fn finish(
        mut self,
        caller: Address,
        call: VaultCall,
    ) -> Result<(CallOutput, Vec<VaultEvent>), VaultError> {
        let output = self.run(caller, call).await?;
        Ok((output, self.commit()))
    }

    async fn run(&mut self, caller: Address, call: VaultCall) -> Result<CallOutput, VaultError> {
        let function = call.name();
        let result = self.vault.dispatch(caller, call).await;
        debug!(tx = %self.id, function, ok = result.is_ok(), "call finished");
        self.service.record(&result);
        result
    }

    /// Keeps every effect and publishes the buffered events.
    pub fn commit(mut self) -> Vec<VaultEvent> {
        self.checkpoint = None;
        let events = self.vault.take_events();
        self.service.publish(&events);
        debug!(tx = %self.id, events = events.len(), "transaction committed");
        events
    }

    /// Restores the vault state and drops buffered events.
    pub fn rollback(self) {
        drop(self);
    }
}

impl Drop for VaultTransaction<'_> {
    fn drop(&mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            self.vault.revert_to(checkpoint);
            self.service.stats.write().transactions_rolled_back += 1;
            debug!(tx = %self.id, "transaction rolled back");
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
