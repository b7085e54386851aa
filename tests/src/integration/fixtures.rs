//! # Test Fixtures
//!
//! A deployed vault wired to an in-memory entry point, an echo contract and
//! a reverting contract, plus helpers that build operations signed with
//! deterministic keys.

use std::sync::Arc;

use message_vault::prelude::*;
use vault_signature::test_helpers::{address_of, personal_sign, signing_key_from_seed};

/// Vault address.
pub const VAULT: Address = Address::from_low_u8(0x10);
/// Entry point address.
pub const ENTRY_POINT: Address = Address::from_low_u8(0xEE);
/// Echo contract address.
pub const ECHO: Address = Address::from_low_u8(0xEC);
/// Reverting contract address.
pub const REVERTER: Address = Address::from_low_u8(0xDE);
/// An address with no role.
pub const STRANGER: Address = Address::from_low_u8(0x55);
/// Chain the operation hashes are bound to.
pub const CHAIN_ID: u64 = 11_155_111;

/// Key seed of the owner.
pub const OWNER_SEED: u8 = 1;
/// Key seed of a visitor.
pub const VISITOR_SEED: u8 = 2;

/// Revert data of the reverting contract.
pub const REVERT_REASON: &[u8] = b"not today";

/// Address controlled by the key with `seed`.
#[must_use]
pub fn key_address(seed: u8) -> Address {
    Address::from(address_of(&signing_key_from_seed(seed)))
}

/// A deployed vault and its collaborators.
pub struct Harness {
    pub service: VaultService,
    pub entry_point: Arc<InMemoryEntryPoint>,
    pub gateway: Arc<InMemoryCallGateway>,
    pub echo: Arc<EchoContract>,
    pub owner: Address,
}

impl Harness {
    /// Vault owned by the owner key, with [`ENTRY_POINT`] configured.
    pub async fn new() -> Self {
        Self::build(InMemoryEntryPoint::new(ENTRY_POINT, CHAIN_ID), true).await
    }

    /// Vault with no entry point configured. The entry point is still
    /// reachable through the gateway.
    pub async fn without_entry_point() -> Self {
        Self::build(InMemoryEntryPoint::new(ENTRY_POINT, CHAIN_ID), false).await
    }

    /// Vault whose entry point only answers `getDepositInfo`.
    pub async fn with_deposit_info_only() -> Self {
        Self::build(InMemoryEntryPoint::without_balance_of(ENTRY_POINT, CHAIN_ID), true).await
    }

    async fn build(entry_point: InMemoryEntryPoint, configure_entry_point: bool) -> Self {
        let owner = key_address(OWNER_SEED);
        let entry_point = Arc::new(entry_point);
        let echo = Arc::new(EchoContract::new());

        let gateway = Arc::new(InMemoryCallGateway::new());
        gateway.register_entry_point(entry_point.clone());
        gateway.register_contract(ECHO, echo.clone());
        gateway.register_contract(
            REVERTER,
            Arc::new(RevertingContract::new(Bytes::from_slice(REVERT_REASON))),
        );

        let config = VaultConfig {
            vault_address: VAULT,
            owner,
            entry_point: configure_entry_point.then_some(ENTRY_POINT),
            chain_id: CHAIN_ID,
            event_channel_capacity: 64,
        };
        let service = VaultService::deploy(&config, Arc::new(EcdsaSignerRecovery::new()), gateway.clone())
            .await
            .expect("deployment should succeed");

        Self {
            service,
            entry_point,
            gateway,
            echo,
            owner,
        }
    }

    /// Operation for the vault at the entry point's current nonce (key 0),
    /// signed by the key with `seed`.
    pub async fn signed_op(&self, seed: u8, call_data: Bytes) -> UserOperation {
        let nonce = self
            .entry_point
            .get_nonce(VAULT, U256::zero())
            .await
            .expect("nonce query should succeed");
        self.sign(seed, UserOperation::new(VAULT, call_data).with_nonce(nonce))
    }

    /// Signs `op` with the key with `seed` over its entry-point hash.
    #[must_use]
    pub fn sign(&self, seed: u8, op: UserOperation) -> UserOperation {
        let digest = self.entry_point.op_hash(&op);
        let signature = personal_sign(digest.as_bytes(), &signing_key_from_seed(seed));
        op.with_signature(signature.to_vec())
    }

    /// The validation call the entry point would make for `op`.
    #[must_use]
    pub fn validation(&self, op: UserOperation) -> VaultCall {
        let op_hash = self.entry_point.op_hash(&op);
        VaultCall::ValidateUserOp { op, op_hash }
    }

    /// Validates `op` as the entry point, committing the outcome.
    pub async fn validate(&self, op: UserOperation) -> ValidationCode {
        self.service
            .call(ENTRY_POINT, self.validation(op))
            .await
            .expect("validation should not hard-fail")
            .validation_code()
            .expect("validation returns a code")
    }

    /// Messages rebuilt from the committed event log.
    #[must_use]
    pub fn feed(&self) -> MessageFeed {
        MessageFeed::from_events(VAULT, &self.service.events())
    }

    /// `(id, actor, content)` of every committed message.
    #[must_use]
    pub fn messages(&self) -> Vec<(u64, Address, String)> {
        self.feed()
            .records()
            .map(|r| (r.id, r.actor, r.content.clone()))
            .collect()
    }
}
