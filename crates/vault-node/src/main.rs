//! # Message Vault Node
//!
//! Runnable wiring of the message vault against in-memory collaborators.
//!
//! ## Startup Sequence
//!
//! 1. Install telemetry (`VAULT_LOG_LEVEL`, `VAULT_JSON_LOGS`, ...)
//! 2. Load the vault configuration (`VAULT_OWNER`, `VAULT_ENTRY_POINT`, ...)
//! 3. Deploy the entry point, an echo contract and the vault
//! 4. Replay the entry-point flow and print the resulting report as JSON,
//!    followed by the Prometheus metrics when `VAULT_PRINT_METRICS` is set
//!
//! When `VAULT_OWNER` is unset the owner is a deterministic demo key, so
//! owner-signed operations in the replay are accepted.

mod demo;

use std::sync::Arc;

use anyhow::{Context, Result};
use message_vault::config::CANONICAL_ENTRY_POINT;
use message_vault::prelude::*;
use tracing::{info, warn};
use vault_signature::test_helpers::{address_of, signing_key_from_seed};
use vault_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};

/// Seed of the demo owner key.
pub const OWNER_SEED: u8 = 1;

/// Seed of the demo visitor key.
pub const VISITOR_SEED: u8 = 2;

/// Where the echo contract is deployed.
pub const ECHO_ADDRESS: Address = Address::from_low_u8(0xEC);

/// Address of the demo key with `seed`.
#[must_use]
pub fn demo_address(seed: u8) -> Address {
    Address::from(address_of(&signing_key_from_seed(seed)))
}

/// A deployed vault and the collaborators it talks to.
pub struct VaultNode {
    /// The vault.
    pub service: VaultService,
    /// Entry point the vault trusts.
    pub entry_point: Arc<InMemoryEntryPoint>,
    /// Target of demo `execute` calls.
    pub echo: Arc<EchoContract>,
}

impl VaultNode {
    /// Deploys collaborators and the vault described by `config`.
    ///
    /// A configuration without an entry point still gets one: the vault is
    /// deployed without it and the owner configures the canonical address
    /// afterwards.
    pub async fn start(config: &VaultConfig) -> Result<Self> {
        let entry_point_address = config.entry_point.unwrap_or(CANONICAL_ENTRY_POINT);
        let entry_point = Arc::new(InMemoryEntryPoint::new(entry_point_address, config.chain_id));
        let echo = Arc::new(EchoContract::new());

        let gateway = Arc::new(InMemoryCallGateway::new());
        gateway.register_entry_point(entry_point.clone());
        gateway.register_contract(ECHO_ADDRESS, echo.clone());

        let service = VaultService::deploy(config, Arc::new(EcdsaSignerRecovery::new()), gateway)
            .await
            .context("vault deployment failed")?;

        if config.entry_point.is_none() {
            warn!("no entry point configured, setting the canonical one");
            service
                .set_entry_point(config.owner, entry_point_address)
                .await
                .context("failed to configure entry point")?;
        }

        info!(
            vault = %service.address(),
            owner = %config.owner,
            entry_point = %entry_point_address,
            "vault node started"
        );
        Ok(Self {
            service,
            entry_point,
            echo,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    let _guard = init_telemetry(&telemetry).context("failed to initialize telemetry")?;

    let mut config = VaultConfig::from_env().context("invalid vault configuration")?;
    if config.owner.is_zero() {
        config.owner = demo_address(OWNER_SEED);
        warn!(owner = %config.owner, "VAULT_OWNER not set, using the demo owner key");
    }
    config.validate().context("invalid vault configuration")?;

    let node = VaultNode::start(&config).await?;
    let report = demo::run(&node).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if std::env::var_os("VAULT_PRINT_METRICS").is_some() {
        print!("{}", encode_metrics().context("failed to encode metrics")?);
    }
    Ok(())
}
