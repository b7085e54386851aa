//! Replay of the entry-point flow against a running [`VaultNode`].
//!
//! Every step is recorded with its outcome; an expected rejection is an
//! outcome like any other, not a failure of the replay.

use std::fmt::{Debug, Display};

use anyhow::Result;
use message_vault::prelude::*;
use serde::Serialize;
use tracing::info;
use vault_signature::test_helpers::{personal_sign, signing_key_from_seed};

use crate::{demo_address, VaultNode, ECHO_ADDRESS, OWNER_SEED, VISITOR_SEED};

/// One replayed step.
#[derive(Debug, Serialize)]
pub struct StepOutcome {
    /// What was attempted.
    pub step: &'static str,
    /// Whether it went through.
    pub ok: bool,
    /// Result or failure, rendered.
    pub outcome: String,
}

/// Everything the replay observed.
#[derive(Debug, Serialize)]
pub struct DemoReport {
    /// Vault address.
    pub vault: Address,
    /// Owner at the end of the replay.
    pub owner: Address,
    /// Steps in order.
    pub steps: Vec<StepOutcome>,
    /// Messages rebuilt from committed events.
    pub messages: Vec<MessageRecord>,
    /// Pings received by the echo contract.
    pub pings: Vec<Ping>,
    /// Vault deposit at the entry point.
    pub deposit: U256,
    /// Service counters.
    pub stats: ServiceStats,
}

fn record<T: Debug, E: Display>(steps: &mut Vec<StepOutcome>, step: &'static str, result: Result<T, E>) {
    let (ok, outcome) = match result {
        Ok(value) => (true, format!("{value:?}")),
        Err(err) => (false, err.to_string()),
    };
    info!(step, ok, outcome = %outcome, "demo step");
    steps.push(StepOutcome { step, ok, outcome });
}

/// Builds an operation for the vault, signed with the demo key `seed`.
async fn signed_op(node: &VaultNode, seed: u8, call_data: Bytes) -> Result<UserOperation> {
    let vault = node.service.address();
    let nonce = node.entry_point.get_nonce(vault, U256::zero()).await?;
    let op = UserOperation::new(vault, call_data).with_nonce(nonce);

    let digest = node.entry_point.op_hash(&op);
    let signature = personal_sign(digest.as_bytes(), &signing_key_from_seed(seed));
    Ok(op.with_signature(signature.to_vec()))
}

/// Runs the replay and collects the report.
pub async fn run(node: &VaultNode) -> Result<DemoReport> {
    let mut steps = Vec::new();
    let service = &node.service;
    let entry_point = node.entry_point.address();
    let owner = service.owner().await;
    let visitor = demo_address(VISITOR_SEED);

    // Visitor leaves a message through the entry point
    let op = signed_op(node, VISITOR_SEED, encode_send_message("hi")).await?;
    let replay = op.clone();
    record(&mut steps, "visitor message via entry point", node.entry_point.handle_op(service, op).await);

    // The same operation again is stale
    record(&mut steps, "replayed operation", node.entry_point.handle_op(service, replay).await);

    // Without a fresh validation the dispatcher acts for the owner
    record(
        &mut steps,
        "dispatcher message without validation",
        service.send_message(entry_point, "again".to_string()).await,
    );

    // Owner-signed execute reaches the echo contract
    let ping = encode_uint_call(EchoContract::ping_selector(), U256::from(42));
    let op = signed_op(node, OWNER_SEED, encode_execute(ECHO_ADDRESS, U256::zero(), ping.as_slice())).await?;
    record(&mut steps, "owner execute via entry point", node.entry_point.handle_op(service, op).await);

    // A visitor may not execute
    let op = signed_op(node, VISITOR_SEED, encode_execute(ECHO_ADDRESS, U256::zero(), ping.as_slice())).await?;
    record(&mut steps, "visitor execute via entry point", node.entry_point.handle_op(service, op).await);

    // Anyone funds the deposit, only the owner withdraws
    record(
        &mut steps,
        "deposit from visitor",
        service.add_deposit(visitor, U256::from(1_000)).await,
    );
    record(
        &mut steps,
        "withdraw by visitor",
        service.withdraw_deposit_to(visitor, visitor, U256::from(1)).await,
    );
    record(
        &mut steps,
        "withdraw by owner",
        service.withdraw_deposit_to(owner, visitor, U256::from(400)).await,
    );

    let feed = MessageFeed::from_events(service.address(), &service.events());
    Ok(DemoReport {
        vault: service.address(),
        owner,
        steps,
        messages: feed.records().cloned().collect(),
        pings: node.echo.pings(),
        deposit: service.entry_point_balance().await?,
        stats: service.stats(),
    })
}
