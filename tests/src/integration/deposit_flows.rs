//! # Deposit and Ownership Flows
//!
//! The vault's deposit at the entry point (funding, withdrawal, the
//! two-tier balance read) and the owner-gated configuration setters.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use message_vault::prelude::*;

    use crate::integration::fixtures::*;

    #[tokio::test]
    async fn test_no_entry_point_reads_zero_and_blocks_deposits() {
        let h = Harness::without_entry_point().await;
        assert_eq!(h.service.entry_point().await, None);
        assert_eq!(h.service.entry_point_balance().await, Ok(U256::zero()));

        assert_eq!(
            h.service.add_deposit(h.owner, U256::from(10)).await,
            Err(VaultError::EntryPointNotSet)
        );
        assert_eq!(
            h.service.withdraw_deposit_to(h.owner, h.owner, U256::from(1)).await,
            Err(VaultError::EntryPointNotSet)
        );
        assert_eq!(h.entry_point.total_held(), U256::zero());
    }

    #[tokio::test]
    async fn test_anyone_funds_the_deposit() {
        let h = Harness::new().await;

        h.service.add_deposit(STRANGER, U256::from(600)).await.unwrap();
        h.service.add_deposit(h.owner, U256::from(400)).await.unwrap();

        assert_eq!(h.service.entry_point_balance().await, Ok(U256::from(1_000)));
        let info = h.entry_point.get_deposit_info(VAULT).await.unwrap();
        assert_eq!(info.deposit, U256::from(1_000));
    }

    #[tokio::test]
    async fn test_balance_falls_back_to_deposit_info() {
        let h = Harness::with_deposit_info_only().await;
        h.service.add_deposit(STRANGER, U256::from(250)).await.unwrap();

        assert_eq!(h.entry_point.balance_of(VAULT).await, Err(LedgerError::Unsupported));
        assert_eq!(h.service.entry_point_balance().await, Ok(U256::from(250)));
    }

    #[tokio::test]
    async fn test_withdraw_moves_exact_amount() {
        let h = Harness::new().await;
        let recipient = key_address(VISITOR_SEED);
        h.service.add_deposit(h.owner, U256::from(1_000)).await.unwrap();

        h.service
            .withdraw_deposit_to(h.owner, recipient, U256::from(250))
            .await
            .unwrap();

        assert_eq!(h.entry_point.paid_out(recipient), U256::from(250));
        assert_eq!(h.service.entry_point_balance().await, Ok(U256::from(750)));
    }

    #[tokio::test]
    async fn test_overdraw_fails_without_effects() {
        let h = Harness::new().await;
        h.service.add_deposit(h.owner, U256::from(100)).await.unwrap();

        let result = h
            .service
            .withdraw_deposit_to(h.owner, STRANGER, U256::from(101))
            .await;
        assert_eq!(
            result,
            Err(VaultError::Ledger(LedgerError::InsufficientDeposit {
                requested: U256::from(101),
                available: U256::from(100),
            }))
        );
        assert_eq!(h.entry_point.paid_out(STRANGER), U256::zero());
        assert_eq!(h.service.entry_point_balance().await, Ok(U256::from(100)));
    }

    #[tokio::test]
    async fn test_only_owner_withdraws() {
        let h = Harness::new().await;
        h.service.add_deposit(h.owner, U256::from(100)).await.unwrap();

        for caller in [STRANGER, ENTRY_POINT] {
            let result = h.service.withdraw_deposit_to(caller, caller, U256::from(1)).await;
            assert_eq!(result, Err(VaultError::OnlyOwner { caller }));
        }
    }

    // =========================================================================
    // CONFIGURATION
    // =========================================================================

    #[tokio::test]
    async fn test_zero_owner_is_refused() {
        let config = VaultConfig {
            vault_address: VAULT,
            owner: Address::ZERO,
            entry_point: None,
            chain_id: CHAIN_ID,
            event_channel_capacity: 8,
        };
        assert!(config.validate().is_err());

        let result = VaultService::deploy(
            &config,
            Arc::new(EcdsaSignerRecovery::new()),
            Arc::new(InMemoryCallGateway::new()),
        )
        .await;
        assert!(matches!(result, Err(VaultError::ZeroOwner)));

        let h = Harness::new().await;
        assert_eq!(
            h.service.set_owner(h.owner, Address::ZERO).await,
            Err(VaultError::ZeroOwner)
        );
        assert_eq!(
            h.service.set_entry_point(h.owner, Address::ZERO).await,
            Err(VaultError::InvalidEntryPoint)
        );
    }

    #[tokio::test]
    async fn test_ownership_transfer_moves_every_privilege() {
        let h = Harness::new().await;
        let new_owner = key_address(VISITOR_SEED);
        h.service.add_deposit(h.owner, U256::from(10)).await.unwrap();

        h.service.set_owner(h.owner, new_owner).await.unwrap();
        assert_eq!(h.service.owner().await, new_owner);
        assert!(h.service.events().contains(&VaultEvent::OwnerChanged {
            old_owner: h.owner,
            new_owner,
        }));

        // Old owner is now a stranger
        assert_eq!(
            h.service.withdraw_deposit_to(h.owner, h.owner, U256::from(1)).await,
            Err(VaultError::OnlyOwner { caller: h.owner })
        );
        h.service
            .withdraw_deposit_to(new_owner, new_owner, U256::from(10))
            .await
            .unwrap();

        // The new owner's key now authorizes execute
        let data = encode_uint_call(EchoContract::ping_selector(), U256::one());
        let op = h
            .signed_op(VISITOR_SEED, encode_execute(ECHO, U256::zero(), data.as_slice()))
            .await;
        assert_eq!(h.validate(op).await, ValidationCode::Authorized);
    }

    #[tokio::test]
    async fn test_entry_point_can_be_replaced() {
        let h = Harness::without_entry_point().await;
        let replacement = Arc::new(InMemoryEntryPoint::new(STRANGER, CHAIN_ID));
        h.gateway.register_entry_point(replacement.clone());

        h.service.set_entry_point(h.owner, STRANGER).await.unwrap();
        h.service.add_deposit(h.owner, U256::from(5)).await.unwrap();

        assert_eq!(replacement.total_held(), U256::from(5));
        assert_eq!(h.entry_point.total_held(), U256::zero());
        assert_eq!(
            h.service.events().last(),
            Some(&VaultEvent::EntryPointSet { entry_point: STRANGER })
        );

        // The old entry point lost its privileges
        assert_eq!(
            h.service.send_message(ENTRY_POINT, "hi".to_string()).await,
            Err(VaultError::OnlyOwnerOrEntryPoint { caller: ENTRY_POINT })
        );
    }
}
