//! # Validation Flows
//!
//! `validateUserOp` as seen by the entry point, and `handle_op` composing
//! validation with the call it authorizes.

#[cfg(test)]
mod tests {
    use message_vault::prelude::*;

    use crate::integration::fixtures::*;

    fn ping(x: u64) -> Bytes {
        let data = encode_uint_call(EchoContract::ping_selector(), U256::from(x));
        encode_execute(ECHO, U256::zero(), data.as_slice())
    }

    // =========================================================================
    // HARD FAILURES
    // =========================================================================

    #[tokio::test]
    async fn test_only_entry_point_may_validate() {
        let h = Harness::new().await;
        let op = h.signed_op(OWNER_SEED, encode_send_message("hi")).await;
        let op_hash = h.entry_point.op_hash(&op);

        for caller in [h.owner, STRANGER] {
            let result = h.service.validate_user_op(caller, op.clone(), op_hash).await;
            assert_eq!(result, Err(VaultError::NotEntryPoint { caller }));
        }
    }

    #[tokio::test]
    async fn test_foreign_sender_is_a_routing_error() {
        let h = Harness::new().await;
        // A perfectly good owner signature does not help
        let op = h.sign(OWNER_SEED, UserOperation::new(STRANGER, encode_send_message("hi")));

        let result = h.service.call(ENTRY_POINT, h.validation(op)).await;
        assert_eq!(result, Err(VaultError::WrongSender { sender: STRANGER }));
    }

    // =========================================================================
    // SOFT FAILURES
    // =========================================================================

    #[tokio::test]
    async fn test_short_call_data_is_rejected() {
        let h = Harness::new().await;
        let op = h.sign(OWNER_SEED, UserOperation::new(VAULT, Bytes::from(vec![0x7f, 0x22, 0x58])));
        assert_eq!(h.validate(op).await, ValidationCode::Rejected);
    }

    #[tokio::test]
    async fn test_unknown_selector_is_rejected() {
        let h = Harness::new().await;
        let op = h.sign(OWNER_SEED, UserOperation::new(VAULT, Bytes::from(vec![0xde, 0xad, 0xbe, 0xef])));
        assert_eq!(h.validate(op).await, ValidationCode::Rejected);
    }

    #[tokio::test]
    async fn test_malformed_signature_is_rejected() {
        let h = Harness::new().await;
        let op = UserOperation::new(VAULT, encode_send_message("hi")).with_signature(vec![0u8; 10]);
        assert_eq!(h.validate(op).await, ValidationCode::Rejected);
        assert_eq!(h.service.pending_signer().await, None);
    }

    #[tokio::test]
    async fn test_visitor_cannot_authorize_execute() {
        let h = Harness::new().await;
        let op = h.signed_op(VISITOR_SEED, ping(1)).await;
        assert_eq!(h.validate(op).await, ValidationCode::Rejected);
        assert_eq!(h.service.pending_signer().await, None);
    }

    #[tokio::test]
    async fn test_rejection_clears_stale_delegation() {
        let h = Harness::new().await;
        let op = h.signed_op(VISITOR_SEED, encode_send_message("hi")).await;
        assert_eq!(h.validate(op).await, ValidationCode::Authorized);
        assert_eq!(h.service.pending_signer().await, Some(key_address(VISITOR_SEED)));

        let op = h.signed_op(VISITOR_SEED, ping(1)).await;
        assert_eq!(h.validate(op).await, ValidationCode::Rejected);
        assert_eq!(h.service.pending_signer().await, None);
    }

    // =========================================================================
    // AUTHORIZED
    // =========================================================================

    #[tokio::test]
    async fn test_owner_authorizes_both_selectors() {
        let h = Harness::new().await;

        for call_data in [encode_send_message("hi"), ping(7)] {
            let op = h.signed_op(OWNER_SEED, call_data).await;
            assert_eq!(h.validate(op).await, ValidationCode::Authorized);
            assert_eq!(h.service.pending_signer().await, Some(h.owner));
        }
    }

    #[tokio::test]
    async fn test_stats_count_validation_outcomes() {
        let h = Harness::new().await;

        let op = h.signed_op(OWNER_SEED, encode_send_message("hi")).await;
        h.validate(op).await;
        let op = h.signed_op(VISITOR_SEED, ping(1)).await;
        h.validate(op).await;

        let stats = h.service.stats();
        assert_eq!(stats.validations_authorized, 1);
        assert_eq!(stats.validations_rejected, 1);
    }

    // =========================================================================
    // HANDLE OP
    // =========================================================================

    #[tokio::test]
    async fn test_rejected_op_leaves_no_effects() {
        let h = Harness::new().await;
        let events_before = h.service.events().len();

        let op = h.signed_op(VISITOR_SEED, ping(1)).await;
        let result = h.entry_point.handle_op(&h.service, op).await;

        assert_eq!(result, Err(HandleOpError::ValidationRejected));
        assert!(h.echo.pings().is_empty());
        assert_eq!(h.service.events().len(), events_before);
        assert_eq!(h.service.entry_point_nonce(U256::zero()).await, Ok(U256::zero()));
    }

    #[tokio::test]
    async fn test_replayed_op_fails_nonce_check() {
        let h = Harness::new().await;
        let op = h.signed_op(OWNER_SEED, encode_send_message("once")).await;

        h.entry_point.handle_op(&h.service, op.clone()).await.unwrap();
        let result = h.entry_point.handle_op(&h.service, op).await;

        assert_eq!(
            result,
            Err(HandleOpError::InvalidNonce {
                expected: U256::one(),
                got: U256::zero(),
            })
        );
        assert_eq!(h.service.message_count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_run_once() {
        let h = Harness::new().await;
        let op = h.signed_op(OWNER_SEED, encode_send_message("once")).await;

        // Both submissions queue up behind an open transaction
        let held = h.service.begin().await;
        let (first, second, ()) = tokio::join!(
            h.entry_point.handle_op(&h.service, op.clone()),
            h.entry_point.handle_op(&h.service, op),
            async move {
                tokio::task::yield_now().await;
                drop(held);
            },
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes.iter().any(|r| matches!(
            r,
            Err(HandleOpError::InvalidNonce { got, .. }) if got.is_zero()
        )));
        assert_eq!(h.service.message_count().await, 1);
        assert_eq!(h.service.entry_point_nonce(U256::zero()).await, Ok(U256::one()));
    }

    #[tokio::test]
    async fn test_keyed_nonces_are_independent() {
        let h = Harness::new().await;
        let key = U256::from(5);

        let op = UserOperation::new(VAULT, encode_send_message("keyed")).with_nonce(key << 64);
        let op = h.sign(OWNER_SEED, op);
        h.entry_point.handle_op(&h.service, op).await.unwrap();

        assert_eq!(h.service.entry_point_nonce(key).await, Ok((key << 64) | U256::one()));
        assert_eq!(h.service.entry_point_nonce(U256::zero()).await, Ok(U256::zero()));
    }

    #[tokio::test]
    async fn test_failing_execution_discards_validation() {
        let h = Harness::new().await;
        let op = h
            .signed_op(OWNER_SEED, encode_execute(REVERTER, U256::zero(), &[]))
            .await;

        let result = h.entry_point.handle_op(&h.service, op).await;
        assert_eq!(
            result,
            Err(HandleOpError::Vault(VaultError::CallFailed(CallError::Reverted {
                target: REVERTER,
                data: Bytes::from_slice(REVERT_REASON),
            })))
        );

        // The delegation granted by validation did not survive
        assert_eq!(h.service.pending_signer().await, None);
        assert_eq!(h.service.entry_point_nonce(U256::zero()).await, Ok(U256::zero()));
        assert!(h.service.stats().transactions_rolled_back >= 1);
    }

    #[tokio::test]
    async fn test_op_hash_binds_chain_and_entry_point() {
        let h = Harness::new().await;
        let op = UserOperation::new(VAULT, encode_send_message("hi"));

        let here = user_op_hash(&op, ENTRY_POINT, CHAIN_ID);
        assert_eq!(here, h.entry_point.op_hash(&op));
        assert_ne!(here, user_op_hash(&op, ENTRY_POINT, 1));
        assert_ne!(here, user_op_hash(&op, STRANGER, CHAIN_ID));
    }
}
