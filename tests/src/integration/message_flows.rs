//! # Message Submission Flows
//!
//! Owner submissions, delegated submissions through the entry point, and
//! the rollback of a delegation when the call consuming it fails.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use message_vault::prelude::*;

    use crate::integration::fixtures::*;

    #[tokio::test]
    async fn test_owner_messages_are_numbered_from_one() {
        let h = Harness::new().await;

        for (expected, content) in [(1, "first"), (2, "second"), (3, "third")] {
            let id = h.service.send_message(h.owner, content.to_string()).await.unwrap();
            assert_eq!(id, expected);
        }

        assert_eq!(h.service.message_count().await, 3);
        let actors: Vec<Address> = h.messages().into_iter().map(|(_, actor, _)| actor).collect();
        assert_eq!(actors, vec![h.owner; 3]);
    }

    #[tokio::test]
    async fn test_delegated_message_then_owner_fallback() {
        let h = Harness::new().await;
        let visitor = key_address(VISITOR_SEED);

        // Entry point validates an operation signed by the visitor
        let op = h.signed_op(VISITOR_SEED, encode_send_message("hi")).await;
        assert_eq!(h.validate(op).await, ValidationCode::Authorized);
        assert_eq!(h.service.pending_signer().await, Some(visitor));

        // The next submission is credited to the visitor and spends the delegation
        let id = h.service.send_message(ENTRY_POINT, "hi".to_string()).await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(h.service.pending_signer().await, None);

        // Without a fresh validation the owner is credited
        let id = h.service.send_message(ENTRY_POINT, "again".to_string()).await.unwrap();
        assert_eq!(id, 2);

        assert_eq!(
            h.messages(),
            vec![
                (1, visitor, "hi".to_string()),
                (2, h.owner, "again".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_submission_rolls_back_delegation_consumption() {
        let h = Harness::new().await;
        let visitor = key_address(VISITOR_SEED);

        let op = h.signed_op(VISITOR_SEED, encode_send_message("x")).await;
        assert_eq!(h.validate(op).await, ValidationCode::Authorized);

        let err = h.service.send_message(ENTRY_POINT, String::new()).await.unwrap_err();
        assert_eq!(err, VaultError::EmptyContent);
        assert_eq!(h.service.pending_signer().await, Some(visitor));
        assert_eq!(h.service.message_count().await, 0);

        // A fresh owner validation replaces the stale delegation
        let op = h.signed_op(OWNER_SEED, encode_send_message("mine")).await;
        assert_eq!(h.validate(op).await, ValidationCode::Authorized);
        assert_eq!(h.service.pending_signer().await, Some(h.owner));

        let id = h.service.send_message(ENTRY_POINT, "mine".to_string()).await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(h.messages(), vec![(1, h.owner, "mine".to_string())]);
    }

    #[tokio::test]
    async fn test_validation_and_failed_call_in_one_unit() {
        let h = Harness::new().await;
        let events_before = h.service.events().len();

        let op = h.signed_op(VISITOR_SEED, encode_send_message("x")).await;
        {
            let mut tx = h.service.begin().await;
            let code = tx.call(ENTRY_POINT, h.validation(op)).await.unwrap();
            assert_eq!(code.validation_code(), Some(ValidationCode::Authorized));

            let result = tx
                .call(ENTRY_POINT, VaultCall::SendMessage { content: String::new() })
                .await;
            assert_eq!(result, Err(VaultError::EmptyContent));
            tx.rollback();
        }

        // Both calls are gone, including the delegation
        assert_eq!(h.service.pending_signer().await, None);
        assert_eq!(h.service.message_count().await, 0);
        assert_eq!(h.service.events().len(), events_before);
    }

    #[tokio::test]
    async fn test_empty_content_never_counts() {
        let h = Harness::new().await;
        h.service.send_message(h.owner, "one".to_string()).await.unwrap();

        let err = h.service.send_message(h.owner, String::new()).await.unwrap_err();
        assert_eq!(err, VaultError::EmptyContent);
        assert_eq!(err.kind(), "EmptyContent");
        assert_eq!(h.service.message_count().await, 1);

        let id = h.service.send_message(h.owner, "two".to_string()).await.unwrap();
        assert_eq!(id, 2);
    }

    #[tokio::test]
    async fn test_strangers_cannot_submit() {
        let h = Harness::new().await;
        let visitor = key_address(VISITOR_SEED);

        for caller in [STRANGER, visitor] {
            let err = h.service.send_message(caller, "hi".to_string()).await.unwrap_err();
            assert_eq!(err, VaultError::OnlyOwnerOrEntryPoint { caller });
            assert!(err.is_unauthorized());
        }
        assert!(h.messages().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_only_committed_messages() {
        let h = Harness::new().await;
        let mut rx = h.service.subscribe();
        let mut feed = MessageFeed::new(VAULT);

        // Rolled back before commit
        {
            let mut tx = h.service.begin().await;
            tx.call(h.owner, VaultCall::SendMessage { content: "draft".into() })
                .await
                .unwrap();
        }
        assert_eq!(feed.catch_up(&mut rx), Ok(0));

        h.service.send_message(h.owner, "final".to_string()).await.unwrap();
        assert_eq!(feed.catch_up(&mut rx), Ok(1));

        let record = feed.latest(1)[0];
        assert_eq!(record.id, 1);
        assert_eq!(record.content, "final");
    }

    #[tokio::test]
    async fn test_lagging_follower_recovers_from_event_log() {
        let owner = key_address(OWNER_SEED);
        let config = VaultConfig {
            vault_address: VAULT,
            owner,
            entry_point: None,
            chain_id: CHAIN_ID,
            event_channel_capacity: 2,
        };
        let service = VaultService::deploy(
            &config,
            Arc::new(EcdsaSignerRecovery::new()),
            Arc::new(InMemoryCallGateway::new()),
        )
        .await
        .unwrap();
        let mut rx = service.subscribe();

        for content in ["a", "b", "c", "d"] {
            service.send_message(owner, content.to_string()).await.unwrap();
        }

        let mut feed = MessageFeed::new(VAULT);
        assert_eq!(feed.follow(&mut rx, &service), 4);
        let ids: Vec<u64> = feed.records().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_handle_op_stores_delegated_message() {
        let h = Harness::new().await;
        let visitor = key_address(VISITOR_SEED);

        let op = h.signed_op(VISITOR_SEED, encode_send_message("via bundler")).await;
        let receipt = h.entry_point.handle_op(&h.service, op).await.unwrap();

        assert_eq!(receipt.output, CallOutput::MessageId(1));
        assert_eq!(
            receipt.events,
            vec![VaultEvent::MessageStored {
                vault: VAULT,
                actor: visitor,
                id: 1,
                content: "via bundler".to_string(),
            }]
        );
        assert_eq!(h.service.pending_signer().await, None);
        assert_eq!(h.service.entry_point_nonce(U256::zero()).await, Ok(U256::one()));
    }
}
