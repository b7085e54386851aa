//! # Execution Flows
//!
//! `execute` against contracts and plain accounts, directly from the owner
//! and through owner-signed operations.

#[cfg(test)]
mod tests {
    use message_vault::prelude::*;

    use crate::integration::fixtures::*;

    fn ping_data(x: u64) -> Bytes {
        encode_uint_call(EchoContract::ping_selector(), U256::from(x))
    }

    #[tokio::test]
    async fn test_disallowed_targets() {
        let h = Harness::new().await;

        for target in [Address::ZERO, VAULT] {
            let result = h
                .service
                .execute(h.owner, target, U256::zero(), ping_data(1))
                .await;
            assert_eq!(result, Err(VaultError::InvalidTarget(target)));
        }
        assert!(h.echo.pings().is_empty());
    }

    #[tokio::test]
    async fn test_owner_gets_callee_return_data() {
        let h = Harness::new().await;

        let out = h
            .service
            .execute(h.owner, ECHO, U256::from(5), ping_data(42))
            .await
            .unwrap();
        assert_eq!(decode_uint(&out), U256::from(42));

        let pings = h.echo.pings();
        assert_eq!(
            pings,
            vec![Ping {
                from: VAULT,
                value: U256::from(5),
                x: U256::from(42),
            }]
        );
    }

    #[tokio::test]
    async fn test_callee_failure_propagates() {
        let h = Harness::new().await;

        let err = h
            .service
            .execute(h.owner, REVERTER, U256::zero(), Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            VaultError::CallFailed(CallError::Reverted {
                target: REVERTER,
                data: Bytes::from_slice(REVERT_REASON),
            })
        );

        // Echo reverts on anything but ping
        let err = h
            .service
            .execute(h.owner, ECHO, U256::zero(), Bytes::from(vec![1, 2, 3, 4]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "CallFailed");
    }

    #[tokio::test]
    async fn test_value_transfer_to_plain_account() {
        let h = Harness::new().await;

        let out = h
            .service
            .execute(h.owner, STRANGER, U256::from(7), Bytes::new())
            .await
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(h.gateway.received(STRANGER), U256::from(7));
    }

    #[tokio::test]
    async fn test_stranger_cannot_execute() {
        let h = Harness::new().await;

        let result = h
            .service
            .execute(STRANGER, ECHO, U256::zero(), ping_data(1))
            .await;
        assert_eq!(result, Err(VaultError::OnlyOwnerOrEntryPoint { caller: STRANGER }));
    }

    #[tokio::test]
    async fn test_owner_signed_execute_through_entry_point() {
        let h = Harness::new().await;
        let data = ping_data(9);
        let op = h
            .signed_op(OWNER_SEED, encode_execute(ECHO, U256::zero(), data.as_slice()))
            .await;

        let receipt = h.entry_point.handle_op(&h.service, op).await.unwrap();
        let returned = receipt.output.return_data().cloned().unwrap();
        assert_eq!(decode_uint(&returned), U256::from(9));
        assert!(receipt.events.is_empty());

        assert_eq!(h.echo.pings().len(), 1);
        assert_eq!(h.service.pending_signer().await, None);
    }

    #[tokio::test]
    async fn test_dispatcher_execute_without_validation_acts_for_owner() {
        let h = Harness::new().await;

        let out = h
            .service
            .execute(ENTRY_POINT, ECHO, U256::zero(), ping_data(3))
            .await
            .unwrap();
        assert_eq!(decode_uint(&out), U256::from(3));
        assert_eq!(h.echo.pings()[0].from, VAULT);
    }

    /// Reads a single ABI-encoded `uint256`.
    fn decode_uint(data: &Bytes) -> U256 {
        assert_eq!(data.len(), 32);
        U256::from_big_endian(data.as_slice())
    }
}
