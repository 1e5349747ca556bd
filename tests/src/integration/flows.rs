//! # Billing Flows
//!
//! Set, list and summarize billing status changes the way a front end
//! drives them.
//!
//! ## Flows Tested:
//!
//! 1. **Approved, never billed**: summary resolves to Active
//! 2. **Close with reason**: one change persisted, summary follows it
//! 3. **Close without reason**: rejected before any write
//! 4. **Vote still running**: rejected, nothing persisted
//! 5. **Change limit**: third change rejected whatever the transition

#[cfg(test)]
mod tests {
    use crate::fixtures::{PiFixture, GENESIS};
    use pi_plugin::{
        BillingStatus, ErrorCode, ErrorKind, PiConfig, PiPluginApi, ProposalStatus, RecordState,
        RecordStatus, VoteStatus, CMD_BILLING_STATUS_CHANGES, CMD_SET_BILLING_STATUS,
        CMD_SUMMARY,
    };

    fn config_with_max(max: u32) -> PiConfig {
        PiConfig {
            billing_status_changes_max: max,
            ..PiConfig::for_testing()
        }
    }

    // =============================================================================
    // SCENARIO A: APPROVED WITHOUT BILLING HISTORY
    // =============================================================================

    #[tokio::test]
    async fn test_approved_without_history_is_active() {
        let fx = PiFixture::new(PiConfig::default());
        let t = PiFixture::token(0xa1);
        fx.approved_proposal(t);

        assert_eq!(fx.summary_status(t).await.unwrap(), ProposalStatus::Active);
    }

    // =============================================================================
    // SCENARIO B: CLOSE WITH A REASON
    // =============================================================================

    #[tokio::test]
    async fn test_close_then_list_then_summarize() {
        let fx = PiFixture::new(PiConfig::default());
        let t = PiFixture::token(0xb2);
        fx.approved_proposal(t);

        let reply = fx
            .set_billing_status(t, BillingStatus::Closed, "done")
            .await
            .unwrap();
        assert_eq!(reply.timestamp, GENESIS);

        let changes = fx
            .service
            .billing_status_changes(&t)
            .await
            .unwrap()
            .billing_status_changes;
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].status, BillingStatus::Closed);
        assert_eq!(changes[0].reason, "done");
        assert_eq!(changes[0].token, t.to_hex());
        assert_eq!(changes[0].receipt, reply.receipt);

        assert_eq!(fx.summary_status(t).await.unwrap(), ProposalStatus::Closed);
    }

    // =============================================================================
    // SCENARIO C: CLOSE WITHOUT A REASON
    // =============================================================================

    #[tokio::test]
    async fn test_close_without_reason_rejected_before_write() {
        let fx = PiFixture::new(PiConfig::default());
        let t = PiFixture::token(0xc3);
        fx.approved_proposal(t);

        let err = fx
            .set_billing_status(t, BillingStatus::Closed, "")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Policy);
        assert_eq!(err.code(), Some(ErrorCode::BillingStatusChangeNotAllowed));

        assert_eq!(fx.backend.calls().blob_save(), 0);
        assert!(fx.backend.blobs(&t).is_empty());
    }

    // =============================================================================
    // SCENARIO D: VOTE NOT APPROVED
    // =============================================================================

    #[tokio::test]
    async fn test_vote_started_rejected() {
        let fx = PiFixture::new(PiConfig::default());
        let t = PiFixture::token(0xd4);
        fx.proposal(t, RecordState::Vetted, RecordStatus::Public, VoteStatus::Started);

        let err = fx
            .set_billing_status(t, BillingStatus::Completed, "")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Policy);
        assert!(err.to_string().contains("vote was approved"));
        assert!(fx.backend.blobs(&t).is_empty());
    }

    // =============================================================================
    // SCENARIO E: CHANGE LIMIT
    // =============================================================================

    #[tokio::test]
    async fn test_third_change_exceeds_limit_of_two() {
        let fx = PiFixture::new(config_with_max(2));
        let t = PiFixture::token(0xe5);
        fx.approved_proposal(t);

        fx.set_billing_status(t, BillingStatus::Closed, "paused")
            .await
            .unwrap();
        fx.clock.advance(60);
        fx.set_billing_status(t, BillingStatus::Active, "")
            .await
            .unwrap();
        fx.clock.advance(60);

        // Active -> Completed is legal, the limit still wins.
        let err = fx
            .set_billing_status(t, BillingStatus::Completed, "")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Policy);
        assert!(err.to_string().contains("exceeds the maximum"));
        assert_eq!(fx.backend.blobs(&t).len(), 2);
    }

    // =============================================================================
    // FULL BILLING ROUND TRIP
    // =============================================================================

    #[tokio::test]
    async fn test_billing_status_round_trip() {
        let fx = PiFixture::new(config_with_max(3));
        let t = PiFixture::token(0x11);
        fx.approved_proposal(t);

        let steps = [
            (BillingStatus::Closed, "on hold", ProposalStatus::Closed),
            (BillingStatus::Active, "", ProposalStatus::Active),
            (BillingStatus::Completed, "", ProposalStatus::Completed),
        ];
        for (status, reason, want) in steps {
            fx.set_billing_status(t, status, reason).await.unwrap();
            assert_eq!(fx.summary_status(t).await.unwrap(), want);
            fx.clock.advance(1);
        }

        let changes = fx
            .service
            .billing_status_changes(&t)
            .await
            .unwrap()
            .billing_status_changes;
        let statuses: Vec<_> = changes.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![
                BillingStatus::Closed,
                BillingStatus::Active,
                BillingStatus::Completed
            ]
        );
        assert!(changes.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_repeating_current_status_rejected() {
        let fx = PiFixture::new(config_with_max(3));
        let t = PiFixture::token(0x12);
        fx.approved_proposal(t);

        fx.set_billing_status(t, BillingStatus::Completed, "")
            .await
            .unwrap();
        let err = fx
            .set_billing_status(t, BillingStatus::Completed, "")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("completed to completed"));
    }

    #[tokio::test]
    async fn test_billing_status_changes_empty() {
        let fx = PiFixture::new(PiConfig::default());
        let t = PiFixture::token(0x13);
        fx.approved_proposal(t);

        let reply = fx.service.billing_status_changes(&t).await.unwrap();
        assert!(reply.billing_status_changes.is_empty());
    }

    // =============================================================================
    // JSON COMMAND SURFACE
    // =============================================================================

    #[tokio::test]
    async fn test_json_commands() {
        let fx = PiFixture::new(PiConfig::default());
        let t = PiFixture::token(0x14);
        fx.approved_proposal(t);

        let payload =
            serde_json::to_string(&fx.signed_request(t, BillingStatus::Completed, "")).unwrap();
        let reply: serde_json::Value = serde_json::from_str(
            &fx.service
                .cmd(&t, CMD_SET_BILLING_STATUS, &payload)
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(reply["timestamp"], GENESIS);
        assert!(reply["receipt"].is_string());

        let reply: serde_json::Value = serde_json::from_str(
            &fx.service
                .cmd(&t, CMD_BILLING_STATUS_CHANGES, "")
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(reply["billingstatuschanges"][0]["status"], 3);
        assert_eq!(reply["billingstatuschanges"][0]["token"], t.to_hex());

        let reply = fx.service.cmd(&t, CMD_SUMMARY, "").await.unwrap();
        assert_eq!(reply, r#"{"summary":{"status":12}}"#);
    }

    #[tokio::test]
    async fn test_out_of_range_status_code_is_invalid_status() {
        let fx = PiFixture::new(PiConfig::default());
        let t = PiFixture::token(0x15);
        fx.approved_proposal(t);

        let mut payload =
            serde_json::to_value(fx.signed_request(t, BillingStatus::Completed, "")).unwrap();
        payload["status"] = serde_json::json!(42);

        let err = fx
            .service
            .cmd(&t, CMD_SET_BILLING_STATUS, &payload.to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BillingStatusInvalid));
    }
}
