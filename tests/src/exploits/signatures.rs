//! # Signature Attacks
//!
//! A client without the author's approval tries to push a billing status
//! change by forging, stretching or replaying a signature. Each attempt
//! must fail with the right user error and leave storage untouched.

#[cfg(test)]
mod tests {
    use crate::fixtures::{sign_request, PiFixture};
    use pi_plugin::{
        BillingStatus, Ed25519Identity, ErrorCode, ErrorKind, PiConfig, PiPluginApi, Token,
    };

    fn assert_rejected_without_write(fx: &PiFixture, token: &Token) {
        assert_eq!(fx.backend.calls().blob_save(), 0);
        assert!(fx.backend.blobs(token).is_empty());
    }

    #[tokio::test]
    async fn test_signature_by_other_key() {
        let fx = PiFixture::new(PiConfig::for_testing());
        let t = PiFixture::token(0x81);
        fx.approved_proposal(t);

        // Signed by the attacker, presented with the client's public key.
        let attacker = Ed25519Identity::generate();
        let mut req = sign_request(&attacker, &t.to_hex(), BillingStatus::Completed, "");
        req.public_key = fx.client.public_key_hex();

        let err = fx.service.set_billing_status(&t, req).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::SignatureInvalid));
        assert_eq!(err.kind(), ErrorKind::Signature);
        assert_rejected_without_write(&fx, &t);
    }

    #[tokio::test]
    async fn test_reason_swapped_after_signing() {
        let fx = PiFixture::new(PiConfig::for_testing());
        let t = PiFixture::token(0x82);
        fx.approved_proposal(t);

        let mut req = fx.signed_request(t, BillingStatus::Closed, "milestone missed");
        req.reason = "completed early".into();

        let err = fx.service.set_billing_status(&t, req).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::SignatureInvalid));
        assert_rejected_without_write(&fx, &t);
    }

    #[tokio::test]
    async fn test_status_swapped_after_signing() {
        let fx = PiFixture::new(PiConfig::for_testing());
        let t = PiFixture::token(0x83);
        fx.approved_proposal(t);

        let mut req = fx.signed_request(t, BillingStatus::Closed, "x");
        req.status = BillingStatus::Completed;

        let err = fx.service.set_billing_status(&t, req).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::SignatureInvalid));
        assert_rejected_without_write(&fx, &t);
    }

    #[tokio::test]
    async fn test_malformed_key_and_signature() {
        let fx = PiFixture::new(PiConfig::for_testing());
        let t = PiFixture::token(0x84);
        fx.approved_proposal(t);

        let mut req = fx.signed_request(t, BillingStatus::Completed, "");
        req.public_key = "00".repeat(31);
        let err = fx.service.set_billing_status(&t, req).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::PublicKeyInvalid));

        let mut req = fx.signed_request(t, BillingStatus::Completed, "");
        req.signature.truncate(100);
        let err = fx.service.set_billing_status(&t, req).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::SignatureInvalid));

        assert_rejected_without_write(&fx, &t);
    }

    #[tokio::test]
    async fn test_replay_against_other_proposal() {
        // A valid request for proposal A is replayed as a command on B.
        let fx = PiFixture::new(PiConfig::for_testing());
        let a = PiFixture::token(0x85);
        let b = PiFixture::token(0x86);
        fx.approved_proposal(a);
        fx.approved_proposal(b);

        let req = fx.signed_request(a, BillingStatus::Completed, "");
        let err = fx.service.set_billing_status(&b, req).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::TokenInvalid));
        assert!(err.to_string().contains(&format!("got {}, want {}", a, b)));
        assert_rejected_without_write(&fx, &b);
    }

    #[tokio::test]
    async fn test_replay_with_rewritten_token() {
        // Rewriting the payload token to match breaks the signature instead.
        let fx = PiFixture::new(PiConfig::for_testing());
        let a = PiFixture::token(0x87);
        let b = PiFixture::token(0x88);
        fx.approved_proposal(a);
        fx.approved_proposal(b);

        let mut req = fx.signed_request(a, BillingStatus::Completed, "");
        req.token = b.to_hex();
        let err = fx.service.set_billing_status(&b, req).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::SignatureInvalid));
    }

    #[tokio::test]
    async fn test_short_payload_token_rejected() {
        let fx = PiFixture::new(PiConfig::for_testing());
        let t = PiFixture::token(0xab);
        fx.approved_proposal(t);

        let short = &t.to_hex()[..8];
        let req = sign_request(&fx.client, short, BillingStatus::Completed, "");
        let err = fx.service.set_billing_status(&t, req).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::TokenInvalid));
    }

    #[tokio::test]
    async fn test_exact_replay_hits_transition_rules() {
        // Resubmitting an accepted request cannot repeat the change.
        let fx = PiFixture::new(PiConfig::for_testing());
        let t = PiFixture::token(0x89);
        fx.approved_proposal(t);

        let req = fx.signed_request(t, BillingStatus::Completed, "");
        fx.service.set_billing_status(&t, req.clone()).await.unwrap();
        fx.clock.advance(5);

        let err = fx.service.set_billing_status(&t, req).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BillingStatusChangeNotAllowed));
        assert_eq!(fx.backend.blobs(&t).len(), 1);
    }

    #[tokio::test]
    async fn test_receipt_proves_server_acknowledgement() {
        let fx = PiFixture::new(PiConfig::for_testing());
        let t = PiFixture::token(0x8a);
        fx.approved_proposal(t);

        let req = fx.signed_request(t, BillingStatus::Completed, "");
        let client_sig = req.signature.clone();
        let reply = fx.service.set_billing_status(&t, req).await.unwrap();

        pi_plugin::verify_hex(
            &reply.receipt,
            &fx.server.public_key_hex(),
            client_sig.as_bytes(),
        )
        .unwrap();

        // The receipt does not verify under the client's key.
        assert!(pi_plugin::verify_hex(
            &reply.receipt,
            &fx.client.public_key_hex(),
            client_sig.as_bytes()
        )
        .is_err());
    }
}
