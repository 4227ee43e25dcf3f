//! Integration test: investor onboarding and identity-gated movement.
//!
//! Follows the deployment flow end to end: topics and a trusted issuer are
//! set up, investors are registered and receive signed claims, then tokens
//! are minted and transferred.

use tokengate_core::{ClaimTopic, ProtocolError, TokenState};
use tokengate_crypto::KeyPair;
use tokengate_identity::KeyPurpose;
use tokengate_integration_tests::{TestLedger, AGENT, DEPLOYER};

fn claim_topic() -> ClaimTopic {
    ClaimTopic::from_name("CLAIM_TOPIC")
}

// =========================================================================
// Verification
// =========================================================================

#[test]
fn test_bob_verified_once_claim_attached() {
    let ledger = TestLedger::deploy(&[claim_topic()]);
    let issuer = ledger.trusted_issuer(0x11, &[claim_topic()]);
    let bob = ledger.onboard(0xb0);

    assert!(ledger.registry.contains(&bob.wallet));
    assert!(!ledger.registry.is_verified(&bob.wallet));

    bob.add_claim(&issuer, claim_topic());
    assert!(ledger.registry.is_verified(&bob.wallet));
}

#[test]
fn test_claim_from_unregistered_key_does_not_verify() {
    let ledger = TestLedger::deploy(&[claim_topic()]);
    let issuer = ledger.trusted_issuer(0x11, &[claim_topic()]);
    let bob = ledger.onboard(0xb0);

    let rogue = KeyPair::generate();
    bob.add_claim_signed_by(&issuer, &rogue, claim_topic());
    assert!(!issuer
        .issuer
        .identity()
        .key_has_purpose(&rogue.key_hash(), KeyPurpose::Claim));
    assert!(!ledger.registry.is_verified(&bob.wallet));

    // Registering the key afterwards makes the stored claim valid.
    issuer
        .issuer
        .add_key(
            &issuer.manager,
            rogue.key_hash(),
            KeyPurpose::Claim,
            tokengate_identity::KeyType::Ed25519,
        )
        .unwrap();
    assert!(ledger.registry.is_verified(&bob.wallet));
}

#[test]
fn test_any_trusted_issuer_satisfies_a_topic() {
    let ledger = TestLedger::deploy(&[claim_topic()]);
    let _first = ledger.trusted_issuer(0x11, &[claim_topic()]);
    let second = ledger.trusted_issuer(0x12, &[claim_topic()]);
    let untrusted = ledger.untrusted_issuer(0x13);
    let bob = ledger.onboard(0xb0);

    bob.add_claim(&untrusted, claim_topic());
    assert!(!ledger.registry.is_verified(&bob.wallet));

    bob.add_claim(&second, claim_topic());
    assert!(ledger.registry.is_verified(&bob.wallet));
}

#[test]
fn test_removing_issuer_revokes_verification() {
    let ledger = TestLedger::deploy(&[claim_topic()]);
    let issuer = ledger.trusted_issuer(0x11, &[claim_topic()]);
    let bob = ledger.onboard(0xb0);
    bob.add_claim(&issuer, claim_topic());
    assert!(ledger.registry.is_verified(&bob.wallet));

    ledger
        .trusted_issuers
        .remove_trusted_issuer(&DEPLOYER, &issuer.issuer.address())
        .unwrap();
    assert!(!ledger.registry.is_verified(&bob.wallet));
}

#[test]
fn test_new_required_topic_unverifies_existing_holders() {
    let accreditation = ClaimTopic::from_name("ACCREDITED");
    let ledger = TestLedger::deploy(&[claim_topic()]);
    let issuer = ledger.trusted_issuer(0x11, &[claim_topic(), accreditation]);
    let bob = ledger.onboard(0xb0);
    bob.add_claim(&issuer, claim_topic());
    assert!(ledger.registry.is_verified(&bob.wallet));

    ledger
        .claim_topics
        .add_claim_topic(&DEPLOYER, accreditation)
        .unwrap();
    let report = ledger.registry.verification_report(&bob.wallet);
    assert!(!report.verified);
    assert_eq!(report.checks.len(), 2);
    assert!(report.checks[0].satisfied);
    assert!(!report.checks[1].satisfied);

    bob.add_claim(&issuer, accreditation);
    assert!(ledger.registry.is_verified(&bob.wallet));
}

#[test]
fn test_report_serializes_for_operators() {
    let ledger = TestLedger::deploy(&[claim_topic()]);
    let bob = ledger.onboard(0xb0);
    let report = ledger.registry.verification_report(&bob.wallet);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["verified"], false);
    assert_eq!(json["wallet"], bob.wallet.to_hex());
    assert_eq!(json["checks"][0]["satisfied"], false);
}

// =========================================================================
// Token lifecycle
// =========================================================================

#[test]
fn test_mint_while_paused_then_transfer() {
    let ledger = TestLedger::deploy(&[claim_topic()]);
    let issuer = ledger.trusted_issuer(0x11, &[claim_topic()]);
    let bob = ledger.onboard(0xb0);
    let alice = ledger.onboard(0xa1);
    bob.add_claim(&issuer, claim_topic());
    alice.add_claim(&issuer, claim_topic());

    assert_eq!(ledger.token.state(), TokenState::Paused);
    ledger.token.mint(&AGENT, &bob.wallet, 500).unwrap();
    assert_eq!(ledger.token.balance_of(&bob.wallet), 500);
    assert_eq!(ledger.token.balance_of(&alice.wallet), 0);

    assert_eq!(
        ledger.token.transfer(&bob.wallet, &alice.wallet, 100),
        Err(ProtocolError::TokenPaused)
    );

    ledger.token.unpause(&AGENT).unwrap();
    ledger
        .token
        .transfer(&bob.wallet, &alice.wallet, 100)
        .unwrap();
    assert_eq!(ledger.token.balance_of(&bob.wallet), 400);
    assert_eq!(ledger.token.balance_of(&alice.wallet), 100);
    assert_eq!(ledger.token.total_supply(), 500);
}

#[test]
fn test_transfer_to_unverified_wallet_rejected() {
    let ledger = TestLedger::deploy(&[claim_topic()]);
    let issuer = ledger.trusted_issuer(0x11, &[claim_topic()]);
    let bob = ledger.onboard(0xb0);
    let carol = ledger.onboard(0xc0);
    bob.add_claim(&issuer, claim_topic());

    ledger.token.mint(&AGENT, &bob.wallet, 50).unwrap();
    assert_eq!(
        ledger.token.mint(&AGENT, &carol.wallet, 50),
        Err(ProtocolError::RecipientNotVerified(carol.wallet))
    );

    ledger.token.unpause(&AGENT).unwrap();
    assert_eq!(
        ledger.token.mint(&AGENT, &carol.wallet, 50),
        Err(ProtocolError::RecipientNotVerified(carol.wallet))
    );
    assert_eq!(
        ledger.token.transfer(&bob.wallet, &carol.wallet, 10),
        Err(ProtocolError::RecipientNotVerified(carol.wallet))
    );
    assert_eq!(ledger.token.balance_of(&bob.wallet), 50);
    assert_eq!(ledger.token.total_supply(), 50);
}

#[test]
fn test_pause_and_unpause_are_not_idempotent() {
    let ledger = TestLedger::deploy(&[]);
    assert_eq!(
        ledger.token.pause(&AGENT),
        Err(ProtocolError::AlreadyInState(TokenState::Paused))
    );
    ledger.token.unpause(&AGENT).unwrap();
    assert_eq!(
        ledger.token.unpause(&AGENT),
        Err(ProtocolError::AlreadyInState(TokenState::Unpaused))
    );
    ledger.token.pause(&AGENT).unwrap();
    assert!(ledger.token.is_paused());
}

#[test]
fn test_deleted_identity_cannot_receive() {
    let ledger = TestLedger::deploy(&[claim_topic()]);
    let issuer = ledger.trusted_issuer(0x11, &[claim_topic()]);
    let bob = ledger.onboard(0xb0);
    bob.add_claim(&issuer, claim_topic());
    ledger.token.mint(&AGENT, &bob.wallet, 10).unwrap();

    ledger.registry.delete_identity(&AGENT, &bob.wallet).unwrap();
    assert_eq!(
        ledger.token.mint(&AGENT, &bob.wallet, 10),
        Err(ProtocolError::RecipientNotVerified(bob.wallet))
    );
    // Existing balance is untouched.
    assert_eq!(ledger.token.balance_of(&bob.wallet), 10);
}
