//! Integration test: compliance modules driving token movement.

use tokengate_compliance::{SupplyLimitModule, TransferLimitModule, TransferLimits};
use tokengate_core::{ProtocolError, TokenState};
use tokengate_integration_tests::{TestLedger, AGENT, DEPLOYER, TOKEN};

/// No required topics: every wallet is verified.
fn open_ledger() -> TestLedger {
    let ledger = TestLedger::deploy(&[]);
    ledger.token.unpause(&AGENT).unwrap();
    ledger
}

#[test]
fn test_velocity_limit_across_transfers() {
    let ledger = open_ledger();
    ledger
        .compliance
        .add_module(
            &DEPLOYER,
            Box::new(TransferLimitModule::new(TransferLimits {
                max_per_transfer: None,
                max_outbound: Some(150),
            })),
        )
        .unwrap();

    let bob = ledger.onboard(0xb0);
    let alice = ledger.onboard(0xa1);
    ledger.token.mint(&AGENT, &bob.wallet, 500).unwrap();

    ledger.token.transfer(&bob.wallet, &alice.wallet, 100).unwrap();
    ledger.token.transfer(&bob.wallet, &alice.wallet, 50).unwrap();
    assert_eq!(
        ledger.token.transfer(&bob.wallet, &alice.wallet, 1),
        Err(ProtocolError::ComplianceRejected {
            from: bob.wallet,
            to: alice.wallet,
            amount: 1
        })
    );
    // Alice's own outbound budget is separate.
    ledger.token.transfer(&alice.wallet, &bob.wallet, 150).unwrap();
    assert_eq!(ledger.token.balance_of(&bob.wallet), 500);
}

#[test]
fn test_module_removal_lifts_restriction() {
    let ledger = open_ledger();
    ledger
        .compliance
        .add_module(
            &DEPLOYER,
            Box::new(TransferLimitModule::new(TransferLimits {
                max_per_transfer: Some(1),
                max_outbound: None,
            })),
        )
        .unwrap();
    let bob = ledger.onboard(0xb0);
    let alice = ledger.onboard(0xa1);
    ledger.token.mint(&AGENT, &bob.wallet, 10).unwrap();

    assert!(ledger.token.transfer(&bob.wallet, &alice.wallet, 10).is_err());
    ledger
        .compliance
        .remove_module(&DEPLOYER, TransferLimitModule::NAME)
        .unwrap();
    ledger.token.transfer(&bob.wallet, &alice.wallet, 10).unwrap();
}

#[test]
fn test_supply_cap_tracks_mint_and_burn() {
    let ledger = open_ledger();
    ledger
        .compliance
        .add_module(&DEPLOYER, Box::new(SupplyLimitModule::new(1_000)))
        .unwrap();
    let bob = ledger.onboard(0xb0);

    ledger.token.mint(&AGENT, &bob.wallet, 1_000).unwrap();
    assert!(matches!(
        ledger.token.mint(&AGENT, &bob.wallet, 1),
        Err(ProtocolError::ComplianceRejected { .. })
    ));
    ledger.token.burn(&AGENT, &bob.wallet, 250).unwrap();
    ledger.token.mint(&AGENT, &bob.wallet, 250).unwrap();
    assert_eq!(ledger.token.total_supply(), 1_000);
}

#[test]
fn test_supply_cap_installed_after_mint() {
    let ledger = open_ledger();
    let bob = ledger.onboard(0xb0);
    ledger.token.mint(&AGENT, &bob.wallet, 900).unwrap();

    ledger
        .compliance
        .add_module(&DEPLOYER, Box::new(SupplyLimitModule::new(1_000)))
        .unwrap();
    assert!(matches!(
        ledger.token.mint(&AGENT, &bob.wallet, 900),
        Err(ProtocolError::ComplianceRejected { .. })
    ));
    assert_eq!(ledger.token.total_supply(), 900);
    assert_eq!(ledger.token.balance_of(&bob.wallet), 900);
}

#[test]
fn test_hooks_reject_callers_other_than_token() {
    let ledger = open_ledger();
    let bob = ledger.onboard(0xb0);
    assert_eq!(
        ledger
            .compliance
            .transferred(&bob.wallet, &bob.wallet, &bob.wallet, 1),
        Err(ProtocolError::CallerNotBoundToken { caller: bob.wallet })
    );
    assert!(ledger
        .compliance
        .transferred(&TOKEN, &bob.wallet, &bob.wallet, 1)
        .is_ok());
}

#[test]
fn test_failed_transfer_leaves_state_unchanged() {
    let ledger = open_ledger();
    let bob = ledger.onboard(0xb0);
    let alice = ledger.onboard(0xa1);
    ledger.token.mint(&AGENT, &bob.wallet, 30).unwrap();

    assert!(matches!(
        ledger.token.transfer(&bob.wallet, &alice.wallet, 31),
        Err(ProtocolError::InsufficientBalance { balance: 30, requested: 31, .. })
    ));
    assert_eq!(ledger.token.balance_of(&bob.wallet), 30);
    assert_eq!(ledger.token.balance_of(&alice.wallet), 0);
    assert_eq!(ledger.token.state(), TokenState::Unpaused);
}
