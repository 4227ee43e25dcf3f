//! Shared fixtures for the cross-crate tests: a fully wired ledger with
//! helpers to create issuers, onboard investors and hand out claims.

use std::sync::Arc;

use tokengate_compliance::ModularCompliance;
use tokengate_core::{Address, ClaimTopic, CountryCode, TokenConfig};
use tokengate_crypto::{sign_claim, KeyPair};
use tokengate_identity::{ClaimId, ClaimIssuer, Identity, KeyPurpose, KeyType, SCHEME_ED25519};
use tokengate_registry::{
    ClaimTopicsRegistry, IdentityRegistry, IdentityRegistryStorage, TrustedIssuersRegistry,
};
use tokengate_token::Token;

pub const DEPLOYER: Address = Address::new([0xd0; 32]);
pub const AGENT: Address = Address::new([0xa0; 32]);
pub const REGISTRY: Address = Address::new([0xe0; 32]);
pub const TOKEN: Address = Address::new([0xf0; 32]);
pub const CLAIM_DATA: &[u8] = b"Some claim public data.";

/// A claim issuer together with one of its claim keys.
pub struct TestIssuer {
    pub issuer: Arc<ClaimIssuer>,
    pub manager: Address,
    pub key: KeyPair,
}

/// An investor wallet and its registered identity.
pub struct TestInvestor {
    pub wallet: Address,
    pub identity: Arc<Identity>,
}

pub struct TestLedger {
    pub claim_topics: Arc<ClaimTopicsRegistry>,
    pub trusted_issuers: Arc<TrustedIssuersRegistry>,
    pub storage: Arc<IdentityRegistryStorage>,
    pub registry: Arc<IdentityRegistry>,
    pub compliance: Arc<ModularCompliance>,
    pub token: Token,
}

impl TestLedger {
    /// Deploy and wire every entity the way a deployer would, requiring
    /// `topics`.
    pub fn deploy(topics: &[ClaimTopic]) -> Self {
        let claim_topics = Arc::new(ClaimTopicsRegistry::new(DEPLOYER));
        let trusted_issuers = Arc::new(TrustedIssuersRegistry::new(DEPLOYER));
        let storage = Arc::new(IdentityRegistryStorage::new(DEPLOYER));
        let registry = Arc::new(IdentityRegistry::init(
            REGISTRY,
            DEPLOYER,
            trusted_issuers.clone(),
            claim_topics.clone(),
            storage.clone(),
        ));
        storage
            .bind_identity_registry(&DEPLOYER, REGISTRY)
            .expect("bind registry");

        let compliance = Arc::new(ModularCompliance::new(DEPLOYER));
        let token = Token::new(
            TOKEN,
            DEPLOYER,
            TokenConfig::default(),
            registry.clone(),
            compliance.clone(),
        )
        .expect("token");
        compliance.bind_token(&DEPLOYER, TOKEN).expect("bind token");

        for topic in topics {
            claim_topics
                .add_claim_topic(&DEPLOYER, *topic)
                .expect("add topic");
        }
        token.add_agent(&DEPLOYER, AGENT).expect("token agent");
        registry.add_agent(&DEPLOYER, AGENT).expect("registry agent");

        Self {
            claim_topics,
            trusted_issuers,
            storage,
            registry,
            compliance,
            token,
        }
    }

    /// Create an issuer with one fresh claim key and trust it for `topics`.
    pub fn trusted_issuer(&self, seed: u8, topics: &[ClaimTopic]) -> TestIssuer {
        let issuer = self.untrusted_issuer(seed);
        self.trusted_issuers
            .add_trusted_issuer(&DEPLOYER, issuer.issuer.clone(), topics.to_vec())
            .expect("trust issuer");
        issuer
    }

    /// Create an issuer with one fresh claim key without trusting it.
    pub fn untrusted_issuer(&self, seed: u8) -> TestIssuer {
        let manager = Address::new([seed; 32]);
        let issuer = Arc::new(ClaimIssuer::new(&manager));
        let key = KeyPair::generate();
        issuer
            .add_key(&manager, key.key_hash(), KeyPurpose::Claim, KeyType::Ed25519)
            .expect("add claim key");
        TestIssuer {
            issuer,
            manager,
            key,
        }
    }

    /// Register a fresh identity for the wallet `[seed; 32]`.
    pub fn onboard(&self, seed: u8) -> TestInvestor {
        let wallet = Address::new([seed; 32]);
        let identity = Arc::new(Identity::new(&wallet));
        self.registry
            .register_identity(&AGENT, wallet, identity.clone(), CountryCode(666))
            .expect("register identity");
        TestInvestor { wallet, identity }
    }
}

impl TestInvestor {
    /// Attach a claim on `topic` signed by `signer` in the name of `issuer`.
    pub fn add_claim_signed_by(
        &self,
        issuer: &TestIssuer,
        signer: &KeyPair,
        topic: ClaimTopic,
    ) -> ClaimId {
        let sig = sign_claim(&self.identity.address(), topic, CLAIM_DATA, signer);
        self.identity
            .add_claim(
                &self.wallet,
                topic,
                SCHEME_ED25519,
                issuer.issuer.address(),
                sig.to_bytes(),
                CLAIM_DATA.to_vec(),
                String::new(),
            )
            .expect("add claim")
    }

    /// Attach a claim on `topic` signed by the issuer's own claim key.
    pub fn add_claim(&self, issuer: &TestIssuer, topic: ClaimTopic) -> ClaimId {
        self.add_claim_signed_by(issuer, &issuer.key, topic)
    }
}
