//! Wires every ledger entity in dependency order and seeds it from config.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

use tokengate_compliance::{
    ModularCompliance, SupplyLimitModule, TransferLimitModule, TransferLimits,
};
use tokengate_core::{Address, Amount, ClaimTopic, CountryCode};
use tokengate_crypto::{hash, sign_claim, KeyPair};
use tokengate_identity::{ClaimIssuer, Identity, KeyPurpose, KeyType, SCHEME_ED25519};
use tokengate_registry::{
    ClaimTopicsRegistry, IdentityRegistry, IdentityRegistryStorage, TrustedIssuersRegistry,
};
use tokengate_token::Token;

use crate::config::{ScenarioConfig, TokenGateConfig};

const DEPLOY_DOMAIN: &str = "tokengate.deploy.v1";

/// Address of the `nonce`-th entity deployed by `deployer`.
pub fn deploy_address(deployer: &Address, nonce: u64) -> Address {
    let mut material = Vec::with_capacity(40);
    material.extend_from_slice(deployer.as_bytes());
    material.extend_from_slice(&nonce.to_be_bytes());
    Address::derive(DEPLOY_DOMAIN, &material)
}

/// Deterministic wallet key for a named participant.
pub fn named_wallet(name: &str) -> KeyPair {
    KeyPair::from_seed(&hash(format!("tokengate.wallet-seed.{}", name).as_bytes()))
}

/// A trusted issuer and the key it signs claims with.
#[derive(Debug)]
pub struct IssuerHandle {
    pub name: String,
    pub manager: Address,
    pub issuer: Arc<ClaimIssuer>,
    pub claim_key: KeyPair,
}

#[derive(Debug, Clone)]
pub struct Investor {
    pub name: String,
    pub wallet: Address,
    pub identity: Arc<Identity>,
}

/// Every entity of one running deployment.
#[derive(Debug)]
pub struct Deployment {
    pub deployer: Address,
    pub agent: Address,
    pub claim_topics: Arc<ClaimTopicsRegistry>,
    pub trusted_issuers: Arc<TrustedIssuersRegistry>,
    pub storage: Arc<IdentityRegistryStorage>,
    pub identity_registry: Arc<IdentityRegistry>,
    pub compliance: Arc<ModularCompliance>,
    pub token: Token,
    /// Topic name → topic.
    pub topics: BTreeMap<String, ClaimTopic>,
    pub issuers: BTreeMap<String, IssuerHandle>,
    pub investors: BTreeMap<String, Investor>,
}

impl Deployment {
    /// Deploy and wire the registries, compliance and token, then seed
    /// topics, issuers, investors and their claims.
    pub fn bootstrap(config: &TokenGateConfig) -> Result<Self> {
        config.validate()?;

        let deployer = named_wallet("deployer").address();
        let agent = named_wallet("token-agent").address();

        let trusted_issuers = Arc::new(TrustedIssuersRegistry::new(deployer));
        let claim_topics = Arc::new(ClaimTopicsRegistry::new(deployer));
        let storage = Arc::new(IdentityRegistryStorage::new(deployer));
        let identity_registry = Arc::new(IdentityRegistry::init(
            deploy_address(&deployer, 3),
            deployer,
            trusted_issuers.clone(),
            claim_topics.clone(),
            storage.clone(),
        ));
        storage.bind_identity_registry(&deployer, identity_registry.address())?;

        let compliance = Arc::new(ModularCompliance::new(deployer));
        let token = Token::new(
            deploy_address(&deployer, 5),
            deployer,
            config.token.clone(),
            identity_registry.clone(),
            compliance.clone(),
        )?;
        compliance.bind_token(&deployer, token.address())?;
        install_modules(&compliance, &deployer, config)?;

        tracing::info!(
            identity_registry = %identity_registry.address(),
            token = %token.address(),
            "ledger deployed"
        );

        let mut deployment = Self {
            deployer,
            agent,
            claim_topics,
            trusted_issuers,
            storage,
            identity_registry,
            compliance,
            token,
            topics: BTreeMap::new(),
            issuers: BTreeMap::new(),
            investors: BTreeMap::new(),
        };

        for name in &config.registry.claim_topics {
            let topic = deployment.topic(name);
            deployment
                .claim_topics
                .add_claim_topic(&deployer, topic)
                .with_context(|| format!("adding claim topic '{}'", name))?;
        }

        for issuer in &config.issuers {
            deployment.add_issuer(&issuer.name, &issuer.topics)?;
        }

        deployment.token.add_agent(&deployer, agent)?;
        deployment.identity_registry.add_agent(&deployer, agent)?;

        for investor in &config.investors {
            deployment.add_investor(&investor.name, CountryCode(investor.country))?;
            for claim in &investor.claims {
                deployment.attach_claim(&investor.name, &claim.issuer, &claim.topic, &claim.data, &claim.uri)?;
            }
        }

        Ok(deployment)
    }

    /// Topic for `name`, remembering the name for snapshots.
    fn topic(&mut self, name: &str) -> ClaimTopic {
        *self
            .topics
            .entry(name.to_string())
            .or_insert_with(|| ClaimTopic::from_name(name))
    }

    /// Create a claim issuer with a fresh claim key and trust it for `topics`.
    pub fn add_issuer(&mut self, name: &str, topics: &[String]) -> Result<()> {
        let manager = named_wallet(name).address();
        let issuer = Arc::new(ClaimIssuer::new(&manager));
        let claim_key = KeyPair::generate();
        issuer.add_key(&manager, claim_key.key_hash(), KeyPurpose::Claim, KeyType::Ed25519)?;

        let topics: Vec<ClaimTopic> = topics.iter().map(|t| self.topic(t)).collect();
        self.trusted_issuers
            .add_trusted_issuer(&self.deployer, issuer.clone(), topics)
            .with_context(|| format!("trusting issuer '{}'", name))?;

        tracing::info!(issuer = name, address = %issuer.address(), "claim issuer deployed");
        self.issuers.insert(
            name.to_string(),
            IssuerHandle {
                name: name.to_string(),
                manager,
                issuer,
                claim_key,
            },
        );
        Ok(())
    }

    /// Create an identity for the named wallet and register it.
    pub fn add_investor(&mut self, name: &str, country: CountryCode) -> Result<()> {
        let wallet = named_wallet(name).address();
        let identity = Arc::new(Identity::new(&wallet));
        self.identity_registry
            .register_identity(&self.agent, wallet, identity.clone(), country)
            .with_context(|| format!("registering investor '{}'", name))?;

        self.investors.insert(
            name.to_string(),
            Investor {
                name: name.to_string(),
                wallet,
                identity,
            },
        );
        Ok(())
    }

    /// Have `issuer` sign a claim on `topic` and the investor attach it.
    pub fn attach_claim(
        &mut self,
        investor: &str,
        issuer: &str,
        topic: &str,
        data: &str,
        uri: &str,
    ) -> Result<()> {
        let topic = self.topic(topic);
        let investor = self.investor(investor)?.clone();
        let handle = self
            .issuers
            .get(issuer)
            .with_context(|| format!("unknown issuer '{}'", issuer))?;

        let signature = sign_claim(
            &investor.identity.address(),
            topic,
            data.as_bytes(),
            &handle.claim_key,
        );
        investor.identity.add_claim(
            &investor.wallet,
            topic,
            SCHEME_ED25519,
            handle.issuer.address(),
            signature.to_bytes(),
            data.as_bytes().to_vec(),
            uri.to_string(),
        )?;
        Ok(())
    }

    pub fn investor(&self, name: &str) -> Result<&Investor> {
        self.investors
            .get(name)
            .with_context(|| format!("unknown investor '{}'", name))
    }

    pub fn balance_of(&self, name: &str) -> Result<Amount> {
        Ok(self.token.balance_of(&self.investor(name)?.wallet))
    }

    /// Mint, unpause and transfer as configured, logging balances as it goes.
    pub fn run_scenario(&self, scenario: &ScenarioConfig) -> Result<()> {
        for step in &scenario.mints {
            let to = self.investor(&step.to)?;
            self.token
                .mint(&self.agent, &to.wallet, step.amount)
                .with_context(|| format!("minting {} to '{}'", step.amount, step.to))?;
        }
        self.log_balances("after mint")?;

        if scenario.unpause && self.token.is_paused() {
            self.token.unpause(&self.agent)?;
        }

        for step in &scenario.transfers {
            let from = self.investor(&step.from)?;
            let to = self.investor(&step.to)?;
            self.token
                .transfer(&from.wallet, &to.wallet, step.amount)
                .with_context(|| {
                    format!("transferring {} from '{}' to '{}'", step.amount, step.from, step.to)
                })?;
        }
        self.log_balances("after transfers")?;
        Ok(())
    }

    fn log_balances(&self, stage: &str) -> Result<()> {
        for name in self.investors.keys() {
            let balance = self.balance_of(name)?;
            tracing::info!(stage, investor = %name, balance, "balance");
        }
        Ok(())
    }
}

fn install_modules(
    compliance: &ModularCompliance,
    owner: &Address,
    config: &TokenGateConfig,
) -> Result<()> {
    let c = &config.compliance;
    if c.max_per_transfer.is_some() || c.max_outbound.is_some() {
        compliance.add_module(
            owner,
            Box::new(TransferLimitModule::new(TransferLimits {
                max_per_transfer: c.max_per_transfer,
                max_outbound: c.max_outbound,
            })),
        )?;
    }
    if let Some(cap) = c.supply_cap {
        compliance.add_module(owner, Box::new(SupplyLimitModule::new(cap)))?;
    }
    Ok(())
}
