use serde::Serialize;
use std::sync::Arc;

use tokengate_core::{ensure_caller, Address, AgentRoles, ClaimTopic, CountryCode, Result};
use tokengate_identity::{Claim, Identity};

use crate::claim_topics::ClaimTopicsRegistry;
use crate::storage::IdentityRegistryStorage;
use crate::trusted_issuers::TrustedIssuersRegistry;

/// Outcome of verifying one wallet against the required topics.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub wallet: Address,
    /// Identity the wallet is registered with, if any.
    pub identity: Option<Address>,
    pub verified: bool,
    /// One entry per required topic, in registry order.
    pub checks: Vec<TopicCheck>,
}

/// Result of checking a single required topic.
#[derive(Debug, Clone, Serialize)]
pub struct TopicCheck {
    pub topic: ClaimTopic,
    pub satisfied: bool,
    /// Why the topic is unsatisfied, or which issuer satisfied it.
    pub detail: Option<String>,
}

/// Answers whether a wallet is verified: registered, and holding a valid
/// claim from a trusted issuer for every required topic.
#[derive(Debug)]
pub struct IdentityRegistry {
    address: Address,
    owner: Address,
    agents: AgentRoles,
    trusted_issuers: Arc<TrustedIssuersRegistry>,
    claim_topics: Arc<ClaimTopicsRegistry>,
    storage: Arc<IdentityRegistryStorage>,
}

impl IdentityRegistry {
    /// Wire the registry to its dependencies. The storage must separately
    /// bind `address` before registrations succeed.
    pub fn init(
        address: Address,
        owner: Address,
        trusted_issuers: Arc<TrustedIssuersRegistry>,
        claim_topics: Arc<ClaimTopicsRegistry>,
        storage: Arc<IdentityRegistryStorage>,
    ) -> Self {
        tracing::info!(registry = %address.short(), owner = %owner.short(), "identity registry initialized");
        Self {
            address,
            owner,
            agents: AgentRoles::new(),
            trusted_issuers,
            claim_topics,
            storage,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn trusted_issuers_registry(&self) -> &Arc<TrustedIssuersRegistry> {
        &self.trusted_issuers
    }

    pub fn claim_topics_registry(&self) -> &Arc<ClaimTopicsRegistry> {
        &self.claim_topics
    }

    pub fn identity_storage(&self) -> &Arc<IdentityRegistryStorage> {
        &self.storage
    }

    pub fn add_agent(&self, caller: &Address, agent: Address) -> Result<()> {
        ensure_caller(&self.owner, caller, "add registry agent")?;
        if self.agents.grant(agent) {
            tracing::info!(registry = %self.address.short(), agent = %agent.short(), "registry agent added");
        }
        Ok(())
    }

    pub fn is_agent(&self, address: &Address) -> bool {
        self.agents.is_agent(address)
    }

    /// Register `wallet` with `identity`. Agent only.
    pub fn register_identity(
        &self,
        caller: &Address,
        wallet: Address,
        identity: Arc<Identity>,
        country: CountryCode,
    ) -> Result<()> {
        self.agents.ensure(caller, "register identity")?;
        self.storage
            .register_identity(&self.address, wallet, identity, country)
    }

    pub fn update_country(
        &self,
        caller: &Address,
        wallet: &Address,
        country: CountryCode,
    ) -> Result<()> {
        self.agents.ensure(caller, "update investor country")?;
        self.storage.update_country(&self.address, wallet, country)
    }

    pub fn delete_identity(&self, caller: &Address, wallet: &Address) -> Result<()> {
        self.agents.ensure(caller, "delete identity")?;
        self.storage.delete_identity(&self.address, wallet)
    }

    pub fn contains(&self, wallet: &Address) -> bool {
        self.storage.contains(wallet)
    }

    pub fn identity_of(&self, wallet: &Address) -> Result<Arc<Identity>> {
        self.storage.identity_of(wallet)
    }

    pub fn country_of(&self, wallet: &Address) -> Result<CountryCode> {
        self.storage.country_of(wallet)
    }

    pub fn is_verified(&self, wallet: &Address) -> bool {
        self.verification_report(wallet).verified
    }

    /// Evaluate `wallet` topic by topic.
    ///
    /// A topic is satisfied by any claim on it whose issuer is trusted for
    /// that topic and accepts the claim signature. Every required topic must
    /// be satisfied. With no required topics every wallet is verified, even
    /// an unregistered one.
    pub fn verification_report(&self, wallet: &Address) -> VerificationReport {
        let topics = self.claim_topics.claim_topics();
        if topics.is_empty() {
            return VerificationReport {
                wallet: *wallet,
                identity: self.storage.identity_of(wallet).ok().map(|i| i.address()),
                verified: true,
                checks: Vec::new(),
            };
        }

        let identity = match self.storage.identity_of(wallet) {
            Ok(identity) => identity,
            Err(_) => {
                tracing::debug!(wallet = %wallet.short(), "verification failed: wallet not registered");
                return VerificationReport {
                    wallet: *wallet,
                    identity: None,
                    verified: false,
                    checks: Vec::new(),
                };
            }
        };

        // One snapshot for every topic.
        let claims = identity.claims();
        let checks: Vec<TopicCheck> = topics
            .into_iter()
            .map(|topic| self.check_topic(identity.address(), topic, &claims))
            .collect();
        let verified = checks.iter().all(|c| c.satisfied);

        tracing::debug!(
            wallet = %wallet.short(),
            identity = %identity.address().short(),
            verified,
            "wallet verification evaluated"
        );

        VerificationReport {
            wallet: *wallet,
            identity: Some(identity.address()),
            verified,
            checks,
        }
    }

    fn check_topic(&self, identity: Address, topic: ClaimTopic, claims: &[Claim]) -> TopicCheck {
        let on_topic: Vec<&Claim> = claims.iter().filter(|c| c.topic == topic).collect();
        if on_topic.is_empty() {
            return TopicCheck {
                topic,
                satisfied: false,
                detail: Some(format!("no claim on topic {}", topic)),
            };
        }

        let mut trusted_candidates = 0usize;
        for claim in on_topic {
            if !self.trusted_issuers.is_trusted_for_topic(&claim.issuer, topic) {
                continue;
            }
            let Some(issuer) = self.trusted_issuers.issuer(&claim.issuer) else {
                continue;
            };
            trusted_candidates += 1;
            if issuer.is_claim_valid(&identity, topic, &claim.signature, &claim.data) {
                return TopicCheck {
                    topic,
                    satisfied: true,
                    detail: Some(format!("satisfied by issuer {}", claim.issuer)),
                };
            }
        }

        let detail = if trusted_candidates == 0 {
            format!("no claim on topic {} from a trusted issuer", topic)
        } else {
            format!(
                "{} claim(s) from trusted issuers on topic {} failed signature validation",
                trusted_candidates, topic
            )
        };
        TopicCheck {
            topic,
            satisfied: false,
            detail: Some(detail),
        }
    }
}
