//! Serializable view of a deployment's state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tokengate_core::{Address, Amount, ClaimTopic, CountryCode, TokenConfig, TokenState};
use tokengate_crypto::KeyHash;
use tokengate_identity::{Claim, KeyPurpose};

use crate::deployment::Deployment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub topic: ClaimTopic,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRecord {
    pub address: Address,
    pub name: String,
    pub topics: Vec<ClaimTopic>,
    pub claim_keys: Vec<KeyHash>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub wallet: Address,
    pub name: Option<String>,
    pub identity: Address,
    pub country: CountryCode,
    pub registered_at: DateTime<Utc>,
    pub verified: bool,
    pub claims: Vec<Claim>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub address: Address,
    pub metadata: TokenConfig,
    pub state: TokenState,
    pub total_supply: Amount,
    pub agents: Vec<Address>,
    pub compliance_modules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub deployer: Address,
    pub identity_registry: Address,
    pub token: Address,
    pub taken_at: DateTime<Utc>,
}

/// Everything persisted after a run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub topics: Vec<TopicRecord>,
    pub issuers: Vec<IssuerRecord>,
    pub identities: Vec<IdentityRecord>,
    pub balances: Vec<(Address, Amount)>,
    pub token: TokenRecord,
    pub deployment: DeploymentRecord,
}

impl Snapshot {
    pub fn capture(d: &Deployment) -> Self {
        let topics = d
            .claim_topics
            .claim_topics()
            .into_iter()
            .map(|topic| TopicRecord {
                topic,
                name: d
                    .topics
                    .iter()
                    .find(|(_, t)| **t == topic)
                    .map(|(name, _)| name.clone()),
            })
            .collect();

        let issuers = d
            .trusted_issuers
            .trusted_issuers()
            .into_iter()
            .filter_map(|address| {
                let issuer = d.trusted_issuers.issuer(&address)?;
                let name = d
                    .issuers
                    .values()
                    .find(|h| h.issuer.address() == address)
                    .map(|h| h.name.clone())
                    .unwrap_or_default();
                Some(IssuerRecord {
                    address,
                    name,
                    topics: d.trusted_issuers.issuer_topics(&address).ok()?,
                    claim_keys: issuer.identity().keys_by_purpose(KeyPurpose::Claim),
                })
            })
            .collect();

        let identities = d
            .storage
            .wallets()
            .into_iter()
            .filter_map(|wallet| {
                let record = d.storage.record(&wallet)?;
                Some(IdentityRecord {
                    wallet,
                    name: d
                        .investors
                        .values()
                        .find(|i| i.wallet == wallet)
                        .map(|i| i.name.clone()),
                    identity: record.identity.address(),
                    country: record.country,
                    registered_at: record.registered_at,
                    verified: d.identity_registry.is_verified(&wallet),
                    claims: record.identity.claims(),
                })
            })
            .collect();

        Self {
            topics,
            issuers,
            identities,
            balances: d.token.balances(),
            token: TokenRecord {
                address: d.token.address(),
                metadata: d.token.metadata().clone(),
                state: d.token.state(),
                total_supply: d.token.total_supply(),
                agents: d.token.agents(),
                compliance_modules: d.compliance.module_names(),
            },
            deployment: DeploymentRecord {
                deployer: d.deployer,
                identity_registry: d.identity_registry.address(),
                token: d.token.address(),
                taken_at: Utc::now(),
            },
        }
    }
}
