use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use tokengate_core::{ensure_caller, Address, ClaimTopic, ProtocolError, Result};
use tokengate_identity::ClaimIssuer;

#[derive(Debug, Clone)]
struct TrustedIssuer {
    issuer: Arc<ClaimIssuer>,
    topics: Vec<ClaimTopic>,
}

/// Claim issuers the ledger trusts, each for a non-empty set of topics.
///
/// An issuer has an entry exactly when it is trusted for at least one topic.
#[derive(Debug)]
pub struct TrustedIssuersRegistry {
    owner: Address,
    issuers: DashMap<Address, TrustedIssuer>,
}

impl TrustedIssuersRegistry {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            issuers: DashMap::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Trust `issuer` for `topics`. Owner only.
    pub fn add_trusted_issuer(
        &self,
        caller: &Address,
        issuer: Arc<ClaimIssuer>,
        topics: Vec<ClaimTopic>,
    ) -> Result<()> {
        ensure_caller(&self.owner, caller, "add trusted issuer")?;

        let address = issuer.address();
        let topics = dedup(topics);
        if topics.is_empty() {
            return Err(ProtocolError::EmptyTopicSet(address));
        }

        match self.issuers.entry(address) {
            Entry::Occupied(_) => Err(ProtocolError::DuplicateIssuer(address)),
            Entry::Vacant(slot) => {
                tracing::info!(
                    issuer = %address.short(),
                    topics = ?topics,
                    "trusted issuer added"
                );
                slot.insert(TrustedIssuer { issuer, topics });
                Ok(())
            }
        }
    }

    /// Stop trusting `issuer` for every topic. Owner only.
    pub fn remove_trusted_issuer(&self, caller: &Address, issuer: &Address) -> Result<()> {
        ensure_caller(&self.owner, caller, "remove trusted issuer")?;

        self.issuers
            .remove(issuer)
            .ok_or_else(|| ProtocolError::NotFound(format!("trusted issuer {}", issuer)))?;
        tracing::info!(issuer = %issuer.short(), "trusted issuer removed");
        Ok(())
    }

    /// Replace the topic set of an already trusted issuer. Owner only.
    pub fn update_issuer_topics(
        &self,
        caller: &Address,
        issuer: &Address,
        topics: Vec<ClaimTopic>,
    ) -> Result<()> {
        ensure_caller(&self.owner, caller, "update issuer topics")?;

        let topics = dedup(topics);
        if topics.is_empty() {
            return Err(ProtocolError::EmptyTopicSet(*issuer));
        }
        let mut entry = self
            .issuers
            .get_mut(issuer)
            .ok_or_else(|| ProtocolError::NotFound(format!("trusted issuer {}", issuer)))?;
        tracing::info!(issuer = %issuer.short(), topics = ?topics, "trusted issuer topics updated");
        entry.topics = topics;
        Ok(())
    }

    pub fn is_trusted_issuer(&self, issuer: &Address) -> bool {
        self.issuers.contains_key(issuer)
    }

    pub fn is_trusted_for_topic(&self, issuer: &Address, topic: ClaimTopic) -> bool {
        self.issuers
            .get(issuer)
            .is_some_and(|entry| entry.topics.contains(&topic))
    }

    /// Issuers trusted for `topic`, ordered by address.
    pub fn trusted_issuers_for_topic(&self, topic: ClaimTopic) -> Vec<Arc<ClaimIssuer>> {
        let mut out: Vec<Arc<ClaimIssuer>> = self
            .issuers
            .iter()
            .filter(|entry| entry.topics.contains(&topic))
            .map(|entry| Arc::clone(&entry.issuer))
            .collect();
        out.sort_by_key(|issuer| issuer.address());
        out
    }

    /// Addresses of every trusted issuer, sorted.
    pub fn trusted_issuers(&self) -> Vec<Address> {
        let mut out: Vec<Address> = self.issuers.iter().map(|entry| *entry.key()).collect();
        out.sort();
        out
    }

    pub fn issuer(&self, address: &Address) -> Option<Arc<ClaimIssuer>> {
        self.issuers
            .get(address)
            .map(|entry| Arc::clone(&entry.issuer))
    }

    pub fn issuer_topics(&self, address: &Address) -> Result<Vec<ClaimTopic>> {
        self.issuers
            .get(address)
            .map(|entry| entry.topics.clone())
            .ok_or_else(|| ProtocolError::NotFound(format!("trusted issuer {}", address)))
    }

    pub fn len(&self) -> usize {
        self.issuers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issuers.is_empty()
    }
}

fn dedup(topics: Vec<ClaimTopic>) -> Vec<ClaimTopic> {
    let mut out = Vec::with_capacity(topics.len());
    for topic in topics {
        if !out.contains(&topic) {
            out.push(topic);
        }
    }
    out
}
