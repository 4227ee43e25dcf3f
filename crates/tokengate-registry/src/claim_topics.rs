use parking_lot::RwLock;

use tokengate_core::{ensure_caller, Address, ClaimTopic, ProtocolError, Result};

/// Append-only list of claim topics every investor must hold.
#[derive(Debug)]
pub struct ClaimTopicsRegistry {
    owner: Address,
    topics: RwLock<Vec<ClaimTopic>>,
}

impl ClaimTopicsRegistry {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            topics: RwLock::new(Vec::new()),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Require `topic` from now on. Owner only.
    pub fn add_claim_topic(&self, caller: &Address, topic: ClaimTopic) -> Result<()> {
        ensure_caller(&self.owner, caller, "add claim topic")?;

        let mut topics = self.topics.write();
        if topics.contains(&topic) {
            return Err(ProtocolError::DuplicateTopic(topic));
        }
        topics.push(topic);

        tracing::info!(%topic, required = topics.len(), "claim topic added");
        Ok(())
    }

    /// Required topics in insertion order.
    pub fn claim_topics(&self) -> Vec<ClaimTopic> {
        self.topics.read().clone()
    }

    pub fn contains(&self, topic: ClaimTopic) -> bool {
        self.topics.read().contains(&topic)
    }

    pub fn len(&self) -> usize {
        self.topics.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.read().is_empty()
    }
}
