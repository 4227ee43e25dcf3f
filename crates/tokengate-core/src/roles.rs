use dashmap::DashSet;

use crate::error::{ProtocolError, Result};
use crate::types::Address;

/// Fail with `Unauthorized` unless `caller` is exactly `expected`.
pub fn ensure_caller(expected: &Address, caller: &Address, action: &'static str) -> Result<()> {
    if expected != caller {
        tracing::warn!(caller = %caller.short(), action, "unauthorized call");
        return Err(ProtocolError::Unauthorized {
            caller: *caller,
            action,
        });
    }
    Ok(())
}

/// Capability set of agent addresses for one entity.
///
/// Agents are granted by the entity owner and never removed.
#[derive(Debug, Default)]
pub struct AgentRoles {
    agents: DashSet<Address>,
}

impl AgentRoles {
    pub fn new() -> Self {
        Self {
            agents: DashSet::new(),
        }
    }

    /// Grant the agent role. Returns false if `agent` already held it.
    pub fn grant(&self, agent: Address) -> bool {
        self.agents.insert(agent)
    }

    pub fn is_agent(&self, address: &Address) -> bool {
        self.agents.contains(address)
    }

    /// Fail with `Unauthorized` unless `caller` holds the agent role.
    pub fn ensure(&self, caller: &Address, action: &'static str) -> Result<()> {
        if !self.is_agent(caller) {
            tracing::warn!(caller = %caller.short(), action, "caller is not an agent");
            return Err(ProtocolError::Unauthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Snapshot of current agents, sorted.
    pub fn list(&self) -> Vec<Address> {
        let mut out: Vec<Address> = self.agents.iter().map(|a| *a).collect();
        out.sort();
        out
    }
}
