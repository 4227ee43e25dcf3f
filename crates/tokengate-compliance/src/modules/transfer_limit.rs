use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use tokengate_core::{Address, Amount};

use super::ComplianceModule;

/// Limits on outbound movement per sender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLimits {
    /// Largest single transfer.
    pub max_per_transfer: Option<Amount>,
    /// Largest cumulative amount one sender may ever send.
    pub max_outbound: Option<Amount>,
}

/// Caps single transfers and the cumulative outbound volume of each sender.
#[derive(Debug)]
pub struct TransferLimitModule {
    limits: TransferLimits,
    outbound: HashMap<Address, Amount>,
}

impl TransferLimitModule {
    pub const NAME: &'static str = "transfer-limit";

    pub fn new(limits: TransferLimits) -> Self {
        Self {
            limits,
            outbound: HashMap::new(),
        }
    }

    pub fn limits(&self) -> TransferLimits {
        self.limits
    }

    /// Total already sent by `sender`.
    pub fn outbound_of(&self, sender: &Address) -> Amount {
        self.outbound.get(sender).copied().unwrap_or(0)
    }
}

impl ComplianceModule for TransferLimitModule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check_transfer(&self, from: &Address, _to: &Address, amount: Amount) -> bool {
        if let Some(max) = self.limits.max_per_transfer {
            if amount > max {
                tracing::debug!(from = %from.short(), amount, max, "transfer above per-transfer limit");
                return false;
            }
        }
        if let Some(max) = self.limits.max_outbound {
            match self.outbound_of(from).checked_add(amount) {
                Some(total) if total <= max => {}
                _ => {
                    tracing::debug!(
                        from = %from.short(),
                        amount,
                        sent = self.outbound_of(from),
                        max,
                        "transfer above cumulative outbound limit"
                    );
                    return false;
                }
            }
        }
        true
    }

    fn on_transfer(&mut self, from: &Address, _to: &Address, amount: Amount) {
        let sent = self.outbound.entry(*from).or_insert(0);
        *sent = sent.saturating_add(amount);
    }
}
