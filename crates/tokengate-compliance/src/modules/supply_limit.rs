use tokengate_core::{Address, Amount};

use super::ComplianceModule;

/// Caps the total supply of the bound token.
///
/// Stateless: the cap is checked against the supply the token reports at
/// mint time, so the module can be added or re-added at any point.
#[derive(Debug)]
pub struct SupplyLimitModule {
    cap: Amount,
}

impl SupplyLimitModule {
    pub const NAME: &'static str = "supply-limit";

    pub fn new(cap: Amount) -> Self {
        Self { cap }
    }

    pub fn cap(&self) -> Amount {
        self.cap
    }
}

impl ComplianceModule for SupplyLimitModule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check_transfer(&self, _from: &Address, _to: &Address, _amount: Amount) -> bool {
        true
    }

    fn check_mint(&self, to: &Address, amount: Amount, supply: Amount) -> bool {
        let allowed = supply
            .checked_add(amount)
            .is_some_and(|total| total <= self.cap);
        if !allowed {
            tracing::debug!(to = %to.short(), amount, supply, cap = self.cap, "mint above supply cap");
        }
        allowed
    }

    fn on_transfer(&mut self, _from: &Address, _to: &Address, _amount: Amount) {}
}
