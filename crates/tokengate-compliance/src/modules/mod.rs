pub mod supply_limit;
pub mod transfer_limit;

pub use supply_limit::SupplyLimitModule;
pub use transfer_limit::{TransferLimitModule, TransferLimits};

use tokengate_core::{Address, Amount};

/// A pluggable compliance rule.
///
/// Checks are pure reads. Hooks run after the token has already moved
/// balances and update whatever counters the rule keeps.
pub trait ComplianceModule: Send + Sync + std::fmt::Debug {
    /// Unique name of this module within one compliance engine.
    fn name(&self) -> &str;

    /// Whether moving `amount` from `from` to `to` is allowed.
    fn check_transfer(&self, from: &Address, to: &Address, amount: Amount) -> bool;

    /// Whether minting `amount` to `to` is allowed while the token's
    /// total supply stands at `supply`.
    fn check_mint(&self, _to: &Address, _amount: Amount, _supply: Amount) -> bool {
        true
    }

    fn on_transfer(&mut self, from: &Address, to: &Address, amount: Amount);

    fn on_mint(&mut self, _to: &Address, _amount: Amount) {}

    fn on_burn(&mut self, _from: &Address, _amount: Amount) {}
}
