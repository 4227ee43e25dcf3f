//! TokenGate Compliance
//!
//! A [`ModularCompliance`] engine is bound to exactly one token and asks
//! every installed [`ComplianceModule`] whether a movement is allowed.

pub mod modular;
pub mod modules;

pub use modular::ModularCompliance;
pub use modules::{ComplianceModule, SupplyLimitModule, TransferLimitModule, TransferLimits};
