//! TokenGate Core: fundamental types, errors, and role checks for the
//! TokenGate permissioned ledger protocol.

pub mod config;
pub mod error;
pub mod roles;
pub mod token_state;
pub mod types;

pub use config::TokenConfig;
pub use error::{ProtocolError, Result};
pub use roles::{ensure_caller, AgentRoles};
pub use token_state::{TokenEvent, TokenState, TokenStateMachine};
pub use types::{Address, Amount, ClaimTopic, CountryCode};
