//! TokenGate Registries: the identity-verification side of the protocol.
//!
//! An [`IdentityRegistry`] composes a [`ClaimTopicsRegistry`], a
//! [`TrustedIssuersRegistry`] and an [`IdentityRegistryStorage`] to decide
//! whether a wallet is verified.

pub mod claim_topics;
pub mod identity_registry;
pub mod storage;
pub mod trusted_issuers;

pub use claim_topics::ClaimTopicsRegistry;
pub use identity_registry::{IdentityRegistry, TopicCheck, VerificationReport};
pub use storage::{IdentityRecord, IdentityRegistryStorage};
pub use trusted_issuers::TrustedIssuersRegistry;
