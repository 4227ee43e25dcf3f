//! TokenGate Identity Layer
//!
//! Provides the claim-holding side of the protocol:
//! - Key rings with ERC-734 style purposes (management, action, claim)
//! - Identities that store claims without verifying them at write time
//! - Claim issuers that validate claims signed by their claim keys

pub mod claim;
pub mod claim_issuer;
pub mod identity;
pub mod keys;

pub use claim::{Claim, ClaimId, SCHEME_ED25519};
pub use claim_issuer::ClaimIssuer;
pub use identity::Identity;
pub use keys::{KeyPurpose, KeyRecord, KeyRing, KeyType};
