use tokengate_core::{Address, ClaimTopic, Result};
use tokengate_crypto::{claim_digest, ClaimSignature, KeyHash};

use crate::identity::Identity;
use crate::keys::{KeyPurpose, KeyType};

const ISSUER_DOMAIN: &str = "tokengate.claim-issuer.v1";

/// An identity that signs claims about other identities.
///
/// Any key the issuer holds with the claim purpose (or a management key) may
/// sign. Several claim keys can be active at once; keys are never revoked.
#[derive(Debug)]
pub struct ClaimIssuer {
    identity: Identity,
}

impl ClaimIssuer {
    /// Create a claim issuer managed by `manager`.
    pub fn new(manager: &Address) -> Self {
        Self::with_salt(manager, 0)
    }

    /// Create a claim issuer whose address is derived from `manager` and
    /// `salt`. One manager can run several issuers under distinct salts.
    pub fn with_salt(manager: &Address, salt: u64) -> Self {
        Self {
            identity: Identity::derived(ISSUER_DOMAIN, manager, salt),
        }
    }

    pub fn address(&self) -> Address {
        self.identity.address()
    }

    /// The issuer's own identity (keys and any claims about the issuer).
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Register a signing key under `purpose`. Only management keys may add keys.
    pub fn add_key(
        &self,
        caller: &Address,
        key: KeyHash,
        purpose: KeyPurpose,
        key_type: KeyType,
    ) -> Result<()> {
        self.identity.add_key(caller, key, purpose, key_type)
    }

    /// Whether `signature` is a valid signature by one of this issuer's claim
    /// keys over the claim digest of `(identity, topic, data)`.
    pub fn is_claim_valid(
        &self,
        identity: &Address,
        topic: ClaimTopic,
        signature: &[u8],
        data: &[u8],
    ) -> bool {
        let sig = match ClaimSignature::from_bytes(signature) {
            Ok(sig) => sig,
            Err(e) => {
                tracing::debug!(issuer = %self.address().short(), error = %e, "malformed claim signature");
                return false;
            }
        };

        let digest = claim_digest(identity, topic, data);
        match sig.recover_key_hash(&digest) {
            Ok(key) => {
                let authorized = self.identity.key_has_purpose(&key, KeyPurpose::Claim);
                if !authorized {
                    tracing::debug!(
                        issuer = %self.address().short(),
                        key = %key,
                        "claim signed by a key the issuer does not hold"
                    );
                }
                authorized
            }
            Err(e) => {
                tracing::debug!(issuer = %self.address().short(), error = %e, "claim signature invalid");
                false
            }
        }
    }
}
