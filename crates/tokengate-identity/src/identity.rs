use chrono::Utc;
use parking_lot::RwLock;

use tokengate_core::{Address, ClaimTopic, ProtocolError, Result};
use tokengate_crypto::KeyHash;

use crate::claim::{Claim, ClaimId};
use crate::keys::{KeyPurpose, KeyRing, KeyType};

const IDENTITY_DOMAIN: &str = "tokengate.identity.v1";

/// A claim-holding identity bound to a wallet at creation.
///
/// Keys and claims sit behind their own locks; readers always get a
/// consistent snapshot of the claim list.
#[derive(Debug)]
pub struct Identity {
    address: Address,
    keys: RwLock<KeyRing>,
    claims: RwLock<Vec<Claim>>,
}

impl Identity {
    /// Create an identity whose initial management key is `owner`'s key.
    pub fn new(owner: &Address) -> Self {
        Self::with_salt(owner, 0)
    }

    /// Create an identity for `owner` with an explicit salt, so one wallet
    /// can control several identities.
    pub fn with_salt(owner: &Address, salt: u64) -> Self {
        Self::derived(IDENTITY_DOMAIN, owner, salt)
    }

    pub(crate) fn derived(domain: &str, owner: &Address, salt: u64) -> Self {
        let mut material = Vec::with_capacity(40);
        material.extend_from_slice(owner.as_bytes());
        material.extend_from_slice(&salt.to_be_bytes());
        let address = Address::derive(domain, &material);

        let ring = KeyRing::with_management_key(KeyHash::from_address(owner), KeyType::Ed25519);

        tracing::debug!(identity = %address.short(), owner = %owner.short(), "identity created");

        Self {
            address,
            keys: RwLock::new(ring),
            claims: RwLock::new(Vec::new()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Register a key. Only management keys may do this.
    pub fn add_key(
        &self,
        caller: &Address,
        key: KeyHash,
        purpose: KeyPurpose,
        key_type: KeyType,
    ) -> Result<()> {
        let mut keys = self.keys.write();
        if !keys.has_purpose(&KeyHash::from_address(caller), KeyPurpose::Management) {
            return Err(ProtocolError::Unauthorized {
                caller: *caller,
                action: "add identity key",
            });
        }
        keys.add(key, purpose, key_type)?;
        tracing::info!(
            identity = %self.address.short(),
            key = %key,
            purpose = %purpose,
            "identity key added"
        );
        Ok(())
    }

    pub fn key_has_purpose(&self, key: &KeyHash, purpose: KeyPurpose) -> bool {
        self.keys.read().has_purpose(key, purpose)
    }

    pub fn keys_by_purpose(&self, purpose: KeyPurpose) -> Vec<KeyHash> {
        self.keys.read().keys_by_purpose(purpose)
    }

    /// Attach a claim. The caller must hold a management or claim key.
    ///
    /// The signature is not checked here; verification happens when a
    /// registry evaluates the holder.
    #[allow(clippy::too_many_arguments)]
    pub fn add_claim(
        &self,
        caller: &Address,
        topic: ClaimTopic,
        scheme: u64,
        issuer: Address,
        signature: Vec<u8>,
        data: Vec<u8>,
        uri: String,
    ) -> Result<ClaimId> {
        if !self.key_has_purpose(&KeyHash::from_address(caller), KeyPurpose::Claim) {
            tracing::warn!(
                identity = %self.address.short(),
                caller = %caller.short(),
                "claim rejected: caller holds no claim key"
            );
            return Err(ProtocolError::Unauthorized {
                caller: *caller,
                action: "add claim",
            });
        }

        let id = ClaimId::derive(&issuer, topic);
        let mut claims = self.claims.write();
        if claims.iter().any(|c| c.id == id) {
            return Err(ProtocolError::DuplicateClaim {
                identity: self.address,
                issuer,
                topic,
            });
        }
        claims.push(Claim {
            id,
            topic,
            scheme,
            issuer,
            signature,
            data,
            uri,
            added_at: Utc::now(),
        });

        tracing::info!(
            identity = %self.address.short(),
            issuer = %issuer.short(),
            %topic,
            claim_id = %id,
            "claim added"
        );
        Ok(id)
    }

    /// All claims in insertion order.
    pub fn claims(&self) -> Vec<Claim> {
        self.claims.read().clone()
    }

    pub fn claim(&self, id: &ClaimId) -> Option<Claim> {
        self.claims.read().iter().find(|c| &c.id == id).cloned()
    }

    pub fn claim_ids_by_topic(&self, topic: ClaimTopic) -> Vec<ClaimId> {
        self.claims
            .read()
            .iter()
            .filter(|c| c.topic == topic)
            .map(|c| c.id)
            .collect()
    }

    pub fn claims_by_topic(&self, topic: ClaimTopic) -> Vec<Claim> {
        self.claims
            .read()
            .iter()
            .filter(|c| c.topic == topic)
            .cloned()
            .collect()
    }

    pub fn claim_count(&self) -> usize {
        self.claims.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::SCHEME_ED25519;

    fn wallet(byte: u8) -> Address {
        Address::new([byte; 32])
    }

    fn add_test_claim(identity: &Identity, caller: &Address, issuer: u8, topic: u64) -> Result<ClaimId> {
        identity.add_claim(
            caller,
            ClaimTopic::new(topic),
            SCHEME_ED25519,
            wallet(issuer),
            vec![0u8; 96],
            b"Some claim public data.".to_vec(),
            String::new(),
        )
    }

    #[test]
    fn test_owner_is_management_key() {
        let owner = wallet(1);
        let identity = Identity::new(&owner);
        assert!(identity.key_has_purpose(&KeyHash::from_address(&owner), KeyPurpose::Management));
        assert_eq!(
            identity.keys_by_purpose(KeyPurpose::Management),
            vec![KeyHash::from_address(&owner)]
        );
    }

    #[test]
    fn test_address_is_deterministic_and_salted() {
        let owner = wallet(1);
        assert_eq!(Identity::new(&owner).address(), Identity::new(&owner).address());
        assert_ne!(
            Identity::new(&owner).address(),
            Identity::with_salt(&owner, 1).address()
        );
        assert_ne!(Identity::new(&owner).address(), owner);
    }

    #[test]
    fn test_owner_adds_claim() {
        let owner = wallet(1);
        let identity = Identity::new(&owner);
        let id = add_test_claim(&identity, &owner, 9, 7).unwrap();
        assert_eq!(identity.claim_count(), 1);
        let claim = identity.claim(&id).unwrap();
        assert_eq!(claim.topic, ClaimTopic::new(7));
        assert_eq!(claim.issuer, wallet(9));
    }

    #[test]
    fn test_stranger_cannot_add_claim() {
        let identity = Identity::new(&wallet(1));
        let err = add_test_claim(&identity, &wallet(2), 9, 7).unwrap_err();
        assert!(matches!(err, ProtocolError::Unauthorized { action: "add claim", .. }));
        assert_eq!(identity.claim_count(), 0);
    }

    #[test]
    fn test_claim_key_holder_can_add_claim() {
        let owner = wallet(1);
        let manager = wallet(2);
        let identity = Identity::new(&owner);
        identity
            .add_key(
                &owner,
                KeyHash::from_address(&manager),
                KeyPurpose::Claim,
                KeyType::Ed25519,
            )
            .unwrap();
        assert!(add_test_claim(&identity, &manager, 9, 7).is_ok());
    }

    #[test]
    fn test_only_management_adds_keys() {
        let identity = Identity::new(&wallet(1));
        let err = identity
            .add_key(
                &wallet(2),
                KeyHash::from_address(&wallet(2)),
                KeyPurpose::Management,
                KeyType::Ed25519,
            )
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Unauthorized { .. }));
    }

    #[test]
    fn test_duplicate_claim_rejected() {
        let owner = wallet(1);
        let identity = Identity::new(&owner);
        add_test_claim(&identity, &owner, 9, 7).unwrap();
        let err = add_test_claim(&identity, &owner, 9, 7).unwrap_err();
        assert!(matches!(err, ProtocolError::DuplicateClaim { .. }));
        // A different issuer on the same topic is a different claim.
        assert!(add_test_claim(&identity, &owner, 8, 7).is_ok());
    }

    #[test]
    fn test_enumeration_by_topic_preserves_order() {
        let owner = wallet(1);
        let identity = Identity::new(&owner);
        let a = add_test_claim(&identity, &owner, 9, 7).unwrap();
        add_test_claim(&identity, &owner, 9, 8).unwrap();
        let c = add_test_claim(&identity, &owner, 10, 7).unwrap();
        assert_eq!(identity.claim_ids_by_topic(ClaimTopic::new(7)), vec![a, c]);
        assert_eq!(identity.claims_by_topic(ClaimTopic::new(8)).len(), 1);
        let all: Vec<ClaimId> = identity.claims().iter().map(|c| c.id).collect();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], a);
        assert_eq!(all[2], c);
    }

    #[test]
    fn test_invalid_signature_is_stored() {
        let owner = wallet(1);
        let identity = Identity::new(&owner);
        let id = identity
            .add_claim(
                &owner,
                ClaimTopic::new(1),
                SCHEME_ED25519,
                wallet(9),
                b"garbage".to_vec(),
                vec![],
                String::new(),
            )
            .unwrap();
        assert_eq!(identity.claim(&id).unwrap().signature, b"garbage".to_vec());
    }
}
