use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use tokengate_core::{Address, ClaimTopic};
use tokengate_crypto::claim_id;

/// Signature scheme tag for claims signed with Ed25519 claim keys.
pub const SCHEME_ED25519: u64 = 1;

/// Identifier of a claim on an identity, derived from `(issuer, topic)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClaimId(pub [u8; 32]);

impl ClaimId {
    pub fn derive(issuer: &Address, topic: ClaimTopic) -> Self {
        Self(claim_id(issuer, topic))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimId({})", &self.to_hex()[..8])
    }
}

impl Serialize for ClaimId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ClaimId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("claim id must be 32 bytes"))?;
        Ok(Self(arr))
    }
}

/// A claim attached to exactly one identity.
///
/// The signature is stored as opaque bytes and only checked when a registry
/// asks whether the holder is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub topic: ClaimTopic,
    pub scheme: u64,
    /// Address of the claim issuer that vouches for this claim.
    pub issuer: Address,
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    pub uri: String,
    pub added_at: DateTime<Utc>,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_id_depends_on_issuer_and_topic() {
        let issuer = Address::new([1u8; 32]);
        let a = ClaimId::derive(&issuer, ClaimTopic::new(1));
        assert_eq!(a, ClaimId::derive(&issuer, ClaimTopic::new(1)));
        assert_ne!(a, ClaimId::derive(&issuer, ClaimTopic::new(2)));
        assert_ne!(a, ClaimId::derive(&Address::new([2u8; 32]), ClaimTopic::new(1)));
    }

    #[test]
    fn test_claim_json_uses_hex() {
        let issuer = Address::new([1u8; 32]);
        let claim = Claim {
            id: ClaimId::derive(&issuer, ClaimTopic::new(9)),
            topic: ClaimTopic::new(9),
            scheme: SCHEME_ED25519,
            issuer,
            signature: vec![0xde, 0xad],
            data: b"Some claim public data.".to_vec(),
            uri: String::new(),
            added_at: Utc::now(),
        };
        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json["signature"], "dead");
        let back: Claim = serde_json::from_value(json).unwrap();
        assert_eq!(back, claim);
    }
}
