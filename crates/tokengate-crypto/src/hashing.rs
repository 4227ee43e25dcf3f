use tokengate_core::{Address, ClaimTopic};

/// BLAKE3 hash (32 bytes).
pub type Hash = [u8; 32];

const CLAIM_DIGEST_DOMAIN: &[u8] = b"tokengate.claim.v1";
const CLAIM_ID_DOMAIN: &[u8] = b"tokengate.claim-id.v1";

/// Hash arbitrary data using BLAKE3.
pub fn hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Digest an issuer signs for a claim:
/// `H(domain || identity || topic_be || data)`.
pub fn claim_digest(identity: &Address, topic: ClaimTopic, data: &[u8]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(CLAIM_DIGEST_DOMAIN);
    hasher.update(identity.as_bytes());
    hasher.update(&topic.to_be_bytes());
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Identifier of a claim on an identity: `H(domain || issuer || topic_be)`.
/// An identity holds at most one claim per (issuer, topic).
pub fn claim_id(issuer: &Address, topic: ClaimTopic) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(CLAIM_ID_DOMAIN);
    hasher.update(issuer.as_bytes());
    hasher.update(&topic.to_be_bytes());
    *hasher.finalize().as_bytes()
}
