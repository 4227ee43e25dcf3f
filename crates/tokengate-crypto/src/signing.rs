use ed25519_dalek::Signer;
use ed25519_dalek::Verifier;
use tokengate_core::{Address, ClaimTopic};

use crate::error::CryptoError;
use crate::hashing::claim_digest;
use crate::keys::{KeyHash, KeyPair, PublicKey};

/// Ed25519 signature (64 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    inner: ed25519_dalek::Signature,
}

impl Signature {
    pub fn to_bytes(&self) -> [u8; 64] {
        self.inner.to_bytes()
    }

    /// Create from raw bytes (64 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_arr: [u8; 64] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidInput(format!("signature must be 64 bytes, got {}", bytes.len()))
        })?;
        let inner = ed25519_dalek::Signature::from_bytes(&bytes_arr);
        Ok(Self { inner })
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

/// Sign a message using Ed25519.
pub fn sign(message: &[u8], keypair: &KeyPair) -> Signature {
    let sig = keypair.signing_key().sign(message);
    Signature { inner: sig }
}

/// Verify an Ed25519 signature.
pub fn verify(
    message: &[u8],
    signature: &Signature,
    pubkey: &PublicKey,
) -> Result<(), CryptoError> {
    pubkey
        .verifying_key()
        .verify(message, &signature.inner)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

/// Claim signature that carries its signer's public key, so the verifier can
/// recover which key signed without being told.
///
/// Wire layout: `public_key (32) || signature (64)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSignature {
    signer: PublicKey,
    signature: Signature,
}

impl ClaimSignature {
    pub const LEN: usize = 96;

    pub fn signer(&self) -> &PublicKey {
        &self.signer
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        out.extend_from_slice(self.signer.as_bytes());
        out.extend_from_slice(&self.signature.to_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != Self::LEN {
            return Err(CryptoError::InvalidInput(format!(
                "claim signature must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            )));
        }
        let signer = PublicKey::from_bytes(&bytes[..32])?;
        let signature = Signature::from_bytes(&bytes[32..])?;
        Ok(Self { signer, signature })
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify the signature over `digest` and return the hash of the key that
    /// produced it.
    pub fn recover_key_hash(&self, digest: &[u8]) -> Result<KeyHash, CryptoError> {
        verify(digest, &self.signature, &self.signer)?;
        Ok(self.signer.key_hash())
    }
}

/// Sign the claim digest for `(identity, topic, data)`.
pub fn sign_claim(
    identity: &Address,
    topic: ClaimTopic,
    data: &[u8],
    keypair: &KeyPair,
) -> ClaimSignature {
    let digest = claim_digest(identity, topic, data);
    ClaimSignature {
        signer: keypair.public_key(),
        signature: sign(&digest, keypair),
    }
}
