use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tokengate_core::Address;
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Domain tag used when deriving wallet addresses from public keys.
const WALLET_DOMAIN: &str = "tokengate.wallet.v1";
/// Domain tag used when hashing an address into an identity key.
const KEY_DOMAIN: &[u8] = b"tokengate.key.v1";

/// Hash of the address a key controls. Identities and claim issuers
/// register keys by hash, never by raw key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyHash(pub [u8; 32]);

impl KeyHash {
    /// `H(domain || address)`.
    pub fn from_address(address: &Address) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(KEY_DOMAIN);
        hasher.update(address.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes =
            hex::decode(s).map_err(|e| CryptoError::InvalidInput(format!("invalid hex: {}", e)))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            CryptoError::InvalidKeyLength {
                expected: 32,
                actual: b.len(),
            }
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyHash({})", &self.to_hex()[..8])
    }
}

impl Serialize for KeyHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for KeyHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        KeyHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Ed25519 key pair for signing operations.
/// Private key material is zeroized on drop by ed25519-dalek.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Create a key pair from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(bytes);
        let kp = Self::from_seed(&seed);
        seed.zeroize();
        Ok(kp)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Identity key hash of the address this pair controls.
    pub fn key_hash(&self) -> KeyHash {
        self.public_key().key_hash()
    }

    /// Wallet address controlled by this key.
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Get the raw private key bytes (32 bytes).
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key().to_hex())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key for verification operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Create from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_arr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        let verifying_key = VerifyingKey::from_bytes(&bytes_arr)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {}", e)))?;
        Ok(Self { verifying_key })
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Identity key hash of the address this key controls.
    pub fn key_hash(&self) -> KeyHash {
        KeyHash::from_address(&self.address())
    }

    /// Wallet address controlled by this key.
    pub fn address(&self) -> Address {
        Address::derive(WALLET_DOMAIN, self.as_bytes())
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seed_deterministic() {
        let seed = [42u8; 32];
        let kp1 = KeyPair::from_seed(&seed);
        let kp2 = KeyPair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.key_hash(), kp2.key_hash());
        assert_eq!(kp1.address(), kp2.address());
    }

    #[test]
    fn test_from_bytes() {
        let kp = KeyPair::generate();
        let kp2 = KeyPair::from_bytes(&kp.secret_bytes()).unwrap();
        assert_eq!(kp.public_key(), kp2.public_key());
    }

    #[test]
    fn test_from_bytes_invalid_length() {
        assert!(matches!(
            KeyPair::from_bytes(&[0u8; 16]),
            Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 16
            })
        ));
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = KeyPair::generate().public_key();
        let pk2 = PublicKey::from_hex(&pk.to_hex()).unwrap();
        assert_eq!(pk, pk2);
    }

    #[test]
    fn test_key_hash_is_hash_of_address() {
        let kp = KeyPair::from_seed(&[5u8; 32]);
        assert_eq!(kp.key_hash(), KeyHash::from_address(&kp.address()));
        assert_ne!(kp.key_hash().as_bytes(), kp.address().as_bytes());
    }

    #[test]
    fn test_different_seeds_different_keys() {
        let kp1 = KeyPair::from_seed(&[1u8; 32]);
        let kp2 = KeyPair::from_seed(&[2u8; 32]);
        assert_ne!(kp1.key_hash(), kp2.key_hash());
        assert_ne!(kp1.address(), kp2.address());
    }

    #[test]
    fn test_key_hash_serde() {
        let kh = KeyPair::from_seed(&[3u8; 32]).key_hash();
        let json = serde_json::to_string(&kh).unwrap();
        let back: KeyHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kh);
    }
}
