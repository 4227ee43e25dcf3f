use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use tokengate_core::{ProtocolError, Result};
use tokengate_crypto::KeyHash;

/// What a key registered on an identity is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u64)]
pub enum KeyPurpose {
    /// Manages the identity itself. Implies every other purpose.
    Management = 1,
    /// Performs actions on behalf of the identity.
    Action = 2,
    /// Signs claims (on issuers) or adds claims (on holders).
    Claim = 3,
    /// Encrypts data addressed to the identity.
    Encryption = 4,
}

impl KeyPurpose {
    pub fn code(&self) -> u64 {
        *self as u64
    }
}

impl fmt::Display for KeyPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Management => write!(f, "Management"),
            Self::Action => write!(f, "Action"),
            Self::Claim => write!(f, "Claim"),
            Self::Encryption => write!(f, "Encryption"),
        }
    }
}

/// Signature scheme of a registered key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    Ed25519,
    Rsa,
}

/// A key and every purpose it was registered for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRecord {
    pub key: KeyHash,
    pub purposes: Vec<KeyPurpose>,
    pub key_type: KeyType,
}

/// Keys of one identity, keyed by key hash.
#[derive(Debug, Default, Clone)]
pub struct KeyRing {
    keys: HashMap<KeyHash, KeyRecord>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ring holding only `key`, registered for management.
    pub fn with_management_key(key: KeyHash, key_type: KeyType) -> Self {
        let record = KeyRecord {
            key,
            purposes: vec![KeyPurpose::Management],
            key_type,
        };
        Self {
            keys: HashMap::from([(key, record)]),
        }
    }

    /// Register `key` for `purpose`. A key may carry several purposes but
    /// each purpose only once.
    pub fn add(&mut self, key: KeyHash, purpose: KeyPurpose, key_type: KeyType) -> Result<()> {
        let record = self.keys.entry(key).or_insert_with(|| KeyRecord {
            key,
            purposes: Vec::new(),
            key_type,
        });
        if record.purposes.contains(&purpose) {
            return Err(ProtocolError::DuplicateKey {
                key: key.to_hex(),
                purpose: purpose.code(),
            });
        }
        record.purposes.push(purpose);
        Ok(())
    }

    /// Whether `key` may act for `purpose`. Management keys may act for any
    /// purpose.
    pub fn has_purpose(&self, key: &KeyHash, purpose: KeyPurpose) -> bool {
        self.keys.get(key).is_some_and(|record| {
            record.purposes.contains(&KeyPurpose::Management) || record.purposes.contains(&purpose)
        })
    }

    pub fn get(&self, key: &KeyHash) -> Option<&KeyRecord> {
        self.keys.get(key)
    }

    /// Keys registered explicitly for `purpose`, sorted.
    pub fn keys_by_purpose(&self, purpose: KeyPurpose) -> Vec<KeyHash> {
        let mut out: Vec<KeyHash> = self
            .keys
            .values()
            .filter(|r| r.purposes.contains(&purpose))
            .map(|r| r.key)
            .collect();
        out.sort();
        out
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
