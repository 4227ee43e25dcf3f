pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;

pub use error::CryptoError;
pub use hashing::{claim_digest, claim_id, hash, Hash};
pub use keys::{KeyHash, KeyPair, PublicKey};
pub use signing::{sign, sign_claim, verify, ClaimSignature, Signature};
