use crate::token_state::TokenState;
use crate::types::{Address, Amount, ClaimTopic};

/// Convenience alias used across the protocol crates.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Protocol errors. Every variant names the precondition that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("issuer {0} is already trusted")]
    DuplicateIssuer(Address),

    #[error("trusted issuer {0} must be authorized for at least one topic")]
    EmptyTopicSet(Address),

    #[error("claim topic {0} is already required")]
    DuplicateTopic(ClaimTopic),

    #[error("already bound to {bound}")]
    AlreadyBound { bound: Address },

    #[error("wallet {0} is already registered")]
    AlreadyRegistered(Address),

    #[error("caller {caller} is not the bound identity registry")]
    CallerNotBoundRegistry { caller: Address },

    #[error("caller {caller} is not the bound token")]
    CallerNotBoundToken { caller: Address },

    #[error("caller {caller} is not authorized to {action}")]
    Unauthorized {
        caller: Address,
        action: &'static str,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("recipient {0} is not identity-verified")]
    RecipientNotVerified(Address),

    #[error("insufficient balance on {account}: have {balance}, need {requested}")]
    InsufficientBalance {
        account: Address,
        balance: Amount,
        requested: Amount,
    },

    #[error("token is paused")]
    TokenPaused,

    #[error("compliance rejected movement of {amount} from {from} to {to}")]
    ComplianceRejected {
        from: Address,
        to: Address,
        amount: Amount,
    },

    #[error("token is already {0}")]
    AlreadyInState(TokenState),

    #[error("identity {identity} already holds a claim from {issuer} on topic {topic}")]
    DuplicateClaim {
        identity: Address,
        issuer: Address,
        topic: ClaimTopic,
    },

    #[error("key {key} already has purpose {purpose}")]
    DuplicateKey { key: String, purpose: u64 },

    #[error("compliance module {0} is already installed")]
    DuplicateModule(String),

    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("configuration error: {0}")]
    Config(String),
}
