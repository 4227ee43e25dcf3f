use std::fmt;

use crate::error::ProtocolError;

/// Transfer state of a token. Tokens start out `Paused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TokenState {
    /// Holders may transfer.
    Unpaused,
    /// Holder transfers are rejected. Agent minting still works.
    Paused,
}

impl TokenState {
    /// Whether holder transfers are currently allowed.
    pub fn allows_transfers(&self) -> bool {
        matches!(self, Self::Unpaused)
    }
}

impl Default for TokenState {
    fn default() -> Self {
        Self::Paused
    }
}

impl fmt::Display for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpaused => write!(f, "Unpaused"),
            Self::Paused => write!(f, "Paused"),
        }
    }
}

/// Events that toggle the token state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEvent {
    Pause,
    Unpause,
}

/// Valid transitions:
/// - Unpaused → Paused (Pause)
/// - Paused → Unpaused (Unpause)
///
/// Requesting the state the token is already in fails with `AlreadyInState`.
pub struct TokenStateMachine;

impl TokenStateMachine {
    pub fn transition(current: TokenState, event: TokenEvent) -> Result<TokenState, ProtocolError> {
        let new_state = match (current, event) {
            (TokenState::Unpaused, TokenEvent::Pause) => TokenState::Paused,
            (TokenState::Paused, TokenEvent::Unpause) => TokenState::Unpaused,
            _ => return Err(ProtocolError::AlreadyInState(current)),
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "token state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: TokenState, event: TokenEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
