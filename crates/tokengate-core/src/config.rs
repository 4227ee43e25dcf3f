use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Descriptive metadata of a token, fixed at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Token display name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Number of decimals used for display. Balances are integral units.
    pub decimals: u8,
    /// Optional identity address of the token issuer itself.
    #[serde(default)]
    pub onchain_id: Option<String>,
}

impl TokenConfig {
    /// Reject empty names and symbols and implausible decimals.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.name.trim().is_empty() {
            return Err(ProtocolError::Config("token name must not be empty".into()));
        }
        if self.symbol.trim().is_empty() {
            return Err(ProtocolError::Config(
                "token symbol must not be empty".into(),
            ));
        }
        if self.decimals > 18 {
            return Err(ProtocolError::Config(format!(
                "decimals must be at most 18, got {}",
                self.decimals
            )));
        }
        Ok(())
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "TOKEN1".into(),
            symbol: "TKN1".into(),
            decimals: 0,
            onchain_id: None,
        }
    }
}
