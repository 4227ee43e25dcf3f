use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use tokengate_compliance::ModularCompliance;
use tokengate_core::{
    ensure_caller, Address, AgentRoles, Amount, ProtocolError, Result, TokenConfig, TokenEvent,
    TokenState, TokenStateMachine,
};
use tokengate_registry::IdentityRegistry;

/// Pause state and balances, always mutated together.
#[derive(Debug, Default)]
struct Ledger {
    state: TokenState,
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

impl Ledger {
    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }
}

/// A permissioned token.
///
/// Every movement is checked against the identity registry and the
/// compliance engine while the ledger lock is held, so checks and the
/// balance update they guard are atomic.
#[derive(Debug)]
pub struct Token {
    address: Address,
    owner: Address,
    metadata: TokenConfig,
    agents: AgentRoles,
    identity_registry: Arc<IdentityRegistry>,
    compliance: Arc<ModularCompliance>,
    ledger: Mutex<Ledger>,
}

impl Token {
    /// Create a paused token with no supply.
    pub fn new(
        address: Address,
        owner: Address,
        metadata: TokenConfig,
        identity_registry: Arc<IdentityRegistry>,
        compliance: Arc<ModularCompliance>,
    ) -> Result<Self> {
        metadata.validate()?;
        tracing::info!(
            token = %address.short(),
            name = %metadata.name,
            symbol = %metadata.symbol,
            decimals = metadata.decimals,
            "token created"
        );
        Ok(Self {
            address,
            owner,
            metadata,
            agents: AgentRoles::new(),
            identity_registry,
            compliance,
            ledger: Mutex::new(Ledger::default()),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn metadata(&self) -> &TokenConfig {
        &self.metadata
    }

    pub fn identity_registry(&self) -> &Arc<IdentityRegistry> {
        &self.identity_registry
    }

    pub fn compliance(&self) -> &Arc<ModularCompliance> {
        &self.compliance
    }

    pub fn add_agent(&self, caller: &Address, agent: Address) -> Result<()> {
        ensure_caller(&self.owner, caller, "add token agent")?;
        if self.agents.grant(agent) {
            tracing::info!(token = %self.address.short(), agent = %agent.short(), "token agent added");
        }
        Ok(())
    }

    pub fn is_agent(&self, address: &Address) -> bool {
        self.agents.is_agent(address)
    }

    pub fn agents(&self) -> Vec<Address> {
        self.agents.list()
    }

    fn ensure_verified(&self, wallet: &Address) -> Result<()> {
        if self.identity_registry.is_verified(wallet) {
            Ok(())
        } else {
            tracing::warn!(token = %self.address.short(), wallet = %wallet.short(), "recipient not verified");
            Err(ProtocolError::RecipientNotVerified(*wallet))
        }
    }

    fn ensure_compliance_bound(&self) -> Result<()> {
        if self.compliance.bound_token() == Some(self.address) {
            Ok(())
        } else {
            Err(ProtocolError::CallerNotBoundToken {
                caller: self.address,
            })
        }
    }

    /// Create `amount` new units on `to`. Agent only; allowed while paused.
    pub fn mint(&self, caller: &Address, to: &Address, amount: Amount) -> Result<()> {
        self.agents.ensure(caller, "mint")?;

        let mut ledger = self.ledger.lock();
        self.ensure_verified(to)?;
        if !self.compliance.can_mint(to, amount, ledger.total_supply) {
            return Err(ProtocolError::ComplianceRejected {
                from: Address::ZERO,
                to: *to,
                amount,
            });
        }
        self.ensure_compliance_bound()?;

        let supply = ledger
            .total_supply
            .checked_add(amount)
            .ok_or(ProtocolError::Overflow("total supply"))?;
        let balance = ledger
            .balance_of(to)
            .checked_add(amount)
            .ok_or(ProtocolError::Overflow("balance"))?;
        ledger.total_supply = supply;
        ledger.balances.insert(*to, balance);

        self.compliance.created(&self.address, to, amount)?;
        tracing::info!(token = %self.address.short(), to = %to.short(), amount, supply, "minted");
        Ok(())
    }

    /// Move `amount` from `caller` to `to`.
    ///
    /// Checks run in a fixed order and the first failure is returned with
    /// nothing changed: pause, sender balance, recipient verification,
    /// compliance.
    pub fn transfer(&self, caller: &Address, to: &Address, amount: Amount) -> Result<()> {
        let mut ledger = self.ledger.lock();

        if !ledger.state.allows_transfers() {
            return Err(ProtocolError::TokenPaused);
        }
        let from_balance = ledger.balance_of(caller);
        if from_balance < amount {
            return Err(ProtocolError::InsufficientBalance {
                account: *caller,
                balance: from_balance,
                requested: amount,
            });
        }
        self.ensure_verified(to)?;
        if !self.compliance.can_transfer(caller, to, amount) {
            tracing::warn!(
                token = %self.address.short(),
                from = %caller.short(),
                to = %to.short(),
                amount,
                "transfer rejected by compliance"
            );
            return Err(ProtocolError::ComplianceRejected {
                from: *caller,
                to: *to,
                amount,
            });
        }
        self.ensure_compliance_bound()?;

        if caller != to {
            let to_balance = ledger
                .balance_of(to)
                .checked_add(amount)
                .ok_or(ProtocolError::Overflow("balance"))?;
            ledger.balances.insert(*caller, from_balance - amount);
            ledger.balances.insert(*to, to_balance);
        }

        self.compliance
            .transferred(&self.address, caller, to, amount)?;
        tracing::info!(
            token = %self.address.short(),
            from = %caller.short(),
            to = %to.short(),
            amount,
            "transferred"
        );
        Ok(())
    }

    /// Destroy `amount` units held by `from`. Agent only.
    pub fn burn(&self, caller: &Address, from: &Address, amount: Amount) -> Result<()> {
        self.agents.ensure(caller, "burn")?;

        let mut ledger = self.ledger.lock();
        let balance = ledger.balance_of(from);
        if balance < amount {
            return Err(ProtocolError::InsufficientBalance {
                account: *from,
                balance,
                requested: amount,
            });
        }
        self.ensure_compliance_bound()?;

        ledger.balances.insert(*from, balance - amount);
        ledger.total_supply -= amount;
        let supply = ledger.total_supply;

        self.compliance.destroyed(&self.address, from, amount)?;
        tracing::info!(token = %self.address.short(), from = %from.short(), amount, supply, "burned");
        Ok(())
    }

    pub fn pause(&self, caller: &Address) -> Result<()> {
        self.apply(caller, TokenEvent::Pause, "pause")
    }

    pub fn unpause(&self, caller: &Address) -> Result<()> {
        self.apply(caller, TokenEvent::Unpause, "unpause")
    }

    fn apply(&self, caller: &Address, event: TokenEvent, action: &'static str) -> Result<()> {
        self.agents.ensure(caller, action)?;

        let mut ledger = self.ledger.lock();
        ledger.state = TokenStateMachine::transition(ledger.state, event)?;
        tracing::info!(token = %self.address.short(), state = %ledger.state, "token state changed");
        Ok(())
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.ledger.lock().balance_of(account)
    }

    pub fn total_supply(&self) -> Amount {
        self.ledger.lock().total_supply
    }

    pub fn state(&self) -> TokenState {
        self.ledger.lock().state
    }

    pub fn is_paused(&self) -> bool {
        self.state() == TokenState::Paused
    }

    /// Non-zero balances, sorted by account.
    pub fn balances(&self) -> Vec<(Address, Amount)> {
        let ledger = self.ledger.lock();
        let mut out: Vec<(Address, Amount)> = ledger
            .balances
            .iter()
            .filter(|(_, balance)| **balance > 0)
            .map(|(account, balance)| (*account, *balance))
            .collect();
        out.sort();
        out
    }
}
