use parking_lot::RwLock;

use tokengate_core::{ensure_caller, Address, Amount, ProtocolError, Result};

use crate::modules::ComplianceModule;

/// Compliance engine for one token.
///
/// `can_transfer` is the AND of every installed module. Only the bound token
/// may drive the post-movement hooks.
#[derive(Debug)]
pub struct ModularCompliance {
    owner: Address,
    token: RwLock<Option<Address>>,
    modules: RwLock<Vec<Box<dyn ComplianceModule>>>,
}

impl ModularCompliance {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            token: RwLock::new(None),
            modules: RwLock::new(Vec::new()),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn bound_token(&self) -> Option<Address> {
        *self.token.read()
    }

    /// Bind the token this engine serves. Owner only; set once.
    pub fn bind_token(&self, caller: &Address, token: Address) -> Result<()> {
        ensure_caller(&self.owner, caller, "bind token")?;

        let mut bound = self.token.write();
        match *bound {
            Some(existing) if existing == token => Ok(()),
            Some(existing) => Err(ProtocolError::AlreadyBound { bound: existing }),
            None => {
                *bound = Some(token);
                tracing::info!(token = %token.short(), "token bound to compliance");
                Ok(())
            }
        }
    }

    pub fn add_module(&self, caller: &Address, module: Box<dyn ComplianceModule>) -> Result<()> {
        ensure_caller(&self.owner, caller, "add compliance module")?;

        let mut modules = self.modules.write();
        if modules.iter().any(|m| m.name() == module.name()) {
            return Err(ProtocolError::DuplicateModule(module.name().to_string()));
        }
        tracing::info!(module = module.name(), "compliance module added");
        modules.push(module);
        Ok(())
    }

    pub fn remove_module(&self, caller: &Address, name: &str) -> Result<()> {
        ensure_caller(&self.owner, caller, "remove compliance module")?;

        let mut modules = self.modules.write();
        let index = modules
            .iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| ProtocolError::NotFound(format!("compliance module {}", name)))?;
        modules.remove(index);
        tracing::info!(module = name, "compliance module removed");
        Ok(())
    }

    /// Installed module names in installation order.
    pub fn module_names(&self) -> Vec<String> {
        self.modules
            .read()
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    }

    pub fn can_transfer(&self, from: &Address, to: &Address, amount: Amount) -> bool {
        let modules = self.modules.read();
        match modules
            .iter()
            .find(|m| !m.check_transfer(from, to, amount))
        {
            Some(module) => {
                tracing::debug!(
                    module = module.name(),
                    from = %from.short(),
                    to = %to.short(),
                    amount,
                    "transfer refused by compliance module"
                );
                false
            }
            None => true,
        }
    }

    /// Whether every module accepts minting `amount` on top of the
    /// token's current `supply`.
    pub fn can_mint(&self, to: &Address, amount: Amount, supply: Amount) -> bool {
        let modules = self.modules.read();
        match modules.iter().find(|m| !m.check_mint(to, amount, supply)) {
            Some(module) => {
                tracing::debug!(module = module.name(), to = %to.short(), amount, "mint refused by compliance module");
                false
            }
            None => true,
        }
    }

    fn ensure_bound_token(&self, caller: &Address) -> Result<()> {
        match *self.token.read() {
            Some(token) if token == *caller => Ok(()),
            _ => {
                tracing::warn!(caller = %caller.short(), "compliance hook from unbound caller");
                Err(ProtocolError::CallerNotBoundToken { caller: *caller })
            }
        }
    }

    /// Record a completed transfer. Bound token only.
    pub fn transferred(
        &self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        self.ensure_bound_token(caller)?;
        for module in self.modules.write().iter_mut() {
            module.on_transfer(from, to, amount);
        }
        Ok(())
    }

    /// Record a completed mint. Bound token only.
    pub fn created(&self, caller: &Address, to: &Address, amount: Amount) -> Result<()> {
        self.ensure_bound_token(caller)?;
        for module in self.modules.write().iter_mut() {
            module.on_mint(to, amount);
        }
        Ok(())
    }

    /// Record a completed burn. Bound token only.
    pub fn destroyed(&self, caller: &Address, from: &Address, amount: Amount) -> Result<()> {
        self.ensure_bound_token(caller)?;
        for module in self.modules.write().iter_mut() {
            module.on_burn(from, amount);
        }
        Ok(())
    }
}
