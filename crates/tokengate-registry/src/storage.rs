use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

use tokengate_core::{ensure_caller, Address, CountryCode, ProtocolError, Result};
use tokengate_identity::Identity;

/// One registered wallet.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    pub identity: Arc<Identity>,
    pub country: CountryCode,
    pub registered_at: DateTime<Utc>,
}

/// Wallet → identity mapping. Only the single bound identity registry may
/// write to it.
#[derive(Debug)]
pub struct IdentityRegistryStorage {
    owner: Address,
    bound_registry: RwLock<Option<Address>>,
    records: DashMap<Address, IdentityRecord>,
}

impl IdentityRegistryStorage {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            bound_registry: RwLock::new(None),
            records: DashMap::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Bind the identity registry allowed to write. Owner only; set once.
    pub fn bind_identity_registry(&self, caller: &Address, registry: Address) -> Result<()> {
        ensure_caller(&self.owner, caller, "bind identity registry")?;

        let mut bound = self.bound_registry.write();
        match *bound {
            Some(existing) if existing == registry => Ok(()),
            Some(existing) => Err(ProtocolError::AlreadyBound { bound: existing }),
            None => {
                *bound = Some(registry);
                tracing::info!(registry = %registry.short(), "identity registry bound to storage");
                Ok(())
            }
        }
    }

    pub fn bound_registry(&self) -> Option<Address> {
        *self.bound_registry.read()
    }

    fn ensure_bound(&self, caller: &Address) -> Result<()> {
        match *self.bound_registry.read() {
            Some(bound) if bound == *caller => Ok(()),
            _ => {
                tracing::warn!(caller = %caller.short(), "storage write from unbound caller");
                Err(ProtocolError::CallerNotBoundRegistry { caller: *caller })
            }
        }
    }

    pub fn register_identity(
        &self,
        caller: &Address,
        wallet: Address,
        identity: Arc<Identity>,
        country: CountryCode,
    ) -> Result<()> {
        self.ensure_bound(caller)?;

        match self.records.entry(wallet) {
            Entry::Occupied(_) => Err(ProtocolError::AlreadyRegistered(wallet)),
            Entry::Vacant(slot) => {
                tracing::info!(
                    wallet = %wallet.short(),
                    identity = %identity.address().short(),
                    %country,
                    "identity registered"
                );
                slot.insert(IdentityRecord {
                    identity,
                    country,
                    registered_at: Utc::now(),
                });
                Ok(())
            }
        }
    }

    pub fn update_country(
        &self,
        caller: &Address,
        wallet: &Address,
        country: CountryCode,
    ) -> Result<()> {
        self.ensure_bound(caller)?;

        let mut record = self
            .records
            .get_mut(wallet)
            .ok_or_else(|| not_registered(wallet))?;
        record.country = country;
        tracing::info!(wallet = %wallet.short(), %country, "investor country updated");
        Ok(())
    }

    pub fn delete_identity(&self, caller: &Address, wallet: &Address) -> Result<()> {
        self.ensure_bound(caller)?;

        self.records
            .remove(wallet)
            .ok_or_else(|| not_registered(wallet))?;
        tracing::info!(wallet = %wallet.short(), "identity removed");
        Ok(())
    }

    pub fn contains(&self, wallet: &Address) -> bool {
        self.records.contains_key(wallet)
    }

    pub fn identity_of(&self, wallet: &Address) -> Result<Arc<Identity>> {
        self.records
            .get(wallet)
            .map(|r| Arc::clone(&r.identity))
            .ok_or_else(|| not_registered(wallet))
    }

    pub fn country_of(&self, wallet: &Address) -> Result<CountryCode> {
        self.records
            .get(wallet)
            .map(|r| r.country)
            .ok_or_else(|| not_registered(wallet))
    }

    pub fn record(&self, wallet: &Address) -> Option<IdentityRecord> {
        self.records.get(wallet).map(|r| r.clone())
    }

    /// Registered wallets, sorted.
    pub fn wallets(&self) -> Vec<Address> {
        let mut out: Vec<Address> = self.records.iter().map(|r| *r.key()).collect();
        out.sort();
        out
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn not_registered(wallet: &Address) -> ProtocolError {
    ProtocolError::NotFound(format!("identity for wallet {}", wallet))
}
