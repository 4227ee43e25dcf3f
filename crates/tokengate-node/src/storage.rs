//! RocksDB snapshot store for the TokenGate runner.

use anyhow::Result;
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use tokengate_core::{Address, Amount};

use crate::snapshot::{DeploymentRecord, IdentityRecord, IssuerRecord, Snapshot, TokenRecord, TopicRecord};

/// Column family names for different data types.
const CF_TOPICS: &str = "topics";
const CF_ISSUERS: &str = "issuers";
const CF_IDENTITIES: &str = "identities";
const CF_BALANCES: &str = "balances";
const CF_META: &str = "meta";

const KEY_TOKEN: &[u8] = b"token";
const KEY_DEPLOYMENT: &[u8] = b"deployment";

/// RocksDB-backed snapshot storage.
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = [CF_TOPICS, CF_ISSUERS, CF_IDENTITIES, CF_BALANCES, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self { db })
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        self.db.put_cf(&cf, key, serde_json::to_vec(value)?)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        match self.db.get_cf(&cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Every value in a column family, in key order.
    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item?;
            out.push(serde_json::from_slice(&value)?);
        }
        Ok(out)
    }

    /// Write every record of `snapshot`.
    pub fn write_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        for record in &snapshot.topics {
            self.put_json(CF_TOPICS, &record.topic.to_be_bytes(), record)?;
        }
        for record in &snapshot.issuers {
            self.put_json(CF_ISSUERS, record.address.as_bytes(), record)?;
        }
        for record in &snapshot.identities {
            self.put_json(CF_IDENTITIES, record.wallet.as_bytes(), record)?;
        }
        for (account, balance) in &snapshot.balances {
            self.put_json(CF_BALANCES, account.as_bytes(), balance)?;
        }
        self.put_json(CF_META, KEY_TOKEN, &snapshot.token)?;
        self.put_json(CF_META, KEY_DEPLOYMENT, &snapshot.deployment)?;

        tracing::info!(
            topics = snapshot.topics.len(),
            issuers = snapshot.issuers.len(),
            identities = snapshot.identities.len(),
            balances = snapshot.balances.len(),
            "snapshot written"
        );
        Ok(())
    }

    pub fn topics(&self) -> Result<Vec<TopicRecord>> {
        self.scan_json(CF_TOPICS)
    }

    pub fn issuers(&self) -> Result<Vec<IssuerRecord>> {
        self.scan_json(CF_ISSUERS)
    }

    pub fn identity(&self, wallet: &Address) -> Result<Option<IdentityRecord>> {
        self.get_json(CF_IDENTITIES, wallet.as_bytes())
    }

    pub fn identities(&self) -> Result<Vec<IdentityRecord>> {
        self.scan_json(CF_IDENTITIES)
    }

    pub fn balance(&self, account: &Address) -> Result<Option<Amount>> {
        self.get_json(CF_BALANCES, account.as_bytes())
    }

    pub fn token(&self) -> Result<Option<TokenRecord>> {
        self.get_json(CF_META, KEY_TOKEN)
    }

    pub fn deployment(&self) -> Result<Option<DeploymentRecord>> {
        self.get_json(CF_META, KEY_DEPLOYMENT)
    }
}
