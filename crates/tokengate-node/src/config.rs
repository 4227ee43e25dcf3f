//! Deployment configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tokengate_core::TokenConfig;

/// Full configuration of one TokenGate deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGateConfig {
    /// Token metadata.
    #[serde(default)]
    pub token: TokenConfig,

    /// Required claim topics.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Compliance modules to install.
    #[serde(default)]
    pub compliance: ComplianceConfig,

    /// Scenario executed after seeding.
    #[serde(default)]
    pub scenario: ScenarioConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Trusted claim issuers.
    #[serde(default = "default_issuers")]
    pub issuers: Vec<IssuerConfig>,

    /// Investors to register.
    #[serde(default = "default_investors")]
    pub investors: Vec<InvestorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Topic names; each becomes `ClaimTopic::from_name(name)`.
    #[serde(default = "default_claim_topics")]
    pub claim_topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ComplianceConfig {
    /// Largest single transfer.
    #[serde(default)]
    pub max_per_transfer: Option<u64>,
    /// Largest cumulative amount one sender may send.
    #[serde(default)]
    pub max_outbound: Option<u64>,
    /// Largest circulating supply.
    #[serde(default)]
    pub supply_cap: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerConfig {
    /// Name of the issuer; also seeds its manager wallet.
    pub name: String,
    /// Topic names the issuer is trusted for.
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorConfig {
    /// Name of the investor; also seeds the wallet key.
    pub name: String,
    /// ISO 3166-1 numeric country code.
    #[serde(default = "default_country")]
    pub country: u16,
    /// Claims the investor's identity receives.
    #[serde(default)]
    pub claims: Vec<ClaimConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimConfig {
    /// Issuer name, as listed in `issuers`.
    pub issuer: String,
    /// Topic name.
    pub topic: String,
    /// Public claim data.
    #[serde(default = "default_claim_data")]
    pub data: String,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub mints: Vec<MintStep>,
    /// Unpause the token after minting.
    #[serde(default = "default_true")]
    pub unpause: bool,
    #[serde(default)]
    pub transfers: Vec<TransferStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintStep {
    pub to: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferStep {
    pub from: String,
    pub to: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Write a snapshot after the scenario.
    #[serde(default = "default_true")]
    pub persist: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

const CLAIM_TOPIC: &str = "CLAIM_TOPIC";
const CLAIM_ISSUER: &str = "claim-issuer";

// Default value functions
fn default_claim_topics() -> Vec<String> {
    vec![CLAIM_TOPIC.into()]
}
fn default_issuers() -> Vec<IssuerConfig> {
    vec![IssuerConfig {
        name: CLAIM_ISSUER.into(),
        topics: vec![CLAIM_TOPIC.into()],
    }]
}
fn default_investors() -> Vec<InvestorConfig> {
    ["bob", "alice"]
        .into_iter()
        .map(|name| InvestorConfig {
            name: name.into(),
            country: default_country(),
            claims: vec![ClaimConfig {
                issuer: CLAIM_ISSUER.into(),
                topic: CLAIM_TOPIC.into(),
                data: default_claim_data(),
                uri: String::new(),
            }],
        })
        .collect()
}
fn default_country() -> u16 {
    666
}
fn default_claim_data() -> String {
    "Some claim public data.".into()
}
fn default_true() -> bool {
    true
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for TokenGateConfig {
    fn default() -> Self {
        Self {
            token: TokenConfig::default(),
            registry: RegistryConfig::default(),
            compliance: ComplianceConfig::default(),
            scenario: ScenarioConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            issuers: default_issuers(),
            investors: default_investors(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            claim_topics: default_claim_topics(),
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            mints: vec![MintStep {
                to: "bob".into(),
                amount: 500,
            }],
            unpause: true,
            transfers: vec![TransferStep {
                from: "bob".into(),
                to: "alice".into(),
                amount: 100,
            }],
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            persist: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TokenGateConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: TokenGateConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check cross references between sections.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.token.validate()?;

        for issuer in &self.issuers {
            if issuer.topics.is_empty() {
                anyhow::bail!("issuer '{}' lists no topics", issuer.name);
            }
        }
        for investor in &self.investors {
            for claim in &investor.claims {
                if !self.issuers.iter().any(|i| i.name == claim.issuer) {
                    anyhow::bail!(
                        "investor '{}' has a claim from unknown issuer '{}'",
                        investor.name,
                        claim.issuer
                    );
                }
            }
        }

        let known = |name: &str| self.investors.iter().any(|i| i.name == name);
        for step in &self.scenario.mints {
            if !known(&step.to) {
                anyhow::bail!("mint to unknown investor '{}'", step.to);
            }
        }
        for step in &self.scenario.transfers {
            if !known(&step.from) || !known(&step.to) {
                anyhow::bail!("transfer between unknown investors '{}' -> '{}'", step.from, step.to);
            }
        }
        Ok(())
    }
}
